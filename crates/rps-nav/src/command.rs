//! 导航命令与结果

use crate::error::{NavError, Result};
use crate::recovery::RecoveryReport;
use rps_protocol::{Deg, Point};
use rps_tools::NavigatorTuning;

/// 行进方向
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TravelMode {
    #[default]
    Forward,
    /// 车尾朝向目标倒车
    Backward,
}

impl TravelMode {
    /// 电机功率符号
    pub fn sign(self) -> f64 {
        match self {
            TravelMode::Forward => 1.0,
            TravelMode::Backward => -1.0,
        }
    }
}

/// 点到点导航命令
///
/// ```rust
/// use rps_nav::{NavCommand, TravelMode};
/// use rps_protocol::{Deg, Point};
///
/// let cmd = NavCommand::new(Point::new(12.0, 30.0))
///     .with_end_heading(Deg::SOUTH)
///     .with_tolerance(0.5)
///     .with_mode(TravelMode::Backward);
/// assert_eq!(cmd.mode, TravelMode::Backward);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NavCommand {
    pub target: Point,
    /// 到达后再原地转到此航向
    pub end_heading: Option<Deg>,
    /// 到达容差，`None` 取调参默认值
    pub tolerance: Option<f64>,
    /// 线速度比例 (0, 1]，`None` 取调参默认值
    pub speed_scale: Option<f64>,
    /// 超时（秒），按固定迭代率换算为循环次数
    pub timeout_s: Option<f64>,
    pub mode: TravelMode,
}

impl NavCommand {
    pub fn new(target: Point) -> Self {
        Self {
            target,
            end_heading: None,
            tolerance: None,
            speed_scale: None,
            timeout_s: None,
            mode: TravelMode::Forward,
        }
    }

    pub fn with_end_heading(mut self, heading: Deg) -> Self {
        self.end_heading = Some(heading.wrap());
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn with_speed_scale(mut self, scale: f64) -> Self {
        self.speed_scale = Some(scale);
        self
    }

    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_s = Some(seconds);
        self
    }

    pub fn with_mode(mut self, mode: TravelMode) -> Self {
        self.mode = mode;
        self
    }

    /// 快速档：放宽容差换速度
    pub fn with_fast_profile(self) -> Self {
        self.with_tolerance(1.5).with_speed_scale(0.7)
    }

    /// 用调参补全默认值并校验
    pub(crate) fn resolve(&self, tuning: &NavigatorTuning) -> Result<ResolvedCommand> {
        let tolerance = self.tolerance.unwrap_or(tuning.default_tolerance);
        let speed_scale = self.speed_scale.unwrap_or(tuning.default_speed_scale);

        if !self.target.x.is_finite() || !self.target.y.is_finite() {
            return Err(NavError::invalid("target", format!("{} is not finite", self.target)));
        }
        if !(tolerance > 0.0 && tolerance.is_finite()) {
            return Err(NavError::invalid("tolerance", format!("{tolerance} must be positive")));
        }
        if !(speed_scale > 0.0 && speed_scale <= 1.0) {
            return Err(NavError::invalid(
                "speed_scale",
                format!("{speed_scale} outside (0, 1]"),
            ));
        }
        let max_iterations = match self.timeout_s {
            Some(t) if !(t >= 0.0 && t.is_finite()) => {
                return Err(NavError::invalid("timeout", format!("{t} must not be negative")));
            }
            Some(t) => Some(t * tuning.counts_per_second),
            None => None,
        };

        Ok(ResolvedCommand {
            tolerance,
            speed_scale,
            max_iterations,
        })
    }
}

/// 补全默认值后的命令参数
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedCommand {
    pub tolerance: f64,
    pub speed_scale: f64,
    pub max_iterations: Option<f64>,
}

/// 一次导航（或转向）调用的结果
#[derive(Debug, Clone, PartialEq)]
pub enum NavOutcome {
    /// 到达目标（容差内）
    Arrived,
    /// 迭代次数用尽，停在目标附近
    TimedOut,
    /// 进入盲区，已执行脱困，本次命令放弃
    DeadzoneEscaped(RecoveryReport),
    /// 持续无信号超过耐心时长，已停车
    SignalLost,
}

impl NavOutcome {
    pub fn is_arrived(&self) -> bool {
        matches!(self, NavOutcome::Arrived)
    }

    /// 是否因传感器问题中止（盲区或失去信号）
    pub fn is_aborted(&self) -> bool {
        matches!(self, NavOutcome::DeadzoneEscaped(_) | NavOutcome::SignalLost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_uses_tuning_defaults() {
        let tuning = NavigatorTuning::default();
        let resolved = NavCommand::new(Point::new(1.0, 2.0)).resolve(&tuning).unwrap();
        assert_eq!(resolved.tolerance, 0.75);
        assert_eq!(resolved.speed_scale, 0.4);
        assert_eq!(resolved.max_iterations, None);
    }

    #[test]
    fn test_resolve_converts_timeout() {
        let tuning = NavigatorTuning::default();
        let resolved = NavCommand::new(Point::new(1.0, 2.0))
            .with_timeout(2.5)
            .resolve(&tuning)
            .unwrap();
        assert_eq!(resolved.max_iterations, Some(25.0));
    }

    #[test]
    fn test_resolve_rejects_bad_parameters() {
        let tuning = NavigatorTuning::default();
        let target = Point::new(1.0, 2.0);

        let err = NavCommand::new(target).with_tolerance(0.0).resolve(&tuning).unwrap_err();
        assert!(matches!(err, NavError::InvalidParameter { parameter: "tolerance", .. }));

        let err = NavCommand::new(target).with_speed_scale(1.2).resolve(&tuning).unwrap_err();
        assert!(matches!(err, NavError::InvalidParameter { parameter: "speed_scale", .. }));

        let err = NavCommand::new(target).with_timeout(-1.0).resolve(&tuning).unwrap_err();
        assert!(matches!(err, NavError::InvalidParameter { parameter: "timeout", .. }));

        let err = NavCommand::new(Point::new(f64::NAN, 0.0)).resolve(&tuning).unwrap_err();
        assert!(matches!(err, NavError::InvalidParameter { parameter: "target", .. }));
    }

    #[test]
    fn test_fast_profile() {
        let cmd = NavCommand::new(Point::new(0.0, 0.0)).with_fast_profile();
        assert_eq!(cmd.tolerance, Some(1.5));
        assert_eq!(cmd.speed_scale, Some(0.7));
    }

    #[test]
    fn test_travel_mode_sign() {
        assert_eq!(TravelMode::Forward.sign(), 1.0);
        assert_eq!(TravelMode::Backward.sign(), -1.0);
        assert_eq!(TravelMode::default(), TravelMode::Forward);
    }
}
