//! # 导航调参
//!
//! 控制器用到的全部常量（速度分档、阈值、时序、盲转标定、电机限幅），
//! 可从 TOML 文件加载。缺省字段取默认值，所以配置文件只需写要覆盖的部分：
//!
//! ```toml
//! [turn]
//! tolerance_deg = 3.0
//!
//! [recovery]
//! seconds_per_degree = 0.0075
//! ```

use crate::ToolsError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 分档表中的一档：误差（或距离）严格大于 `above` 时取 `value`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub above: f64,
    pub value: f64,
}

impl Tier {
    pub const fn new(above: f64, value: f64) -> Self {
        Tier { above, value }
    }
}

/// 分档表
///
/// `tiers` 按 `above` 严格降序排列，依次匹配；都不满足时取 `floor`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierTable {
    pub tiers: Vec<Tier>,
    pub floor: f64,
}

impl TierTable {
    pub fn new(tiers: Vec<Tier>, floor: f64) -> Self {
        Self { tiers, floor }
    }

    /// 按输入选档
    pub fn select(&self, input: f64) -> f64 {
        self.tiers
            .iter()
            .find(|tier| input > tier.above)
            .map_or(self.floor, |tier| tier.value)
    }

    fn validate(&self, name: &'static str) -> Result<(), ToolsError> {
        let values = self.tiers.iter().map(|t| t.value).chain([self.floor]);
        for value in values {
            if !(0.0..=1.0).contains(&value) {
                return Err(ToolsError::invalid(
                    name,
                    format!("tier value {value} outside [0, 1]"),
                ));
            }
        }
        for pair in self.tiers.windows(2) {
            if pair[1].above >= pair[0].above {
                return Err(ToolsError::invalid(
                    name,
                    format!(
                        "thresholds must be strictly descending ({} then {})",
                        pair[0].above, pair[1].above
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// 完整调参
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavTuning {
    pub turn: TurnTuning,
    pub navigator: NavigatorTuning,
    pub recovery: RecoveryTuning,
    pub timing: TimingTuning,
    pub drive: DriveTuning,
    pub pose: PoseTuning,
}

/// 原地转向
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnTuning {
    /// 到位容差（度）
    pub tolerance_deg: f64,
    /// 角度误差 -> 转向功率
    pub speed_tiers: TierTable,
    /// 脉冲微调容差（度）
    pub nudge_tolerance_deg: f64,
    /// 脉冲功率
    pub nudge_power: f64,
    /// 单次脉冲时长（秒）
    pub nudge_pulse_s: f64,
    /// 脉冲后静置（秒）
    pub nudge_settle_s: f64,
    /// 最多脉冲次数
    pub nudge_max_pulses: u32,
}

impl Default for TurnTuning {
    fn default() -> Self {
        Self {
            tolerance_deg: 5.0,
            speed_tiers: TierTable::new(vec![Tier::new(50.0, 0.5), Tier::new(25.0, 0.4)], 0.2),
            nudge_tolerance_deg: 1.5,
            nudge_power: 0.2,
            nudge_pulse_s: 0.05,
            nudge_settle_s: 0.35,
            nudge_max_pulses: 40,
        }
    }
}

/// 点到点导航
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorTuning {
    /// 默认到达容差
    pub default_tolerance: f64,
    /// 默认线速度比例 (0, 1]
    pub default_speed_scale: f64,
    /// 航向误差达到或超过此值时停车原地重新对准（度）
    pub major_threshold_deg: f64,
    /// 距目标不超过此距离时不再做原地重新对准
    pub major_min_distance: f64,
    /// 超过此航向误差时差速修正（度）
    pub minor_threshold_deg: f64,
    /// 航向误差 -> 内侧轮系数
    pub steer_tiers: TierTable,
    /// 剩余距离 -> 巡航系数（再乘以速度比例）
    pub cruise_tiers: TierTable,
    /// 带超时的命令固定以此功率比例直行（不分档，不乘速度比例）
    pub timed_cruise: f64,
    /// 超时秒数换算迭代次数
    pub counts_per_second: f64,
    /// 停车后、末端转向前的静置（秒）
    pub settle_before_end_turn_s: f64,
}

impl Default for NavigatorTuning {
    fn default() -> Self {
        Self {
            default_tolerance: 0.75,
            default_speed_scale: 0.4,
            major_threshold_deg: 30.0,
            major_min_distance: 2.0,
            minor_threshold_deg: 3.0,
            steer_tiers: TierTable::new(vec![Tier::new(15.0, 0.3)], 0.5),
            cruise_tiers: TierTable::new(vec![Tier::new(4.0, 1.0)], 0.5),
            timed_cruise: 0.2,
            counts_per_second: 10.0,
            settle_before_end_turn_s: 0.5,
        }
    }
}

/// 盲区脱困
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryTuning {
    /// 障碍物 x 范围下界（不含）
    pub obstacle_min_x: f64,
    /// 障碍物 x 范围上界（不含）
    pub obstacle_max_x: f64,
    /// 脱困方向（度）
    pub escape_heading_deg: f64,
    /// 侧移方向（度）
    pub lateral_heading_deg: f64,
    /// 侧移时长（秒）
    pub lateral_drive_s: f64,
    /// 侧移功率
    pub lateral_power: f64,
    /// 盲转功率
    pub blind_turn_power: f64,
    /// 盲转每度耗时（秒），需与 `blind_turn_power` 一起标定
    pub seconds_per_degree: f64,
    /// 脱困直行功率
    pub escape_power: f64,
    /// 重新获得信号后继续直行（秒）
    pub escape_settle_s: f64,
    /// 脱困直行上限（秒）
    pub max_escape_drive_s: f64,
}

impl Default for RecoveryTuning {
    fn default() -> Self {
        Self {
            obstacle_min_x: 7.0,
            obstacle_max_x: 24.0,
            escape_heading_deg: 270.0,
            lateral_heading_deg: 0.0,
            lateral_drive_s: 0.5,
            lateral_power: 0.5,
            blind_turn_power: 0.4,
            seconds_per_degree: 5.0 / 690.0,
            escape_power: 0.4,
            escape_settle_s: 1.0,
            max_escape_drive_s: 6.0,
        }
    }
}

/// 循环时序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingTuning {
    /// 导航控制周期（毫秒）
    pub cycle_ms: u64,
    /// 原地转向控制周期（毫秒）
    pub turn_cycle_ms: u64,
    /// 无信号重试间隔（毫秒）
    pub retry_ms: u64,
    /// 持续无信号多久后放弃（秒）
    pub no_signal_patience_s: f64,
}

impl Default for TimingTuning {
    fn default() -> Self {
        Self {
            cycle_ms: 25,
            turn_cycle_ms: 10,
            retry_ms: 10,
            no_signal_patience_s: 30.0,
        }
    }
}

/// 电机限幅与方向修正
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveTuning {
    pub left_max_percent: f64,
    pub right_max_percent: f64,
    /// +1 或 -1
    pub left_sign: f64,
    /// +1 或 -1
    pub right_sign: f64,
}

impl Default for DriveTuning {
    fn default() -> Self {
        Self {
            left_max_percent: 40.0,
            right_max_percent: 40.0,
            left_sign: 1.0,
            right_sign: 1.0,
        }
    }
}

/// 定位标签安装
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseTuning {
    /// 标签到底盘中心沿航向的偏移
    pub tracker_offset: f64,
}

impl NavTuning {
    /// 从 TOML 文件加载并校验
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ToolsError> {
        let content = fs::read_to_string(path)?;
        let tuning: NavTuning = toml::from_str(&content)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// 保存为 TOML
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ToolsError> {
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ToolsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 校验参数范围
    pub fn validate(&self) -> Result<(), ToolsError> {
        let t = &self.turn;
        positive("turn.tolerance_deg", t.tolerance_deg)?;
        positive("turn.nudge_tolerance_deg", t.nudge_tolerance_deg)?;
        fraction("turn.nudge_power", t.nudge_power)?;
        positive("turn.nudge_pulse_s", t.nudge_pulse_s)?;
        non_negative("turn.nudge_settle_s", t.nudge_settle_s)?;
        t.speed_tiers.validate("turn.speed_tiers")?;

        let n = &self.navigator;
        positive("navigator.default_tolerance", n.default_tolerance)?;
        fraction("navigator.default_speed_scale", n.default_speed_scale)?;
        positive("navigator.minor_threshold_deg", n.minor_threshold_deg)?;
        if n.major_threshold_deg < n.minor_threshold_deg {
            return Err(ToolsError::invalid(
                "navigator.major_threshold_deg",
                "must not be below minor_threshold_deg",
            ));
        }
        non_negative("navigator.major_min_distance", n.major_min_distance)?;
        positive("navigator.counts_per_second", n.counts_per_second)?;
        fraction("navigator.timed_cruise", n.timed_cruise)?;
        non_negative("navigator.settle_before_end_turn_s", n.settle_before_end_turn_s)?;
        n.steer_tiers.validate("navigator.steer_tiers")?;
        n.cruise_tiers.validate("navigator.cruise_tiers")?;

        let r = &self.recovery;
        if r.obstacle_min_x >= r.obstacle_max_x {
            return Err(ToolsError::invalid(
                "recovery.obstacle_min_x",
                "must be below obstacle_max_x",
            ));
        }
        fraction("recovery.lateral_power", r.lateral_power)?;
        fraction("recovery.blind_turn_power", r.blind_turn_power)?;
        fraction("recovery.escape_power", r.escape_power)?;
        positive("recovery.seconds_per_degree", r.seconds_per_degree)?;
        non_negative("recovery.lateral_drive_s", r.lateral_drive_s)?;
        non_negative("recovery.escape_settle_s", r.escape_settle_s)?;
        positive("recovery.max_escape_drive_s", r.max_escape_drive_s)?;

        let timing = &self.timing;
        if timing.cycle_ms == 0 {
            return Err(ToolsError::invalid("timing.cycle_ms", "must be at least 1"));
        }
        if timing.turn_cycle_ms == 0 {
            return Err(ToolsError::invalid("timing.turn_cycle_ms", "must be at least 1"));
        }
        if timing.retry_ms == 0 {
            return Err(ToolsError::invalid("timing.retry_ms", "must be at least 1"));
        }
        positive("timing.no_signal_patience_s", timing.no_signal_patience_s)?;

        let d = &self.drive;
        for (name, max) in [
            ("drive.left_max_percent", d.left_max_percent),
            ("drive.right_max_percent", d.right_max_percent),
        ] {
            if !(max > 0.0 && max <= 100.0) {
                return Err(ToolsError::invalid(name, format!("{max} outside (0, 100]")));
            }
        }
        for (name, sign) in [("drive.left_sign", d.left_sign), ("drive.right_sign", d.right_sign)] {
            if sign != 1.0 && sign != -1.0 {
                return Err(ToolsError::invalid(name, format!("{sign} is not +1 or -1")));
            }
        }

        if !self.pose.tracker_offset.is_finite() {
            return Err(ToolsError::invalid("pose.tracker_offset", "must be finite"));
        }

        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ToolsError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ToolsError::invalid(name, format!("{value} must be positive")))
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ToolsError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ToolsError::invalid(name, format!("{value} must not be negative")))
    }
}

fn fraction(name: &'static str, value: f64) -> Result<(), ToolsError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ToolsError::invalid(name, format!("{value} outside (0, 1]")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_tuning_is_valid() {
        NavTuning::default().validate().unwrap();
    }

    #[test]
    fn test_turn_speed_tiers() {
        let tiers = TurnTuning::default().speed_tiers;
        assert_eq!(tiers.select(90.0), 0.5);
        assert_eq!(tiers.select(50.0), 0.4);
        assert_eq!(tiers.select(30.0), 0.4);
        assert_eq!(tiers.select(25.0), 0.2);
        assert_eq!(tiers.select(0.0), 0.2);
    }

    #[test]
    fn test_cruise_and_steer_tiers() {
        let nav = NavigatorTuning::default();
        assert_eq!(nav.cruise_tiers.select(10.0), 1.0);
        assert_eq!(nav.cruise_tiers.select(4.0), 0.5);
        assert_eq!(nav.steer_tiers.select(20.0), 0.3);
        assert_eq!(nav.steer_tiers.select(10.0), 0.5);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let tuning: NavTuning = toml::from_str(
            r#"
            [turn]
            tolerance_deg = 3.0

            [timing]
            cycle_ms = 50
            "#,
        )
        .unwrap();

        assert_eq!(tuning.turn.tolerance_deg, 3.0);
        assert_eq!(tuning.turn.nudge_tolerance_deg, 1.5);
        assert_eq!(tuning.timing.cycle_ms, 50);
        assert_eq!(tuning.timing.retry_ms, 10);
        assert_eq!(tuning.recovery, RecoveryTuning::default());
    }

    #[test]
    fn test_file_roundtrip() {
        let mut tuning = NavTuning::default();
        tuning.drive.right_sign = -1.0;
        tuning.recovery.seconds_per_degree = 0.01;

        let file = NamedTempFile::new().unwrap();
        tuning.save_to_file(file.path()).unwrap();
        let loaded = NavTuning::load_from_file(file.path()).unwrap();
        assert_eq!(loaded, tuning);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut tuning = NavTuning::default();
        tuning.navigator.default_speed_scale = 1.5;
        let err = tuning.validate().unwrap_err();
        assert!(format!("{err}").contains("navigator.default_speed_scale"));

        let mut tuning = NavTuning::default();
        tuning.drive.left_sign = 0.0;
        assert!(tuning.validate().is_err());

        let mut tuning = NavTuning::default();
        tuning.turn.speed_tiers = TierTable::new(vec![Tier::new(25.0, 0.4), Tier::new(50.0, 0.5)], 0.2);
        assert!(tuning.validate().is_err());

        let mut tuning = NavTuning::default();
        tuning.timing.cycle_ms = 0;
        assert!(tuning.validate().is_err());

        let mut tuning = NavTuning::default();
        tuning.navigator.timed_cruise = 0.0;
        let err = tuning.validate().unwrap_err();
        assert!(format!("{err}").contains("navigator.timed_cruise"));
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "[recovery]\nobstacle_min_x = 30.0\n").unwrap();
        let err = NavTuning::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ToolsError::Invalid { .. }));
    }
}
