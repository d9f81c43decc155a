//! 底盘命令封装
//!
//! 控制器只处理 [-1, 1] 的功率比例，这里乘以每侧电机的最大百分比和方向修正，
//! 再下发给 [`DriveTrain`]。

use crate::error::Result;
use rps_hal::{DriveTrain, Side};
use rps_tools::DriveTuning;
use tracing::{trace, warn};

/// 带限幅与方向修正的底盘
#[derive(Debug)]
pub struct Drive<D> {
    inner: D,
    left_scale: f64,
    right_scale: f64,
    /// 最近一次下发的功率比例 (左, 右)
    current: (f64, f64),
}

impl<D: DriveTrain> Drive<D> {
    pub fn new(inner: D, tuning: &DriveTuning) -> Self {
        Self {
            inner,
            left_scale: tuning.left_max_percent * tuning.left_sign,
            right_scale: tuning.right_max_percent * tuning.right_sign,
            current: (0.0, 0.0),
        }
    }

    /// 设置左右功率比例（超出 [-1, 1] 的部分被截断）
    ///
    /// 任一侧下发失败时两侧都尝试停车，再返回错误。
    pub fn set(&mut self, left: f64, right: f64) -> Result<()> {
        let left = left.clamp(-1.0, 1.0);
        let right = right.clamp(-1.0, 1.0);
        trace!("drive set left={:.3} right={:.3}", left, right);

        let sent = self
            .inner
            .set_percent(Side::Left, left * self.left_scale)
            .and_then(|()| self.inner.set_percent(Side::Right, right * self.right_scale));
        if let Err(err) = sent {
            warn!("Drive command failed ({}), stopping both motors", err);
            self.halt();
            return Err(err.into());
        }
        self.current = (left, right);
        Ok(())
    }

    /// 两侧同速直行，负值后退
    pub fn straight(&mut self, power: f64) -> Result<()> {
        self.set(power, power)
    }

    /// 原地旋转，`left = true` 为逆时针
    pub fn spin(&mut self, left: bool, power: f64) -> Result<()> {
        if left {
            self.set(-power, power)
        } else {
            self.set(power, -power)
        }
    }

    /// 停车：两侧都会尝试，返回第一个错误
    pub fn stop(&mut self) -> Result<()> {
        let left = self.inner.stop(Side::Left);
        let right = self.inner.stop(Side::Right);
        self.current = (0.0, 0.0);
        left?;
        right?;
        Ok(())
    }

    /// 尽力停车，错误只记录日志
    fn halt(&mut self) {
        for side in Side::BOTH {
            if let Err(err) = self.inner.stop(side) {
                warn!("Failed to stop {} motor: {}", side, err);
            }
        }
        self.current = (0.0, 0.0);
    }

    pub fn current(&self) -> (f64, f64) {
        self.current
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut D {
        &mut self.inner
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}
