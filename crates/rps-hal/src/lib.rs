//! # RPS HAL
//!
//! 硬件抽象层：定位服务（位姿源）与差速底盘（两个驱动电机）。
//!
//! 控制器只依赖这里的两个 trait，具体后端可以是：
//!
//! - 真实的 RPS 接收器 + 电机控制器（由上层应用实现）
//! - `mock`：脚本化位姿源与记录型底盘（单元测试）
//! - `sim`：差速运动学仿真场地（集成测试与 CLI 演示）

use rps_protocol::PoseReading;
use thiserror::Error;

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "sim")]
pub mod sim;

/// 底盘左右电机
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// 硬件层统一错误类型
#[derive(Error, Debug)]
pub enum HalError {
    #[error("{side} motor rejected command: {message}")]
    Motor { side: Side, message: String },
}

impl HalError {
    pub fn motor(side: Side, message: impl Into<String>) -> Self {
        HalError::Motor {
            side,
            message: message.into(),
        }
    }
}

/// 定位服务接口
///
/// 三个分量各自独立读取，任一分量都可能返回 `NO_SIGNAL` 或 `DEADZONE`，
/// 使用前必须检查全部三个分量（见 [`PoseReading::classify`]）。
pub trait PoseSource {
    fn x(&mut self) -> f64;
    fn y(&mut self) -> f64;
    fn heading(&mut self) -> f64;

    /// 读取一帧完整读数
    fn read(&mut self) -> PoseReading {
        let x = self.x();
        let y = self.y();
        let heading = self.heading();
        PoseReading::new(x, y, heading)
    }
}

/// 差速底盘接口
///
/// `percent` 为带符号百分比（负值表示反转），范围 [-100, 100]。
pub trait DriveTrain {
    fn set_percent(&mut self, side: Side, percent: f64) -> Result<(), HalError>;
    fn stop(&mut self, side: Side) -> Result<(), HalError>;
}

impl<T: PoseSource + ?Sized> PoseSource for &mut T {
    fn x(&mut self) -> f64 {
        (**self).x()
    }
    fn y(&mut self) -> f64 {
        (**self).y()
    }
    fn heading(&mut self) -> f64 {
        (**self).heading()
    }
    fn read(&mut self) -> PoseReading {
        (**self).read()
    }
}

impl<T: DriveTrain + ?Sized> DriveTrain for &mut T {
    fn set_percent(&mut self, side: Side, percent: f64) -> Result<(), HalError> {
        (**self).set_percent(side, percent)
    }
    fn stop(&mut self, side: Side) -> Result<(), HalError> {
        (**self).stop(side)
    }
}

impl<T: PoseSource + ?Sized> PoseSource for Box<T> {
    fn x(&mut self) -> f64 {
        (**self).x()
    }
    fn y(&mut self) -> f64 {
        (**self).y()
    }
    fn heading(&mut self) -> f64 {
        (**self).heading()
    }
    fn read(&mut self) -> PoseReading {
        (**self).read()
    }
}

impl<T: DriveTrain + ?Sized> DriveTrain for Box<T> {
    fn set_percent(&mut self, side: Side, percent: f64) -> Result<(), HalError> {
        (**self).set_percent(side, percent)
    }
    fn stop(&mut self, side: Side) -> Result<(), HalError> {
        (**self).stop(side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource(f64, f64, f64);

    impl PoseSource for FixedSource {
        fn x(&mut self) -> f64 {
            self.0
        }
        fn y(&mut self) -> f64 {
            self.1
        }
        fn heading(&mut self) -> f64 {
            self.2
        }
    }

    #[test]
    fn test_default_read_combines_components() {
        let mut source = FixedSource(1.0, 2.0, 3.0);
        assert_eq!(source.read(), PoseReading::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_read_through_mut_ref() {
        let mut source = FixedSource(1.0, -2.0, 3.0);
        let mut by_ref = &mut source;
        assert_eq!(PoseSource::read(&mut by_ref), PoseReading::new(1.0, -2.0, 3.0));
    }

    #[test]
    fn test_hal_error_display() {
        let err = HalError::motor(Side::Left, "overcurrent");
        assert_eq!(format!("{}", err), "left motor rejected command: overcurrent");

        let err = HalError::motor(Side::Right, "not responding");
        assert_eq!(format!("{}", err), "right motor rejected command: not responding");
    }
}
