//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use rps_nav::prelude::*;
//! ```

pub use crate::command::{NavCommand, NavOutcome, TravelMode};
pub use crate::error::{NavError, Result};
pub use crate::recovery::{RecoveryPlan, RecoveryReport};
pub use crate::session::NavSession;

// 硬件层 trait
pub use rps_hal::{DriveTrain, PoseSource, Side};

// 数据类型
pub use rps_protocol::{Deg, Point, Pose, PoseReading, PoseSample};

// 配置
pub use rps_tools::{CourseCalibration, NavTuning};
