//! # RPS Protocol
//!
//! 定位服务（RPS）读数的数据模型（无硬件依赖）
//!
//! ## 模块
//!
//! - `units`: 强类型角度 `Deg`
//! - `pose`: 原始读数、哨兵值与有效性分类
//!
//! ## 坐标约定
//!
//! 航向单位为度，范围 [0, 360)，0° 指向东，逆时针递增（与单位圆一致）。

pub mod pose;
pub mod units;

// 重新导出常用类型
pub use pose::{DEADZONE, NO_SIGNAL, Point, Pose, PoseReading, PoseSample, is_sentinel};
pub use units::Deg;
