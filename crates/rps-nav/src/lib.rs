//! # RPS Nav
//!
//! 差速底盘在间歇性绝对定位（RPS）反馈下的点到点闭环导航。
//!
//! ## 模块
//!
//! - `geometry`: 距离、期望航向、最小夹角、转向方向
//! - `cache`: 最近有效位姿缓存
//! - `drive`: 功率比例 -> 电机百分比
//! - `session`: 导航会话（位姿源、底盘、缓存、盲区标志）
//! - `turn`: 分档原地转向与脉冲微调
//! - `navigator`: 点到点导航
//! - `recovery`: 盲区开环脱困
//!
//! ## 传感器缺失的处理
//!
//! | 读数 | 处理 |
//! |------|------|
//! | `NO_SIGNAL` | 保持当前电机输出，短暂等待后重试 |
//! | `DEADZONE` | 开环脱困，放弃当前命令，置位盲区标志 |
//!
//! 所有等待都基于 `tokio::time`，可在 `start_paused` 测试中瞬时完成。

pub mod cache;
pub mod command;
pub mod drive;
pub mod error;
pub mod geometry;
pub mod navigator;
pub mod prelude;
pub mod recovery;
pub mod session;
pub mod turn;

pub use cache::PoseCache;
pub use command::{NavCommand, NavOutcome, TravelMode};
pub use drive::Drive;
pub use error::{NavError, Result};
pub use recovery::{RecoveryPlan, RecoveryReport, plan_escape};
pub use session::NavSession;
