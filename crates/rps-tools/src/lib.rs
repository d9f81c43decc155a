//! # RPS Tools - 配置数据结构
//!
//! **依赖原则**: 只依赖 `rps-protocol`，不依赖控制器与硬件层
//!
//! ## 包含模块
//!
//! - `tuning` - 控制器调参（分档表、阈值、时序、电机限幅）
//! - `calibration` - 场地标定（命名任务点）
//!
//! 两者都可用 TOML 读写。

use thiserror::Error;

pub mod calibration;
pub mod tuning;

// 重新导出常用类型
pub use calibration::{CalibrationTarget, CourseCalibration, FOOSBALL_TRAVEL};
pub use tuning::{
    DriveTuning, NavTuning, NavigatorTuning, PoseTuning, RecoveryTuning, Tier, TierTable,
    TimingTuning, TurnTuning,
};

/// 配置错误
#[derive(Error, Debug)]
pub enum ToolsError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid parameter {parameter}: {reason}")]
    Invalid {
        parameter: &'static str,
        reason: String,
    },

    #[error("Unknown calibration target: {0}")]
    UnknownTarget(String),

    #[error("Calibration target not recorded: {0}")]
    NotCalibrated(String),
}

impl ToolsError {
    pub fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        ToolsError::Invalid {
            parameter,
            reason: reason.into(),
        }
    }
}
