//! 错误类型
//!
//! 传感器缺失（无信号、盲区）不是错误，它们体现在 [`NavOutcome`](crate::NavOutcome) 里。
//! 这里只有底盘硬件故障和非法参数。

use rps_hal::HalError;
use rps_tools::ToolsError;
use thiserror::Error;

/// 导航错误
#[derive(Debug, Error)]
pub enum NavError {
    /// 底盘命令失败
    #[error("Drive hardware failure: {0}")]
    Drive(#[from] HalError),

    /// 调参校验失败
    #[error("Invalid tuning: {0}")]
    Tuning(#[from] ToolsError),

    /// 命令参数非法
    #[error("Invalid parameter {parameter}: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
}

impl NavError {
    pub fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        NavError::InvalidParameter {
            parameter,
            reason: reason.into(),
        }
    }

    /// 是否为硬件故障
    pub fn is_hardware(&self) -> bool {
        matches!(self, NavError::Drive(_))
    }
}

pub type Result<T> = std::result::Result<T, NavError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rps_hal::Side;

    #[test]
    fn test_error_display() {
        let err: NavError = HalError::motor(Side::Right, "stalled").into();
        assert!(err.is_hardware());
        assert_eq!(
            err.to_string(),
            "Drive hardware failure: right motor rejected command: stalled"
        );

        let err = NavError::invalid("tolerance", "must be positive");
        assert!(!err.is_hardware());
        assert_eq!(err.to_string(), "Invalid parameter tolerance: must be positive");
    }
}
