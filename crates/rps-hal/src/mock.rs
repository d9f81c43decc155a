//! Mock 后端
//!
//! - [`ScriptedPoseSource`]：按预设序列返回读数，序列耗尽后重复最后一帧
//! - [`RecordingDrive`]：记录所有电机命令，可选在第 N 条命令时注入故障

use crate::{DriveTrain, HalError, PoseSource, Side};
use rps_protocol::PoseReading;
use std::collections::VecDeque;

/// 脚本化位姿源
///
/// 每次 `read()` 推进一帧；单分量访问（`x()` 等）返回当前帧。
#[derive(Debug, Clone)]
pub struct ScriptedPoseSource {
    script: VecDeque<PoseReading>,
    current: PoseReading,
    reads: usize,
}

impl ScriptedPoseSource {
    pub fn new(readings: impl IntoIterator<Item = PoseReading>) -> Self {
        Self {
            script: readings.into_iter().collect(),
            current: PoseReading::no_signal(),
            reads: 0,
        }
    }

    /// 永远返回同一读数
    pub fn constant(reading: PoseReading) -> Self {
        let mut source = Self::new([]);
        source.current = reading;
        source
    }

    /// 已读取的帧数
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl PoseSource for ScriptedPoseSource {
    fn x(&mut self) -> f64 {
        self.current.x
    }

    fn y(&mut self) -> f64 {
        self.current.y
    }

    fn heading(&mut self) -> f64 {
        self.current.heading
    }

    fn read(&mut self) -> PoseReading {
        if let Some(next) = self.script.pop_front() {
            self.current = next;
        }
        self.reads += 1;
        self.current
    }
}

/// 电机命令记录
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveCommand {
    Set(Side, f64),
    Stop(Side),
}

/// 记录型底盘
#[derive(Debug, Clone, Default)]
pub struct RecordingDrive {
    commands: Vec<DriveCommand>,
    attempts: usize,
    fail_at: Option<usize>,
}

impl RecordingDrive {
    pub fn new() -> Self {
        Self::default()
    }

    /// 第 `index` 次下发（从 0 开始）返回错误且不记录，之后的命令照常成功
    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    pub fn commands(&self) -> &[DriveCommand] {
        &self.commands
    }

    /// 最近一次对指定电机下发的百分比（停止视为 0）
    pub fn last_percent(&self, side: Side) -> Option<f64> {
        self.commands.iter().rev().find_map(|cmd| match *cmd {
            DriveCommand::Set(s, p) if s == side => Some(p),
            DriveCommand::Stop(s) if s == side => Some(0.0),
            _ => None,
        })
    }

    fn record(&mut self, command: DriveCommand, side: Side) -> Result<(), HalError> {
        let attempt = self.attempts;
        self.attempts += 1;
        if self.fail_at == Some(attempt) {
            return Err(HalError::motor(side, "injected failure"));
        }
        self.commands.push(command);
        Ok(())
    }
}

impl DriveTrain for RecordingDrive {
    fn set_percent(&mut self, side: Side, percent: f64) -> Result<(), HalError> {
        self.record(DriveCommand::Set(side, percent), side)
    }

    fn stop(&mut self, side: Side) -> Result<(), HalError> {
        self.record(DriveCommand::Stop(side), side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_source_repeats_last() {
        let mut source = ScriptedPoseSource::new([
            PoseReading::no_signal(),
            PoseReading::new(1.0, 2.0, 3.0),
        ]);
        assert_eq!(source.read(), PoseReading::no_signal());
        assert_eq!(source.read(), PoseReading::new(1.0, 2.0, 3.0));
        assert_eq!(source.read(), PoseReading::new(1.0, 2.0, 3.0));
        assert_eq!(source.reads(), 3);
        assert_eq!(source.x(), 1.0);
    }

    #[test]
    fn test_recording_drive_last_percent() {
        let mut drive = RecordingDrive::new();
        drive.set_percent(Side::Left, 20.0).unwrap();
        drive.set_percent(Side::Right, -20.0).unwrap();
        drive.stop(Side::Left).unwrap();

        assert_eq!(drive.last_percent(Side::Left), Some(0.0));
        assert_eq!(drive.last_percent(Side::Right), Some(-20.0));
        assert_eq!(drive.commands().len(), 3);
    }

    #[test]
    fn test_recording_drive_injected_failure() {
        let mut drive = RecordingDrive::failing_at(1);
        assert!(drive.set_percent(Side::Left, 10.0).is_ok());
        let err = drive.set_percent(Side::Right, 10.0).unwrap_err();
        assert!(matches!(err, HalError::Motor { side: Side::Right, .. }));

        // 只失败一次
        assert!(drive.stop(Side::Right).is_ok());
        assert_eq!(
            drive.commands(),
            &[DriveCommand::Set(Side::Left, 10.0), DriveCommand::Stop(Side::Right)]
        );
    }
}
