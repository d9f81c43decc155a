//! # 场地标定
//!
//! 赛前把机器人摆到各任务点、读一次 RPS，记录下的坐标作为导航目标，
//! 用来吸收不同场地之间 RPS 的系统偏差。

use crate::ToolsError;
use rps_protocol::{Point, PoseReading, PoseSample};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// 桌上足球终点相对起点的 x 偏移
pub const FOOSBALL_TRAVEL: f64 = 8.0;

/// 标定目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationTarget {
    Token,
    DdrBlueLight,
    RpsButton,
    FoosballStart,
    FoosballEnd,
    Lever,
}

impl CalibrationTarget {
    pub const ALL: [CalibrationTarget; 6] = [
        CalibrationTarget::Token,
        CalibrationTarget::DdrBlueLight,
        CalibrationTarget::RpsButton,
        CalibrationTarget::FoosballStart,
        CalibrationTarget::FoosballEnd,
        CalibrationTarget::Lever,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CalibrationTarget::Token => "token",
            CalibrationTarget::DdrBlueLight => "ddr_blue_light",
            CalibrationTarget::RpsButton => "rps_button",
            CalibrationTarget::FoosballStart => "foosball_start",
            CalibrationTarget::FoosballEnd => "foosball_end",
            CalibrationTarget::Lever => "lever",
        }
    }
}

impl fmt::Display for CalibrationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CalibrationTarget {
    type Err = ToolsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CalibrationTarget::ALL
            .into_iter()
            .find(|target| target.name() == s)
            .ok_or_else(|| ToolsError::UnknownTarget(s.to_string()))
    }
}

/// 标定结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseCalibration {
    pub token: Option<Point>,
    pub ddr_blue_light: Option<Point>,
    pub rps_button: Option<Point>,
    pub foosball_start: Option<Point>,
    pub foosball_end: Option<Point>,
    pub lever: Option<Point>,
}

impl CourseCalibration {
    fn slot(&mut self, target: CalibrationTarget) -> &mut Option<Point> {
        match target {
            CalibrationTarget::Token => &mut self.token,
            CalibrationTarget::DdrBlueLight => &mut self.ddr_blue_light,
            CalibrationTarget::RpsButton => &mut self.rps_button,
            CalibrationTarget::FoosballStart => &mut self.foosball_start,
            CalibrationTarget::FoosballEnd => &mut self.foosball_end,
            CalibrationTarget::Lever => &mut self.lever,
        }
    }

    pub fn set(&mut self, target: CalibrationTarget, point: Point) {
        *self.slot(target) = Some(point);
    }

    /// 用一次 RPS 读数标定目标
    ///
    /// 读数无效（无信号或盲区）时不记录，返回 `false`，调用方应重读。
    pub fn record(&mut self, target: CalibrationTarget, reading: PoseReading) -> bool {
        match reading.classify() {
            PoseSample::Valid(pose) => {
                self.set(target, pose.position);
                true
            }
            PoseSample::NoSignal | PoseSample::Deadzone => false,
        }
    }

    /// 查询目标坐标
    ///
    /// 桌上足球终点未单独标定时由起点推出：x 减 [`FOOSBALL_TRAVEL`]，y 不变。
    pub fn get(&self, target: CalibrationTarget) -> Option<Point> {
        match target {
            CalibrationTarget::Token => self.token,
            CalibrationTarget::DdrBlueLight => self.ddr_blue_light,
            CalibrationTarget::RpsButton => self.rps_button,
            CalibrationTarget::FoosballStart => self.foosball_start,
            CalibrationTarget::FoosballEnd => self
                .foosball_end
                .or_else(|| self.foosball_start.map(|p| Point::new(p.x - FOOSBALL_TRAVEL, p.y))),
            CalibrationTarget::Lever => self.lever,
        }
    }

    /// 按名称查询（`token`、`foosball_end` 等）
    pub fn lookup(&self, name: &str) -> Result<Point, ToolsError> {
        let target: CalibrationTarget = name.parse()?;
        self.get(target)
            .ok_or_else(|| ToolsError::NotCalibrated(target.name().to_string()))
    }

    /// 尚未标定（也无法推出）的目标
    pub fn missing(&self) -> Vec<CalibrationTarget> {
        CalibrationTarget::ALL
            .into_iter()
            .filter(|target| self.get(*target).is_none())
            .collect()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ToolsError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ToolsError> {
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_foosball_end_derived_from_start() {
        let mut cal = CourseCalibration::default();
        assert_eq!(cal.get(CalibrationTarget::FoosballEnd), None);

        cal.set(CalibrationTarget::FoosballStart, Point::new(20.0, 45.0));
        assert_eq!(
            cal.get(CalibrationTarget::FoosballEnd),
            Some(Point::new(12.0, 45.0))
        );

        cal.set(CalibrationTarget::FoosballEnd, Point::new(11.0, 46.0));
        assert_eq!(
            cal.get(CalibrationTarget::FoosballEnd),
            Some(Point::new(11.0, 46.0))
        );
    }

    #[test]
    fn test_record_skips_invalid_readings() {
        let mut cal = CourseCalibration::default();
        assert!(!cal.record(CalibrationTarget::Lever, PoseReading::no_signal()));
        assert!(!cal.record(CalibrationTarget::Lever, PoseReading::deadzone()));
        assert!(cal.record(CalibrationTarget::Lever, PoseReading::new(3.0, 4.0, 90.0)));
        assert_eq!(cal.lever, Some(Point::new(3.0, 4.0)));
    }

    #[test]
    fn test_lookup_by_name() {
        let mut cal = CourseCalibration::default();
        cal.set(CalibrationTarget::Token, Point::new(1.0, 2.0));

        assert_eq!(cal.lookup("token").unwrap(), Point::new(1.0, 2.0));
        assert!(matches!(
            cal.lookup("lever"),
            Err(ToolsError::NotCalibrated(_))
        ));
        assert!(matches!(
            cal.lookup("trampoline"),
            Err(ToolsError::UnknownTarget(_))
        ));
    }

    #[test]
    fn test_missing_targets() {
        let mut cal = CourseCalibration::default();
        cal.set(CalibrationTarget::FoosballStart, Point::new(20.0, 45.0));
        let missing = cal.missing();
        assert!(!missing.contains(&CalibrationTarget::FoosballStart));
        assert!(!missing.contains(&CalibrationTarget::FoosballEnd));
        assert_eq!(missing.len(), 4);
    }

    #[test]
    fn test_file_roundtrip() {
        let mut cal = CourseCalibration::default();
        cal.set(CalibrationTarget::RpsButton, Point::new(14.5, 31.25));
        cal.set(CalibrationTarget::DdrBlueLight, Point::new(9.0, 12.0));

        let file = NamedTempFile::new().unwrap();
        cal.save_to_file(file.path()).unwrap();
        assert_eq!(CourseCalibration::load_from_file(file.path()).unwrap(), cal);
    }

    #[test]
    fn test_target_names_parse() {
        for target in CalibrationTarget::ALL {
            assert_eq!(target.name().parse::<CalibrationTarget>().unwrap(), target);
        }
        let json = serde_json::to_string(&CalibrationTarget::DdrBlueLight).unwrap();
        assert_eq!(json, "\"ddr_blue_light\"");
    }
}
