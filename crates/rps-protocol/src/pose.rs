//! 位姿读数与有效性分类
//!
//! RPS 的三个分量（x、y、heading）各自可能返回哨兵值：
//!
//! - `NO_SIGNAL` (-1.0)：暂时没有数据（瞬态）
//! - `DEADZONE` (-2.0)：处于覆盖盲区（持续性）
//!
//! 有效性按每次读数判定，不做缓存。同一读数同时出现两种哨兵时按盲区处理，
//! 这样等待循环永远不会卡在盲区上。

use crate::units::Deg;
use std::fmt;

/// 无信号哨兵值
pub const NO_SIGNAL: f64 = -1.0;

/// 盲区哨兵值
pub const DEADZONE: f64 = -2.0;

/// 单个分量是否为哨兵值
#[inline]
pub fn is_sentinel(value: f64) -> bool {
    value == NO_SIGNAL || value == DEADZONE
}

/// 场地坐标中的点（单位：英寸，与 RPS 一致）
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// 有效位姿
///
/// 只能通过 [`PoseReading::classify`] 或 [`Pose::new`] 获得，读出后不可变。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    pub position: Point,
    /// 航向，[0, 360)
    pub heading: Deg,
}

impl Pose {
    /// 创建位姿，航向自动归一化到 [0, 360)
    pub fn new(x: f64, y: f64, heading: Deg) -> Self {
        Pose {
            position: Point::new(x, y),
            heading: heading.wrap(),
        }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.position.y
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.position, self.heading)
    }
}

/// RPS 原始读数（可能包含哨兵值）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseReading {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

/// 单次读数的分类结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoseSample {
    /// 三个分量都有效
    Valid(Pose),
    /// 至少一个分量为 `NO_SIGNAL`（瞬态，可重试）
    NoSignal,
    /// 至少一个分量为 `DEADZONE`（持续性，需要脱困）
    Deadzone,
}

impl PoseSample {
    /// 是否有效
    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self, PoseSample::Valid(_))
    }

    /// 取出有效位姿
    #[inline]
    pub fn pose(&self) -> Option<Pose> {
        match self {
            PoseSample::Valid(pose) => Some(*pose),
            _ => None,
        }
    }
}

impl PoseReading {
    pub const fn new(x: f64, y: f64, heading: f64) -> Self {
        PoseReading { x, y, heading }
    }

    /// 全部为 `NO_SIGNAL` 的读数
    pub const fn no_signal() -> Self {
        PoseReading::new(NO_SIGNAL, NO_SIGNAL, NO_SIGNAL)
    }

    /// 全部为 `DEADZONE` 的读数
    pub const fn deadzone() -> Self {
        PoseReading::new(DEADZONE, DEADZONE, DEADZONE)
    }

    /// 任一分量处于盲区
    pub fn in_deadzone(&self) -> bool {
        self.x == DEADZONE || self.y == DEADZONE || self.heading == DEADZONE
    }

    /// 任一分量无信号
    pub fn has_no_signal(&self) -> bool {
        self.x == NO_SIGNAL || self.y == NO_SIGNAL || self.heading == NO_SIGNAL
    }

    /// 按有效性分类（盲区优先于无信号）
    pub fn classify(&self) -> PoseSample {
        if self.in_deadzone() {
            PoseSample::Deadzone
        } else if self.has_no_signal() {
            PoseSample::NoSignal
        } else {
            PoseSample::Valid(Pose::new(self.x, self.y, Deg(self.heading)))
        }
    }
}

impl From<Pose> for PoseReading {
    fn from(pose: Pose) -> Self {
        PoseReading::new(pose.position.x, pose.position.y, pose.heading.0)
    }
}
