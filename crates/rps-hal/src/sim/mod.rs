//! 仿真场地
//!
//! 差速底盘运动学 + RPS 覆盖模型，时间取自 `tokio::time::Instant`。
//! 在 `start_paused` 的 tokio 测试中，所有 `sleep` 会瞬间推进虚拟时钟，
//! 仿真随之精确积分，测试既快又确定。
//!
//! ```rust,ignore
//! let course = SimCourse::new(SimParams::default().with_deadzone(Zone::new(10.0, 0.0, 20.0, 5.0)));
//! let source = course.pose_source();
//! let drive = course.drive();
//! ```

mod physics;

pub use physics::{DiffDriveState, DriveGeometry};

use crate::{DriveTrain, HalError, PoseSource, Side};
use parking_lot::Mutex;
use rps_protocol::{Deg, Point, Pose, PoseReading};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

/// 矩形盲区（闭区间）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub min: Point,
    pub max: Point,
}

impl Zone {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Zone {
            min: Point::new(min_x.min(max_x), min_y.min(max_y)),
            max: Point::new(min_x.max(max_x), min_y.max(max_y)),
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min.x && x <= self.max.x && y >= self.min.y && y <= self.max.y
    }
}

/// 仿真参数
#[derive(Debug, Clone, PartialEq)]
pub struct SimParams {
    /// 电机 100% 时的轮速（英寸/秒）
    pub full_speed: f64,
    /// 轮距（英寸）
    pub wheel_base: f64,
    /// RPS 盲区
    pub deadzones: Vec<Zone>,
    /// 每 N 次 `read()` 返回一次 `NO_SIGNAL`
    pub no_signal_every: Option<u32>,
    pub initial_pose: Pose,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            full_speed: 30.0,
            wheel_base: 8.0,
            deadzones: Vec::new(),
            no_signal_every: None,
            initial_pose: Pose::new(0.0, 0.0, Deg::EAST),
        }
    }
}

impl SimParams {
    pub fn with_deadzone(mut self, zone: Zone) -> Self {
        self.deadzones.push(zone);
        self
    }

    pub fn with_no_signal_every(mut self, period: u32) -> Self {
        self.no_signal_every = (period > 0).then_some(period);
        self
    }

    pub fn with_initial_pose(mut self, pose: Pose) -> Self {
        self.initial_pose = pose;
        self
    }

    pub fn with_full_speed(mut self, full_speed: f64) -> Self {
        self.full_speed = full_speed;
        self
    }

    pub fn geometry(&self) -> DriveGeometry {
        DriveGeometry {
            full_speed: self.full_speed,
            wheel_base: self.wheel_base,
        }
    }
}

/// 一条电机命令记录
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorEvent {
    /// 相对仿真开始的时间
    pub at: Duration,
    pub side: Side,
    /// 停止记为 0
    pub percent: f64,
}

#[derive(Debug)]
struct SimState {
    body: DiffDriveState,
    left_percent: f64,
    right_percent: f64,
    started_at: Instant,
    last_update: Instant,
    reads: u64,
    log: Vec<MotorEvent>,
}

impl SimState {
    /// 以当前电机输出积分到现在
    fn advance(&mut self, geometry: &DriveGeometry) {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last_update).as_secs_f64();
        let (linear, angular) = geometry.body_velocity(self.left_percent, self.right_percent);
        self.body.integrate(linear, angular, dt);
        self.last_update = now;
    }

    fn pose(&self) -> Pose {
        Pose::new(
            self.body.x,
            self.body.y,
            Deg::from_radians(self.body.theta),
        )
    }
}

struct Shared {
    params: SimParams,
    geometry: DriveGeometry,
    state: Mutex<SimState>,
}

impl Shared {
    fn covered_reading(&self, state: &SimState) -> PoseReading {
        let pose = state.pose();
        if self
            .params
            .deadzones
            .iter()
            .any(|zone| zone.contains(pose.x(), pose.y()))
        {
            PoseReading::deadzone()
        } else {
            pose.into()
        }
    }

    fn sample(&self) -> PoseReading {
        let mut state = self.state.lock();
        state.advance(&self.geometry);
        self.covered_reading(&state)
    }

    fn set_motor(&self, side: Side, percent: f64) {
        let mut state = self.state.lock();
        state.advance(&self.geometry);
        match side {
            Side::Left => state.left_percent = percent,
            Side::Right => state.right_percent = percent,
        }
        let at = state.last_update.duration_since(state.started_at);
        state.log.push(MotorEvent { at, side, percent });
        trace!("sim {} motor -> {:.1}% at {:?}", side, percent, at);
    }
}

/// 仿真场地句柄（可克隆，内部共享状态）
#[derive(Clone)]
pub struct SimCourse {
    shared: Arc<Shared>,
}

impl SimCourse {
    pub fn new(params: SimParams) -> Self {
        let now = Instant::now();
        let start = params.initial_pose;
        let state = SimState {
            body: DiffDriveState {
                x: start.x(),
                y: start.y(),
                theta: start.heading.to_radians(),
            },
            left_percent: 0.0,
            right_percent: 0.0,
            started_at: now,
            last_update: now,
            reads: 0,
            log: Vec::new(),
        };
        Self {
            shared: Arc::new(Shared {
                geometry: params.geometry(),
                params,
                state: Mutex::new(state),
            }),
        }
    }

    pub fn params(&self) -> &SimParams {
        &self.shared.params
    }

    /// RPS 接收器视图
    pub fn pose_source(&self) -> SimPoseSource {
        SimPoseSource {
            shared: Arc::clone(&self.shared),
        }
    }

    /// 底盘视图
    pub fn drive(&self) -> SimDrive {
        SimDrive {
            shared: Arc::clone(&self.shared),
        }
    }

    /// 真实位姿（不受盲区和丢帧影响）
    pub fn true_pose(&self) -> Pose {
        let mut state = self.shared.state.lock();
        state.advance(&self.shared.geometry);
        state.pose()
    }

    /// 当前 (左, 右) 电机百分比
    pub fn motor_percents(&self) -> (f64, f64) {
        let state = self.shared.state.lock();
        (state.left_percent, state.right_percent)
    }

    pub fn command_log(&self) -> Vec<MotorEvent> {
        self.shared.state.lock().log.clone()
    }

    /// 已发生的 `read()` 次数
    pub fn read_count(&self) -> u64 {
        self.shared.state.lock().reads
    }

    /// 把机器人直接放到指定位姿（保持电机输出）
    pub fn teleport(&self, pose: Pose) {
        let mut state = self.shared.state.lock();
        state.advance(&self.shared.geometry);
        state.body = DiffDriveState {
            x: pose.x(),
            y: pose.y(),
            theta: pose.heading.to_radians(),
        };
    }

    /// 两侧电机 ±`spin_percent` 时每转 1° 需要的秒数
    ///
    /// 用于给盲转标定 `seconds_per_degree`。
    pub fn seconds_per_degree(&self, spin_percent: f64) -> f64 {
        let rate = self.shared.geometry.spin_rate_deg(spin_percent);
        if rate > 0.0 { 1.0 / rate } else { f64::INFINITY }
    }
}

impl std::fmt::Debug for SimCourse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimCourse")
            .field("params", &self.shared.params)
            .finish_non_exhaustive()
    }
}

/// 仿真 RPS 接收器
pub struct SimPoseSource {
    shared: Arc<Shared>,
}

impl PoseSource for SimPoseSource {
    fn x(&mut self) -> f64 {
        self.shared.sample().x
    }

    fn y(&mut self) -> f64 {
        self.shared.sample().y
    }

    fn heading(&mut self) -> f64 {
        self.shared.sample().heading
    }

    fn read(&mut self) -> PoseReading {
        let mut state = self.shared.state.lock();
        state.advance(&self.shared.geometry);
        state.reads += 1;

        let reading = self.shared.covered_reading(&state);
        if reading.in_deadzone() {
            return reading;
        }
        match self.shared.params.no_signal_every {
            Some(period) if state.reads % u64::from(period) == 0 => PoseReading::no_signal(),
            _ => reading,
        }
    }
}

/// 仿真底盘
pub struct SimDrive {
    shared: Arc<Shared>,
}

impl DriveTrain for SimDrive {
    fn set_percent(&mut self, side: Side, percent: f64) -> Result<(), HalError> {
        if !percent.is_finite() {
            return Err(HalError::motor(side, format!("non-finite percent {percent}")));
        }
        self.shared.set_motor(side, percent.clamp(-100.0, 100.0));
        Ok(())
    }

    fn stop(&mut self, side: Side) -> Result<(), HalError> {
        self.shared.set_motor(side, 0.0);
        Ok(())
    }
}
