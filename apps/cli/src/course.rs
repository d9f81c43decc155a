//! 仿真场地参数
//!
//! 所有运动命令都运行在 `rps_hal::sim` 场地上

use anyhow::{Context, Result};
use clap::Args;
use rps_hal::sim::{SimCourse, SimDrive, SimParams, SimPoseSource, Zone};
use rps_nav::NavSession;
use rps_protocol::{Deg, Pose};
use rps_tools::NavTuning;
use tracing::info;

use crate::validation::{parse_pose, parse_zone};

/// 仿真场地参数
#[derive(Args, Debug, Clone)]
pub struct SimArgs {
    /// 起始位姿 x,y,heading
    #[arg(long, value_parser = parse_pose, default_value = "0,0,0", allow_hyphen_values = true)]
    pub start: Pose,

    /// RPS 盲区 min_x,min_y,max_x,max_y（可重复）
    #[arg(long = "deadzone", value_parser = parse_zone)]
    pub deadzones: Vec<Zone>,

    /// 每 N 次读数丢一次信号
    #[arg(long)]
    pub no_signal_every: Option<u32>,

    /// 电机 100% 时的轮速（英寸/秒）
    #[arg(long, default_value_t = 30.0)]
    pub full_speed: f64,

    /// 盲转使用配置中的 seconds_per_degree，不按仿真底盘换算
    #[arg(long)]
    pub raw_blind_turn: bool,
}

impl Default for SimArgs {
    fn default() -> Self {
        Self {
            start: Pose::new(0.0, 0.0, Deg::EAST),
            deadzones: Vec::new(),
            no_signal_every: None,
            full_speed: 30.0,
            raw_blind_turn: false,
        }
    }
}

impl SimArgs {
    pub fn build(&self) -> Result<SimCourse> {
        if !(self.full_speed.is_finite() && self.full_speed > 0.0) {
            anyhow::bail!("轮速必须为正数: {}", self.full_speed);
        }

        let mut params = SimParams::default()
            .with_initial_pose(self.start)
            .with_full_speed(self.full_speed);
        for zone in &self.deadzones {
            params = params.with_deadzone(*zone);
        }
        if let Some(period) = self.no_signal_every {
            params = params.with_no_signal_every(period);
        }

        Ok(SimCourse::new(params))
    }
}

/// 在仿真场地上创建导航会话
pub fn open_session(
    course: &SimCourse,
    mut tuning: NavTuning,
    sim: &SimArgs,
) -> Result<NavSession<SimPoseSource, SimDrive>> {
    if !sim.raw_blind_turn {
        let spin_percent = tuning.recovery.blind_turn_power * tuning.drive.left_max_percent;
        tuning.recovery.seconds_per_degree = course.seconds_per_degree(spin_percent);
    }

    info!(
        "Simulated course ready at {} ({} deadzones)",
        course.true_pose(),
        course.params().deadzones.len()
    );
    NavSession::new(course.pose_source(), course.drive(), tuning).context("创建导航会话失败")
}
