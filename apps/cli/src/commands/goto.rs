//! goto 命令
//!
//! 在仿真场地上开到一个目标点

use anyhow::Result;
use clap::Args;
use rps_nav::{NavCommand, NavOutcome, TravelMode};
use rps_protocol::{Deg, Point};

use crate::commands::config::ConfigPaths;
use crate::course::{SimArgs, open_session};
use crate::utils::describe_outcome;
use crate::validation::{parse_heading, parse_point};

/// goto 命令参数
#[derive(Args, Debug)]
pub struct GotoCommand {
    /// 目标点 x,y
    #[arg(
        value_parser = parse_point,
        allow_hyphen_values = true,
        required_unless_present = "target",
        conflicts_with = "target"
    )]
    pub point: Option<Point>,

    /// 标定目标名称（如 rps_button）
    #[arg(long)]
    pub target: Option<String>,

    /// 到达后转到此航向（度）
    #[arg(long, value_parser = parse_heading, allow_hyphen_values = true)]
    pub heading: Option<Deg>,

    /// 到达容差（英寸）
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// 线速度比例 (0, 1]
    #[arg(long)]
    pub speed: Option<f64>,

    /// 超时（秒）
    #[arg(long)]
    pub timeout: Option<f64>,

    /// 倒车前往
    #[arg(long)]
    pub backward: bool,

    /// 快速档（放宽容差换速度）
    #[arg(long)]
    pub fast: bool,

    #[command(flatten)]
    pub sim: SimArgs,
}

impl GotoCommand {
    /// 组装导航命令
    pub fn nav_command(&self, paths: &ConfigPaths) -> Result<NavCommand> {
        let target = match (&self.point, &self.target) {
            (Some(point), _) => *point,
            (None, Some(name)) => paths.load_calibration()?.lookup(name)?,
            (None, None) => anyhow::bail!("未指定目标点"),
        };

        let mut command = NavCommand::new(target);
        if self.fast {
            command = command.with_fast_profile();
        }
        if let Some(heading) = self.heading {
            command = command.with_end_heading(heading);
        }
        if let Some(tolerance) = self.tolerance {
            command = command.with_tolerance(tolerance);
        }
        if let Some(speed) = self.speed {
            command = command.with_speed_scale(speed);
        }
        if let Some(timeout) = self.timeout {
            command = command.with_timeout(timeout);
        }
        if self.backward {
            command = command.with_mode(TravelMode::Backward);
        }
        Ok(command)
    }

    pub async fn execute(&self, paths: &ConfigPaths) -> Result<()> {
        let command = self.nav_command(paths)?;
        let course = self.sim.build()?;
        let mut session = open_session(&course, paths.load_tuning()?, &self.sim)?;

        println!("🚗 {} -> {}", course.true_pose(), command.target);
        let outcome = session.go_to_point(&command).await?;

        println!("{}", describe_outcome(&outcome));
        println!("📍 最终位姿: {}", course.true_pose());
        if session.deadzone_exhausted() {
            println!("⚠️  盲区标志已置位");
        }

        if matches!(outcome, NavOutcome::SignalLost) {
            anyhow::bail!("RPS 信号丢失");
        }
        Ok(())
    }
}
