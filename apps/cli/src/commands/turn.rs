//! turn 命令
//!
//! 原地转向：指定航向、朝向某点，或脉冲微调

use anyhow::Result;
use clap::Args;
use rps_protocol::{Deg, Point};

use crate::commands::config::ConfigPaths;
use crate::course::{SimArgs, open_session};
use crate::utils::describe_outcome;
use crate::validation::{parse_heading, parse_point};

/// turn 命令参数
#[derive(Args, Debug)]
pub struct TurnCommand {
    /// 目标航向（度）
    #[arg(
        value_parser = parse_heading,
        allow_hyphen_values = true,
        required_unless_present = "face",
        conflicts_with = "face"
    )]
    pub heading: Option<Deg>,

    /// 转向朝向此点 x,y
    #[arg(long, value_parser = parse_point)]
    pub face: Option<Point>,

    /// 车尾朝向 `--face` 指定的点
    #[arg(long, requires = "face")]
    pub away: bool,

    /// 粗转后再脉冲微调
    #[arg(long, conflicts_with = "face")]
    pub nudge: bool,

    #[command(flatten)]
    pub sim: SimArgs,
}

impl TurnCommand {
    pub async fn execute(&self, paths: &ConfigPaths) -> Result<()> {
        let course = self.sim.build()?;
        let mut session = open_session(&course, paths.load_tuning()?, &self.sim)?;

        let outcome = match (self.heading, self.face) {
            (Some(heading), _) => {
                println!("🔄 {} -> {}", course.true_pose().heading, heading);
                let outcome = session.turn_to_heading(heading).await?;
                if self.nudge && outcome.is_arrived() {
                    session.nudge_to_heading(heading).await?
                } else {
                    outcome
                }
            }
            (None, Some(point)) if self.away => {
                println!("🔄 车尾朝向 {}", point);
                session.turn_away_from_point(point).await?
            }
            (None, Some(point)) => {
                println!("🔄 朝向 {}", point);
                session.turn_to_point(point).await?
            }
            (None, None) => anyhow::bail!("未指定目标航向"),
        };

        println!("{}", describe_outcome(&outcome));
        println!("📍 最终位姿: {}", course.true_pose());
        Ok(())
    }
}
