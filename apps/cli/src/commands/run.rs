//! run 命令
//!
//! 在仿真场地上执行任务文件

use anyhow::Result;
use clap::Args;

use crate::commands::config::ConfigPaths;
use crate::course::{SimArgs, open_session};
use crate::script::{MissionConfig, MissionExecutor, StepReport};

/// 任务执行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 任务文件路径（JSON）
    pub mission: String,

    /// 失败时继续执行
    #[arg(long)]
    pub continue_on_error: bool,

    /// 步骤间延迟（毫秒）
    #[arg(long, default_value_t = 100)]
    pub step_delay_ms: u64,

    #[command(flatten)]
    pub sim: SimArgs,
}

impl RunCommand {
    /// 执行任务
    pub async fn execute(&self, paths: &ConfigPaths) -> Result<()> {
        println!("📜 加载任务: {}", self.mission);
        let mission = MissionExecutor::load_mission(&self.mission)?;

        println!("📋 任务: {}", mission.name);
        if !mission.description.is_empty() {
            println!("    {}", mission.description);
        }
        println!("    {} 个步骤", mission.steps.len());
        println!();

        let course = self.sim.build()?;
        let mut session = open_session(&course, paths.load_tuning()?, &self.sim)?;

        let config = MissionConfig {
            continue_on_error: self.continue_on_error,
            step_delay_ms: self.step_delay_ms,
        };
        let executor = MissionExecutor::new(paths.load_calibration()?).with_config(config);
        let result = executor.execute(&mut session, &mission).await?;

        println!();
        println!("📊 {} 执行结果:", result.mission_name);
        println!("  总步骤数: {}", mission.steps.len());
        println!(
            "  完成: {}",
            result.count(|r| matches!(r, StepReport::Done(_)))
        );
        println!(
            "  跳过: {}",
            result.count(|r| matches!(r, StepReport::Skipped))
        );
        println!(
            "  失败: {}",
            result.count(|r| matches!(r, StepReport::Failed(_)))
        );
        println!("  耗时: {:.2} 秒", result.duration.as_secs_f64());
        println!("  最终位姿: {}", course.true_pose());
        if result.deadzone_exhausted {
            println!("  ⚠️  盲区标志已置位");
        }

        let failed: Vec<_> = result.failed().collect();
        if !failed.is_empty() {
            println!();
            println!("❌ 失败的步骤:");
            for (idx, err) in &failed {
                println!("  步骤 {}: {}", idx + 1, err);
            }
            anyhow::bail!("{} 个步骤失败", failed.len());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_defaults() {
        let cmd = RunCommand {
            mission: "mission.json".to_string(),
            continue_on_error: false,
            step_delay_ms: 100,
            sim: SimArgs::default(),
        };

        assert_eq!(cmd.mission, "mission.json");
        assert!(!cmd.continue_on_error);
    }
}
