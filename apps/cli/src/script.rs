//! 任务脚本
//!
//! JSON 任务：依次执行导航步骤。目标点可以是字面坐标，也可以是标定名称。
//!
//! 会话进入过盲区后（盲区标志置位），标记了 `requires_live_pose` 的步骤
//! 直接跳过，不再依赖 RPS。

use anyhow::{Context, Result};
use rps_hal::{DriveTrain, PoseSource};
use rps_nav::{NavCommand, NavOutcome, NavSession, TravelMode};
use rps_protocol::{Deg, Point};
use rps_tools::CourseCalibration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::utils::describe_outcome;

/// 任务
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    /// 任务名称
    pub name: String,

    /// 任务描述
    #[serde(default)]
    pub description: String,

    /// 步骤序列
    pub steps: Vec<MissionStep>,
}

/// 目标点：字面坐标或标定名称
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Waypoint {
    Point { x: f64, y: f64 },
    Named(String),
}

impl Waypoint {
    pub fn resolve(&self, calibration: &CourseCalibration) -> Result<Point> {
        match self {
            Waypoint::Point { x, y } => Ok(Point::new(*x, *y)),
            Waypoint::Named(name) => calibration
                .lookup(name)
                .with_context(|| format!("无法解析目标点 {}", name)),
        }
    }
}

/// 任务步骤
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MissionStep {
    /// 开到目标点
    GoTo {
        to: Waypoint,
        #[serde(default)]
        end_heading: Option<f64>,
        #[serde(default)]
        tolerance: Option<f64>,
        #[serde(default)]
        speed: Option<f64>,
        #[serde(default)]
        timeout_s: Option<f64>,
        #[serde(default)]
        backward: bool,
        #[serde(default)]
        fast: bool,
        #[serde(default)]
        requires_live_pose: bool,
    },

    /// 原地转到航向
    Turn {
        heading: f64,
        #[serde(default)]
        requires_live_pose: bool,
    },

    /// 原地转向朝向（或背向）目标点
    Face {
        to: Waypoint,
        #[serde(default)]
        away: bool,
        #[serde(default)]
        requires_live_pose: bool,
    },

    /// 脉冲微调到航向
    Nudge {
        heading: f64,
        #[serde(default)]
        requires_live_pose: bool,
    },

    /// 等待
    Wait { duration_ms: u64 },
}

impl MissionStep {
    pub fn requires_live_pose(&self) -> bool {
        match self {
            MissionStep::GoTo {
                requires_live_pose, ..
            }
            | MissionStep::Turn {
                requires_live_pose, ..
            }
            | MissionStep::Face {
                requires_live_pose, ..
            }
            | MissionStep::Nudge {
                requires_live_pose, ..
            } => *requires_live_pose,
            MissionStep::Wait { .. } => false,
        }
    }
}

/// 单步执行结果
#[derive(Debug, Clone, PartialEq)]
pub enum StepReport {
    /// 执行完毕（含超时、盲区脱困等非错误结果）
    Done(Option<NavOutcome>),
    /// 盲区标志已置位，跳过
    Skipped,
    /// 出错
    Failed(String),
}

/// 执行配置
#[derive(Debug, Clone)]
pub struct MissionConfig {
    /// 失败时是否继续
    pub continue_on_error: bool,

    /// 步骤间延迟（毫秒）
    pub step_delay_ms: u64,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            continue_on_error: false,
            step_delay_ms: 100,
        }
    }
}

/// 任务执行器
pub struct MissionExecutor {
    config: MissionConfig,
    calibration: CourseCalibration,
}

impl MissionExecutor {
    pub fn new(calibration: CourseCalibration) -> Self {
        Self {
            config: MissionConfig::default(),
            calibration,
        }
    }

    pub fn with_config(mut self, config: MissionConfig) -> Self {
        self.config = config;
        self
    }

    /// 加载任务文件
    pub fn load_mission<P: AsRef<std::path::Path>>(path: P) -> Result<Mission> {
        let content = fs::read_to_string(path).context("读取任务文件失败")?;
        let mission: Mission = serde_json::from_str(&content).context("解析任务 JSON 失败")?;
        Ok(mission)
    }

    /// 执行任务
    pub async fn execute<P, D>(
        &self,
        session: &mut NavSession<P, D>,
        mission: &Mission,
    ) -> Result<MissionResult>
    where
        P: PoseSource,
        D: DriveTrain,
    {
        info!("Mission '{}' with {} steps", mission.name, mission.steps.len());
        let started = Instant::now();
        let mut result = MissionResult {
            mission_name: mission.name.clone(),
            reports: Vec::with_capacity(mission.steps.len()),
            duration: Duration::ZERO,
            deadzone_exhausted: false,
        };

        for (i, step) in mission.steps.iter().enumerate() {
            println!("步骤 {}/{}: {}", i + 1, mission.steps.len(), step_label(step));

            let report = if step.requires_live_pose() && session.deadzone_exhausted() {
                println!("  ⏭️  已进入过盲区，跳过");
                StepReport::Skipped
            } else {
                match self.execute_step(session, step).await {
                    Ok(outcome) => {
                        if let Some(outcome) = &outcome {
                            println!("  {}", describe_outcome(outcome));
                        } else {
                            println!("  ✅ 完成");
                        }
                        StepReport::Done(outcome)
                    }
                    Err(err) => {
                        println!("  ❌ 失败: {:#}", err);
                        StepReport::Failed(format!("{:#}", err))
                    }
                }
            };

            let failed = matches!(report, StepReport::Failed(_));
            result.reports.push(report);

            if failed {
                // 出错后先停车
                if let Err(err) = session.stop() {
                    warn!("Failed to stop drive after step error: {}", err);
                }
                if !self.config.continue_on_error {
                    println!();
                    println!("❌ 任务执行失败，停止执行");
                    break;
                }
            }

            if i + 1 < mission.steps.len() {
                tokio::time::sleep(Duration::from_millis(self.config.step_delay_ms)).await;
            }
        }

        result.duration = started.elapsed();
        result.deadzone_exhausted = session.deadzone_exhausted();
        Ok(result)
    }

    /// 执行单个步骤
    async fn execute_step<P, D>(
        &self,
        session: &mut NavSession<P, D>,
        step: &MissionStep,
    ) -> Result<Option<NavOutcome>>
    where
        P: PoseSource,
        D: DriveTrain,
    {
        let outcome = match step {
            MissionStep::GoTo {
                to,
                end_heading,
                tolerance,
                speed,
                timeout_s,
                backward,
                fast,
                ..
            } => {
                let mut command = NavCommand::new(to.resolve(&self.calibration)?);
                if *fast {
                    command = command.with_fast_profile();
                }
                if let Some(heading) = end_heading {
                    command = command.with_end_heading(Deg(*heading));
                }
                if let Some(tolerance) = tolerance {
                    command = command.with_tolerance(*tolerance);
                }
                if let Some(speed) = speed {
                    command = command.with_speed_scale(*speed);
                }
                if let Some(timeout) = timeout_s {
                    command = command.with_timeout(*timeout);
                }
                if *backward {
                    command = command.with_mode(TravelMode::Backward);
                }
                session.go_to_point(&command).await?
            }

            MissionStep::Turn { heading, .. } => session.turn_to_heading(Deg(*heading)).await?,

            MissionStep::Face { to, away, .. } => {
                let point = to.resolve(&self.calibration)?;
                if *away {
                    session.turn_away_from_point(point).await?
                } else {
                    session.turn_to_point(point).await?
                }
            }

            MissionStep::Nudge { heading, .. } => session.nudge_to_heading(Deg(*heading)).await?,

            MissionStep::Wait { duration_ms } => {
                tokio::time::sleep(Duration::from_millis(*duration_ms)).await;
                return Ok(None);
            }
        };
        Ok(Some(outcome))
    }
}

fn step_label(step: &MissionStep) -> String {
    match step {
        MissionStep::GoTo { to, backward, .. } => {
            let verb = if *backward { "倒车到" } else { "前往" };
            format!("{} {}", verb, waypoint_label(to))
        }
        MissionStep::Turn { heading, .. } => format!("转向 {}", Deg(*heading)),
        MissionStep::Face { to, away, .. } => {
            let verb = if *away { "背向" } else { "朝向" };
            format!("{} {}", verb, waypoint_label(to))
        }
        MissionStep::Nudge { heading, .. } => format!("微调到 {}", Deg(*heading)),
        MissionStep::Wait { duration_ms } => format!("等待 {} ms", duration_ms),
    }
}

fn waypoint_label(waypoint: &Waypoint) -> String {
    match waypoint {
        Waypoint::Point { x, y } => Point::new(*x, *y).to_string(),
        Waypoint::Named(name) => name.clone(),
    }
}

/// 任务执行结果
#[derive(Debug)]
pub struct MissionResult {
    pub mission_name: String,

    /// 每个已执行步骤的结果（失败中止后的步骤不在其中）
    pub reports: Vec<StepReport>,

    /// 任务耗时（tokio 时钟，仿真模式下为虚拟时间）
    pub duration: Duration,

    /// 结束时的盲区标志
    pub deadzone_exhausted: bool,
}

impl MissionResult {
    pub fn count(&self, pred: impl Fn(&StepReport) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(r)).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = (usize, &str)> {
        self.reports.iter().enumerate().filter_map(|(i, r)| match r {
            StepReport::Failed(err) => Some((i, err.as_str())),
            _ => None,
        })
    }
}
