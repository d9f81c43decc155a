//! 原地转向
//!
//! 分档角速度：误差越大转得越快，接近目标时降速，避免过冲。

use crate::command::NavOutcome;
use crate::error::Result;
use crate::geometry::{desired_heading, opposite_heading, shortest_angular_distance, should_turn_left};
use crate::session::{NavSession, PoseWait};
use rps_hal::{DriveTrain, PoseSource};
use rps_protocol::{Deg, Point};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

impl<P: PoseSource, D: DriveTrain> NavSession<P, D> {
    /// 原地转到指定航向
    ///
    /// 误差不大于 `turn.tolerance_deg` 时停车返回 `Arrived`。
    pub async fn turn_to_heading(&mut self, target: Deg) -> Result<NavOutcome> {
        let target = target.wrap();
        let tolerance = self.tuning.turn.tolerance_deg;
        let cycle = Duration::from_millis(self.tuning.timing.turn_cycle_ms);
        info!("turn: target heading {}", target);

        let mut cycles = 0u32;
        loop {
            let pose = match self.wait_for_pose().await {
                PoseWait::Ready(pose) => pose,
                PoseWait::Deadzone => return self.abandon_into_recovery("turn").await,
                PoseWait::Lost => return self.abandon_signal_lost(),
            };

            let error = shortest_angular_distance(pose.heading, target);
            if error <= tolerance {
                self.drive.stop()?;
                info!(
                    "turn: done at {} (target {}, error {:.2}°, {} cycles)",
                    pose.heading, target, error, cycles
                );
                return Ok(NavOutcome::Arrived);
            }

            let left = should_turn_left(pose.heading, target);
            let power = self.tuning.turn.speed_tiers.select(error);
            debug!(
                "turn: heading {} -> {}, error {:.2}°, {} at {:.2}",
                pose.heading,
                target,
                error,
                if left { "left" } else { "right" },
                power
            );
            self.drive.spin(left, power)?;

            cycles += 1;
            sleep(cycle).await;
        }
    }

    /// 原地转向，使车头朝向 `point`
    pub async fn turn_to_point(&mut self, point: Point) -> Result<NavOutcome> {
        self.turn_relative_to_point(point, false).await
    }

    /// 原地转向，使车尾朝向 `point`（倒车前对准）
    pub async fn turn_away_from_point(&mut self, point: Point) -> Result<NavOutcome> {
        self.turn_relative_to_point(point, true).await
    }

    async fn turn_relative_to_point(&mut self, point: Point, away: bool) -> Result<NavOutcome> {
        let pose = match self.wait_for_pose().await {
            PoseWait::Ready(pose) => pose,
            PoseWait::Deadzone => return self.abandon_into_recovery("turn").await,
            PoseWait::Lost => return self.abandon_signal_lost(),
        };

        let Some(heading) = desired_heading(pose.position, point) else {
            debug!("turn: already at {}, nothing to face", point);
            return Ok(NavOutcome::Arrived);
        };
        let heading = if away { opposite_heading(heading) } else { heading };
        self.turn_to_heading(heading).await
    }

    /// 脉冲微调
    ///
    /// 已经很接近目标航向时使用：每次以低功率转一个短脉冲、停车、静置后重读，
    /// 直到误差不大于 `turn.nudge_tolerance_deg`。脉冲次数用尽返回 `TimedOut`。
    pub async fn nudge_to_heading(&mut self, target: Deg) -> Result<NavOutcome> {
        let target = target.wrap();
        let turn = &self.tuning.turn;
        let tolerance = turn.nudge_tolerance_deg;
        let power = turn.nudge_power;
        let max_pulses = turn.nudge_max_pulses;
        let pulse = Duration::from_secs_f64(turn.nudge_pulse_s);
        let settle = Duration::from_secs_f64(turn.nudge_settle_s);

        for pulses in 0..=max_pulses {
            let pose = match self.wait_for_pose().await {
                PoseWait::Ready(pose) => pose,
                PoseWait::Deadzone => return self.abandon_into_recovery("nudge").await,
                PoseWait::Lost => return self.abandon_signal_lost(),
            };

            let error = shortest_angular_distance(pose.heading, target);
            if error <= tolerance {
                info!("nudge: done at {} after {} pulses", pose.heading, pulses);
                return Ok(NavOutcome::Arrived);
            }
            if pulses == max_pulses {
                break;
            }

            self.drive.spin(should_turn_left(pose.heading, target), power)?;
            sleep(pulse).await;
            self.drive.stop()?;
            sleep(settle).await;
        }

        info!("nudge: gave up after {} pulses", max_pulses);
        Ok(NavOutcome::TimedOut)
    }
}
