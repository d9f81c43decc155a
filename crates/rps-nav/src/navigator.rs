//! 点到点导航
//!
//! 1. 等待有效位姿
//! 2. 原地对准目标（倒车模式下车尾对准）
//! 3. 容差循环：大偏差停车重新对准，小偏差差速修正，否则按剩余距离分档直行
//! 4. 停车，可选转到末端航向

use crate::command::{NavCommand, NavOutcome, TravelMode};
use crate::error::Result;
use crate::geometry::{desired_heading, distance, opposite_heading, shortest_angular_distance, should_turn_left};
use crate::session::{NavSession, PoseWait};
use rps_hal::{DriveTrain, PoseSource};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// 差速修正时左右轮功率
///
/// `power` 为外侧轮功率，内侧轮乘以 `inside_factor`。前进时左修正的内侧轮是左轮；
/// 倒车时符号取反，左修正的内侧轮是右轮。
pub fn steering_powers(mode: TravelMode, turn_left: bool, power: f64, inside_factor: f64) -> (f64, f64) {
    let inside = power * inside_factor;
    match (mode, turn_left) {
        (TravelMode::Forward, true) => (inside, power),
        (TravelMode::Forward, false) => (power, inside),
        (TravelMode::Backward, true) => (-power, -inside),
        (TravelMode::Backward, false) => (-inside, -power),
    }
}

impl<P: PoseSource, D: DriveTrain> NavSession<P, D> {
    /// 开到目标点
    ///
    /// 传感器问题不作为错误返回：盲区时执行脱困并返回 `DeadzoneEscaped`，
    /// 持续无信号返回 `SignalLost`。只有底盘故障和非法参数返回 `Err`。
    pub async fn go_to_point(&mut self, command: &NavCommand) -> Result<NavOutcome> {
        let resolved = command.resolve(&self.tuning.navigator)?;
        let target = command.target;
        let mode = command.mode;
        info!(
            "go_to_point: target {} ({:?}, tolerance {:.2}, speed {:.2}, timeout {:?}, end heading {:?})",
            target, mode, resolved.tolerance, resolved.speed_scale, command.timeout_s, command.end_heading
        );

        // Step 1
        match self.wait_for_pose().await {
            PoseWait::Ready(_) => {}
            PoseWait::Deadzone => return self.abandon_into_recovery("go_to_point").await,
            PoseWait::Lost => return self.abandon_signal_lost(),
        }

        // Step 2
        let aligned = match mode {
            TravelMode::Forward => self.turn_to_point(target).await?,
            TravelMode::Backward => self.turn_away_from_point(target).await?,
        };
        if aligned.is_aborted() {
            return Ok(aligned);
        }

        // Step 3
        let nav = self.tuning.navigator.clone();
        let cycle = Duration::from_millis(self.tuning.timing.cycle_ms);
        let sign = mode.sign();
        // 修正时以上一次直行功率为基准
        let mut power = nav.cruise_tiers.floor * resolved.speed_scale;
        let mut iterations = 0u64;

        let outcome = loop {
            let pose = match self.wait_for_pose().await {
                PoseWait::Ready(pose) => pose,
                PoseWait::Deadzone => return self.abandon_into_recovery("go_to_point").await,
                PoseWait::Lost => return self.abandon_signal_lost(),
            };

            let remaining = distance(pose.position, target);
            if remaining <= resolved.tolerance {
                break NavOutcome::Arrived;
            }

            if let Some(max_iterations) = resolved.max_iterations {
                iterations += 1;
                if iterations as f64 > max_iterations {
                    info!("go_to_point: iteration budget used up {:.2} from target", remaining);
                    break NavOutcome::TimedOut;
                }
            }

            let Some(facing) = desired_heading(pose.position, target) else {
                break NavOutcome::Arrived;
            };
            let desired = match mode {
                TravelMode::Forward => facing,
                TravelMode::Backward => opposite_heading(facing),
            };
            let error = shortest_angular_distance(pose.heading, desired);

            if error > nav.minor_threshold_deg {
                if error >= nav.major_threshold_deg && remaining > nav.major_min_distance {
                    debug!(
                        "go_to_point: heading {} off by {:.1}° at {:.2} away, stopping to re-align",
                        pose.heading, error, remaining
                    );
                    self.drive.stop()?;
                    let realigned = self.turn_to_heading(desired).await?;
                    if realigned.is_aborted() {
                        return Ok(realigned);
                    }
                    continue;
                }

                let turn_left = should_turn_left(pose.heading, desired);
                let factor = nav.steer_tiers.select(error);
                let (left, right) = steering_powers(mode, turn_left, power, factor);
                debug!(
                    "go_to_point: at {} heading {}, correcting {} by {:.1}° ({:.3}, {:.3})",
                    pose.position,
                    pose.heading,
                    if turn_left { "left" } else { "right" },
                    error,
                    left,
                    right
                );
                self.drive.set(left, right)?;
            } else {
                // 带超时的命令多为短距离定时动作，固定低速
                power = if resolved.max_iterations.is_some() {
                    nav.timed_cruise
                } else {
                    nav.cruise_tiers.select(remaining) * resolved.speed_scale
                };
                debug!(
                    "go_to_point: at {} heading {}, {:.2} to go, straight at {:.3}",
                    pose.position, pose.heading, remaining, power
                );
                self.drive.straight(sign * power)?;
            }

            sleep(cycle).await;
        };

        // Step 4
        self.drive.stop()?;
        info!("go_to_point: {:?} near {}", outcome, target);

        if let Some(end_heading) = command.end_heading {
            sleep(Duration::from_secs_f64(nav.settle_before_end_turn_s)).await;
            let turned = self.turn_to_heading(end_heading).await?;
            if turned.is_aborted() {
                return Ok(turned);
            }
        }

        Ok(outcome)
    }
}
