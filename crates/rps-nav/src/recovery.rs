//! 盲区脱困
//!
//! 盲区内没有任何位姿反馈，只能依据缓存的最后有效位姿做开环动作：
//!
//! - 缓存的 x 明确在障碍物两侧：盲转到脱困方向，直行
//! - 其余情况（可能在障碍物正上方，或从未有过有效 x）：盲转到侧移方向，
//!   侧移一段时间绕开障碍物，再盲转到脱困方向，直行
//!
//! 直行直到读到完整有效位姿，再继续开一小段后停车，避免停在盲区边界上。
//! 直行时长有上限，始终处于盲区的位姿源也不会让调用方卡住。

use crate::cache::PoseCache;
use crate::error::Result;
use crate::geometry::{shortest_angular_distance, should_turn_left};
use crate::session::NavSession;
use rps_hal::{DriveTrain, PoseSource};
use rps_protocol::Deg;
use rps_tools::RecoveryTuning;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

/// 脱困路线
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecoveryPlan {
    /// 直接转向脱困方向
    Direct { escape: Deg },
    /// 先侧移再转向脱困方向
    Lateral { lateral: Deg, escape: Deg },
}

impl RecoveryPlan {
    pub fn escape_heading(&self) -> Deg {
        match self {
            RecoveryPlan::Direct { escape } | RecoveryPlan::Lateral { escape, .. } => *escape,
        }
    }
}

/// 脱困结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveryReport {
    pub plan: RecoveryPlan,
    /// 是否重新读到有效位姿
    pub reacquired: bool,
    /// 脱困直行耗时（不含之后的继续直行）
    pub escape_drive: Duration,
}

/// 按缓存的最后有效 x 选择脱困路线
pub fn plan_escape(cache: &PoseCache, tuning: &RecoveryTuning) -> RecoveryPlan {
    let escape = Deg(tuning.escape_heading_deg).wrap();
    match cache.x() {
        Some(x) if x < tuning.obstacle_min_x || x > tuning.obstacle_max_x => {
            RecoveryPlan::Direct { escape }
        }
        _ => RecoveryPlan::Lateral {
            lateral: Deg(tuning.lateral_heading_deg).wrap(),
            escape,
        },
    }
}

impl<P: PoseSource, D: DriveTrain> NavSession<P, D> {
    /// 执行盲区脱困
    ///
    /// 进入即置位"盲区已耗尽"标志。动作是开环的，不保证成功。
    pub async fn escape_deadzone(&mut self) -> Result<RecoveryReport> {
        self.deadzone_exhausted = true;
        self.drive.stop()?;

        let tuning = self.tuning.recovery.clone();
        let plan = plan_escape(&self.cache, &tuning);
        warn!(
            "Deadzone escape: last valid pose x={:?} y={:?} heading={:?}, plan {:?}",
            self.cache.x(),
            self.cache.y(),
            self.cache.heading(),
            plan
        );

        let start = self.cache.heading();
        match plan {
            RecoveryPlan::Direct { escape } => {
                self.blind_turn(start, escape, &tuning).await?;
            }
            RecoveryPlan::Lateral { lateral, escape } => {
                self.blind_turn(start, lateral, &tuning).await?;
                self.drive.straight(tuning.lateral_power)?;
                sleep(Duration::from_secs_f64(tuning.lateral_drive_s)).await;
                self.drive.stop()?;
                self.blind_turn(Some(lateral), escape, &tuning).await?;
            }
        }

        // 直行直到重新获得信号
        let retry = Duration::from_millis(self.tuning.timing.retry_ms);
        let limit = Duration::from_secs_f64(tuning.max_escape_drive_s);
        let started = Instant::now();
        self.drive.straight(tuning.escape_power)?;

        let reacquired = loop {
            if self.sample().is_valid() {
                break true;
            }
            if started.elapsed() >= limit {
                break false;
            }
            sleep(retry).await;
        };
        let escape_drive = started.elapsed();

        if reacquired {
            debug!("Deadzone escape: RPS back after {:?}", escape_drive);
            sleep(Duration::from_secs_f64(tuning.escape_settle_s)).await;
        } else {
            warn!("Deadzone escape: no RPS after {:?}, stopping", escape_drive);
        }
        self.drive.stop()?;

        info!("Deadzone escape finished (reacquired: {})", reacquired);
        Ok(RecoveryReport {
            plan,
            reacquired,
            escape_drive,
        })
    }

    /// 按时间盲转：时长 = 夹角 × `seconds_per_degree`
    ///
    /// 起始航向未知时不转。
    async fn blind_turn(&mut self, from: Option<Deg>, to: Deg, tuning: &RecoveryTuning) -> Result<()> {
        let Some(from) = from else {
            warn!("Blind turn to {} skipped: heading never observed", to);
            return Ok(());
        };

        let angle = shortest_angular_distance(from, to);
        if angle == 0.0 {
            return Ok(());
        }

        let left = should_turn_left(from, to);
        let duration = Duration::from_secs_f64(angle * tuning.seconds_per_degree);
        debug!(
            "Blind turn {} -> {} ({:.1}° {}, {:?})",
            from,
            to,
            angle,
            if left { "left" } else { "right" },
            duration
        );

        self.drive.spin(left, tuning.blind_turn_power)?;
        sleep(duration).await;
        self.drive.stop()?;
        Ok(())
    }
}
