//! 导航会话
//!
//! 会话持有一次比赛/任务期间的全部可变状态：位姿源、底盘、位姿缓存和
//! "盲区已耗尽"标志。所有转向、导航、脱困操作都是会话上的方法，
//! 状态只有这一个写入者。
//!
//! ```rust,ignore
//! let mut session = NavSession::new(source, drive, NavTuning::default())?;
//! let outcome = session.go_to_point(&NavCommand::new(Point::new(10.0, 10.0))).await?;
//! if session.deadzone_exhausted() {
//!     // 后续依赖实时位姿的命令应跳过
//! }
//! ```

use crate::cache::PoseCache;
use crate::command::NavOutcome;
use crate::drive::Drive;
use crate::error::Result;
use crate::geometry::tracker_to_centroid;
use rps_hal::{DriveTrain, PoseSource};
use rps_protocol::{Pose, PoseSample};
use rps_tools::NavTuning;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

/// 等待有效位姿的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PoseWait {
    Ready(Pose),
    Deadzone,
    Lost,
}

/// 导航会话
#[derive(Debug)]
pub struct NavSession<P, D> {
    pub(crate) source: P,
    pub(crate) drive: Drive<D>,
    pub(crate) cache: PoseCache,
    pub(crate) tuning: NavTuning,
    pub(crate) deadzone_exhausted: bool,
}

impl<P: PoseSource, D: DriveTrain> NavSession<P, D> {
    /// 创建会话（校验调参）
    pub fn new(source: P, drive: D, tuning: NavTuning) -> Result<Self> {
        tuning.validate()?;
        Ok(Self {
            drive: Drive::new(drive, &tuning.drive),
            source,
            cache: PoseCache::new(),
            tuning,
            deadzone_exhausted: false,
        })
    }

    pub fn tuning(&self) -> &NavTuning {
        &self.tuning
    }

    pub fn cache(&self) -> &PoseCache {
        &self.cache
    }

    /// 是否已经进入过盲区脱困（置位后永不清除）
    pub fn deadzone_exhausted(&self) -> bool {
        self.deadzone_exhausted
    }

    pub fn drive(&self) -> &Drive<D> {
        &self.drive
    }

    pub fn drive_mut(&mut self) -> &mut Drive<D> {
        &mut self.drive
    }

    pub fn source_mut(&mut self) -> &mut P {
        &mut self.source
    }

    pub fn into_parts(self) -> (P, D) {
        (self.source, self.drive.into_inner())
    }

    /// 停车
    pub fn stop(&mut self) -> Result<()> {
        self.drive.stop()
    }

    /// 读一帧并刷新缓存
    ///
    /// 有效位姿会换算到底盘中心。
    pub fn sample(&mut self) -> PoseSample {
        let reading = self.source.read();
        self.cache.update(&reading);
        match reading.classify() {
            PoseSample::Valid(pose) => {
                PoseSample::Valid(tracker_to_centroid(pose, self.tuning.pose.tracker_offset))
            }
            other => other,
        }
    }

    /// 等待有效位姿
    ///
    /// 无信号时保持当前电机输出并重试；盲区立即返回；持续无信号超过
    /// `no_signal_patience_s` 返回 `Lost`。
    pub(crate) async fn wait_for_pose(&mut self) -> PoseWait {
        let started = Instant::now();
        let patience = Duration::from_secs_f64(self.tuning.timing.no_signal_patience_s);
        let retry = Duration::from_millis(self.tuning.timing.retry_ms);
        let mut retries = 0u32;

        loop {
            match self.sample() {
                PoseSample::Valid(pose) => {
                    if retries > 0 {
                        debug!("RPS signal back after {} retries", retries);
                    }
                    return PoseWait::Ready(pose);
                }
                PoseSample::Deadzone => return PoseWait::Deadzone,
                PoseSample::NoSignal => {
                    if started.elapsed() >= patience {
                        warn!(
                            "No RPS signal for {:.1}s, giving up on current command",
                            patience.as_secs_f64()
                        );
                        return PoseWait::Lost;
                    }
                    retries += 1;
                    sleep(retry).await;
                }
            }
        }
    }

    /// 失去信号：停车并报告
    pub(crate) fn abandon_signal_lost(&mut self) -> Result<NavOutcome> {
        self.drive.stop()?;
        Ok(NavOutcome::SignalLost)
    }

    /// 盲区：执行脱困并放弃当前命令
    pub(crate) async fn abandon_into_recovery(&mut self, during: &str) -> Result<NavOutcome> {
        warn!("Deadzone detected during {}, escaping blind", during);
        let report = self.escape_deadzone().await?;
        Ok(NavOutcome::DeadzoneEscaped(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rps_hal::mock::{RecordingDrive, ScriptedPoseSource};
    use rps_protocol::{Deg, NO_SIGNAL, PoseReading};

    fn session(readings: Vec<PoseReading>) -> NavSession<ScriptedPoseSource, RecordingDrive> {
        NavSession::new(
            ScriptedPoseSource::new(readings),
            RecordingDrive::new(),
            NavTuning::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_tuning() {
        let mut tuning = NavTuning::default();
        tuning.timing.cycle_ms = 0;
        let result = NavSession::new(
            ScriptedPoseSource::constant(PoseReading::no_signal()),
            RecordingDrive::new(),
            tuning,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_sample_applies_tracker_offset() {
        let mut session = session(vec![PoseReading::new(10.0, 10.0, 0.0)]);
        session.tuning.pose.tracker_offset = 1.5;

        let pose = session.sample().pose().unwrap();
        assert_eq!(pose, Pose::new(11.5, 10.0, Deg(0.0)));
        // 缓存保存原始读数
        assert_eq!(session.cache().x(), Some(10.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_retries_through_no_signal() {
        let mut session = session(vec![
            PoseReading::no_signal(),
            PoseReading::new(1.0, NO_SIGNAL, 0.0),
            PoseReading::new(1.0, 2.0, 0.0),
        ]);
        let wait = session.wait_for_pose().await;
        assert_eq!(wait, PoseWait::Ready(Pose::new(1.0, 2.0, Deg(0.0))));
        assert_eq!(session.source.reads(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_on_deadzone_without_waiting() {
        let mut session = session(vec![PoseReading::deadzone()]);
        let started = Instant::now();
        assert_eq!(session.wait_for_pose().await, PoseWait::Deadzone);
        assert_eq!(started.elapsed(), Duration::ZERO);
        // 盲区检测本身不置位标志
        assert!(!session.deadzone_exhausted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_gives_up_after_patience() {
        let mut session = NavSession::new(
            ScriptedPoseSource::constant(PoseReading::no_signal()),
            RecordingDrive::new(),
            NavTuning::default(),
        )
        .unwrap();
        session.tuning.timing.no_signal_patience_s = 1.0;

        let started = Instant::now();
        assert_eq!(session.wait_for_pose().await, PoseWait::Lost);
        assert!(started.elapsed() >= Duration::from_secs(1));
        assert!(!session.deadzone_exhausted());
    }
}
