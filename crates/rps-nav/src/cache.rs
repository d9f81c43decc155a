//! 最近有效位姿缓存
//!
//! 三个分量各自独立更新：某个分量不是哨兵值就覆盖，否则保留旧值。
//! 缓存从不清空，盲区脱困依赖它判断机器人大致在哪。

use rps_protocol::{Deg, Pose, PoseReading, is_sentinel};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PoseCache {
    x: Option<f64>,
    y: Option<f64>,
    heading: Option<Deg>,
}

impl PoseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用一次原始读数刷新
    pub fn update(&mut self, reading: &PoseReading) {
        if !is_sentinel(reading.x) {
            self.x = Some(reading.x);
        }
        if !is_sentinel(reading.y) {
            self.y = Some(reading.y);
        }
        if !is_sentinel(reading.heading) {
            self.heading = Some(Deg(reading.heading).wrap());
        }
    }

    pub fn x(&self) -> Option<f64> {
        self.x
    }

    pub fn y(&self) -> Option<f64> {
        self.y
    }

    pub fn heading(&self) -> Option<Deg> {
        self.heading
    }

    /// 三个分量都有值时组成位姿
    pub fn pose(&self) -> Option<Pose> {
        Some(Pose::new(self.x?, self.y?, self.heading?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rps_protocol::{DEADZONE, NO_SIGNAL};

    #[test]
    fn test_components_update_independently() {
        let mut cache = PoseCache::new();
        assert_eq!(cache.pose(), None);

        cache.update(&PoseReading::new(5.0, NO_SIGNAL, 90.0));
        assert_eq!(cache.x(), Some(5.0));
        assert_eq!(cache.y(), None);
        assert_eq!(cache.heading(), Some(Deg(90.0)));

        cache.update(&PoseReading::new(DEADZONE, 7.0, DEADZONE));
        assert_eq!(cache.x(), Some(5.0));
        assert_eq!(cache.y(), Some(7.0));
        assert_eq!(cache.pose(), Some(Pose::new(5.0, 7.0, Deg(90.0))));
    }

    #[test]
    fn test_sentinel_readings_never_clear() {
        let mut cache = PoseCache::new();
        cache.update(&PoseReading::new(1.0, 2.0, 3.0));
        cache.update(&PoseReading::no_signal());
        cache.update(&PoseReading::deadzone());
        assert_eq!(cache.pose(), Some(Pose::new(1.0, 2.0, Deg(3.0))));
    }
}
