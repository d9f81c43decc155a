//! 集成测试公共设施

#![allow(dead_code)]

use rps_hal::sim::{SimCourse, SimDrive, SimParams, SimPoseSource};
use rps_nav::NavSession;
use rps_protocol::{Point, Pose};
use rps_tools::NavTuning;

/// 盲转标定与仿真底盘一致的调参
pub fn tuning_for(course: &SimCourse) -> NavTuning {
    let mut tuning = NavTuning::default();
    let spin_percent = tuning.recovery.blind_turn_power * tuning.drive.left_max_percent;
    tuning.recovery.seconds_per_degree = course.seconds_per_degree(spin_percent);
    tuning
}

pub fn sim_session(course: &SimCourse) -> NavSession<SimPoseSource, SimDrive> {
    NavSession::new(course.pose_source(), course.drive(), tuning_for(course))
        .expect("default tuning is valid")
}

pub fn course_at(pose: Pose) -> SimCourse {
    SimCourse::new(SimParams::default().with_initial_pose(pose))
}

pub fn distance_to(pose: Pose, target: Point) -> f64 {
    (pose.x() - target.x).hypot(pose.y() - target.y)
}
