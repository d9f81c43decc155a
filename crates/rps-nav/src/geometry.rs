//! 场地几何
//!
//! 航向约定：0° 指向东，逆时针递增，北为 90°。

use rps_protocol::{Deg, Point, Pose};

/// 两点间欧氏距离
pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// 从 `from` 指向 `to` 的航向
///
/// 按象限计算（基准 0/90/180/270 加 0–90° 的反正切），边界归属：
///
/// | 条件 | 范围 |
/// |------|------|
/// | `dx > 0 && dy > 0` | [0, 90) |
/// | `dx <= 0 && dy > 0` | [90, 180) |
/// | `dx <= 0 && dy <= 0` | [180, 270] |
/// | 其余 | (270, 360) |
///
/// 两点重合时航向无定义，返回 `None`。
pub fn desired_heading(from: Point, to: Point) -> Option<Deg> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;

    if dx == 0.0 && dy == 0.0 {
        return None;
    }

    let heading = if dx > 0.0 && dy > 0.0 {
        (dy.abs() / dx.abs()).atan().to_degrees()
    } else if dx <= 0.0 && dy > 0.0 {
        90.0 + (dx.abs() / dy.abs()).atan().to_degrees()
    } else if dx <= 0.0 && dy <= 0.0 {
        180.0 + (dy.abs() / dx.abs()).atan().to_degrees()
    } else {
        270.0 + (dx.abs() / dy.abs()).atan().to_degrees()
    };

    Some(Deg(heading).wrap())
}

/// 两个航向之间的最小夹角，[0, 180]
pub fn shortest_angular_distance(a: Deg, b: Deg) -> f64 {
    let diff = (a.0 - b.0).rem_euclid(360.0);
    diff.min(360.0 - diff)
}

/// 从 `current` 转到 `target` 是否应左转（逆时针）
///
/// 逆时针代价不大于顺时针代价时左转，相差 180° 时两者相等，取左转。
pub fn should_turn_left(current: Deg, target: Deg) -> bool {
    let ccw = (target.0 - current.0).rem_euclid(360.0);
    let cw = (current.0 - target.0).rem_euclid(360.0);
    ccw <= cw
}

/// 反向航向
#[inline]
pub fn opposite_heading(heading: Deg) -> Deg {
    heading.opposite()
}

/// 定位标签位置换算到底盘中心
///
/// 位置沿航向平移 `offset`（标签装在中心后方时为正），航向不变。
pub fn tracker_to_centroid(pose: Pose, offset: f64) -> Pose {
    if offset == 0.0 {
        return pose;
    }
    let rad = pose.heading.to_radians();
    Pose::new(
        pose.x() + offset * rad.cos(),
        pose.y() + offset * rad.sin(),
        pose.heading,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_desired_heading_axes() {
        let origin = p(0.0, 0.0);
        assert_relative_eq!(desired_heading(origin, p(1.0, 0.0)).unwrap().0, 0.0);
        assert_relative_eq!(desired_heading(origin, p(0.0, 1.0)).unwrap().0, 90.0);
        assert_relative_eq!(desired_heading(origin, p(-1.0, 0.0)).unwrap().0, 180.0);
        assert_relative_eq!(desired_heading(origin, p(0.0, -1.0)).unwrap().0, 270.0);
    }

    #[test]
    fn test_desired_heading_diagonals() {
        let origin = p(0.0, 0.0);
        assert_relative_eq!(desired_heading(origin, p(10.0, 10.0)).unwrap().0, 45.0, epsilon = 1e-9);
        assert_relative_eq!(desired_heading(origin, p(-3.0, 3.0)).unwrap().0, 135.0, epsilon = 1e-9);
        assert_relative_eq!(desired_heading(origin, p(-2.0, -2.0)).unwrap().0, 225.0, epsilon = 1e-9);
        assert_relative_eq!(desired_heading(origin, p(5.0, -5.0)).unwrap().0, 315.0, epsilon = 1e-9);
    }

    #[test]
    fn test_desired_heading_coincident_points() {
        assert_eq!(desired_heading(p(4.0, 4.0), p(4.0, 4.0)), None);
    }

    #[test]
    fn test_shortest_angular_distance_wraps() {
        assert_relative_eq!(shortest_angular_distance(Deg(10.0), Deg(350.0)), 20.0);
        assert_relative_eq!(shortest_angular_distance(Deg(0.0), Deg(180.0)), 180.0);
        assert_relative_eq!(shortest_angular_distance(Deg(90.0), Deg(90.0)), 0.0);
    }

    #[test]
    fn test_should_turn_left() {
        // 10° -> 350° 顺时针 20°
        assert!(!should_turn_left(Deg(10.0), Deg(350.0)));
        assert!(should_turn_left(Deg(350.0), Deg(10.0)));
        assert!(should_turn_left(Deg(0.0), Deg(90.0)));
        assert!(!should_turn_left(Deg(90.0), Deg(0.0)));
        // 相差 180° 时取左转
        assert!(should_turn_left(Deg(0.0), Deg(180.0)));
        assert!(should_turn_left(Deg(180.0), Deg(0.0)));
    }

    #[test]
    fn test_opposite_heading() {
        assert_eq!(opposite_heading(Deg(90.0)), Deg(270.0));
        assert_eq!(opposite_heading(Deg(270.0)), Deg(90.0));
        assert_eq!(opposite_heading(Deg(180.0)), Deg(0.0));
    }

    #[test]
    fn test_tracker_to_centroid() {
        let pose = Pose::new(10.0, 10.0, Deg(90.0));
        let centroid = tracker_to_centroid(pose, -2.0);
        assert_relative_eq!(centroid.x(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(centroid.y(), 8.0, epsilon = 1e-9);
        assert_eq!(centroid.heading, Deg(90.0));

        assert_eq!(tracker_to_centroid(pose, 0.0), pose);
    }
}
