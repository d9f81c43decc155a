//! 几何工具的属性测试
//!
//! 使用 proptest 验证航向计算的数学性质。

use proptest::prelude::*;
use rps_nav::geometry::{
    desired_heading, distance, opposite_heading, shortest_angular_distance, should_turn_left,
};
use rps_protocol::{Deg, Point};

fn heading() -> impl Strategy<Value = Deg> {
    (0.0..360.0f64).prop_map(Deg)
}

fn point() -> impl Strategy<Value = Point> {
    (-100.0..100.0f64, -100.0..100.0f64).prop_map(|(x, y)| Point::new(x, y))
}

proptest! {
    /// 夹角对称
    #[test]
    fn angular_distance_symmetric(a in heading(), b in heading()) {
        let ab = shortest_angular_distance(a, b);
        let ba = shortest_angular_distance(b, a);
        prop_assert!((ab - ba).abs() < 1e-9);
    }

    /// 与自身夹角为 0
    #[test]
    fn angular_distance_to_self_is_zero(h in heading()) {
        prop_assert_eq!(shortest_angular_distance(h, h), 0.0);
    }

    /// 夹角不超过 180°
    #[test]
    fn angular_distance_bounded(a in heading(), b in heading()) {
        let d = shortest_angular_distance(a, b);
        prop_assert!((0.0..=180.0).contains(&d));
    }

    /// 转向方向反对称（相差 180° 或重合时两向代价相等，除外）
    #[test]
    fn turn_direction_antisymmetric(a in heading(), b in heading()) {
        let d = shortest_angular_distance(a, b);
        prop_assume!(d > 1e-6 && (180.0 - d) > 1e-6);
        prop_assert_eq!(should_turn_left(a, b), !should_turn_left(b, a));
    }

    /// 选择的方向代价就是最小夹角
    #[test]
    fn turn_direction_takes_short_way(a in heading(), b in heading()) {
        let d = shortest_angular_distance(a, b);
        let cost = if should_turn_left(a, b) {
            (b.0 - a.0).rem_euclid(360.0)
        } else {
            (a.0 - b.0).rem_euclid(360.0)
        };
        prop_assert!((cost - d).abs() < 1e-9 || (cost - d - 360.0).abs() < 1e-9);
    }

    /// 正反两个方向的期望航向互为反向
    #[test]
    fn desired_heading_reverses(p1 in point(), p2 in point()) {
        prop_assume!(distance(p1, p2) > 1e-6);
        let forward = desired_heading(p1, p2).unwrap();
        let backward = desired_heading(p2, p1).unwrap();
        prop_assert!(shortest_angular_distance(opposite_heading(forward), backward) < 1e-9);
    }

    /// 期望航向在 [0, 360) 内，且确实指向目标
    #[test]
    fn desired_heading_points_at_target(p1 in point(), p2 in point()) {
        prop_assume!(distance(p1, p2) > 1e-6);
        let h = desired_heading(p1, p2).unwrap();
        prop_assert!((0.0..360.0).contains(&h.0));

        let rad = h.to_radians();
        let d = distance(p1, p2);
        prop_assert!((p1.x + d * rad.cos() - p2.x).abs() < 1e-6);
        prop_assert!((p1.y + d * rad.sin() - p2.y).abs() < 1e-6);
    }

    /// 反向两次回到原航向
    #[test]
    fn opposite_is_involution(h in heading()) {
        let back = opposite_heading(opposite_heading(h));
        prop_assert!(shortest_angular_distance(back, h) < 1e-9);
    }
}
