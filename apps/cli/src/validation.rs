//! 输入验证模块
//!
//! 逗号分隔的坐标参数解析，供 clap `value_parser` 使用

use anyhow::{Context, Result};
use rps_hal::sim::Zone;
use rps_protocol::{Deg, Point, Pose};

/// 解析固定个数的逗号分隔数值
///
/// # 错误
/// 如果：
/// - 数值个数不对
/// - 任何数值无法解析
/// - 数值为 NaN 或无穷大
fn parse_floats<const N: usize>(input: &str, what: &str) -> Result<[f64; N]> {
    let values: Vec<f64> = input
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("解析{}失败: {}", what, input))?;

    let values: [f64; N] = values
        .try_into()
        .map_err(|v: Vec<f64>| anyhow::anyhow!("{}需要 {} 个数值，得到 {} 个", what, N, v.len()))?;

    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        anyhow::bail!("{}包含无效数值: {}", what, bad);
    }
    Ok(values)
}

/// `x,y`
pub fn parse_point(input: &str) -> Result<Point> {
    let [x, y] = parse_floats(input, "坐标")?;
    Ok(Point::new(x, y))
}

/// `x,y,heading`（航向单位为度）
pub fn parse_pose(input: &str) -> Result<Pose> {
    let [x, y, heading] = parse_floats(input, "位姿")?;
    Ok(Pose::new(x, y, Deg(heading)))
}

/// `min_x,min_y,max_x,max_y`
pub fn parse_zone(input: &str) -> Result<Zone> {
    let [x1, y1, x2, y2] = parse_floats(input, "盲区")?;
    Ok(Zone::new(x1, y1, x2, y2))
}

/// 航向（度），任意实数，归一化到 [0, 360)
pub fn parse_heading(input: &str) -> Result<Deg> {
    let [heading] = parse_floats(input, "航向")?;
    Ok(Deg(heading).wrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("1.5, -2").unwrap(), Point::new(1.5, -2.0));
        assert!(parse_point("1").is_err());
        assert!(parse_point("1,2,3").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn test_parse_pose_wraps_heading() {
        let pose = parse_pose("10,20,-90").unwrap();
        assert_eq!(pose.position, Point::new(10.0, 20.0));
        assert_eq!(pose.heading, Deg(270.0));
    }

    #[test]
    fn test_parse_zone_normalizes_corners() {
        let zone = parse_zone("18,50,12,30").unwrap();
        assert!(zone.contains(15.0, 40.0));
        assert!(!zone.contains(20.0, 40.0));
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(parse_point("NaN,1").is_err());
        assert!(parse_heading("inf").is_err());
    }

    #[test]
    fn test_parse_heading() {
        assert_eq!(parse_heading("450").unwrap(), Deg(90.0));
    }
}
