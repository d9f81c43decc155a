//! 强类型角度单位
//!
//! RPS 以"度"报告航向：0° 指向东，逆时针递增（北 = 90°）。
//! 使用 NewType 模式把航向与普通浮点数（坐标、速度百分比）区分开。
//!
//! # 示例
//!
//! ```rust
//! use rps_protocol::Deg;
//!
//! let heading = Deg(370.0).wrap();
//! assert!((heading.0 - 10.0).abs() < 1e-9);
//!
//! let reversed = Deg(90.0).opposite();
//! assert_eq!(reversed, Deg(270.0));
//! ```

use std::fmt;
use std::ops::{Add, Neg, Sub};

/// 角度（NewType）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Deg(pub f64);

impl Deg {
    /// 东（0°）
    pub const EAST: Self = Deg(0.0);

    /// 北（90°）
    pub const NORTH: Self = Deg(90.0);

    /// 西（180°）
    pub const WEST: Self = Deg(180.0);

    /// 南（270°）
    pub const SOUTH: Self = Deg(270.0);

    /// 创建新的角度值
    #[inline]
    pub const fn new(value: f64) -> Self {
        Deg(value)
    }

    /// 获取原始值
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// 转换为弧度
    #[inline]
    pub fn to_radians(self) -> f64 {
        self.0.to_radians()
    }

    /// 从弧度构造
    #[inline]
    pub fn from_radians(rad: f64) -> Self {
        Deg(rad.to_degrees())
    }

    /// 取绝对值
    #[inline]
    pub fn abs(self) -> Self {
        Deg(self.0.abs())
    }

    /// 归一化到 [0, 360) 范围（航向表示）
    pub fn wrap(self) -> Self {
        let angle = self.0.rem_euclid(360.0);
        // rem_euclid 对极小的负数可能返回 360.0
        if angle >= 360.0 { Deg(0.0) } else { Deg(angle) }
    }

    /// 反方向航向：`(h + 180) mod 360`
    #[inline]
    pub fn opposite(self) -> Self {
        Deg(self.0 + 180.0).wrap()
    }
}

impl fmt::Display for Deg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}°", self.0)
    }
}

impl Add for Deg {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Deg(self.0 + rhs.0)
    }
}

impl Sub for Deg {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Deg(self.0 - rhs.0)
    }
}

impl Neg for Deg {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Deg(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deg_wrap() {
        assert_eq!(Deg(0.0).wrap(), Deg(0.0));
        assert_eq!(Deg(360.0).wrap(), Deg(0.0));
        assert_eq!(Deg(-90.0).wrap(), Deg(270.0));
        assert_eq!(Deg(725.0).wrap(), Deg(5.0));
    }

    #[test]
    fn test_deg_wrap_tiny_negative() {
        let wrapped = Deg(-1e-18).wrap();
        assert!(wrapped.0 >= 0.0 && wrapped.0 < 360.0);
    }

    #[test]
    fn test_deg_opposite() {
        assert_eq!(Deg(0.0).opposite(), Deg(180.0));
        assert_eq!(Deg(270.0).opposite(), Deg(90.0));
        assert_eq!(Deg(200.0).opposite(), Deg(20.0));
    }

    #[test]
    fn test_deg_radians() {
        let d = Deg::from_radians(std::f64::consts::FRAC_PI_2);
        assert!((d.0 - 90.0).abs() < 1e-10);
        assert!((Deg(180.0).to_radians() - std::f64::consts::PI).abs() < 1e-10);
    }

    #[test]
    fn test_deg_operations() {
        assert_eq!(Deg(90.0) + Deg(45.0), Deg(135.0));
        assert_eq!(Deg(90.0) - Deg(45.0), Deg(45.0));
        assert_eq!(-Deg(30.0), Deg(-30.0));
    }

    #[test]
    fn test_deg_display() {
        assert_eq!(format!("{}", Deg(12.345)), "12.35°");
    }
}
