//! 差速底盘运动学

/// 仿真底盘的物理状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffDriveState {
    /// X 坐标（英寸）
    pub x: f64,
    /// Y 坐标（英寸）
    pub y: f64,
    /// 朝向（弧度，从 +X 逆时针）
    pub theta: f64,
}

/// 底盘几何与速度参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveGeometry {
    /// 电机 100% 时的轮速（英寸/秒）
    pub full_speed: f64,
    /// 轮距（英寸）
    pub wheel_base: f64,
}

impl DriveGeometry {
    /// 左右电机百分比 -> (线速度, 角速度)
    pub fn body_velocity(&self, left_percent: f64, right_percent: f64) -> (f64, f64) {
        let v_left = self.full_speed * left_percent / 100.0;
        let v_right = self.full_speed * right_percent / 100.0;
        let linear = (v_left + v_right) / 2.0;
        let angular = (v_right - v_left) / self.wheel_base;
        (linear, angular)
    }

    /// 原地旋转时的角速度（度/秒），两侧电机为 ±`spin_percent`
    pub fn spin_rate_deg(&self, spin_percent: f64) -> f64 {
        let (_, angular) = self.body_velocity(-spin_percent, spin_percent);
        angular.abs().to_degrees()
    }
}

impl DiffDriveState {
    /// 按恒定速度积分 `dt` 秒（直线或圆弧精确解）
    pub fn integrate(&mut self, linear: f64, angular: f64, dt: f64) {
        if dt <= 0.0 {
            return;
        }

        if angular.abs() < 1e-9 {
            self.x += linear * self.theta.cos() * dt;
            self.y += linear * self.theta.sin() * dt;
        } else {
            let r = linear / angular;
            let new_theta = self.theta + angular * dt;
            self.x += r * (new_theta.sin() - self.theta.sin());
            self.y += r * (self.theta.cos() - new_theta.cos());
            self.theta = new_theta;
        }

        self.theta = self.theta.rem_euclid(std::f64::consts::TAU);
    }
}
