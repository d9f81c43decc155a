//! 配置管理命令
//!
//! 调参文件 `tuning.toml` 与场地标定文件 `calibration.toml`，
//! 默认位于用户配置目录下的 `rps-nav/`

use anyhow::{Context, Result};
use clap::Subcommand;
use rps_protocol::Point;
use rps_tools::{CalibrationTarget, CourseCalibration, NavTuning};
use std::fs;
use std::path::{Path, PathBuf};

/// 配置文件位置
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    dir: PathBuf,
}

impl ConfigPaths {
    /// 使用指定目录，未指定时使用用户配置目录
    pub fn resolve(dir: Option<PathBuf>) -> Result<Self> {
        let dir = match dir {
            Some(dir) => dir,
            None => {
                let mut path =
                    dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;
                path.push("rps-nav");
                path
            }
        };
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn tuning_file(&self) -> PathBuf {
        self.dir.join("tuning.toml")
    }

    pub fn calibration_file(&self) -> PathBuf {
        self.dir.join("calibration.toml")
    }

    /// 加载调参，文件不存在时使用默认值
    pub fn load_tuning(&self) -> Result<NavTuning> {
        let path = self.tuning_file();
        if !path.exists() {
            return Ok(NavTuning::default());
        }
        NavTuning::load_from_file(&path)
            .with_context(|| format!("加载调参文件失败: {}", path.display()))
    }

    /// 加载标定，文件不存在时为空
    pub fn load_calibration(&self) -> Result<CourseCalibration> {
        let path = self.calibration_file();
        if !path.exists() {
            return Ok(CourseCalibration::default());
        }
        CourseCalibration::load_from_file(&path)
            .with_context(|| format!("加载标定文件失败: {}", path.display()))
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).context("创建配置目录失败")
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 显示生效的调参（TOML）
    Show,

    /// 写入默认调参文件
    Init {
        /// 覆盖已有文件
        #[arg(long)]
        force: bool,
    },

    /// 检查调参与标定
    Check,

    /// 手动标定一个任务点
    SetTarget {
        /// 目标名称（token、ddr_blue_light、rps_button、foosball_start、foosball_end、lever）
        target: CalibrationTarget,

        x: f64,

        y: f64,
    },
}

impl ConfigCommand {
    pub fn execute(self, paths: &ConfigPaths) -> Result<()> {
        match self {
            ConfigCommand::Show => Self::show_(paths),

            ConfigCommand::Init { force } => Self::init_(paths, force),

            ConfigCommand::Check => Self::check_(paths),

            ConfigCommand::SetTarget { target, x, y } => Self::set_target_(paths, target, x, y),
        }
    }

    fn show_(paths: &ConfigPaths) -> Result<()> {
        let tuning = paths.load_tuning()?;
        print!("{}", tuning.to_toml()?);
        Ok(())
    }

    fn init_(paths: &ConfigPaths, force: bool) -> Result<()> {
        let path = paths.tuning_file();
        if path.exists() && !force {
            anyhow::bail!("{} 已存在，使用 --force 覆盖", path.display());
        }

        paths.ensure_dir()?;
        NavTuning::default()
            .save_to_file(&path)
            .context("写入调参文件失败")?;
        println!("✅ 已写入默认调参: {}", path.display());
        Ok(())
    }

    fn check_(paths: &ConfigPaths) -> Result<()> {
        println!("配置目录: {}", paths.dir().display());

        // load_tuning 内部已校验
        paths.load_tuning()?;
        let tuning_file = paths.tuning_file();
        if tuning_file.exists() {
            println!("  调参: {} ✅", tuning_file.display());
        } else {
            println!("  调参: (默认值)");
        }

        let calibration = paths.load_calibration()?;
        let missing = calibration.missing();
        if missing.is_empty() {
            println!("  标定: 全部完成 ✅");
        } else {
            let names: Vec<&str> = missing.iter().map(|t| t.name()).collect();
            println!("  标定: 缺少 {}", names.join(", "));
        }

        Ok(())
    }

    fn set_target_(paths: &ConfigPaths, target: CalibrationTarget, x: f64, y: f64) -> Result<()> {
        if !x.is_finite() || !y.is_finite() {
            anyhow::bail!("坐标无效: ({}, {})", x, y);
        }

        let mut calibration = paths.load_calibration()?;
        calibration.set(target, Point::new(x, y));

        paths.ensure_dir()?;
        calibration
            .save_to_file(paths.calibration_file())
            .context("写入标定文件失败")?;
        println!("✅ {} = {}", target, Point::new(x, y));
        Ok(())
    }
}
