//! # RPS CLI
//!
//! 在仿真场地上运行 RPS 点到点导航。
//!
//! ```bash
//! # 写入默认调参
//! rps-cli config init
//!
//! # 从 (0,0) 朝东出发，开到 (10,10)，到达后朝北
//! rps-cli goto 10,10 --heading 90
//!
//! # 路上有盲区
//! rps-cli goto 30,40 --start 2,40,0 --deadzone 12,30,18,50
//!
//! # 执行任务文件
//! rps-cli run mission.json --start 6,6,90
//! ```
//!
//! 默认使用虚拟时钟，仿真瞬间完成；`--realtime` 按墙钟运行。

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod course;
mod script;
mod utils;
mod validation;

use commands::{ConfigCommand, ConfigPaths, GotoCommand, RunCommand, TurnCommand};

/// RPS CLI - 点到点导航命令行工具
#[derive(Parser, Debug)]
#[command(name = "rps-cli")]
#[command(about = "RPS point navigation on a simulated course", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置目录（默认为用户配置目录下的 rps-nav）
    #[arg(long, global = true, env = "RPS_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// 按墙钟运行仿真
    #[arg(long, global = true)]
    realtime: bool,

    /// 输出每个控制周期的调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 开到目标点
    Goto {
        #[command(flatten)]
        args: GotoCommand,
    },

    /// 原地转向
    Turn {
        #[command(flatten)]
        args: TurnCommand,
    },

    /// 执行任务文件
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志（输出到 stderr，stdout 留给结果）
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("rps_cli={level}").parse()?)
                .add_directive(format!("rps_nav={level}").parse()?),
        )
        .init();

    let paths = ConfigPaths::resolve(cli.config_dir)?;

    match cli.command {
        Commands::Config(cmd) => cmd.execute(&paths),

        Commands::Goto { args } => build_runtime(cli.realtime)?.block_on(args.execute(&paths)),

        Commands::Turn { args } => build_runtime(cli.realtime)?.block_on(args.execute(&paths)),

        Commands::Run { args } => build_runtime(cli.realtime)?.block_on(args.execute(&paths)),
    }
}

/// 单线程运行时；非 realtime 时时钟暂停，`sleep` 立即推进虚拟时间
fn build_runtime(realtime: bool) -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(!realtime)
        .build()
        .context("创建 tokio 运行时失败")
}
