//! 命令定义和实现

pub mod config;
pub mod goto;
pub mod run;
pub mod turn;

pub use config::{ConfigCommand, ConfigPaths};
pub use goto::GotoCommand;
pub use run::RunCommand;
pub use turn::TurnCommand;
