//! 输出格式化工具

use rps_nav::{NavOutcome, RecoveryPlan};

/// 单行描述导航结果
pub fn describe_outcome(outcome: &NavOutcome) -> String {
    match outcome {
        NavOutcome::Arrived => "✅ 到达".to_string(),
        NavOutcome::TimedOut => "⏱️  超时，停在目标附近".to_string(),
        NavOutcome::SignalLost => "📡 长时间无 RPS 信号，已停车".to_string(),
        NavOutcome::DeadzoneEscaped(report) => {
            let plan = match report.plan {
                RecoveryPlan::Direct { escape } => format!("直接转向 {}", escape),
                RecoveryPlan::Lateral { lateral, escape } => {
                    format!("侧移 {} 后转向 {}", lateral, escape)
                }
            };
            let reacquired = if report.reacquired {
                "已重新获得信号"
            } else {
                "仍无信号"
            };
            format!(
                "⚠️  进入盲区，{}，直行 {:.2} 秒，{}",
                plan,
                report.escape_drive.as_secs_f64(),
                reacquired
            )
        }
    }
}
