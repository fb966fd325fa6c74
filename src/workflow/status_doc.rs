//! Initial `TASK_STATUS.md` template.

use std::fmt::Write;

use chrono::NaiveDate;

use super::descriptor::WorkflowConfig;

const LEGEND: &str = "状态图例: ⬜ 待开始 | 🔄 进行中 | ✅ 已完成 | ⏸️ 暂停 | ❌ 已取消 | 🔀 已拆分";

/// Render the status document for a fresh lifecycle.
///
/// One all-zero progress row per phase in declaration order, then the totals
/// row, the empty task table, the legend, and the issues / decisions /
/// handoffs sections in that order.
pub fn render_status(config: &WorkflowConfig, created: NaiveDate) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# 任务状态跟踪");
    let _ = writeln!(out);
    let _ = writeln!(out, "> 创建时间: {}", created.format("%Y-%m-%d"));
    let _ = writeln!(out, "> 任务类型: {}", config.primary_type);
    let _ = writeln!(out, "> 任务前缀: {}", config.task_prefix);
    let _ = writeln!(out);

    let _ = writeln!(out, "## 进度总览");
    let _ = writeln!(out);
    let _ = writeln!(out, "| 阶段 | 总数 | 完成 | 进行中 | 待开始 |");
    let _ = writeln!(out, "|------|------|------|--------|--------|");
    for phase in &config.phases {
        let _ = writeln!(out, "| {} | 0 | 0 | 0 | 0 |", phase.name);
    }
    let _ = writeln!(out, "| **合计** | **0** | **0** | **0** | **0** |");
    let _ = writeln!(out);

    let _ = writeln!(out, "## 任务状态");
    let _ = writeln!(out);
    let _ = writeln!(out, "| 编号 | 标题 | 阶段 | 状态 | 依赖 |");
    let _ = writeln!(out, "|------|------|------|------|------|");
    let _ = writeln!(out);
    let _ = writeln!(out, "{LEGEND}");
    let _ = writeln!(out);

    let sections = [
        ("已知问题", "（执行过程中发现的问题记录在此）"),
        ("决策日志", "（重要决策和变更原因记录在此）"),
        ("交接记录", "（每次 /task-exec 完成后在此追加交接记录块）"),
    ];
    for (i, (heading, placeholder)) in sections.iter().enumerate() {
        let _ = writeln!(out, "## {heading}");
        let _ = writeln!(out);
        let _ = writeln!(out, "{placeholder}");
        if i + 1 < sections.len() {
            let _ = writeln!(out);
        }
    }

    out
}
