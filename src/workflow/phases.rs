//! Phase plans and task-number prefixes per task type.

use std::collections::HashMap;

use super::descriptor::{Phase, TaskType};
use crate::{Error, Result};

const FEATURE: &[(&str, &str)] = &[
    ("Phase 0: 基础设施", "项目骨架和依赖就绪，空壳可编译"),
    ("Phase 1: 核心逻辑", "核心功能逻辑实现并通过单元测试"),
    ("Phase 2: 集成", "与现有系统集成完成，端到端流程可运行"),
    ("Phase 3: 打磨", "UI/UX 完善、边缘用例处理、错误处理"),
    ("Phase 4: 发布准备", "文档、测试覆盖、性能验证全部完成"),
];

const REFACTOR: &[(&str, &str)] = &[
    ("Phase 0: 脚手架", "新结构就位，新旧代码可共同编译"),
    ("Phase 1: 最小端到端", "一个核心功能通过新架构完整运行"),
    ("Phase 2: 逐模块迁移", "所有模块按新架构运行"),
    ("Phase 3: 清理", "旧代码移除，无废弃引用"),
    ("Phase 4: 验证", "全量回归测试通过，性能达标"),
];

const MIGRATION: &[(&str, &str)] = &[
    ("Phase 0: 准备", "目标环境就绪，迁移工具可用"),
    ("Phase 1: 双写", "数据同时写入新旧系统"),
    ("Phase 2: 迁移", "历史数据迁移完成，数据一致性验证通过"),
    ("Phase 3: 切换", "读流量切换到新系统，旧系统降级为备份"),
    ("Phase 4: 清理", "旧系统下线，迁移工具移除"),
];

const INTEGRATION: &[(&str, &str)] = &[
    ("Phase 0: 契约确认", "接口契约文档化，Mock 服务可用"),
    ("Phase 1: 适配层", "适配器/网关实现完成，单元测试通过"),
    ("Phase 2: 联调", "与真实外部系统连通，基本流程通过"),
    ("Phase 3: 端到端", "所有业务场景通过端到端测试"),
    ("Phase 4: 稳定化", "异常处理、重试、监控就绪"),
];

const OPTIMIZATION: &[(&str, &str)] = &[
    ("Phase 0: 基准建立", "基准测试就绪，当前指标已记录"),
    ("Phase 1: 关键路径", "最大瓶颈优化完成，指标提升可测量"),
    ("Phase 2: 次要路径", "次要瓶颈优化完成"),
    ("Phase 3: 验证", "全量性能测试通过，无功能回归"),
    ("Phase 4: 监控", "性能监控和告警就绪"),
];

const BUGFIX: &[(&str, &str)] = &[
    ("Phase 0: 复现", "所有缺陷可稳定复现，测试用例就绪"),
    ("Phase 1: 定位", "所有缺陷根因定位完成"),
    ("Phase 2: 修复", "修复实施完成，单元测试通过"),
    ("Phase 3: 回归", "全量回归测试通过，无新缺陷"),
    ("Phase 4: 加固", "防御性代码和监控就绪"),
];

const INFRASTRUCTURE: &[(&str, &str)] = &[
    ("Phase 0: 规划", "架构方案确认，工具链就绪"),
    ("Phase 1: 搭建", "核心组件部署完成"),
    ("Phase 2: 迁移", "现有项目/流程迁移完成"),
    ("Phase 3: 验证", "端到端流程验证通过"),
    ("Phase 4: 文档化", "操作手册和维护文档完成"),
];

const GENERIC: &[(&str, &str)] = &[
    ("Phase 0: 准备", "准备工作完成"),
    ("Phase 1: 核心实施", "核心工作完成"),
    ("Phase 2: 完善", "补充工作完成"),
    ("Phase 3: 验证", "全部验证通过"),
];

#[derive(Debug, Clone)]
struct TypeTemplate {
    prefix: String,
    phases: Vec<Phase>,
}

/// Lookup table from task type to its default prefix and phase plan.
///
/// Passed explicitly to [`crate::state::InitEngine`] so callers and tests
/// can substitute their own plans.
#[derive(Debug, Clone)]
pub struct PhaseTable {
    templates: HashMap<TaskType, TypeTemplate>,
}

impl PhaseTable {
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// The shipped plans: five phases per type, four for `generic`.
    pub fn builtin() -> Self {
        let entries: [(TaskType, &str, &[(&str, &str)]); 8] = [
            (TaskType::Feature, "F", FEATURE),
            (TaskType::Refactor, "R", REFACTOR),
            (TaskType::Migration, "M", MIGRATION),
            (TaskType::Integration, "I", INTEGRATION),
            (TaskType::Optimization, "O", OPTIMIZATION),
            (TaskType::Bugfix, "B", BUGFIX),
            (TaskType::Infrastructure, "T", INFRASTRUCTURE),
            (TaskType::Generic, "G", GENERIC),
        ];
        let mut table = Self::empty();
        for (task_type, prefix, phases) in entries {
            let phases = phases
                .iter()
                .map(|(name, exit)| Phase::new(*name, *exit))
                .collect();
            table = table.with(task_type, prefix, phases);
        }
        table
    }

    pub fn with(mut self, task_type: TaskType, prefix: &str, phases: Vec<Phase>) -> Self {
        self.templates.insert(
            task_type,
            TypeTemplate {
                prefix: prefix.to_string(),
                phases,
            },
        );
        self
    }

    fn template(&self, task_type: TaskType) -> Option<&TypeTemplate> {
        self.templates
            .get(&task_type)
            .or_else(|| self.templates.get(&TaskType::Generic))
    }

    /// Default task-number prefix, falling back to the `generic` entry.
    pub fn prefix_for(&self, task_type: TaskType) -> String {
        self.template(task_type)
            .map(|t| t.prefix.clone())
            .unwrap_or_else(|| "G".to_string())
    }

    /// Ordered phase plan for `task_type`.
    ///
    /// Override labels always win: label `i` becomes `Phase {i}: {label}` with
    /// empty exit criteria. Blank labels are dropped, and an override that
    /// leaves nothing is rejected.
    pub fn phases_for(
        &self,
        task_type: TaskType,
        override_names: Option<&[String]>,
    ) -> Result<Vec<Phase>> {
        if let Some(names) = override_names {
            let phases: Vec<Phase> = names
                .iter()
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
                .enumerate()
                .map(|(i, name)| Phase::new(format!("Phase {i}: {name}"), ""))
                .collect();
            if phases.is_empty() {
                return Err(Error::Config(
                    "custom phase list contains no phase names".to_string(),
                ));
            }
            return Ok(phases);
        }

        match self.template(task_type) {
            Some(t) if !t.phases.is_empty() => Ok(t.phases.clone()),
            _ => Err(Error::Config(format!(
                "no phase plan configured for task type {task_type}"
            ))),
        }
    }
}

impl Default for PhaseTable {
    fn default() -> Self {
        Self::builtin()
    }
}
