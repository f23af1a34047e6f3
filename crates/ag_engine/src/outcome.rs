//! 引擎运行结果
//!
//! 每个注册引擎在每次运行中恰好对应一个 [`EngineOutcome`]。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ag_core::{AugurError, EngineId};

/// 一次运行的全部结果，按引擎 ID 排序，与完成顺序无关
pub type Outcomes = BTreeMap<EngineId, EngineOutcome>;

/// 可参与跨引擎综合的事实
///
/// `weight` 的符号表示立场: 正数支持该类别，负数反对。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// 类别 (主题统计的键)
    pub category: String,
    /// 描述
    pub message: String,
    /// 权重
    pub weight: f64,
}

impl Contribution {
    pub fn new(category: impl Into<String>, message: impl Into<String>, weight: f64) -> Self {
        Self {
            category: category.into(),
            message: message.into(),
            weight,
        }
    }

    pub fn supports(&self) -> bool {
        self.weight > 0.0
    }

    pub fn opposes(&self) -> bool {
        self.weight < 0.0
    }
}

/// 引擎输出向综合层暴露的事实
pub trait Contribute {
    fn contributions(&self) -> Vec<Contribution> {
        Vec::new()
    }
}

impl Contribute for serde_json::Value {}

/// 成功的引擎输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineOutput {
    /// 引擎类型化输出的序列化结果
    pub data: serde_json::Value,
    /// 参与综合的事实
    pub contributions: Vec<Contribution>,
}

/// 失败类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 前置条件检查本身出错
    Precondition,
    /// 引擎执行出错
    Execution,
    /// 超时
    Timeout,
    /// 被取消
    Cancelled,
    /// 引擎 panic
    Panicked,
}

/// 失败详情
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineFailure {
    pub kind: FailureKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl EngineFailure {
    fn new(kind: FailureKind, message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail,
        }
    }

    pub fn precondition(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::Precondition, "precondition_error", Some(detail.into()))
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Execution, message, None)
    }

    pub fn timeout(limit_ms: u64) -> Self {
        Self::new(
            FailureKind::Timeout,
            "timeout",
            Some(format!("no result within {limit_ms} ms")),
        )
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "cancelled", None)
    }

    pub fn panicked(detail: Option<String>) -> Self {
        Self::new(FailureKind::Panicked, "panicked", detail)
    }

    /// 将统一错误映射为失败结果
    pub fn from_error(err: &AugurError) -> Self {
        match err {
            AugurError::EngineExecution(message) => Self::execution(message.clone()),
            AugurError::Precondition(detail) => Self::precondition(detail.clone()),
            AugurError::Timeout(limit_ms) => Self::timeout(*limit_ms),
            AugurError::Cancelled => Self::cancelled(),
            other => Self::execution(other.to_string()),
        }
    }
}

/// 单个引擎的运行结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EngineOutcome {
    /// 成功
    Success(EngineOutput),
    /// 不适用，未调用 run
    Skipped { reason: String },
    /// 失败
    Failed(EngineFailure),
}

impl EngineOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        EngineOutcome::Skipped {
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            EngineOutcome::Success(_) => "success",
            EngineOutcome::Skipped { .. } => "skipped",
            EngineOutcome::Failed(_) => "failed",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, EngineOutcome::Success(_))
    }

    pub fn output(&self) -> Option<&EngineOutput> {
        match self {
            EngineOutcome::Success(output) => Some(output),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&EngineFailure> {
        match self {
            EngineOutcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&str> {
        match self {
            EngineOutcome::Skipped { reason } => Some(reason),
            _ => None,
        }
    }
}
