//! 共识报告

use serde::{Deserialize, Serialize};

/// 分歧类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    /// 来源之间意见不一致
    Disagreement,
    /// 某个来源未能产出结果
    SourceFailure,
    /// 回归用例的实际值与期望值不符
    Mismatch,
}

/// 分歧 (信息性，非致命)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub kind: DiscrepancyKind,
    /// 描述
    pub description: String,
    /// 涉及的来源或用例
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl Discrepancy {
    pub fn disagreement(rate: f64, dissenting: Vec<String>) -> Self {
        Self {
            kind: DiscrepancyKind::Disagreement,
            description: format!(
                "{:.1}% of sources disagree with the consensus value",
                rate * 100.0
            ),
            sources: dissenting,
            expected: None,
            actual: None,
        }
    }

    pub fn source_failure(source: &str, error: impl std::fmt::Display) -> Self {
        Self {
            kind: DiscrepancyKind::SourceFailure,
            description: format!("source '{source}' failed: {error}"),
            sources: vec![source.to_string()],
            expected: None,
            actual: None,
        }
    }

    pub fn mismatch(case: &str, expected: String, actual: String) -> Self {
        Self {
            kind: DiscrepancyKind::Mismatch,
            description: format!("case '{case}': expected {expected}, got {actual}"),
            sources: vec![case.to_string()],
            expected: Some(expected),
            actual: Some(actual),
        }
    }
}

/// 共识报告 (每次验证产出一次，不可变)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusReport<V> {
    /// 置信度 0–100
    pub confidence: f64,
    /// 与众数一致的比例 (回归模式下为通过率)
    pub consensus_ratio: f64,
    /// 众数值
    pub consensus_value: Option<V>,
    /// 参与的来源名称
    pub sources: Vec<String>,
    /// 分歧列表
    pub discrepancies: Vec<Discrepancy>,
    /// 是否达到通过阈值
    pub is_valid: bool,
}

impl<V> ConsensusReport<V> {
    pub fn has_discrepancies(&self) -> bool {
        !self.discrepancies.is_empty()
    }
}
