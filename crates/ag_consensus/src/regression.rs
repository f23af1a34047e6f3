//! 回归测试表
//!
//! 用固定的期望输出表检验单一确定性实现，置信度 = 通过率 × 100。

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use tracing::info;

use ag_core::{AugurError, Result};

use crate::report::{ConsensusReport, Discrepancy};
use crate::validator::ConsensusValidator;

/// 回归用例
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionCase<I, V> {
    /// 用例名称
    pub name: String,
    /// 输入
    pub input: I,
    /// 期望输出
    pub expected: V,
}

impl<I, V> RegressionCase<I, V> {
    pub fn new(name: impl Into<String>, input: I, expected: V) -> Self {
        Self {
            name: name.into(),
            input,
            expected,
        }
    }
}

impl ConsensusValidator {
    /// 对照期望表运行实现；实现返回错误同样记为不匹配
    pub fn run_regression_tests<I, V, F>(
        &self,
        cases: &[RegressionCase<I, V>],
        implementation: F,
    ) -> Result<ConsensusReport<V>>
    where
        V: PartialEq + Debug,
        F: Fn(&I) -> Result<V>,
    {
        if cases.is_empty() {
            return Err(AugurError::Validation(
                "regression table is empty".to_string(),
            ));
        }

        let mut passed = 0usize;
        let mut discrepancies = Vec::new();
        for case in cases {
            match implementation(&case.input) {
                Ok(actual) if actual == case.expected => passed += 1,
                Ok(actual) => discrepancies.push(Discrepancy::mismatch(
                    &case.name,
                    format!("{:?}", case.expected),
                    format!("{actual:?}"),
                )),
                Err(err) => discrepancies.push(Discrepancy::mismatch(
                    &case.name,
                    format!("{:?}", case.expected),
                    format!("error: {err}"),
                )),
            }
        }

        let pass_rate = passed as f64 / cases.len() as f64;
        let confidence = pass_rate * 100.0;
        let is_valid = confidence >= self.config().pass_threshold;
        info!(
            cases = cases.len(),
            passed,
            is_valid,
            "regression table checked"
        );

        Ok(ConsensusReport {
            confidence,
            consensus_ratio: pass_rate,
            consensus_value: None,
            sources: cases.iter().map(|c| c.name.clone()).collect(),
            discrepancies,
            is_valid,
        })
    }
}
