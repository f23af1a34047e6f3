//! 算法变体来源

use std::fmt::Debug;

use tracing::warn;

use ag_core::{AugurError, Result};

use crate::report::{ConsensusReport, Discrepancy};
use crate::validator::{ConsensusValidator, ValidationSource};

/// 同一计算的一个独立实现 (如 "查表"、"公式"、"传统" 变体)
pub trait SourceVariant<I, V>: Send + Sync {
    /// 来源名称
    fn name(&self) -> &str;

    /// 该变体对给定输入的可靠性权重 ∈ (0, 1]
    fn reliability(&self, _input: &I) -> f64 {
        1.0
    }

    fn compute(&self, input: &I) -> Result<V>;
}

impl ConsensusValidator {
    /// 运行所有变体并计算共识
    ///
    /// 计算失败的变体不参与投票，但作为分歧记录在报告中。
    pub fn validate_variants<I, V>(
        &self,
        input: &I,
        variants: &[&dyn SourceVariant<I, V>],
    ) -> Result<ConsensusReport<V>>
    where
        V: PartialEq + Clone + Debug,
    {
        let mut sources = Vec::with_capacity(variants.len());
        let mut failures = Vec::new();

        for variant in variants {
            match variant.compute(input) {
                Ok(value) => sources.push(ValidationSource::new(
                    variant.name(),
                    variant.reliability(input),
                    value,
                )),
                Err(err) => {
                    warn!(source = variant.name(), error = %err, "validation source failed");
                    failures.push(Discrepancy::source_failure(variant.name(), &err));
                }
            }
        }

        if sources.is_empty() {
            return Err(AugurError::Validation(format!(
                "none of the {} sources produced a value",
                variants.len()
            )));
        }

        self.consensus(&sources, failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::DiscrepancyKind;

    /// 数字根: 反复求各位数字之和
    struct Reduction;
    /// 数字根公式: 1 + (n - 1) mod 9
    struct Formula;
    /// 总是出错的变体
    struct Unavailable;

    impl SourceVariant<u64, u64> for Reduction {
        fn name(&self) -> &str {
            "reduction"
        }

        fn compute(&self, input: &u64) -> Result<u64> {
            let mut n = *input;
            while n > 9 {
                let mut sum = 0;
                while n > 0 {
                    sum += n % 10;
                    n /= 10;
                }
                n = sum;
            }
            Ok(n)
        }
    }

    impl SourceVariant<u64, u64> for Formula {
        fn name(&self) -> &str {
            "formula"
        }

        fn reliability(&self, _input: &u64) -> f64 {
            0.9
        }

        fn compute(&self, input: &u64) -> Result<u64> {
            if *input == 0 {
                return Ok(0);
            }
            Ok(1 + (input - 1) % 9)
        }
    }

    impl SourceVariant<u64, u64> for Unavailable {
        fn name(&self) -> &str {
            "remote-table"
        }

        fn compute(&self, _input: &u64) -> Result<u64> {
            Err(AugurError::engine("table offline"))
        }
    }

    type Variant<'a> = &'a dyn SourceVariant<u64, u64>;

    #[test]
    fn test_variants_agree() {
        let variants: [Variant; 2] = [&Reduction, &Formula];
        let report = ConsensusValidator::default()
            .validate_variants(&18_151_210u64, &variants)
            .unwrap();
        assert_eq!(report.consensus_value, Some(1));
        assert_eq!(report.confidence, 100.0);
        assert!(report.is_valid);
    }

    #[test]
    fn test_failed_variant_is_reported() {
        let variants: [Variant; 3] = [&Reduction, &Unavailable, &Formula];
        let report = ConsensusValidator::default()
            .validate_variants(&42u64, &variants)
            .unwrap();

        assert_eq!(report.sources, vec!["reduction", "formula"]);
        assert!(report.is_valid);
        assert_eq!(report.discrepancies.len(), 1);
        assert_eq!(report.discrepancies[0].kind, DiscrepancyKind::SourceFailure);
        assert_eq!(
            report.discrepancies[0].description,
            "source 'remote-table' failed: table offline"
        );
    }

    #[test]
    fn test_all_variants_failing_is_an_error() {
        let variants: [Variant; 1] = [&Unavailable];
        let result = ConsensusValidator::default().validate_variants(&42u64, &variants);
        assert!(matches!(result, Err(AugurError::Validation(_))));
    }
}
