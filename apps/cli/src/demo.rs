//! 演示引擎与验证变体
//!
//! 仅用于在终端里走通完整流水线，内容本身没有领域含义。

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use ag_consensus::SourceVariant;
use ag_core::{seed_from_fields, AugurError, EngineId, RandomSource, Result, SeededGenerator};
use ag_engine::{Contribute, Contribution, Engine, Readiness, SharedEngine};

/// 数字根对应的类别
const CATEGORIES: [&str; 9] = [
    "beginnings",
    "balance",
    "expression",
    "structure",
    "change",
    "harmony",
    "reflection",
    "power",
    "completion",
];

/// 演示输入
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub birth_date: Option<String>,
}

impl Profile {
    /// 缓存键字段 (顺序固定: 姓名在前，日期在后；没有日期时省略该字段)
    pub fn key_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.birth_date.as_deref());
        fields
    }
}

/// 数字根: 1 + (n - 1) mod 9，0 保持为 0
pub fn digit_root(n: u64) -> u64 {
    if n == 0 {
        0
    } else {
        1 + (n - 1) % 9
    }
}

fn category_for(root: u64) -> &'static str {
    CATEGORIES[(root.max(1) as usize - 1) % CATEGORIES.len()]
}

#[derive(Debug, Serialize)]
pub struct NumberReport {
    pub total: u64,
    pub root: u64,
}

impl Contribute for NumberReport {
    fn contributions(&self) -> Vec<Contribution> {
        vec![Contribution::new(
            category_for(self.root),
            format!("reduces to {}", self.root),
            1.0,
        )]
    }
}

/// 姓名字母值 (a=1 … z=26) 之和
pub struct NameEngine;

#[async_trait]
impl Engine for NameEngine {
    type Input = Profile;
    type Output = NumberReport;

    fn id(&self) -> EngineId {
        EngineId::new("name")
    }

    fn can_run(&self, input: &Profile) -> Result<Readiness> {
        Ok(Readiness::require(!input.name.trim().is_empty(), "name is empty"))
    }

    async fn run(&self, input: &Profile) -> Result<NumberReport> {
        let total: u64 = input
            .name
            .chars()
            .filter(char::is_ascii_alphabetic)
            .map(|c| u64::from(c.to_ascii_lowercase() as u8 - b'a' + 1))
            .sum();
        if total == 0 {
            return Err(AugurError::engine("name has no latin letters"));
        }
        Ok(NumberReport {
            total,
            root: digit_root(total),
        })
    }
}

/// 出生日期各位数字之和，缺少日期时跳过
pub struct DateEngine;

#[async_trait]
impl Engine for DateEngine {
    type Input = Profile;
    type Output = NumberReport;

    fn id(&self) -> EngineId {
        EngineId::new("date")
    }

    fn can_run(&self, input: &Profile) -> Result<Readiness> {
        Ok(Readiness::require(
            input.birth_date.is_some(),
            "birth date not provided",
        ))
    }

    async fn run(&self, input: &Profile) -> Result<NumberReport> {
        let date = input.birth_date.as_deref().unwrap_or_default();
        let total: u64 = date
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(u64::from)
            .sum();
        if total == 0 {
            return Err(AugurError::engine(format!("no digits in date '{date}'")));
        }
        Ok(NumberReport {
            total,
            root: digit_root(total),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct Card {
    pub index: usize,
    pub reversed: bool,
}

#[derive(Debug, Serialize)]
pub struct Spread {
    pub seed: String,
    pub cards: Vec<Card>,
}

impl Contribute for Spread {
    fn contributions(&self) -> Vec<Contribution> {
        self.cards
            .iter()
            .map(|card| {
                let weight = if card.reversed { -0.5 } else { 0.5 };
                Contribution::new(
                    category_for(card.index as u64 + 1),
                    format!("card {}{}", card.index, if card.reversed { " (reversed)" } else { "" }),
                    weight,
                )
            })
            .collect()
    }
}

/// 以姓名与日期为种子抽取三张牌
pub struct DrawEngine {
    pub deck_size: usize,
}

#[async_trait]
impl Engine for DrawEngine {
    type Input = Profile;
    type Output = Spread;

    fn id(&self) -> EngineId {
        EngineId::new("draw")
    }

    fn can_run(&self, _input: &Profile) -> Result<Readiness> {
        Ok(Readiness::Ready)
    }

    async fn run(&self, input: &Profile) -> Result<Spread> {
        let seed = seed_from_fields(&input.key_fields());
        let mut generator = SeededGenerator::new(seed.clone());
        let cards = generator
            .draw_distinct(3, self.deck_size)
            .into_iter()
            .map(|index| Card {
                index,
                reversed: generator.chance(0.5),
            })
            .collect();
        Ok(Spread { seed, cards })
    }
}

/// 默认演示引擎集合
pub fn engines() -> Vec<SharedEngine<Profile>> {
    vec![
        Arc::new(NameEngine) as SharedEngine<Profile>,
        Arc::new(DateEngine) as SharedEngine<Profile>,
        Arc::new(DrawEngine { deck_size: 22 }) as SharedEngine<Profile>,
    ]
}

/// 反复求各位数字之和
pub struct IterativeReduction;

/// 公式
pub struct ClosedForm;

/// 弃九法: n mod 9，余 0 记为 9
pub struct CastingOutNines;

impl SourceVariant<u64, u64> for IterativeReduction {
    fn name(&self) -> &str {
        "iterative-reduction"
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

impl SourceVariant<u64, u64> for ClosedForm {
    fn name(&self) -> &str {
        "closed-form"
    }

    fn compute(&self, input: &u64) -> Result<u64> {
        Ok(digit_root(*input))
    }
}

impl SourceVariant<u64, u64> for CastingOutNines {
    fn name(&self) -> &str {
        "casting-out-nines"
    }

    fn reliability(&self, _input: &u64) -> f64 {
        0.8
    }

    fn compute(&self, input: &u64) -> Result<u64> {
        Ok(match input % 9 {
            0 => 9,
            r => r,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_consensus::ConsensusValidator;
    use ag_engine::Orchestrator;
    use ag_synthesis::ResultAggregator;

    fn profile(date: Option<&str>) -> Profile {
        Profile {
            name: "Ada Lovelace".to_string(),
            birth_date: date.map(str::to_string),
        }
    }

    #[test]
    fn test_missing_and_empty_dates_key_differently() {
        let deriver = ag_core::CacheKeyDeriver::default();
        let missing = profile(None);
        let empty = profile(Some(""));

        assert_eq!(missing.key_fields(), vec!["Ada Lovelace"]);
        assert_eq!(empty.key_fields(), vec!["Ada Lovelace", ""]);
        assert_ne!(
            deriver.derive("reading", &missing.key_fields()),
            deriver.derive("reading", &empty.key_fields())
        );
        assert_ne!(
            seed_from_fields(&missing.key_fields()),
            seed_from_fields(&empty.key_fields())
        );
    }

    #[test]
    fn test_digit_root() {
        assert_eq!(digit_root(0), 0);
        assert_eq!(digit_root(9), 9);
        assert_eq!(digit_root(19), 1);
        assert_eq!(digit_root(18_151_210), 1);
    }

    #[tokio::test]
    async fn test_demo_pipeline_is_reproducible() {
        let orchestrator = Orchestrator::default_orchestrator();
        let aggregator = ResultAggregator::default();
        let engines = engines();

        let first = orchestrator
            .run(profile(Some("1815-12-10")), &engines)
            .await
            .unwrap();
        let second = orchestrator
            .run(profile(Some("1815-12-10")), &engines)
            .await
            .unwrap();
        assert_eq!(aggregator.aggregate(&first, None), aggregator.aggregate(&second, None));
        assert_eq!(aggregator.aggregate(&first, None).summary().succeeded, 3);

        let spread = first["draw"].output().unwrap();
        assert_eq!(spread.data["seed"], "Ada Lovelace|1815-12-10");
        assert_eq!(spread.data["cards"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_missing_date_is_skipped() {
        let outcomes =
            tokio_test::block_on(Orchestrator::default_orchestrator().run(profile(None), &engines()))
                .unwrap();
        assert_eq!(outcomes["date"].skip_reason(), Some("birth date not provided"));
        assert!(outcomes["name"].is_success());
    }

    #[test]
    fn test_variants_disagree_only_on_zero() {
        let validator = ConsensusValidator::default();
        let variants: [&dyn SourceVariant<u64, u64>; 3] =
            [&IterativeReduction, &ClosedForm, &CastingOutNines];

        let report = validator.validate_variants(&1_815, &variants).unwrap();
        assert!(report.is_valid);
        assert_eq!(report.consensus_value, Some(6));

        let report = validator.validate_variants(&0, &variants).unwrap();
        assert_eq!(report.consensus_value, Some(0));
        assert!(!report.is_valid);
    }
}
