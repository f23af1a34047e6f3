//! 结果聚合器
//!
//! 聚合是输入映射的纯函数：同一份结果映射 + 同一个注入时间戳 ⇒ 完全相同的聚合结果。

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use ag_core::EngineId;
use ag_engine::{EngineOutcome, EngineOutput, Outcomes};

/// 聚合器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// 形成主题所需的最少引擎数
    pub theme_min_engines: usize,
    /// 最多保留的主题数
    pub max_themes: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            theme_min_engines: 2,
            max_themes: 10,
        }
    }
}

/// 结果计数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutcomeSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// 跨引擎主题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// 类别
    pub category: String,
    /// 提及该类别的引擎 (按 ID 排序)
    pub engines: Vec<EngineId>,
    /// 权重合计
    pub total_weight: f64,
    /// 各引擎给出的描述
    pub messages: Vec<String>,
}

/// 跨引擎矛盾: 同一类别上有引擎支持、有引擎反对
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contradiction {
    pub category: String,
    pub supporting: Vec<EngineId>,
    pub opposing: Vec<EngineId>,
}

/// 统一结果 (构造后不可变)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    generated_at: Option<DateTime<Utc>>,
    cache_key: Option<String>,
    summary: OutcomeSummary,
    outcomes: Outcomes,
    themes: Vec<Theme>,
    contradictions: Vec<Contradiction>,
}

impl AggregatedResult {
    /// 调用方注入的生成时间
    pub fn generated_at(&self) -> Option<DateTime<Utc>> {
        self.generated_at
    }

    pub fn cache_key(&self) -> Option<&str> {
        self.cache_key.as_deref()
    }

    pub fn summary(&self) -> OutcomeSummary {
        self.summary
    }

    /// 所有引擎的原始结果 (含跳过与失败)
    pub fn outcomes(&self) -> &Outcomes {
        &self.outcomes
    }

    pub fn outcome(&self, id: &str) -> Option<&EngineOutcome> {
        self.outcomes.get(id)
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn contradictions(&self) -> &[Contradiction] {
        &self.contradictions
    }

    /// 成功引擎的输出
    pub fn successes(&self) -> impl Iterator<Item = (&EngineId, &EngineOutput)> {
        self.outcomes
            .iter()
            .filter_map(|(id, outcome)| outcome.output().map(|output| (id, output)))
    }

    /// 附加缓存键，返回新的结果
    pub fn with_cache_key(self, cache_key: impl Into<String>) -> Self {
        Self {
            cache_key: Some(cache_key.into()),
            ..self
        }
    }
}

/// 单个类别的统计
#[derive(Default)]
struct CategoryTally {
    engines: BTreeSet<EngineId>,
    supporting: BTreeSet<EngineId>,
    opposing: BTreeSet<EngineId>,
    total_weight: f64,
    messages: Vec<String>,
}

/// 结果聚合器
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    config: AggregatorConfig,
}

impl ResultAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// 聚合一次运行的全部结果
    pub fn aggregate(
        &self,
        outcomes: &Outcomes,
        generated_at: Option<DateTime<Utc>>,
    ) -> AggregatedResult {
        let summary = summarize(outcomes);
        let tallies = tally(outcomes);

        let mut themes: Vec<Theme> = tallies
            .iter()
            .filter(|(_, tally)| tally.engines.len() >= self.config.theme_min_engines.max(1))
            .map(|(category, tally)| Theme {
                category: category.clone(),
                engines: tally.engines.iter().cloned().collect(),
                total_weight: tally.total_weight,
                messages: tally.messages.clone(),
            })
            .collect();
        themes.sort_by(|a, b| {
            b.engines
                .len()
                .cmp(&a.engines.len())
                .then_with(|| b.total_weight.total_cmp(&a.total_weight))
                .then_with(|| a.category.cmp(&b.category))
        });
        themes.truncate(self.config.max_themes);

        let contradictions: Vec<Contradiction> = tallies
            .iter()
            .filter(|(_, tally)| is_contradiction(tally))
            .map(|(category, tally)| Contradiction {
                category: category.clone(),
                supporting: tally.supporting.iter().cloned().collect(),
                opposing: tally.opposing.iter().cloned().collect(),
            })
            .collect();

        debug!(
            succeeded = summary.succeeded,
            themes = themes.len(),
            contradictions = contradictions.len(),
            "aggregated engine outcomes"
        );

        AggregatedResult {
            generated_at,
            cache_key: None,
            summary,
            outcomes: outcomes.clone(),
            themes,
            contradictions,
        }
    }
}

fn summarize(outcomes: &Outcomes) -> OutcomeSummary {
    outcomes
        .values()
        .fold(OutcomeSummary::default(), |mut summary, outcome| {
            summary.total += 1;
            match outcome {
                EngineOutcome::Success(_) => summary.succeeded += 1,
                EngineOutcome::Skipped { .. } => summary.skipped += 1,
                EngineOutcome::Failed(_) => summary.failed += 1,
            }
            summary
        })
}

/// 只统计成功结果的贡献
fn tally(outcomes: &Outcomes) -> BTreeMap<String, CategoryTally> {
    let mut tallies: BTreeMap<String, CategoryTally> = BTreeMap::new();
    for (id, outcome) in outcomes {
        let Some(output) = outcome.output() else {
            continue;
        };
        for contribution in &output.contributions {
            let tally = tallies.entry(contribution.category.clone()).or_default();
            tally.engines.insert(id.clone());
            if contribution.supports() {
                tally.supporting.insert(id.clone());
            }
            if contribution.opposes() {
                tally.opposing.insert(id.clone());
            }
            tally.total_weight += contribution.weight;
            tally.messages.push(contribution.message.clone());
        }
    }
    tallies
}

/// 至少有一对不同的引擎分别持支持与反对立场
fn is_contradiction(tally: &CategoryTally) -> bool {
    tally
        .supporting
        .iter()
        .any(|s| tally.opposing.iter().any(|o| o != s))
}
