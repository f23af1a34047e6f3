//! # ag_synthesis - Augur Result Aggregation
//!
//! 消费编排器的结果映射，生成面向调用方的统一结果：
//! 保留所有引擎的原始结果，仅基于成功结果做跨引擎综合 (主题、矛盾)。

pub mod aggregator;

pub use aggregator::{
    AggregatedResult, AggregatorConfig, Contradiction, OutcomeSummary, ResultAggregator, Theme,
};

pub use ag_core::{AugurError, Result};
