//! # ag_engine - Augur Engine Orchestrator
//!
//! 引擎接口与并行编排器：对同一输入扇出到 N 个引擎，逐个检查前置条件，
//! 隔离失败，全部落定后汇合为一张结果映射。

pub mod engine;
pub mod orchestrator;
pub mod outcome;

pub use engine::{DynEngine, Engine, Readiness, SharedEngine};
pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use outcome::{
    Contribute, Contribution, EngineFailure, EngineOutcome, EngineOutput, FailureKind, Outcomes,
};

pub use ag_core::{AugurError, EngineId, Result};
pub use tokio_util::sync::CancellationToken;
