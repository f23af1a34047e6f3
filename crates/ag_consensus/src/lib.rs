//! # ag_consensus - Augur Consensus Validation
//!
//! 同一计算的多个独立算法变体 ("来源") 交叉验证：
//! 按可靠性加权得出共识置信度，并列出分歧。与编排器完全独立。

pub mod regression;
pub mod report;
pub mod validator;
pub mod variant;

pub use regression::RegressionCase;
pub use report::{ConsensusReport, Discrepancy, DiscrepancyKind};
pub use validator::{ConfidenceModel, ConsensusConfig, ConsensusValidator, ValidationSource};
pub use variant::SourceVariant;

pub use ag_core::{AugurError, Result};
