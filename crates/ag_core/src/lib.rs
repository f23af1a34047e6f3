//! # ag_core - Augur Core Primitives
//!
//! 核心原语层，定义统一错误类型、引擎标识、确定性种子生成器与缓存键派生。
//! 此 crate 是整个项目的基础依赖，不依赖其他业务 crate。

pub mod cache_key;
pub mod error;
pub mod id;
pub mod seeded;

pub use cache_key::{derive_key, CacheKeyDeriver, KeyEncoding, Normalization};
pub use error::{AugurError, Result};
pub use id::EngineId;
pub use seeded::{seed_from_fields, RandomSource, SeededGenerator};
