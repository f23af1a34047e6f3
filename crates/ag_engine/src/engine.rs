//! 引擎接口

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use ag_core::{EngineId, Result};

use crate::outcome::{Contribute, EngineOutput};

/// 前置条件检查结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// 可以运行
    Ready,
    /// 不适用于该输入 (例如缺少可选字段)，附带原因
    Skip(String),
}

impl Readiness {
    pub fn skip(reason: impl Into<String>) -> Self {
        Readiness::Skip(reason.into())
    }

    /// 按条件构造: 满足时 Ready，否则 Skip(reason)
    pub fn require(condition: bool, reason: impl Into<String>) -> Self {
        if condition {
            Readiness::Ready
        } else {
            Readiness::skip(reason)
        }
    }
}

/// 引擎特征
///
/// 引擎之间相互独立，不得共享可变状态。需要确定性的引擎应从输入的稳定字段
/// 构造自己的 [`ag_core::SeededGenerator`]。
#[async_trait]
pub trait Engine: Send + Sync + 'static {
    /// 输入类型 (编排期间不可变)
    type Input: Send + Sync + 'static;
    /// 输出类型
    type Output: Serialize + Contribute + Send + 'static;

    /// 引擎 ID
    fn id(&self) -> EngineId;

    /// 前置条件检查 (纯函数，无副作用)
    fn can_run(&self, input: &Self::Input) -> Result<Readiness>;

    /// 执行计算
    async fn run(&self, input: &Self::Input) -> Result<Self::Output>;
}

/// 类型擦除后的引擎，供编排器统一调度
#[async_trait]
pub trait DynEngine<I>: Send + Sync {
    fn id(&self) -> EngineId;

    fn check(&self, input: &I) -> Result<Readiness>;

    async fn execute(&self, input: &I) -> Result<EngineOutput>;
}

#[async_trait]
impl<E> DynEngine<E::Input> for E
where
    E: Engine,
{
    fn id(&self) -> EngineId {
        Engine::id(self)
    }

    fn check(&self, input: &E::Input) -> Result<Readiness> {
        self.can_run(input)
    }

    async fn execute(&self, input: &E::Input) -> Result<EngineOutput> {
        let output = self.run(input).await?;
        let contributions = output.contributions();
        let data = serde_json::to_value(&output)?;
        Ok(EngineOutput {
            data,
            contributions,
        })
    }
}

/// 共享引擎句柄
pub type SharedEngine<I> = Arc<dyn DynEngine<I>>;
