//! 并行编排器 - 扇出执行，汇合落定
//!
//! 所有可运行引擎并发启动，调用方挂起直到全部落定 (成功/跳过/失败)。
//! 单个引擎的错误、panic、超时或取消只会变成它自己的 `Failed` 结果。

use std::any::Any;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, instrument, warn, Instrument};

use ag_core::{AugurError, EngineId, Result};

use crate::engine::{Readiness, SharedEngine};
use crate::outcome::{EngineFailure, EngineOutcome, EngineOutput, Outcomes};

/// 编排器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// 同时运行的最大引擎数
    pub max_concurrency: usize,
    /// 单个引擎的超时时间 (毫秒)，`None` 表示不限
    pub engine_timeout_ms: Option<u64>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 16,
            engine_timeout_ms: Some(30_000),
        }
    }
}

impl OrchestratorConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.engine_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn without_timeout(mut self) -> Self {
        self.engine_timeout_ms = None;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// 单个引擎的超时时间
    pub fn engine_timeout(&self) -> Option<Duration> {
        self.engine_timeout_ms.map(Duration::from_millis)
    }
}

/// 编排器
///
/// 不持有引擎，每次调用由调用方注入引擎列表。
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// 创建新的编排器
    pub fn new(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    /// 创建默认配置的编排器
    pub fn default_orchestrator() -> Self {
        Self::new(OrchestratorConfig::default())
    }

    /// 获取配置
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// 运行所有引擎，等待全部落定
    pub async fn run<I>(
        &self,
        input: impl Into<Arc<I>>,
        engines: &[SharedEngine<I>],
    ) -> Result<Outcomes>
    where
        I: Send + Sync + 'static,
    {
        self.run_with_cancel(input, engines, CancellationToken::new())
            .await
    }

    /// 运行所有引擎，`cancel` 触发后未落定的引擎记为 `Failed("cancelled")`
    ///
    /// 只有调用方错误 (空引擎列表、重复 ID、`id()` panic) 会以 `Err` 返回。
    #[instrument(skip_all, fields(engines = engines.len()))]
    pub async fn run_with_cancel<I>(
        &self,
        input: impl Into<Arc<I>>,
        engines: &[SharedEngine<I>],
        cancel: CancellationToken,
    ) -> Result<Outcomes>
    where
        I: Send + Sync + 'static,
    {
        if engines.is_empty() {
            return Err(AugurError::NoEngines);
        }

        let mut ids = Vec::with_capacity(engines.len());
        let mut seen = HashSet::with_capacity(engines.len());
        for (position, engine) in engines.iter().enumerate() {
            let id = engine_id(engine, position)?;
            if !seen.insert(id.clone()) {
                return Err(AugurError::DuplicateEngine(id.to_string()));
            }
            ids.push(id);
        }

        let input: Arc<I> = input.into();
        let permits = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut outcomes = Outcomes::new();
        let mut pending = Vec::new();

        for (id, engine) in ids.into_iter().zip(engines) {
            match check_readiness(engine, &input) {
                Ok(Readiness::Ready) => pending.push(settle(
                    id,
                    Arc::clone(engine),
                    Arc::clone(&input),
                    Arc::clone(&permits),
                    self.config.engine_timeout(),
                    cancel.clone(),
                )),
                Ok(Readiness::Skip(reason)) => {
                    debug!(engine = %id, %reason, "engine skipped");
                    outcomes.insert(id, EngineOutcome::skipped(reason));
                }
                Err(failure) => {
                    warn!(engine = %id, detail = ?failure.detail, "engine precondition failed");
                    outcomes.insert(id, EngineOutcome::Failed(failure));
                }
            }
        }

        outcomes.extend(join_all(pending).await);

        let succeeded = outcomes.values().filter(|o| o.is_success()).count();
        let failed = outcomes.values().filter(|o| o.failure().is_some()).count();
        info!(
            total = outcomes.len(),
            succeeded,
            skipped = outcomes.len() - succeeded - failed,
            failed,
            "orchestrator run settled"
        );

        Ok(outcomes)
    }
}

/// 读取引擎 ID；panic 视为调用方错误
fn engine_id<I>(engine: &SharedEngine<I>, position: usize) -> Result<EngineId> {
    catch_unwind(AssertUnwindSafe(|| engine.id())).map_err(|payload| {
        AugurError::InvalidEngine(format!(
            "engine at position {position} panicked in id(): {}",
            panic_message(payload.as_ref()).unwrap_or_else(|| "unknown panic".to_string())
        ))
    })
}

/// 前置条件检查，错误与 panic 都收敛为 precondition 失败
fn check_readiness<I>(
    engine: &SharedEngine<I>,
    input: &I,
) -> std::result::Result<Readiness, EngineFailure> {
    match catch_unwind(AssertUnwindSafe(|| engine.check(input))) {
        Ok(Ok(readiness)) => Ok(readiness),
        Ok(Err(err)) => Err(EngineFailure::precondition(err.to_string())),
        Err(payload) => Err(EngineFailure::precondition(
            panic_message(payload.as_ref()).unwrap_or_else(|| "precondition panicked".to_string()),
        )),
    }
}

/// 在独立任务中运行单个引擎并等待其落定
async fn settle<I>(
    id: EngineId,
    engine: SharedEngine<I>,
    input: Arc<I>,
    permits: Arc<Semaphore>,
    timeout: Option<Duration>,
    cancel: CancellationToken,
) -> (EngineId, EngineOutcome)
where
    I: Send + Sync + 'static,
{
    let span = info_span!("engine", engine = %id);
    let mut handle =
        tokio::spawn(invoke(engine, input, permits, timeout).instrument(span));

    let outcome = tokio::select! {
        biased;
        joined = &mut handle => match joined {
            Ok(Ok(output)) => EngineOutcome::Success(output),
            Ok(Err(err)) => EngineOutcome::Failed(EngineFailure::from_error(&err)),
            Err(join_err) if join_err.is_panic() => {
                let payload = join_err.into_panic();
                EngineOutcome::Failed(EngineFailure::panicked(panic_message(payload.as_ref())))
            }
            Err(_) => EngineOutcome::Failed(EngineFailure::cancelled()),
        },
        _ = cancel.cancelled() => {
            handle.abort();
            EngineOutcome::Failed(EngineFailure::cancelled())
        }
    };

    match &outcome {
        EngineOutcome::Failed(failure) => {
            warn!(engine = %id, kind = ?failure.kind, message = %failure.message, "engine failed")
        }
        _ => debug!(engine = %id, "engine succeeded"),
    }

    (id, outcome)
}

/// 排队获取并发许可后执行引擎；超时只计算执行阶段
async fn invoke<I>(
    engine: SharedEngine<I>,
    input: Arc<I>,
    permits: Arc<Semaphore>,
    timeout: Option<Duration>,
) -> Result<EngineOutput>
where
    I: Send + Sync + 'static,
{
    let _permit = permits
        .acquire_owned()
        .await
        .map_err(|_| AugurError::Cancelled)?;

    let call = engine.execute(&input);
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| AugurError::Timeout(limit.as_millis() as u64))?,
        None => call.await,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
}
