use std::sync::Arc;

use ag_core::derive_key;
use ag_engine::{
    AugurError, Contribute, Contribution, Engine, EngineId, Orchestrator, Readiness, Result,
    SharedEngine,
};
use ag_synthesis::ResultAggregator;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Serialize;
use serde_json::json;

struct Query {
    name: String,
    birth_time: Option<String>,
}

#[derive(Serialize)]
struct Point {
    x: i64,
}

impl Contribute for Point {
    fn contributions(&self) -> Vec<Contribution> {
        vec![Contribution::new("balance", "x is settled", 1.0)]
    }
}

struct AlwaysOk;

#[async_trait]
impl Engine for AlwaysOk {
    type Input = Query;
    type Output = Point;

    fn id(&self) -> EngineId {
        EngineId::new("A")
    }

    fn can_run(&self, _input: &Query) -> Result<Readiness> {
        Ok(Readiness::Ready)
    }

    async fn run(&self, _input: &Query) -> Result<Point> {
        Ok(Point { x: 1 })
    }
}

struct NeedsBirthTime;

#[async_trait]
impl Engine for NeedsBirthTime {
    type Input = Query;
    type Output = Point;

    fn id(&self) -> EngineId {
        EngineId::new("B")
    }

    fn can_run(&self, input: &Query) -> Result<Readiness> {
        Ok(Readiness::require(input.birth_time.is_some(), "birth time unknown"))
    }

    async fn run(&self, _input: &Query) -> Result<Point> {
        Ok(Point { x: 2 })
    }
}

struct Throws;

#[async_trait]
impl Engine for Throws {
    type Input = Query;
    type Output = Point;

    fn id(&self) -> EngineId {
        EngineId::new("C")
    }

    fn can_run(&self, _input: &Query) -> Result<Readiness> {
        Ok(Readiness::Ready)
    }

    async fn run(&self, _input: &Query) -> Result<Point> {
        Err(AugurError::engine("boom"))
    }
}

#[tokio::test]
async fn test_end_to_end_synthesis_reflects_only_successes() {
    let engines: Vec<SharedEngine<Query>> = vec![
        Arc::new(AlwaysOk) as SharedEngine<Query>,
        Arc::new(NeedsBirthTime) as SharedEngine<Query>,
        Arc::new(Throws) as SharedEngine<Query>,
    ];
    let query = Query {
        name: "Ada".to_string(),
        birth_time: None,
    };
    let key = derive_key("reading", &[query.name.as_str(), "1815-12-10"]);

    let outcomes = Orchestrator::default_orchestrator()
        .run(query, &engines)
        .await
        .unwrap();
    let at = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
    let result = ResultAggregator::default()
        .aggregate(&outcomes, Some(at))
        .with_cache_key(key.clone());

    assert_eq!(result.outcome("A").unwrap().output().unwrap().data, json!({ "x": 1 }));
    assert_eq!(result.outcome("B").unwrap().skip_reason(), Some("birth time unknown"));
    assert_eq!(result.outcome("C").unwrap().failure().unwrap().message, "boom");

    let contributors: Vec<&str> = result.successes().map(|(id, _)| id.as_str()).collect();
    assert_eq!(contributors, vec!["A"]);

    // 单个成功引擎不足以形成主题
    assert!(result.themes().is_empty());
    assert!(result.contradictions().is_empty());
    assert_eq!(result.cache_key(), Some(key.as_str()));

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["outcomes"]["C"]["status"], "failed");
    assert_eq!(json["summary"]["succeeded"], 1);
}

#[derive(Serialize)]
struct Verdict {
    agrees: bool,
}

impl Contribute for Verdict {
    fn contributions(&self) -> Vec<Contribution> {
        let weight = if self.agrees { 0.5 } else { -0.75 };
        vec![Contribution::new("balance", "second opinion", weight)]
    }
}

struct SecondOpinion {
    id: &'static str,
    agrees: bool,
}

#[async_trait]
impl Engine for SecondOpinion {
    type Input = Query;
    type Output = Verdict;

    fn id(&self) -> EngineId {
        EngineId::new(self.id)
    }

    fn can_run(&self, _input: &Query) -> Result<Readiness> {
        Ok(Readiness::Ready)
    }

    async fn run(&self, _input: &Query) -> Result<Verdict> {
        Ok(Verdict { agrees: self.agrees })
    }
}

#[test]
fn test_shared_category_forms_theme_and_contradiction() {
    let engines: Vec<SharedEngine<Query>> = vec![
        Arc::new(AlwaysOk) as SharedEngine<Query>,
        Arc::new(SecondOpinion { id: "D", agrees: true }) as SharedEngine<Query>,
        Arc::new(SecondOpinion { id: "E", agrees: false }) as SharedEngine<Query>,
    ];
    let query = Query {
        name: "Ada".to_string(),
        birth_time: None,
    };

    let outcomes =
        tokio_test::block_on(Orchestrator::default_orchestrator().run(query, &engines)).unwrap();
    let result = ResultAggregator::default().aggregate(&outcomes, None);

    assert_eq!(result.generated_at(), None);
    assert_eq!(result.themes().len(), 1);

    let theme = &result.themes()[0];
    assert_eq!(theme.category, "balance");
    assert_eq!(theme.engines.len(), 3);
    assert!((theme.total_weight - 0.75).abs() < 1e-12);

    let contradiction = &result.contradictions()[0];
    assert_eq!(contradiction.supporting.len(), 2);
    assert_eq!(contradiction.opposing, vec![EngineId::new("E")]);
}
