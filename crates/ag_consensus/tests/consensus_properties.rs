use ag_consensus::{ConfidenceModel, ConsensusConfig, ConsensusValidator, ValidationSource};
use proptest::prelude::*;

fn sources_strategy() -> impl Strategy<Value = Vec<ValidationSource<u8>>> {
    proptest::collection::vec((0.01f64..=1.0, 0u8..4), 1..12).prop_map(|pairs| {
        pairs
            .into_iter()
            .enumerate()
            .map(|(i, (reliability, value))| {
                ValidationSource::new(format!("source-{i}"), reliability, value)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn confidence_stays_in_range(sources in sources_strategy()) {
        for model in [ConfidenceModel::WeightedAgreement, ConfidenceModel::MeanReliability] {
            let validator = ConsensusValidator::new(ConsensusConfig { model, ..Default::default() });
            let report = validator.validate(&sources).unwrap();
            prop_assert!(report.confidence >= 0.0);
            prop_assert!(report.confidence <= 100.0 + 1e-9);
            prop_assert_eq!(report.sources.len(), sources.len());
            prop_assert_eq!(report.is_valid, report.confidence >= 85.0);
        }
    }

    #[test]
    fn unanimous_sources_are_fully_confident(reliabilities in proptest::collection::vec(0.01f64..=1.0, 1..10)) {
        let sources: Vec<_> = reliabilities
            .iter()
            .enumerate()
            .map(|(i, r)| ValidationSource::new(format!("s{i}"), *r, "same"))
            .collect();
        let report = ConsensusValidator::default().validate(&sources).unwrap();
        prop_assert!((report.confidence - 100.0).abs() < 1e-9);
        prop_assert!(report.discrepancies.is_empty());
        prop_assert_eq!(report.consensus_value, Some("same"));
    }

    #[test]
    fn validation_is_deterministic(sources in sources_strategy()) {
        let validator = ConsensusValidator::default();
        prop_assert_eq!(validator.validate(&sources).unwrap(), validator.validate(&sources).unwrap());
    }
}
