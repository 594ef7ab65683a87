//! End to end: CSV text to evaluation report.

use cadence::core::split::{chronological_split, top_actors};
use cadence::core::{build_graph, random_labels, read_events, ColumnSpec, FeatureTable};
use cadence::nn::{GraphTensors, ModelKind, TrainConfig, Trainer};
use candle_core::Device;

const LOG: &str = "\
actor,target,timestamp
u1,a,86400
u2,a,172800
u1,b,259200
u3,c,345600
u2,b,432000
u1,c,518400
u4,a,604800
u2,c,691200
u1,a,777600
u3,b,864000
";

fn graphs(config: &TrainConfig) -> (GraphTensors, GraphTensors) {
    let spec = ColumnSpec::numeric("actor", "target", "timestamp");
    let events = read_events(LOG.as_bytes(), &spec).unwrap();
    let events = top_actors(&events, 3);
    assert_eq!(events.len(), 9);

    let (train, test) = chronological_split(&events, 0.2).unwrap();
    assert_eq!((train.len(), test.len()), (7, 2));
    assert!(train.last().unwrap().time <= test[0].time);

    let build = |events: &[cadence::Event], seed: u64| {
        let graph = build_graph(events);
        let n = graph.num_nodes();
        let features = FeatureTable::random_normal(n, config.feature_dim, seed);
        GraphTensors::new(&graph, &features, &random_labels(n, seed), &Device::Cpu).unwrap()
    };
    (build(&train, config.seed), build(&test, config.seed + 1))
}

#[test]
fn every_model_trains_and_reports() {
    let config = TrainConfig::default().with_epochs(5);
    let (train, test) = graphs(&config);

    for kind in ModelKind::all() {
        let mut trainer = Trainer::new(kind, config.clone(), &Device::Cpu).unwrap();
        let history = trainer.fit(&train, &test).unwrap();
        let report = trainer.evaluate(&test).unwrap();

        assert_eq!(history.epochs.len(), 5, "{kind}");
        assert!(history.losses().iter().all(|l| l.is_finite()), "{kind}");
        for metric in [report.accuracy, report.precision, report.recall, report.f1, report.mrr, report.ndcg] {
            assert!((0.0..=1.0).contains(&metric), "{kind}: {metric}");
        }
        let expected_rows = match kind.target() {
            cadence::nn::PredictionTarget::Nodes => test.num_nodes(),
            cadence::nn::PredictionTarget::Destinations => test.num_edges(),
        };
        assert_eq!(report.num_samples, expected_rows, "{kind}");
    }
}

#[test]
fn training_lowers_loss_on_fixed_graph() {
    let config = TrainConfig::default().with_epochs(40).with_learning_rate(0.05);
    let (train, _) = graphs(&config);

    let mut trainer = Trainer::new(ModelKind::GraphSage, config, &Device::Cpu).unwrap();
    let history = trainer.fit(&train, &train).unwrap();
    let losses = history.losses();

    assert!(losses[losses.len() - 1] < losses[0]);
}
