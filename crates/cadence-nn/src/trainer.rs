//! Full-graph training and evaluation of a [`ScoringModel`].
//!
//! One optimiser step per epoch over the whole training graph, Adam with
//! cross-entropy against the model's target labels. The trainer owns the
//! [`NodeMemory`]; [`Trainer::predict`] and [`Trainer::evaluate`] score on
//! a clone of it, so evaluating never advances training state.
//!
//! # Example
//!
//! ```rust,ignore
//! use cadence_nn::{ModelKind, TrainConfig, Trainer};
//!
//! let config = TrainConfig::default().with_epochs(20).with_hidden_dim(16);
//! let mut trainer = Trainer::new(ModelKind::TemporalMemory, config, &Device::Cpu)?;
//! let history = trainer.fit(&train, &test)?;
//! println!("{}", trainer.evaluate(&test)?);
//! ```

use candle_core::{DType, Device, Tensor};
use candle_nn::{loss, ops, AdamW, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use cadence_eval::{EvaluationReport, ScoreBatch};

use crate::input::GraphTensors;
use crate::memory::NodeMemory;
use crate::models::{build_model, ModelDims, ModelKind, ScoringModel};
use crate::time::DAYS_PER_YEAR;
use crate::{Error, Result};

/// Training configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Adam step size (default: 0.01).
    pub learning_rate: f64,
    /// Full passes over the training graph (default: 10).
    pub epochs: usize,
    /// Width of hidden layers, node memory and time embeddings (default: 8).
    pub hidden_dim: usize,
    /// Width of node feature rows (default: 8).
    pub feature_dim: usize,
    /// Period of the time encoding (default: 365).
    pub time_buckets: usize,
    /// Cut-off for NDCG (default: 10).
    pub ndcg_k: usize,
    /// Seed for placeholder features and labels (default: 42).
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            epochs: 10,
            hidden_dim: 8,
            feature_dim: 8,
            time_buckets: DAYS_PER_YEAR,
            ndcg_k: 10,
            seed: 42,
        }
    }
}

impl TrainConfig {
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_hidden_dim(mut self, dim: usize) -> Self {
        self.hidden_dim = dim;
        self
    }

    pub fn with_feature_dim(mut self, dim: usize) -> Self {
        self.feature_dim = dim;
        self
    }

    pub fn with_ndcg_k(mut self, k: usize) -> Self {
        self.ndcg_k = k;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.hidden_dim == 0 || self.feature_dim == 0 {
            return Err(Error::InvalidConfig("layer widths must be positive".into()));
        }
        if self.time_buckets == 0 {
            return Err(Error::InvalidConfig("time buckets must be positive".into()));
        }
        if self.ndcg_k == 0 {
            return Err(Error::InvalidConfig("ndcg_k must be positive".into()));
        }
        Ok(())
    }

    fn model_dims(&self) -> ModelDims {
        ModelDims {
            feature_dim: self.feature_dim,
            hidden_dim: self.hidden_dim,
            time_buckets: self.time_buckets,
        }
    }
}

/// Loss and held-out accuracy after one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpochStats {
    /// 1-based.
    pub epoch: usize,
    pub loss: f32,
    pub accuracy: f64,
}

/// Per-epoch statistics of a [`Trainer::fit`] run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainingHistory {
    pub epochs: Vec<EpochStats>,
}

impl TrainingHistory {
    pub fn last(&self) -> Option<&EpochStats> {
        self.epochs.last()
    }

    pub fn losses(&self) -> Vec<f32> {
        self.epochs.iter().map(|e| e.loss).collect()
    }
}

/// A model, its parameters and optimiser, and the node memory it trains.
pub struct Trainer {
    config: TrainConfig,
    // owns the parameters the model and optimiser refer to
    varmap: VarMap,
    model: Box<dyn ScoringModel>,
    optimizer: AdamW,
    memory: NodeMemory,
    device: Device,
}

impl Trainer {
    pub fn new(kind: ModelKind, config: TrainConfig, device: &Device) -> Result<Self> {
        config.validate()?;

        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let model = build_model(kind, config.model_dims(), vb)?;

        let params = ParamsAdamW {
            lr: config.learning_rate,
            weight_decay: 0.0,
            ..Default::default()
        };
        let optimizer = AdamW::new(varmap.all_vars(), params)?;
        debug!(model = %kind, params = varmap.all_vars().len(), "built trainer");

        Ok(Self {
            memory: NodeMemory::new(config.hidden_dim),
            config,
            varmap,
            model,
            optimizer,
            device: device.clone(),
        })
    }

    pub fn kind(&self) -> ModelKind {
        self.model.kind()
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Number of scalar parameters.
    pub fn num_parameters(&self) -> usize {
        self.varmap
            .all_vars()
            .iter()
            .map(|v| v.as_tensor().elem_count())
            .sum()
    }

    /// The training memory.
    pub fn memory(&self) -> &NodeMemory {
        &self.memory
    }

    /// Zero the training memory.
    pub fn reset_memory(&mut self) {
        self.memory.reset();
    }

    /// One optimiser step over `graph`; returns the loss.
    ///
    /// A graph with no rows to score is a no-op with loss 0. On error the
    /// parameters and the training memory are left as they were.
    pub fn train_epoch(&mut self, graph: &GraphTensors) -> Result<f32> {
        let labels = self.model.target().labels(graph);
        if labels.is_empty() {
            return Ok(0.0);
        }

        let mut memory = self.memory.clone();
        let logits = self.model.score(graph, &mut memory)?;
        let targets: Vec<u32> = labels.iter().map(|&l| u32::from(l)).collect();
        let targets = Tensor::from_vec(targets, labels.len(), &self.device)?;

        let loss = loss::cross_entropy(&logits, &targets)?;
        let value = loss.to_scalar::<f32>()?;
        if !value.is_finite() {
            return Err(Error::Training(format!("loss diverged: {value}")));
        }

        self.optimizer.backward_step(&loss)?;
        self.memory = memory;
        Ok(value)
    }

    /// Score `graph` without touching the training memory.
    pub fn predict(&self, graph: &GraphTensors) -> Result<ScoreBatch> {
        let labels = self.model.target().labels(graph);
        if labels.is_empty() {
            return Ok(ScoreBatch::new());
        }

        let mut memory = self.memory.clone();
        let logits = self.model.score(graph, &mut memory)?;
        let probs = ops::softmax(&logits, 1)?;

        let scores = probs
            .narrow(1, 1, 1)?
            .squeeze(1)?
            .to_vec1::<f32>()?
            .into_iter()
            .map(f64::from)
            .collect();
        let predictions = logits
            .argmax(1)?
            .to_vec1::<u32>()?
            .into_iter()
            .map(|p| p as u8)
            .collect();

        Ok(ScoreBatch::from_parts(labels, scores, predictions)?)
    }

    /// Metrics for `graph`; all zero when nothing is scored.
    pub fn evaluate(&self, graph: &GraphTensors) -> Result<EvaluationReport> {
        let batch = self.predict(graph)?;
        Ok(EvaluationReport::from_batch(&batch, self.config.ndcg_k))
    }

    /// Train for the configured epochs, checking accuracy on `test` after each.
    pub fn fit(&mut self, train: &GraphTensors, test: &GraphTensors) -> Result<TrainingHistory> {
        self.fit_with(train, test, |_| {})
    }

    /// Like [`fit`](Self::fit), calling `on_epoch` after every epoch.
    pub fn fit_with<F>(
        &mut self,
        train: &GraphTensors,
        test: &GraphTensors,
        mut on_epoch: F,
    ) -> Result<TrainingHistory>
    where
        F: FnMut(&EpochStats),
    {
        let mut history = TrainingHistory::default();

        for epoch in 1..=self.config.epochs {
            let loss = self.train_epoch(train)?;
            let accuracy = self.evaluate(test)?.accuracy;

            info!(model = %self.kind(), epoch, loss, accuracy, "epoch finished");
            let stats = EpochStats {
                epoch,
                loss,
                accuracy,
            };
            on_epoch(&stats);
            history.epochs.push(stats);
        }

        Ok(history)
    }
}
