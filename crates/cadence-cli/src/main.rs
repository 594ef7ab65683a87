//! Cadence CLI - temporal interaction-graph experiments from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Summarise a Last.fm-style log (Username, Track, Date, Time)
//! cadence stats listens.csv
//!
//! # Train one model and report metrics on the held-out tail
//! cadence train listens.csv --model tgn --epochs 20 --top-actors 1000
//!
//! # Train all four models on the same split
//! cadence compare listens.csv --json
//!
//! # Generic log with an epoch-seconds column: actor,target,timestamp
//! cadence train events.csv --layout numeric
//! ```

mod config;
mod experiment;
mod logging;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use candle_core::Device;
use chrono::DateTime;
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use cadence_core::{build_graph, ColumnSpec};
use cadence_eval::EvaluationReport;
use cadence_nn::{ModelKind, Trainer, TrainingHistory};

use crate::config::ExperimentConfig;

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Temporal interaction-graph experiments", long_about = None)]
struct Cli {
    /// Configuration file (TOML, JSON or YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show statistics about an interaction log
    Stats {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Train one model and report its metrics
    Train {
        #[command(flatten)]
        data: DataArgs,

        /// Model to train
        #[arg(short, long, default_value = "tgn")]
        model: ModelArg,

        #[command(flatten)]
        training: TrainArgs,

        /// Print the history and report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Train every model on the same split and compare
    Compare {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        training: TrainArgs,

        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct DataArgs {
    /// Input CSV file
    input: PathBuf,

    /// Column layout (overrides the configured columns)
    #[arg(long)]
    layout: Option<Layout>,

    /// Keep only the N most active actors
    #[arg(long)]
    top_actors: Option<usize>,

    /// Fraction of events held out for testing
    #[arg(long)]
    test_fraction: Option<f64>,
}

#[derive(Args)]
struct TrainArgs {
    /// Number of epochs
    #[arg(long)]
    epochs: Option<usize>,

    /// Learning rate
    #[arg(long)]
    lr: Option<f64>,

    /// Hidden width
    #[arg(long)]
    hidden_dim: Option<usize>,

    /// Random seed for placeholder features and labels
    #[arg(long)]
    seed: Option<u64>,

    /// NDCG cut-off
    #[arg(short = 'k', long)]
    ndcg_k: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Layout {
    /// Username, Track, Date, Time
    Lastfm,
    /// actor, target, timestamp (seconds)
    Numeric,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModelArg {
    /// Temporal GCN with summed time embeddings
    Htgnn,
    /// Two-layer GraphSAGE
    Sage,
    /// Temporal graph memory
    Tgn,
    /// Recurrent cell over edge sources
    Rnn,
}

impl From<ModelArg> for ModelKind {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Htgnn => ModelKind::Htgnn,
            ModelArg::Sage => ModelKind::GraphSage,
            ModelArg::Tgn => ModelKind::TemporalMemory,
            ModelArg::Rnn => ModelKind::Recurrent,
        }
    }
}

impl DataArgs {
    fn apply(&self, config: &mut ExperimentConfig) {
        match self.layout {
            Some(Layout::Lastfm) => config.data.columns = ColumnSpec::lastfm(),
            Some(Layout::Numeric) => {
                config.data.columns = ColumnSpec::numeric("actor", "target", "timestamp");
            }
            None => {}
        }
        if let Some(k) = self.top_actors {
            config.data.top_actors = Some(k);
        }
        if let Some(fraction) = self.test_fraction {
            config.data.test_fraction = fraction;
        }
    }
}

impl TrainArgs {
    fn apply(&self, config: &mut ExperimentConfig) {
        let training = &mut config.training;
        if let Some(epochs) = self.epochs {
            training.epochs = epochs;
        }
        if let Some(lr) = self.lr {
            training.learning_rate = lr;
        }
        if let Some(dim) = self.hidden_dim {
            training.hidden_dim = dim;
        }
        if let Some(seed) = self.seed {
            training.seed = seed;
        }
        if let Some(k) = self.ndcg_k {
            training.ndcg_k = k;
        }
    }
}

#[derive(Serialize)]
struct RunOutput {
    model: String,
    events: usize,
    history: TrainingHistory,
    report: EvaluationReport,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let mut config = ExperimentConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Stats { data } => {
            data.apply(&mut config);
            cmd_stats(&data.input, &config)
        }
        Commands::Train {
            data,
            model,
            training,
            json,
        } => {
            data.apply(&mut config);
            training.apply(&mut config);
            cmd_train(&data.input, &config, model.into(), json)
        }
        Commands::Compare {
            data,
            training,
            json,
        } => {
            data.apply(&mut config);
            training.apply(&mut config);
            cmd_compare(&data.input, &config, json)
        }
    }
}

fn format_time(t: f64) -> String {
    DateTime::from_timestamp(t as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| format!("{t}"))
}

fn cmd_stats(path: &Path, config: &ExperimentConfig) -> Result<()> {
    let start = Instant::now();
    let events = experiment::load_events(path, config)?;
    let graph = build_graph(&events);

    let actors: HashSet<&str> = events.iter().map(|e| e.actor.as_str()).collect();
    let targets: HashSet<&str> = events.iter().map(|e| e.target.as_str()).collect();

    println!("Events:     {}", events.len());
    println!("Actors:     {}", actors.len());
    println!("Targets:    {}", targets.len());
    println!("Nodes:      {}", graph.num_nodes());
    println!("Edges:      {}", graph.num_edges());
    if let Some((first, last)) = graph.time_range() {
        println!("From:       {}", format_time(first));
        println!("To:         {}", format_time(last));
    }
    tracing::debug!(elapsed = ?start.elapsed(), "stats done");
    Ok(())
}

fn train_one(
    kind: ModelKind,
    prepared: &experiment::Prepared,
    config: &ExperimentConfig,
    pb: &ProgressBar,
    print_epochs: bool,
) -> Result<RunOutput> {
    let mut trainer = Trainer::new(kind, config.training.clone(), &Device::Cpu)
        .with_context(|| format!("Failed to build {kind} model"))?;

    pb.set_message(kind.to_string());
    let history = trainer.fit_with(&prepared.train, &prepared.test, |stats| {
        if print_epochs {
            pb.suspend(|| {
                println!(
                    "Epoch {:>3} | Loss: {:.4} | Test Accuracy: {:.4}",
                    stats.epoch, stats.loss, stats.accuracy
                );
            });
        }
        pb.inc(1);
    })?;
    let report = trainer.evaluate(&prepared.test)?;

    Ok(RunOutput {
        model: kind.to_string(),
        events: prepared.num_events,
        history,
        report,
    })
}

fn progress_bar(total: usize, hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(total as u64);
    pb.set_style(ProgressStyle::with_template(
        "{msg:>6} [{bar:30}] {pos}/{len} epochs",
    )?);
    Ok(pb)
}

fn print_split(prepared: &experiment::Prepared) {
    println!(
        "Events: {} | Train edges: {} | Test edges: {}",
        prepared.num_events,
        prepared.train.num_edges(),
        prepared.test.num_edges()
    );
}

fn cmd_train(path: &Path, config: &ExperimentConfig, kind: ModelKind, json: bool) -> Result<()> {
    let prepared = experiment::prepare(path, config, &Device::Cpu)?;
    if !json {
        print_split(&prepared);
    }
    let pb = progress_bar(config.training.epochs, json)?;

    let output = train_one(kind, &prepared, config, &pb, !json)?;
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", output.report.summary());
    }
    Ok(())
}

fn cmd_compare(path: &Path, config: &ExperimentConfig, json: bool) -> Result<()> {
    let prepared = experiment::prepare(path, config, &Device::Cpu)?;
    if !json {
        print_split(&prepared);
    }
    let pb = progress_bar(config.training.epochs * ModelKind::all().len(), json)?;

    let mut outputs = Vec::new();
    for kind in ModelKind::all() {
        outputs.push(train_one(kind, &prepared, config, &pb, false)?);
    }
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
        return Ok(());
    }

    println!(
        "{:<8} {:>8} {:>10} {:>8} {:>8} {:>8} {:>9}",
        "Model",
        format!("NDCG@{}", config.training.ndcg_k),
        "Precision",
        "Recall",
        "F1",
        "MRR",
        "Accuracy"
    );
    for out in &outputs {
        let r = &out.report;
        println!(
            "{:<8} {:>8.4} {:>10.4} {:>8.4} {:>8.4} {:>8.4} {:>9.4}",
            out.model, r.ndcg, r.precision, r.recall, r.f1, r.mrr, r.accuracy
        );
    }
    Ok(())
}
