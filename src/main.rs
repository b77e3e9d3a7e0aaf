//! siliconnn - train, evaluate and query one-hidden-layer regression networks.
//!
//! ```bash
//! # Standardize, split 80/20, train and save
//! siliconnn train --data wine.csv --hidden-size 18 --learning-rate 0.01 \
//!   --epochs 100 --normalize --seed 42 --model-out wine.nn
//!
//! # Same run driven by a JSON config, overriding the epoch count
//! siliconnn train --config run.json --epochs 50
//!
//! siliconnn eval --model wine.nn --data wine.csv --normalize
//! siliconnn predict --model iris.nn 5.8,4.0,1.2,0.2 7.9,3.8,6.4,2.0
//! siliconnn show --data iris.csv
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use siliconnn::{
    average_loss, load_csv, load_csv_auto, train, DatasetStorage, DatasetView, Network,
    NetworkSpec, RunConfig,
};

#[derive(Parser)]
#[command(name = "siliconnn", version, about = "One-hidden-layer regression network trainer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a CSV, split it, train a network and report the test loss
    Train(TrainArgs),
    /// Average squared error of a saved model over a CSV
    Eval(EvalArgs),
    /// Predict for comma-separated attribute vectors
    Predict(PredictArgs),
    /// Print a dataset one record per line
    Show(ShowArgs),
}

/// CSV location and optional declared shape.
#[derive(Args)]
struct DataArgs {
    /// CSV file: header row, integer label in column 0
    #[arg(long)]
    data: PathBuf,

    /// Row count including the header; read from the file when omitted
    #[arg(long, requires = "num_cols")]
    num_rows: Option<usize>,

    /// Column count including the label; read from the file when omitted
    #[arg(long, requires = "num_rows")]
    num_cols: Option<usize>,

    /// Standardize every attribute to zero mean and unit variance
    #[arg(long)]
    normalize: bool,
}

#[derive(Args)]
struct TrainArgs {
    /// JSON run config; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    data: Option<PathBuf>,

    #[arg(long, requires = "num_cols")]
    num_rows: Option<usize>,

    #[arg(long, requires = "num_rows")]
    num_cols: Option<usize>,

    #[arg(long)]
    hidden_size: Option<usize>,

    #[arg(long)]
    learning_rate: Option<f64>,

    #[arg(long)]
    epochs: Option<usize>,

    /// Fraction of the shuffled records held out for testing
    #[arg(long)]
    test_ratio: Option<f64>,

    #[arg(long)]
    normalize: bool,

    /// RNG seed (for reproducibility)
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write the trained model
    #[arg(long)]
    model_out: Option<PathBuf>,

    /// Where to write per-epoch statistics as JSON
    #[arg(long)]
    report_out: Option<PathBuf>,
}

impl TrainArgs {
    fn into_config(self) -> Result<RunConfig> {
        let mut cfg = match &self.config {
            Some(path) => RunConfig::load_json(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?,
            None => RunConfig::default(),
        };
        if let Some(data) = self.data {
            cfg.data = data;
        }
        if self.num_rows.is_some() {
            cfg.num_rows = self.num_rows;
            cfg.num_cols = self.num_cols;
        }
        if let Some(v) = self.hidden_size {
            cfg.hidden_size = v;
        }
        if let Some(v) = self.learning_rate {
            cfg.learning_rate = v;
        }
        if let Some(v) = self.epochs {
            cfg.epochs = v;
        }
        if let Some(v) = self.test_ratio {
            cfg.test_ratio = v;
        }
        cfg.normalize |= self.normalize;
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if self.model_out.is_some() {
            cfg.model_out = self.model_out;
        }
        if self.report_out.is_some() {
            cfg.report_out = self.report_out;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Args)]
struct EvalArgs {
    /// Model file written by `train --model-out`
    #[arg(long)]
    model: PathBuf,

    #[command(flatten)]
    data: DataArgs,
}

#[derive(Args)]
struct PredictArgs {
    #[arg(long)]
    model: PathBuf,

    /// Attribute vectors such as `5.8,4.0,1.2,0.2`
    #[arg(required = true)]
    inputs: Vec<String>,
}

#[derive(Args)]
struct ShowArgs {
    #[command(flatten)]
    data: DataArgs,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Train(args) => run_train(args.into_config()?),
        Command::Eval(args) => run_eval(args),
        Command::Predict(args) => run_predict(args),
        Command::Show(args) => run_show(args),
    }
}

fn load_dataset(
    path: &Path,
    shape: Option<(usize, usize)>,
    normalize: bool,
) -> Result<(DatasetStorage, DatasetView)> {
    let (mut storage, view) = match shape {
        Some((rows, cols)) => load_csv(path, rows, cols),
        None => load_csv_auto(path),
    }
    .with_context(|| format!("Failed to load dataset {}", path.display()))?;

    if normalize {
        view.normalize(&mut storage)
            .with_context(|| format!("Failed to normalize {}", path.display()))?;
    }
    Ok((storage, view))
}

impl DataArgs {
    fn load(&self) -> Result<(DatasetStorage, DatasetView)> {
        let shape = self.num_rows.zip(self.num_cols);
        load_dataset(&self.data, shape, self.normalize)
    }
}

fn run_train(cfg: RunConfig) -> Result<()> {
    let seed = cfg.seed.unwrap_or_else(rand::random);
    info!("seed: {seed}");
    let mut rng = StdRng::seed_from_u64(seed);

    let shape = cfg.num_rows.zip(cfg.num_cols);
    let (storage, mut view) = load_dataset(&cfg.data, shape, cfg.normalize)?;
    view.shuffle(&mut rng);
    let (mut train_view, test_view) = view.split(cfg.test_ratio);
    info!(
        "{} records: {} train / {} test",
        view.len(),
        train_view.len(),
        test_view.len()
    );

    let spec = NetworkSpec::new(storage.num_attributes(), cfg.hidden_size, cfg.learning_rate);
    let mut net = Network::new(&spec, &mut rng)?;

    let report = train(&mut net, &mut train_view, &storage, cfg.epochs, &mut rng)?;

    if !test_view.is_empty() {
        let test_loss = average_loss(&mut net, &test_view, &storage)?;
        println!("test loss: {test_loss:.10}");
    }

    if let Some(path) = &cfg.model_out {
        net.save(path)
            .with_context(|| format!("Failed to save model to {}", path.display()))?;
        info!("model saved to {}", path.display());
    }
    if let Some(path) = &cfg.report_out {
        report
            .save_json(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }
    Ok(())
}

fn run_eval(args: EvalArgs) -> Result<()> {
    let mut net = Network::load(&args.model)
        .with_context(|| format!("Failed to load model {}", args.model.display()))?;
    let (storage, view) = args.data.load()?;
    let loss = average_loss(&mut net, &view, &storage)?;
    println!("loss: {loss:.10}");
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let mut net = Network::load(&args.model)
        .with_context(|| format!("Failed to load model {}", args.model.display()))?;

    for input in &args.inputs {
        let x = input
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("'{input}' is not a comma-separated list of numbers"))?;
        if x.len() != net.input_size() {
            bail!(
                "'{input}' has {} values, the model expects {}",
                x.len(),
                net.input_size()
            );
        }
        let label = net.predict_label(&x)?;
        println!("{input} -> {:.6} (label {label})", net.output_activation());
    }
    Ok(())
}

fn run_show(args: ShowArgs) -> Result<()> {
    let (storage, view) = args.data.load()?;
    print!("{}", view.display(&storage)?);
    Ok(())
}
