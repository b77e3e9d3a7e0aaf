//! Trains a 4-2-1 network on the Iris dataset for 25 epochs and saves it to
//! `demo.nn` for the `iris_predict` demo.
//!
//! ```bash
//! cargo run --example iris_train -- test_sets/iris.csv
//! ```

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use siliconnn::{load_csv, train, Network, NetworkSpec};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "test_sets/iris.csv".to_owned());
    let mut rng = StdRng::from_entropy();

    let (storage, mut view) =
        load_csv(&path, 151, 5).with_context(|| format!("Failed to load {path}"))?;

    let mut net = Network::new(&NetworkSpec::new(4, 2, 0.05), &mut rng)?;
    train(&mut net, &mut view, &storage, 25, &mut rng)?;

    net.save("demo.nn").context("Failed to save demo.nn")?;
    Ok(())
}
