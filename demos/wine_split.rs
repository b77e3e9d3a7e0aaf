//! Loads the Wine dataset, standardizes it, splits 80/20, prints both halves,
//! trains for 100 epochs and reports the test loss.
//!
//! ```bash
//! cargo run --example wine_split -- test_sets/wine.csv
//! ```

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use siliconnn::{average_loss, load_csv, train, Network, NetworkSpec};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "test_sets/wine.csv".to_owned());
    let mut rng = StdRng::from_entropy();

    let (mut storage, mut all) =
        load_csv(&path, 179, 14).with_context(|| format!("Failed to load {path}"))?;
    all.normalize(&mut storage)?;
    all.shuffle(&mut rng);

    let (mut train_view, test_view) = all.split(0.2);
    println!("\n----------TRAIN SET-----------");
    print!("{}", train_view.display(&storage)?);
    println!("\n----------TEST SET-----------");
    print!("{}", test_view.display(&storage)?);

    let mut net = Network::new(&NetworkSpec::new(13, 18, 0.01), &mut rng)?;
    train(&mut net, &mut train_view, &storage, 100, &mut rng)?;

    println!("Avg test loss: {:.10}", average_loss(&mut net, &test_view, &storage)?);
    Ok(())
}
