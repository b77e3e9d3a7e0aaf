//! Loads `demo.nn` written by the `iris_train` demo and predicts three Iris
//! flowers whose true labels are 0, 1 and 2.
//!
//! ```bash
//! cargo run --example iris_train && cargo run --example iris_predict
//! ```

use anyhow::{Context, Result};

use siliconnn::Network;

const EXAMPLES: [[f64; 4]; 3] = [
    [5.8, 4.0, 1.2, 0.2],
    [5.5, 2.4, 3.8, 1.1],
    [7.9, 3.8, 6.4, 2.0],
];

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let mut net = Network::load("demo.nn").context("Failed to load demo.nn")?;

    println!("Predictions:");
    for x in &EXAMPLES {
        let output = net.forward(x)?;
        let label = net.predict_label(x)?;
        println!("{output:.10} (label {label})");
    }
    Ok(())
}
