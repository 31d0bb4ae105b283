//  Copyright (c) 2020 Christopher Taylor
//
//  Distributed under the Boost Software License, Version 1.0. (See accompanying
//  file LICENSE_1_0.txt or copy at http://www.boost.org/LICENSE_1_0.txt)
//
// usage: tweet_topics [--config tuning.toml] [--force] <identity>...
//
use std::env;

use lda_sweep::{TopicPipeline, TuningConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = env::args().skip(1);
    let mut config = TuningConfig::default();
    let mut force = false;
    let mut identities: Vec<String> = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--force" => force = true,
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                config = TuningConfig::load(path)?;
            }
            _ => identities.push(arg),
        }
    }

    let pipeline = TopicPipeline::new(config)?;
    let report = pipeline.run(&identities, force)?;

    println!(
        "best coherence {:.4} (alpha: {}, beta: {}, topics: {})",
        report.best.coherence, report.best.alpha, report.best.beta, report.best.topics
    );
    println!(
        "{} documents, {} unclassifiable, final coherence {:.4}",
        report.documents, report.unclassifiable, report.final_coherence
    );
    for path in &report.surfaces {
        println!("surface: {}", path.display());
    }
    Ok(())
}
