// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::env;
use std::time::Instant;
use the_conveyor::backends::local::LocalWorkerFactory;
use the_conveyor::config::{load_and_validate_config, RuntimeBuilder};
use the_conveyor::engine::ConveyorStats;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <config.yaml> <part> [part ...]", args[0]);
        eprintln!("Example: {} configs/text-pipeline.yaml \"hello world\" \"conveyor\"", args[0]);
        std::process::exit(1);
    }

    let config_file = &args[1];
    let parts = &args[2..];

    println!("🏭 The Conveyor");
    println!("═══════════════════════════════════");
    println!("📋 Configuration: {}", config_file);
    println!("📦 Parts: {:?}", parts);
    println!();

    run_config(config_file, parts).await
}

async fn run_config(config_file: &str, parts: &[String]) -> Result<()> {
    let started = Instant::now();

    let config = load_and_validate_config(config_file)
        .with_context(|| format!("loading {config_file}"))?;
    let timeout = config.admission_timeout();

    let (workers, collected) = LocalWorkerFactory::registry(timeout);
    let factory = RuntimeBuilder::from_config(&config, &workers)?;

    let roots = factory.roots();
    if roots.is_empty() {
        bail!("{config_file} declares no entry lines");
    }
    println!("🚪 Entry lines: {}", roots.join(", "));
    println!("🏁 Terminal lines: {}", factory.leaves().join(", "));
    println!("⏱️  Admission timeout: {:?}", timeout);
    println!(
        "📤 Each part is sent to all {} entry lines ({} submissions)",
        roots.len(),
        roots.len() * parts.len()
    );

    factory.run().await?;

    let mut rejected = 0usize;
    for root in &roots {
        let line = factory.line(root)?;
        for part in parts {
            if let Err(e) = line.put_part(part.clone(), timeout).await {
                eprintln!("❌ {}: {}", root, e);
                rejected += 1;
            }
        }
    }

    factory.stop().await;

    println!("\n📊 Line Stats:");
    let stats: BTreeMap<String, ConveyorStats> = factory
        .line_names()
        .into_iter()
        .filter_map(|name| factory.get_line(&name).map(|line| (name, line.stats())))
        .collect();
    println!("{}", serde_json::to_string_pretty(&stats)?);

    println!("\n📥 Collected ({}):", collected.len());
    for part in collected.parts() {
        println!("  • {}", part);
    }

    if rejected > 0 {
        println!("\n⚠️  {} parts rejected at admission", rejected);
    }
    println!("\n🎉 Done in {:?}", started.elapsed());
    Ok(())
}
