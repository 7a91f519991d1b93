use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

use costbook_infra::{CostbookConfig, InventoryService, SimulationSettings, Simulator};

mod report;
mod script;

use report::Report;

#[derive(Parser, Debug)]
#[command(name = "costbook", version, about = "FIFO inventory valuation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create products and apply a batch of random purchases and sales
    Simulate {
        /// Number of products to create before simulating
        #[arg(long, default_value_t = 3)]
        products: usize,

        /// Number of transactions (random within the configured range if omitted)
        #[arg(long)]
        count: Option<usize>,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Apply a JSON operation script
    Replay {
        /// Script file (stdin if omitted)
        #[arg(short = 'f', long = "file")]
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CostbookConfig::load().context("loading configuration")?;
    costbook_observability::init_with(config.log_format);

    let service = InventoryService::in_memory();

    match cli.command {
        Command::Simulate {
            products,
            count,
            seed,
        } => {
            if products == 0 {
                bail!("--products must be at least 1");
            }
            for n in 1..=products {
                service.create_product(&format!("Product {n}"))?;
            }

            let simulator = Simulator::new(SimulationSettings::from_config(&config));
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let count = count.unwrap_or_else(|| simulator.random_count(&mut rng));
            simulator.run(&service, count, &mut rng)?;
        }
        Command::Replay { file } => {
            let raw = match file {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let operations = script::parse(&raw)?;
            tracing::info!(operations = operations.len(), "replaying script");
            script::replay(&service, &operations)?;
        }
    }

    let report = Report {
        products: service.list_products()?,
        summary: service.summary()?,
        transactions: service.transactions()?,
    }
    .rounded(config.display_scale);

    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &report)?;
    writeln!(out)?;
    Ok(())
}
