use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dispatch_core::config::DispatchConfig;
use dispatch_core::graph::NodeId;
use dispatch_core::model::{DriverId, PassengerId, RideId, RideStatus};
use dispatch_core::service::DispatchService;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::runtime::Handle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dispatch_sim",
    about = "Drive the ride dispatch engine from the command line"
)]
struct Cli {
    /// JSON dispatch config; the built-in sample city is used when omitted
    #[arg(long, env = "DISPATCH_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register random drivers, queue random requests and dispatch them all
    Demo {
        #[arg(long, default_value_t = 3)]
        drivers: usize,
        #[arg(long, default_value_t = 8)]
        requests: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Override the per-node travel time
        #[arg(long)]
        step_ms: Option<u64>,
    },
    /// Print the empty state snapshot for the configured city
    State,
    /// Price the shortest route between two nodes
    Route {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<DispatchConfig> {
    match path {
        Some(path) => DispatchConfig::from_json_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(DispatchConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Demo {
            drivers,
            requests,
            seed,
            step_ms,
        } => {
            if let Some(step_ms) = step_ms {
                config.trip_step_ms = step_ms;
            }
            let service = DispatchService::new(&config, Handle::current())?;
            run_demo(&service, &config, drivers, requests, seed).await?;
            println!("{}", serde_json::to_string_pretty(&service.state())?);
        }
        Commands::State => {
            let service = DispatchService::new(&config, Handle::current())?;
            println!("{}", serde_json::to_string_pretty(&service.state())?);
        }
        Commands::Route { from, to } => {
            let service = DispatchService::new(&config, Handle::current())?;
            let quote = service.quote(&NodeId::new(from), &NodeId::new(to))?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
    }
    Ok(())
}

async fn run_demo(
    service: &DispatchService,
    config: &DispatchConfig,
    drivers: usize,
    requests: usize,
    seed: u64,
) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let nodes = service.graph().nodes().to_vec();
    anyhow::ensure!(nodes.len() >= 2, "city needs at least two nodes");

    for i in 0..drivers {
        let location = nodes
            .choose(&mut rng)
            .cloned()
            .context("city has no nodes")?;
        service.add_driver(DriverId::new(format!("driver-{i}")), location)?;
    }

    let mut queued = 0;
    for i in 0..requests {
        let picked: Vec<_> = nodes.choose_multiple(&mut rng, 2).cloned().collect();
        let [source, destination] = <[NodeId; 2]>::try_from(picked)
            .map_err(|_| anyhow::anyhow!("could not pick two distinct nodes"))?;
        match service.request_ride(PassengerId::new(format!("rider-{i}")), source, destination) {
            Ok(()) => queued += 1,
            Err(err) => warn!(rider = i, error = %err, "request rejected"),
        }
    }
    info!(drivers, queued, "demo scenario ready");

    let dispatched = service.dispatch_all(config.trip_step()).await?;
    service.trips().drain().await;
    info!(dispatched, "all trips finished");

    let completed: Vec<RideId> = service.with_state(|state| {
        state
            .rides()
            .iter()
            .filter(|ride| ride.status == RideStatus::Completed)
            .map(|ride| ride.ride_id)
            .collect()
    });
    for ride_id in completed {
        service.rate_ride(ride_id, rng.gen_range(config.rating.min..=config.rating.max))?;
    }
    Ok(())
}
