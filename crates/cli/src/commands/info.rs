//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::ServiceBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    server: ServerInfo,
    aggregation: AggregationInfo,
    broadcast: BroadcastInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics_port: Option<u16>,
}

#[derive(Serialize)]
struct ServerInfo {
    bind_addr: String,
    admin_secret_set: bool,
}

#[derive(Serialize)]
struct AggregationInfo {
    deviation_window_secs: f64,
}

#[derive(Serialize)]
struct BroadcastInfo {
    subscriber_queue_capacity: usize,
    keep_alive_secs: u64,
    log_events: bool,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint);
    }

    Ok(())
}

fn build_config_info(blueprint: &ServiceBlueprint) -> ConfigInfo {
    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        server: ServerInfo {
            bind_addr: blueprint.server.bind_addr.clone(),
            admin_secret_set: blueprint.server.admin_secret.is_some(),
        },
        aggregation: AggregationInfo {
            deviation_window_secs: blueprint.aggregation.deviation_window_secs,
        },
        broadcast: BroadcastInfo {
            subscriber_queue_capacity: blueprint.broadcast.subscriber_queue_capacity,
            keep_alive_secs: blueprint.broadcast.keep_alive_secs,
            log_events: blueprint.broadcast.log_events,
        },
        metrics_port: blueprint.observability.metrics_port,
    }
}

fn print_config_info(blueprint: &ServiceBlueprint) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Telemetry Hub Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🌐 Server");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Bind: {}", blueprint.server.bind_addr);
    println!(
        "   └─ Admin secret: {}",
        if blueprint.server.admin_secret.is_some() {
            "configured"
        } else {
            "not configured"
        }
    );

    println!("\n📈 Aggregation");
    println!(
        "   └─ Deviation window: {}s",
        blueprint.aggregation.deviation_window_secs
    );

    let broadcast = &blueprint.broadcast;
    println!("\n📡 Broadcast");
    println!("   ├─ Subscriber queue: {}", broadcast.subscriber_queue_capacity);
    println!("   ├─ Keep-alive: {}s", broadcast.keep_alive_secs);
    println!("   └─ Event log: {}", broadcast.log_events);

    println!("\n📊 Metrics");
    match blueprint.observability.metrics_port {
        Some(port) => println!("   └─ Prometheus on :{}", port),
        None => println!("   └─ Disabled"),
    }

    println!();
}
