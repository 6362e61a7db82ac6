//! Send pf counters to Carbon.
//!
//! Reads the pf status once, sends the wanted counters to the Carbon host
//! given on the command line, and exits.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use pfgraph_bridge_framework::{BridgeArgs, BridgeConfig, BridgeRunner};

use pfgraph_bridge_pf::collector::PfCollector;
use pfgraph_bridge_pf::config::PfBridgeConfig;
use pfgraph_bridge_pf::device::PfDevice;

#[derive(Parser, Debug)]
#[command(name = "pfgraph", version, about = "Send pf counters to Carbon")]
struct Cli {
    #[command(flatten)]
    bridge: BridgeArgs,

    /// pf control device (overrides the config file)
    #[arg(long)]
    device: Option<PathBuf>,

    /// Print every status field as JSON instead of sending
    #[arg(long)]
    dump: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = PfBridgeConfig::load_or_default(cli.bridge.config.as_deref())
        .and_then(|config| config.with_device_override(cli.device.as_deref()))
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let hostname = config.get_hostname();

    let runner = BridgeRunner::new_with_args("pf", config, &cli.bridge)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let pf_config = &runner.config().pf;
    let device = PfDevice::new(&pf_config.device);
    let device_path = device.path().display().to_string();
    let collector = PfCollector::new(device, hostname, pf_config);

    if cli.dump {
        let status = collector.retrieve().map_err(|e| anyhow::anyhow!("{}", e))?;
        println!("{}", serde_json::to_string_pretty(&status.to_json())?);
        return Ok(());
    }

    tracing::info!(
        device = %device_path,
        host = collector.paths().hostname(),
        metrics = collector.spec().len(),
        "Collecting pf status"
    );

    runner
        .run_once(&collector)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
