//! BTP Link relay binary.
//!
//! Wires a `Link` coordinator to a `Sender` and `Receiver` and runs it to completion. The
//! RPC client, wallet and chain-specific `Receiver` are out of scope for this crate (§1);
//! this binary drives the Link against the in-memory test doubles so the coordinator and
//! its fragmentation/FSM logic can be exercised end to end without a concrete chain
//! integration.

mod args;
mod config;
mod demo;
mod errors;

use std::sync::Arc;

use anyhow::Context;
use args::Args;
use btp_relay_common::logging::{self, LoggerConfig};
use btp_relay_link::{Link, LinkConfig};
use btp_relay_receiver::mock::MockReceiver;
use btp_relay_sender::{
    mock::{MockRpcClient, MockWallet},
    RpcSender, SenderConfig,
};
use btp_relay_types::BmcLinkStatus;
use clap::Parser;
use config::Config;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(level) = &args.log_level {
        std::env::set_var("RUST_LOG", level);
    }
    logging::init(LoggerConfig::new("btp-relay".to_string()));

    if let Err(e) = run(args).await {
        error!(error = ?e, "relay exited with a fatal error");
        return Err(e);
    }
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = Config::load_from_path(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }

    info!(src = %config.src.address, dst = %config.dst.address, endpoint = %config.endpoint, "starting btp relay link");

    let rpc = Arc::new(MockRpcClient::new(BmcLinkStatus::default()));
    let wallet = Arc::new(MockWallet::new());
    let sender_config = SenderConfig {
        step_limit: config.step_limit,
        src_address: config.src.address.clone(),
        dst_address: config.dst.address.clone(),
        network_id: "0x1".to_string(),
        relay_resend_interval: config.relay_resend_interval(),
        get_result_interval: config.get_result_interval(),
        limit_margin: config.limit_margin,
    };
    let (sender, result_rx) = RpcSender::spawn(rpc, wallet, sender_config);

    let receiver = Arc::new(MockReceiver::new());
    let mut finalized_rx = receiver
        .take_finalized_receiver()
        .await
        .expect("freshly constructed MockReceiver always has a finalized-status receiver");

    let link_config = LinkConfig {
        latest_result: config.latest_result,
    };
    let link = Link::new(Arc::new(sender), receiver.clone(), link_config)
        .await
        .context("fetching initial link status")?;

    tokio::spawn(async move {
        while let Some(status) = finalized_rx.recv().await {
            info!(?status, "link status finalized, forwarding to receiver pruning");
        }
    });

    let demo_receiver = receiver.clone();
    tokio::spawn(async move {
        demo::run(&demo_receiver, std::time::Duration::from_secs(5)).await;
    });

    link.start(result_rx).await.context("link coordinator")?;
    Ok(())
}
