mod common;
mod config;
mod crypto;
mod feed;
mod gateway;
mod network;
mod ui;

use std::sync::Arc;

use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use network::ContractClient;
use tokio::sync::mpsc;
use ui::{AppState, SocialApp};

use common::{ChainContext, PeerSelection, short_address};
use config::{AppConfig, Environment};
use feed::chat::{self, Composer, HistoryState, SendOutcome};
use feed::status::{FeedState, StatusFeed};
use feed::subscription::{StatusUpdate, SubscribeOptions, SubscriptionMode, subscribe_status};
use feed::window::paginate;
use gateway::JsonRpcGateway;

#[derive(Parser)]
#[command(
    name = "onchain_social",
    version,
    about = "Desktop client for an on-chain status feed and chat"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Active wallet address (overrides `wallet_address` in the config)
    #[arg(long, value_name = "ADDRESS")]
    address: Option<Address>,
    /// JSON-RPC endpoint (overrides the config and the hosted default)
    #[arg(long, value_name = "URL")]
    rpc_url: Option<String>,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Clone)]
enum Mode {
    /// Run the encryption round-trip demo and exit
    Demo,
    /// Print the conversation with a peer, newest first
    History { peer: String },
    /// Send one chat message through the contract
    Send { peer: String, message: String },
    /// Print the latest status per user once
    Feed {
        #[arg(long, default_value_t = feed::window::FEED_PAGE_SIZE)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    dotenv().ok();
    // Khởi tạo Logger để debug
    env_logger::init();

    let cli = Cli::parse();
    let environment = Environment::from_process();
    let mut app_config = config::load_config(&cli.config);
    if cli.rpc_url.is_some() {
        app_config.rpc_url = cli.rpc_url.clone();
    }

    let ctx = ChainContext {
        self_address: cli
            .address
            .or(app_config.wallet_address)
            .unwrap_or(Address::ZERO),
        chat_contract: app_config.chat_contract,
        status_contract: app_config.status_contract,
    };
    if ctx.self_address == Address::ZERO {
        log::warn!("No wallet address configured; use --address or wallet_address");
    }

    if let Some(Mode::Demo) = cli.mode {
        run_demo();
        return Ok(());
    }

    let Some(gateway) = build_gateway(&environment, &app_config) else {
        return Ok(());
    };

    match cli.mode {
        Some(Mode::History { peer }) => run_history(&gateway, &ctx, &peer).await,
        Some(Mode::Send { peer, message }) => run_send(&gateway, &ctx, &peer, message).await,
        Some(Mode::Feed { limit }) => run_feed(gateway, ctx, &app_config, limit).await,
        Some(Mode::Demo) | None => {
            return run_full_client(gateway, ctx, environment, app_config).await;
        }
    }

    Ok(())
}

fn build_gateway(environment: &Environment, app_config: &AppConfig) -> Option<Arc<JsonRpcGateway>> {
    let Some(url) = environment.rpc_url(app_config) else {
        log::error!(
            "No RPC endpoint: set {} for {} or rpc_url in the config",
            config::CLIENT_ID_VAR,
            environment.chain
        );
        return None;
    };

    match JsonRpcGateway::new(url) {
        Ok(gateway) => Some(Arc::new(gateway.with_log_span(app_config.log_block_span))),
        Err(err) => {
            log::error!("Failed to build RPC client: {err}");
            None
        }
    }
}

fn run_demo() {
    match crypto::run_demo() {
        Ok(report) if report.succeeded() => {
            println!("success");
            println!("public key: {}", report.public_key);
            println!("ciphertext: {}", report.encrypted.to_hex_string());
        }
        Ok(report) => log::error!("Round trip mismatch: got {:?}", report.decrypted),
        Err(err) => log::error!("Encryption demo failed: {err}"),
    }
}

async fn run_history(gateway: &JsonRpcGateway, ctx: &ChainContext, peer: &str) {
    let peer = match peer.parse::<PeerSelection>() {
        Ok(peer) => peer,
        Err(err) => {
            log::error!("{err}");
            return;
        }
    };

    match chat::load_history(gateway, ctx, &peer).await {
        HistoryState::Unselected => println!("Please choose address"),
        HistoryState::Loading => {}
        HistoryState::Failed(err) => log::error!("Could not load messages: {err}"),
        HistoryState::Loaded(messages) => {
            for message in messages {
                println!(
                    "[{}] {} -> {}: {}",
                    message.timestamp.to_decimal_string(),
                    short_address(&message.sender),
                    short_address(&message.receiver),
                    message.message
                );
            }
        }
    }
}

async fn run_send(gateway: &JsonRpcGateway, ctx: &ChainContext, peer: &str, message: String) {
    let peer = match peer.parse::<PeerSelection>() {
        Ok(peer) => peer,
        Err(err) => {
            log::error!("{err}");
            return;
        }
    };

    let mut composer = Composer::new();
    composer.input = message;
    match chat::send_message(gateway, ctx, &peer, &mut composer).await {
        SendOutcome::Sent(tx_hash) => println!("submitted {tx_hash}"),
        SendOutcome::Prompted => println!("{}", composer.placeholder()),
        SendOutcome::NoPeer => println!("Please choose address"),
        SendOutcome::Failed(_) => {}
    }
}

async fn run_feed(gateway: Arc<JsonRpcGateway>, ctx: ChainContext, app_config: &AppConfig, limit: usize) {
    let options = SubscribeOptions {
        mode: SubscriptionMode::Once,
        poll_interval: app_config.poll_interval(),
        from_block: app_config.start_block,
    };
    let (_subscription, mut updates) = subscribe_status(gateway, ctx, options);

    let mut status_feed = StatusFeed::new();
    while let Some(update) = updates.recv().await {
        match update {
            StatusUpdate::Batch(batch) => status_feed.apply_batch(batch),
            StatusUpdate::Failed(err) => status_feed.apply_failure(err),
        }
    }

    match status_feed.state() {
        FeedState::Loading => println!("No data"),
        FeedState::Failed(err) => log::error!("Could not load statuses: {err}"),
        FeedState::Ready(events) => {
            for event in paginate(events, limit) {
                println!(
                    "#{} {}: {}",
                    event.status_id.to_decimal_string(),
                    short_address(&event.user),
                    event.new_status
                );
            }
        }
    }
}

async fn run_full_client(
    gateway: Arc<JsonRpcGateway>,
    ctx: ChainContext,
    environment: Environment,
    app_config: AppConfig,
) -> Result<(), eframe::Error> {
    // 1. Tạo các kênh giao tiếp (Channels)
    // UI -> Worker
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // Worker -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    // 2. Khởi chạy worker gọi contract (Chạy ngầm)
    let status_options = SubscribeOptions {
        mode: SubscriptionMode::Continuous,
        poll_interval: app_config.poll_interval(),
        from_block: app_config.start_block,
    };
    let chain_id = environment.chain.id();
    tokio::spawn(async move {
        let client = ContractClient::new(gateway, ctx, chain_id, status_options, event_tx, cmd_rx);
        if let Err(err) = client.run().await {
            log::error!("Contract worker terminated: {err}");
        }
    });

    // 3. Khởi chạy UI (Chạy trên Main Thread)
    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);
    let mut state = Some(AppState::new(
        ctx.self_address,
        environment.chain,
        app_config.contacts,
    ));

    eframe::run_native(
        "On-chain Social",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("SocialApp should only be initialized once");
            let state = state
                .take()
                .expect("SocialApp should only be initialized once");

            log::info!(
                "Client started on {} as {}",
                environment.chain,
                state.address
            );

            Ok(Box::new(SocialApp::new(cc, state, cmd_tx.clone(), event_receiver)))
        }),
    )
}
