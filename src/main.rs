//! Particl Staking Pool Info Daemon
//!
//! Polls the staking node, keeps reward-rate history and serves both.

use anyhow::Context;
use clap::Parser;
use stakepool_infod::{
    api::{self, ApiState, ControlRoute},
    bot::{CommandDispatcher, StatusScheduler, TelegramBot},
    client::{NodeClient, ParticlRpc, PoolApi},
    config::Config,
    control::StakingController,
    monitor::{AggregatorConfig, StatusAggregator},
    notify::{EmailSink, NotificationSink, TelegramClient, TelegramSink, Watchdog},
    storage::{HistoryStore, PgHistoryStore},
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stakepool-infod")]
#[command(about = "Particl staking node status and reward-rate daemon")]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "stakepool-infod.toml")]
    config: PathBuf,

    /// Separate Telegram config file merged under `telegram`
    #[arg(short, long)]
    telegram: Option<PathBuf>,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config, cli.telegram.as_deref())
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    if cli.check {
        tracing::info!("Configuration OK");
        return Ok(());
    }

    run(config).await
}

async fn run(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting stakepool-infod");

    let node: Arc<dyn NodeClient> = Arc::new(ParticlRpc::new(
        &config.node.rpc_host,
        config.node.rpc_port,
        config.node.data_dir_path(),
    )?);
    let pool = Arc::new(PoolApi::new(&config.pool.url)?);

    let store: Option<Arc<dyn HistoryStore>> = match config.database.url.as_deref() {
        Some(url) if !url.is_empty() => {
            let store = PgHistoryStore::connect(url)
                .await
                .context("failed to connect to the statistics database")?;
            tracing::info!("Connected to statistics database");
            Some(Arc::new(store))
        }
        _ => {
            tracing::info!("No statistics database, rates derived from node data");
            None
        }
    };

    let cancel = CancellationToken::new();
    let mut tasks: Vec<JoinHandle<()>> = Vec::new();

    let aggregator = Arc::new(StatusAggregator::new(
        node.clone(),
        store,
        AggregatorConfig {
            wallet: config.node.staking_wallet.clone(),
            status_interval: config.intervals.status(),
            reward_interval: config.intervals.reward(),
            history_interval: config.intervals.history(),
        },
    ));
    let shared = aggregator.shared();
    tasks.extend(aggregator.spawn(cancel.clone()));

    let mut sinks: Vec<Arc<dyn NotificationSink>> = Vec::new();

    if let Some(tg) = config.telegram_enabled() {
        let client = TelegramClient::new(&tg.bot_auth)?;

        let dispatcher = Arc::new(CommandDispatcher::new(shared.clone(), pool.clone()));
        let bot = TelegramBot::new(client.clone(), dispatcher, tg.bot_name.clone());
        let token = cancel.clone();
        tasks.push(tokio::spawn(async move { bot.run(token).await }));

        if let Some(chat) = tg.status_msg_chat_name.clone().filter(|c| !c.is_empty()) {
            let scheduler = StatusScheduler::new(
                client.clone(),
                shared.clone(),
                chat,
                tg.status_msg_hour,
                tg.status_msg_minute,
            );
            let token = cancel.clone();
            tasks.push(tokio::spawn(async move { scheduler.run(token).await }));
        } else {
            tracing::info!("No status message chat configured");
        }

        if let Some(chat) = tg.watchdog_msg_chat_name.as_deref().filter(|c| !c.is_empty()) {
            match client.get_chat(chat).await {
                Ok(chat_id) => sinks.push(Arc::new(TelegramSink::new(client.clone(), chat_id))),
                Err(e) => tracing::error!("Failed to retrieve watchdog chat id for {}: {}", chat, e),
            }
        }
    }

    if let Some(email) = EmailSink::from_config(&config.watchdog)? {
        sinks.push(Arc::new(email));
    }

    if !sinks.is_empty() {
        let watchdog = Watchdog::new(
            node.clone(),
            config.node.staking_wallet.clone(),
            sinks,
            config.intervals.watchdog(),
        );
        let token = cancel.clone();
        tasks.push(tokio::spawn(async move { watchdog.run(token).await }));
    }

    if config.server.port > 0 {
        let control = config.node.control_key().map(|key| ControlRoute {
            key: key.to_string(),
            controller: Arc::new(StakingController::new(
                node.clone(),
                config.node.staking_wallet.clone(),
                config.node.reward_address.clone(),
                config.node.smsg_fee_rate_target,
            )),
        });
        let state = ApiState {
            status: shared.clone(),
            control,
        };
        let port = config.server.port;
        let token = cancel.clone();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = api::serve(port, state, token).await {
                tracing::error!("HTTP API failed: {}", e);
            }
        }));
    }

    shutdown_signal().await;
    tracing::info!("Shutdown requested");
    cancel.cancel();

    for task in tasks {
        if let Err(e) = task.await {
            tracing::error!("Task ended abnormally: {}", e);
        }
    }

    tracing::info!("Stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let unix = async {
        use tokio::signal::unix::{signal, SignalKind};

        match (signal(SignalKind::terminate()), signal(SignalKind::quit())) {
            (Ok(mut term), Ok(mut quit)) => {
                tokio::select! {
                    _ = term.recv() => {},
                    _ = quit.recv() => {},
                }
            }
            _ => {
                tracing::error!("Failed to install signal handlers");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let unix = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = unix => {},
    }
}
