//! CLI for the PuSu client
//!
//! Subcommands:
//! - `basic`: authorize, subscribe, publish one message and print what comes back
//! - `listen`: subscribe and periodically report how many messages arrived
//! - `throughput`: publish a burst of messages and report the send rate

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use pusu::config::{Settings, load_config};
use pusu::transport::{TransportError, WebSocketConnector, server_url};
use pusu::{Client, ClientConfig};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "pusu", about = "Talk to a PuSu server")]
struct Cli {
    /// Server host (overrides configuration)
    #[arg(long)]
    host: Option<String>,
    /// Server port (overrides configuration)
    #[arg(long)]
    port: Option<u16>,
    /// Authorization claim sent before subscribing or publishing
    #[arg(long)]
    authorization: Option<String>,
    /// Acknowledgment timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Authorize, subscribe to a channel, publish to it and print what arrives
    Basic {
        #[arg(long, default_value = "channel.1")]
        channel: String,
    },
    /// Subscribe to a channel and report the received message count
    Listen {
        #[arg(long, default_value = "channel.1")]
        channel: String,
        /// Seconds between reports
        #[arg(long, default_value_t = 10)]
        report_secs: u64,
        /// Number of reports before exiting
        #[arg(long, default_value_t = 600)]
        rounds: u32,
    },
    /// Publish many messages as fast as possible
    Throughput {
        #[arg(long, default_value = "channel.1")]
        channel: String,
        #[arg(long, default_value_t = 100_000)]
        count: u32,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let settings = match load_config() {
        Ok(settings) => apply_overrides(settings, &cli),
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    pusu::utils::logging::init(&settings.logging.level);

    if let Err(e) = run(cli.command, &settings).await {
        error!("{e}");
        std::process::exit(1);
    }
}

fn apply_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(host) = &cli.host {
        settings.client.host = host.clone();
    }
    if let Some(port) = cli.port {
        settings.client.port = port;
    }
    if let Some(authorization) = &cli.authorization {
        settings.client.authorization = authorization.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        settings.client.timeout_ms = timeout_ms;
    }
    settings
}

async fn run(command: Command, settings: &Settings) -> pusu::Result<()> {
    let address = server_url(&settings.client.host, settings.client.port)
        .map_err(pusu::Error::Connection)?;

    let client = Client::connect_with(
        &WebSocketConnector,
        &address,
        ClientConfig::from(&settings.client),
    )
    .await?;

    info!("Authorizing with '{}'", settings.client.authorization);
    let result = match client.authorize(&settings.client.authorization).await {
        Ok(()) => match command {
            Command::Basic { channel } => basic(&client, &channel).await,
            Command::Listen {
                channel,
                report_secs,
                rounds,
            } => listen(&client, &channel, report_secs, rounds).await,
            Command::Throughput { channel, count } => throughput(&client, &channel, count).await,
        },
        Err(e) => Err(e),
    };

    client.close().await;
    result
}

async fn basic(client: &Client, channel: &str) -> pusu::Result<()> {
    info!("Subscribing to {channel}");
    client
        .subscribe(channel, |msg| {
            info!("Got message {} on channel {}", msg.content, msg.channel);
        })
        .await?;

    info!("Sending message to {channel}");
    client.publish(channel, "message").await?;

    info!("Waiting for messages");
    tokio::time::sleep(Duration::from_secs(1)).await;
    Ok(())
}

async fn listen(client: &Client, channel: &str, report_secs: u64, rounds: u32) -> pusu::Result<()> {
    let received = Arc::new(AtomicUsize::new(0));

    info!("Subscribing to {channel}");
    let counter = received.clone();
    client
        .subscribe(channel, move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        })
        .await?;

    info!("Waiting for messages");
    for _ in 0..rounds {
        tokio::time::sleep(Duration::from_secs(report_secs)).await;
        info!("Got {} messages", received.load(Ordering::Relaxed));
        if !client.is_connected() {
            return Err(pusu::Error::Connection(TransportError::Closed));
        }
    }
    Ok(())
}

async fn throughput(client: &Client, channel: &str, count: u32) -> pusu::Result<()> {
    info!("Sending {count} messages");

    let started = Instant::now();
    for i in 0..count {
        client.publish(channel, &format!("message {i}")).await?;
    }
    let elapsed = started.elapsed();

    let per_message = elapsed / count.max(1);
    let rate = if elapsed.is_zero() {
        f64::from(count)
    } else {
        f64::from(count) / elapsed.as_secs_f64()
    };

    info!("Sent {count} messages in {} msec", elapsed.as_millis());
    info!("{} usec/message", per_message.as_micros());
    info!("{rate:.0} messages/sec");
    Ok(())
}
