//! http-socket-connect: open HTTP sockets against an endpoint and report the
//! session identifiers the server hands out.

use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use http_socket_client::{logging, ClientConfig, HttpSocketClient};

#[derive(Parser)]
#[command(name = "http-socket-connect")]
#[command(about = "Perform HTTP socket handshakes against an endpoint")]
struct Cli {
    /// Handshake endpoint URL
    #[arg(env = "HTTP_SOCKET_ENDPOINT")]
    endpoint: String,

    /// Path to configuration file
    #[arg(short, long, default_value = "http-socket.toml")]
    config: String,

    /// Number of concurrent connect attempts
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,

    /// Connect and read timeout in milliseconds (overrides config file)
    #[arg(long, env = "HTTP_SOCKET_TIMEOUT_MS")]
    timeout_ms: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = if Path::new(&cli.config).exists() {
        ClientConfig::load(&cli.config)?
    } else {
        ClientConfig::default()
    };
    if let Some(timeout_ms) = cli.timeout_ms {
        config.connect_timeout_ms = timeout_ms;
        config.read_timeout_ms = timeout_ms;
    }

    logging::init(&config.log_filter);
    info!("Connecting to {} ({} attempts)", cli.endpoint, cli.count);

    // Every attempt finishes within connect + read timeouts; leave some slack
    let deadline = config.connect_timeout() + config.read_timeout() + Duration::from_secs(5);
    let client = HttpSocketClient::new(config)?;

    let (tx, rx) = mpsc::channel();
    for attempt in 0..cli.count {
        let tx = tx.clone();
        client.connect_with(cli.endpoint.clone(), move |result| {
            let _ = tx.send((attempt, result));
        })?;
    }
    drop(tx);

    let mut connected = 0;
    for _ in 0..cli.count {
        match rx.recv_timeout(deadline) {
            Ok((attempt, Ok(socket))) => {
                connected += 1;
                println!("{}\t{}\t{}", attempt, socket.id(), socket.connect_time().to_rfc3339());
            }
            Ok((attempt, Err(e))) => {
                error!(attempt, kind = ?e.kind(), "Connect failed: {}", e);
                println!("{}\terror\t{}", attempt, e);
            }
            Err(_) => {
                error!("Timed out waiting for connect results");
                break;
            }
        }
    }

    info!("{} sockets registered", client.context().len());
    client.close();

    if connected < cli.count {
        anyhow::bail!("{} of {} connect attempts failed", cli.count - connected, cli.count);
    }
    Ok(())
}
