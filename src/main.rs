mod cli;
mod simulate;

use convertlink::{
    config::{self, persist},
    MemoryTransport, OutputFormat, SessionAdapter, SessionStore, TransportOptions,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;

const PRINTER_DRAIN: Duration = Duration::from_secs(2);

struct SimulateArgs {
    url: String,
    format: Option<OutputFormat>,
    fail: Option<String>,
    step_delay: Duration,
    timeout: Duration,
}

async fn simulate_conversion(config_path: Option<&Path>, args: SimulateArgs) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let format = args.format.unwrap_or(config.session.default_format);

    let transport = Arc::new(
        MemoryTransport::new(TransportOptions::from(&config.broker)).with_auto_connect(true),
    );
    simulate::install(
        &transport,
        &config.destinations,
        simulate::ServiceScript {
            format,
            failure: args.fail,
            step_delay: args.step_delay,
        },
        tokio::runtime::Handle::current(),
    );

    let adapter = SessionAdapter::from_config(transport.clone(), &config);
    let store = Arc::clone(adapter.store());
    let mut printer = spawn_printer(&store);

    adapter.connect();
    adapter
        .try_start_conversion(&args.url, format)
        .context("Failed to start conversion")?;

    let mut download = store.download_url().subscribe();
    let mut error = store.error().subscribe();
    let outcome = tokio::time::timeout(args.timeout, async {
        tokio::select! {
            url = download.wait_for(|url| url.is_some()) => {
                url.map(|url| Ok(url.clone().unwrap_or_default()))
            }
            message = error.wait_for(|message| !message.is_empty()) => {
                message.map(|message| Err(message.clone()))
            }
        }
    })
    .await
    .context("Timed out waiting for the conversion to finish")?
    .context("Session state closed unexpectedly")?;

    let snapshot = adapter.snapshot();
    adapter.disconnect();

    // Dropping the last store handles closes every field stream, so the
    // printer ends after writing what it has not printed yet.
    drop(download);
    drop(error);
    drop(store);
    drop(adapter);
    drop(transport);
    if tokio::time::timeout(PRINTER_DRAIN, &mut printer).await.is_err() {
        tracing::warn!("Field printer did not finish, aborting it");
        printer.abort();
    }

    match outcome {
        Ok(url) => {
            println!("✓ Download ready: {}", url);
            if let Some(title) = snapshot.title.as_deref() {
                println!("  Title: {}", title);
            }
            println!(
                "  File: {}.{}",
                snapshot.video_id.as_deref().unwrap_or("download"),
                format
            );
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(())
        }
        Err(message) => anyhow::bail!("Conversion failed: {}", message),
    }
}

/// Print every observed field change until aborted.
fn spawn_printer(store: &SessionStore) -> tokio::task::JoinHandle<()> {
    let connection = store
        .connection()
        .stream()
        .map(|state| format!("connection: {:?}", state));
    let video_id = store
        .video_id()
        .stream()
        .filter_map(|id| id.map(|id| format!("video id: {}", id)));
    let title = store
        .title()
        .stream()
        .filter_map(|title| title.map(|title| format!("title: {}", title)));
    let progress = store
        .progress()
        .stream()
        .filter_map(|p| p.map(|p| format!("progress: {}%", p)));
    let error = store
        .error()
        .stream()
        .filter(|message| !message.is_empty())
        .map(|message| format!("error: {}", message));

    let lines = connection
        .merge(video_id)
        .merge(title)
        .merge(progress)
        .merge(error);

    tokio::spawn(async move {
        tokio::pin!(lines);
        while let Some(line) = lines.next().await {
            println!("{}", line);
        }
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "convertlink=trace,convertlink_common=debug".to_string()
        } else {
            "convertlink=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Simulate {
            url,
            format,
            fail,
            step_delay_ms,
            timeout_secs,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(simulate_conversion(
                cli.config.as_deref(),
                SimulateArgs {
                    url,
                    format,
                    fail,
                    step_delay: Duration::from_millis(step_delay_ms),
                    timeout: Duration::from_secs(timeout_secs),
                },
            ))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::ShowConfig => show_config(cli.config.as_deref()),
        Commands::InitConfig { path, force } => init_config(&path, force),
        Commands::Version => {
            println!("convertlink {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Broker: {}", config.broker.url);
            println!("  Reconnect delay: {}ms", config.broker.reconnect_delay_ms);
            println!(
                "  Heartbeats: in {}ms / out {}ms",
                config.broker.heartbeat_incoming_ms, config.broker.heartbeat_outgoing_ms
            );
            for (queue, destination) in config.destinations.iter() {
                println!("  {}: {}", queue, destination);
            }
            println!("  Include format: {}", config.session.include_format);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Broker: {}", config.broker.url);
        }
    }

    Ok(())
}

fn show_config(path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(path)?;
    let toml = toml::to_string_pretty(&config).context("Failed to serialize config")?;
    print!("{}", toml);
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {:?} (use --force to overwrite)",
            path
        );
    }
    persist::save_config(path, &config::Config::default())?;
    println!("✓ Wrote default config to {:?}", path);
    Ok(())
}
