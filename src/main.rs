//! Binary entrypoint for RSBBS.
//!
//! One process serves one caller: stdin and stdout are the caller's link, so logs go
//! to the configured log file (or to stderr when it is a terminal) and never to stdout.
//!
//! - `rsbbs -s <CALLSIGN> [-d] [-f <config>]` - run a session for the calling station
//! - `rsbbs --show-config [-f <config>]` - print the effective configuration
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use clap::Parser;
use log::{error, info};

use rsbbs::bbs::collaborators::ensure_info_file;
use rsbbs::bbs::commands::builtin_registry;
use rsbbs::bbs::io::SessionIo;
use rsbbs::bbs::SessionEngine;
use rsbbs::cli::Cli;
use rsbbs::config::Config;
use rsbbs::storage::Store;
use rsbbs::validation::normalize_callsign;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_created) = Config::load_or_create(&cli.config_file).await?;

    if cli.show_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let calling_station = cli
        .calling_station
        .as_deref()
        .map(normalize_callsign)
        .ok_or_else(|| anyhow!("--calling-station is required"))?;

    init_logging(&config, &calling_station, cli.log_level.as_deref(), cli.debug);
    info!("Starting RSBBS v{}", env!("CARGO_PKG_VERSION"));
    if config_created {
        info!("Configuration file created at {}", cli.config_file);
    }

    let info_path = Path::new(&config.utilities.info_file);
    if ensure_info_file(info_path)
        .await
        .map_err(|e| anyhow!("Failed to create info file {}: {}", info_path.display(), e))?
    {
        info!("Info file created at {}", info_path.display());
    }

    let store = Store::open(&config.storage.db_path)
        .map_err(|e| anyhow!("Failed to open message store {}: {}", config.storage.db_path, e))?;
    let registry = builtin_registry()?;
    let io = SessionIo::new(tokio::io::BufReader::new(tokio::io::stdin()), tokio::io::stdout());

    let engine = SessionEngine::new(
        config.session_config(&calling_station, cli.debug),
        config.collaborators(),
        store,
        registry,
        io,
    );
    if let Err(e) = engine.run().await {
        error!("session failed: {}", e);
        return Err(e.into());
    }
    Ok(())
}

/// Initialize logging: every line carries the calling station so sibling sessions
/// sharing one log file can be told apart.
fn init_logging(config: &Config, calling_station: &str, cli_level: Option<&str>, debug: bool) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        let wanted = cli_level.unwrap_or(config.logging.level.as_str());
        log::LevelFilter::from_str(wanted).unwrap_or(log::LevelFilter::Info)
    };
    builder.filter_level(level);
    builder.target(env_logger::Target::Stderr);

    // stdout carries the session; only ever echo to stderr when a person is watching it
    let is_tty = atty::is(atty::Stream::Stderr);
    let station = calling_station.to_string();

    let file = config.logging.file.as_ref().and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    match file {
        Some(f) => {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {} {}", ts, record.level(), station, record.args());
                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(move |fmt, record| {
                if !is_tty {
                    return Ok(());
                }
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {} {}", ts, record.level(), station, record.args())
            });
        }
    }
    let _ = builder.try_init();
}
