//! Process start-up arguments.
//!
//! The invoking environment (an AX.25 listener such as `ax25d`) runs one `rsbbs`
//! process per connection and passes the caller's callsign with `-s`.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "rsbbs")]
#[command(about = "A message board for packet radio")]
#[command(version)]
pub struct Cli {
    /// Callsign of the calling station
    #[arg(
        short = 's',
        long = "calling-station",
        value_name = "CALLSIGN",
        required_unless_present = "show_config",
        conflicts_with = "show_config"
    )]
    pub calling_station: Option<String>,

    /// Surface command errors to the session and log at debug level
    #[arg(short, long)]
    pub debug: bool,

    /// Path to config file
    #[arg(short = 'f', long = "config-file", default_value = "config.toml")]
    pub config_file: String,

    /// Log level (error, warn, info, debug, trace); overrides the config file
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub show_config: bool,
}
