pub mod cli;
pub mod form_file;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "elite-checkout")]
#[command(about = "Simulate the Elite Fitness checkout flow from a checkout page query string")]
pub struct CliConfig {
    /// Checkout page query string, e.g. "?type=pro&name=Elite%20Pro&price=599&period=%2Fmonth"
    #[arg(long, default_value = "")]
    pub query: String,

    /// Site configuration (TOML)
    #[arg(long)]
    pub config: Option<String>,

    /// Form fixture (TOML) to drive through the three steps and submit
    #[arg(long)]
    pub form: Option<String>,

    /// Skip simulated processing and redirect delays
    #[arg(long)]
    pub no_delay: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}
