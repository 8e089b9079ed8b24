pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::cli::{ConsoleHost, StdoutSink};
pub use config::form_file::FormFile;
pub use config::toml_config::SiteConfig;
pub use core::checkout::{CheckoutController, CheckoutSettings, OrderSummary, SubmitOutcome};
pub use core::fragment::{FragmentLoader, HttpFragmentSource};
pub use utils::error::{CheckoutError, Result};
