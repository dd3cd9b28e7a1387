pub mod config;
pub mod logging;

pub use config::{load_config, log_config_summary, reload_special_domains};
pub use logging::init_logging;
