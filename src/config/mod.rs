//! Configuration module for Site-Validator
//!
//! Configuration comes from an optional TOML file; every key has a default and
//! command-line flags override whatever the file sets.
//!
//! # Example
//!
//! ```no_run
//! use site_validator::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("site-validator.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, UserAgentConfig, ValidationConfig, DEFAULT_VALIDATOR_URL,
};

// Re-export parser and validation functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_seed_url, validator_endpoint};
