//! Configuration module for bankbridge
//!
//! This module resolves the runtime configuration:
//! - Config file location
//! - Environment-variable overrides
//! - Decryption of encrypted values with the master password
//! - The typed, immutable result handed to the rest of the application

pub mod env;
pub mod overrides;
pub mod paths;
pub mod resolver;
pub mod settings;

pub use env::{EnvSource, MapEnv, ProcessEnv, MASTER_PASSWORD_VAR};
pub use paths::{ConfigPaths, ConfigSource};
pub use resolver::{ResolvedConfig, Resolver, Stage};
pub use settings::{BankSettings, LedgerSettings, RuntimeConfig, SubAccountSettings};
