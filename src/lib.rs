//! bankbridge - encrypted configuration for bank-to-ledger sync
//!
//! This library protects the credentials a bank-scraping job needs (bank
//! logins, ledger API tokens) inside its configuration document, and resolves
//! that document into one authoritative runtime configuration.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `crypto`: AES-256-GCM value envelopes with PBKDF2 key derivation
//! - `document`: Configuration tree model, sensitivity paths, and tree codec
//! - `config`: Layered resolution (defaults, file, environment, decryption)
//! - `cli`: Operator commands (encrypt, verify, inspect)
//! - `logging`: tracing subscriber setup
//! - `error`: Custom error types
//!
//! # Example
//!
//! ```rust,ignore
//! use bankbridge::config::{ProcessEnv, Resolver};
//!
//! let resolved = Resolver::new(&ProcessEnv).resolve_file("config.yaml".as_ref())?;
//! for bank in &resolved.runtime().banks {
//!     println!("{}", bank.name);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod document;
pub mod error;
pub mod logging;

pub use config::{ResolvedConfig, Resolver};
pub use error::{BridgeError, BridgeResult, CipherError};
