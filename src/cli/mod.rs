//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the library layer.

pub mod encrypt;
pub mod inspect;

pub use encrypt::{handle_encrypt_command, EncryptArgs};
pub use inspect::{
    handle_config_command, handle_paths_command, handle_show_command, handle_verify_command,
};
