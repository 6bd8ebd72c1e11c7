//! Inspection CLI commands
//!
//! Read-only commands: preview sensitive paths, verify the master password
//! against a document, and show the resolved configuration with secrets
//! redacted.

use std::path::Path;

use tracing::info;

use super::encrypt::master_password;
use crate::config::{ConfigPaths, ConfigSource, EnvSource, Resolver};
use crate::document::{decrypt_tree, encrypted_paths, list_sensitive_paths, load_document};
use crate::error::{BridgeError, BridgeResult};

/// Handle `bankbridge paths`
pub fn handle_paths_command(file: &Path) -> BridgeResult<()> {
    let doc = load_document(file)?;
    let paths = list_sensitive_paths(&doc);

    if paths.is_empty() {
        println!("No plaintext sensitive fields found.");
        return Ok(());
    }

    for path in &paths {
        println!("{}", path);
    }
    Ok(())
}

/// Handle `bankbridge verify`
///
/// Decrypts every encrypted value in memory and reports the count. No value
/// is ever printed.
pub fn handle_verify_command(file: &Path, env: &impl EnvSource) -> BridgeResult<()> {
    let doc = load_document(file)?;
    let encrypted = encrypted_paths(&doc);

    if encrypted.is_empty() {
        println!("No encrypted values found in {}.", file.display());
        return Ok(());
    }

    let secret = master_password(env, false)?;
    decrypt_tree(doc, &secret).map_err(|source| BridgeError::DecryptionFailed { source })?;
    info!(values = encrypted.len(), "verified encrypted values");

    println!(
        "Master password is correct: {} encrypted value(s) verified.",
        encrypted.len()
    );
    Ok(())
}

/// Handle `bankbridge show`
pub fn handle_show_command(paths: &ConfigPaths, env: &impl EnvSource) -> BridgeResult<()> {
    let resolved = Resolver::new(env).resolve_file(paths.config_file())?;

    println!("# Resolved from {}", paths.config_file().display());
    if !resolved.env_overrides().is_empty() {
        println!("# Overridden by environment:");
        for path in resolved.env_overrides() {
            println!("#   {}", path);
        }
    }
    print!("{}", serde_yaml::to_string(&resolved.redacted())?);
    Ok(())
}

/// Handle `bankbridge config`
pub fn handle_config_command(paths: &ConfigPaths) -> BridgeResult<()> {
    let source = match paths.source() {
        ConfigSource::Explicit => "--config / BANKBRIDGE_CONFIG",
        ConfigSource::WorkingDir => "working directory",
        ConfigSource::UserConfigDir => "user config directory",
    };

    println!("bankbridge Configuration");
    println!("========================");
    println!("Config file: {}", paths.config_file().display());
    println!("Found via:   {}", source);
    println!("Exists:      {}", paths.config_file().exists());
    Ok(())
}
