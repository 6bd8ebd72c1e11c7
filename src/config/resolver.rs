//! Configuration resolution
//!
//! Turns a config file plus the environment into one immutable
//! [`ResolvedConfig`]. The pass is linear:
//!
//! ```text
//! Defaulted -> FileLoaded -> EnvOverridden -> [DecryptionRequired -> Decrypted] -> Resolved
//! ```
//!
//! Any failure stops the pass; there is no partially decrypted result.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use tracing::{debug, info};

use super::env::{EnvSource, MASTER_PASSWORD_VAR};
use super::overrides::{apply_credential_overrides, apply_setting_overrides};
use super::settings::{defaults, validate_required, RuntimeConfig};
use crate::crypto::SecureString;
use crate::document::{decrypt_tree, has_encrypted_values, load_document, redact, Node, NodePath};
use crate::error::{BridgeError, BridgeResult};

/// Stages of a resolution pass, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Defaulted,
    FileLoaded,
    EnvOverridden,
    DecryptionRequired,
    Decrypted,
    Resolved,
}

/// The final, decrypted, override-applied configuration
///
/// Built once per process and never written back to disk.
pub struct ResolvedConfig {
    document: Node,
    runtime: RuntimeConfig,
    env_overrides: BTreeSet<NodePath>,
}

impl ResolvedConfig {
    /// The full decrypted document
    pub fn document(&self) -> &Node {
        &self.document
    }

    /// Typed settings for the scraping and ledger-sync collaborators
    pub fn runtime(&self) -> &RuntimeConfig {
        &self.runtime
    }

    /// Paths whose values came from environment variables
    pub fn env_overrides(&self) -> &BTreeSet<NodePath> {
        &self.env_overrides
    }

    /// Snapshot with every sensitive value replaced by a placeholder
    ///
    /// Environment-supplied credentials and tokens are redacted by the same
    /// predicate as file values, so they never show up in a snapshot either.
    pub fn redacted(&self) -> Node {
        redact(&self.document)
    }
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("document", &self.redacted())
            .field("env_overrides", &self.env_overrides)
            .finish()
    }
}

/// Resolves configuration documents against an environment
#[derive(Debug)]
pub struct Resolver<'a, E: EnvSource> {
    env: &'a E,
}

impl<'a, E: EnvSource> Resolver<'a, E> {
    pub fn new(env: &'a E) -> Self {
        Self { env }
    }

    /// Load the document at `path` and resolve it
    pub fn resolve_file(&self, path: &Path) -> BridgeResult<ResolvedConfig> {
        let file = load_document(path)?;
        debug!(path = %path.display(), "loaded configuration file");
        self.resolve_document(file)
    }

    /// Resolve an already-loaded document
    pub fn resolve_document(&self, file: Node) -> BridgeResult<ResolvedConfig> {
        let base = defaults();
        debug!(stage = ?Stage::Defaulted);

        let mut doc = base.merge(file);
        debug!(stage = ?Stage::FileLoaded);

        let mut env_overrides = apply_setting_overrides(&mut doc, self.env)?;
        env_overrides.extend(apply_credential_overrides(&mut doc, self.env));
        debug!(stage = ?Stage::EnvOverridden, overrides = env_overrides.len());

        validate_required(&doc)?;

        if has_encrypted_values(&doc) {
            debug!(stage = ?Stage::DecryptionRequired);
            let secret = self
                .env
                .get(MASTER_PASSWORD_VAR)
                .filter(|value| !value.is_empty())
                .map(SecureString::new)
                .ok_or(BridgeError::MasterSecretRequired)?;

            doc = decrypt_tree(doc, &secret)
                .map_err(|source| BridgeError::DecryptionFailed { source })?;
            drop(secret);
            debug!(stage = ?Stage::Decrypted);
        }

        let runtime = RuntimeConfig::from_document(&doc)?;
        info!(
            banks = runtime.banks.len(),
            env_overrides = env_overrides.len(),
            "configuration resolved"
        );
        debug!(stage = ?Stage::Resolved);

        Ok(ResolvedConfig {
            document: doc,
            runtime,
            env_overrides,
        })
    }
}
