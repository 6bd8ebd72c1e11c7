//! Encryption CLI command
//!
//! Rewrites a configuration document with every sensitive field encrypted
//! under the master password. Shows the affected paths and asks for
//! confirmation before anything is written.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::config::{EnvSource, MASTER_PASSWORD_VAR};
use crate::crypto::SecureString;
use crate::document::{
    decrypt_tree, encrypt_sensitive_fields, has_encrypted_values, list_sensitive_paths,
    load_document, write_document_atomic,
};
use crate::error::{BridgeError, BridgeResult};

/// Minimum length accepted for a newly chosen master password
const MIN_PASSWORD_LEN: usize = 8;

/// Arguments for `bankbridge encrypt`
#[derive(Args, Debug)]
pub struct EncryptArgs {
    /// Configuration document to encrypt
    pub file: PathBuf,

    /// Write the encrypted document here instead of over FILE
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only list the fields that would be encrypted
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Handle `bankbridge encrypt`
pub fn handle_encrypt_command(args: EncryptArgs, env: &impl EnvSource) -> BridgeResult<()> {
    let doc = load_document(&args.file)?;
    let paths = list_sensitive_paths(&doc);

    if paths.is_empty() {
        println!(
            "No plaintext sensitive fields found in {}.",
            args.file.display()
        );
        if let Some(output) = args.output.as_ref().filter(|_| !args.dry_run) {
            write_document_atomic(output, &doc)?;
            println!("Wrote an unchanged copy to {}.", output.display());
        }
        return Ok(());
    }

    println!("Fields to encrypt in {}:", args.file.display());
    for path in &paths {
        println!("  {}", path);
    }
    println!();

    if args.dry_run {
        println!("Dry run: {} field(s) would be encrypted.", paths.len());
        return Ok(());
    }

    if !args.yes && !confirm(&format!("Encrypt {} field(s)? (yes/no): ", paths.len()))? {
        println!("Aborted.");
        return Err(BridgeError::Aborted);
    }

    // new fields must be sealed under the same password as the existing ones
    let already_encrypted = has_encrypted_values(&doc);
    let secret = master_password(env, !already_encrypted)?;
    if already_encrypted {
        decrypt_tree(doc.clone(), &secret)
            .map_err(|source| BridgeError::DecryptionFailed { source })?;
    }

    println!("Encrypting...");
    let encrypted = encrypt_sensitive_fields(doc, &secret)?;
    drop(secret);

    let output = args.output.unwrap_or(args.file);
    write_document_atomic(&output, &encrypted)?;
    info!(fields = paths.len(), path = %output.display(), "wrote encrypted configuration");

    println!();
    println!("Encrypted {} field(s) into {}.", paths.len(), output.display());
    println!("Set {} when running with this file.", MASTER_PASSWORD_VAR);
    println!("Remember to keep your master password safe - there is no recovery mechanism!");

    Ok(())
}

/// Get the master password from the environment, or prompt for it
///
/// With `confirm_new`, a prompted password must be entered twice and meet the
/// minimum length.
pub(crate) fn master_password(
    env: &impl EnvSource,
    confirm_new: bool,
) -> BridgeResult<SecureString> {
    if let Some(secret) = env.get(MASTER_PASSWORD_VAR).filter(|s| !s.is_empty()) {
        return Ok(SecureString::new(secret));
    }

    if confirm_new {
        prompt_new_password()
    } else {
        prompt_password("Enter master password: ")
    }
}

/// Prompt for a new master password with confirmation
fn prompt_new_password() -> BridgeResult<SecureString> {
    loop {
        let pass1 = prompt_password("Enter new master password: ")?;

        if pass1.len() < MIN_PASSWORD_LEN {
            println!(
                "Master password must be at least {} characters. Please try again.",
                MIN_PASSWORD_LEN
            );
            continue;
        }

        let pass2 = prompt_password("Confirm master password: ")?;

        if pass1 != pass2 {
            println!("Passwords do not match. Please try again.");
            continue;
        }

        return Ok(pass1);
    }
}

/// Prompt for a password (hidden input)
fn prompt_password(prompt: &str) -> BridgeResult<SecureString> {
    rpassword::prompt_password(prompt)
        .map(SecureString::new)
        .map_err(|e| BridgeError::Io(format!("Failed to read master password: {}", e)))
}

/// Ask a yes/no question on stdin
fn confirm(prompt: &str) -> BridgeResult<bool> {
    print!("{}", prompt);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;

    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}
