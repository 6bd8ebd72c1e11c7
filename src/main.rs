use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use bankbridge::cli::{
    handle_config_command, handle_encrypt_command, handle_paths_command, handle_show_command,
    handle_verify_command, EncryptArgs,
};
use bankbridge::config::{ConfigPaths, ProcessEnv};

#[derive(Parser)]
#[command(
    name = "bankbridge",
    author = "Kaylee Beyene",
    version,
    about = "Encrypted configuration for bank-to-ledger sync",
    long_about = "bankbridge keeps bank logins and ledger API tokens encrypted inside \
                  the sync configuration file and resolves that file, environment \
                  overrides, and the master password into the runtime configuration."
)]
struct Cli {
    /// Configuration file (defaults to ./config.yaml or the user config directory)
    #[arg(short, long, global = true, env = "BANKBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt the sensitive fields of a configuration file
    Encrypt(EncryptArgs),

    /// List the fields an encryption pass would touch
    Paths {
        /// Configuration file to inspect
        file: PathBuf,
    },

    /// Check that the master password decrypts every encrypted value
    Verify {
        /// Configuration file to verify
        file: PathBuf,
    },

    /// Show the resolved configuration with secrets redacted
    Show,

    /// Show where the configuration file is read from
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    bankbridge::logging::init(cli.verbose);

    let env = ProcessEnv;

    match cli.command {
        Some(Commands::Encrypt(args)) => handle_encrypt_command(args, &env)?,
        Some(Commands::Paths { file }) => handle_paths_command(&file)?,
        Some(Commands::Verify { file }) => handle_verify_command(&file, &env)?,
        Some(Commands::Show) => {
            let paths = ConfigPaths::resolve(cli.config)?;
            handle_show_command(&paths, &env)?;
        }
        Some(Commands::Config) => {
            let paths = ConfigPaths::resolve(cli.config)?;
            handle_config_command(&paths)?;
        }
        None => {
            println!("bankbridge - encrypted configuration for bank-to-ledger sync");
            println!();
            println!("Run 'bankbridge --help' for usage information.");
        }
    }

    Ok(())
}
