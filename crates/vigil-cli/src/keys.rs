//! # Key Generation
//!
//! Prints a fresh 256-bit field encryption key as 64 hex characters,
//! suitable for `VIGIL_ENCRYPTION_KEY`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use vigil_crypto::EncryptionKey;

/// Arguments for `vigil keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Write the key to this file instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Execute the keygen subcommand.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let key_hex = EncryptionKey::generate().to_hex();

    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{key_hex}\n"))
                .with_context(|| format!("failed to write key: {}", path.display()))?;
            eprintln!("OK: wrote encryption key to {}", path.display());
        }
        None => println!("{key_hex}"),
    }
    Ok(0)
}
