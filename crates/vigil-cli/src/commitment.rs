//! # Commitment Subcommands
//!
//! `commit` and `verify` read disclosed complaint content as JSON (the same
//! shape the submission endpoint accepts) and recompute its commitment
//! exactly as the server does. A reporter can keep the JSON they submitted
//! and later prove it matches the commitment on their receipt or on the
//! ledger.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use vigil_core::ContentDigest;
use vigil_intake::{canonicalize, commit, verify_commitment, ComplaintContent};

/// Arguments for `vigil commit`.
#[derive(Args, Debug)]
pub struct CommitArgs {
    /// Path to the complaint content JSON.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Also print the canonical JSON that is hashed.
    #[arg(long)]
    pub show_canonical: bool,
}

/// Arguments for `vigil verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to the complaint content JSON.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Expected commitment (64 hex characters).
    #[arg(long)]
    pub commitment: String,
}

/// Load complaint content from a JSON file.
pub fn load_content(path: &Path) -> Result<ComplaintContent> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid complaint content", path.display()))
}

/// Commitment of the content in `path`.
pub fn commitment_of(path: &Path) -> Result<ContentDigest> {
    let content = load_content(path)?;
    commit(&content).context("failed to canonicalize content")
}

/// Execute the commit subcommand.
pub fn run_commit(args: &CommitArgs) -> Result<u8> {
    let content = load_content(&args.file)?;
    if args.show_canonical {
        let canonical = canonicalize(&content).context("failed to canonicalize content")?;
        println!("{}", String::from_utf8_lossy(canonical.as_bytes()));
    }
    let digest = commit(&content).context("failed to canonicalize content")?;
    println!("{digest}");
    Ok(0)
}

/// Execute the verify subcommand. Exits 1 on mismatch.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let content = load_content(&args.file)?;
    if verify_commitment(&content, &args.commitment) {
        println!("OK: content matches commitment");
        Ok(0)
    } else {
        let actual = commit(&content).context("failed to canonicalize content")?;
        println!("MISMATCH: content commits to {actual}");
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRIBERY_COMMITMENT: &str =
        "ef1e4c2c17a97ff786b6ddad6674d4e8f1d764897022431b4ae93f55a5f026f8";

    fn write_content(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("complaint.json");
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn commitment_matches_server_vector() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_content(
            dir.path(),
            r#"{
                "description": "Cash demanded for permit approval",
                "title": "Bribery at office",
                "category": "corruption",
                "anonymous": true
            }"#,
        );
        assert_eq!(commitment_of(&path).unwrap().to_hex(), BRIBERY_COMMITMENT);
    }

    #[test]
    fn verify_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_content(
            dir.path(),
            r#"{"title":"Bribery at office","category":"corruption",
                "description":"Cash demanded for permit approval","anonymous":true}"#,
        );

        let ok = run_verify(&VerifyArgs {
            file: path.clone(),
            commitment: BRIBERY_COMMITMENT.to_uppercase(),
        })
        .unwrap();
        assert_eq!(ok, 0);

        let mismatch = run_verify(&VerifyArgs {
            file: path,
            commitment: "00".repeat(32),
        })
        .unwrap();
        assert_eq!(mismatch, 1);
    }

    #[test]
    fn unreadable_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(commitment_of(&dir.path().join("missing.json")).is_err());

        let path = write_content(dir.path(), "[1, 2, 3]");
        assert!(commitment_of(&path).is_err());
    }
}
