//! # vigil-cli: CLI Tool for Vigil
//!
//! Operator and reporter tooling that works without a running server.
//!
//! ## Subcommands
//!
//! - `vigil keygen`: Generate a field encryption key.
//! - `vigil commit`: Compute the commitment of disclosed complaint content.
//! - `vigil verify`: Check disclosed content against a published commitment.
//!
//! ```bash
//! vigil keygen > vigil.key
//! vigil commit complaint.json
//! vigil verify complaint.json --commitment ef1e4c2c...
//! ```

pub mod commitment;
pub mod keys;
