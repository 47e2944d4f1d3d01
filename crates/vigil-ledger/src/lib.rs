//! # vigil-ledger: Commitment Anchoring
//!
//! Records complaint commitments on an external append-only ledger so that
//! the existence of a commitment at a point in time can be proven to a third
//! party.
//!
//! - **Clients** (`anchor.rs`): the [`LedgerClient`] trait, the in-process
//!   [`MockLedgerClient`], and (feature `evm-anchor`) the EVM JSON-RPC client
//!   for the complaint registry contract.
//! - **Anchorer** (`anchorer.rs`): wraps a client with a bounded timeout and
//!   an [`AnchorPolicy`], and turns every result into a typed
//!   [`AnchorOutcome`]. Ledger failures never escape as errors; whether an
//!   unavailable ledger blocks intake is the caller's policy decision.
//!
//! Anchoring operates on the commitment digest only. Complaint content never
//! reaches this crate.

pub mod anchor;
pub mod anchorer;

pub use anchor::{AnchorError, AnchorReference, LedgerClient, LedgerReceipt, MockLedgerClient};
pub use anchorer::{AnchorOutcome, AnchorPolicy, Anchorer, DEFAULT_ANCHOR_TIMEOUT};

#[cfg(feature = "evm-anchor")]
pub use anchor::{EvmLedgerClient, EvmLedgerConfig};
