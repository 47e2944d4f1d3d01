//! # vigil-state: Complaint Status Lifecycle
//!
//! A complaint moves through three states:
//!
//! ```text
//! Open ──▶ In Review ──▶ Resolved (terminal)
//!   ▲          │
//!   └──────────┘
//! ```
//!
//! Status is the only administrator-mutable field of a complaint. Any state
//! string outside the enumerated set is a validation error; once a complaint
//! is `Resolved` it cannot leave that state.

pub mod status;

pub use status::{transition, ComplaintStatus, StatusError};
