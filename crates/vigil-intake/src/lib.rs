//! # vigil-intake: Complaint Intake and Lifecycle
//!
//! Binds every complaint to a tamper-evident commitment and manages its
//! lifecycle from submission to resolution.
//!
//! - **Content** (`complaint.rs`): disclosed content, the stored record,
//!   listing summaries and operation results.
//! - **Commitment** (`commitment.rs`): `SHA-256(JCS(content))`, reproducible
//!   by anyone holding the disclosed content.
//! - **Store** (`store.rs`): the persistence seam and an in-memory backend.
//! - **Auth** (`auth.rs`): the admin verifier seam and [`AdminPrincipal`].
//! - **Service** (`service.rs`): [`ComplaintService`], the lifecycle manager.
//!
//! ## Metrics
//!
//! Emitted through the `metrics` facade; nothing is recorded unless the
//! binary installs a recorder.
//!
//! | Counter | Labels |
//! |---|---|
//! | `vigil_complaints_submitted_total` | |
//! | `vigil_anchor_outcomes_total` | `outcome` |
//! | `vigil_track_rejections_total` | |

pub mod auth;
pub mod commitment;
pub mod complaint;
pub mod error;
pub mod service;
pub mod store;

pub use auth::{AdminPrincipal, AuthError, AuthVerifier, StaticTokenVerifier};
pub use commitment::{canonicalize, commit, verify_commitment};
pub use complaint::{
    ComplaintContent, ComplaintRecord, ComplaintSummary, IntegrityReport, SubmissionReceipt,
};
pub use error::IntakeError;
pub use service::{ComplaintService, ComplaintServiceBuilder, ServiceBuildError};
pub use store::{ComplaintStore, InMemoryComplaintStore, StoreError};
