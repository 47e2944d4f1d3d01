//! # Service Bootstrap
//!
//! Turns a [`VigilConfig`] into an [`AppState`]:
//!
//! 1. **Store**: Postgres when a pool is given, otherwise in-memory.
//! 2. **Encryption key**: from config, or an ephemeral key (dev mode).
//! 3. **Ledger**: mock, EVM (with the `evm-anchor` feature), or none.
//! 4. **Admin verifier**: introspection endpoint, static token, or none.
//!
//! The resulting handles are the only process-wide state; nothing below
//! this module reads the environment.

use std::sync::Arc;

use sqlx::PgPool;
use vigil_crypto::EncryptionKey;
use vigil_intake::{
    AuthVerifier, ComplaintService, ComplaintStore, InMemoryComplaintStore, ServiceBuildError,
    StaticTokenVerifier,
};
use vigil_ledger::{AnchorPolicy, Anchorer, LedgerClient, MockLedgerClient};

use crate::auth::IntrospectionVerifier;
use crate::config::{LedgerEndpoint, VigilConfig};
use crate::db::complaints::PgComplaintStore;
use crate::state::AppState;

/// Ledger name recorded on references produced by the mock client.
pub const MOCK_LEDGER_NAME: &str = "mock-ledger";

/// Ledger name recorded on references produced by the EVM client.
pub const EVM_LEDGER_NAME: &str = "evm";

/// Errors during bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The ledger client could not be constructed.
    #[error("ledger client error: {0}")]
    Ledger(String),

    /// A URL ledger endpoint was configured in a build without EVM support.
    #[error("VIGIL_LEDGER_ENDPOINT is a URL but this build lacks the `evm-anchor` feature")]
    EvmUnsupported,

    /// `Required` anchoring was requested with no ledger to anchor on.
    #[error("anchor policy `required` needs a configured ledger")]
    RequiredWithoutLedger,

    /// The identity provider client could not be constructed.
    #[error("auth verifier error: {0}")]
    Verifier(String),

    #[error(transparent)]
    Service(#[from] ServiceBuildError),
}

/// Build the application state from configuration.
pub fn bootstrap(config: &VigilConfig, pool: Option<PgPool>) -> Result<AppState, BootstrapError> {
    let store: Arc<dyn ComplaintStore> = match pool {
        Some(pool) => Arc::new(PgComplaintStore::new(pool)),
        None => Arc::new(InMemoryComplaintStore::new()),
    };

    let key = match &config.encryption_key {
        Some(key) => key.clone(),
        None => {
            tracing::warn!(
                "VIGIL_ENCRYPTION_KEY not set; using an ephemeral key. \
                 Stored complaints will be unreadable after restart."
            );
            EncryptionKey::generate()
        }
    };

    let anchorer = build_anchorer(config)?;
    let verifier = build_verifier(config)?;

    tracing::info!(
        anchor_policy = %anchorer.policy(),
        ledger = anchorer.ledger_id().unwrap_or("none"),
        admin_auth = verifier.is_some(),
        "Vigil configured"
    );

    let service = ComplaintService::builder()
        .store(store)
        .encryption_key(key)
        .anchorer(anchorer)
        .build()?;

    Ok(AppState::new(service, verifier).with_cors(config.cors_origins.clone()))
}

fn build_anchorer(config: &VigilConfig) -> Result<Anchorer, BootstrapError> {
    if config.anchor_policy == AnchorPolicy::Disabled {
        return Ok(Anchorer::disabled());
    }
    let client: Arc<dyn LedgerClient> = match &config.ledger {
        None if config.anchor_policy == AnchorPolicy::Required => {
            return Err(BootstrapError::RequiredWithoutLedger);
        }
        None => {
            tracing::warn!("no ledger configured; commitments will not be anchored");
            return Ok(Anchorer::disabled());
        }
        Some(LedgerEndpoint::Mock) => {
            tracing::warn!(
                "using the in-process mock ledger; anchors are not externally verifiable"
            );
            Arc::new(MockLedgerClient::new(MOCK_LEDGER_NAME))
        }
        Some(endpoint @ LedgerEndpoint::Evm { .. }) => evm_client(endpoint)?,
    };
    Ok(Anchorer::new(client, config.anchor_policy, config.anchor_timeout))
}

#[cfg(feature = "evm-anchor")]
fn evm_client(endpoint: &LedgerEndpoint) -> Result<Arc<dyn LedgerClient>, BootstrapError> {
    use vigil_ledger::{EvmLedgerClient, EvmLedgerConfig};

    let LedgerEndpoint::Evm {
        rpc_url,
        contract,
        from,
        credential,
    } = endpoint
    else {
        return Err(BootstrapError::Ledger("not an EVM endpoint".into()));
    };
    let mut evm = EvmLedgerConfig::new(rpc_url, contract, from, EVM_LEDGER_NAME);
    if let Some(credential) = credential {
        evm = evm.with_credential(credential);
    }
    let client = EvmLedgerClient::new(evm).map_err(|e| BootstrapError::Ledger(e.to_string()))?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "evm-anchor"))]
fn evm_client(_endpoint: &LedgerEndpoint) -> Result<Arc<dyn LedgerClient>, BootstrapError> {
    Err(BootstrapError::EvmUnsupported)
}

fn build_verifier(
    config: &VigilConfig,
) -> Result<Option<Arc<dyn AuthVerifier>>, BootstrapError> {
    if let Some(endpoint) = &config.auth_verifier_endpoint {
        let verifier = IntrospectionVerifier::new(endpoint.clone())
            .map_err(|e| BootstrapError::Verifier(e.to_string()))?;
        return Ok(Some(Arc::new(verifier)));
    }
    if let Some(token) = &config.auth_token {
        return Ok(Some(Arc::new(StaticTokenVerifier::new(token.clone()))));
    }
    tracing::warn!("no admin credential configured; admin endpoints will refuse all requests");
    Ok(None)
}
