//! # Application State
//!
//! Process-scoped handles shared by every handler. Built once by
//! [`crate::bootstrap`] (or directly in tests) and cloned per request.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use vigil_crypto::EncryptionKey;
use vigil_intake::{AuthVerifier, ComplaintService, InMemoryComplaintStore};

use crate::config::CorsOrigins;
use crate::throttle::PinThrottle;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ComplaintService>,
    /// `None` means no admin credential is configured; admin routes refuse
    /// every request.
    pub verifier: Option<Arc<dyn AuthVerifier>>,
    pub throttle: PinThrottle,
    /// Present when the binary installed the Prometheus recorder.
    pub metrics: Option<PrometheusHandle>,
    pub cors: CorsOrigins,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service", &self.service)
            .field("verifier", &self.verifier.as_ref().map(|_| "configured"))
            .field("throttle", &self.throttle)
            .field("metrics", &self.metrics.is_some())
            .field("cors", &self.cors)
            .finish()
    }
}

impl AppState {
    pub fn new(service: ComplaintService, verifier: Option<Arc<dyn AuthVerifier>>) -> Self {
        Self {
            service: Arc::new(service),
            verifier,
            throttle: PinThrottle::default(),
            metrics: None,
            cors: CorsOrigins::default(),
        }
    }

    /// In-memory store, fresh key, anchoring disabled, no admin access.
    pub fn in_memory() -> Result<Self, vigil_intake::ServiceBuildError> {
        let service = ComplaintService::builder()
            .store(Arc::new(InMemoryComplaintStore::new()))
            .encryption_key(EncryptionKey::generate())
            .build()?;
        Ok(Self::new(service, None))
    }

    pub fn with_throttle(mut self, throttle: PinThrottle) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_cors(mut self, cors: CorsOrigins) -> Self {
        self.cors = cors;
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
