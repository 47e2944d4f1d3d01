//! # Service Configuration
//!
//! [`VigilConfig`] is read once by the binary from the process environment.
//! Library crates never read the environment; everything they need is
//! handed to them by [`crate::bootstrap`].
//!
//! | Variable                       | Meaning                                   | Default        |
//! |--------------------------------|-------------------------------------------|----------------|
//! | `PORT`                         | Listen port                               | `4000`         |
//! | `VIGIL_ENCRYPTION_KEY`         | 64 hex chars                              | ephemeral      |
//! | `VIGIL_LEDGER_ENDPOINT`        | `mock` or an EVM JSON-RPC URL             | no ledger      |
//! | `VIGIL_LEDGER_CREDENTIAL`      | Bearer credential for the RPC provider    | none           |
//! | `VIGIL_LEDGER_CONTRACT`        | Registry contract address                 | required w/ URL|
//! | `VIGIL_LEDGER_FROM`            | Sender account                            | required w/ URL|
//! | `VIGIL_ANCHOR_POLICY`          | `disabled`, `best_effort`, `required`     | `best_effort`  |
//! | `VIGIL_ANCHOR_TIMEOUT_MS`      | Ledger call timeout                       | `5000`         |
//! | `VIGIL_AUTH_TOKEN`             | Shared admin bearer token                 | none           |
//! | `VIGIL_AUTH_VERIFIER_ENDPOINT` | Token introspection URL                   | none           |
//! | `DATABASE_URL`                 | Postgres URL                              | in-memory      |
//! | `VIGIL_CORS_ORIGINS`           | `*` or comma-separated browser origins    | `*`            |

use std::time::Duration;

use axum::http::HeaderValue;
use thiserror::Error;
use vigil_crypto::EncryptionKey;
use vigil_ledger::{AnchorPolicy, DEFAULT_ANCHOR_TIMEOUT};

/// Port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 4000;

/// Configuration errors. Messages never include secret values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("{name} must be set when {because}")]
    Missing {
        name: &'static str,
        because: &'static str,
    },
}

/// Where anchoring requests go.
#[derive(Clone, PartialEq, Eq)]
pub enum LedgerEndpoint {
    /// In-process mock ledger, for demos and tests.
    Mock,
    /// EVM JSON-RPC provider.
    Evm {
        rpc_url: String,
        contract: String,
        from: String,
        credential: Option<String>,
    },
}

impl std::fmt::Debug for LedgerEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mock => f.write_str("Mock"),
            Self::Evm {
                rpc_url,
                contract,
                from,
                credential,
            } => f
                .debug_struct("Evm")
                .field("rpc_url", rpc_url)
                .field("contract", contract)
                .field("from", from)
                .field("credential", &credential.as_ref().map(|_| "[REDACTED]"))
                .finish(),
        }
    }
}

/// Browser origins allowed to call the API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsOrigins {
    /// Any origin. Admin calls carry bearer tokens, not cookies.
    #[default]
    Any,
    /// Exactly these origins.
    List(Vec<HeaderValue>),
}

impl CorsOrigins {
    /// Parse `*` or a comma-separated list of `http(s)://` origins.
    pub fn parse(raw: &str) -> Result<Self, String> {
        if raw.trim() == "*" {
            return Ok(Self::Any);
        }
        let origins = raw
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(|origin| {
                if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                    return Err(format!("{origin:?} is not an http(s) origin"));
                }
                HeaderValue::from_str(origin).map_err(|e| format!("{origin:?}: {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if origins.is_empty() {
            return Err("no origins listed".into());
        }
        Ok(Self::List(origins))
    }
}

/// Process configuration.
///
/// Custom `Debug` redacts the encryption key and tokens.
#[derive(Clone)]
pub struct VigilConfig {
    pub port: u16,
    pub encryption_key: Option<EncryptionKey>,
    pub ledger: Option<LedgerEndpoint>,
    pub anchor_policy: AnchorPolicy,
    pub anchor_timeout: Duration,
    pub auth_token: Option<String>,
    pub auth_verifier_endpoint: Option<String>,
    pub database_url: Option<String>,
    pub cors_origins: CorsOrigins,
}

impl Default for VigilConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            encryption_key: None,
            ledger: None,
            anchor_policy: AnchorPolicy::default(),
            anchor_timeout: DEFAULT_ANCHOR_TIMEOUT,
            auth_token: None,
            auth_verifier_endpoint: None,
            database_url: None,
            cors_origins: CorsOrigins::default(),
        }
    }
}

impl std::fmt::Debug for VigilConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VigilConfig")
            .field("port", &self.port)
            .field("encryption_key", &self.encryption_key.as_ref().map(|_| "[REDACTED]"))
            .field("ledger", &self.ledger)
            .field("anchor_policy", &self.anchor_policy)
            .field("anchor_timeout", &self.anchor_timeout)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("auth_verifier_endpoint", &self.auth_verifier_endpoint)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

impl VigilConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let encryption_key = get("VIGIL_ENCRYPTION_KEY")
            .map(|raw| {
                EncryptionKey::from_hex(&raw).map_err(|e| ConfigError::Invalid {
                    name: "VIGIL_ENCRYPTION_KEY",
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let ledger = match get("VIGIL_LEDGER_ENDPOINT") {
            None => None,
            Some(endpoint) if endpoint.eq_ignore_ascii_case("mock") => Some(LedgerEndpoint::Mock),
            Some(endpoint) => {
                let because = "VIGIL_LEDGER_ENDPOINT is a URL";
                Some(LedgerEndpoint::Evm {
                    rpc_url: endpoint,
                    contract: get("VIGIL_LEDGER_CONTRACT").ok_or(ConfigError::Missing {
                        name: "VIGIL_LEDGER_CONTRACT",
                        because,
                    })?,
                    from: get("VIGIL_LEDGER_FROM").ok_or(ConfigError::Missing {
                        name: "VIGIL_LEDGER_FROM",
                        because,
                    })?,
                    credential: get("VIGIL_LEDGER_CREDENTIAL"),
                })
            }
        };

        let anchor_policy = match get("VIGIL_ANCHOR_POLICY") {
            Some(raw) => raw.parse::<AnchorPolicy>().map_err(|reason| ConfigError::Invalid {
                name: "VIGIL_ANCHOR_POLICY",
                reason,
            })?,
            None => AnchorPolicy::default(),
        };
        if anchor_policy == AnchorPolicy::Required && ledger.is_none() {
            return Err(ConfigError::Missing {
                name: "VIGIL_LEDGER_ENDPOINT",
                because: "VIGIL_ANCHOR_POLICY is required",
            });
        }

        let anchor_timeout = match get("VIGIL_ANCHOR_TIMEOUT_MS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        name: "VIGIL_ANCHOR_TIMEOUT_MS",
                        reason: "must be greater than zero".into(),
                    })
                }
                Ok(ms) => Duration::from_millis(ms),
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        name: "VIGIL_ANCHOR_TIMEOUT_MS",
                        reason: e.to_string(),
                    })
                }
            },
            None => DEFAULT_ANCHOR_TIMEOUT,
        };

        let cors_origins = match get("VIGIL_CORS_ORIGINS") {
            Some(raw) => CorsOrigins::parse(&raw).map_err(|reason| ConfigError::Invalid {
                name: "VIGIL_CORS_ORIGINS",
                reason,
            })?,
            None => CorsOrigins::default(),
        };

        Ok(Self {
            port,
            encryption_key,
            ledger,
            anchor_policy,
            anchor_timeout,
            auth_token: get("VIGIL_AUTH_TOKEN"),
            auth_verifier_endpoint: get("VIGIL_AUTH_VERIFIER_ENDPOINT"),
            database_url: get("DATABASE_URL"),
            cors_origins,
        })
    }
}
