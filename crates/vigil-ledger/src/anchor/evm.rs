//! # EVM JSON-RPC Ledger Client
//!
//! Records complaint commitments on an EVM chain by calling the complaint
//! registry contract:
//!
//! ```solidity
//! event ComplaintFiled(string hash, uint256 timestamp);
//! function fileComplaint(string complaintHash) public;
//! ```
//!
//! The commitment is passed as its 64-character lowercase hex string.
//!
//! ## Signing
//!
//! This client holds no private keys. `eth_sendTransaction` is signed by the
//! RPC provider for the configured `from` account. When a credential is
//! configured it is sent to the provider as a bearer token.
//!
//! ## Confirmation
//!
//! A transaction hash is not an anchor. After submission the client polls
//! `eth_getTransactionReceipt` and reports success only for a mined receipt
//! with `status == 0x1`. A reverted receipt is a
//! [`AnchorError::TransactionFailed`]; no receipt within the polling budget
//! is [`AnchorError::LedgerUnavailable`]. The whole exchange still runs
//! inside the anchorer's timeout, so `VIGIL_ANCHOR_TIMEOUT_MS` must cover
//! the chain's block time.
//!
//! ## Retries
//!
//! None. A failed submission surfaces as an [`AnchorError`]; the record stays
//! unanchored until an administrator reconciles it.

use std::time::Duration;

use async_trait::async_trait;

use vigil_core::ContentDigest;

use super::{AnchorError, LedgerClient, LedgerReceipt};

/// 4-byte selector of `fileComplaint(string)`.
/// keccak256("fileComplaint(string)") = 0x49ebcd53...
const FILE_COMPLAINT_SELECTOR: &str = "49ebcd53";

/// Configuration for [`EvmLedgerClient`].
#[derive(Clone)]
pub struct EvmLedgerConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,
    /// Registry contract address (0x-prefixed, 40 hex chars).
    pub contract_address: String,
    /// Sender account signed for by the RPC provider (0x-prefixed).
    pub from_address: String,
    /// Human-readable ledger name stored on anchor references.
    pub ledger_name: String,
    /// Optional bearer credential for the RPC provider.
    pub credential: Option<String>,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
    /// Delay between receipt polls.
    pub receipt_poll_interval: Duration,
    /// Receipt polls before the transaction is reported unconfirmed.
    pub receipt_poll_attempts: u32,
}

impl EvmLedgerConfig {
    /// Configuration with no credential, a 30 s HTTP timeout, and receipt
    /// polling every second for up to a minute.
    pub fn new(
        rpc_url: impl Into<String>,
        contract_address: impl Into<String>,
        from_address: impl Into<String>,
        ledger_name: impl Into<String>,
    ) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            contract_address: contract_address.into(),
            from_address: from_address.into(),
            ledger_name: ledger_name.into(),
            credential: None,
            timeout_secs: 30,
            receipt_poll_interval: Duration::from_secs(1),
            receipt_poll_attempts: 60,
        }
    }

    /// Attach a provider credential.
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }
}

impl std::fmt::Debug for EvmLedgerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmLedgerConfig")
            .field("rpc_url", &self.rpc_url)
            .field("contract_address", &self.contract_address)
            .field("from_address", &self.from_address)
            .field("ledger_name", &self.ledger_name)
            .field("credential", &self.credential.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("receipt_poll_interval", &self.receipt_poll_interval)
            .field("receipt_poll_attempts", &self.receipt_poll_attempts)
            .finish()
    }
}

/// Ledger client for the EVM complaint registry contract.
#[derive(Debug)]
pub struct EvmLedgerClient {
    client: reqwest::Client,
    config: EvmLedgerConfig,
}

impl EvmLedgerClient {
    /// Build a client, validating both addresses.
    pub fn new(config: EvmLedgerConfig) -> Result<Self, AnchorError> {
        if !is_valid_eth_address(&config.contract_address) {
            return Err(AnchorError::Rejected(format!(
                "invalid contract address: {}",
                config.contract_address
            )));
        }
        if !is_valid_eth_address(&config.from_address) {
            return Err(AnchorError::Rejected(format!(
                "invalid from address: {}",
                config.from_address
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AnchorError::LedgerUnavailable {
                ledger: config.ledger_name.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client, config })
    }

    fn unavailable(&self, reason: impl Into<String>) -> AnchorError {
        AnchorError::LedgerUnavailable {
            ledger: self.config.ledger_name.clone(),
            reason: reason.into(),
        }
    }

    /// Send a JSON-RPC request and return the `result` field.
    async fn rpc_call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, AnchorError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let mut request = self.client.post(&self.config.rpc_url).json(&body);
        if let Some(credential) = &self.config.credential {
            request = request.bearer_auth(credential);
        }

        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                self.unavailable("request timed out")
            } else {
                self.unavailable(e.to_string())
            }
        })?;

        if !resp.status().is_success() {
            return Err(self.unavailable(format!("HTTP {}", resp.status())));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| self.unavailable(format!("invalid JSON response: {e}")))?;

        if let Some(error) = json.get("error") {
            let msg = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown RPC error");
            return Err(AnchorError::TransactionFailed {
                ledger: self.config.ledger_name.clone(),
                reason: msg.to_string(),
            });
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| self.unavailable("JSON-RPC response missing 'result' field"))
    }

    /// Wait for the receipt of `tx_hash` and require a successful status.
    async fn await_confirmation(&self, tx_hash: &str) -> Result<(), AnchorError> {
        for attempt in 0..self.config.receipt_poll_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.config.receipt_poll_interval).await;
            }

            let receipt = self
                .rpc_call("eth_getTransactionReceipt", serde_json::json!([tx_hash]))
                .await?;
            if receipt.is_null() {
                continue;
            }

            return match receipt.get("status").and_then(|s| s.as_str()) {
                Some("0x1") => Ok(()),
                Some("0x0") => Err(AnchorError::TransactionFailed {
                    ledger: self.config.ledger_name.clone(),
                    reason: format!("transaction {tx_hash} reverted"),
                }),
                other => Err(self.unavailable(format!(
                    "receipt for {tx_hash} has unexpected status {other:?}"
                ))),
            };
        }

        Err(self.unavailable(format!(
            "no receipt for {tx_hash} after {} polls",
            self.config.receipt_poll_attempts
        )))
    }

    /// ABI-encode `fileComplaint(string)` with the commitment hex as argument.
    ///
    /// Layout: selector, head word holding the offset of the string (0x20),
    /// length word, then the UTF-8 bytes right-padded to a word boundary.
    fn encode_calldata(commitment: &ContentDigest) -> String {
        let arg = commitment.to_hex();
        let bytes = arg.as_bytes();
        let padded_len = bytes.len().div_ceil(32) * 32;

        let mut data = Vec::with_capacity(64 + padded_len);
        data.extend_from_slice(&abi_word(32));
        data.extend_from_slice(&abi_word(bytes.len() as u64));
        data.extend_from_slice(bytes);
        data.resize(64 + padded_len, 0);

        format!("0x{FILE_COMPLAINT_SELECTOR}{}", hex::encode(data))
    }
}

#[async_trait]
impl LedgerClient for EvmLedgerClient {
    async fn submit_commitment(
        &self,
        commitment: &ContentDigest,
    ) -> Result<LedgerReceipt, AnchorError> {
        let tx = serde_json::json!({
            "from": self.config.from_address,
            "to": self.config.contract_address,
            "data": Self::encode_calldata(commitment),
        });

        let result = self
            .rpc_call("eth_sendTransaction", serde_json::json!([tx]))
            .await?;

        let tx_hash = result
            .as_str()
            .ok_or_else(|| AnchorError::TransactionFailed {
                ledger: self.config.ledger_name.clone(),
                reason: "eth_sendTransaction returned non-string result".to_string(),
            })?;

        tracing::debug!(
            ledger = %self.config.ledger_name,
            tx = %tx_hash,
            "commitment submitted, awaiting receipt"
        );

        self.await_confirmation(tx_hash).await?;

        Ok(LedgerReceipt {
            ledger: self.config.ledger_name.clone(),
            transaction_id: tx_hash.to_string(),
        })
    }

    fn ledger_id(&self) -> &str {
        &self.config.ledger_name
    }
}

/// Big-endian 32-byte ABI word.
fn abi_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Well-formed Ethereum address: `0x` + 40 hex chars.
fn is_valid_eth_address(addr: &str) -> bool {
    addr.len() == 42
        && addr.starts_with("0x")
        && addr[2..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: &str = "0x0000000000000000000000000000000000000001";
    const FROM: &str = "0x0000000000000000000000000000000000000002";

    #[test]
    fn address_validation() {
        assert!(is_valid_eth_address("0xdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef"));
        assert!(is_valid_eth_address("0xAbCdEf0123456789AbCdEf0123456789AbCdEf01"));
        assert!(!is_valid_eth_address(""));
        assert!(!is_valid_eth_address("0x123"));
        assert!(!is_valid_eth_address("0xGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGGG"));
    }

    #[test]
    fn calldata_encodes_dynamic_string() {
        let digest = ContentDigest::from_bytes([0xab; 32]);
        let calldata = EvmLedgerClient::encode_calldata(&digest);

        // 0x + selector + offset word + length word + two data words.
        assert_eq!(calldata.len(), 2 + 8 + 64 * 4);
        assert!(calldata.starts_with("0x49ebcd53"));

        let body = &calldata[10..];
        assert_eq!(&body[..64], &format!("{:064x}", 32));
        assert_eq!(&body[64..128], &format!("{:064x}", 64));
        assert_eq!(&body[128..], hex::encode("ab".repeat(32)));
    }

    #[test]
    fn abi_word_is_big_endian() {
        let word = abi_word(0x40);
        assert_eq!(word[31], 0x40);
        assert!(word[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn rejects_invalid_addresses() {
        let bad_contract = EvmLedgerConfig::new("https://rpc.example.com", "nope", FROM, "sepolia");
        assert!(matches!(
            EvmLedgerClient::new(bad_contract),
            Err(AnchorError::Rejected(_))
        ));

        let bad_from = EvmLedgerConfig::new("https://rpc.example.com", CONTRACT, "nope", "sepolia");
        assert!(EvmLedgerClient::new(bad_from).is_err());
    }

    #[test]
    fn builds_with_valid_config() {
        let config = EvmLedgerConfig::new("https://rpc.example.com", CONTRACT, FROM, "sepolia");
        let client = EvmLedgerClient::new(config).unwrap();
        assert_eq!(client.ledger_id(), "sepolia");
    }

    /// Minimal JSON-RPC node: hands out a fixed hash and answers every
    /// receipt query with `receipt`.
    async fn spawn_node(receipt: serde_json::Value) -> String {
        use axum::extract::State;
        use axum::routing::post;
        use axum::{Json, Router};

        async fn rpc(
            State(receipt): State<serde_json::Value>,
            Json(req): Json<serde_json::Value>,
        ) -> Json<serde_json::Value> {
            let result = match req["method"].as_str() {
                Some("eth_sendTransaction") => serde_json::json!("0xdeadbeef"),
                Some("eth_getTransactionReceipt") => receipt,
                _ => serde_json::Value::Null,
            };
            Json(serde_json::json!({ "jsonrpc": "2.0", "id": req["id"], "result": result }))
        }

        let router = Router::new().route("/", post(rpc)).with_state(receipt);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/")
    }

    async fn client_for(receipt: serde_json::Value) -> EvmLedgerClient {
        let mut config = EvmLedgerConfig::new(spawn_node(receipt).await, CONTRACT, FROM, "evm");
        config.receipt_poll_interval = Duration::from_millis(10);
        config.receipt_poll_attempts = 3;
        EvmLedgerClient::new(config).unwrap()
    }

    fn digest() -> ContentDigest {
        ContentDigest::from_bytes([0x11; 32])
    }

    #[tokio::test]
    async fn mined_transaction_is_anchored() {
        let client = client_for(serde_json::json!({ "status": "0x1" })).await;
        let receipt = client.submit_commitment(&digest()).await.unwrap();
        assert_eq!(receipt.ledger, "evm");
        assert_eq!(receipt.transaction_id, "0xdeadbeef");
    }

    #[tokio::test]
    async fn reverted_transaction_is_not_anchored() {
        let client = client_for(serde_json::json!({ "status": "0x0" })).await;
        let err = client.submit_commitment(&digest()).await.unwrap_err();
        assert!(matches!(err, AnchorError::TransactionFailed { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn missing_receipt_is_unavailable() {
        let client = client_for(serde_json::Value::Null).await;
        let err = client.submit_commitment(&digest()).await.unwrap_err();
        assert!(matches!(err, AnchorError::LedgerUnavailable { .. }), "{err:?}");
    }

    #[test]
    fn credential_is_redacted() {
        let config = EvmLedgerConfig::new("https://rpc.example.com", CONTRACT, FROM, "sepolia")
            .with_credential("super-secret-api-key");
        let dbg = format!("{config:?}");
        assert!(dbg.contains("[REDACTED]"));
        assert!(!dbg.contains("super-secret-api-key"));
    }
}
