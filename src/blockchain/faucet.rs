//! Testnet faucet client.

use std::time::Duration;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::config::schema::FaucetConfig;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FaucetRequest {
    chain_id: u64,
    address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FaucetResponse {
    #[serde(default)]
    tx_hash: Option<String>,
}

/// Ask the faucet to fund `address`. Returns the faucet's transaction hash.
pub async fn request_funds(config: &FaucetConfig, address: Address, timeout: Duration) -> BlockchainResult<String> {
    let http = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BlockchainError::Faucet(e.to_string()))?;

    let res = http
        .post(&config.url)
        .json(&FaucetRequest {
            chain_id: config.chain_id,
            address: address.to_string(),
        })
        .send()
        .await
        .map_err(|e| BlockchainError::Faucet(format!("request failed: {e}")))?;

    let status = res.status();
    let text = res
        .text()
        .await
        .map_err(|e| BlockchainError::Faucet(e.to_string()))?;

    if !status.is_success() {
        return Err(BlockchainError::Faucet(format!("({}) {}", status.as_u16(), text.trim())));
    }

    let body: FaucetResponse = serde_json::from_str(&text)
        .map_err(|e| BlockchainError::Faucet(format!("unexpected response: {e}")))?;

    tracing::info!(address = %address, tx_hash = ?body.tx_hash, "Faucet funded wallet");

    body.tx_hash
        .ok_or_else(|| BlockchainError::Faucet(format!("response has no txHash: {}", text.trim())))
}
