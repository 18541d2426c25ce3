//! Blockchain JSON-RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Encode typed requests as `{jsonrpc, method, params, id}` bodies
//! - Separate transport failures, node-reported errors and malformed bodies
//! - Validate hex quantities on receipt so callers get typed values
//!
//! No retries happen here; every failure is returned to the caller.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy::hex;
use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::blockchain::erc20;
use crate::blockchain::types::{BlockchainConfig, ChainId, EncodingError, RpcError};
use crate::blockchain::units;

/// Block selector used for state queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Latest,
    /// Includes transactions still in the mempool.
    Pending,
}

impl BlockTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockTag::Latest => "latest",
            BlockTag::Pending => "pending",
        }
    }
}

/// One typed record per RPC method the wallet uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcRequest {
    ChainId,
    GasPrice,
    GetTransactionCount { address: Address, block: BlockTag },
    GetBalance { address: Address, block: BlockTag },
    Call { to: Address, data: Bytes, block: BlockTag },
    SendRawTransaction { raw: Bytes },
}

impl RpcRequest {
    pub fn method(&self) -> &'static str {
        match self {
            RpcRequest::ChainId => "eth_chainId",
            RpcRequest::GasPrice => "eth_gasPrice",
            RpcRequest::GetTransactionCount { .. } => "eth_getTransactionCount",
            RpcRequest::GetBalance { .. } => "eth_getBalance",
            RpcRequest::Call { .. } => "eth_call",
            RpcRequest::SendRawTransaction { .. } => "eth_sendRawTransaction",
        }
    }

    /// Ordered positional parameters.
    pub fn params(&self) -> Vec<Value> {
        match self {
            RpcRequest::ChainId | RpcRequest::GasPrice => Vec::new(),
            RpcRequest::GetTransactionCount { address, block }
            | RpcRequest::GetBalance { address, block } => {
                vec![json!(address.to_string()), json!(block.as_str())]
            }
            RpcRequest::Call { to, data, block } => vec![
                json!({ "to": to.to_string(), "data": hex::encode_prefixed(data) }),
                json!(block.as_str()),
            ],
            RpcRequest::SendRawTransaction { raw } => vec![json!(hex::encode_prefixed(raw))],
        }
    }
}

/// JSON-RPC 2.0 request body.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: Vec<Value>,
    pub id: u64,
}

/// Error object of a JSON-RPC response.
#[derive(Debug, Deserialize)]
pub struct JsonRpcErrorObject {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
}

/// JSON-RPC response body. Exactly one of the fields is expected.
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<JsonRpcErrorObject>,
}

impl JsonRpcResponse {
    /// Parses a raw body and extracts the result string.
    pub fn parse(body: &str) -> Result<String, RpcError> {
        let response: JsonRpcResponse = serde_json::from_str(body)
            .map_err(|e| RpcError::MalformedResponse(format!("invalid JSON body: {e}")))?;

        match (response.result, response.error) {
            (_, Some(error)) => Err(RpcError::Remote {
                code: error.code,
                message: error.message,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(RpcError::MalformedResponse(
                "response has neither result nor error".to_string(),
            )),
        }
    }
}

/// Carries one request to a node and returns its `result` string.
pub trait RpcTransport: Send + Sync {
    fn request(&self, request: &RpcRequest) -> impl Future<Output = Result<String, RpcError>> + Send;
}

/// HTTP POST transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: url::Url,
    next_id: std::sync::Arc<AtomicU64>,
}

impl HttpTransport {
    /// Create a transport for `endpoint` where each call gives up after `timeout`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, RpcError> {
        let endpoint: url::Url = endpoint
            .parse()
            .map_err(|e| RpcError::Transport(format!("Invalid RPC URL '{}': {}", endpoint, e)))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            next_id: std::sync::Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }
}

impl RpcTransport for HttpTransport {
    async fn request(&self, request: &RpcRequest) -> Result<String, RpcError> {
        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            method: request.method(),
            params: request.params(),
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };

        tracing::trace!(method = body.method, id = body.id, "RPC request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        // Nodes often report errors with a non-2xx status and a JSON-RPC
        // error body, so the body is parsed first.
        match JsonRpcResponse::parse(&text) {
            Err(RpcError::MalformedResponse(_)) if !status.is_success() => Err(
                RpcError::Transport(format!("HTTP {}: {}", status, text.trim())),
            ),
            other => other,
        }
    }
}

/// Typed facade over an [`RpcTransport`].
#[derive(Debug, Clone)]
pub struct BlockchainClient<T> {
    transport: T,
}

impl BlockchainClient<HttpTransport> {
    /// Create an HTTP client from configuration.
    pub fn from_config(config: &BlockchainConfig) -> Result<Self, RpcError> {
        let transport = HttpTransport::new(
            &config.rpc_url,
            Duration::from_secs(config.rpc_timeout_secs),
        )?;
        tracing::debug!(rpc_url = %config.rpc_url, "Blockchain client initialized");
        Ok(Self::new(transport))
    }
}

impl<T: RpcTransport> BlockchainClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Raw call: method + params in, result string out.
    pub async fn call_raw(&self, request: &RpcRequest) -> Result<String, RpcError> {
        self.transport.request(request).await
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> Result<ChainId, RpcError> {
        let result = self.call_raw(&RpcRequest::ChainId).await?;
        parse_quantity(&result, units::hex_to_u64).map(ChainId)
    }

    /// Get the transaction count (nonce) for an address at `block`.
    pub async fn get_transaction_count(&self, address: Address, block: BlockTag) -> Result<u64, RpcError> {
        let result = self
            .call_raw(&RpcRequest::GetTransactionCount { address, block })
            .await?;
        parse_quantity(&result, units::hex_to_u64)
    }

    /// Get current gas price in wei.
    pub async fn get_gas_price(&self) -> Result<u128, RpcError> {
        let result = self.call_raw(&RpcRequest::GasPrice).await?;
        parse_quantity(&result, units::hex_to_u128)
    }

    /// Get the native balance of an address in wei.
    pub async fn get_balance(&self, address: Address) -> Result<U256, RpcError> {
        let result = self
            .call_raw(&RpcRequest::GetBalance {
                address,
                block: BlockTag::Latest,
            })
            .await?;
        parse_quantity(&result, units::hex_to_integer)
    }

    /// Get an ERC-20 balance via `balanceOf`, in token base units.
    pub async fn get_token_balance(&self, token: Address, owner: Address) -> Result<U256, RpcError> {
        let result = self
            .call_raw(&RpcRequest::Call {
                to: token,
                data: erc20::encode_balance_of(&owner),
                block: BlockTag::Latest,
            })
            .await?;
        parse_quantity(&result, erc20::decode_uint256)
    }

    /// Broadcast a signed transaction and return its hash.
    pub async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, RpcError> {
        let result = self
            .call_raw(&RpcRequest::SendRawTransaction { raw })
            .await?;
        result
            .parse::<B256>()
            .map_err(|e| RpcError::MalformedResponse(format!("invalid transaction hash '{result}': {e}")))
    }
}

fn parse_quantity<V>(
    result: &str,
    parse: impl FnOnce(&str) -> Result<V, EncodingError>,
) -> Result<V, RpcError> {
    parse(result).map_err(|e| RpcError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shapes() {
        let address: Address = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".parse().unwrap();
        let request = RpcRequest::GetTransactionCount {
            address,
            block: BlockTag::Pending,
        };
        assert_eq!(request.method(), "eth_getTransactionCount");
        let params = request.params();
        assert_eq!(params.len(), 2);
        assert_eq!(
            params[0].as_str().unwrap().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert_eq!(params[1], "pending");

        assert!(RpcRequest::ChainId.params().is_empty());
        assert_eq!(
            RpcRequest::SendRawTransaction {
                raw: Bytes::from_static(&[0xf8, 0x6b])
            }
            .params(),
            vec![json!("0xf86b")]
        );
    }

    #[test]
    fn test_call_params_carry_calldata() {
        let token = Address::repeat_byte(0x11);
        let request = RpcRequest::Call {
            to: token,
            data: Bytes::from_static(&[0x70, 0xa0, 0x82, 0x31]),
            block: BlockTag::Latest,
        };
        let params = request.params();
        assert_eq!(params[0]["data"], "0x70a08231");
        assert_eq!(params[1], "latest");
    }

    #[test]
    fn test_request_body_serialization() {
        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            method: "eth_chainId",
            params: Vec::new(),
            id: 7,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "method": "eth_chainId", "params": [], "id": 7})
        );
    }

    #[test]
    fn test_response_result() {
        let parsed = JsonRpcResponse::parse(r#"{"jsonrpc":"2.0","id":1,"result":"0x279f"}"#);
        assert_eq!(parsed.unwrap(), "0x279f");
    }

    #[test]
    fn test_response_error_is_verbatim() {
        let parsed = JsonRpcResponse::parse(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"insufficient funds for gas * price + value"}}"#,
        );
        assert_eq!(
            parsed.unwrap_err(),
            RpcError::Remote {
                code: Some(-32000),
                message: "insufficient funds for gas * price + value".into()
            }
        );
    }

    #[test]
    fn test_response_malformed() {
        assert!(matches!(
            JsonRpcResponse::parse("<html>bad gateway</html>"),
            Err(RpcError::MalformedResponse(_))
        ));
        assert!(matches!(
            JsonRpcResponse::parse(r#"{"jsonrpc":"2.0","id":1}"#),
            Err(RpcError::MalformedResponse(_))
        ));
        assert!(matches!(
            JsonRpcResponse::parse(r#"{"jsonrpc":"2.0","id":1,"result":null}"#),
            Err(RpcError::MalformedResponse(_))
        ));
        assert!(matches!(
            JsonRpcResponse::parse(r#"{"jsonrpc":"2.0","id":1,"result":{"hash":"0x"}}"#),
            Err(RpcError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_invalid_endpoint() {
        let result = HttpTransport::new("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(RpcError::Transport(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Bind then release an ephemeral port so nothing is listening on it.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(&format!("http://{}", addr), Duration::from_secs(2)).unwrap();
        let client = BlockchainClient::new(transport);
        let result = client.get_chain_id().await;
        assert!(matches!(result, Err(RpcError::Transport(_))));
    }
}
