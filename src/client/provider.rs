use async_trait::async_trait;
use serde_json::Value;

use crate::types::ClientError;

/// Capability to fetch a URI and hand back the parsed JSON body.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn exec_request(&self, uri: &str) -> Result<Value, ClientError>;
}
