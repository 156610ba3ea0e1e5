//! Outbound collaborators: the external HTTP fetch and the cloud-storage
//! listing. Both are opaque to the handlers, which only see success or failure.

use async_trait::async_trait;
use thiserror::Error;

/// External URL targeted by the plain HTTP fetch and the fan-out fallback.
pub const EXTERNAL_URL: &str = "https://aws.amazon.com";

/// Error type for outbound calls. Never fatal: the failing request gets a
/// server-error response and the process keeps serving.
#[derive(Debug, Error)]
pub enum OutboundError {
    #[error("outbound http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cloud storage call failed: {0}")]
    Storage(String),
}

/// Issue a GET and wait for the response head, returning its status code.
pub async fn http_get(client: &reqwest::Client, url: &str) -> Result<u16, OutboundError> {
    let response = client.get(url).send().await?;
    Ok(response.status().as_u16())
}

/// Cloud-storage seam used by the `aws-sdk-call` endpoint.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List the buckets visible to the configured credentials, returning how
    /// many there are.
    async fn list_buckets(&self) -> Result<usize, OutboundError>;
}

/// S3-backed [`ObjectStore`].
pub struct S3Store {
    client: aws_sdk_s3::Client,
}

impl S3Store {
    /// Build a client from the default credential provider chain, pinned to
    /// us-west-2.
    pub async fn load() -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new("us-west-2"))
            .load()
            .await;
        Self {
            client: aws_sdk_s3::Client::new(&config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_buckets(&self) -> Result<usize, OutboundError> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|err| OutboundError::Storage(err.to_string()))?;
        Ok(output.buckets().len())
    }
}
