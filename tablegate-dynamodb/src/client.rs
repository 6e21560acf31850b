//! A minimal DynamoDB JSON-protocol client.
//!
//! Requests are `POST`s of a JSON body with an `x-amz-target` header naming
//! the operation, signed with SigV4. No SDK is involved; the operation
//! parameters are passed through as given.

use crate::config::DynamoDbConfig;
use crate::error::DynamoDbError;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::Credentials;
use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningSettings};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use aws_types::region::Region;
use http::header::{CONTENT_TYPE, HOST};
use http::{HeaderValue, Method};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

const SERVICE_NAME: &str = "dynamodb";
const TARGET_PREFIX: &str = "DynamoDB_20120810";
const JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.0";

/// Signed DynamoDB client.
///
/// # Example
///
/// ```no_run
/// use serde_json::json;
/// use tablegate_dynamodb::DynamoDbClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = DynamoDbClient::builder()
///         .region("us-west-2")
///         .endpoint("http://localhost:8000")
///         .static_credentials("local", "local")
///         .build()
///         .await?;
///
///     let tables = client.call("ListTables", &json!({})).await?;
///     println!("{tables}");
///     Ok(())
/// }
/// ```
pub struct DynamoDbClient {
    http: Client,
    credentials_provider: Arc<dyn ProvideCredentials>,
    region: String,
    endpoint: String,
}

/// Builder for [`DynamoDbClient`].
#[derive(Default)]
pub struct DynamoDbClientBuilder {
    region: Option<String>,
    endpoint: Option<String>,
    profile: Option<String>,
    timeout: Option<Duration>,
    credentials_provider: Option<Arc<dyn ProvideCredentials>>,
}

impl DynamoDbClientBuilder {
    /// Signing region (default: `us-west-2`).
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Send requests here instead of the regional endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Profile for the default credential chain.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// HTTP request timeout (default: 30 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sign with fixed keys, e.g. the placeholder keys DynamoDB Local takes.
    pub fn static_credentials(
        self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "tablegate-static",
        );
        self.credentials_provider(Arc::new(credentials))
    }

    /// Use this provider instead of the default credential chain.
    pub fn credentials_provider(mut self, provider: Arc<dyn ProvideCredentials>) -> Self {
        self.credentials_provider = Some(provider);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Fails when no credentials are configured or found, or when the HTTP
    /// client cannot be created.
    pub async fn build(self) -> Result<DynamoDbClient, DynamoDbError> {
        let region = self.region.unwrap_or_else(|| "us-west-2".to_string());
        let timeout = self.timeout.unwrap_or(Duration::from_secs(30));

        let credentials_provider = match self.credentials_provider {
            Some(provider) => provider,
            None => {
                let mut loader =
                    aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.clone()));
                if let Some(profile) = &self.profile {
                    loader = loader.profile_name(profile);
                }
                let config = loader.load().await;

                config
                    .credentials_provider()
                    .map(Arc::from)
                    .ok_or_else(|| {
                        DynamoDbError::Credentials(
                            "no AWS credentials found; set static keys or configure the default credential chain".to_string(),
                        )
                    })?
            }
        };

        let endpoint = self
            .endpoint
            .map(|endpoint| endpoint.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("https://dynamodb.{}.amazonaws.com", region));
        url::Url::parse(&endpoint)
            .map_err(|e| DynamoDbError::Config(format!("invalid endpoint '{}': {}", endpoint, e)))?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DynamoDbError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(DynamoDbClient {
            http,
            credentials_provider,
            region,
            endpoint,
        })
    }
}

impl DynamoDbClient {
    pub fn builder() -> DynamoDbClientBuilder {
        DynamoDbClientBuilder::default()
    }

    /// Build a client from shared configuration.
    pub async fn from_config(config: &DynamoDbConfig) -> Result<Self, DynamoDbError> {
        let mut builder = Self::builder()
            .region(config.region.clone())
            .endpoint(config.resolved_endpoint())
            .timeout(config.timeout_duration());

        if let Some((key, secret)) = config.static_keys() {
            builder = builder.static_credentials(key, secret);
        } else if let Some(profile) = &config.profile {
            builder = builder.profile(profile.clone());
        }

        builder.build().await
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Call one operation, e.g. `GetItem`, and return the decoded response.
    pub async fn call(&self, operation: &str, params: &Value) -> Result<Value, DynamoDbError> {
        let request = self.build_signed_request(operation, params).await?;
        log::debug!("DynamoDB {} at {}", operation, self.endpoint);

        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = DynamoDbError::from_response(status.as_u16(), &body);
            log::warn!("DynamoDB {} failed: {}", operation, err);
            return Err(err);
        }

        if body.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(&body)
            .map_err(|e| DynamoDbError::Decode(format!("{} response is not JSON: {}", operation, e)))
    }

    async fn build_signed_request(
        &self,
        operation: &str,
        params: &Value,
    ) -> Result<reqwest::Request, DynamoDbError> {
        let credentials = self
            .credentials_provider
            .provide_credentials()
            .await
            .map_err(|e| DynamoDbError::Credentials(e.to_string()))?;

        let body = serde_json::to_string(params)
            .map_err(|e| DynamoDbError::Signing(format!("failed to serialize parameters: {}", e)))?;

        let url = url::Url::parse(&self.endpoint)
            .map_err(|e| DynamoDbError::Config(format!("invalid endpoint: {}", e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| DynamoDbError::Config("endpoint has no host".to_string()))?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let mut builder = http::Request::builder()
            .method(Method::POST)
            .uri(&self.endpoint)
            .header(HOST, header_value(&host)?)
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
            .header(
                "x-amz-target",
                header_value(&format!("{}.{}", TARGET_PREFIX, operation))?,
            );

        if let Some(token) = credentials.session_token() {
            builder = builder.header("x-amz-security-token", header_value(token)?);
        }

        let http_request = builder
            .body(body.clone())
            .map_err(|e| DynamoDbError::Signing(e.to_string()))?;

        let identity: Identity = credentials.into();
        let signing_params = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(SERVICE_NAME)
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| DynamoDbError::Signing(e.to_string()))?;

        let signable_request = SignableRequest::new(
            http_request.method().as_str(),
            http_request.uri().to_string(),
            http_request
                .headers()
                .iter()
                .map(|(k, v)| (k.as_str(), v.to_str().unwrap_or(""))),
            SignableBody::Bytes(body.as_bytes()),
        )
        .map_err(|e| DynamoDbError::Signing(e.to_string()))?;

        let (signing_instructions, _signature) = sign(signable_request, &signing_params.into())
            .map_err(|e| DynamoDbError::Signing(e.to_string()))?
            .into_parts();

        let mut request = self.http.post(&self.endpoint).body(body);
        for (name, value) in http_request.headers() {
            if let Ok(v) = value.to_str() {
                request = request.header(name.as_str(), v);
            }
        }
        for (name, value) in signing_instructions.headers() {
            let name: &str = name;
            let value = std::str::from_utf8(value.as_bytes()).unwrap_or("");
            request = request.header(name, value);
        }

        Ok(request.build()?)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, DynamoDbError> {
    HeaderValue::from_str(value)
        .map_err(|e| DynamoDbError::Signing(format!("invalid header value '{}': {}", value, e)))
}
