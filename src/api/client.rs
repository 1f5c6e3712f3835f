//! Client for the generic Relatics API
//!
//! The generic API exposes an open-ended set of operations. Instead of one
//! method per operation the client has a single entry point,
//! [`RelaticsClient::call`], which resolves the operation's request template
//! at call time and fills it with the session token, the endpoint identity
//! and the caller's values.

use super::auth::{SessionToken, login_to_relatics};
use super::constants::{Endpoint, api_url, checked_endpoint_url, validate_company_name, validate_url};
use super::template::{HttpTemplateSource, TemplateSource};
use super::transport::{HttpTransport, SoapRequest, SoapResponse, SoapTransport};
use crate::auth::Credentials;
use crate::config::TransportSettings;
use crate::error::{RelaticsError, Result};
use log::{debug, info};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Which tenant and workspace every call targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointIdentity {
    company_name: String,
    environment_id: String,
    workspace_id: String,
}

impl EndpointIdentity {
    pub fn new(
        company_name: impl Into<String>,
        environment_id: impl Into<String>,
        workspace_id: impl Into<String>,
    ) -> Self {
        Self {
            company_name: company_name.into(),
            environment_id: environment_id.into(),
            workspace_id: workspace_id.into(),
        }
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn environment_id(&self) -> &str {
        &self.environment_id
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }
}

/// Values for one call, substituted after token, environment and workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Single(String),
    Sequence(Vec<String>),
}

impl Payload {
    pub fn values(&self) -> &[String] {
        match self {
            Payload::Single(value) => std::slice::from_ref(value),
            Payload::Sequence(values) => values,
        }
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::Single(value.to_string())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::Single(value)
    }
}

impl From<Vec<String>> for Payload {
    fn from(values: Vec<String>) -> Self {
        Payload::Sequence(values)
    }
}

impl From<Vec<&str>> for Payload {
    fn from(values: Vec<&str>) -> Self {
        Payload::Sequence(values.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Payload {
    fn from(values: [&str; N]) -> Self {
        Payload::Sequence(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Record of one generic API call
#[derive(Clone)]
pub struct Invocation {
    /// Name of the invoked operation
    pub operation: String,
    /// Help page URL the request template was resolved from
    pub url: Url,
    /// The rendered envelope as sent
    pub envelope: String,
    /// Raw response of the service
    pub response: SoapResponse,
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("operation", &self.operation)
            .field("url", &self.url.as_str())
            .field("envelope_len", &self.envelope.len())
            .field("response", &self.response)
            .finish()
    }
}

/// Operation names are used verbatim in URLs and as SOAP element names
fn validate_operation_name(operation: &str) -> Result<()> {
    let mut chars = operation.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(RelaticsError::UnknownOperation(operation.to_string()))
    }
}

/// Authenticated client for the generic Relatics API.
///
/// Construction logs in exactly once; the token is reused for every call and
/// never refreshed. A client holds no per-call state, so it can be shared
/// between tasks.
pub struct RelaticsClient {
    identity: EndpointIdentity,
    credentials: Credentials,
    api_url: Url,
    token: SessionToken,
    transport: Arc<dyn SoapTransport>,
    templates: Arc<dyn TemplateSource>,
}

impl RelaticsClient {
    /// Log in and create a client. A failed login is returned as is.
    pub async fn connect(
        identity: EndpointIdentity,
        credentials: Credentials,
        transport: Arc<dyn SoapTransport>,
        templates: Arc<dyn TemplateSource>,
    ) -> Result<Self> {
        validate_company_name(identity.company_name())?;
        let api_url = validate_url(&api_url(identity.company_name()))?;

        let token = login_to_relatics(transport.as_ref(), api_url.as_str(), &credentials).await?;
        info!(
            "Connected to {} (environment {}, workspace {})",
            identity.company_name(),
            identity.environment_id(),
            identity.workspace_id()
        );

        Ok(Self {
            identity,
            credentials,
            api_url,
            token,
            transport,
            templates,
        })
    }

    /// Log in over HTTP, resolving templates from the service's help pages
    pub async fn connect_http(
        identity: EndpointIdentity,
        credentials: Credentials,
        settings: &TransportSettings,
    ) -> Result<Self> {
        let transport = HttpTransport::new(settings)?;
        let templates = HttpTemplateSource::new(transport.http_client());
        Self::connect(identity, credentials, Arc::new(transport), Arc::new(templates)).await
    }

    pub fn identity(&self) -> &EndpointIdentity {
        &self.identity
    }

    pub fn username(&self) -> &str {
        self.credentials.username()
    }

    /// Token obtained at construction
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    /// Generic API URL calls are posted to
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Bound handle for one operation name
    pub fn operation(&self, name: impl Into<String>) -> OperationHandle<'_> {
        OperationHandle {
            client: self,
            name: name.into(),
        }
    }

    /// Invoke a generic API operation by name.
    ///
    /// The operation's template is filled with the token, environment id and
    /// workspace id followed by the payload values, in that order.
    pub async fn call(&self, operation: &str, payload: impl Into<Payload>) -> Result<Invocation> {
        validate_operation_name(operation)?;
        let payload = payload.into();

        let url = checked_endpoint_url(
            self.identity.company_name(),
            &Endpoint::Operation(operation.to_string()),
        )?;
        info!("Invoking {} with {} values ({})", operation, payload.len(), url);

        let template = self.templates.fetch(operation, &url).await?;

        let mut values: Vec<&str> = vec![
            self.token.as_str(),
            self.identity.environment_id(),
            self.identity.workspace_id(),
        ];
        values.extend(payload.values().iter().map(String::as_str));

        let envelope = template.render(&values)?;
        let request = SoapRequest::new(self.api_url.clone(), template.soap_action(), envelope);
        debug!("Sending {} ({} bytes)", request.action, request.envelope.len());

        let response = self.transport.send(&request).await?;

        Ok(Invocation {
            operation: operation.to_string(),
            url,
            envelope: request.envelope,
            response,
        })
    }
}

impl fmt::Display for RelaticsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RelaticsClient; username: {} company_name: {}",
            self.credentials.username(),
            self.identity.company_name()
        )
    }
}

impl fmt::Debug for RelaticsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelaticsClient")
            .field("identity", &self.identity)
            .field("credentials", &self.credentials)
            .field("api_url", &self.api_url.as_str())
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// A client bound to one operation name
#[derive(Debug, Clone)]
pub struct OperationHandle<'a> {
    client: &'a RelaticsClient,
    name: String,
}

impl OperationHandle<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn call(&self, payload: impl Into<Payload>) -> Result<Invocation> {
        self.client.call(&self.name, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_conversions() {
        assert_eq!(Payload::from("a").values(), &["a".to_string()]);
        assert_eq!(Payload::from(vec!["a", "b"]).len(), 2);
        assert_eq!(Payload::from(["a", "b", "c"]).len(), 3);
        assert!(Payload::from(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_operation_name_validation() {
        assert!(validate_operation_name("GetInstances").is_ok());
        assert!(validate_operation_name("_private2").is_ok());
        assert!(validate_operation_name("").is_err());
        assert!(validate_operation_name("2Fast").is_err());
        assert!(validate_operation_name("Get&op=Other").is_err());
        assert!(matches!(
            validate_operation_name("a b"),
            Err(RelaticsError::UnknownOperation(_))
        ));
    }
}
