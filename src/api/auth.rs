use super::constants::{Endpoint, checked_endpoint_url, validate_url};
use super::envelope::{Envelope, LoginEnvelope};
use super::transport::{SoapRequest, SoapTransport};
use crate::auth::Credentials;
use crate::error::{RelaticsError, Result};
use log::{debug, info};
use std::fmt;

/// Opaque session token returned by the generic API login
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// Log in to the generic API at `url` and return the session token.
///
/// The token is the text of the login result element and is not interpreted
/// any further. SOAP faults, error statuses and empty results are reported
/// as [`RelaticsError::LoginFailed`]; network failures stay
/// [`RelaticsError::Transport`].
pub async fn login_to_relatics(
    transport: &dyn SoapTransport,
    url: &str,
    credentials: &Credentials,
) -> Result<SessionToken> {
    let url = validate_url(url)?;
    info!("Logging in to {} as {}", url, credentials.username());

    let envelope = LoginEnvelope {
        username: credentials.username(),
        password: credentials.password(),
    };
    let request = SoapRequest::new(url, envelope.action(), envelope.render()?);

    let response = transport
        .send(&request)
        .await
        .map_err(|e| match e {
            RelaticsError::Transport(_) => e,
            other => RelaticsError::LoginFailed(other.to_string()),
        })?;
    debug!("Login response status: {}", response.status());

    if let Some(fault) = response.fault() {
        return Err(RelaticsError::LoginFailed(format!(
            "{}: {}",
            fault.code, fault.message
        )));
    }

    match response.result_text() {
        Some(token) => {
            info!("Successfully logged in as {}", credentials.username());
            Ok(SessionToken::new(token))
        }
        None => Err(RelaticsError::LoginFailed(
            "No token in login response".to_string(),
        )),
    }
}

/// Log in to the generic API of `company_name`.
///
/// The company name is checked before any URL is built, so a value that
/// would steer the request to another host fails with
/// [`RelaticsError::InvalidUrl`] and nothing is sent.
pub async fn login(
    transport: &dyn SoapTransport,
    company_name: &str,
    credentials: &Credentials,
) -> Result<SessionToken> {
    let url = checked_endpoint_url(company_name, &Endpoint::Api)?;
    login_to_relatics(transport, url.as_str(), credentials).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_debug_is_redacted() {
        let token = SessionToken::new("abc-123");
        assert_eq!(token.as_str(), "abc-123");
        assert!(!format!("{:?}", token).contains("abc-123"));
    }

    #[tokio::test]
    async fn test_network_failure_stays_transport_error() {
        let settings = crate::config::TransportSettings::default();
        let transport = crate::api::transport::HttpTransport::new(&settings).unwrap();

        // Nothing listens on port 1, the connection is refused
        let result = login_to_relatics(
            &transport,
            "http://127.0.0.1:1/api/relaticsapi.asmx?WSDL",
            &Credentials::new("jane", "s3cret"),
        )
        .await;

        assert!(matches!(result, Err(RelaticsError::Transport(_))));
    }
}
