//! SOAP transport
//!
//! The transport is the only place that touches the network for service
//! calls. It posts a pre-built envelope and hands back the raw response; the
//! `SoapTransport` trait lets tests swap in a recording stub.

use super::constants::{service_endpoint, soap};
use crate::config::TransportSettings;
use crate::error::{RelaticsError, Result};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// A single SOAP request: where to send it, which action and the envelope
#[derive(Clone, PartialEq, Eq)]
pub struct SoapRequest {
    /// WSDL URL of the service, the query is dropped when posting
    pub url: Url,
    /// SOAPAction header value (unquoted)
    pub action: String,
    /// The rendered envelope
    pub envelope: String,
}

impl SoapRequest {
    pub fn new(url: Url, action: impl Into<String>, envelope: String) -> Self {
        Self {
            url,
            action: action.into(),
            envelope,
        }
    }

    /// Envelope as raw bytes, as sent over the wire
    pub fn body(&self) -> &[u8] {
        self.envelope.as_bytes()
    }
}

// Envelopes can carry credentials or tokens, keep them out of debug output
impl fmt::Debug for SoapRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoapRequest")
            .field("url", &self.url.as_str())
            .field("action", &self.action)
            .field("envelope_len", &self.envelope.len())
            .finish()
    }
}

/// A SOAP fault returned by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    pub code: String,
    pub message: String,
}

impl From<SoapFault> for RelaticsError {
    fn from(fault: SoapFault) -> Self {
        RelaticsError::SoapFault {
            code: fault.code,
            message: fault.message,
        }
    }
}

/// Structured view of an XML element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XmlNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let text: String = node
            .children()
            .filter(|child| child.is_text())
            .filter_map(|child| child.text())
            .collect();
        let text = text.trim();

        Self {
            name: node.tag_name().name().to_string(),
            namespace: node.tag_name().namespace().map(str::to_string),
            attributes: node
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect(),
            text: (!text.is_empty()).then(|| text.to_string()),
            children: node
                .children()
                .filter(|child| child.is_element())
                .map(XmlNode::from_node)
                .collect(),
        }
    }

    /// First direct child with the given local name
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Raw response of a SOAP call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapResponse {
    status: u16,
    body: String,
}

impl SoapResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Successful response with the given body
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Raw XML text, unmodified
    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn into_text(self) -> String {
        self.body
    }

    /// Parse the response and return the first element inside the SOAP body
    /// (or the document root when there is no SOAP body)
    pub fn parse(&self) -> Result<XmlNode> {
        let doc = roxmltree::Document::parse(&self.body).map_err(RelaticsError::xml)?;
        let root = doc.root_element();
        let content = root
            .descendants()
            .find(|n| n.has_tag_name((soap::ENVELOPE_NS, "Body")))
            .and_then(|body| body.children().find(|n| n.is_element()))
            .unwrap_or(root);
        Ok(XmlNode::from_node(content))
    }

    /// SOAP fault carried by the body, if any
    pub fn fault(&self) -> Option<SoapFault> {
        let doc = roxmltree::Document::parse(&self.body).ok()?;
        let fault = doc
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == "Fault")?;

        let text_of = |names: &[&str]| -> String {
            fault
                .descendants()
                .find(|n| n.is_element() && names.iter().any(|name| *name == n.tag_name().name()))
                .map(|n| {
                    // SOAP 1.2 nests the text one level deeper (Code/Value, Reason/Text)
                    n.descendants()
                        .filter(|d| d.is_text())
                        .filter_map(|d| d.text())
                        .collect::<String>()
                        .trim()
                        .to_string()
                })
                .unwrap_or_default()
        };

        Some(SoapFault {
            code: text_of(&["faultcode", "Code"]),
            message: text_of(&["faultstring", "Reason"]),
        })
    }

    /// Text of the operation result, e.g. the content of `LoginResult`
    /// inside `LoginResponse`
    pub fn result_text(&self) -> Option<String> {
        let content = self.parse().ok()?;
        let text = match content.children.first() {
            Some(result) => result.text.clone(),
            None => content.text.clone(),
        };
        text.filter(|t| !t.is_empty())
    }
}

/// Sends SOAP requests and returns raw responses
#[async_trait]
pub trait SoapTransport: Send + Sync {
    async fn send(&self, request: &SoapRequest) -> Result<SoapResponse>;
}

/// SOAP over HTTP(S) using reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(settings: &TransportSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(settings.pool_max_idle_per_host)
            .timeout(settings.timeout())
            .connect_timeout(settings.connect_timeout())
            .user_agent(settings.user_agent.as_str())
            .build()?;

        Ok(Self { http_client })
    }

    /// Get shared HTTP client for making requests (cheap clone)
    pub fn http_client(&self) -> reqwest::Client {
        self.http_client.clone()
    }
}

#[async_trait]
impl SoapTransport for HttpTransport {
    async fn send(&self, request: &SoapRequest) -> Result<SoapResponse> {
        let endpoint = service_endpoint(&request.url);
        debug!("POST {} (SOAPAction: {})", endpoint, request.action);

        let response = self
            .http_client
            .post(endpoint)
            .header(CONTENT_TYPE, soap::CONTENT_TYPE)
            .header("SOAPAction", format!("\"{}\"", request.action))
            .body(request.body().to_vec())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Response status: {} ({} bytes)", status, body.len());

        let soap_response = SoapResponse::new(status.as_u16(), body);
        if !status.is_success() {
            if let Some(fault) = soap_response.fault() {
                warn!("SOAP fault for {}: {}", request.action, fault.message);
                return Err(fault.into());
            }
            return Err(RelaticsError::HttpStatus {
                status: status.as_u16(),
                body: soap_response.into_text(),
            });
        }

        Ok(soap_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <LoginResponse xmlns="http://www.relatics.com/api/">
      <LoginResult>token-123</LoginResult>
    </LoginResponse>
  </soap:Body>
</soap:Envelope>"#;

    const FAULT_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultcode>soap:Client</faultcode>
      <faultstring>Server did not recognize the value of HTTP Header SOAPAction</faultstring>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#;

    #[test]
    fn test_parse_returns_body_content() {
        let response = SoapResponse::ok(LOGIN_RESPONSE);
        let node = response.parse().unwrap();

        assert_eq!(node.name, "LoginResponse");
        assert_eq!(node.namespace.as_deref(), Some("http://www.relatics.com/api/"));
        assert_eq!(
            node.child("LoginResult").and_then(|n| n.text.as_deref()),
            Some("token-123")
        );
    }

    #[test]
    fn test_result_text() {
        let response = SoapResponse::ok(LOGIN_RESPONSE);
        assert_eq!(response.result_text().as_deref(), Some("token-123"));
        assert!(response.fault().is_none());
    }

    #[test]
    fn test_fault_detection() {
        let response = SoapResponse::new(500, FAULT_RESPONSE);
        let fault = response.fault().unwrap();

        assert_eq!(fault.code, "soap:Client");
        assert!(fault.message.starts_with("Server did not recognize"));

        let error: RelaticsError = fault.into();
        assert!(matches!(error, RelaticsError::SoapFault { .. }));
    }

    #[test]
    fn test_raw_text_is_unmodified() {
        let response = SoapResponse::ok(LOGIN_RESPONSE);
        assert_eq!(response.text(), LOGIN_RESPONSE);
        assert_eq!(response.into_text(), LOGIN_RESPONSE);
    }

    #[test]
    fn test_parse_rejects_non_xml() {
        let response = SoapResponse::ok("definitely not xml <");
        assert!(matches!(response.parse(), Err(RelaticsError::Xml(_))));
        assert!(response.fault().is_none());
    }

    #[test]
    fn test_request_debug_hides_envelope() {
        let url = Url::parse("https://acme.relaticsonline.com/api/relaticsapi.asmx?WSDL").unwrap();
        let request = SoapRequest::new(url, soap::LOGIN_ACTION, "<password>s3cret</password>".into());
        let debug = format!("{:?}", request);

        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("envelope_len"));
    }
}
