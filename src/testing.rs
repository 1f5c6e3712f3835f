//! Test utilities
//!
//! [`RecordingTransport`] stands in for the SOAP transport: it records every
//! request and answers with canned responses keyed by SOAP action.

use crate::api::transport::{SoapRequest, SoapResponse, SoapTransport};
use crate::error::{RelaticsError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Canned login response carrying `token`
pub fn login_response(token: &str) -> SoapResponse {
    SoapResponse::ok(format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#,
            r#"<soap:Body><LoginResponse xmlns="http://www.relatics.com/api/">"#,
            r#"<LoginResult>{}</LoginResult>"#,
            r#"</LoginResponse></soap:Body></soap:Envelope>"#
        ),
        quick_xml::escape::escape(token)
    ))
}

/// Canned SOAP fault response
pub fn fault_response(code: &str, message: &str) -> SoapResponse {
    SoapResponse::new(
        500,
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="utf-8"?>"#,
                r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#,
                r#"<soap:Body><soap:Fault><faultcode>{}</faultcode>"#,
                r#"<faultstring>{}</faultstring></soap:Fault></soap:Body></soap:Envelope>"#
            ),
            quick_xml::escape::escape(code),
            quick_xml::escape::escape(message)
        ),
    )
}

/// Transport that records requests instead of sending them
#[derive(Debug, Default)]
pub struct RecordingTransport {
    responses: HashMap<String, SoapResponse>,
    default_response: Option<SoapResponse>,
    requests: Mutex<Vec<SoapRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests with this SOAP action with `response`
    pub fn with_response(mut self, action: impl Into<String>, response: SoapResponse) -> Self {
        self.responses.insert(action.into(), response);
        self
    }

    /// Answer every other request with `response`
    pub fn with_default_response(mut self, response: SoapResponse) -> Self {
        self.default_response = Some(response);
        self
    }

    fn recorded(&self) -> MutexGuard<'_, Vec<SoapRequest>> {
        self.requests.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All requests in the order they were sent
    pub fn requests(&self) -> Vec<SoapRequest> {
        self.recorded().clone()
    }

    pub fn request_count(&self) -> usize {
        self.recorded().len()
    }

    /// Number of requests sent with the given SOAP action
    pub fn count_for(&self, action: &str) -> usize {
        self.recorded().iter().filter(|r| r.action == action).count()
    }

    pub fn last_request(&self) -> Option<SoapRequest> {
        self.recorded().last().cloned()
    }
}

#[async_trait]
impl SoapTransport for RecordingTransport {
    async fn send(&self, request: &SoapRequest) -> Result<SoapResponse> {
        self.recorded().push(request.clone());

        let response = self
            .responses
            .get(&request.action)
            .or(self.default_response.as_ref())
            .cloned()
            .ok_or_else(|| RelaticsError::HttpStatus {
                status: 500,
                body: format!("no canned response for {}", request.action),
            })?;

        // Mirror the HTTP transport: faults on error statuses become errors
        if !(200..300).contains(&response.status()) {
            if let Some(fault) = response.fault() {
                return Err(fault.into());
            }
            return Err(RelaticsError::HttpStatus {
                status: response.status(),
                body: response.into_text(),
            });
        }

        Ok(response)
    }
}
