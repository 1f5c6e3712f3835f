//! API Constants and URL construction for the Relatics web services

use crate::error::{RelaticsError, Result};
use url::Url;

/// Protocol prefix for every Relatics endpoint
pub const PROTOCOL: &str = "https://";

/// Host suffix appended to the company name
pub const HOST_SUFFIX: &str = ".relaticsonline.com";

/// Generic API service description
pub const API_WSDL_PATH: &str = "/api/relaticsapi.asmx?WSDL";

/// Data exchange (GetResult / Import) service description
pub const DATA_EXCHANGE_WSDL_PATH: &str = "/DataExchange.asmx?wsdl";

/// Operation help page prefix, the operation name is appended
pub const OPERATION_PATH_PREFIX: &str = "/api/relaticsapi.asmx?op=";

/// SOAP namespaces and actions used by the fixed envelopes
pub mod soap {
    /// SOAP 1.1 envelope namespace
    pub const ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

    /// Namespace of the data exchange service
    pub const DATA_EXCHANGE_NS: &str = "http://www.relatics.com/";

    /// Namespace of the generic API service
    pub const API_NS: &str = "http://www.relatics.com/api/";

    /// SOAP action for reading data
    pub const GET_RESULT_ACTION: &str = "http://www.relatics.com/GetResult";

    /// SOAP action for importing data
    pub const IMPORT_ACTION: &str = "http://www.relatics.com/Import";

    /// SOAP action for logging in to the generic API
    pub const LOGIN_ACTION: &str = "http://www.relatics.com/api/Login";

    /// Content type for SOAP 1.1 requests
    pub const CONTENT_TYPE: &str = "text/xml; charset=utf-8";
}

/// The endpoint variants a company exposes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Generic API WSDL, used for login and dynamic operations
    Api,
    /// Data exchange WSDL, used for reading and importing
    DataExchange,
    /// Help page of a single generic API operation
    Operation(String),
}

impl Endpoint {
    fn path(&self) -> String {
        match self {
            Endpoint::Api => API_WSDL_PATH.to_string(),
            Endpoint::DataExchange => DATA_EXCHANGE_WSDL_PATH.to_string(),
            Endpoint::Operation(operation) => format!("{}{}", OPERATION_PATH_PREFIX, operation),
        }
    }
}

/// Build the URL of an endpoint for the given company
pub fn endpoint_url(company_name: &str, endpoint: &Endpoint) -> String {
    format!("{}{}{}{}", PROTOCOL, company_name, HOST_SUFFIX, endpoint.path())
}

/// Build the generic API WSDL URL
pub fn api_url(company_name: &str) -> String {
    endpoint_url(company_name, &Endpoint::Api)
}

/// Build the data exchange WSDL URL
pub fn data_exchange_url(company_name: &str) -> String {
    endpoint_url(company_name, &Endpoint::DataExchange)
}

/// Build the help page URL of a generic API operation
pub fn operation_url(company_name: &str, operation: &str) -> String {
    endpoint_url(company_name, &Endpoint::Operation(operation.to_string()))
}

/// Check that a company name can be used as a DNS label
pub fn validate_company_name(company_name: &str) -> Result<()> {
    let reason = if company_name.is_empty() {
        Some("company name is empty")
    } else if company_name.len() > 63 {
        Some("company name is longer than 63 characters")
    } else if company_name.starts_with('-') || company_name.ends_with('-') {
        Some("company name cannot start or end with '-'")
    } else if !company_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        Some("company name may only contain letters, digits and '-'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(RelaticsError::invalid_url(
            format!("{}{}{}", PROTOCOL, company_name, HOST_SUFFIX),
            reason,
        )),
        None => Ok(()),
    }
}

/// Parse and check a URL before any request is sent to it
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| RelaticsError::invalid_url(url, e.to_string()))?;

    if parsed.scheme() != "https" && parsed.scheme() != "http" {
        return Err(RelaticsError::invalid_url(
            url,
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(RelaticsError::invalid_url(url, "missing host")),
    }
}

/// Build and validate the URL of an endpoint in one step
pub fn checked_endpoint_url(company_name: &str, endpoint: &Endpoint) -> Result<Url> {
    validate_company_name(company_name)?;
    validate_url(&endpoint_url(company_name, endpoint))
}

/// The address SOAP requests are posted to: the WSDL URL without its query
pub fn service_endpoint(url: &Url) -> Url {
    let mut endpoint = url.clone();
    endpoint.set_query(None);
    endpoint.set_fragment(None);
    endpoint
}
