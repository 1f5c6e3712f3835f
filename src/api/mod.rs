//! Relatics SOAP web service API
//!
//! Two services are covered: the data exchange service (`GetResult` and
//! `Import` through fixed envelopes) and the generic API (`Login` plus any
//! other operation through [`RelaticsClient`]).

pub mod auth;
pub mod client;
pub mod constants;
pub mod encoder;
pub mod envelope;
pub mod operations;
pub mod template;
pub mod transport;

pub use auth::{SessionToken, login, login_to_relatics};
pub use client::{EndpointIdentity, Invocation, OperationHandle, Payload, RelaticsClient};
pub use constants::{Endpoint, endpoint_url, validate_url};
pub use operations::{import_data, read_data};
pub use template::{HttpTemplateSource, OperationTemplate, StaticTemplateSource, TemplateSource};
pub use transport::{HttpTransport, SoapFault, SoapRequest, SoapResponse, SoapTransport, XmlNode};
