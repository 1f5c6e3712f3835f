//! Data exchange operations: reading and importing through the
//! `DataExchange.asmx` service

use crate::api::constants::{Endpoint, checked_endpoint_url};
use crate::api::encoder;
use crate::api::envelope::{Envelope, ImportEnvelope, ReadEnvelope};
use crate::api::transport::{SoapRequest, SoapResponse, SoapTransport};
use crate::error::{RelaticsError, Result};
use log::{debug, info};
use serde_json::Value;

/// Message of the error returned for import payloads that are not a mapping
pub const IMPORT_DATA_NOT_A_MAPPING: &str = "data must be a dictionary";

/// Read data through a webservice entry (`GetResult`).
///
/// The data exchange URL is validated before anything is sent; an invalid
/// company name fails with [`RelaticsError::InvalidUrl`].
pub async fn read_data(
    transport: &dyn SoapTransport,
    company_name: &str,
    workspace: &str,
    operation: &str,
    entry_code: &str,
) -> Result<SoapResponse> {
    let url = checked_endpoint_url(company_name, &Endpoint::DataExchange)?;
    info!("Reading '{}' from workspace {} at {}", operation, workspace, url);

    let envelope = ReadEnvelope {
        operation: operation.to_string(),
        workspace: workspace.to_string(),
        entry_code: entry_code.to_string(),
    };
    let request = SoapRequest::new(url, envelope.action(), envelope.render()?);
    debug!("Read envelope: {} bytes", request.envelope.len());

    transport.send(&request).await
}

/// Import (create or update) data through an import definition (`Import`).
///
/// `data` must be a JSON object; every other value is rejected with
/// [`RelaticsError::InvalidImportData`] before any URL or network work.
pub async fn import_data(
    transport: &dyn SoapTransport,
    company_name: &str,
    workspace: &str,
    operation: &str,
    entry_code: &str,
    data: &Value,
) -> Result<SoapResponse> {
    let Some(mapping) = data.as_object() else {
        return Err(RelaticsError::InvalidImportData(
            IMPORT_DATA_NOT_A_MAPPING.to_string(),
        ));
    };

    let url = checked_endpoint_url(company_name, &Endpoint::DataExchange)?;
    info!(
        "Importing {} fields via '{}' into workspace {} at {}",
        mapping.len(),
        operation,
        workspace,
        url
    );

    let envelope = ImportEnvelope {
        operation: operation.to_string(),
        workspace: workspace.to_string(),
        entry_code: entry_code.to_string(),
        data: encoder::encode_mapping(mapping)?,
    };
    let request = SoapRequest::new(url, envelope.action(), envelope.render()?);
    debug!("Import envelope: {} bytes", request.envelope.len());

    transport.send(&request).await
}
