//! Import data encoding
//!
//! The import service takes a file in its `Data` field. A key-value mapping is
//! written as one `Row` inside an `Import` document and that document is then
//! base64 encoded so it can travel as plain text inside the SOAP envelope.

use super::envelope::XmlBuilder;
use crate::error::Result;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::{Map, Value};

/// Root element of the import document
pub const IMPORT_ROOT: &str = "Import";

/// Element wrapping one record
pub const ROW_ELEMENT: &str = "Row";

/// Text written for a single mapping value
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        // Nested structures are passed through as compact JSON
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Convert a mapping into the import XML document, one element per pair in
/// the mapping's iteration order
pub fn mapping_to_xml(data: &Map<String, Value>) -> Result<String> {
    let mut xml = XmlBuilder::new();
    xml.start(IMPORT_ROOT)?.start(ROW_ELEMENT)?;
    for (key, value) in data {
        xml.text_element(key, &value_text(value))?;
    }
    xml.end(ROW_ELEMENT)?.end(IMPORT_ROOT)?;
    xml.finish()
}

/// Encode an XML document for the `Data` field of the import envelope
pub fn encode_data(xml: &str) -> String {
    STANDARD.encode(xml.as_bytes())
}

/// Mapping straight to the encoded `Data` value
pub fn encode_mapping(data: &Map<String, Value>) -> Result<String> {
    let xml = mapping_to_xml(data)?;
    log::debug!("Encoded import document with {} fields", data.len());
    Ok(encode_data(&xml))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_fields_in_mapping_order() {
        let data = as_map(json!({
            "Name": "Bridge",
            "Code": "B-01",
            "Area": "North",
        }));

        let xml = mapping_to_xml(&data).unwrap();
        assert_eq!(
            xml,
            "<Import><Row><Name>Bridge</Name><Code>B-01</Code><Area>North</Area></Row></Import>"
        );
    }

    #[test]
    fn test_element_count_matches_pairs() {
        let mut data = Map::new();
        for i in 0..7 {
            data.insert(format!("Field{}", i), Value::String(format!("value {}", i)));
        }

        let xml = mapping_to_xml(&data).unwrap();
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let row = doc.descendants().find(|n| n.has_tag_name(ROW_ELEMENT)).unwrap();
        let fields: Vec<_> = row.children().filter(|n| n.is_element()).collect();

        assert_eq!(fields.len(), 7);
        for (i, field) in fields.iter().enumerate() {
            assert_eq!(field.tag_name().name(), format!("Field{}", i));
            assert_eq!(field.text(), Some(format!("value {}", i).as_str()));
        }
    }

    #[test]
    fn test_values_are_escaped() {
        let data = as_map(json!({ "Description": "a < b & \"c\"" }));

        let xml = mapping_to_xml(&data).unwrap();
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let field = doc.descendants().find(|n| n.has_tag_name("Description")).unwrap();
        assert_eq!(field.text(), Some("a < b & \"c\""));
    }

    #[test]
    fn test_scalar_values() {
        let data = as_map(json!({ "Count": 3, "Active": true, "Notes": null }));

        let xml = mapping_to_xml(&data).unwrap();
        assert!(xml.contains("<Count>3</Count>"));
        assert!(xml.contains("<Active>true</Active>"));
        assert!(xml.contains("<Notes/>"));
    }

    #[test]
    fn test_encode_data_is_base64() {
        let data = as_map(json!({ "Name": "Bridge" }));

        let encoded = encode_mapping(&data).unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        assert_eq!(
            String::from_utf8(decoded).unwrap(),
            "<Import><Row><Name>Bridge</Name></Row></Import>"
        );
    }
}
