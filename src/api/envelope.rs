//! Typed SOAP envelopes for the fixed Relatics operations
//!
//! Every envelope is a plain record rendered through an XML writer, so all
//! caller supplied values end up escaped text nodes and every field is
//! present by construction.

use super::constants::soap;
use crate::error::{RelaticsError, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fmt;

/// Namespace prefix used for the service elements
const SERVICE_PREFIX: &str = "rel";

/// Small helper around the quick-xml writer, shared by the envelopes and the
/// data encoder
pub struct XmlBuilder {
    writer: Writer<Vec<u8>>,
}

impl XmlBuilder {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    pub fn declaration(&mut self) -> Result<&mut Self> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(RelaticsError::xml)?;
        Ok(self)
    }

    pub fn start(&mut self, name: &str) -> Result<&mut Self> {
        self.start_with_attributes(name, &[])
    }

    pub fn start_with_attributes(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
    ) -> Result<&mut Self> {
        let mut element = BytesStart::new(name);
        for attribute in attributes {
            element.push_attribute(*attribute);
        }
        self.writer
            .write_event(Event::Start(element))
            .map_err(RelaticsError::xml)?;
        Ok(self)
    }

    pub fn end(&mut self, name: &str) -> Result<&mut Self> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(RelaticsError::xml)?;
        Ok(self)
    }

    pub fn empty(&mut self, name: &str) -> Result<&mut Self> {
        self.writer
            .write_event(Event::Empty(BytesStart::new(name)))
            .map_err(RelaticsError::xml)?;
        Ok(self)
    }

    /// Write `<name>text</name>`, escaping the text
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self> {
        if text.is_empty() {
            return self.empty(name);
        }
        self.start(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(RelaticsError::xml)?;
        self.end(name)
    }

    pub fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner()).map_err(RelaticsError::xml)
    }
}

impl Default for XmlBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn service_element(local: &str) -> String {
    format!("{}:{}", SERVICE_PREFIX, local)
}

/// A request envelope for one fixed service operation
pub trait Envelope {
    /// Value of the SOAPAction header
    fn action(&self) -> &'static str;

    /// Namespace bound to the service prefix
    fn namespace(&self) -> &'static str;

    /// Write the operation element inside the SOAP body
    fn write_body(&self, xml: &mut XmlBuilder) -> Result<()>;

    /// Render the complete envelope
    fn render(&self) -> Result<String> {
        let mut xml = XmlBuilder::new();
        let service_ns = format!("xmlns:{}", SERVICE_PREFIX);
        xml.declaration()?.start_with_attributes(
            "soapenv:Envelope",
            &[
                ("xmlns:soapenv", soap::ENVELOPE_NS),
                (service_ns.as_str(), self.namespace()),
            ],
        )?;
        xml.empty("soapenv:Header")?.start("soapenv:Body")?;
        self.write_body(&mut xml)?;
        xml.end("soapenv:Body")?.end("soapenv:Envelope")?;
        xml.finish()
    }
}

/// Writes the Operation / Identification / Authentication block shared by
/// the data exchange envelopes
fn write_data_exchange_header(
    xml: &mut XmlBuilder,
    operation: &str,
    workspace: &str,
    entry_code: &str,
    with_parameters: bool,
) -> Result<()> {
    let identification = service_element("Identification");
    let authentication = service_element("Authentication");

    xml.text_element(&service_element("Operation"), operation)?;
    xml.start(&identification)?
        .start(&identification)?
        .text_element(&service_element("Workspace"), workspace)?
        .end(&identification)?
        .end(&identification)?;
    if with_parameters {
        xml.empty(&service_element("Parameters"))?;
    }
    xml.start(&authentication)?
        .start(&authentication)?
        .text_element(&service_element("Entrycode"), entry_code)?
        .end(&authentication)?
        .end(&authentication)?;
    Ok(())
}

/// Read envelope (`GetResult` on the data exchange service)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadEnvelope {
    pub operation: String,
    pub workspace: String,
    pub entry_code: String,
}

impl Envelope for ReadEnvelope {
    fn action(&self) -> &'static str {
        soap::GET_RESULT_ACTION
    }

    fn namespace(&self) -> &'static str {
        soap::DATA_EXCHANGE_NS
    }

    fn write_body(&self, xml: &mut XmlBuilder) -> Result<()> {
        let root = service_element("GetResult");
        xml.start(&root)?;
        write_data_exchange_header(xml, &self.operation, &self.workspace, &self.entry_code, true)?;
        xml.end(&root)?;
        Ok(())
    }
}

/// File name reported to the import service
pub const IMPORT_FILENAME: &str = "import.xml";

/// Import envelope (`Import` on the data exchange service)
///
/// `data` is the already encoded payload, see [`super::encoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEnvelope {
    pub operation: String,
    pub workspace: String,
    pub entry_code: String,
    pub data: String,
}

impl Envelope for ImportEnvelope {
    fn action(&self) -> &'static str {
        soap::IMPORT_ACTION
    }

    fn namespace(&self) -> &'static str {
        soap::DATA_EXCHANGE_NS
    }

    fn write_body(&self, xml: &mut XmlBuilder) -> Result<()> {
        let root = service_element("Import");
        xml.start(&root)?;
        write_data_exchange_header(xml, &self.operation, &self.workspace, &self.entry_code, false)?;
        xml.text_element(&service_element("Filename"), IMPORT_FILENAME)?
            .text_element(&service_element("Data"), &self.data)?
            .end(&root)?;
        Ok(())
    }
}

/// Login envelope (`Login` on the generic API)
#[derive(Clone, PartialEq, Eq)]
pub struct LoginEnvelope<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

impl fmt::Debug for LoginEnvelope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginEnvelope")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Envelope for LoginEnvelope<'_> {
    fn action(&self) -> &'static str {
        soap::LOGIN_ACTION
    }

    fn namespace(&self) -> &'static str {
        soap::API_NS
    }

    fn write_body(&self, xml: &mut XmlBuilder) -> Result<()> {
        let root = service_element("Login");
        xml.start(&root)?
            .text_element(&service_element("username"), self.username)?
            .text_element(&service_element("password"), self.password)?
            .end(&root)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_envelope() -> ReadEnvelope {
        ReadEnvelope {
            operation: "GetItems".to_string(),
            workspace: "W1".to_string(),
            entry_code: "E1".to_string(),
        }
    }

    #[test]
    fn test_read_envelope_fields() {
        let xml = read_envelope().render().unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<rel:Operation>GetItems</rel:Operation>"));
        assert!(xml.contains("<rel:Workspace>W1</rel:Workspace>"));
        assert!(xml.contains("<rel:Entrycode>E1</rel:Entrycode>"));
        assert!(xml.contains("xmlns:rel=\"http://www.relatics.com/\""));
        assert!(roxmltree::Document::parse(&xml).is_ok());
    }

    #[test]
    fn test_read_envelope_is_deterministic() {
        assert_eq!(read_envelope().render().unwrap(), read_envelope().render().unwrap());
    }

    #[test]
    fn test_values_are_escaped() {
        let envelope = ReadEnvelope {
            operation: "<Evil & \"op\">".to_string(),
            workspace: "W1".to_string(),
            entry_code: "E1".to_string(),
        };
        let xml = envelope.render().unwrap();

        assert!(!xml.contains("<Evil"));
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let operation = doc
            .descendants()
            .find(|n| n.has_tag_name((soap::DATA_EXCHANGE_NS, "Operation")))
            .unwrap();
        assert_eq!(operation.text(), Some("<Evil & \"op\">"));
    }

    #[test]
    fn test_import_envelope_carries_data() {
        let envelope = ImportEnvelope {
            operation: "ImportItems".to_string(),
            workspace: "W1".to_string(),
            entry_code: "E1".to_string(),
            data: "PEltcG9ydC8+".to_string(),
        };
        let xml = envelope.render().unwrap();

        assert!(xml.contains("<rel:Import>"));
        assert!(xml.contains("<rel:Filename>import.xml</rel:Filename>"));
        assert!(xml.contains("<rel:Data>PEltcG9ydC8+</rel:Data>"));
        assert_eq!(envelope.action(), soap::IMPORT_ACTION);
    }

    #[test]
    fn test_login_envelope() {
        let envelope = LoginEnvelope {
            username: "jane",
            password: "s3cret",
        };
        let xml = envelope.render().unwrap();

        assert!(xml.contains("<rel:username>jane</rel:username>"));
        assert!(xml.contains("<rel:password>s3cret</rel:password>"));
        assert!(xml.contains("xmlns:rel=\"http://www.relatics.com/api/\""));
    }

    #[test]
    fn test_login_envelope_debug_hides_password() {
        let envelope = LoginEnvelope {
            username: "jane",
            password: "s3cret",
        };
        let debug = format!("{:?}", envelope);

        assert!(debug.contains("jane"));
        assert!(!debug.contains("s3cret"));
    }
}
