//! Request templates for generic API operations
//!
//! The generic API has far more operations than the fixed envelopes cover.
//! Their request layout is looked up at call time: every ASMX operation has a
//! help page (`relaticsapi.asmx?op=Name`) showing a sample SOAP 1.1 request in
//! which each value is a placeholder. Those placeholders become positional
//! slots that are filled with escaped values when the request is rendered.

use crate::error::{RelaticsError, Result};
use async_trait::async_trait;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use url::Url;

/// `<pre>` blocks on the help page
static PRE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<pre>(.*?)</pre>").expect("valid pre block pattern"));

/// Placeholder values in the sample request
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<font\s+class\s*=\s*"?value"?\s*>.*?</font>"#)
        .expect("valid placeholder pattern")
});

/// SOAPAction header of the sample request
static SOAP_ACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"SOAPAction:\s*"([^"]*)""#).expect("valid SOAPAction pattern"));

/// Slot marker used by locally defined templates
pub const SLOT_MARKER: &str = "{}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot,
}

/// Request skeleton of one operation with positional value slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationTemplate {
    operation: String,
    soap_action: String,
    segments: Vec<Segment>,
}

impl OperationTemplate {
    /// Build a template from text using `{}` as slot marker
    pub fn from_format(
        operation: impl Into<String>,
        soap_action: impl Into<String>,
        text: &str,
    ) -> Result<Self> {
        let mut segments = Vec::new();
        for (i, literal) in text.split(SLOT_MARKER).enumerate() {
            if i > 0 {
                segments.push(Segment::Slot);
            }
            if !literal.is_empty() {
                segments.push(Segment::Literal(literal.to_string()));
            }
        }

        let template = Self {
            operation: operation.into(),
            soap_action: soap_action.into(),
            segments,
        };
        template.check_well_formed()?;
        Ok(template)
    }

    /// Extract the SOAP 1.1 sample request from an ASMX operation help page
    pub fn from_help_page(operation: impl Into<String>, html: &str) -> Result<Self> {
        let operation = operation.into();

        let Some(block) = PRE_BLOCK
            .captures_iter(html)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .find(|block| block.contains("soap:Envelope"))
        else {
            // The service answers unknown operations with its overview page
            return Err(RelaticsError::UnknownOperation(operation));
        };

        let soap_action = SOAP_ACTION
            .captures(block)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                RelaticsError::Template(format!("no SOAPAction in sample for '{}'", operation))
            })?;

        // Skip the HTTP request line and headers in front of the envelope
        let start = block
            .find("&lt;?xml")
            .or_else(|| block.find("&lt;soap:Envelope"))
            .ok_or_else(|| {
                RelaticsError::Template(format!("no envelope in sample for '{}'", operation))
            })?;
        let sample = block[start..].trim_end();

        let mut segments = Vec::new();
        let mut last = 0;
        for placeholder in PLACEHOLDER.find_iter(sample) {
            push_literal(&mut segments, &sample[last..placeholder.start()])?;
            segments.push(Segment::Slot);
            last = placeholder.end();
        }
        push_literal(&mut segments, &sample[last..])?;

        let template = Self {
            operation,
            soap_action,
            segments,
        };
        template.check_well_formed()?;
        Ok(template)
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn soap_action(&self) -> &str {
        &self.soap_action
    }

    /// Number of positional values the template takes
    pub fn slot_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Slot))
            .count()
    }

    /// Fill the slots in order, escaping every value
    pub fn render<S: AsRef<str>>(&self, values: &[S]) -> Result<String> {
        let expected = self.slot_count();
        if values.len() != expected {
            return Err(RelaticsError::TemplateMismatch {
                operation: self.operation.clone(),
                expected,
                supplied: values.len(),
            });
        }

        let mut rendered = String::new();
        let mut values = values.iter();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Slot => {
                    if let Some(value) = values.next() {
                        rendered.push_str(&quick_xml::escape::escape(value.as_ref()));
                    }
                }
            }
        }
        Ok(rendered)
    }

    fn check_well_formed(&self) -> Result<()> {
        let empty = vec![""; self.slot_count()];
        let rendered = self.render(&empty)?;
        roxmltree::Document::parse(&rendered).map_err(|e| {
            RelaticsError::Template(format!("template for '{}' is not well-formed: {}", self.operation, e))
        })?;
        Ok(())
    }
}

fn push_literal(segments: &mut Vec<Segment>, escaped: &str) -> Result<()> {
    if escaped.is_empty() {
        return Ok(());
    }
    let text = quick_xml::escape::unescape(escaped).map_err(RelaticsError::xml)?;
    segments.push(Segment::Literal(text.into_owned()));
    Ok(())
}

/// Looks up the request template of a generic API operation
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// `url` is the operation help page URL built for `operation`
    async fn fetch(&self, operation: &str, url: &Url) -> Result<OperationTemplate>;
}

/// Reads templates from the service's operation help pages
#[derive(Debug, Clone)]
pub struct HttpTemplateSource {
    http_client: reqwest::Client,
}

impl HttpTemplateSource {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl TemplateSource for HttpTemplateSource {
    async fn fetch(&self, operation: &str, url: &Url) -> Result<OperationTemplate> {
        debug!("Fetching request template for {} from {}", operation, url);

        let response = self.http_client.get(url.clone()).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RelaticsError::UnknownOperation(operation.to_string()));
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(RelaticsError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let template = OperationTemplate::from_help_page(operation, &body)?;
        debug!(
            "Template for {} has {} slots (SOAPAction: {})",
            operation,
            template.slot_count(),
            template.soap_action()
        );
        Ok(template)
    }
}

/// Fixed table of operation name to template
#[derive(Debug, Clone, Default)]
pub struct StaticTemplateSource {
    templates: HashMap<String, OperationTemplate>,
}

impl StaticTemplateSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, template: OperationTemplate) {
        self.templates.insert(template.operation().to_string(), template);
    }

    /// Add a `{}` slotted template for an operation
    pub fn with_operation(
        mut self,
        operation: &str,
        soap_action: &str,
        text: &str,
    ) -> Result<Self> {
        self.insert(OperationTemplate::from_format(operation, soap_action, text)?);
        Ok(self)
    }
}

#[async_trait]
impl TemplateSource for StaticTemplateSource {
    async fn fetch(&self, operation: &str, _url: &Url) -> Result<OperationTemplate> {
        self.templates
            .get(operation)
            .cloned()
            .ok_or_else(|| RelaticsError::UnknownOperation(operation.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELP_PAGE: &str = r#"<html><body>
<span>
<h2>GetInstances</h2>
<span>
<h3>SOAP 1.1</h3>
<p>The following is a sample SOAP 1.1 request and response.  The <font class=value>placeholders</font> shown need to be replaced with actual values.</p>
<pre>POST /api/relaticsapi.asmx HTTP/1.1
Host: acme.relaticsonline.com
Content-Type: text/xml; charset=utf-8
Content-Length: <font class=value>length</font>
SOAPAction: "http://www.relatics.com/api/GetInstances"

&lt;?xml version="1.0" encoding="utf-8"?&gt;
&lt;soap:Envelope xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"&gt;
  &lt;soap:Body&gt;
    &lt;GetInstances xmlns="http://www.relatics.com/api/"&gt;
      &lt;token&gt;<font class=value>string</font>&lt;/token&gt;
      &lt;environmentId&gt;<font class=value>guid</font>&lt;/environmentId&gt;
      &lt;workspaceId&gt;<font class=value>guid</font>&lt;/workspaceId&gt;
      &lt;typeId&gt;<font class=value>guid</font>&lt;/typeId&gt;
    &lt;/GetInstances&gt;
  &lt;/soap:Body&gt;
&lt;/soap:Envelope&gt;</pre>

<pre>HTTP/1.1 200 OK
Content-Type: text/xml; charset=utf-8
Content-Length: <font class=value>length</font>

&lt;?xml version="1.0" encoding="utf-8"?&gt;
&lt;soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"&gt;
  &lt;soap:Body&gt;
    &lt;GetInstancesResponse xmlns="http://www.relatics.com/api/"&gt;
      &lt;GetInstancesResult&gt;<font class=value>string</font>&lt;/GetInstancesResult&gt;
    &lt;/GetInstancesResponse&gt;
  &lt;/soap:Body&gt;
&lt;/soap:Envelope&gt;</pre>
</span>
</span>
</body></html>"#;

    #[test]
    fn test_help_page_extraction() {
        let template = OperationTemplate::from_help_page("GetInstances", HELP_PAGE).unwrap();

        assert_eq!(template.operation(), "GetInstances");
        assert_eq!(template.soap_action(), "http://www.relatics.com/api/GetInstances");
        assert_eq!(template.slot_count(), 4);
    }

    #[test]
    fn test_help_page_render() {
        let template = OperationTemplate::from_help_page("GetInstances", HELP_PAGE).unwrap();
        let xml = template.render(&["tok", "env", "ws", "type-1"]).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<token>tok</token>"));
        assert!(xml.contains("<environmentId>env</environmentId>"));
        assert!(xml.contains("<workspaceId>ws</workspaceId>"));
        assert!(xml.contains("<typeId>type-1</typeId>"));
        assert!(!xml.contains("font"));
        assert!(roxmltree::Document::parse(&xml).is_ok());
    }

    #[test]
    fn test_page_without_sample_is_unknown_operation() {
        let page = "<html><body><p>The following operations are supported.</p></body></html>";
        let result = OperationTemplate::from_help_page("Nope", page);

        assert!(matches!(result, Err(RelaticsError::UnknownOperation(op)) if op == "Nope"));
    }

    #[test]
    fn test_format_template_slots() {
        let template = OperationTemplate::from_format(
            "Echo",
            "urn:Echo",
            "<Echo><a>{}</a><b>{}</b></Echo>",
        )
        .unwrap();

        assert_eq!(template.slot_count(), 2);
        assert_eq!(
            template.render(&["1", "x & y"]).unwrap(),
            "<Echo><a>1</a><b>x &amp; y</b></Echo>"
        );
    }

    #[test]
    fn test_render_rejects_wrong_value_count() {
        let template =
            OperationTemplate::from_format("Echo", "urn:Echo", "<Echo><a>{}</a></Echo>").unwrap();

        let result = template.render(&["1", "2"]);
        assert!(matches!(
            result,
            Err(RelaticsError::TemplateMismatch { expected: 1, supplied: 2, .. })
        ));
    }

    #[test]
    fn test_malformed_template_is_rejected() {
        let result = OperationTemplate::from_format("Broken", "urn:Broken", "<Broken><a>{}</Broken>");
        assert!(matches!(result, Err(RelaticsError::Template(_))));
    }

    #[tokio::test]
    async fn test_static_source_lookup() {
        let source = StaticTemplateSource::new()
            .with_operation("Echo", "urn:Echo", "<Echo>{}</Echo>")
            .unwrap();
        let url = Url::parse("https://acme.relaticsonline.com/api/relaticsapi.asmx?op=Echo").unwrap();

        assert!(source.fetch("Echo", &url).await.is_ok());
        assert!(matches!(
            source.fetch("Missing", &url).await,
            Err(RelaticsError::UnknownOperation(_))
        ));
    }
}
