use std::collections::HashMap;
use std::io::Cursor;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::core::LookupError;

fn xml_err(e: impl std::fmt::Display) -> LookupError {
    LookupError::Transport(format!("XML error: {e}"))
}

pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    pub fn new() -> Result<Self, LookupError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_err)?;
        Ok(Self { writer })
    }

    pub fn into_string(self) -> Result<String, LookupError> {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(xml_err)
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, LookupError> {
        self.start_element_with_attrs(name, &[])
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, LookupError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_err)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, LookupError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_err)?;
        Ok(self)
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, LookupError> {
        self.start_element(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_err)?;
        self.end_element(name)
    }
}

/// Element local name without its namespace prefix.
fn local_name(qname: &[u8]) -> String {
    let name = std::str::from_utf8(qname).unwrap_or("");
    name.rsplit(':').next().unwrap_or(name).to_string()
}

/// Text of the first occurrence of each wanted element, keyed by local name.
///
/// Namespace prefixes are ignored; elements without text are skipped.
pub fn first_texts(xml: &str, wanted: &[&str]) -> Result<HashMap<String, String>, LookupError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut found = HashMap::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = local_name(e.name().as_ref());
                current = wanted.contains(&name.as_str()).then_some(name);
            }
            Ok(Event::Text(ref e)) => {
                if let Some(name) = current.take() {
                    let text = e.unescape().unwrap_or_default().to_string();
                    if !text.is_empty() {
                        found.entry(name).or_insert(text);
                    }
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_err(e)),
            _ => {}
        }
    }

    Ok(found)
}

/// The `faultstring` of a SOAP fault body, if the body is one.
pub fn soap_fault(xml: &str) -> Option<String> {
    let texts = first_texts(xml, &["Fault", "faultstring", "faultcode"]).ok()?;
    texts
        .get("faultstring")
        .or_else(|| texts.get("faultcode"))
        .cloned()
}
