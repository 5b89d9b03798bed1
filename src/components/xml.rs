//! Minimal XML element tree for component `<Definition>` fragments.
//!
//! Reading goes through `quick_xml::Reader`; writing is compact (no pretty
//! printing) so that text content survives a save/load cycle byte for byte.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::components::errors::ComponentError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Shorthand for a leaf element holding `value` as text.
    pub fn leaf(name: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            name: name.into(),
            text: value.to_string(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.attributes.push((key.into(), value.to_string()));
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// Append a leaf child element.
    pub fn with_value(self, name: &str, value: impl fmt::Display) -> Self {
        self.with_child(XmlElement::leaf(name, value))
    }

    /// Append a leaf child only when `value` is present.
    pub fn with_optional<T: fmt::Display>(self, name: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.with_value(name, value),
            None => self,
        }
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// Parse an optional child value. Absent means `Ok(None)`; present but unparsable is an error.
    pub fn child_value<T: FromStr>(&self, name: &str) -> Result<Option<T>, ComponentError> {
        match self.child(name) {
            None => Ok(None),
            Some(child) => child.parse_text().map(Some),
        }
    }

    /// Like [`child_value`](Self::child_value) but falling back to `default` when absent.
    pub fn child_or<T: FromStr>(&self, name: &str, default: T) -> Result<T, ComponentError> {
        Ok(self.child_value(name)?.unwrap_or(default))
    }

    /// Parse an optional attribute value.
    pub fn attr_value<T: FromStr>(&self, key: &str) -> Result<Option<T>, ComponentError> {
        match self.attr(key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
                ComponentError::MalformedDefinition(format!(
                    "attribute {} on <{}> has invalid value '{}'",
                    key, self.name, raw
                ))
            }),
        }
    }

    pub fn parse_text<T: FromStr>(&self) -> Result<T, ComponentError> {
        self.text.trim().parse::<T>().map_err(|_| {
            ComponentError::MalformedDefinition(format!(
                "<{}> has invalid value '{}'",
                self.name, self.text
            ))
        })
    }

    /// Parse a single element tree from text. Any prolog, comments or processing instructions are skipped.
    pub fn parse(xml: &str) -> Result<XmlElement, ComponentError> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let mut element = XmlElement::new(String::from_utf8_lossy(e.name().as_ref()));
                    for attr in e.attributes() {
                        let attr = attr.map_err(|err| ComponentError::MalformedDefinition(err.to_string()))?;
                        element.attributes.push((
                            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                            attr.unescape_value()?.into_owned(),
                        ));
                    }
                    stack.push(element);
                }
                Event::Empty(e) => {
                    let mut element = XmlElement::new(String::from_utf8_lossy(e.name().as_ref()));
                    for attr in e.attributes() {
                        let attr = attr.map_err(|err| ComponentError::MalformedDefinition(err.to_string()))?;
                        element.attributes.push((
                            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                            attr.unescape_value()?.into_owned(),
                        ));
                    }
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&e.unescape()?);
                    }
                }
                Event::CData(e) => {
                    if let Some(current) = stack.last_mut() {
                        current
                            .text
                            .push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Event::End(_) => {
                    let mut element = stack.pop().ok_or_else(|| {
                        ComponentError::MalformedDefinition("unbalanced closing tag".to_string())
                    })?;
                    // Indentation between child elements is not content.
                    if !element.children.is_empty() && element.text.trim().is_empty() {
                        element.text.clear();
                    }
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(ComponentError::MalformedDefinition(format!(
                "unterminated element <{}>",
                stack[stack.len() - 1].name
            )));
        }
        root.ok_or_else(|| ComponentError::MalformedDefinition("document has no root element".to_string()))
    }

    fn attach(
        stack: &mut [XmlElement],
        root: &mut Option<XmlElement>,
        element: XmlElement,
    ) -> Result<(), ComponentError> {
        match stack.last_mut() {
            Some(parent) => {
                parent.children.push(element);
                Ok(())
            }
            None if root.is_none() => {
                *root = Some(element);
                Ok(())
            }
            None => Err(ComponentError::MalformedDefinition(format!(
                "second root element <{}>",
                element.name
            ))),
        }
    }

    fn write_into(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.name);
        for (key, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", key, escape(value.as_str()));
        }
        if self.text.is_empty() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        out.push_str(&escape(self.text.as_str()));
        for child in &self.children {
            child.write_into(out);
        }
        let _ = write!(out, "</{}>", self.name);
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_into(&mut out);
        f.write_str(&out)
    }
}

impl FromStr for XmlElement {
    type Err = ComponentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        XmlElement::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_definition() {
        let xml = r#"<?xml version="1.0"?>
<Definition>
  <MaximumSize>Small</MaximumSize>
  <Connector gender="Male" type="Power"/>
  <Note>a &amp; b</Note>
</Definition>"#;
        let root = XmlElement::parse(xml).unwrap();
        assert_eq!(root.name, "Definition");
        assert_eq!(root.text, "");
        assert_eq!(root.child_text("MaximumSize"), Some("Small"));
        assert_eq!(root.child("Connector").unwrap().attr("type"), Some("Power"));
        assert_eq!(root.child_text("Note"), Some("a & b"));
    }

    #[test]
    fn text_survives_save_and_load() {
        let element = XmlElement::new("Definition")
            .with_value("Emote", "  @ hums <loudly> & \"cheerfully\"  ")
            .with_child(XmlElement::new("Empty").with_attr("k", "v'q"));
        let text = element.to_string();
        let back = XmlElement::parse(&text).unwrap();
        assert_eq!(back, element);
    }

    #[test]
    fn absent_and_malformed_values() {
        let root = XmlElement::parse("<Definition><Capacity>x</Capacity></Definition>").unwrap();
        assert_eq!(root.child_value::<u32>("Missing").unwrap(), None);
        assert_eq!(root.child_or::<u32>("Missing", 7).unwrap(), 7);
        assert!(matches!(
            root.child_value::<u32>("Capacity"),
            Err(ComponentError::MalformedDefinition(_))
        ));
    }

    #[test]
    fn rejects_broken_documents() {
        assert!(XmlElement::parse("<Definition><A></Definition>").is_err());
        assert!(XmlElement::parse("").is_err());
        assert!(XmlElement::parse("<A/><B/>").is_err());
    }
}
