//! Namespace-aware XML element tree
//!
//! SDK manifests are small enough to load completely, and the parsers for both
//! schema generations navigate them by `(namespace, local name)` pairs. This
//! module turns a quick-xml event stream into an owned [`Element`] tree with
//! exactly those lookups.
//!
//! # Examples
//!
//! ```
//! use sdkpack::xml::parse_document;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let root = parse_document(
//!     r#"<sdk:repo xmlns:sdk="urn:test"><sdk:item kind="a">one</sdk:item></sdk:repo>"#,
//! )?;
//!
//! assert_eq!(root.namespace(), Some("urn:test"));
//! let item = root.child(Some("urn:test"), "item").unwrap();
//! assert_eq!(item.attribute("kind"), Some("a"));
//! assert_eq!(item.text(), "one");
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use std::str::FromStr;

/// An XML element with its resolved namespace, attributes, children and text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn open(ns: ResolveResult<'_>, start: &BytesStart<'_>) -> Result<Self> {
        let namespace = match ns {
            ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
            ResolveResult::Unbound => None,
            ResolveResult::Unknown(prefix) => {
                return Err(Error::schema(format!(
                    "element uses undeclared namespace prefix '{}'",
                    String::from_utf8_lossy(&prefix)
                )))
            }
        };

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(quick_xml::Error::from)?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            namespace,
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    /// Namespace URI of the element, if it is in one
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Local (unprefixed) name of the element
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this element has the given namespace and local name
    pub fn is(&self, namespace: Option<&str>, name: &str) -> bool {
        self.namespace() == namespace && self.name == name
    }

    /// Value of an attribute, looked up by local name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text content of this element with surrounding whitespace removed
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// All child elements, in document order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter()
    }

    /// Child elements with the given namespace and local name, in document order
    pub fn children_named<'a>(
        &'a self,
        namespace: Option<&'a str>,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children
            .iter()
            .filter(move |child| child.is(namespace, name))
    }

    /// First child element with the given namespace and local name
    pub fn child(&self, namespace: Option<&str>, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.is(namespace, name))
    }

    /// First child element in this element's own namespace
    pub fn own_child(&self, name: &str) -> Option<&Element> {
        self.child(self.namespace(), name)
    }

    /// Like [`Element::own_child`], but a missing child is a schema violation
    pub fn required_child(&self, name: &str) -> Result<&Element> {
        self.own_child(name).ok_or_else(|| {
            Error::schema(format!(
                "<{}> is missing required <{}> element",
                self.name, name
            ))
        })
    }

    /// Text of a child element in this element's own namespace
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.own_child(name).map(Element::text)
    }

    /// Parse the text of a required child element
    pub fn parse_child<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let child = self.required_child(name)?;
        child.text().parse().map_err(|e: T::Err| {
            Error::schema(format!(
                "<{}> contains invalid value '{}': {}",
                name,
                child.text(),
                e
            ))
        })
    }

    /// Parse the text of an optional child element
    pub fn parse_optional_child<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        if self.own_child(name).is_none() {
            return Ok(None);
        }
        self.parse_child(name).map(Some)
    }
}

/// Parse a complete XML document and return its root element
pub fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = NsReader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_resolved_event()? {
            (ns, Event::Start(ref e)) => {
                stack.push(Element::open(ns, e)?);
            }
            (ns, Event::Empty(ref e)) => {
                let element = Element::open(ns, e)?;
                attach(&mut stack, &mut root, element)?;
            }
            (_, Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::schema("unbalanced closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            (_, Event::Text(ref t)) => {
                if let Some(current) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(t);
                    let text = quick_xml::escape::unescape(&raw).map_err(quick_xml::Error::from)?;
                    current.text.push_str(&text);
                }
            }
            (_, Event::CData(ref c)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(c));
                }
            }
            (_, Event::GeneralRef(ref r)) => {
                if let Some(current) = stack.last_mut() {
                    match r.resolve_char_ref().map_err(quick_xml::Error::from)? {
                        Some(ch) => current.text.push(ch),
                        None => {
                            let entity = String::from_utf8_lossy(r);
                            let resolved = quick_xml::escape::resolve_predefined_entity(&entity)
                                .ok_or_else(|| {
                                    Error::schema(format!("unknown entity '&{};'", entity))
                                })?;
                            current.text.push_str(resolved);
                        }
                    }
                }
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::schema("document ended before all elements were closed"));
    }

    root.ok_or_else(|| Error::schema("document has no root element"))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(Error::schema("document has more than one root element")),
    }
    Ok(())
}
