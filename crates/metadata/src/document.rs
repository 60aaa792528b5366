//! A minimal owned XML tree.
//!
//! Only what is needed to edit direct children of the root while keeping
//! everything else intact: elements with their attributes, text, CDATA and
//! comments. The prolog (declaration, doctype, processing instructions) is
//! regenerated on write.

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), attributes: Vec::new(), children: Vec::new() }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// The concatenated text and CDATA content directly inside this element.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            match child {
                Node::Text(t) | Node::CData(t) => text.push_str(t),
                Node::Element(_) | Node::Comment(_) => {},
            }
        }
        text
    }

    /// Replace all content with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|child| match child {
            Node::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    pub fn push(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    /// Drop whitespace-only text from an element that has child elements.
    /// Such text is indentation and is regenerated on write; the text of leaf
    /// elements is kept exactly as written.
    fn drop_indentation(&mut self) {
        if self.elements().next().is_some() {
            self.children.retain(|child| !matches!(child, Node::Text(text) if text.trim().is_empty()));
        }
    }
}

/// Parse a complete document and return its root element.
pub(crate) fn parse(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;
    loop {
        let event = reader.read_event().or_raise(|| ErrorKind::Malformed)?;
        match event {
            Event::Start(start) => stack.push(open_element(&start)?),
            Event::Empty(start) => {
                let element = open_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            },
            Event::End(_) => {
                let mut element = stack.pop().ok_or_raise(|| ErrorKind::Malformed)?;
                element.drop_indentation();
                attach(&mut stack, &mut root, element)?;
            },
            Event::Text(text) => {
                let text = text.unescape().or_raise(|| ErrorKind::Malformed)?;
                if let Some(parent) = stack.last_mut()
                    && !text.is_empty()
                {
                    parent.children.push(Node::Text(text.into_owned()));
                }
            },
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let data = String::from_utf8(data.into_inner().into_owned()).or_raise(|| ErrorKind::Malformed)?;
                    parent.children.push(Node::CData(data));
                }
            },
            Event::Comment(comment) => {
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Comment(String::from_utf8_lossy(&comment).into_owned()));
                }
            },
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {},
            Event::Eof => break,
        }
    }
    if !stack.is_empty() {
        exn::bail!(ErrorKind::Malformed);
    }
    root.ok_or_raise(|| ErrorKind::Malformed)
}

fn open_element(start: &BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8(start.name().as_ref().to_vec()).or_raise(|| ErrorKind::Malformed)?;
    let mut element = Element::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.or_raise(|| ErrorKind::Malformed)?;
        let key = String::from_utf8(attribute.key.as_ref().to_vec()).or_raise(|| ErrorKind::Malformed)?;
        let value = attribute.unescape_value().or_raise(|| ErrorKind::Malformed)?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.push(element),
        None if root.is_none() => *root = Some(element),
        // A second top-level element.
        None => exn::bail!(ErrorKind::Malformed),
    }
    Ok(())
}

/// Serialise `root` as a standalone document, one element per line,
/// indented with tabs.
pub(crate) fn serialize(root: &Element) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .or_raise(|| ErrorKind::Malformed)?;
    write_element(&mut writer, root, true)?;
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element, is_root: bool) -> Result<()> {
    let start = BytesStart::new(element.name.as_str())
        .with_attributes(element.attributes.iter().map(|(key, value)| (key.as_str(), value.as_str())));
    if element.children.is_empty() && !is_root {
        return writer.write_event(Event::Empty(start)).or_raise(|| ErrorKind::Malformed);
    }
    writer.write_event(Event::Start(start)).or_raise(|| ErrorKind::Malformed)?;
    for child in &element.children {
        let written = match child {
            Node::Element(child) => {
                write_element(writer, child, false)?;
                Ok(())
            },
            Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text))),
            Node::CData(data) => writer.write_event(Event::CData(BytesCData::new(data.as_str()))),
            Node::Comment(comment) => writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str()))),
        };
        written.or_raise(|| ErrorKind::Malformed)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .or_raise(|| ErrorKind::Malformed)
}
