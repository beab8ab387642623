//! Indented XML document writer.
//!
//! A thin layer over [`quick_xml::Writer`] that tracks the open element path
//! so every failure is reported with the writer operation and the element it
//! happened in.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{Error, Result};

/// Spaces per nesting level.
pub const INDENT_SIZE: usize = 2;

/// Streaming XML document with two-space indentation.
pub struct XmlDocument<W: Write> {
    writer: Writer<W>,
    open: Vec<String>,
}

impl<W: Write> XmlDocument<W> {
    /// Wrap `inner`. Nothing is written until the first event.
    pub fn new(inner: W) -> Self {
        Self {
            writer: Writer::new_with_indent(inner, b' ', INDENT_SIZE),
            open: Vec::new(),
        }
    }

    /// Path of the open elements joined with `/`, or `document` at top level.
    fn location(&self, name: &str) -> String {
        if self.open.is_empty() && name.is_empty() {
            return "document".to_string();
        }
        let mut path = self.open.join("/");
        if !name.is_empty() {
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(name);
        }
        path
    }

    fn write(&mut self, operation: &'static str, name: &str, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::xml(operation, self.location(name), e))
    }

    /// Write the `<?xml version="1.0" encoding="UTF-8"?>` declaration.
    pub fn declaration(&mut self) -> Result<()> {
        let decl = BytesDecl::new("1.0", Some("UTF-8"), None);
        self.write("declaration", "", Event::Decl(decl))
    }

    /// Write a comment. `text` is written as is and must not contain `--`.
    pub fn comment(&mut self, text: &str) -> Result<()> {
        self.write("comment", "", Event::Comment(BytesText::from_escaped(text)))
    }

    /// Open an element. Must be balanced by [`XmlDocument::end`].
    pub fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.write("start", name, Event::Start(start))?;
        self.open.push(name.to_string());
        Ok(())
    }

    /// Close the innermost open element.
    pub fn end(&mut self) -> Result<()> {
        let name = self
            .open
            .pop()
            .ok_or_else(|| Error::xml("end", "document", "no element is open"))?;
        let result = self
            .writer
            .write_event(Event::End(BytesEnd::new(name.as_str())));
        result.map_err(|e| Error::xml("end", self.location(&name), e))
    }

    /// Write escaped text content inside the current element.
    pub fn text(&mut self, content: &str) -> Result<()> {
        self.write("text", "", Event::Text(BytesText::new(content)))
    }

    /// Open `name`, run `body` to write its content, then close it.
    pub fn element<F>(&mut self, name: &str, attributes: &[(&str, &str)], body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.start(name, attributes)?;
        body(self)?;
        self.end()
    }

    /// Write `<name attrs...>content</name>`.
    pub fn text_element(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        content: &str,
    ) -> Result<()> {
        self.element(name, attributes, |doc| doc.text(content))
    }

    /// Write a self-closing `<name attrs.../>`.
    pub fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.write("empty element", name, Event::Empty(start))
    }

    /// Finish the document and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        if let Some(name) = self.open.last() {
            return Err(Error::xml(
                "finish",
                self.location(""),
                format!("element <{}> was never closed", name),
            ));
        }
        self.writer
            .get_mut()
            .flush()
            .map_err(|e| Error::xml("flush", "document", e))?;
        Ok(self.writer.into_inner())
    }
}
