//! XML helpers for the feed: the escaping routine applied to every text node and
//! a thin [`XmlWriter`] around [`quick_xml::Writer`] that lays elements out one
//! per line.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fmt;
use std::io::Write;

/// Replaces the five XML metacharacters with their entities. The ampersand is
/// replaced first so the entities introduced by the later substitutions are
/// not escaped a second time.
pub fn escape(unsafe_text: &str) -> String {
    unsafe_text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

const INDENT: &str = "  ";
const CDATA_END: &str = "]]>";

/// Writes an XML document one element per line, indented two spaces per level.
/// Text bodies go through [`escape`]; CDATA bodies are written raw.
pub struct XmlWriter<W: Write> {
    inner: quick_xml::Writer<W>,
    depth: usize,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(w: W) -> Self {
        XmlWriter {
            inner: quick_xml::Writer::new(w),
            depth: 0,
        }
    }

    /// Writes `<?xml version="1.0" encoding="UTF-8"?>`.
    pub fn declaration(&mut self) -> Result<()> {
        self.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    /// Opens an element with the provided attributes. Every `open` must be
    /// matched by a [`XmlWriter::close`].
    pub fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        self.newline()?;
        self.event(Event::Start(
            BytesStart::new(name).with_attributes(attributes.iter().copied()),
        ))?;
        self.depth += 1;
        Ok(())
    }

    pub fn close(&mut self, name: &str) -> Result<()> {
        self.depth = self.depth.saturating_sub(1);
        self.newline()?;
        self.event(Event::End(BytesEnd::new(name)))
    }

    /// Writes a self-closing element, e.g. `<atom:link href="..."/>`.
    pub fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        self.newline()?;
        self.event(Event::Empty(
            BytesStart::new(name).with_attributes(attributes.iter().copied()),
        ))
    }

    /// Writes `<name>{escape(text)}</name>` on its own line.
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.text_element_with(name, &[], text)
    }

    pub fn text_element_with(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> Result<()> {
        self.newline()?;
        self.event(Event::Start(
            BytesStart::new(name).with_attributes(attributes.iter().copied()),
        ))?;
        self.event(Event::Text(BytesText::from_escaped(escape(text))))?;
        self.event(Event::End(BytesEnd::new(name)))
    }

    /// Writes `<name><![CDATA[{content}]]></name>`. A `]]>` inside `content`
    /// is split across two CDATA sections.
    pub fn cdata_element(&mut self, name: &str, content: &str) -> Result<()> {
        self.newline()?;
        self.event(Event::Start(BytesStart::new(name)))?;
        let mut rest = content;
        while let Some(i) = rest.find(CDATA_END) {
            // keep `]]` in this section and start the next one at `>`
            let (section, tail) = rest.split_at(i + 2);
            self.event(Event::CData(BytesCData::new(section)))?;
            rest = tail;
        }
        self.event(Event::CData(BytesCData::new(rest)))?;
        self.event(Event::End(BytesEnd::new(name)))
    }

    /// Consumes the writer and returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }

    fn newline(&mut self) -> Result<()> {
        let mut ws = String::with_capacity(1 + INDENT.len() * self.depth);
        ws.push('\n');
        for _ in 0..self.depth {
            ws.push_str(INDENT);
        }
        self.event(Event::Text(BytesText::from_escaped(ws)))
    }

    fn event(&mut self, event: Event) -> Result<()> {
        self.inner.write_event(event)?;
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure writing XML to the underlying sink.
#[derive(Debug)]
pub enum Error {
    /// Returned when the sink fails.
    Io(std::io::Error),

    /// Returned when `quick_xml` rejects an event.
    Xml(quick_xml::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Xml(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Xml(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Error {
        Error::Xml(err)
    }
}
