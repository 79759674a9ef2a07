//! Typed model of an XLIFF document.
//!
//! The document keeps every XML event it was parsed from, so that writing it
//! back reproduces the input byte for byte except where units were changed.
//! Only `trans-unit` elements below a `body` element are modelled as
//! [`TranslationUnit`]s; everything else is carried through untouched.

use std::{borrow::Cow, fs, path::Path, str::FromStr};

use encoding_rs::{Encoding, UTF_8};
use lazy_static::lazy_static;
use log::debug;
use quick_xml::{
    Reader, Writer,
    escape::escape,
    events::{BytesDecl, BytesStart, BytesText, Event},
};
use regex::Regex;

use crate::{
    error::Error,
    types::{TranslationUnit, UnitHandle},
};

const BODY: &[u8] = b"body";
const TRANS_UNIT: &[u8] = b"trans-unit";

/// Indentation width used by [`reindent`].
pub const INDENT: usize = 4;

/// Only this many leading bytes are searched by [`restore_namespace_declaration`].
pub const NAMESPACE_WINDOW: usize = 128;

lazy_static! {
    static ref ENCODING_DECL: Regex =
        Regex::new(r#"^<\?xml[^>]*?\sencoding\s*=\s*["']([A-Za-z0-9._:\-]+)["']"#).unwrap();
}

#[derive(Debug, Clone)]
pub struct XliffDocument {
    events: Vec<Event<'static>>,
    units: Vec<TranslationUnit>,
    encoding: &'static Encoding,
}

impl XliffDocument {
    /// Units in document order.
    pub fn units(&self) -> &[TranslationUnit] {
        &self.units
    }

    pub fn units_mut(&mut self) -> &mut [TranslationUnit] {
        &mut self.units
    }

    /// Encoding the document was decoded from. Output is always UTF-8.
    pub fn source_encoding(&self) -> &'static Encoding {
        self.encoding
    }

    fn parse(content: &str, encoding: &'static Encoding) -> Result<Self, Error> {
        let mut reader = Reader::from_str(content);

        let mut events = Vec::new();
        let mut units = Vec::new();
        let mut open: Vec<Vec<u8>> = Vec::new();
        let mut current: Option<UnitBuilder> = None;

        loop {
            let event = match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(event) => event,
                Err(e) => {
                    debug!("XML error at byte {}: {}", reader.error_position(), e);
                    return Err(Error::XmlParse(e));
                }
            };

            match &event {
                Event::Start(e) => {
                    let name = e.local_name().as_ref().to_vec();
                    if let Some(unit) = current.as_mut() {
                        unit.open(&name, open.len());
                    } else if name == TRANS_UNIT && in_body(&open) {
                        let handle = UnitHandle(events.len());
                        current = Some(UnitBuilder::from_start(e, handle, open.len())?);
                    }
                    open.push(name);
                }
                Event::Empty(e) => {
                    let name = e.local_name();
                    match current.as_mut() {
                        Some(unit) => unit.empty(name.as_ref()),
                        None if name.as_ref() == TRANS_UNIT && in_body(&open) => {
                            let (id, _) = unit_attributes(e)?;
                            return Err(missing_source(&id));
                        }
                        None => {}
                    }
                }
                Event::End(_) => {
                    open.pop();
                    let finished = match current.as_mut() {
                        Some(unit) if unit.depth == open.len() => true,
                        Some(unit) => {
                            unit.close(open.len());
                            false
                        }
                        None => false,
                    };
                    if finished {
                        if let Some(unit) = current.take() {
                            units.push(unit.finish()?);
                        }
                    }
                }
                Event::Text(text) => {
                    if let Some(unit) = current.as_mut().filter(|unit| unit.capturing()) {
                        unit.push_text(&text.unescape()?);
                    }
                }
                Event::CData(cdata) => {
                    if let Some(unit) = current.as_mut().filter(|unit| unit.capturing()) {
                        unit.push_text(&String::from_utf8_lossy(cdata));
                    }
                }
                _ => {}
            }

            events.push(event.into_owned());
        }

        if let Some(name) = open.last() {
            return Err(Error::malformed(format!(
                "unclosed element <{}> at end of document",
                String::from_utf8_lossy(name)
            )));
        }

        debug!("parsed {} events, {} trans-units", events.len(), units.len());
        Ok(Self {
            events,
            units,
            encoding,
        })
    }

    /// Serializes the document as UTF-8.
    ///
    /// The output equals the parsed input except for the XML declaration,
    /// which always names `utf-8` (and is added if missing), and the start
    /// tags of units whose id or `resname` changed.
    pub fn to_xml(&self) -> Result<String, Error> {
        let mut writer = Writer::new(Vec::new());
        let mut units = self.units.iter().peekable();

        if !self.events.iter().any(|event| matches!(event, Event::Decl(_))) {
            writer.write_event(Event::Decl(utf8_declaration(None)?))?;
            writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
        }

        for (index, event) in self.events.iter().enumerate() {
            let at_unit = units.peek().is_some_and(|unit| unit.handle().0 == index);
            match event {
                Event::Decl(decl) => {
                    writer.write_event(Event::Decl(utf8_declaration(Some(decl))?))?;
                }
                Event::Start(start) if at_unit => {
                    let rewritten = match units.next() {
                        Some(unit) => rewrite_unit_start(start, unit)?,
                        None => None,
                    };
                    match rewritten {
                        Some(start) => writer.write_event(Event::Start(start))?,
                        None => writer.write_event(event.clone())?,
                    }
                }
                other => writer.write_event(other.clone())?,
            }
        }

        String::from_utf8(writer.into_inner()).map_err(|e| Error::malformed(e.to_string()))
    }

    /// Loads a file, decoding it per BOM or XML declaration.
    ///
    /// Anything that is not a regular file is [`Error::NotFound`].
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Parses raw file content. The bytes are decoded per BOM or XML declaration.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let (content, encoding) = decode(bytes)?;
        Self::parse(&content, encoding)
    }
}

impl FromStr for XliffDocument {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::parse(s, UTF_8)
    }
}

fn in_body(open: &[Vec<u8>]) -> bool {
    open.iter().any(|name| name == BODY)
}

fn missing_source(id: &str) -> Error {
    Error::malformed(format!("trans-unit \"{}\" has no <source> element", id))
}

/// Decodes raw file content, honouring a BOM first and the declared encoding second.
fn decode(bytes: &[u8]) -> Result<(String, &'static Encoding), Error> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (declared_encoding(bytes).unwrap_or(UTF_8), bytes),
    };
    let (content, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        return Err(Error::malformed(format!(
            "input is not properly encoded {}",
            encoding.name()
        )));
    }
    Ok((content.into_owned(), encoding))
}

fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    let label = ENCODING_DECL.captures(&head)?.get(1)?.as_str().to_string();
    // a UTF-16 label without a BOM means the bytes are really ASCII-compatible
    Encoding::for_label(label.as_bytes()).map(Encoding::output_encoding)
}

fn utf8_declaration(decl: Option<&BytesDecl>) -> Result<BytesDecl<'static>, Error> {
    let version = match decl {
        Some(decl) => String::from_utf8_lossy(&decl.version()?).into_owned(),
        None => "1.0".to_string(),
    };
    let standalone = match decl.and_then(BytesDecl::standalone) {
        Some(value) => {
            let value = value.map_err(|e| Error::malformed(e.to_string()))?;
            Some(String::from_utf8_lossy(&value).into_owned())
        }
        None => None,
    };
    Ok(BytesDecl::new(&version, Some("utf-8"), standalone.as_deref()))
}

/// Reads the `id` and `resname` attributes of a unit start tag.
fn unit_attributes(start: &BytesStart) -> Result<(String, Option<String>), Error> {
    let mut id = None;
    let mut resname = None;
    for attr in start.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::malformed(e.to_string()))?;
        match attr.key.as_ref() {
            b"id" => id = Some(attr.unescape_value()?.to_string()),
            b"resname" => resname = Some(attr.unescape_value()?.to_string()),
            _ => {}
        }
    }
    Ok((id.unwrap_or_default(), resname))
}

/// Rebuilds a unit start tag from the unit's fields, or `None` when the tag is unchanged.
///
/// Attribute order is kept; `resname` is left out once the unit dropped it.
fn rewrite_unit_start(
    start: &BytesStart,
    unit: &TranslationUnit,
) -> Result<Option<BytesStart<'static>>, Error> {
    let (id, resname) = unit_attributes(start)?;
    if id == unit.id && resname.is_some() == unit.resname.is_some() {
        return Ok(None);
    }

    let id_value = escape_attribute(&unit.id);
    let mut rebuilt = BytesStart::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    let mut id_written = false;
    for attr in start.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::malformed(e.to_string()))?;
        match attr.key.as_ref() {
            b"id" => {
                rebuilt.push_attribute((b"id".as_slice(), id_value.as_bytes()));
                id_written = true;
            }
            b"resname" if unit.resname.is_none() => {}
            key => rebuilt.push_attribute((key, &*requote(&attr.value))),
        }
    }
    if !id_written {
        rebuilt.push_attribute((b"id".as_slice(), id_value.as_bytes()));
    }
    Ok(Some(rebuilt))
}

/// Escapes an attribute value so that it reads back unchanged.
///
/// Line breaks and tabs become character references; written raw they would
/// be normalized to spaces by the reading parser.
fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in escape(value).chars() {
        match c {
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    out
}

/// Raw value of a kept attribute, made safe for double quotes.
///
/// The value may come from a single-quoted attribute; everything else in it
/// is already escaped and stays as written.
fn requote(raw: &[u8]) -> Cow<'_, [u8]> {
    if !raw.contains(&b'"') {
        return Cow::Borrowed(raw);
    }
    let mut out = Vec::with_capacity(raw.len() + 8);
    for &byte in raw {
        match byte {
            b'"' => out.extend_from_slice(b"&quot;"),
            byte => out.push(byte),
        }
    }
    Cow::Owned(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Source,
    Target,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"source" => Some(Field::Source),
            b"target" => Some(Field::Target),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

/// Collects one unit while its element is open.
#[derive(Debug)]
struct UnitBuilder {
    handle: UnitHandle,
    depth: usize,
    id: String,
    resname: Option<String>,
    source: Option<String>,
    target: Option<String>,
    capture: Option<Capture>,
}

impl UnitBuilder {
    fn from_start(start: &BytesStart, handle: UnitHandle, depth: usize) -> Result<Self, Error> {
        let (id, resname) = unit_attributes(start)?;
        Ok(Self {
            handle,
            depth,
            id,
            resname,
            source: None,
            target: None,
            capture: None,
        })
    }

    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Source => &mut self.source,
            Field::Target => &mut self.target,
        }
    }

    fn capturing(&self) -> bool {
        self.capture.is_some()
    }

    /// An element opened at `depth` inside the unit. The first `source` and
    /// `target` elements start capturing their text content.
    fn open(&mut self, name: &[u8], depth: usize) {
        if self.capture.is_some() {
            return;
        }
        if let Some(field) = Field::from_name(name) {
            if self.slot(field).is_none() {
                self.capture = Some(Capture {
                    field,
                    depth,
                    text: String::new(),
                });
            }
        }
    }

    fn empty(&mut self, name: &[u8]) {
        if self.capture.is_some() {
            return;
        }
        if let Some(field) = Field::from_name(name) {
            self.slot(field).get_or_insert_with(String::new);
        }
    }

    /// An element closed, leaving `depth` elements open.
    fn close(&mut self, depth: usize) {
        if self.capture.as_ref().is_some_and(|c| c.depth == depth) {
            if let Some(capture) = self.capture.take() {
                *self.slot(capture.field) = Some(capture.text);
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(capture) = self.capture.as_mut() {
            capture.text.push_str(text);
        }
    }

    fn finish(self) -> Result<TranslationUnit, Error> {
        let source = self.source.ok_or_else(|| missing_source(&self.id))?;
        Ok(TranslationUnit::new(
            self.id,
            self.resname,
            source,
            self.target.unwrap_or_default(),
            self.handle,
        ))
    }
}

/// Pretty-prints `xml` with [`INDENT`]-space indentation.
///
/// Whitespace-only text between elements is dropped. The content of
/// `source` and `target` elements is copied verbatim, including any inline
/// markup, so translations never change.
pub fn reindent(xml: &str) -> Result<String, Error> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Text(text) if text.iter().all(u8::is_ascii_whitespace) => {}
            Event::Start(start) if Field::from_name(start.local_name().as_ref()).is_some() => {
                let span = reader.read_to_end(start.name())?;
                let content = &xml[span.start as usize..span.end as usize];
                let end_tag = start.to_end().into_owned();
                writer.write_event(Event::Start(start))?;
                if !content.is_empty() {
                    writer.write_event(Event::Text(BytesText::from_escaped(content)))?;
                }
                writer.write_event(Event::End(end_tag))?;
            }
            event => writer.write_event(event)?,
        }
    }

    let mut out =
        String::from_utf8(writer.into_inner()).map_err(|e| Error::malformed(e.to_string()))?;
    out.push('\n');
    Ok(out)
}

/// Replaces `' ns="'` with `' xmlns="'` within the first [`NAMESPACE_WINDOW`] bytes.
///
/// The root namespace declaration sits in the root start tag, well inside
/// the window; later bytes are returned unchanged.
pub fn restore_namespace_declaration(xml: &[u8]) -> Vec<u8> {
    const BROKEN: &[u8] = b" ns=\"";
    const FIXED: &[u8] = b" xmlns=\"";

    let window = xml.len().min(NAMESPACE_WINDOW);
    let mut out = Vec::with_capacity(xml.len() + FIXED.len());
    let mut i = 0;
    while i < window {
        if xml[i..window].starts_with(BROKEN) {
            out.extend_from_slice(FIXED);
            i += BROKEN.len();
        } else {
            out.push(xml[i]);
            i += 1;
        }
    }
    out.extend_from_slice(&xml[window..]);
    out
}
