//! Cursor over a tokenized document.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use encoding_rs::UTF_8;
use encoding_rs_io::DecodeReaderBytesBuilder;

use crate::{XmlError, XmlToken, tokenize};

/// An event handed out by [`XmlReader`].
#[derive(Debug, Clone, PartialEq)]
pub enum XmlEvent {
    /// An element opened. Self-closing elements produce a `Start` immediately followed by an `End`.
    Start {
        name: String,
        attributes: Vec<(String, String)>,
    },
    /// An element closed.
    End { name: String },
    /// Character data.
    Text(String),
}

/// Which kind of tag [`XmlReader::next_tag`] stopped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Start,
    End,
}

/// A pull reader over a well-formed (balanced) document.
///
/// The cursor starts before the first event. Every advance moves it onto the
/// next event, which then becomes the "current" one queried by
/// [`local_name`](Self::local_name) and [`attribute`](Self::attribute).
#[derive(Debug)]
pub struct XmlReader {
    events: Vec<(XmlEvent, usize)>,
    next: usize,
    current: Option<usize>,
    depth: usize,
    doc_len: usize,
}

impl XmlReader {
    /// Tokenizes `contents` and checks that tags are balanced.
    pub fn new(contents: &str) -> Result<Self, XmlError> {
        let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);
        let tokens = tokenize(contents)?;
        let mut events = Vec::with_capacity(tokens.len());
        let mut open: Vec<String> = Vec::new();

        for spanned in tokens {
            let position = spanned.position;
            match spanned.token {
                XmlToken::StartTag {
                    name,
                    attributes,
                    self_closing,
                } => {
                    if self_closing {
                        events.push((
                            XmlEvent::Start {
                                name: name.clone(),
                                attributes,
                            },
                            position,
                        ));
                        events.push((XmlEvent::End { name }, position));
                    } else {
                        open.push(name.clone());
                        events.push((XmlEvent::Start { name, attributes }, position));
                    }
                }
                XmlToken::EndTag(name) => match open.pop() {
                    Some(expected) if expected == name => {
                        events.push((XmlEvent::End { name }, position));
                    }
                    Some(expected) => {
                        return Err(XmlError::MismatchedEnd {
                            position,
                            expected,
                            found: name,
                        });
                    }
                    None => {
                        return Err(XmlError::malformed(
                            position,
                            format!("end tag </{}> without an open element", name),
                        ));
                    }
                },
                XmlToken::Text(text) => events.push((XmlEvent::Text(text), position)),
            }
        }

        if !open.is_empty() {
            return Err(XmlError::UnexpectedEof {
                position: contents.len(),
            });
        }

        Ok(XmlReader {
            events,
            next: 0,
            current: None,
            depth: 0,
            doc_len: contents.len(),
        })
    }

    /// Reads and decodes a file. A byte order mark selects the encoding, otherwise UTF-8.
    pub fn open(path: &Path) -> Result<Self, XmlError> {
        let file = File::open(path)?;
        let mut buf_reader = BufReader::new(
            DecodeReaderBytesBuilder::new()
                .encoding(Some(UTF_8))
                .bom_override(true)
                .strip_bom(true)
                .build(file),
        );
        let mut contents = String::new();
        buf_reader.read_to_string(&mut contents)?;
        log::debug!("Read {} bytes from {}", contents.len(), path.display());
        Self::new(&contents)
    }

    /// Moves onto the next event of any kind.
    pub fn next_event(&mut self) -> Result<&XmlEvent, XmlError> {
        if self.next >= self.events.len() {
            return Err(XmlError::UnexpectedEof {
                position: self.doc_len,
            });
        }
        let idx = self.next;
        self.next += 1;
        self.current = Some(idx);

        let (event, _) = &self.events[idx];
        match event {
            XmlEvent::Start { .. } => self.depth += 1,
            XmlEvent::End { .. } => self.depth -= 1,
            XmlEvent::Text(_) => {}
        }
        Ok(event)
    }

    /// Moves onto the next start or end tag, skipping whitespace.
    ///
    /// Character data other than whitespace is an error.
    pub fn next_tag(&mut self) -> Result<TagKind, XmlError> {
        loop {
            let position = self.peek_position();
            match self.next_event()? {
                XmlEvent::Start { .. } => return Ok(TagKind::Start),
                XmlEvent::End { .. } => return Ok(TagKind::End),
                XmlEvent::Text(text) if text.trim().is_empty() => continue,
                XmlEvent::Text(text) => {
                    return Err(XmlError::UnexpectedText {
                        position,
                        text: text.trim().to_string(),
                    });
                }
            }
        }
    }

    /// The current event, if the cursor has moved at all.
    pub fn current(&self) -> Option<&XmlEvent> {
        self.current.map(|i| &self.events[i].0)
    }

    /// Byte offset of the current event.
    pub fn position(&self) -> usize {
        self.current.map_or(0, |i| self.events[i].1)
    }

    /// Number of open elements, counting the current one if it is a start tag.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Name of the current tag without its namespace prefix, or `""` on text.
    pub fn local_name(&self) -> &str {
        match self.current() {
            Some(XmlEvent::Start { name, .. }) | Some(XmlEvent::End { name }) => local(name),
            _ => "",
        }
    }

    /// Looks up an attribute of the current start tag by local name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self.current() {
            Some(XmlEvent::Start { attributes, .. }) => attributes
                .iter()
                .find(|(k, _)| local(k) == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Like [`attribute`](Self::attribute), failing when absent.
    pub fn required_attribute(&self, name: &str) -> Result<&str, XmlError> {
        self.attribute(name)
            .ok_or_else(|| XmlError::MissingAttribute {
                element: self.local_name().to_string(),
                attribute: name.to_string(),
            })
    }

    /// Parses an optional attribute. Absent is `Ok(None)`; unparsable is an error.
    pub fn attribute_as<T: FromStr>(&self, name: &str) -> Result<Option<T>, XmlError> {
        match self.attribute(name) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| XmlError::InvalidAttribute {
                    element: self.local_name().to_string(),
                    attribute: name.to_string(),
                    value: raw.to_string(),
                }),
        }
    }

    /// Checks that the cursor sits on a start tag called `name`.
    pub fn expect_start(&self, name: &str) -> Result<(), XmlError> {
        match self.current() {
            Some(XmlEvent::Start { .. }) if self.local_name() == name => Ok(()),
            other => Err(XmlError::UnexpectedElement {
                position: self.position(),
                expected: name.to_string(),
                found: describe(other),
            }),
        }
    }

    /// Consumes the current element's subtree, leaving the cursor on its end tag.
    ///
    /// Does nothing when the cursor is already on an end tag.
    pub fn skip_element(&mut self) -> Result<(), XmlError> {
        match self.current() {
            Some(XmlEvent::Start { .. }) => {}
            Some(XmlEvent::End { .. }) => return Ok(()),
            other => {
                return Err(XmlError::UnexpectedElement {
                    position: self.position(),
                    expected: "start tag".to_string(),
                    found: describe(other),
                });
            }
        }

        let target = self.depth - 1;
        loop {
            let closed = matches!(self.next_event()?, XmlEvent::End { .. });
            if closed && self.depth == target {
                return Ok(());
            }
        }
    }

    fn peek_position(&self) -> usize {
        self.events.get(self.next).map_or(self.doc_len, |(_, p)| *p)
    }
}

fn local(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn describe(event: Option<&XmlEvent>) -> String {
    match event {
        Some(XmlEvent::Start { name, .. }) => name.clone(),
        Some(XmlEvent::End { name }) => format!("/{}", name),
        Some(XmlEvent::Text(_)) => "#text".to_string(),
        None => "start of document".to_string(),
    }
}
