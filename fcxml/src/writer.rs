//! Streaming XML writer.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::XmlError;

/// Output formatting options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Spaces per nesting level. `None` writes everything on one line.
    pub indent: Option<usize>,

    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` before the root element.
    pub declaration: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            indent: Some(2),
            declaration: true,
        }
    }
}

impl WriterConfig {
    /// Single line, no declaration.
    pub fn compact() -> Self {
        Self {
            indent: None,
            declaration: false,
        }
    }
}

/// Writes elements and attributes to an [`std::io::Write`] sink.
///
/// A start tag stays open until the first child or the matching end, so
/// attributes may follow [`write_start_element`](Self::write_start_element)
/// and childless elements come out self-closed.
pub struct XmlWriter<W: Write> {
    out: W,
    config: WriterConfig,
    open: Vec<String>,
    start_pending: bool,
    started: bool,
    wrote_any: bool,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(out: W, config: WriterConfig) -> Self {
        XmlWriter {
            out,
            config,
            open: Vec::new(),
            start_pending: false,
            started: false,
            wrote_any: false,
        }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    pub fn write_start_element(&mut self, name: &str) -> Result<(), XmlError> {
        if !self.started {
            self.started = true;
            if self.config.declaration {
                self.out
                    .write_all(br#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
                self.wrote_any = true;
            }
        }
        self.close_pending_start()?;
        self.break_line(self.open.len())?;
        write!(self.out, "<{}", name)?;
        self.wrote_any = true;
        self.open.push(name.to_string());
        self.start_pending = true;
        Ok(())
    }

    pub fn write_attribute(&mut self, name: &str, value: &str) -> Result<(), XmlError> {
        if !self.start_pending {
            return Err(XmlError::WriterState(format!(
                "attribute '{}' written outside a start tag",
                name
            )));
        }
        write!(self.out, " {}=\"{}\"", name, escape(value))?;
        Ok(())
    }

    pub fn write_end_element(&mut self) -> Result<(), XmlError> {
        let name = self
            .open
            .pop()
            .ok_or_else(|| XmlError::WriterState("end element with no open element".to_string()))?;
        if self.start_pending {
            self.start_pending = false;
            self.out.write_all(b"/>")?;
        } else {
            self.break_line(self.open.len())?;
            write!(self.out, "</{}>", name)?;
        }
        Ok(())
    }

    /// Closes any elements still open, flushes and hands back the sink.
    pub fn finish(mut self) -> Result<W, XmlError> {
        while !self.open.is_empty() {
            self.write_end_element()?;
        }
        if self.started && self.config.indent.is_some() {
            self.out.write_all(b"\n")?;
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn close_pending_start(&mut self) -> Result<(), XmlError> {
        if self.start_pending {
            self.start_pending = false;
            self.out.write_all(b">")?;
        }
        Ok(())
    }

    fn break_line(&mut self, level: usize) -> Result<(), XmlError> {
        let Some(width) = self.config.indent else {
            return Ok(());
        };
        // Nothing precedes the first line.
        if !self.wrote_any {
            return Ok(());
        }
        write!(self.out, "\n{:indent$}", "", indent = width * level)?;
        Ok(())
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    out
}
