//! Error types for the XML reader and writer.

use std::io;
use thiserror::Error;

/// Errors raised while reading or writing XML.
///
/// Positions are byte offsets into the decoded document.
#[derive(Error, Debug)]
pub enum XmlError {
    /// The underlying stream failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Input ended inside a construct, or the reader ran past the last event.
    #[error("Unexpected end of input at position {position}")]
    UnexpectedEof {
        /// Where the input ran out.
        position: usize,
    },

    /// The document is not well-formed.
    #[error("Malformed XML at position {position}: {message}")]
    Malformed {
        /// Start of the offending construct.
        position: usize,
        /// What went wrong.
        message: String,
    },

    /// Non-whitespace character data where only tags were expected.
    #[error("Unexpected text '{text}' at position {position}, expected a tag")]
    UnexpectedText {
        /// Start of the text run.
        position: usize,
        /// The text that was found (trimmed).
        text: String,
    },

    /// An end tag did not match the innermost open element.
    #[error("Mismatched end tag </{found}> at position {position}, expected </{expected}>")]
    MismatchedEnd {
        /// Position of the end tag.
        position: usize,
        /// Name of the open element.
        expected: String,
        /// Name in the end tag.
        found: String,
    },

    /// The reader is not positioned on the element the caller asked for.
    #[error("Unexpected element <{found}> at position {position}, expected <{expected}>")]
    UnexpectedElement {
        /// Position of the current event.
        position: usize,
        /// Element the caller expected.
        expected: String,
        /// Element (or event) actually found.
        found: String,
    },

    /// A required attribute is absent (on read) or has no value to write.
    #[error("Element <{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
    },

    /// An attribute value could not be converted to the requested type.
    #[error("Invalid value '{value}' for attribute '{attribute}' on <{element}>")]
    InvalidAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
        /// Raw value.
        value: String,
    },

    /// The writer was driven out of order (attribute after content, unbalanced end).
    #[error("Writer misuse: {0}")]
    WriterState(String),
}

impl XmlError {
    pub(crate) fn malformed(position: usize, message: impl Into<String>) -> Self {
        XmlError::Malformed {
            position,
            message: message.into(),
        }
    }
}
