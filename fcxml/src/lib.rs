//! A pull-style XML library for colony game save files.
//!
//! The document is tokenized up front into start tags, end tags and text,
//! then handed out one event at a time by [`XmlReader`], which offers the
//! cursor operations record readers need (`next_tag`, attribute lookup,
//! subtree skipping). [`XmlWriter`] is the matching streaming writer.
//!
//! Comments, processing instructions, the XML declaration and doctype
//! declarations are dropped during tokenization. Doctypes with an internal
//! subset are rejected.

use std::io::Write;
use std::iter::Peekable;

mod error;
mod reader;
mod writer;

pub use error::XmlError;
pub use reader::{TagKind, XmlEvent, XmlReader};
pub use writer::{WriterConfig, XmlWriter};

/// A token scanned from an XML document.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlToken {
    /// `<name attr="value">` or `<name/>`.
    StartTag {
        /// Qualified element name, prefix included.
        name: String,
        /// Attributes in document order, values already unescaped.
        attributes: Vec<(String, String)>,
        /// Whether the tag closed itself with `/>`.
        self_closing: bool,
    },
    /// `</name>`.
    EndTag(String),
    /// Character data between tags, entities decoded. CDATA sections land here too.
    Text(String),
}

/// A token together with the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: XmlToken,
    pub position: usize,
}

/// Types with a fixed element name that can write themselves as XML.
pub trait XmlRecord {
    /// Name of the element representing this record.
    const TAG: &'static str;

    /// Writes the complete element, start tag to end tag.
    fn to_xml<W: Write>(&self, xw: &mut XmlWriter<W>) -> Result<(), XmlError>;
}

/// Serializes a record into a standalone document string.
pub fn to_xml_string<T: XmlRecord>(record: &T, config: WriterConfig) -> Result<String, XmlError> {
    let mut xw = XmlWriter::new(Vec::new(), config);
    record.to_xml(&mut xw)?;
    let bytes = xw.finish()?;
    String::from_utf8(bytes)
        .map_err(|e| XmlError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Splits a document into tokens.
pub fn tokenize(contents: &str) -> Result<Vec<Spanned>, XmlError> {
    let mut tokens: Vec<Spanned> = Vec::new();
    let mut pos = 0;

    while pos < contents.len() {
        let rest = &contents[pos..];
        if rest.starts_with("<!--") {
            let end = rest.find("-->").ok_or(XmlError::UnexpectedEof {
                position: contents.len(),
            })?;
            pos += end + 3;
        } else if rest.starts_with("<?") {
            let end = rest.find("?>").ok_or(XmlError::UnexpectedEof {
                position: contents.len(),
            })?;
            pos += end + 2;
        } else if let Some(cdata) = rest.strip_prefix("<![CDATA[") {
            let end = cdata.find("]]>").ok_or(XmlError::UnexpectedEof {
                position: contents.len(),
            })?;
            tokens.push(Spanned {
                token: XmlToken::Text(cdata[..end].to_string()),
                position: pos,
            });
            pos += "<![CDATA[".len() + end + 3;
        } else if rest.starts_with("<!") {
            let end = rest.find('>').ok_or(XmlError::UnexpectedEof {
                position: contents.len(),
            })?;
            if let Some(bracket) = rest[..end].find('[') {
                return Err(XmlError::malformed(
                    pos + bracket,
                    "internal doctype subsets are not supported",
                ));
            }
            pos += end + 1;
        } else if let Some(body) = rest.strip_prefix("</") {
            let end = body.find('>').ok_or(XmlError::UnexpectedEof {
                position: contents.len(),
            })?;
            let name = body[..end].trim();
            if name.is_empty() || !name.chars().all(is_name_char) {
                return Err(XmlError::malformed(pos, format!("bad end tag '</{}>'", name)));
            }
            tokens.push(Spanned {
                token: XmlToken::EndTag(name.to_string()),
                position: pos,
            });
            pos += 2 + end + 1;
        } else if rest.starts_with('<') {
            let (token, len) = scan_start_tag(rest, pos, contents.len())?;
            tokens.push(Spanned {
                token,
                position: pos,
            });
            pos += len;
        } else {
            let end = rest.find('<').unwrap_or(rest.len());
            let text = decode_entities(&rest[..end], pos)?;
            tokens.push(Spanned {
                token: XmlToken::Text(text),
                position: pos,
            });
            pos += end;
        }
    }

    Ok(tokens)
}

fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '/' | '>' | '=' | '<' | '"' | '\'')
}

fn scan_name<I: Iterator<Item = (usize, char)>>(chars: &mut Peekable<I>) -> String {
    let mut name = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if !is_name_char(c) {
            break;
        }
        name.push(c);
        chars.next();
    }
    name
}

fn skip_whitespace<I: Iterator<Item = (usize, char)>>(chars: &mut Peekable<I>) {
    while chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
}

/// Scans `<name attr="v" ...>` at the start of `rest`. Returns the token and its byte length.
fn scan_start_tag(
    rest: &str,
    base: usize,
    doc_len: usize,
) -> Result<(XmlToken, usize), XmlError> {
    let eof = XmlError::UnexpectedEof { position: doc_len };
    let mut chars = rest.char_indices().skip(1).peekable();

    let name = scan_name(&mut chars);
    if name.is_empty() {
        return Err(XmlError::malformed(base, "empty element name"));
    }

    let mut attributes: Vec<(String, String)> = Vec::new();
    loop {
        skip_whitespace(&mut chars);
        let Some((i, c)) = chars.next() else {
            return Err(eof);
        };
        match c {
            '>' => {
                let token = XmlToken::StartTag {
                    name,
                    attributes,
                    self_closing: false,
                };
                return Ok((token, i + 1));
            }
            '/' => {
                return match chars.next() {
                    Some((j, '>')) => {
                        let token = XmlToken::StartTag {
                            name,
                            attributes,
                            self_closing: true,
                        };
                        Ok((token, j + 1))
                    }
                    Some((j, _)) => Err(XmlError::malformed(base + j, "expected '>' after '/'")),
                    None => Err(eof),
                };
            }
            c if !is_name_char(c) => {
                return Err(XmlError::malformed(
                    base + i,
                    format!("unexpected '{}' in <{}>", c, name),
                ));
            }
            c => {
                let mut attr = String::new();
                attr.push(c);
                attr.push_str(&scan_name(&mut chars));

                skip_whitespace(&mut chars);
                match chars.next() {
                    Some((_, '=')) => {}
                    Some((j, other)) => {
                        return Err(XmlError::malformed(
                            base + j,
                            format!("expected '=' after attribute '{}', found '{}'", attr, other),
                        ));
                    }
                    None => return Err(eof),
                }

                skip_whitespace(&mut chars);
                let quote = match chars.next() {
                    Some((_, q @ ('"' | '\''))) => q,
                    Some((j, _)) => {
                        return Err(XmlError::malformed(
                            base + j,
                            format!("value of attribute '{}' must be quoted", attr),
                        ));
                    }
                    None => return Err(eof),
                };

                let mut raw = String::new();
                loop {
                    match chars.next() {
                        Some((_, ch)) if ch == quote => break,
                        Some((j, '<')) => {
                            return Err(XmlError::malformed(base + j, "'<' in attribute value"));
                        }
                        Some((_, ch)) => raw.push(ch),
                        None => return Err(eof),
                    }
                }

                if attributes.iter().any(|(n, _)| *n == attr) {
                    return Err(XmlError::malformed(
                        base + i,
                        format!("duplicate attribute '{}' on <{}>", attr, name),
                    ));
                }
                let value = decode_entities(&raw, base + i)?;
                attributes.push((attr, value));
            }
        }
    }
}

/// Replaces predefined entities and numeric character references.
pub(crate) fn decode_entities(raw: &str, position: usize) -> Result<String, XmlError> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after
            .find(';')
            .ok_or_else(|| XmlError::malformed(position, "unterminated entity reference"))?;
        let entity = &after[..semi];
        let decoded = match entity {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            _ => {
                let code = if let Some(hex) =
                    entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X"))
                {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse::<u32>().ok()
                } else {
                    None
                };
                code.and_then(char::from_u32).ok_or_else(|| {
                    XmlError::malformed(position, format!("unknown entity '&{};'", entity))
                })?
            }
        };
        out.push(decoded);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<XmlToken> {
        tokenize(s)
            .expect("Tokenize")
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn start_tag_with_attributes() {
        let t = tokens(r#"<stop location="colony:1" note='a &amp; b'/>"#);
        assert_eq!(
            t,
            vec![XmlToken::StartTag {
                name: "stop".to_string(),
                attributes: vec![
                    ("location".to_string(), "colony:1".to_string()),
                    ("note".to_string(), "a & b".to_string()),
                ],
                self_closing: true,
            }]
        );
    }

    #[test]
    fn drops_prolog_and_comments() {
        let t = tokens("<?xml version=\"1.0\"?>\n<!DOCTYPE x>\n<!-- hi --><a></a>");
        assert_eq!(
            t,
            vec![
                XmlToken::Text("\n".to_string()),
                XmlToken::Text("\n".to_string()),
                XmlToken::StartTag {
                    name: "a".to_string(),
                    attributes: vec![],
                    self_closing: false,
                },
                XmlToken::EndTag("a".to_string()),
            ]
        );
    }

    #[test]
    fn cdata_is_text() {
        let t = tokens("<a><![CDATA[<raw>]]></a>");
        assert_eq!(t[1], XmlToken::Text("<raw>".to_string()));
    }

    #[test]
    fn numeric_references() {
        assert_eq!(decode_entities("&#65;&#x42;c", 0).unwrap(), "ABc");
    }

    #[test]
    fn unknown_entity_is_error() {
        assert!(matches!(
            decode_entities("&nbsp;", 3),
            Err(XmlError::Malformed { position: 3, .. })
        ));
    }

    #[test]
    fn unquoted_attribute_is_error() {
        assert!(matches!(tokenize("<a b=c/>"), Err(XmlError::Malformed { .. })));
    }

    #[test]
    fn duplicate_attribute_is_error() {
        assert!(matches!(tokenize(r#"<a b="1" b="2"/>"#), Err(XmlError::Malformed { .. })));
    }

    #[test]
    fn doctype_internal_subset_is_rejected_at_bracket() {
        let doc = "<!DOCTYPE route [ <!ENTITY x \"y\"> ]><route/>";
        match tokenize(doc) {
            Err(XmlError::Malformed { position, message }) => {
                assert_eq!(position, 16);
                assert!(message.contains("doctype"));
            }
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn unterminated_tag_is_eof() {
        assert!(matches!(
            tokenize("<a b=\"1\""),
            Err(XmlError::UnexpectedEof { position: 8 })
        ));
    }
}
