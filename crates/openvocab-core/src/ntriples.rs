//! N-Triples document codec.
//!
//! A document must describe exactly one subject. A `_:` subject decodes to a
//! blank resource; blank nodes in object position are not supported.

use crate::error::{Error, Result};
use crate::rdf::{Literal, Resource, Term, Triple, Uri};
use crate::traits::{ResourceDecoder, ResourceEncoder};

/// Label used when encoding a blank resource.
const BLANK_LABEL: &str = "_:new";

/// Line-based N-Triples codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct NTriplesCodec;

/// Subject as written in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Subject {
    Named(Uri),
    Blank(String),
}

impl NTriplesCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ResourceDecoder for NTriplesCodec {
    fn decode(&self, raw: &str) -> Result<Resource> {
        let mut subject: Option<Subject> = None;
        let mut statements = Vec::new();

        for (idx, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (s, p, o) = parse_line(line)
                .map_err(|e| Error::InvalidInput(format!("line {}: {}", idx + 1, e)))?;
            match &subject {
                None => subject = Some(s),
                Some(existing) if *existing == s => {}
                Some(_) => {
                    return Err(Error::InvalidInput(
                        "Document describes more than one resource".to_string(),
                    ))
                }
            }
            statements.push((p, o));
        }

        let subject = subject.ok_or_else(|| {
            Error::InvalidInput("Document does not describe any resource".to_string())
        })?;

        let mut resource = Resource {
            uri: match subject {
                Subject::Named(uri) => Some(uri),
                Subject::Blank(_) => None,
            },
            ..Resource::default()
        };
        for (predicate, object) in statements {
            resource.add_property(predicate, object);
        }
        Ok(resource)
    }
}

impl ResourceEncoder for NTriplesCodec {
    fn encode(&self, resource: &Resource) -> Result<String> {
        let subject = match &resource.uri {
            Some(uri) => format!("<{}>", uri),
            None => BLANK_LABEL.to_string(),
        };
        let mut out = String::new();
        for (predicate, values) in &resource.properties {
            for value in values {
                out.push_str(&format!("{} <{}> {} .\n", subject, predicate, encode_term(value)));
            }
        }
        Ok(out)
    }
}

/// Encode a single triple as one N-Triples line without the newline.
pub fn encode_triple(triple: &Triple) -> String {
    format!(
        "<{}> <{}> {} .",
        triple.subject,
        triple.predicate,
        encode_term(&triple.object)
    )
}

/// Encode a term in N-Triples syntax, also valid inside SPARQL.
pub fn encode_term(term: &Term) -> String {
    match term {
        Term::Uri { value } => format!("<{}>", value),
        Term::Literal(lit) => {
            let mut s = format!("\"{}\"", escape(&lit.value));
            if let Some(lang) = &lit.language {
                s.push('@');
                s.push_str(lang);
            } else if let Some(dt) = &lit.datatype {
                s.push_str(&format!("^^<{}>", dt));
            }
            s
        }
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// PARSER
// =============================================================================

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn expect(&mut self, c: char) -> std::result::Result<(), String> {
        match self.bump() {
            Some(found) if found == c => Ok(()),
            Some(found) => Err(format!("expected '{}', found '{}'", c, found)),
            None => Err(format!("expected '{}', found end of line", c)),
        }
    }

    fn iri(&mut self) -> std::result::Result<Uri, String> {
        self.expect('<')?;
        let end = self
            .rest()
            .find('>')
            .ok_or_else(|| "unterminated IRI".to_string())?;
        let value = &self.rest()[..end];
        self.pos += end + 1;
        Uri::parse(value).map_err(|e| e.to_string())
    }

    fn blank_label(&mut self) -> std::result::Result<String, String> {
        self.expect('_')?;
        self.expect(':')?;
        let end = self
            .rest()
            .find(char::is_whitespace)
            .unwrap_or(self.rest().len());
        if end == 0 {
            return Err("empty blank node label".to_string());
        }
        let label = self.rest()[..end].to_string();
        self.pos += end;
        Ok(label)
    }

    fn literal(&mut self) -> std::result::Result<Literal, String> {
        self.expect('"')?;
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err("unterminated literal".to_string()),
                Some('"') => break,
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('r') => value.push('\r'),
                    Some('t') => value.push('\t'),
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some('u') => value.push(self.unicode_escape(4)?),
                    Some('U') => value.push(self.unicode_escape(8)?),
                    Some(other) => return Err(format!("invalid escape '\\{}'", other)),
                    None => return Err("unterminated escape".to_string()),
                },
                Some(c) => value.push(c),
            }
        }

        match self.peek() {
            Some('@') => {
                self.bump();
                let end = self
                    .rest()
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
                    .unwrap_or(self.rest().len());
                if end == 0 {
                    return Err("empty language tag".to_string());
                }
                let lang = self.rest()[..end].to_string();
                self.pos += end;
                Ok(Literal::lang(value, lang))
            }
            Some('^') => {
                self.expect('^')?;
                self.expect('^')?;
                let datatype = self.iri()?;
                Ok(Literal::typed(value, datatype))
            }
            _ => Ok(Literal::plain(value)),
        }
    }

    fn unicode_escape(&mut self, digits: usize) -> std::result::Result<char, String> {
        let hex = self
            .rest()
            .get(..digits)
            .ok_or_else(|| "truncated unicode escape".to_string())?;
        let code = u32::from_str_radix(hex, 16).map_err(|e| e.to_string())?;
        self.pos += digits;
        char::from_u32(code).ok_or_else(|| format!("invalid code point {:x}", code))
    }
}

fn parse_line(line: &str) -> std::result::Result<(Subject, Uri, Term), String> {
    let mut cur = Cursor::new(line);

    let subject = match cur.peek() {
        Some('<') => Subject::Named(cur.iri()?),
        Some('_') => Subject::Blank(cur.blank_label()?),
        _ => return Err("subject must be an IRI or blank node".to_string()),
    };
    cur.skip_ws();
    let predicate = cur.iri()?;
    cur.skip_ws();
    let object = match cur.peek() {
        Some('<') => Term::uri(cur.iri()?),
        Some('"') => Term::Literal(cur.literal()?),
        Some('_') => return Err("blank node objects are not supported".to_string()),
        _ => return Err("object must be an IRI or literal".to_string()),
    };
    cur.skip_ws();
    cur.expect('.')?;
    cur.skip_ws();
    if !cur.rest().is_empty() && !cur.rest().starts_with('#') {
        return Err(format!("trailing content '{}'", cur.rest()));
    }
    Ok((subject, predicate, object))
}
