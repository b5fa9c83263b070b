use thiserror::Error;

use super::{Document, NodeId};

const VOID_ELEMENTS: [&str; 12] = [
    "area", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("unexpected end of markup while reading {context}")]
    UnexpectedEof { context: &'static str },
    #[error("malformed tag at byte {offset}")]
    MalformedTag { offset: usize },
    #[error("closing tag `</{found}>` at byte {offset} does not match open `<{expected}>`")]
    MismatchedClose {
        found: String,
        expected: String,
        offset: usize,
    },
    #[error("closing tag `</{tag}>` at byte {offset} has no open element")]
    UnmatchedClose { tag: String, offset: usize },
}

pub(super) fn parse_document(markup: &str) -> Result<Document, MarkupError> {
    let mut parser = MarkupParser {
        src: markup,
        pos: 0,
        doc: Document::new(),
        stack: Vec::new(),
    };
    parser.run()?;
    Ok(parser.doc)
}

struct MarkupParser<'a> {
    src: &'a str,
    pos: usize,
    doc: Document,
    // (container, tag name) for every element still open; a declarative
    // shadow root is pushed with the tag `template`.
    stack: Vec<(NodeId, String)>,
}

impl<'a> MarkupParser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn current_parent(&self) -> NodeId {
        self.stack
            .last()
            .map(|(id, _)| *id)
            .unwrap_or_else(|| self.doc.root())
    }

    fn run(&mut self) -> Result<(), MarkupError> {
        while self.pos < self.src.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                let end = rest
                    .find("-->")
                    .ok_or(MarkupError::UnexpectedEof { context: "comment" })?;
                self.pos += end + 3;
            } else if rest.starts_with("</") {
                self.close_tag()?;
            } else if rest.starts_with("<!") {
                let end = rest
                    .find('>')
                    .ok_or(MarkupError::UnexpectedEof { context: "doctype" })?;
                self.pos += end + 1;
            } else if rest.starts_with('<')
                && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
            {
                self.open_tag()?;
            } else {
                self.text();
            }
        }
        // Unclosed elements are closed implicitly at end of input.
        self.stack.clear();
        Ok(())
    }

    fn text(&mut self) {
        let rest = self.rest();
        // A stray `<` that does not start a tag is literal text.
        let skip = usize::from(rest.starts_with('<'));
        let len = rest[skip..].find('<').map_or(rest.len(), |i| i + skip);
        let raw = &rest[..len];
        self.pos += len;
        if raw.trim().is_empty() {
            return;
        }
        let text = decode_entities(raw);
        let node = self.doc.create_text(&text);
        let parent = self.current_parent();
        self.doc.append_child(parent, node);
    }

    fn read_name(&mut self) -> String {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':'))
            .unwrap_or(rest.len());
        let name = rest[..len].to_ascii_lowercase();
        self.pos += len;
        name
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    fn open_tag(&mut self) -> Result<(), MarkupError> {
        let start = self.pos;
        self.pos += 1;
        let tag = self.read_name();
        let mut attrs: Vec<(String, String)> = Vec::new();
        let self_closing = loop {
            self.skip_ws();
            let rest = self.rest();
            if rest.is_empty() {
                return Err(MarkupError::UnexpectedEof { context: "tag" });
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                break true;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break false;
            }
            let name = self.read_name();
            if name.is_empty() {
                return Err(MarkupError::MalformedTag { offset: start });
            }
            self.skip_ws();
            let value = if self.rest().starts_with('=') {
                self.pos += 1;
                self.skip_ws();
                self.attr_value()?
            } else {
                String::new()
            };
            attrs.push((name, value));
        };

        let parent = self.current_parent();
        if tag == "template"
            && attrs.iter().any(|(k, _)| k == "shadowrootmode")
            && let Some(shadow) = self.doc.attach_shadow(parent)
        {
            if !self_closing {
                self.stack.push((shadow, tag));
            }
            return Ok(());
        }

        let el = self.doc.create_element(&tag);
        for (name, value) in attrs {
            if name == "style" {
                apply_inline_style(&mut self.doc, el, &value);
            } else {
                self.doc.set_attr(el, &name, value);
            }
        }
        self.doc.append_child(parent, el);
        if !self_closing && !VOID_ELEMENTS.contains(&tag.as_str()) {
            self.stack.push((el, tag));
        }
        Ok(())
    }

    fn attr_value(&mut self) -> Result<String, MarkupError> {
        let rest = self.rest();
        if let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') {
            let end = rest[1..]
                .find(quote)
                .ok_or(MarkupError::UnexpectedEof {
                    context: "attribute value",
                })?;
            let value = decode_entities(&rest[1..1 + end]);
            self.pos += end + 2;
            return Ok(value);
        }
        let len = rest
            .find(|c: char| c.is_whitespace() || c == '>')
            .unwrap_or(rest.len());
        let value = decode_entities(&rest[..len]);
        self.pos += len;
        Ok(value)
    }

    fn close_tag(&mut self) -> Result<(), MarkupError> {
        let offset = self.pos;
        self.pos += 2;
        let tag = self.read_name();
        let rest = self.rest();
        let end = rest
            .find('>')
            .ok_or(MarkupError::UnexpectedEof {
                context: "closing tag",
            })?;
        self.pos += end + 1;
        match self.stack.last().map(|(_, open)| open.clone()) {
            Some(open) if open == tag => {
                self.stack.pop();
                Ok(())
            }
            Some(expected) => Err(MarkupError::MismatchedClose {
                found: tag,
                expected,
                offset,
            }),
            None => Err(MarkupError::UnmatchedClose { tag, offset }),
        }
    }
}

fn apply_inline_style(doc: &mut Document, el: NodeId, value: &str) {
    for decl in value.split(';') {
        if let Some((prop, val)) = decl.split_once(':') {
            let prop = prop.trim();
            if !prop.is_empty() {
                doc.set_style(el, &prop.to_ascii_lowercase(), val.trim());
            }
        }
    }
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').and_then(|semi| {
            let entity = &rest[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            ch.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
