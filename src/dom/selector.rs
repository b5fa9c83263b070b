//! Compound CSS selector subset used to discover menu markup.
//!
//! Supported: selector lists, type and universal selectors, `#id`, `.class`,
//! attribute selectors (`[a]`, `=`, `^=`, `$=`, `*=`, `~=`) and `:not(...)`.
//! Combinators are not supported; structural rules (such as "item owned by
//! this list") are expressed by the caller.

use std::fmt;

use thiserror::Error;

use super::{Document, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected `{found}` at offset {offset} in selector `{selector}`")]
    Unexpected {
        selector: String,
        offset: usize,
        found: char,
    },
    #[error("unterminated {what} in selector `{selector}`")]
    Unterminated {
        selector: String,
        what: &'static str,
    },
    #[error("unsupported pseudo-class `:{name}` in selector `{selector}`")]
    UnsupportedPseudo { selector: String, name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Prefix,
    Suffix,
    Substring,
    Word,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
    Id(String),
    Class(String),
    Attr {
        name: String,
        op: AttrOp,
        value: String,
    },
    Not(Vec<Compound>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    conditions: Vec<Condition>,
}

impl Compound {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some(tag) = doc.tag_name(id) else {
            return false;
        };
        if let Some(expected) = &self.tag
            && expected != tag
        {
            return false;
        }
        self.conditions.iter().all(|cond| match cond {
            Condition::Id(value) => doc.attr(id, "id") == Some(value.as_str()),
            Condition::Class(class) => doc.has_class(id, class),
            Condition::Attr { name, op, value } => {
                let Some(actual) = doc.attr(id, name) else {
                    return false;
                };
                match op {
                    AttrOp::Exists => true,
                    AttrOp::Equals => actual == value,
                    AttrOp::Prefix => !value.is_empty() && actual.starts_with(value.as_str()),
                    AttrOp::Suffix => !value.is_empty() && actual.ends_with(value.as_str()),
                    AttrOp::Substring => !value.is_empty() && actual.contains(value.as_str()),
                    AttrOp::Word => actual.split_whitespace().any(|w| w == value),
                }
            }
            Condition::Not(list) => !list.iter().any(|c| c.matches(doc, id)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
    source: String,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        if source.trim().is_empty() {
            return Err(SelectorError::Empty);
        }
        let mut parser = Parser {
            source,
            chars: source.chars().collect(),
            pos: 0,
        };
        let alternatives = parser.list(None)?;
        Ok(Self {
            alternatives,
            source: source.trim().to_string(),
        })
    }

    /// `[name]`
    pub fn attr(name: &str) -> Self {
        Self::single(
            Condition::Attr {
                name: name.to_string(),
                op: AttrOp::Exists,
                value: String::new(),
            },
            format!("[{name}]"),
        )
    }

    /// `[name="value"]`
    pub fn attr_eq(name: &str, value: &str) -> Self {
        Self::single(
            Condition::Attr {
                name: name.to_string(),
                op: AttrOp::Equals,
                value: value.to_string(),
            },
            format!("[{name}=\"{value}\"]"),
        )
    }

    fn single(condition: Condition, source: String) -> Self {
        Self {
            alternatives: vec![Compound {
                tag: None,
                conditions: vec![condition],
            }],
            source,
        }
    }

    /// Selector list matching either side.
    pub fn or(mut self, other: Selector) -> Self {
        self.alternatives.extend(other.alternatives);
        self.source = format!("{}, {}", self.source, other.source);
        self
    }

    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        self.alternatives.iter().any(|c| c.matches(doc, id))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(found) => SelectorError::Unexpected {
                selector: self.source.to_string(),
                offset: self.pos,
                found,
            },
            None => SelectorError::Unterminated {
                selector: self.source.to_string(),
                what: "selector",
            },
        }
    }

    fn expect(&mut self, want: char, what: &'static str) -> Result<(), SelectorError> {
        match self.peek() {
            Some(c) if c == want => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(self.unexpected()),
            None => Err(SelectorError::Unterminated {
                selector: self.source.to_string(),
                what,
            }),
        }
    }

    fn list(&mut self, until: Option<char>) -> Result<Vec<Compound>, SelectorError> {
        let mut out = Vec::new();
        loop {
            self.skip_ws();
            out.push(self.compound()?);
            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                }
                None if until.is_none() => return Ok(out),
                Some(c) if Some(c) == until => return Ok(out),
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        out
    }

    fn required_ident(&mut self) -> Result<String, SelectorError> {
        let ident = self.ident();
        if ident.is_empty() {
            return Err(self.unexpected());
        }
        Ok(ident)
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let start = self.pos;
        let mut compound = Compound::default();
        if self.peek() == Some('*') {
            self.pos += 1;
        } else if self.peek().is_some_and(|c| c.is_alphabetic()) {
            compound.tag = Some(self.ident().to_ascii_lowercase());
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.conditions.push(Condition::Id(self.required_ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    compound
                        .conditions
                        .push(Condition::Class(self.required_ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    compound.conditions.push(self.attribute()?);
                }
                Some(':') => {
                    self.pos += 1;
                    let name = self.required_ident()?;
                    if name != "not" {
                        return Err(SelectorError::UnsupportedPseudo {
                            selector: self.source.to_string(),
                            name,
                        });
                    }
                    self.expect('(', "`:not(`")?;
                    let inner = self.list(Some(')'))?;
                    self.expect(')', "`:not(`")?;
                    compound.conditions.push(Condition::Not(inner));
                }
                _ => break,
            }
        }
        if self.pos == start {
            return Err(self.unexpected());
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<Condition, SelectorError> {
        self.skip_ws();
        let name = self.required_ident()?;
        self.skip_ws();
        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(Condition::Attr {
                    name,
                    op: AttrOp::Exists,
                    value: String::new(),
                });
            }
            Some('=') => AttrOp::Equals,
            Some('^') => AttrOp::Prefix,
            Some('$') => AttrOp::Suffix,
            Some('*') => AttrOp::Substring,
            Some('~') => AttrOp::Word,
            Some(_) => return Err(self.unexpected()),
            None => {
                return Err(SelectorError::Unterminated {
                    selector: self.source.to_string(),
                    what: "attribute selector",
                });
            }
        };
        self.pos += 1;
        if op != AttrOp::Equals {
            self.expect('=', "attribute selector")?;
        }
        self.skip_ws();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some(c) if c == quote => break,
                        Some(c) => value.push(c),
                        None => {
                            return Err(SelectorError::Unterminated {
                                selector: self.source.to_string(),
                                what: "quoted value",
                            });
                        }
                    }
                }
                value
            }
            _ => self.required_ident()?,
        };
        self.skip_ws();
        self.expect(']', "attribute selector")?;
        Ok(Condition::Attr { name, op, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(tag: &str, attrs: &[(&str, &str)]) -> (Document, NodeId) {
        let mut doc = Document::new();
        let el = doc.create_element(tag);
        for (k, v) in attrs {
            doc.set_attr(el, k, *v);
        }
        let root = doc.root();
        doc.append_child(root, el);
        (doc, el)
    }

    #[test]
    fn attribute_operators() {
        let (doc, el) = doc_with("li", &[("role", "menuitemradio"), ("class", "a b")]);
        let yes = [
            "[role]",
            "[role=menuitemradio]",
            "[role^=menuitem]",
            "[role$='radio']",
            "[role*=\"item\"]",
            "[class~=b]",
            "li.a.b",
            "*[role]",
        ];
        for src in yes {
            assert!(Selector::parse(src).unwrap().matches(&doc, el), "{src}");
        }
        let no = ["[role=menuitem]", "ul", "[class~=c]", "#x"];
        for src in no {
            assert!(!Selector::parse(src).unwrap().matches(&doc, el), "{src}");
        }
    }

    #[test]
    fn lists_and_not() {
        let (doc, el) = doc_with("button", &[("aria-disabled", "true")]);
        let sel = Selector::parse("a, button:not([aria-disabled=true])").unwrap();
        assert!(!sel.matches(&doc, el));
        let sel = Selector::parse("a, button:not([disabled], .x)").unwrap();
        assert!(sel.matches(&doc, el));
    }

    #[test]
    fn built_selectors_combine() {
        let (doc, el) = doc_with("li", &[("role", "menuitemcheckbox")]);
        let sel = Selector::attr_eq("role", "menuitem").or(Selector::attr_eq("role", "menuitemcheckbox"));
        assert!(sel.matches(&doc, el));
        assert_eq!(
            sel.to_string(),
            "[role=\"menuitem\"], [role=\"menuitemcheckbox\"]"
        );
        assert!(Selector::attr("role").matches(&doc, el));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(Selector::parse("  "), Err(SelectorError::Empty));
        assert!(matches!(
            Selector::parse("[role"),
            Err(SelectorError::Unterminated { .. })
        ));
        assert!(matches!(
            Selector::parse("li > a"),
            Err(SelectorError::Unexpected { found: '>', .. })
        ));
        assert!(matches!(
            Selector::parse("li:hover"),
            Err(SelectorError::UnsupportedPseudo { .. })
        ));
        assert!(matches!(
            Selector::parse("[role='x]"),
            Err(SelectorError::Unterminated { .. })
        ));
    }
}
