#![forbid(unsafe_code)]

//! UI-script tokenizing into a generic record tree.
//!
//! UI scripts are XML-like but not XML: attribute values are mostly
//! unquoted, and nesting is expressed with explicit `<CHILDREN>` blocks that
//! follow the record owning them.
//!
//! # Syntax
//! - `# ...` - comment line
//! - `<LEGACY key=value key="quoted value" ...>` - one record
//! - `<CHILDREN>` ... `</CHILDREN>` - children of the preceding record
//!
//! Values starting with `(` or `{` extend to the matching close bracket, so
//! tuples and references may contain spaces.
//!
//! # Example
//! ```
//! use gzui_core::script::Document;
//!
//! let doc = Document::parse(
//!     "<LEGACY iid=IGZWinGen area=(0,0,640,480)>\n\
//!      <CHILDREN>\n\
//!      <LEGACY iid=IGZWinText caption=\"Hello there\">\n\
//!      </CHILDREN>\n",
//! )
//! .unwrap();
//! assert_eq!(doc.records.len(), 1);
//! assert_eq!(doc.records[0].children[0].get("caption"), Some("Hello there"));
//! ```

use std::fmt;

use crate::id::ElementId;

/// Default limit on `<CHILDREN>` nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// One record: a tag name, its attributes in source order, and children.
///
/// Attribute names may repeat; all occurrences are kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Record>,
}

impl Record {
    /// Create an empty record with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Add a child record.
    #[must_use]
    pub fn child(mut self, record: Record) -> Self {
        self.children.push(record);
        self
    }

    /// First value of an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All values of an attribute, in source order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.attributes
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether an attribute appears more than once.
    #[must_use]
    pub fn is_duplicated(&self, name: &str) -> bool {
        self.get_all(name).nth(1).is_some()
    }

    /// This record and every descendant, depth-first in source order.
    #[must_use]
    pub fn descendants(&self) -> Records<'_> {
        Records { stack: vec![self] }
    }
}

/// Depth-first, pre-order iterator over records.
#[derive(Debug)]
pub struct Records<'a> {
    stack: Vec<&'a Record>,
}

impl<'a> Iterator for Records<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.stack.pop()?;
        self.stack.extend(record.children.iter().rev());
        Some(record)
    }
}

/// A tokenized UI script: its top-level records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub records: Vec<Record>,
}

impl Document {
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Tokenize script text with the default nesting limit.
    pub fn parse(source: &str) -> Result<Self, ScriptError> {
        Self::parse_with_depth(source, DEFAULT_MAX_DEPTH)
    }

    /// Tokenize script text, failing beyond `max_depth` nested blocks.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn parse_with_depth(source: &str, max_depth: usize) -> Result<Self, ScriptError> {
        let span = crate::debug_span!("parse_script", bytes = source.len());
        let _guard = span.enter();
        let parsed = Tokenizer::new(source, max_depth).run();
        if let Err(err) = &parsed {
            crate::debug!(%err, "script rejected");
        }
        parsed
    }

    /// Every record in the document, depth-first in source order.
    pub fn all_records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().flat_map(Record::descendants)
    }

    /// Records whose attribute `name` has exactly `value`.
    pub fn records_with<'a>(
        &'a self,
        name: &'a str,
        value: &'a str,
    ) -> impl Iterator<Item = &'a Record> + 'a {
        self.all_records()
            .filter(move |record| record.get_all(name).any(|v| v == value))
    }

    /// The record at a child-index path from the top level.
    #[must_use]
    pub fn record_at(&self, path: &[usize]) -> Option<&Record> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.records.get(*first)?, |record, index| {
                record.children.get(*index)
            })
    }

    /// The record an element id refers to.
    #[must_use]
    pub fn record(&self, id: &ElementId) -> Option<&Record> {
        self.record_at(&id.path()?)
    }

    /// Every record paired with its element id, depth-first in source order.
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        let root = ElementId::root();
        Walk {
            stack: self
                .records
                .iter()
                .enumerate()
                .rev()
                .map(|(index, record)| (root.child(index), record))
                .collect(),
        }
    }
}

/// Depth-first iterator over `(id, record)` pairs.
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<(ElementId, &'a Record)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (ElementId, &'a Record);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, record) = self.stack.pop()?;
        self.stack.extend(
            record
                .children
                .iter()
                .enumerate()
                .rev()
                .map(|(index, child)| (id.child(index), child)),
        );
        Some((id, record))
    }
}

/// Errors raised while tokenizing a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// A `<` without a closing `>`.
    UnterminatedTag { position: usize },
    /// A quoted or bracketed value without its terminator.
    UnterminatedValue { position: usize },
    /// `</CHILDREN>` with no open block.
    UnmatchedClose { position: usize },
    /// `<CHILDREN>` with no preceding record.
    OrphanChildren { position: usize },
    /// A block opened at `position` was never closed.
    UnclosedChildren { position: usize },
    /// Nesting depth limit exceeded.
    DepthLimitExceeded { position: usize },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedTag { position } => {
                write!(f, "unterminated tag at position {position}")
            }
            Self::UnterminatedValue { position } => {
                write!(f, "unterminated attribute value at position {position}")
            }
            Self::UnmatchedClose { position } => {
                write!(f, "</CHILDREN> without an open block at position {position}")
            }
            Self::OrphanChildren { position } => {
                write!(f, "<CHILDREN> without a preceding record at position {position}")
            }
            Self::UnclosedChildren { position } => {
                write!(f, "<CHILDREN> opened at position {position} is never closed")
            }
            Self::DepthLimitExceeded { position } => {
                write!(f, "nesting depth limit exceeded at position {position}")
            }
        }
    }
}

impl std::error::Error for ScriptError {}

struct OpenBlock {
    parent: Record,
    siblings: Vec<Record>,
    position: usize,
}

struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    max_depth: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(src: &'a str, max_depth: usize) -> Self {
        Self {
            src,
            pos: 0,
            max_depth,
        }
    }

    fn run(mut self) -> Result<Document, ScriptError> {
        let mut current: Vec<Record> = Vec::new();
        let mut open: Vec<OpenBlock> = Vec::new();

        while let Some(ch) = self.peek() {
            match ch {
                '#' if self.at_line_start() => self.skip_line(),
                '<' => {
                    let start = self.pos;
                    self.pos += 1;
                    let name = self.read_name();
                    match name {
                        "CHILDREN" => {
                            self.expect_tag_end(start)?;
                            if open.len() >= self.max_depth {
                                return Err(ScriptError::DepthLimitExceeded { position: start });
                            }
                            let parent = current
                                .pop()
                                .ok_or(ScriptError::OrphanChildren { position: start })?;
                            open.push(OpenBlock {
                                parent,
                                siblings: std::mem::take(&mut current),
                                position: start,
                            });
                        }
                        "/CHILDREN" => {
                            self.expect_tag_end(start)?;
                            let block = open
                                .pop()
                                .ok_or(ScriptError::UnmatchedClose { position: start })?;
                            let mut parent = block.parent;
                            parent.children.append(&mut current);
                            current = block.siblings;
                            current.push(parent);
                        }
                        _ if name.starts_with('/') => self.expect_tag_end(start)?,
                        _ => {
                            let tag = name.to_string();
                            let attributes = self.read_attributes(start)?;
                            current.push(Record {
                                tag,
                                attributes,
                                children: Vec::new(),
                            });
                        }
                    }
                }
                _ => self.bump(),
            }
        }

        if let Some(block) = open.last() {
            return Err(ScriptError::UnclosedChildren {
                position: block.position,
            });
        }
        Ok(Document { records: current })
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
        }
    }

    fn at_line_start(&self) -> bool {
        self.src[..self.pos]
            .chars()
            .rev()
            .take_while(|c| *c != '\n')
            .all(char::is_whitespace)
    }

    fn skip_line(&mut self) {
        match self.src[self.pos..].find('\n') {
            Some(offset) => self.pos += offset + 1,
            None => self.pos = self.src.len(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn read_name(&mut self) -> &'a str {
        let src = self.src;
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !c.is_whitespace() && c != '>' && c != '=')
        {
            self.bump();
        }
        &src[start..self.pos]
    }

    fn expect_tag_end(&mut self, start: usize) -> Result<(), ScriptError> {
        match self.src[self.pos..].find('>') {
            Some(offset) => {
                self.pos += offset + 1;
                Ok(())
            }
            None => Err(ScriptError::UnterminatedTag { position: start }),
        }
    }

    fn read_attributes(&mut self, start: usize) -> Result<Vec<(String, String)>, ScriptError> {
        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(ScriptError::UnterminatedTag { position: start }),
                Some('>') => {
                    self.bump();
                    return Ok(attributes);
                }
                Some('/') if self.src[self.pos..].starts_with("/>") => {
                    self.pos += 2;
                    return Ok(attributes);
                }
                Some(_) => {}
            }

            let key = self.read_name().to_string();
            if key.is_empty() {
                // Stray '=' with no name.
                self.bump();
                continue;
            }
            let value = if self.peek() == Some('=') {
                self.bump();
                self.read_value()?
            } else {
                String::new()
            };
            attributes.push((key, value));
        }
    }

    fn read_value(&mut self) -> Result<String, ScriptError> {
        let start = self.pos;
        let close = match self.peek() {
            Some('"') => Some('"'),
            Some('(') => Some(')'),
            Some('{') => Some('}'),
            _ => None,
        };

        match close {
            Some('"') => {
                let body = start + 1;
                let offset = self.src[body..]
                    .find('"')
                    .ok_or(ScriptError::UnterminatedValue { position: start })?;
                self.pos = body + offset + 1;
                Ok(self.src[body..body + offset].to_string())
            }
            Some(close) => {
                let offset = self.src[start..]
                    .find(close)
                    .ok_or(ScriptError::UnterminatedValue { position: start })?;
                self.pos = start + offset + close.len_utf8();
                Ok(self.src[start..self.pos].to_string())
            }
            None => {
                while self.peek().is_some_and(|c| !c.is_whitespace() && c != '>') {
                    self.bump();
                }
                Ok(self.src[start..self.pos].to_string())
            }
        }
    }
}
