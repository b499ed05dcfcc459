//! Container atom dump parsing.
//!
//! `mp4file --dump` prints a container's atom tree as indented text, one
//! node per line. This module parses that text into an explicit tree of
//! [`AtomNode`]s so that lookups can rely on real scoping instead of
//! guessing where an atom ends: a node's scope closes at the first line
//! that is not indented deeper than it.

mod codec;

pub use codec::{extract_codec_identifiers, extract_codecs};

use crate::error::{Error, Result};

/// What one dump line describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An atom header, `type avcC (moov.trak.mdia.minf.stbl.stsd.avc1.avcC)`.
    Atom { fourcc: String, path: String },
    /// An integer attribute, `AVCProfileIndication = 100 (0x64)`.
    Field { name: String, value: u64 },
    /// A byte-run attribute, `info = <2 bytes>  12 10`.
    Bytes { name: String, bytes: Vec<u8> },
    /// Anything else: descriptor names, string attributes, banners.
    Label(String),
}

/// One node of the parsed dump tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomNode {
    pub kind: NodeKind,
    pub children: Vec<AtomNode>,
}

impl AtomNode {
    /// Walk this node and its descendants in document order.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// The first integer attribute named `name` in this subtree.
    pub fn field(&self, name: &str) -> Option<u64> {
        self.walk().find_map(|node| match &node.kind {
            NodeKind::Field { name: n, value } if n == name => Some(*value),
            _ => None,
        })
    }
}

/// A parsed atom dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomDump {
    pub roots: Vec<AtomNode>,
}

impl AtomDump {
    /// Parse the raw text of an atom dump.
    ///
    /// Returns [`Error::EmptyDump`] when the text contains no atom line at
    /// all, which callers treat as "codec information unavailable".
    pub fn parse(text: &str) -> Result<Self> {
        let mut roots: Vec<AtomNode> = Vec::new();
        let mut stack: Vec<(usize, AtomNode)> = Vec::new();

        for line in text.lines() {
            let (indent, rest) = measure(line);
            if rest.is_empty() {
                continue;
            }
            while stack.last().map_or(false, |(top, _)| *top >= indent) {
                attach(&mut stack, &mut roots);
            }
            stack.push((
                indent,
                AtomNode {
                    kind: classify(rest),
                    children: Vec::new(),
                },
            ));
        }
        while !stack.is_empty() {
            attach(&mut stack, &mut roots);
        }

        let dump = Self { roots };
        if !dump
            .walk()
            .any(|node| matches!(node.kind, NodeKind::Atom { .. }))
        {
            return Err(Error::EmptyDump);
        }
        Ok(dump)
    }

    /// Walk every node in document order.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: self.roots.iter().rev().collect(),
        }
    }

    /// The first atom whose dotted path equals `path`.
    pub fn find_atom(&self, path: &str) -> Option<&AtomNode> {
        self.walk()
            .find(|node| matches!(&node.kind, NodeKind::Atom { path: p, .. } if p == path))
    }
}

/// Depth-first, document-order iterator over a node tree.
pub struct Walk<'a> {
    stack: Vec<&'a AtomNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a AtomNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Pop the top of the stack and hang it off the new top (or the roots).
fn attach(stack: &mut Vec<(usize, AtomNode)>, roots: &mut Vec<AtomNode>) {
    if let Some((_, node)) = stack.pop() {
        match stack.last_mut() {
            Some((_, parent)) => parent.children.push(node),
            None => roots.push(node),
        }
    }
}

/// Indentation and content of one line.
///
/// mp4file prefixes lines with the dumped file's quoted name; the prefix is
/// stripped and any spaces on either side of it count toward the
/// indentation, so nesting stays consistent whether or not the prefix is
/// present.
fn measure(line: &str) -> (usize, &str) {
    let stripped = line.trim_start_matches(' ');
    let mut indent = line.len() - stripped.len();
    let mut rest = stripped;
    if let Some(after) = strip_source_prefix(rest) {
        let inner = after.trim_start_matches(' ');
        indent += after.len() - inner.len();
        rest = inner;
    }
    (indent, rest.trim_end())
}

/// Strip a leading `"filename":` marker, if present.
fn strip_source_prefix(line: &str) -> Option<&str> {
    let body = line.strip_prefix('"')?;
    let end = body.find('"')?;
    body[end + 1..].strip_prefix(':')
}

fn classify(rest: &str) -> NodeKind {
    if let Some((fourcc, path)) = parse_atom_header(rest) {
        return NodeKind::Atom { fourcc, path };
    }
    if let Some((name, value)) = rest.split_once(" = ") {
        if let Some(bytes) = parse_byte_run(value) {
            return NodeKind::Bytes {
                name: name.to_string(),
                bytes,
            };
        }
        if let Some(value) = parse_int_value(value) {
            return NodeKind::Field {
                name: name.to_string(),
                value,
            };
        }
    }
    NodeKind::Label(rest.to_string())
}

/// Parse `type XXXX (dotted.path)`.
fn parse_atom_header(rest: &str) -> Option<(String, String)> {
    let after = rest.strip_prefix("type ")?;
    let (fourcc, tail) = after.split_once(' ')?;
    let path = tail.strip_prefix('(')?.split_once(')')?.0;
    if fourcc.is_empty() || path.is_empty() {
        return None;
    }
    Some((fourcc.to_string(), path.to_string()))
}

/// Parse the value part of an integer attribute, `100 (0x64)` or `200`.
fn parse_int_value(text: &str) -> Option<u64> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    if end == 0 {
        return None;
    }
    match text[end..].chars().next() {
        None | Some(' ') | Some('(') => text[..end].parse().ok(),
        Some(_) => None,
    }
}

/// Parse the value part of a byte-run attribute, `<2 bytes>  12 10`.
fn parse_byte_run(text: &str) -> Option<Vec<u8>> {
    let after = text.strip_prefix('<')?;
    let (_, tail) = after.split_once('>')?;
    let mut bytes = Vec::new();
    for token in tail.split_whitespace() {
        match u8::from_str_radix(token, 16) {
            Ok(byte) => bytes.push(byte),
            Err(_) => break,
        }
    }
    Some(bytes)
}
