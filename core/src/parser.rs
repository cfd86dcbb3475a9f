//! Pattern parser: pattern string to [`NodeSequence`].
//!
//! Grammar (single pass, left to right, one character of lookahead):
//!
//! ```text
//! pattern     := segment*
//! segment     := literal-char | escape | parameter | group
//! escape      := '\' any-char
//! parameter   := ':' name ['?']
//! name        := [A-Za-z_][A-Za-z0-9_]*
//! group       := '(' alternative ('|' alternative)* ')' ['?']
//! alternative := segment*
//! ```
//!
//! Consecutive literal characters (escaped or not) merge into one
//! [`NodeKind::Literal`]. An empty pattern or an empty group alternative
//! becomes a single zero-length literal so the compiler always has a node
//! to connect to.

use crate::{Node, NodeId, NodeKind, NodeSequence, PatternError, MAX_PATTERN_LENGTH};
use std::iter::Peekable;
use std::str::CharIndices;

/// Parse a pattern into an ordered node tree.
///
/// Node ids are assigned sequentially from 1 and are unique within this call.
///
/// # Errors
///
/// - [`PatternError::PatternTooLong`] if the pattern exceeds [`MAX_PATTERN_LENGTH`]
/// - [`PatternError::Syntax`] for an unmatched `(` or `)`, a missing or
///   invalid parameter name, a `|` outside a group, or a trailing lone `\`
///
/// # Example
///
/// ```
/// use waypath::{parse, NodeKind};
///
/// let nodes = parse("/users/:id?").unwrap();
/// assert_eq!(nodes.len(), 2);
/// assert_eq!(nodes[0].kind, NodeKind::Literal("/users/".into()));
/// assert!(nodes[1].is_optional());
/// ```
pub fn parse(pattern: &str) -> Result<NodeSequence, PatternError> {
    if pattern.len() > MAX_PATTERN_LENGTH {
        return Err(PatternError::PatternTooLong {
            len: pattern.len(),
            max: MAX_PATTERN_LENGTH,
        });
    }

    let mut parser = Parser {
        pattern,
        chars: pattern.char_indices().peekable(),
        last_id: 0,
    };
    parser.sequence(None)
}

struct Parser<'p> {
    pattern: &'p str,
    chars: Peekable<CharIndices<'p>>,
    last_id: NodeId,
}

impl Parser<'_> {
    fn next_id(&mut self) -> NodeId {
        self.last_id += 1;
        self.last_id
    }

    fn syntax(&self, position: usize, reason: &'static str) -> PatternError {
        PatternError::Syntax {
            pattern: self.pattern.to_owned(),
            position,
            reason,
        }
    }

    /// Parse until end of input, or until the `)` closing the group opened
    /// at byte `open`. Inside a group the result may contain separators.
    fn sequence(&mut self, open: Option<usize>) -> Result<NodeSequence, PatternError> {
        let mut nodes = NodeSequence::new();

        while let Some((position, c)) = self.chars.next() {
            match c {
                '\\' => match self.chars.next() {
                    Some((_, escaped)) => self.push_literal(&mut nodes, escaped),
                    None => return Err(self.syntax(position, "dangling escape at end of pattern")),
                },
                '(' => {
                    let group = self.group(position)?;
                    nodes.push(group);
                }
                ')' => {
                    return match open {
                        Some(_) => Ok(nodes),
                        None => Err(self.syntax(position, "unmatched parentheses")),
                    };
                }
                '|' => {
                    if open.is_none() {
                        return Err(self.syntax(position, "'|' outside of a group"));
                    }
                    let id = self.next_id();
                    nodes.push(Node {
                        id,
                        kind: NodeKind::GroupSeparator,
                    });
                }
                ':' => {
                    let parameter = self.parameter(position)?;
                    nodes.push(parameter);
                }
                _ => self.push_literal(&mut nodes, c),
            }
        }

        if let Some(open) = open {
            return Err(self.syntax(open, "unmatched parentheses"));
        }
        Ok(self.non_empty(nodes))
    }

    fn group(&mut self, open: usize) -> Result<Node, PatternError> {
        let id = self.next_id();
        let body = self.sequence(Some(open))?;

        let mut alternatives = Vec::new();
        let mut current = NodeSequence::new();
        for node in body {
            if matches!(node.kind, NodeKind::GroupSeparator) {
                let finished = std::mem::take(&mut current);
                alternatives.push(self.non_empty(finished));
            } else {
                current.push(node);
            }
        }
        alternatives.push(self.non_empty(current));

        let optional = self.eat('?');
        Ok(Node {
            id,
            kind: NodeKind::Group {
                alternatives,
                optional,
            },
        })
    }

    fn parameter(&mut self, colon: usize) -> Result<Node, PatternError> {
        let id = self.next_id();
        let mut name = String::new();

        while let Some(&(_, c)) = self.chars.peek() {
            let valid = if name.is_empty() {
                c.is_ascii_alphabetic() || c == '_'
            } else {
                c.is_ascii_alphanumeric() || c == '_'
            };
            if !valid {
                break;
            }
            name.push(c);
            self.chars.next();
        }

        if name.is_empty() {
            return Err(self.syntax(colon, "expected a parameter name after ':'"));
        }

        let optional = self.eat('?');
        Ok(Node {
            id,
            kind: NodeKind::Parameter { name, optional },
        })
    }

    fn push_literal(&mut self, nodes: &mut NodeSequence, c: char) {
        if let Some(Node {
            kind: NodeKind::Literal(data),
            ..
        }) = nodes.last_mut()
        {
            data.push(c);
            return;
        }
        let id = self.next_id();
        nodes.push(Node {
            id,
            kind: NodeKind::Literal(c.to_string()),
        });
    }

    fn non_empty(&mut self, mut nodes: NodeSequence) -> NodeSequence {
        if nodes.is_empty() {
            let id = self.next_id();
            nodes.push(Node {
                id,
                kind: NodeKind::Literal(String::new()),
            });
        }
        nodes
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.chars.peek().is_some_and(|&(_, c)| c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }
}
