//! Pattern AST produced by the parser.

use std::fmt;

/// Identifier of a node, unique within one parse.
pub type NodeId = usize;

/// An ordered list of nodes.
///
/// A finished sequence is never empty and never contains a
/// [`NodeKind::GroupSeparator`]; an empty segment is a zero-length literal.
pub type NodeSequence = Vec<Node>;

/// One element of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Sequential id assigned during parsing.
    pub id: NodeId,
    /// What this node matches.
    pub kind: NodeKind,
}

/// The four node variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Matches this exact text.
    Literal(String),
    /// Matches one or more characters as a capture named `name`.
    Parameter {
        /// Capture name.
        name: String,
        /// Trailing `?`: the capture may be skipped entirely.
        optional: bool,
    },
    /// Exactly one alternative must be traversed.
    Group {
        /// Alternatives in declaration order (earlier wins).
        alternatives: Vec<NodeSequence>,
        /// Trailing `?`: the whole group may be skipped.
        optional: bool,
    },
    /// A `|` seen while parsing a group body. Never present in a finished tree.
    GroupSeparator,
}

impl Node {
    /// Whether the matcher may bypass this node.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        match &self.kind {
            NodeKind::Parameter { optional, .. } | NodeKind::Group { optional, .. } => *optional,
            NodeKind::Literal(_) | NodeKind::GroupSeparator => false,
        }
    }

    /// Returns the alternatives if this is a group.
    #[must_use]
    pub fn alternatives(&self) -> Option<&[NodeSequence]> {
        match &self.kind {
            NodeKind::Group { alternatives, .. } => Some(alternatives),
            _ => None,
        }
    }
}

/// Renders the node back into pattern syntax (escaping special characters).
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Literal(data) => {
                for c in data.chars() {
                    if matches!(c, '\\' | '(' | ')' | '|' | ':' | '?') {
                        write!(f, "\\")?;
                    }
                    write!(f, "{c}")?;
                }
                Ok(())
            }
            NodeKind::Parameter { name, optional } => {
                write!(f, ":{name}")?;
                if *optional {
                    write!(f, "?")?;
                }
                Ok(())
            }
            NodeKind::Group {
                alternatives,
                optional,
            } => {
                write!(f, "(")?;
                for (i, alternative) in alternatives.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    for node in alternative {
                        write!(f, "{node}")?;
                    }
                }
                write!(f, ")")?;
                if *optional {
                    write!(f, "?")?;
                }
                Ok(())
            }
            NodeKind::GroupSeparator => write!(f, "|"),
        }
    }
}
