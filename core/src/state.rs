//! Compiled automaton states.

use std::fmt;

/// Index of a state in its automaton's state array.
///
/// Ids are dense: after compilation `states[i].id == i`.
pub type StateId = usize;

/// The reserved capture name that may consume `/`.
pub const UNDERSCORE: &str = "_";

/// A straight-line traversal from start to an end state.
///
/// The start state is elided and so are the edges; the last element is
/// always [`StateKind::End`].
pub type Path<T> = Vec<StateKind<T>>;

/// One node of the compiled graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State<T> {
    /// Position of this state in the state array.
    pub id: StateId,
    /// What this state consumes.
    pub kind: StateKind<T>,
    /// Outgoing edges in priority order (first edge is tried first).
    pub next: Vec<StateId>,
}

/// What a state consumes from the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StateKind<T> {
    /// Entry point. Consumes nothing.
    Start,
    /// Consumes exactly this text.
    Fixed(String),
    /// Consumes one or more characters as a capture with this name.
    Parametric(String),
    /// Accepts when the input is exhausted. Carries the pattern's tag.
    End(T),
}

impl<T> StateKind<T> {
    /// Whether this is a [`StateKind::End`].
    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End(_))
    }

    /// Replace the tag of an end state.
    #[must_use]
    pub fn map_tag<U>(self, f: impl FnOnce(T) -> U) -> StateKind<U> {
        match self {
            Self::Start => StateKind::Start,
            Self::Fixed(data) => StateKind::Fixed(data),
            Self::Parametric(name) => StateKind::Parametric(name),
            Self::End(tag) => StateKind::End(f(tag)),
        }
    }
}

impl<T> State<T> {
    /// Replace the tag of this state, keeping id and edges.
    #[must_use]
    pub fn map_tag<U>(self, f: impl FnOnce(T) -> U) -> State<U> {
        State {
            id: self.id,
            kind: self.kind.map_tag(f),
            next: self.next,
        }
    }
}

impl<T> fmt::Display for StateKind<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "^"),
            Self::Fixed(data) => write!(f, "{data:?}"),
            Self::Parametric(name) => write!(f, ":{name}"),
            Self::End(_) => write!(f, "$"),
        }
    }
}

impl<T> fmt::Display for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>3} {}", self.id, self.kind)?;
        if !self.next.is_empty() {
            let next: Vec<String> = self.next.iter().map(ToString::to_string).collect();
            write!(f, " -> {}", next.join(", "))?;
        }
        Ok(())
    }
}
