//! Optimizer: straight-line paths to an [`OptimizedData`] automaton.
//!
//! A compiled graph (or the union of many) is flattened into explicit
//! [`Path`]s, each path is normalized and checked, and the pool is rebuilt as
//! one automaton: a synthetic start state with one edge per path, each path
//! laid out as a chain. Edge order on the start state is path order, which is
//! what makes earlier-registered patterns win.
//!
//! Along the way the optimizer precomputes fast-reject metadata so most
//! non-matching inputs never reach the backtracking search:
//!
//! - `min_length` / `max_length`: byte-length bounds of any matching input
//! - `only_fixed` / `fixed`: when every path is pure literal text, a map
//!   lookup replaces the search entirely
//! - `ends_with`: literal tails at least one of which every match must end with

use crate::{Path, PatternError, State, StateId, StateKind, MAX_PATHS};
use std::collections::{BTreeSet, HashMap};

/// An immutable, optimized automaton plus its fast-reject metadata.
///
/// Built once by [`optimize`]; shared read-only by any number of concurrent
/// evaluations.
#[derive(Debug, Clone)]
pub struct OptimizedData<T> {
    min_length: usize,
    /// `None` means unbounded.
    max_length: Option<usize>,
    only_fixed: bool,
    /// Literal text of each pure-literal path -> its end states, in path order.
    fixed: HashMap<String, Vec<StateId>>,
    ends_with: BTreeSet<String>,
    states: Vec<State<T>>,
}

impl<T> OptimizedData<T> {
    /// Shortest matchable input, in bytes.
    #[must_use]
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Longest matchable input in bytes, or `None` if any path has a capture.
    #[must_use]
    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    /// Whether every path is pure literal text.
    #[must_use]
    pub fn only_fixed(&self) -> bool {
        self.only_fixed
    }

    /// End states of the pure-literal paths spelling exactly `input`, in priority order.
    #[must_use]
    pub fn fixed(&self, input: &str) -> &[StateId] {
        self.fixed.get(input).map_or(&[], Vec::as_slice)
    }

    /// Literal strings of the pure-literal paths.
    pub fn fixed_strings(&self) -> impl Iterator<Item = &str> {
        self.fixed.keys().map(String::as_str)
    }

    /// Literal tails; every match ends with at least one of them.
    pub fn ends_with(&self) -> impl Iterator<Item = &str> {
        self.ends_with.iter().map(String::as_str)
    }

    /// The state array. Index 0 is the start state.
    #[must_use]
    pub fn states(&self) -> &[State<T>] {
        &self.states
    }

    /// Number of straight-line paths in this automaton.
    #[must_use]
    pub fn path_count(&self) -> usize {
        self.states.first().map_or(0, |start| start.next.len())
    }

    /// Tag of the end state `id`.
    #[must_use]
    pub fn tag(&self, id: StateId) -> Option<&T> {
        match self.states.get(id).map(|state| &state.kind) {
            Some(StateKind::End(tag)) => Some(tag),
            _ => None,
        }
    }

    /// Whether some path captures a parameter named `name`.
    #[must_use]
    pub fn has_capture(&self, name: &str) -> bool {
        self.states
            .iter()
            .any(|state| matches!(&state.kind, StateKind::Parametric(n) if n == name))
    }

    /// Length and suffix checks. `false` means `input` cannot match.
    #[must_use]
    pub fn may_match(&self, input: &str) -> bool {
        if input.len() < self.min_length {
            return false;
        }
        if self.max_length.is_some_and(|max| input.len() > max) {
            return false;
        }
        self.only_fixed || self.ends_with.iter().any(|tail| input.ends_with(tail))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Path operations
// ═══════════════════════════════════════════════════════════════════════════════

/// Coalesce runs of consecutive fixed states into one.
///
/// Captures and the end state are boundaries; order is preserved.
#[must_use]
pub fn join_fixed_states<T>(path: Path<T>) -> Path<T> {
    let mut joined: Path<T> = Vec::with_capacity(path.len());
    for kind in path {
        match (joined.last_mut(), kind) {
            (Some(StateKind::Fixed(run)), StateKind::Fixed(data)) => run.push_str(&data),
            (_, kind) => joined.push(kind),
        }
    }
    joined
}

/// Drop fixed states with empty text.
#[must_use]
pub fn remove_empty_nodes<T>(path: Path<T>) -> Path<T> {
    path.into_iter()
        .filter(|kind| !matches!(kind, StateKind::Fixed(data) if data.is_empty()))
        .collect()
}

/// Remove empty literals, then coalesce what became adjacent.
#[must_use]
pub fn normalize<T>(path: Path<T>) -> Path<T> {
    join_fixed_states(remove_empty_nodes(path))
}

/// Reject a path with two captures and no literal text between them.
///
/// Empty literals do not separate captures.
///
/// # Errors
///
/// Returns [`PatternError::Ambiguous`] naming the two captures.
pub fn check_path<T>(path: &[StateKind<T>]) -> Result<(), PatternError> {
    let mut previous: Option<&str> = None;
    for kind in path {
        match kind {
            StateKind::Parametric(name) => {
                if let Some(first) = previous {
                    return Err(PatternError::Ambiguous {
                        first: first.to_owned(),
                        second: name.clone(),
                    });
                }
                previous = Some(name);
            }
            StateKind::Fixed(data) if data.is_empty() => {}
            StateKind::Start | StateKind::Fixed(_) | StateKind::End(_) => previous = None,
        }
    }
    Ok(())
}

/// Enumerate every start-to-end traversal of a compiled graph.
///
/// Paths come out in edge-priority order (depth first, first edge first).
/// The start state must be at index 0.
///
/// # Errors
///
/// - [`PatternError::TooManyPaths`] past [`MAX_PATHS`]
/// - [`PatternError::Structural`] if the graph has no start state, an edge
///   points outside the array, or the graph has a cycle
pub fn get_all_paths<T: Clone>(states: &[State<T>]) -> Result<Vec<Path<T>>, PatternError> {
    let first = states.first().map(|state| &state.kind);
    if !matches!(first, Some(StateKind::Start)) {
        return Err(PatternError::structural("state 0 must be the start state"));
    }

    let mut paths = Vec::new();
    // (state, index of the next edge to try)
    let mut stack: Vec<(StateId, usize)> = vec![(0, 0)];

    while let Some(&(id, edge)) = stack.last() {
        let state = states
            .get(id)
            .ok_or_else(|| PatternError::structural(format!("edge to unknown state {id}")))?;

        if state.kind.is_end() {
            if paths.len() == MAX_PATHS {
                return Err(PatternError::TooManyPaths { max: MAX_PATHS });
            }
            paths.push(
                stack[1..]
                    .iter()
                    .map(|&(id, _)| states[id].kind.clone())
                    .collect(),
            );
            stack.pop();
            continue;
        }

        match state.next.get(edge) {
            Some(&next) => {
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                if stack.len() > states.len() {
                    return Err(PatternError::structural("cycle in state graph"));
                }
                stack.push((next, 0));
            }
            None => {
                stack.pop();
            }
        }
    }

    Ok(paths)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Optimize
// ═══════════════════════════════════════════════════════════════════════════════

/// Build an [`OptimizedData`] from a pool of paths.
///
/// Each path is normalized ([`remove_empty_nodes`], [`join_fixed_states`])
/// and checked ([`check_path`]) before it is laid out.
///
/// # Errors
///
/// - [`PatternError::Ambiguous`] if a path has adjacent captures
/// - [`PatternError::Structural`] if a path does not end in exactly one end state
///
/// # Example
///
/// ```
/// use waypath::{compile, optimizer, parse};
///
/// let states = compile(&parse("R(test|XY)").unwrap()).unwrap();
/// let data = optimizer::optimize(optimizer::get_all_paths(&states).unwrap()).unwrap();
/// assert_eq!(data.min_length(), 3);
/// assert_eq!(data.max_length(), Some(5));
/// assert!(data.only_fixed());
/// ```
pub fn optimize<T>(paths: Vec<Path<T>>) -> Result<OptimizedData<T>, PatternError> {
    let mut states = vec![State {
        id: 0,
        kind: StateKind::Start,
        next: Vec::new(),
    }];
    let mut min_length: Option<usize> = None;
    let mut max_length = Some(0);
    let mut only_fixed = true;
    let mut fixed: HashMap<String, Vec<StateId>> = HashMap::new();
    let mut ends_with = BTreeSet::new();

    for path in paths {
        let path = normalize(path);
        check_path(&path)?;
        if path.iter().position(StateKind::is_end) != Some(path.len().wrapping_sub(1)) {
            return Err(PatternError::structural(
                "path must end in exactly one end state",
            ));
        }

        let (path_min, path_max) = bounds(&path);
        min_length = Some(min_length.map_or(path_min, |min| min.min(path_min)));
        max_length = max_length.zip(path_max).map(|(a, b)| a.max(b));

        let head = states.len();
        let end = head + path.len() - 1;
        states[0].next.push(head);

        match literal_text(&path) {
            Some(text) => fixed.entry(text).or_default().push(end),
            None => only_fixed = false,
        }
        ends_with.insert(literal_tail(&path));

        for (offset, kind) in path.into_iter().enumerate() {
            let id = head + offset;
            let next = if kind.is_end() {
                Vec::new()
            } else {
                vec![id + 1]
            };
            states.push(State { id, kind, next });
        }
    }

    let data = OptimizedData {
        min_length: min_length.unwrap_or(0),
        max_length,
        only_fixed,
        fixed,
        ends_with,
        states,
    };

    tracing::debug!(
        paths = data.path_count(),
        states = data.states.len(),
        min_length = data.min_length,
        max_length = ?data.max_length,
        only_fixed = data.only_fixed,
        "optimized automaton"
    );

    Ok(data)
}

/// (min, max) byte length a path can match. A capture takes at least one byte
/// and has no upper bound.
fn bounds<T>(path: &[StateKind<T>]) -> (usize, Option<usize>) {
    let mut min = 0;
    let mut max = Some(0);
    for kind in path {
        match kind {
            StateKind::Fixed(data) => {
                min += data.len();
                max = max.map(|m| m + data.len());
            }
            StateKind::Parametric(_) => {
                min += 1;
                max = None;
            }
            StateKind::Start | StateKind::End(_) => {}
        }
    }
    (min, max)
}

/// The text of a path made only of fixed states.
fn literal_text<T>(path: &[StateKind<T>]) -> Option<String> {
    let mut text = String::new();
    for kind in path {
        match kind {
            StateKind::Fixed(data) => text.push_str(data),
            StateKind::Parametric(_) => return None,
            StateKind::Start | StateKind::End(_) => {}
        }
    }
    Some(text)
}

/// The literal text a match of a normalized path must end with (empty if it
/// ends in a capture).
fn literal_tail<T>(path: &[StateKind<T>]) -> String {
    match path.iter().rev().find(|kind| !kind.is_end()) {
        Some(StateKind::Fixed(data)) => data.clone(),
        _ => String::new(),
    }
}
