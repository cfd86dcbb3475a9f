//! Evaluator: the immutable matcher built from one or many patterns.
//!
//! Matching is an explicit-stack depth-first backtracking walk over the
//! optimized automaton. Each [`Matches`] iterator owns its stack, so one
//! [`Eval`] serves any number of concurrent matches without locking.

use crate::optimizer::{self, OptimizedData};
use crate::{compile, parse, Path, PatternError, State, StateId, StateKind, UNDERSCORE};
use std::borrow::Cow;
use std::collections::HashMap;

/// Captured parameters, keyed by capture name.
pub type Params = HashMap<String, String>;

/// One accepting path: its captures and the tag of the pattern it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult<T> {
    /// Captures along the accepting path.
    pub params: Params,
    /// Tag of the end state reached.
    pub end: T,
}

/// Result of [`Eval::match_path`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MatchedData {
    /// The input matched; captures of the highest-priority path.
    Matched {
        /// Captured parameters.
        params: Params,
    },
    /// No path accepts the input.
    #[default]
    NotMatched,
}

impl MatchedData {
    /// Whether the input matched.
    #[must_use]
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    /// The captures, if matched.
    #[must_use]
    pub fn params(&self) -> Option<&Params> {
        match self {
            Self::Matched { params } => Some(params),
            Self::NotMatched => None,
        }
    }

    /// A single capture, if matched and present.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params()?.get(name).map(String::as_str)
    }
}

impl<T> From<Option<MatchResult<T>>> for MatchedData {
    fn from(result: Option<MatchResult<T>>) -> Self {
        result.map_or(Self::NotMatched, |result| Self::Matched {
            params: result.params,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Eval
// ═══════════════════════════════════════════════════════════════════════════════

/// A compiled, optimized set of patterns.
///
/// Immutable once built. `Send + Sync` whenever `T` is.
#[derive(Debug, Clone)]
pub struct Eval<T> {
    data: OptimizedData<T>,
}

impl Eval<()> {
    /// Compile a single pattern.
    ///
    /// # Errors
    ///
    /// Any [`PatternError`] from parsing, compiling or optimizing.
    pub fn single(pattern: &str) -> Result<Self, PatternError> {
        Self::multi([(pattern, ())])
    }
}

impl<T: Clone> Eval<T> {
    /// Compile many patterns into one automaton.
    ///
    /// Every pattern is compiled on its own, flattened into straight-line
    /// paths, and its tag is attached to each path's end state. The pooled
    /// paths are optimized together, so [`Eval::match_all`] yields matches in
    /// registration order.
    ///
    /// # Errors
    ///
    /// The first [`PatternError`] of any pattern. Nothing is built on failure.
    ///
    /// # Example
    ///
    /// ```
    /// use waypath::Eval;
    ///
    /// let eval = Eval::multi([("/users", "list"), ("/users/:id", "show")]).unwrap();
    /// let first = eval.match_all("/users/7").next().unwrap();
    /// assert_eq!(first.end, "show");
    /// assert_eq!(first.params["id"], "7");
    /// ```
    pub fn multi<I, P>(patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = (P, T)>,
        P: AsRef<str>,
    {
        let mut pool: Vec<Path<T>> = Vec::new();
        let mut count = 0usize;

        for (pattern, tag) in patterns {
            let pattern = pattern.as_ref();
            let paths = pattern_paths(pattern).inspect_err(|err| {
                tracing::warn!(pattern, kind = err.kind(), error = %err, "rejected pattern");
            })?;
            pool.extend(paths.into_iter().map(|path| {
                path.into_iter()
                    .map(|kind| kind.map_tag(|()| tag.clone()))
                    .collect::<Path<T>>()
            }));
            count += 1;
        }

        let data = optimizer::optimize(pool)?;
        tracing::debug!(
            patterns = count,
            paths = data.path_count(),
            min_length = data.min_length(),
            max_length = ?data.max_length(),
            only_fixed = data.only_fixed(),
            "compiled pattern set"
        );
        Ok(Self { data })
    }
}

impl<T> Eval<T> {
    /// Lazily enumerate every accepting path for `input`, in priority order.
    ///
    /// Each call starts a fresh, independent search.
    pub fn match_all<'a>(&'a self, input: &'a str) -> Matches<'a, T> {
        Matches::new(&self.data, Cow::Borrowed(input))
    }

    /// Like [`Eval::match_all`], for an input the iterator should own.
    pub(crate) fn match_all_owned(&self, input: String) -> Matches<'_, T> {
        Matches::new(&self.data, Cow::Owned(input))
    }

    /// Whether any accepting path captures the reserved `_` parameter.
    #[must_use]
    pub fn has_underscore(&self) -> bool {
        self.data.has_capture(UNDERSCORE)
    }

    /// Shortest matchable input, in bytes.
    #[must_use]
    pub fn min_length(&self) -> usize {
        self.data.min_length()
    }

    /// Longest matchable input in bytes; `None` when unbounded.
    #[must_use]
    pub fn max_length(&self) -> Option<usize> {
        self.data.max_length()
    }

    /// The optimized automaton.
    #[must_use]
    pub fn data(&self) -> &OptimizedData<T> {
        &self.data
    }

    /// The optimized state array.
    #[must_use]
    pub fn states(&self) -> &[State<T>] {
        self.data.states()
    }
}

impl<T: Clone> Eval<T> {
    /// The highest-priority match, or [`MatchedData::NotMatched`].
    #[must_use]
    pub fn match_path(&self, input: &str) -> MatchedData {
        self.match_all(input).next().into()
    }

    /// Whether any pattern accepts `input` at all.
    #[must_use]
    pub fn is_match(&self, input: &str) -> bool {
        self.match_all(input).next().is_some()
    }
}

/// Compile a single pattern. Same as [`Eval::single`].
///
/// # Errors
///
/// Any [`PatternError`] from parsing, compiling or optimizing.
pub fn compile_single(pattern: &str) -> Result<Eval<()>, PatternError> {
    Eval::single(pattern)
}

/// Compile tagged patterns into one automaton. Same as [`Eval::multi`].
///
/// # Errors
///
/// The first [`PatternError`] of any pattern.
pub fn compile_multi<T, I, P>(patterns: I) -> Result<Eval<T>, PatternError>
where
    T: Clone,
    I: IntoIterator<Item = (P, T)>,
    P: AsRef<str>,
{
    Eval::multi(patterns)
}

/// Normalized, checked, duplicate-free paths of one pattern.
fn pattern_paths(pattern: &str) -> Result<Vec<Path<()>>, PatternError> {
    let states = compile(&parse(pattern)?)?;
    if !states.last().is_some_and(|state| state.kind.is_end()) {
        return Err(PatternError::structural(
            "terminal state is not an end state",
        ));
    }

    let mut unique: Vec<Path<()>> = Vec::new();
    for path in optimizer::get_all_paths(&states)? {
        let path = optimizer::normalize(path);
        optimizer::check_path(&path)?;
        if !unique.contains(&path) {
            unique.push(path);
        }
    }
    Ok(unique)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Matches
// ═══════════════════════════════════════════════════════════════════════════════

/// Lazy iterator over the matches of one input. See [`Eval::match_all`].
pub struct Matches<'a, T> {
    data: &'a OptimizedData<T>,
    input: Cow<'a, str>,
    mode: Mode<'a>,
}

enum Mode<'a> {
    Done,
    /// Pure-literal automaton: the end states spelling the input.
    Fixed(std::slice::Iter<'a, StateId>),
    Search(Vec<Frame>),
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    state: StateId,
    /// Next outgoing edge to try.
    edge: usize,
    /// Input position after this state consumed its text.
    pos: usize,
}

impl<'a, T> Matches<'a, T> {
    fn new(data: &'a OptimizedData<T>, input: Cow<'a, str>) -> Self {
        let mode = if !data.may_match(&input) {
            Mode::Done
        } else if data.only_fixed() {
            Mode::Fixed(data.fixed(&input).iter())
        } else {
            Mode::Search(vec![Frame {
                state: 0,
                edge: 0,
                pos: 0,
            }])
        };
        Self { data, input, mode }
    }

    /// Position after `state` consumes from `pos`, or `None` if it cannot.
    fn enter(&self, state: StateId, pos: usize) -> Option<usize> {
        match &self.data.states().get(state)?.kind {
            StateKind::Start | StateKind::End(_) => Some(pos),
            StateKind::Fixed(data) => self
                .input
                .get(pos..)
                .is_some_and(|rest| rest.starts_with(data.as_str()))
                .then_some(pos + data.len()),
            StateKind::Parametric(name) => self.step(pos, name),
        }
    }

    /// Consume one character into capture `name`. Only `_` may take a `/`.
    fn step(&self, pos: usize, name: &str) -> Option<usize> {
        let c = self.input.get(pos..)?.chars().next()?;
        if c == '/' && name != UNDERSCORE {
            return None;
        }
        Some(pos + c.len_utf8())
    }

    /// Captures along an accepting stack. A capture spans from the previous
    /// frame's position to its own.
    fn params(&self, stack: &[Frame]) -> Params {
        let states = self.data.states();
        stack
            .windows(2)
            .filter_map(|pair| match &states[pair[1].state].kind {
                StateKind::Parametric(name) => Some((
                    name.clone(),
                    self.input[pair[0].pos..pair[1].pos].to_owned(),
                )),
                _ => None,
            })
            .collect()
    }
}

impl<T: Clone> Matches<'_, T> {
    fn search(&self, stack: &mut Vec<Frame>) -> Option<MatchResult<T>> {
        let states = self.data.states();

        while let Some(&top) = stack.last() {
            let state = &states[top.state];

            if let StateKind::End(tag) = &state.kind {
                let result = (top.pos == self.input.len()).then(|| MatchResult {
                    params: self.params(stack.as_slice()),
                    end: tag.clone(),
                });
                stack.pop();
                if result.is_some() {
                    return result;
                }
                continue;
            }

            if let Some(&next) = state.next.get(top.edge) {
                if let Some(frame) = stack.last_mut() {
                    frame.edge += 1;
                }
                if let Some(pos) = self.enter(next, top.pos) {
                    stack.push(Frame {
                        state: next,
                        edge: 0,
                        pos,
                    });
                }
                continue;
            }

            // Edges exhausted: a capture retries with one more character.
            stack.pop();
            if let StateKind::Parametric(name) = &state.kind {
                if let Some(pos) = self.step(top.pos, name) {
                    stack.push(Frame {
                        state: top.state,
                        edge: 0,
                        pos,
                    });
                }
            }
        }
        None
    }
}

impl<T: Clone> Iterator for Matches<'_, T> {
    type Item = MatchResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = match &mut self.mode {
            Mode::Done => None,
            Mode::Fixed(ends) => ends.next().and_then(|&id| {
                self.data.tag(id).map(|tag| MatchResult {
                    params: Params::new(),
                    end: tag.clone(),
                })
            }),
            Mode::Search(stack) => {
                let mut stack = std::mem::take(stack);
                let result = self.search(&mut stack);
                self.mode = Mode::Search(stack);
                result
            }
        };
        if result.is_none() {
            self.mode = Mode::Done;
        }
        result
    }
}

impl<T> std::fmt::Debug for Matches<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matches")
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}
