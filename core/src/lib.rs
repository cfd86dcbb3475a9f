//! waypath - Route-pattern compiler and matching engine
//!
//! Compiles route templates such as `/users/:id/followers` or `(:b|d)?` once
//! into an automaton, then enumerates every pattern that matches a request
//! path, in priority order, together with the named captures.
//!
//! # Architecture
//!
//! Data flows strictly left to right, once per pattern, at registration time:
//!
//! ```text
//! pattern ──parse──▶ NodeSequence ──compile──▶ [State] ──get_all_paths──▶ [Path]
//!                                                                            │
//!                                    Eval ◀──── OptimizedData ◀──optimize────┘
//! ```
//!
//! - [`parse`]: pattern string to an ordered node tree
//! - [`compile`]: node tree to a dense graph of [`State`]s
//! - [`optimizer`]: coalescing, ambiguity rejection, fast-reject metadata
//! - [`Eval`]: the immutable matcher ([`Eval::match_path`], [`Eval::match_all`])
//! - [`Router`]: route table built once from many patterns, dispatching in priority order
//!
//! # Key Design Insights
//!
//! 1. **Alternation is graph branching**: groups never become states, so the
//!    evaluator is one generic traversal loop whatever the pattern shape.
//!
//! 2. **Many patterns, one traversal**: every pattern is flattened into
//!    straight-line paths tagged with its route index, and the union is
//!    optimized as a single automaton. Earlier registrations are yielded first.
//!
//! 3. **Errors at build time only**: parsing, compiling and optimizing return
//!    [`PatternError`]. Matching never fails; it yields matches or nothing.
//!
//! # Example
//!
//! ```
//! use waypath::prelude::*;
//!
//! let eval = Eval::single(":a/:_").unwrap();
//! let matched = eval.match_path("xxx/rrr/y");
//!
//! assert!(matched.is_matched());
//! assert_eq!(matched.param("a"), Some("xxx"));
//! assert_eq!(matched.param("_"), Some("rrr/y"));
//!
//! let routes = Eval::multi([("/users", 0), ("/users", 1), ("/users/:id", 2)]).unwrap();
//! let tags: Vec<_> = routes.match_all("/users").map(|m| m.end).collect();
//! assert_eq!(tags, vec![0, 1]);
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod compiler;
mod eval;
mod method;
mod node;
pub mod optimizer;
mod parser;
mod router;
mod state;

#[cfg(feature = "config")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Pipeline stages
pub use compiler::compile;
pub use optimizer::{optimize, OptimizedData};
pub use parser::parse;

// Core types
pub use eval::{compile_multi, compile_single, Eval, MatchResult, MatchedData, Matches, Params};
pub use method::{Method, UnknownMethod};
pub use node::{Node, NodeId, NodeKind, NodeSequence};
pub use router::{Dispatch, RouteMatch, Router, RouterBuilder, Target};
pub use state::{Path, State, StateId, StateKind, UNDERSCORE};

// Config (feature-gated)
#[cfg(feature = "config")]
pub use config::{RouteConfig, RouteTableConfig, TargetConfig};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use waypath::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Engine
        compile_multi,
        compile_single,
        Eval,
        MatchResult,
        MatchedData,
        Matches,
        // Router
        Method,
        Params,
        // Errors
        PatternError,
        RouteMatch,
        Router,
        RouterBuilder,
        Target,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum length of a pattern string, in bytes.
///
/// Checked before parsing. Route templates are short and human-authored;
/// anything longer is almost certainly not a route.
pub const MAX_PATTERN_LENGTH: usize = 4096;

/// Maximum number of straight-line paths a single pattern may expand to.
///
/// Every optional element doubles the path count, so a pattern made of
/// many optional groups grows exponentially. Checked during
/// [`optimizer::get_all_paths`].
pub const MAX_PATHS: usize = 1024;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from pattern parsing, compilation and optimization.
///
/// All of these surface while routes are registered, never while a path is
/// matched. Fix the pattern and rebuild.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// The pattern string is malformed.
    #[error("syntax error in pattern \"{pattern}\" at byte {position}: {reason}")]
    Syntax {
        /// The pattern that failed to parse.
        pattern: String,
        /// Byte offset of the offending character.
        position: usize,
        /// What went wrong.
        reason: &'static str,
    },

    /// The compiled graph violates an internal invariant.
    ///
    /// Indicates a parser or compiler bug rather than a bad pattern.
    #[error("malformed automaton: {reason}")]
    Structural {
        /// Which invariant was violated.
        reason: String,
    },

    /// Two captures are adjacent with no literal text between them.
    ///
    /// Given only the matched string there is no way to know where the
    /// first capture ends and the second begins.
    #[error("ambiguous pattern: :{first} and :{second} have no literal text between them")]
    Ambiguous {
        /// Name of the left capture.
        first: String,
        /// Name of the right capture.
        second: String,
    },

    /// The pattern exceeds [`MAX_PATTERN_LENGTH`].
    #[error("pattern length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// Actual length of the pattern in bytes.
        len: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// The pattern expands to more than [`MAX_PATHS`] straight-line paths.
    #[error("pattern expands to more than {max} paths; reduce the number of optional elements")]
    TooManyPaths {
        /// Maximum allowed.
        max: usize,
    },
}

impl PatternError {
    /// Stable short name of the error kind.
    ///
    /// One of `syntax`, `structural`, `ambiguous`, `too_long`, `too_many_paths`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "syntax",
            Self::Structural { .. } => "structural",
            Self::Ambiguous { .. } => "ambiguous",
            Self::PatternTooLong { .. } => "too_long",
            Self::TooManyPaths { .. } => "too_many_paths",
        }
    }

    pub(crate) fn structural(reason: impl Into<String>) -> Self {
        Self::Structural {
            reason: reason.into(),
        }
    }
}
