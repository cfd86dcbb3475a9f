//! Router: a route table compiled once, dispatched in priority order.
//!
//! Registration and dispatch are separate phases. A [`RouterBuilder`] collects
//! routes; [`RouterBuilder::build`] compiles every pattern into one
//! [`Eval`] (tag = route index) and hands back an immutable [`Router`]. There
//! is no way to add a route to a built router or to dispatch on a builder.
//!
//! ```text
//! RouterBuilder ──route()*──▶ RouterBuilder ──build()──▶ Router ──dispatch()──▶ RouteMatch*
//! ```

use crate::{Eval, Matches, Method, Params, PatternError, UNDERSCORE};

/// What a route leads to.
#[derive(Debug, Clone)]
pub enum Target<H> {
    /// A request handler (or middleware).
    Handler(H),
    /// A nested router that receives the remainder of the path.
    Mount(Router<H>),
}

#[derive(Debug, Clone)]
struct Route<H> {
    pattern: String,
    /// Empty means any method.
    methods: Vec<Method>,
    target: Target<H>,
}

impl<H> Route<H> {
    fn allows(&self, method: Method) -> bool {
        self.methods.is_empty() || self.methods.contains(&method)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Registration phase of a [`Router`].
///
/// Routes are matched in the order they are registered.
///
/// # Example
///
/// ```
/// use waypath::{Method, Router};
///
/// let api = Router::builder()
///     .get("/users/:id", "show user")
///     .build()
///     .unwrap();
///
/// let app = Router::builder()
///     .middleware("log")
///     .mount("/api", api)
///     .build()
///     .unwrap();
///
/// let handlers: Vec<_> = app
///     .dispatch(Method::Get, "/api/users/7")
///     .map(|m| *m.handler)
///     .collect();
/// assert_eq!(handlers, ["log", "show user"]);
/// ```
#[derive(Debug, Clone)]
pub struct RouterBuilder<H> {
    routes: Vec<Route<H>>,
}

impl<H> Default for RouterBuilder<H> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<H> RouterBuilder<H> {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `pattern` for `methods` (empty = any method).
    #[must_use]
    pub fn route(
        mut self,
        methods: impl IntoIterator<Item = Method>,
        pattern: impl Into<String>,
        target: Target<H>,
    ) -> Self {
        self.routes.push(Route {
            pattern: pattern.into(),
            methods: methods.into_iter().collect(),
            target,
        });
        self
    }

    /// Register a `GET` handler.
    #[must_use]
    pub fn get(self, pattern: impl Into<String>, handler: H) -> Self {
        self.route([Method::Get], pattern, Target::Handler(handler))
    }

    /// Register a `POST` handler.
    #[must_use]
    pub fn post(self, pattern: impl Into<String>, handler: H) -> Self {
        self.route([Method::Post], pattern, Target::Handler(handler))
    }

    /// Register a `PUT` handler.
    #[must_use]
    pub fn put(self, pattern: impl Into<String>, handler: H) -> Self {
        self.route([Method::Put], pattern, Target::Handler(handler))
    }

    /// Register a `DELETE` handler.
    #[must_use]
    pub fn delete(self, pattern: impl Into<String>, handler: H) -> Self {
        self.route([Method::Delete], pattern, Target::Handler(handler))
    }

    /// Register a handler for every method.
    #[must_use]
    pub fn any(self, pattern: impl Into<String>, handler: H) -> Self {
        self.route(std::iter::empty(), pattern, Target::Handler(handler))
    }

    /// Register a handler that sees every request, whatever the path.
    ///
    /// The whole path is captured as `_` (absent for the empty path).
    #[must_use]
    pub fn middleware(self, handler: H) -> Self {
        self.any("(:_)?", handler)
    }

    /// Mount `router` under `prefix` for every method.
    #[must_use]
    pub fn mount(self, prefix: &str, router: Router<H>) -> Self {
        self.mount_with(std::iter::empty(), prefix, router)
    }

    /// Mount `router` under `prefix` for `methods`.
    ///
    /// The prefix is itself a pattern and may capture; a trailing `/` is
    /// ignored. The nested router sees `/` followed by whatever follows the
    /// prefix.
    #[must_use]
    pub fn mount_with(
        self,
        methods: impl IntoIterator<Item = Method>,
        prefix: &str,
        router: Router<H>,
    ) -> Self {
        let pattern = format!("{}(/(:{UNDERSCORE})?)?", prefix.trim_end_matches('/'));
        self.route(methods, pattern, Target::Mount(router))
    }

    /// Number of routes registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no route has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Compile every pattern once and finalize the router.
    ///
    /// # Errors
    ///
    /// The first [`PatternError`] of any route pattern.
    pub fn build(self) -> Result<Router<H>, PatternError> {
        let eval = Eval::multi(
            self.routes
                .iter()
                .enumerate()
                .map(|(index, route)| (route.pattern.as_str(), index)),
        )?;

        tracing::debug!(
            routes = self.routes.len(),
            mounts = self
                .routes
                .iter()
                .filter(|route| matches!(route.target, Target::Mount(_)))
                .count(),
            paths = eval.data().path_count(),
            "router finalized"
        );

        Ok(Router {
            routes: self.routes,
            eval,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Router
// ═══════════════════════════════════════════════════════════════════════════════

/// An immutable route table.
///
/// Safe to share across threads; every [`Router::dispatch`] owns its state.
#[derive(Debug, Clone)]
pub struct Router<H> {
    routes: Vec<Route<H>>,
    eval: Eval<usize>,
}

impl<H> Router<H> {
    /// Start registering routes.
    #[must_use]
    pub fn builder() -> RouterBuilder<H> {
        RouterBuilder::new()
    }

    /// Lazily enumerate the handlers for a request, in priority order.
    ///
    /// Mounted routers are descended into where they match. Stop iterating
    /// as soon as a handler does not pass the request on.
    pub fn dispatch<'a>(&'a self, method: Method, path: &'a str) -> Dispatch<'a, H> {
        Dispatch {
            method,
            stack: vec![Level {
                router: self,
                matches: self.eval.match_all(path),
                inherited: Params::new(),
            }],
        }
    }

    /// Number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table has no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Route patterns in priority order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|route| route.pattern.as_str())
    }

    /// Whether some route captures a remainder (mounts and middleware do).
    #[must_use]
    pub fn has_underscore(&self) -> bool {
        self.eval.has_underscore()
    }
}

/// One handler selected by [`Router::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, H> {
    /// The selected handler.
    pub handler: &'a H,
    /// Captures, including those inherited from enclosing mounts.
    pub params: Params,
    /// Index of the route within the router that owns it.
    pub route: usize,
    /// Pattern of that route.
    pub pattern: &'a str,
}

struct Level<'a, H> {
    router: &'a Router<H>,
    matches: Matches<'a, usize>,
    /// Captures of the enclosing mounts, minus `_`.
    inherited: Params,
}

/// Lazy iterator returned by [`Router::dispatch`].
pub struct Dispatch<'a, H> {
    method: Method,
    stack: Vec<Level<'a, H>>,
}

impl<'a, H> Iterator for Dispatch<'a, H> {
    type Item = RouteMatch<'a, H>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            let Some(found) = level.matches.next() else {
                self.stack.pop();
                continue;
            };

            let router = level.router;
            let Some(route) = router.routes.get(found.end) else {
                continue;
            };
            if !route.allows(self.method) {
                tracing::trace!(
                    method = %self.method,
                    pattern = %route.pattern,
                    "skipping route: method not allowed"
                );
                continue;
            }

            let mut params = level.inherited.clone();
            params.extend(found.params);

            match &route.target {
                Target::Handler(handler) => {
                    return Some(RouteMatch {
                        handler,
                        params,
                        route: found.end,
                        pattern: &route.pattern,
                    });
                }
                Target::Mount(child) => {
                    let path = match params.remove(UNDERSCORE) {
                        Some(rest) => format!("/{rest}"),
                        None => "/".to_owned(),
                    };
                    self.stack.push(Level {
                        router: child,
                        matches: child.eval.match_all_owned(path),
                        inherited: params,
                    });
                }
            }
        }
    }
}

impl<H> std::fmt::Debug for Dispatch<'_, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatch")
            .field("method", &self.method)
            .field("depth", &self.stack.len())
            .finish()
    }
}
