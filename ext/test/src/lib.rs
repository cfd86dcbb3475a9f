//! waypath-test: conformance fixtures for the waypath engine
//!
//! Fixtures are YAML documents, several per file separated by `---`. Two
//! shapes exist:
//!
//! - [`fixture::Fixture`] compiles a list of patterns with
//!   [`Eval::multi`](waypath::Eval::multi) (tag = position) and checks
//!   `match_all` for each input, order included, or checks that the build
//!   fails with a given error kind.
//! - [`route_fixture::RouteFixture`] builds a route table from config and
//!   checks [`Router::dispatch`](waypath::Router::dispatch) per method and path.
//!
//! # Example
//!
//! ```
//! use waypath_test::fixture::Fixture;
//!
//! let yaml = r#"
//! name: capture
//! description: a single capture
//! patterns: ["/users/:id"]
//! cases:
//!   - name: hit
//!     input: /users/7
//!     expect: [{ route: 0, params: { id: "7" } }]
//!   - name: miss
//!     input: /users
//!     expect: []
//! "#;
//!
//! Fixture::from_yaml(yaml).unwrap().run_and_assert();
//! ```

#[cfg(feature = "fixtures")]
pub mod fixture;
#[cfg(feature = "fixtures")]
pub mod route_fixture;

/// Prelude for convenient imports.
pub mod prelude {
    #[cfg(feature = "fixtures")]
    pub use super::{fixture::Fixture, route_fixture::RouteFixture};
    pub use waypath::prelude::*;
}
