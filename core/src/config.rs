//! Config types for route tables.
//!
//! These types mirror the router types but are serde-deserializable, so a
//! route table can be loaded from JSON or YAML and built into a [`Router`].
//!
//! # Relationship to runtime types
//!
//! | Config type | Runtime type | Built by |
//! |-------------|--------------|----------|
//! | [`RouteTableConfig`] | [`Router`] | [`RouteTableConfig::build()`] |
//! | [`RouteConfig`] | one registered route | [`RouterBuilder::route`](crate::RouterBuilder::route) |
//! | [`TargetConfig`] | [`Target`] | |

use crate::{Method, PatternError, Router, RouterBuilder, Target};
use serde::Deserialize;

/// Configuration for a [`Router`].
///
/// ```yaml
/// routes:
///   - pattern: /users/:id
///     methods: [GET]
///     target: { type: action, action: show_user }
///   - pattern: /admin
///     target:
///       type: mount
///       routes:
///         - pattern: /stats
///           target: { type: action, action: stats }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de>"))]
pub struct RouteTableConfig<A> {
    /// Routes in priority order.
    pub routes: Vec<RouteConfig<A>>,
}

/// Configuration for one route.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de>"))]
pub struct RouteConfig<A> {
    /// The route pattern; for a mount, the prefix.
    pub pattern: String,

    /// Methods the route answers. Empty means any.
    #[serde(default)]
    pub methods: Vec<Method>,

    /// What the route leads to.
    pub target: TargetConfig<A>,
}

/// Configuration for a [`Target`].
///
/// Uses `#[serde(tag = "type")]`:
///
/// ```json
/// { "type": "action", "action": "show_user" }
/// { "type": "mount", "routes": [...] }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
#[serde(bound(deserialize = "A: Deserialize<'de>"))]
pub enum TargetConfig<A> {
    /// Dispatch to this action.
    #[serde(rename = "action")]
    Action {
        /// The action value.
        action: A,
    },

    /// Hand the remainder of the path to a nested route table.
    #[serde(rename = "mount")]
    Mount {
        /// Routes of the nested table.
        routes: Vec<RouteConfig<A>>,
    },
}

impl<A> RouteTableConfig<A> {
    /// Build the router, nested tables first.
    ///
    /// # Errors
    ///
    /// The first [`PatternError`] of any route pattern, at any depth.
    pub fn build(self) -> Result<Router<A>, PatternError> {
        build_routes(self.routes)
    }
}

fn build_routes<A>(routes: Vec<RouteConfig<A>>) -> Result<Router<A>, PatternError> {
    let mut builder = RouterBuilder::new();
    for route in routes {
        builder = match route.target {
            TargetConfig::Action { action } => {
                builder.route(route.methods, route.pattern, Target::Handler(action))
            }
            TargetConfig::Mount { routes } => {
                builder.mount_with(route.methods, &route.pattern, build_routes(routes)?)
            }
        };
    }
    builder.build()
}
