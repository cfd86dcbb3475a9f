//! Compiler: node tree to a graph of [`State`]s.
//!
//! Groups are never materialized as states. Instead, edges are routed
//! through to the first and last node of every alternative, so alternation
//! becomes graph branching and the evaluator can stay a single traversal loop.
//!
//! Optional elements get bypass edges: every state flowing into the element
//! is connected directly to every state it flows out to. Bypass edges are
//! added after the regular ones, so taking the optional element has priority
//! over skipping it.

use crate::{Node, NodeId, NodeKind, NodeSequence, PatternError, State, StateId, StateKind};
use std::collections::{BTreeMap, HashMap};

const START: StateId = 0;

/// Compile a parsed pattern into a dense state array.
///
/// The result starts with the [`StateKind::Start`] state at index 0 and ends
/// with the single [`StateKind::End`] state; ids equal array positions.
///
/// # Errors
///
/// Returns [`PatternError::Structural`] if the tree is not a finished parser
/// output (empty sequence, empty alternative, leftover separator) or if the
/// end state ends up with outgoing edges.
///
/// # Example
///
/// ```
/// use waypath::{compile, parse, StateKind};
///
/// let states = compile(&parse("R(xY|T)?").unwrap()).unwrap();
/// assert_eq!(states[0].kind, StateKind::Start);
/// assert_eq!(states[1].kind, StateKind::Fixed("R".into()));
/// // "R" may continue with either alternative, or skip the group.
/// assert_eq!(states[1].next, vec![2, 3, 4]);
/// assert!(states[4].kind.is_end());
/// ```
pub fn compile(sequence: &NodeSequence) -> Result<Vec<State<()>>, PatternError> {
    let (Some(first), Some(last)) = (sequence.first(), sequence.last()) else {
        return Err(PatternError::structural("empty node sequence"));
    };

    let mut graph = Graph::default();
    graph.allocate(sequence)?;

    let end = graph.max_id + 1;
    graph.insert(START, StateKind::Start);
    graph.insert(end, StateKind::End(()));

    graph.connect(START, first.id)?;
    for pair in sequence.windows(2) {
        graph.connect(pair[0].id, pair[1].id)?;
    }
    graph.connect(last.id, end)?;

    graph.bypass_optionals(sequence)?;

    if graph.states.get(&end).is_some_and(|s| !s.next.is_empty()) {
        return Err(PatternError::structural(
            "end state must not have outgoing edges",
        ));
    }

    Ok(graph.into_states())
}

#[derive(Debug)]
struct RawState {
    kind: StateKind<()>,
    next: Vec<StateId>,
}

#[derive(Default)]
struct Graph<'n> {
    /// Keyed by node id (start is 0, end is one past the largest node id).
    states: BTreeMap<StateId, RawState>,
    nodes: HashMap<NodeId, &'n Node>,
    max_id: NodeId,
}

impl<'n> Graph<'n> {
    fn insert(&mut self, id: StateId, kind: StateKind<()>) {
        self.states.insert(
            id,
            RawState {
                kind,
                next: Vec::new(),
            },
        );
    }

    /// One state per literal or parameter; groups are only recorded.
    fn allocate(&mut self, sequence: &'n [Node]) -> Result<(), PatternError> {
        for node in sequence {
            self.nodes.insert(node.id, node);
            self.max_id = self.max_id.max(node.id);

            match &node.kind {
                NodeKind::Literal(data) => self.insert(node.id, StateKind::Fixed(data.clone())),
                NodeKind::Parameter { name, .. } => {
                    self.insert(node.id, StateKind::Parametric(name.clone()));
                }
                NodeKind::Group { alternatives, .. } => {
                    for alternative in alternatives {
                        if alternative.is_empty() {
                            return Err(PatternError::structural("empty group alternative"));
                        }
                        self.allocate(alternative)?;
                    }
                }
                NodeKind::GroupSeparator => {
                    return Err(PatternError::structural(
                        "group separator left in a finished tree",
                    ));
                }
            }
        }
        Ok(())
    }

    fn group(&self, id: NodeId) -> Option<&'n [NodeSequence]> {
        self.nodes.get(&id).copied().and_then(Node::alternatives)
    }

    /// Add the edge `from -> to`, routing through groups on either side.
    /// Idempotent.
    fn connect(&mut self, from: StateId, to: StateId) -> Result<(), PatternError> {
        if let Some(alternatives) = self.group(from) {
            for alternative in alternatives {
                let last = alternative
                    .last()
                    .ok_or_else(|| PatternError::structural("empty group alternative"))?;
                self.connect(last.id, to)?;
                for pair in alternative.windows(2) {
                    self.connect(pair[0].id, pair[1].id)?;
                }
            }
            return Ok(());
        }

        if let Some(alternatives) = self.group(to) {
            for alternative in alternatives {
                let first = alternative
                    .first()
                    .ok_or_else(|| PatternError::structural("empty group alternative"))?;
                self.connect(from, first.id)?;
            }
            return Ok(());
        }

        if !self.states.contains_key(&to) {
            return Err(PatternError::structural(format!(
                "edge to unknown state {to}"
            )));
        }
        let state = self
            .states
            .get_mut(&from)
            .ok_or_else(|| PatternError::structural(format!("edge from unknown state {from}")))?;
        if !state.next.contains(&to) {
            state.next.push(to);
        }
        Ok(())
    }

    fn bypass_optionals(&mut self, sequence: &'n [Node]) -> Result<(), PatternError> {
        for node in sequence {
            if node.is_optional() {
                let left = self.flowing_in(node);
                let right = self.flowing_out(node);
                for &l in &left {
                    for &r in &right {
                        self.connect(l, r)?;
                    }
                }
            }
            if let Some(alternatives) = node.alternatives() {
                for alternative in alternatives {
                    self.bypass_optionals(alternative)?;
                }
            }
        }
        Ok(())
    }

    /// States with an edge into `node` (into any alternative's first node for groups).
    fn flowing_in(&self, node: &Node) -> Vec<StateId> {
        match node.alternatives() {
            Some(alternatives) => alternatives
                .iter()
                .filter_map(|alternative| alternative.first())
                .flat_map(|first| self.flowing_in(first))
                .collect(),
            None => self
                .states
                .iter()
                .filter(|(_, state)| state.next.contains(&node.id))
                .map(|(&id, _)| id)
                .collect(),
        }
    }

    /// States `node` has edges to (from any alternative's last node for groups).
    fn flowing_out(&self, node: &Node) -> Vec<StateId> {
        match node.alternatives() {
            Some(alternatives) => alternatives
                .iter()
                .filter_map(|alternative| alternative.last())
                .flat_map(|last| self.flowing_out(last))
                .collect(),
            None => self
                .states
                .get(&node.id)
                .map(|state| state.next.clone())
                .unwrap_or_default(),
        }
    }

    /// Renumber to dense ids in ascending key order.
    fn into_states(self) -> Vec<State<()>> {
        let positions: HashMap<StateId, StateId> = self
            .states
            .keys()
            .enumerate()
            .map(|(position, &id)| (id, position))
            .collect();

        self.states
            .into_values()
            .enumerate()
            .map(|(position, raw)| State {
                id: position,
                kind: raw.kind,
                next: raw.next.iter().map(|id| positions[id]).collect(),
            })
            .collect()
    }
}
