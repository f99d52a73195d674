//! Transformation rule tree: a finite-state machine over arrows.
//!
//! A state records the minimal history of the current path needed to
//! recognise every rule pattern as a suffix (Aho–Corasick). The current vertex
//! is carried by the path itself, so a single automaton serves every start
//! vertex; [`TransformationRuleTree::root`] is the entry state for a vertex.
//!
//! Transitions are stored in a dense `states × arrows` table indexed by
//! integer state id. A transition that completes a zero pattern is
//! [`Transition::Dies`]; reaching a state exposes the rewrite rules whose
//! pattern ends there.
//!
//! # Citations
//! - Aho & Corasick, "Efficient string matching: an aid to bibliographic
//!   search", CACM (1975)

use super::RuleTreeError;
use crate::arena::Sign;
use crate::core::{Arrow, Quiver, Vertex};
use crate::path::Path;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

/// Identifier of an automaton state.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(u32);

impl StateId {
    /// The state of an empty history.
    pub const ROOT: StateId = StateId(0);

    /// Returns the raw index.
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateId({})", self.0)
    }
}

/// What happens to a path whose suffix matches a rule pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleAction {
    /// The path is zero.
    Dies,
    /// The path equals `sign` times the path with the suffix replaced.
    Replace {
        /// Parallel path substituted for the pattern.
        replacement: Path,
        /// Multiplier relating the two paths.
        sign: Sign,
    },
}

/// A rewrite rule: a pattern path and the action applied when it matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformationRule {
    /// Path matched as a suffix.
    pub pattern: Path,
    /// Action on match.
    pub action: RuleAction,
}

impl TransformationRule {
    /// Rule killing every path that ends with `pattern`.
    pub fn dies(pattern: Path) -> Self {
        Self {
            pattern,
            action: RuleAction::Dies,
        }
    }

    /// Rule equating `pattern` with `sign · replacement`.
    pub fn replace(pattern: Path, replacement: Path, sign: Sign) -> Self {
        Self {
            pattern,
            action: RuleAction::Replace { replacement, sign },
        }
    }
}

/// Result of following an arrow from a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The extended path is not killed by any pattern.
    Live(StateId),
    /// The extended path ends with a zero pattern.
    Dies,
}

#[derive(Debug, Clone)]
struct StateRecord {
    depth: usize,
    dead: bool,
    /// Indices into `rules` of the rewrite rules whose pattern ends here.
    rewrites: Vec<usize>,
}

/// Precomputed rewrite automaton for one quiver with potential.
///
/// The automaton's alphabet is the dense arrow index of the quiver it was
/// compiled for; [`TransformationRuleTree::ensure_built_for`] rejects any
/// other quiver.
#[derive(Debug, Clone)]
pub struct TransformationRuleTree {
    vertices: Vec<Vertex>,
    arrows: Vec<Arrow>,
    arrow_count: usize,
    states: Vec<StateRecord>,
    transitions: Vec<StateId>,
    rules: Vec<TransformationRule>,
}

#[derive(Debug, Default)]
struct TrieNode {
    children: BTreeMap<usize, usize>,
    fail: usize,
    depth: usize,
    outputs: Vec<usize>,
}

impl TransformationRuleTree {
    /// Compiles `rules` over the arrows of `quiver`.
    pub fn build(quiver: &Quiver, rules: Vec<TransformationRule>) -> Result<Self, RuleTreeError> {
        let mut nodes = vec![TrieNode::default()];
        for (rule_index, rule) in rules.iter().enumerate() {
            let mut current = 0;
            for arrow in rule.pattern.arrows() {
                let symbol = quiver
                    .arrow_index(arrow)
                    .ok_or(RuleTreeError::UnknownArrow(*arrow))?;
                current = match nodes[current].children.get(&symbol) {
                    Some(&next) => next,
                    None => {
                        let depth = nodes[current].depth + 1;
                        nodes.push(TrieNode {
                            depth,
                            ..TrieNode::default()
                        });
                        let next = nodes.len() - 1;
                        nodes[current].children.insert(symbol, next);
                        next
                    }
                };
            }
            nodes[current].outputs.push(rule_index);
        }

        // Breadth-first: failure links point to strictly shallower nodes, so
        // they are complete by the time a node is visited.
        let mut order = Vec::with_capacity(nodes.len());
        let mut queue: VecDeque<usize> = nodes[0].children.values().copied().collect();
        while let Some(node) = queue.pop_front() {
            order.push(node);
            let children: Vec<(usize, usize)> =
                nodes[node].children.iter().map(|(&s, &c)| (s, c)).collect();
            for (symbol, child) in children {
                let mut fallback = nodes[node].fail;
                let fail = loop {
                    if let Some(&target) = nodes[fallback].children.get(&symbol) {
                        break target;
                    }
                    if fallback == 0 {
                        break 0;
                    }
                    fallback = nodes[fallback].fail;
                };
                nodes[child].fail = fail;
                let inherited = nodes[fail].outputs.clone();
                nodes[child].outputs.extend(inherited);
                queue.push_back(child);
            }
        }

        let arrow_count = quiver.arrow_count();
        let mut transitions = vec![StateId::ROOT; nodes.len() * arrow_count];
        for symbol in 0..arrow_count {
            if let Some(&child) = nodes[0].children.get(&symbol) {
                transitions[symbol] = StateId(child as u32);
            }
        }
        for &node in &order {
            let fail = nodes[node].fail;
            for symbol in 0..arrow_count {
                transitions[node * arrow_count + symbol] = match nodes[node].children.get(&symbol) {
                    Some(&child) => StateId(child as u32),
                    None => transitions[fail * arrow_count + symbol],
                };
            }
        }

        let states = nodes
            .iter()
            .map(|node| StateRecord {
                depth: node.depth,
                dead: node
                    .outputs
                    .iter()
                    .any(|&r| matches!(rules[r].action, RuleAction::Dies)),
                rewrites: node
                    .outputs
                    .iter()
                    .copied()
                    .filter(|&r| matches!(rules[r].action, RuleAction::Replace { .. }))
                    .collect(),
            })
            .collect();

        Ok(Self {
            vertices: quiver.vertices().to_vec(),
            arrows: quiver.arrows().to_vec(),
            arrow_count,
            states,
            transitions,
            rules,
        })
    }

    /// Checks that `quiver` has exactly the vertices and indexed arrows this
    /// tree was compiled for.
    pub fn ensure_built_for(&self, quiver: &Quiver) -> Result<(), RuleTreeError> {
        if self.vertices.as_slice() != quiver.vertices() {
            return Err(RuleTreeError::QuiverMismatch { arrow_index: None });
        }
        let mismatch = (0..self.arrows.len().max(quiver.arrow_count()))
            .find(|&index| self.arrows.get(index).copied() != quiver.arrow(index));
        match mismatch {
            Some(index) => Err(RuleTreeError::QuiverMismatch {
                arrow_index: Some(index),
            }),
            None => Ok(()),
        }
    }

    /// Entry state for paths starting at `vertex`.
    pub fn root(&self, vertex: Vertex) -> Result<StateId, RuleTreeError> {
        self.vertices
            .binary_search(&vertex)
            .map(|_| StateId::ROOT)
            .map_err(|_| RuleTreeError::UnknownVertex(vertex))
    }

    /// Follows the arrow with dense index `arrow_index` from `state`.
    pub fn transition(&self, state: StateId, arrow_index: usize) -> Result<Transition, RuleTreeError> {
        let invalid = RuleTreeError::InvalidTransition {
            state: state.0,
            arrow_index,
        };
        if arrow_index >= self.arrow_count {
            return Err(invalid);
        }
        let target = *self
            .transitions
            .get(state.0 as usize * self.arrow_count + arrow_index)
            .ok_or(invalid)?;
        if self.states[target.0 as usize].dead {
            Ok(Transition::Dies)
        } else {
            Ok(Transition::Live(target))
        }
    }

    /// Rewrite rules whose pattern is a suffix of every path reaching `state`.
    pub fn rewrites_at(&self, state: StateId) -> impl Iterator<Item = &TransformationRule> + '_ {
        self.states
            .get(state.0 as usize)
            .map(|record| record.rewrites.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&r| &self.rules[r])
    }

    /// Length of the history remembered by `state`.
    pub fn depth(&self, state: StateId) -> Option<usize> {
        self.states.get(state.0 as usize).map(|record| record.depth)
    }

    /// All compiled rules, in derivation order.
    #[inline]
    pub fn rules(&self) -> &[TransformationRule] {
        &self.rules
    }

    /// Number of automaton states.
    #[inline]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Arrow;

    fn quiver() -> Quiver {
        let arrows = [(1, 2), (2, 3), (3, 1), (2, 4), (4, 3)]
            .map(|(s, t)| Arrow::new(Vertex::new(s), Vertex::new(t)));
        Quiver::new((1..=4).map(Vertex::new), arrows).unwrap()
    }

    fn path(vertices: &[u32]) -> Path {
        Path::through(vertices).unwrap()
    }

    fn follow(tree: &TransformationRuleTree, q: &Quiver, p: &Path) -> Transition {
        let mut state = tree.root(p.start()).unwrap();
        let mut last = Transition::Live(state);
        for arrow in p.arrows() {
            last = tree.transition(state, q.arrow_index(arrow).unwrap()).unwrap();
            match last {
                Transition::Live(next) => state = next,
                Transition::Dies => return last,
            }
        }
        last
    }

    #[test]
    fn zero_patterns_kill_any_prefix_context() {
        let q = quiver();
        let tree = TransformationRuleTree::build(&q, vec![TransformationRule::dies(path(&[2, 3, 1]))])
            .unwrap();
        assert_eq!(follow(&tree, &q, &path(&[2, 3, 1])), Transition::Dies);
        // Pattern matched after an unrelated prefix.
        assert_eq!(follow(&tree, &q, &path(&[1, 2, 3, 1])), Transition::Dies);
        assert!(matches!(follow(&tree, &q, &path(&[1, 2, 4, 3])), Transition::Live(_)));
        assert!(matches!(follow(&tree, &q, &path(&[3, 1, 2, 3])), Transition::Live(_)));
    }

    #[test]
    fn rewrites_are_reported_at_suffix_states() {
        let q = quiver();
        let rules = vec![
            TransformationRule::replace(path(&[2, 3]), path(&[2, 4, 3]), Sign::Positive),
            TransformationRule::replace(path(&[1, 2, 3]), path(&[1, 2, 4, 3]), Sign::Negative),
        ];
        let tree = TransformationRuleTree::build(&q, rules).unwrap();
        let Transition::Live(state) = follow(&tree, &q, &path(&[1, 2, 3])) else {
            panic!("path should be live");
        };
        // Both `1->2->3` and its suffix `2->3` match.
        assert_eq!(tree.rewrites_at(state).count(), 2);
        assert_eq!(tree.depth(state), Some(2));

        let Transition::Live(state) = follow(&tree, &q, &path(&[3, 1, 2])) else {
            panic!("path should be live");
        };
        assert_eq!(tree.rewrites_at(state).count(), 0);
    }

    #[test]
    fn lookups_are_validated() {
        let q = quiver();
        let tree = TransformationRuleTree::build(&q, Vec::new()).unwrap();
        assert_eq!(tree.state_count(), 1);
        assert_eq!(tree.root(Vertex::new(9)), Err(RuleTreeError::UnknownVertex(Vertex::new(9))));
        assert!(tree.transition(StateId::ROOT, 99).is_err());
        assert_eq!(tree.transition(StateId::ROOT, 0), Ok(Transition::Live(StateId::ROOT)));
        let missing = TransformationRule::dies(path(&[3, 2]));
        assert_eq!(
            TransformationRuleTree::build(&q, vec![missing]).unwrap_err(),
            RuleTreeError::UnknownArrow(Arrow::new(Vertex::new(3), Vertex::new(2)))
        );
    }

    #[test]
    fn tree_rejects_a_foreign_quiver() {
        let q = quiver();
        let tree = TransformationRuleTree::build(&q, Vec::new()).unwrap();
        assert_eq!(tree.ensure_built_for(&q), Ok(()));

        // Same vertex set and arrow count, different arrows.
        let swapped = [(1, 2), (2, 3), (3, 1), (2, 4), (3, 4)]
            .map(|(s, t)| Arrow::new(Vertex::new(s), Vertex::new(t)));
        let other = Quiver::new((1..=4).map(Vertex::new), swapped).unwrap();
        assert_eq!(
            tree.ensure_built_for(&other),
            Err(RuleTreeError::QuiverMismatch { arrow_index: Some(4) })
        );

        // Same arrows, reordered: the arrow indices no longer agree.
        let reordered = [(2, 3), (1, 2), (3, 1), (2, 4), (4, 3)]
            .map(|(s, t)| Arrow::new(Vertex::new(s), Vertex::new(t)));
        let other = Quiver::new((1..=4).map(Vertex::new), reordered).unwrap();
        assert_eq!(
            tree.ensure_built_for(&other),
            Err(RuleTreeError::QuiverMismatch { arrow_index: Some(0) })
        );

        let fewer_vertices = Quiver::new((1..=3).map(Vertex::new), Vec::<Arrow>::new()).unwrap();
        assert_eq!(
            tree.ensure_built_for(&fewer_vertices),
            Err(RuleTreeError::QuiverMismatch { arrow_index: None })
        );
    }
}
