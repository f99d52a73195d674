//! Length-by-length frontier exploration.
//!
//! The frontier holds the live (nonzero) classes of paths of the current
//! length, each with every member path and its sign relative to the class
//! representative. One step extends every member by every outgoing arrow,
//! closes the new candidates under the rewrite rules with a signed
//! union-find, and drops the zero classes. A live class none of whose
//! extensions survive is maximal.
//!
//! # Determinism
//! - Live classes are processed in representative order and arrows in the
//!   quiver's adjacency order.
//! - The representative of a class is its smallest member path.

use super::{ComputeError, RepresentativeComputer, VertexComputation};
use crate::arena::{ClassArena, ClassHandle, Sign, UnionOutcome};
use crate::core::{Quiver, Vertex};
use crate::path::Path;
use crate::rules::{RuleAction, StateId, TransformationRuleTree, Transition};
use crate::settings::{AnalysisSettings, CancellationToken, CancellativityMode};
use std::collections::HashMap;
use tracing::{debug, debug_span, trace, warn};

/// A path in a class, with `path = sign · representative`.
#[derive(Debug, Clone)]
struct Member {
    path: Path,
    sign: Sign,
    state: StateId,
}

/// A nonzero class of equal-length paths.
///
/// `members` is sorted by path and never empty; the first member is the
/// representative with sign `+1`.
#[derive(Debug, Clone)]
struct LiveClass {
    members: Vec<Member>,
}

impl LiveClass {
    fn representative(&self) -> &Path {
        &self.members[0].path
    }
}

/// Result of extending the frontier by one arrow.
struct Step {
    next: Vec<LiveClass>,
    /// Per live class, whether any extension survived.
    extended: Vec<bool>,
    sign_conflict: bool,
    right_cancellation_failure: bool,
}

/// Default [`RepresentativeComputer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MaximalNonzeroEquivalenceClassRepresentativeComputer;

impl MaximalNonzeroEquivalenceClassRepresentativeComputer {
    /// Creates a new computer.
    pub fn new() -> Self {
        Self
    }

    fn step(
        quiver: &Quiver,
        tree: &TransformationRuleTree,
        live: &[LiveClass],
    ) -> Result<Step, ComputeError> {
        let mut arena: ClassArena<Vec<Member>> = ClassArena::new();
        // (live class, arrow index) per candidate, indexed by handle.
        let mut origins: Vec<(usize, usize)> = Vec::new();
        // Every extended path, including the ones that die, with its candidate.
        let mut index: HashMap<Path, (ClassHandle, Sign)> = HashMap::new();

        for (parent, class) in live.iter().enumerate() {
            let end = class.representative().end();
            for &arrow_index in quiver.outgoing_indices(end) {
                let arrow = quiver
                    .arrow(arrow_index)
                    .ok_or(ComputeError::UnknownArrowIndex(arrow_index))?;
                let mut members = Vec::with_capacity(class.members.len());
                let mut dead = Vec::new();
                for member in &class.members {
                    let path = member.path.extended_unchecked(arrow);
                    match tree.transition(member.state, arrow_index)? {
                        Transition::Live(state) => members.push(Member {
                            path,
                            sign: member.sign,
                            state,
                        }),
                        Transition::Dies => dead.push((path, member.sign)),
                    }
                }

                let handle = arena.allocate(Vec::new());
                origins.push((parent, arrow_index));
                for member in &members {
                    index.insert(member.path.clone(), (handle, member.sign));
                }
                if !dead.is_empty() {
                    arena.mark_zero(handle);
                }
                for (path, sign) in dead {
                    index.insert(path, (handle, sign));
                }
                if let Some(slot) = arena.get_mut(handle) {
                    *slot = members;
                }
            }
        }

        let handles: Vec<ClassHandle> = arena.handles().collect();

        // Collect first: the rewrites read the arena that the unions mutate.
        let mut unions = Vec::new();
        let mut zeroed = Vec::new();
        for &handle in &handles {
            for member in arena.get(handle).map(Vec::as_slice).unwrap_or(&[]) {
                for rule in tree.rewrites_at(member.state) {
                    let RuleAction::Replace { replacement, sign } = &rule.action else {
                        continue;
                    };
                    let counterpart =
                        member.path.with_suffix_replaced(rule.pattern.len(), replacement.arrows());
                    match index.get(&counterpart) {
                        // member = s_m·h, counterpart = s_o·other, member = sign·counterpart
                        Some(&(other, other_sign)) => {
                            unions.push((handle, other, member.sign * *sign * other_sign))
                        }
                        // The counterpart has a zero prefix.
                        None => zeroed.push(handle),
                    }
                }
            }
        }
        for handle in zeroed {
            arena.mark_zero(handle);
        }
        for (a, b, sign) in unions {
            if let UnionOutcome::SignConflict { root } = arena.union(a, b, sign) {
                trace!(%root, "class equals its own negative");
            }
        }

        let mut sign_conflict = false;
        let mut right_cancellation_failure = false;
        // (arrow index, root) -> live class the extension came from
        let mut by_arrow: HashMap<(usize, ClassHandle), usize> = HashMap::new();
        let mut extended = vec![false; live.len()];
        let mut groups: HashMap<ClassHandle, Vec<Member>> = HashMap::new();
        for &handle in &handles {
            sign_conflict |= arena.is_self_negating(handle);
            if arena.is_zero(handle) {
                continue;
            }
            let (root, to_root) = arena.find(handle);
            let (parent, arrow_index) = origins[handle.as_u32() as usize];
            extended[parent] = true;
            if let Some(&other) = by_arrow.get(&(arrow_index, root)) {
                if other != parent {
                    trace!(%root, arrow_index, "right cancellation fails");
                    right_cancellation_failure = true;
                }
            } else {
                by_arrow.insert((arrow_index, root), parent);
            }
            let members = arena.get_mut(handle).map(std::mem::take).unwrap_or_default();
            groups.entry(root).or_default().extend(members.into_iter().map(|m| Member {
                sign: m.sign * to_root,
                ..m
            }));
        }

        let mut next: Vec<LiveClass> = groups
            .into_values()
            .filter(|members| !members.is_empty())
            .map(|mut members| {
                members.sort_by(|a, b| a.path.cmp(&b.path));
                let pivot = members[0].sign;
                for member in &mut members {
                    member.sign = member.sign * pivot;
                }
                LiveClass { members }
            })
            .collect();
        next.sort_by(|a, b| a.representative().cmp(b.representative()));

        Ok(Step {
            next,
            extended,
            sign_conflict,
            right_cancellation_failure,
        })
    }
}

impl RepresentativeComputer for MaximalNonzeroEquivalenceClassRepresentativeComputer {
    fn compute_maximal_nonzero_equivalence_class_representatives_starting_at(
        &self,
        quiver: &Quiver,
        start: Vertex,
        tree: &TransformationRuleTree,
        settings: &AnalysisSettings,
        cancellation: &CancellationToken,
    ) -> Result<VertexComputation, ComputeError> {
        let span = debug_span!("vertex", %start);
        let _guard = span.enter();

        if !quiver.contains_vertex(start) {
            return Err(ComputeError::UnknownVertex(start));
        }
        tree.ensure_built_for(quiver)?;
        let root = tree.root(start)?;

        let mode = settings.cancellativity;
        let mut outcome = VertexComputation::new(start);
        let mut live = vec![LiveClass {
            members: vec![Member {
                path: Path::stationary(start),
                sign: Sign::Positive,
                state: root,
            }],
        }];
        let mut length = 0usize;

        loop {
            if cancellation.is_cancelled() {
                debug!(length, "cancelled");
                outcome.cancelled = true;
                break;
            }

            let step = Self::step(quiver, tree, &live)?;
            trace!(length, live = live.len(), next = step.next.len(), "extended frontier");

            for (class, &extended) in live.iter().zip(&step.extended) {
                if !extended {
                    outcome.maximal_representatives.push(class.representative().clone());
                }
            }

            let failure = step.sign_conflict || step.right_cancellation_failure;
            if failure && mode.checks() {
                warn!(
                    length = length + 1,
                    sign_conflict = step.sign_conflict,
                    right_cancellation = step.right_cancellation_failure,
                    "cancellativity failure"
                );
                match mode {
                    CancellativityMode::Cancellativity => outcome.cancellativity_failure_detected = true,
                    CancellativityMode::WeakCancellativity => {
                        outcome.weak_cancellativity_failure_detected = true
                    }
                    CancellativityMode::None => {}
                }
            }

            let Some(first) = step.next.first() else {
                break;
            };
            length += 1;
            outcome.longest_path = first.representative().clone();

            if settings.max_path_length.is_some_and(|max| length > max) {
                debug!(length, "maximal path length exceeded");
                outcome.max_path_length_exceeded = true;
                break;
            }
            if failure && mode.checks() && settings.early_termination.on_cancellativity_failure {
                break;
            }
            live = step.next;
        }

        outcome.maximal_representatives.sort();
        debug!(
            maximal = outcome.maximal_representatives.len(),
            longest = outcome.longest_path.len(),
            "vertex done"
        );
        Ok(outcome)
    }
}
