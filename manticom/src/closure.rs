//! Transitive closure of objects reachable from a seed set of names.

use crate::diagnostics::Diagnostics;
use crate::error::IssueKind;
use crate::graph::{ObjectDefinition, ObjectGraph};
use crate::pointer::Pointer;
use std::collections::BTreeSet;

/// Objects reachable from a seed set, plus the seed names that matched nothing.
///
/// Members are kept as declaration indices into the graph. Because the graph
/// never holds forward references, ascending declaration order lists every
/// dependency before its dependents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Closure {
    members: BTreeSet<usize>,
    dangling: BTreeSet<String>,
}

impl Closure {
    /// Members in dependency-first, deterministic order.
    pub fn objects<'g>(&self, graph: &'g ObjectGraph) -> impl Iterator<Item = &'g ObjectDefinition> {
        self.members
            .iter()
            .filter_map(move |&position| graph.at(position))
    }

    #[must_use]
    pub fn names(&self, graph: &ObjectGraph) -> BTreeSet<String> {
        self.objects(graph).map(|o| o.var_name.clone()).collect()
    }

    #[must_use]
    pub fn dangling(&self) -> &BTreeSet<String> {
        &self.dangling
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Both closures' members, de-duplicated.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            members: self.members.union(&other.members).copied().collect(),
            dangling: self.dangling.union(&other.dangling).cloned().collect(),
        }
    }

    /// Reports every dangling name as a single batch.
    pub fn report_dangling(&self, path: &Pointer, diagnostics: &mut Diagnostics) {
        if !self.dangling.is_empty() {
            diagnostics.report(
                path,
                IssueKind::DanglingReference(self.dangling.iter().cloned().collect()),
            );
        }
    }
}

/// Computes the closure of `seeds` over subclass edges.
///
/// Uses an explicit worklist and visited set, so each object is expanded once
/// regardless of how many paths reach it.
#[must_use]
pub fn closure(seeds: &BTreeSet<String>, graph: &ObjectGraph) -> Closure {
    let mut result = Closure::default();
    let mut worklist: Vec<usize> = Vec::new();

    for seed in seeds {
        match graph.position(seed) {
            Some(position) => worklist.push(position),
            None => {
                result.dangling.insert(seed.clone());
            }
        }
    }

    while let Some(position) = worklist.pop() {
        if !result.members.insert(position) {
            continue;
        }
        let Some(definition) = graph.at(position) else {
            continue;
        };
        for subclass in &definition.subclasses {
            match graph.position(&subclass.target) {
                Some(target) if !result.members.contains(&target) => worklist.push(target),
                Some(_) => {}
                None => {
                    result.dangling.insert(subclass.target.clone());
                }
            }
        }
    }

    result
}
