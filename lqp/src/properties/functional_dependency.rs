use std::fmt::{Debug, Formatter};

use indexmap::IndexSet;
use itertools::Itertools;

use crate::plan::PlanColumnReference;

pub type ColumnReferenceSet = IndexSet<PlanColumnReference>;

/// Values of `determinants` uniquely determine values of `dependents`.
///
/// Both sets keep insertion order for display, but compare as sets. They are disjoint and never
/// empty.
#[derive(Clone, PartialEq, Eq)]
pub struct FunctionalDependency {
    determinants: ColumnReferenceSet,
    dependents: ColumnReferenceSet,
}

impl FunctionalDependency {
    pub fn new(determinants: ColumnReferenceSet, dependents: ColumnReferenceSet) -> Self {
        debug_assert!(!determinants.is_empty() && !dependents.is_empty());
        debug_assert!(determinants.is_disjoint(&dependents));
        Self {
            determinants,
            dependents,
        }
    }

    pub fn determinants(&self) -> &ColumnReferenceSet {
        &self.determinants
    }

    pub fn dependents(&self) -> &ColumnReferenceSet {
        &self.dependents
    }
}

impl Debug for FunctionalDependency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}} => {{{}}}",
            self.determinants.iter().map(|c| format!("{:?}", c)).join(", "),
            self.dependents.iter().map(|c| format!("{:?}", c)).join(", ")
        )
    }
}
