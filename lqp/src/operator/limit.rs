use crate::error::PlanResult;
use crate::operator::OperatorTrait;
use crate::plan::{PlanColumnReference, PlanNode};
use crate::properties::{FunctionalDependency, PlanUniqueConstraint};

/// Passes through at most `num_rows` rows of its input.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct LimitNode {
    num_rows: u64,
}

impl LimitNode {
    pub fn new(num_rows: u64) -> Self {
        Self { num_rows }
    }

    pub fn num_rows(&self) -> u64 {
        self.num_rows
    }
}

impl OperatorTrait for LimitNode {
    fn kind(&self) -> &'static str {
        "Limit"
    }

    fn arity(&self) -> usize {
        1
    }

    fn description(&self, _node: &PlanNode) -> String {
        format!("[Limit] {} row(s)", self.num_rows)
    }

    fn derive_column_expressions(
        &self,
        node: &PlanNode,
    ) -> PlanResult<Vec<PlanColumnReference>> {
        node.input(0).column_expressions()
    }

    fn derive_constraints(&self, node: &PlanNode) -> PlanResult<Vec<PlanUniqueConstraint>> {
        node.input(0).constraints()
    }

    fn derive_functional_dependencies(
        &self,
        node: &PlanNode,
    ) -> PlanResult<Vec<FunctionalDependency>> {
        node.input(0).functional_dependencies()
    }
}
