use strum_macros::Display;

use crate::error::PlanResult;
use crate::operator::OperatorTrait;
use crate::plan::{PlanColumnReference, PlanNode};
use crate::properties::{FunctionalDependency, PlanUniqueConstraint};

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Display)]
pub enum JoinMode {
    /// Every left row paired with every right row.
    Cross,
    /// Left rows, kept only if the right input has any row.
    Semi,
}

/// Logical join without a predicate.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct JoinNode {
    mode: JoinMode,
}

impl JoinNode {
    pub fn new(mode: JoinMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> JoinMode {
        self.mode
    }
}

impl OperatorTrait for JoinNode {
    fn kind(&self) -> &'static str {
        "Join"
    }

    fn arity(&self) -> usize {
        2
    }

    fn description(&self, _node: &PlanNode) -> String {
        format!("[Join] Mode: {}", self.mode)
    }

    fn derive_column_expressions(
        &self,
        node: &PlanNode,
    ) -> PlanResult<Vec<PlanColumnReference>> {
        let mut columns = node.input(0).column_expressions()?;
        if self.mode == JoinMode::Cross {
            columns.extend(node.input(1).column_expressions()?);
        }
        Ok(columns)
    }

    /// A cross product repeats rows of both sides, so no key stays unique.
    fn derive_constraints(&self, node: &PlanNode) -> PlanResult<Vec<PlanUniqueConstraint>> {
        match self.mode {
            JoinMode::Cross => Ok(vec![]),
            JoinMode::Semi => node.input(0).constraints(),
        }
    }

    /// Dependencies of either side still hold in a cross product.
    fn derive_functional_dependencies(
        &self,
        node: &PlanNode,
    ) -> PlanResult<Vec<FunctionalDependency>> {
        let mut fds = node.input(0).functional_dependencies()?;
        if self.mode == JoinMode::Cross {
            // Both inputs may be the same shared node.
            for fd in node.input(1).functional_dependencies()? {
                if !fds.contains(&fd) {
                    fds.push(fd);
                }
            }
        }
        Ok(fds)
    }
}
