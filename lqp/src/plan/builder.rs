use std::sync::Arc;

use crate::catalog::{Catalog, MemoryCatalog};
use crate::error::{PlanError, PlanResult};
use crate::operator::{JoinMode, JoinNode, LimitNode, LogicalOperator, MockNode, StoredTableNode};
use crate::plan::{Plan, PlanNode, PlanNodeRef};
use crate::properties::UniqueConstraintDefinition;
use crate::types::ColumnDefinition;

/// Fluent construction of logical plans, bottom up.
///
/// The first failing step is remembered and returned by [`LogicalPlanBuilder::build`], later
/// steps are skipped.
pub struct LogicalPlanBuilder {
    catalog: Arc<dyn Catalog>,
    root: Option<PlanNodeRef>,
    error: Option<PlanError>,
}

impl Default for LogicalPlanBuilder {
    fn default() -> Self {
        Self::new(Arc::new(MemoryCatalog::default()))
    }
}

impl LogicalPlanBuilder {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            catalog,
            root: None,
            error: None,
        }
    }

    /// Continues building on top of an existing node.
    pub fn with_root(&mut self, root: PlanNodeRef) -> &mut Self {
        self.root = Some(root);
        self
    }

    pub fn mock<S: Into<String>>(
        &mut self,
        column_definitions: Vec<ColumnDefinition>,
        name: Option<S>,
        unique_constraints: Vec<UniqueConstraintDefinition>,
    ) -> &mut Self {
        let mock = MockNode::new(column_definitions, name.map(Into::into), unique_constraints);
        self.reset_root(mock.map(LogicalOperator::from), vec![])
    }

    pub fn stored_table<S: Into<String>>(&mut self, table_name: S) -> &mut Self {
        let table = StoredTableNode::new(table_name, self.catalog.clone());
        self.reset_root(table.map(LogicalOperator::from), vec![])
    }

    pub fn limit(&mut self, num_rows: u64) -> &mut Self {
        self.on_top(LimitNode::new(num_rows).into(), None)
    }

    pub fn cross_join(&mut self, right: PlanNodeRef) -> &mut Self {
        self.on_top(JoinNode::new(JoinMode::Cross).into(), Some(right))
    }

    pub fn semi_join(&mut self, right: PlanNodeRef) -> &mut Self {
        self.on_top(JoinNode::new(JoinMode::Semi).into(), Some(right))
    }

    /// Takes the current plan, keeping the catalog, so the builder can be reused for the next
    /// input of a join.
    pub fn build(&mut self) -> PlanResult<Plan> {
        let root = self.root.take();
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        root.map(Plan::new).ok_or(PlanError::EmptyPlan)
    }

    fn on_top(&mut self, operator: LogicalOperator, right: Option<PlanNodeRef>) -> &mut Self {
        match self.root.clone() {
            Some(root) => {
                let inputs = std::iter::once(root).chain(right).collect();
                self.reset_root(Ok(operator), inputs)
            }
            None => {
                self.error.get_or_insert(PlanError::EmptyPlan);
                self
            }
        }
    }

    fn reset_root(
        &mut self,
        operator: PlanResult<LogicalOperator>,
        inputs: Vec<PlanNodeRef>,
    ) -> &mut Self {
        if self.error.is_some() {
            return self;
        }

        match operator.and_then(|op| PlanNode::new(op, inputs)) {
            Ok(node) => self.root = Some(node),
            Err(e) => self.error = Some(e),
        }
        self
    }
}
