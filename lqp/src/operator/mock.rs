use std::hash::{Hash, Hasher};

use itertools::Itertools;

use crate::error::{PlanError, PlanResult};
use crate::operator::OperatorTrait;
use crate::plan::{PlanColumnReference, PlanNode};
use crate::properties::{FunctionalDependency, PlanUniqueConstraint, UniqueConstraintDefinition};
use crate::pruning::{
    first_out_of_range, leaf_column_expressions, leaf_constraints,
    leaf_functional_dependencies, surviving_column_ids,
};
use crate::types::{ColumnDefinition, ColumnId};

/// A relation defined only by its column list, without a backing table.
///
/// Two mock nodes are equal when column definitions, name and pruned columns match. Constraints
/// are given at construction and don't take part in equality.
#[derive(Clone, Debug)]
pub struct MockNode {
    column_definitions: Vec<ColumnDefinition>,
    name: Option<String>,
    unique_constraints: Vec<UniqueConstraintDefinition>,
    pruned_column_ids: Vec<ColumnId>,
}

impl MockNode {
    pub fn new(
        column_definitions: Vec<ColumnDefinition>,
        name: Option<String>,
        unique_constraints: Vec<UniqueConstraintDefinition>,
    ) -> PlanResult<Self> {
        for constraint in &unique_constraints {
            constraint.validate(column_definitions.len())?;
        }

        Ok(Self {
            column_definitions,
            name,
            unique_constraints,
            pruned_column_ids: vec![],
        })
    }

    pub fn column_definitions(&self) -> &[ColumnDefinition] {
        &self.column_definitions
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn unique_constraints(&self) -> &[UniqueConstraintDefinition] {
        &self.unique_constraints
    }
}

impl PartialEq for MockNode {
    fn eq(&self, other: &Self) -> bool {
        self.column_definitions == other.column_definitions
            && self.name == other.name
            && self.pruned_column_ids == other.pruned_column_ids
    }
}

impl Eq for MockNode {}

impl Hash for MockNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.column_definitions.hash(state);
        self.name.hash(state);
        self.pruned_column_ids.hash(state);
    }
}

impl OperatorTrait for MockNode {
    fn kind(&self) -> &'static str {
        "MockNode"
    }

    fn description(&self, _node: &PlanNode) -> String {
        let columns = surviving_column_ids(self.column_definitions.len(), &self.pruned_column_ids)
            .into_iter()
            .map(|c| &self.column_definitions[c.index()].name)
            .join(" ");

        format!(
            "[MockNode '{}'] Columns: {} | pruned: {}/{} columns",
            self.name.as_deref().unwrap_or("Unnamed"),
            columns,
            self.pruned_column_ids.len(),
            self.column_definitions.len()
        )
    }

    fn derive_column_expressions(
        &self,
        node: &PlanNode,
    ) -> PlanResult<Vec<PlanColumnReference>> {
        Ok(leaf_column_expressions(
            node.weak_ref(),
            self.column_definitions.len(),
            &self.pruned_column_ids,
        ))
    }

    fn derive_constraints(&self, node: &PlanNode) -> PlanResult<Vec<PlanUniqueConstraint>> {
        Ok(leaf_constraints(
            node.weak_ref(),
            &self.unique_constraints,
            &self.pruned_column_ids,
        ))
    }

    fn derive_functional_dependencies(
        &self,
        node: &PlanNode,
    ) -> PlanResult<Vec<FunctionalDependency>> {
        Ok(leaf_functional_dependencies(
            node.weak_ref(),
            &self.column_definitions,
            &self.unique_constraints,
            &self.pruned_column_ids,
        ))
    }

    fn original_column_definitions(&self) -> PlanResult<Vec<ColumnDefinition>> {
        Ok(self.column_definitions.clone())
    }

    fn pruned_column_ids(&self) -> &[ColumnId] {
        &self.pruned_column_ids
    }

    fn set_pruned_column_ids(&mut self, ids: Vec<ColumnId>) -> PlanResult<()> {
        let column_count = self.column_definitions.len();
        if let Some(column_id) = first_out_of_range(&ids, column_count) {
            return Err(PlanError::InvalidColumnId {
                column_id,
                column_count,
            });
        }

        self.pruned_column_ids = ids;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::PlanError;
    use crate::operator::MockNode;
    use crate::plan::{PlanColumnReference, PlanNode, PlanNodeRef};
    use crate::properties::UniqueConstraintDefinition;
    use crate::test_utils::{column_ids, mock_node};
    use crate::types::{ColumnDefinition, ColumnId, DataType};

    struct Fixture {
        mock_node_a: PlanNodeRef,
        mock_node_b: PlanNodeRef,
    }

    fn fixture() -> Fixture {
        let a_b_pk_constraint = UniqueConstraintDefinition::primary_key(column_ids(&[0, 1]));
        let c_constraint = UniqueConstraintDefinition::new(column_ids(&[2]));

        let mock_node_a = mock_node(
            vec![
                ColumnDefinition::new(DataType::Int, "a"),
                ColumnDefinition::new(DataType::Float, "b"),
                ColumnDefinition::new(DataType::Double, "c"),
                ColumnDefinition::new(DataType::String, "d"),
            ],
            None,
            vec![a_b_pk_constraint, c_constraint],
        );
        let mock_node_b = mock_node(
            vec![
                ColumnDefinition::new(DataType::Int, "a"),
                ColumnDefinition::new(DataType::Float, "b"),
            ],
            Some("mock_name"),
            vec![],
        );

        Fixture {
            mock_node_a,
            mock_node_b,
        }
    }

    #[test]
    fn test_description() {
        let f = fixture();
        assert_eq!(
            "[MockNode 'Unnamed'] Columns: a b c d | pruned: 0/4 columns",
            f.mock_node_a.description()
        );
        assert_eq!(
            "[MockNode 'mock_name'] Columns: a b | pruned: 0/2 columns",
            f.mock_node_b.description()
        );

        f.mock_node_a
            .set_pruned_column_ids(column_ids(&[2]))
            .unwrap();
        assert_eq!(
            "[MockNode 'Unnamed'] Columns: a b d | pruned: 1/4 columns",
            f.mock_node_a.description()
        );
    }

    #[test]
    fn test_output_column_expressions() {
        let f = fixture();
        let expressions = f.mock_node_a.column_expressions().unwrap();
        assert_eq!(4, expressions.len());
        for (idx, expression) in expressions.iter().enumerate() {
            assert_eq!(
                &PlanColumnReference::new(&f.mock_node_a, ColumnId::from(idx)),
                expression
            );
        }

        let expressions = f.mock_node_b.column_expressions().unwrap();
        assert_eq!(2, expressions.len());
        assert_eq!(
            PlanColumnReference::new(&f.mock_node_b, ColumnId::new(1)),
            expressions[1]
        );

        f.mock_node_a
            .set_pruned_column_ids(column_ids(&[0, 3]))
            .unwrap();
        let expressions = f.mock_node_a.column_expressions().unwrap();
        assert_eq!(
            vec![
                PlanColumnReference::new(&f.mock_node_a, ColumnId::new(1)),
                PlanColumnReference::new(&f.mock_node_a, ColumnId::new(2)),
            ],
            expressions
        );
    }

    #[test]
    fn test_hashing_and_equality_check() {
        let f = fixture();
        let same_mock_node_b = mock_node(
            vec![
                ColumnDefinition::new(DataType::Int, "a"),
                ColumnDefinition::new(DataType::Float, "b"),
            ],
            Some("mock_name"),
            vec![],
        );
        let different_mock_node_1 = mock_node(
            vec![
                ColumnDefinition::new(DataType::Long, "a"),
                ColumnDefinition::new(DataType::String, "b"),
            ],
            Some("mock_name"),
            vec![],
        );
        let different_mock_node_2 = mock_node(
            vec![
                ColumnDefinition::new(DataType::Int, "a"),
                ColumnDefinition::new(DataType::Float, "b"),
            ],
            Some("other_name"),
            vec![],
        );

        assert_eq!(*f.mock_node_b, *f.mock_node_b);
        assert_ne!(*f.mock_node_b, *different_mock_node_1);
        assert_ne!(*f.mock_node_b, *different_mock_node_2);
        assert_eq!(*f.mock_node_b, *same_mock_node_b);

        assert_ne!(f.mock_node_b.hash_value(), different_mock_node_1.hash_value());
        assert_ne!(f.mock_node_b.hash_value(), different_mock_node_2.hash_value());
        assert_eq!(f.mock_node_b.hash_value(), same_mock_node_b.hash_value());

        same_mock_node_b
            .set_pruned_column_ids(column_ids(&[1]))
            .unwrap();
        assert_ne!(*f.mock_node_b, *same_mock_node_b);
    }

    #[test]
    fn test_copy() {
        let f = fixture();
        assert_eq!(*f.mock_node_b, *f.mock_node_b.deep_copy());

        f.mock_node_b
            .set_pruned_column_ids(column_ids(&[1]))
            .unwrap();
        let copy = f.mock_node_b.deep_copy();
        assert_eq!(*f.mock_node_b, *copy);
        assert_eq!(f.mock_node_b.hash_value(), copy.hash_value());

        copy.set_pruned_column_ids(vec![]).unwrap();
        assert_eq!(1, f.mock_node_b.column_expressions().unwrap().len());
        assert_eq!(2, copy.column_expressions().unwrap().len());
    }

    #[test]
    fn test_unique_constraints() {
        let f = fixture();
        let constraints = f.mock_node_a.constraints().unwrap();
        assert_eq!(2, constraints.len());
        assert_eq!(
            &UniqueConstraintDefinition::primary_key(column_ids(&[0, 1])),
            constraints[0].definition()
        );
        assert_eq!(
            &UniqueConstraintDefinition::new(column_ids(&[2])),
            constraints[1].definition()
        );
        assert_eq!(
            vec![
                PlanColumnReference::new(&f.mock_node_a, ColumnId::new(0)),
                PlanColumnReference::new(&f.mock_node_a, ColumnId::new(1)),
            ],
            constraints[0].column_references()
        );

        assert!(f.mock_node_b.constraints().unwrap().is_empty());
    }

    #[test]
    fn test_unique_constraints_after_pruning() {
        let f = fixture();
        f.mock_node_a
            .set_pruned_column_ids(column_ids(&[1]))
            .unwrap();

        let constraints = f.mock_node_a.constraints().unwrap();
        assert_eq!(1, constraints.len());
        // Column `c` moved from position 2 to position 1.
        assert_eq!(
            &UniqueConstraintDefinition::new(column_ids(&[1])),
            constraints[0].definition()
        );
        assert_eq!(
            vec![PlanColumnReference::new(&f.mock_node_a, ColumnId::new(2))],
            constraints[0].column_references()
        );
    }

    #[test]
    fn test_invalid_construction_and_pruning() {
        assert_eq!(
            Err(PlanError::InvalidColumnId {
                column_id: ColumnId::new(2),
                column_count: 2
            }),
            MockNode::new(
                vec![
                    ColumnDefinition::new(DataType::Int, "a"),
                    ColumnDefinition::new(DataType::Int, "b"),
                ],
                None,
                vec![UniqueConstraintDefinition::new(column_ids(&[2]))],
            )
        );

        let f = fixture();
        f.mock_node_b
            .set_pruned_column_ids(column_ids(&[0]))
            .unwrap();
        assert_eq!(
            Err(PlanError::InvalidColumnId {
                column_id: ColumnId::new(2),
                column_count: 2
            }),
            f.mock_node_b.set_pruned_column_ids(column_ids(&[1, 2]))
        );
        // Rejected input leaves the node untouched.
        assert_eq!(&column_ids(&[0])[..], &f.mock_node_b.pruned_column_ids()[..]);

        assert!(matches!(
            f.mock_node_b.set_pruned_chunk_ids(vec![]),
            Err(PlanError::Unsupported { .. })
        ));
        assert!(f.mock_node_b.indexes_statistics().unwrap().is_empty());
    }

    #[test]
    fn test_node_is_leaf() {
        let f = fixture();
        assert!(f.mock_node_a.inputs().is_empty());
        assert!(PlanNode::new(
            MockNode::new(vec![], None, vec![]).unwrap().into(),
            vec![f.mock_node_a.clone()]
        )
        .is_err());
    }

    #[test]
    fn test_pruned_nullable_column_still_blocks_dependencies() {
        let node = mock_node(
            vec![
                ColumnDefinition::new(DataType::Int, "a"),
                ColumnDefinition::new(DataType::Int, "b"),
                ColumnDefinition::new(DataType::Int, "c").with_nullable(true),
            ],
            None,
            vec![UniqueConstraintDefinition::new(column_ids(&[0]))],
        );
        assert!(node.functional_dependencies().unwrap().is_empty());

        node.set_pruned_column_ids(column_ids(&[2])).unwrap();
        assert_eq!(1, node.constraints().unwrap().len());
        assert!(node.functional_dependencies().unwrap().is_empty());
    }
}
