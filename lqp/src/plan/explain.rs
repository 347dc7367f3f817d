use std::borrow::Cow;
use std::collections::HashSet;
use std::io::{BufWriter, Write};

use ptree::print_config::UTF_CHARS;
use ptree::{write_tree_with, PrintConfig, Style, TreeItem};

use crate::plan::{Plan, PlanNode, PlanNodeId};

/// Rendered line of a node with the lines of its inputs.
#[derive(Clone, Debug)]
struct ExplainLine {
    label: String,
    inputs: Vec<ExplainLine>,
}

impl ExplainLine {
    /// A node reached again through another parent is marked and not expanded twice.
    fn build(node: &PlanNode, expanded: &mut HashSet<PlanNodeId>) -> Self {
        if !expanded.insert(node.id()) {
            return Self {
                label: format!("{} (shared)", node.description()),
                inputs: vec![],
            };
        }

        let inputs = node
            .inputs()
            .iter()
            .map(|input| Self::build(input, expanded))
            .collect();
        Self {
            label: node.description(),
            inputs,
        }
    }
}

impl TreeItem for ExplainLine {
    type Child = Self;

    fn write_self<W: Write>(&self, f: &mut W, style: &Style) -> std::io::Result<()> {
        write!(f, "{}", style.paint(&self.label))
    }

    fn children(&self) -> Cow<[Self::Child]> {
        Cow::Borrowed(&self.inputs)
    }
}

/// Writes one line per node. A shared node is expanded under its first parent only, later
/// parents show it with a `(shared)` suffix.
pub fn explain<W: Write>(plan: &Plan, output: &mut W) -> std::io::Result<()> {
    let config = PrintConfig {
        indent: 3,
        characters: UTF_CHARS.into(),
        ..Default::default()
    };
    let tree = ExplainLine::build(&plan.root(), &mut HashSet::new());
    write_tree_with(&tree, output, &config)
}

pub fn explain_to_string(plan: &Plan) -> std::io::Result<String> {
    let mut buf = BufWriter::new(Vec::new());
    explain(plan, &mut buf)?;

    let bytes = buf.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::catalog::MemoryCatalog;
    use crate::plan::explain::explain_to_string;
    use crate::plan::LogicalPlanBuilder;
    use crate::test_utils::{chunk_ids, column_ids, int_int_float_table};
    use crate::types::{ColumnDefinition, DataType};

    #[test]
    fn test_explain_logical_plan() {
        let catalog = Arc::new(MemoryCatalog::new());
        catalog.add_table("t1", int_int_float_table()).unwrap();

        let mut builder = LogicalPlanBuilder::new(catalog);
        let right = builder
            .mock(
                vec![
                    ColumnDefinition::new(DataType::Int, "x"),
                    ColumnDefinition::new(DataType::String, "y"),
                ],
                Some("m"),
                vec![],
            )
            .build()
            .unwrap()
            .root();
        right.set_pruned_column_ids(column_ids(&[1])).unwrap();

        let plan = builder
            .stored_table("t1")
            .limit(5)
            .cross_join(right)
            .limit(10)
            .build()
            .unwrap();
        let table = plan.root().inputs()[0].inputs()[0].inputs()[0].clone();
        table.set_pruned_chunk_ids(chunk_ids(&[0, 3])).unwrap();

        let expected_result = "\
[Limit] 10 row(s)
└─ [Join] Mode: Cross
   ├─ [Limit] 5 row(s)
   │  └─ [StoredTable] Name: 't1' pruned: 2/4 chunk(s), 0/3 column(s)
   └─ [MockNode 'm'] Columns: x | pruned: 1/2 columns
";

        let result = explain_to_string(&plan).unwrap();

        assert_eq!(expected_result, result);
    }

    #[test]
    fn test_explain_marks_shared_node() {
        let catalog = Arc::new(MemoryCatalog::new());
        catalog.add_table("t1", int_int_float_table()).unwrap();

        let mut builder = LogicalPlanBuilder::new(catalog);
        let shared = builder.stored_table("t1").limit(5).build().unwrap().root();
        let plan = builder
            .with_root(shared.clone())
            .cross_join(shared)
            .build()
            .unwrap();

        let expected_result = "\
[Join] Mode: Cross
├─ [Limit] 5 row(s)
│  └─ [StoredTable] Name: 't1' pruned: 0/4 chunk(s), 0/3 column(s)
└─ [Limit] 5 row(s) (shared)
";

        assert_eq!(expected_result, explain_to_string(&plan).unwrap());
    }
}
