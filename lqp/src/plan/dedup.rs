use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::debug;

use crate::plan::{Plan, PlanNodeId, PlanNodeRef};

/// Merges structurally equal subtrees of `plan` into one shared node.
///
/// The result is equal to `plan`. Subtrees without duplicates are reused as they are, other nodes
/// are rebuilt on top of the merged inputs.
pub fn deduplicate(plan: &Plan) -> Plan {
    let mut distinct = HashSet::new();
    let mut visited = HashMap::new();
    let root = deduplicate_node(&plan.root(), &mut distinct, &mut visited);
    debug!(
        "Deduplicated plan of {} node(s) into {} distinct node(s)",
        visited.len(),
        distinct.len()
    );
    Plan::new(root)
}

fn deduplicate_node(
    node: &PlanNodeRef,
    distinct: &mut HashSet<PlanNodeRef>,
    visited: &mut HashMap<PlanNodeId, PlanNodeRef>,
) -> PlanNodeRef {
    if let Some(result) = visited.get(&node.id()) {
        return result.clone();
    }

    let result = match distinct.get(node) {
        Some(existing) => existing.clone(),
        None => {
            let inputs: Vec<PlanNodeRef> = node
                .inputs()
                .iter()
                .map(|input| deduplicate_node(input, distinct, visited))
                .collect();

            let unchanged = inputs
                .iter()
                .zip(node.inputs())
                .all(|(new, old)| Arc::ptr_eq(new, old));
            let result = if unchanged {
                node.clone()
            } else {
                node.with_inputs(inputs)
            };
            distinct.insert(result.clone());
            result
        }
    };

    visited.insert(node.id(), result.clone());
    result
}
