use std::collections::HashSet;

use itertools::Itertools;
use prettytable::{row, Table};

use crate::cache::GdfsCache;
use crate::plan::{PlanNode, PlanNodeId, PlanNodeRef};

/// Optimized plans keyed by the structure of the plan they were produced from.
pub type PlanCache = GdfsCache<PlanNodeRef, PlanNodeRef>;

/// Caches `optimized` as the result for `plan`.
///
/// Both are deep copied, so pruning the originals later can't change the structural hash of a
/// cached key.
pub fn cache_plan(cache: &PlanCache, plan: &PlanNodeRef, optimized: &PlanNodeRef) {
    cache.set(plan.deep_copy(), optimized.deep_copy());
}

/// Lists cached plans with their structural hash and hit count, most used first.
pub fn cached_plans_table(cache: &PlanCache) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Hash", "Plan", "Frequency"]);

    let rows = cache
        .snapshot()
        .into_iter()
        .map(|(plan, entry)| (plan.hash_value(), plan.description(), entry.frequency))
        .sorted_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
    for (hash, description, frequency) in rows {
        table.add_row(row![format!("{:x}", hash), description, frequency]);
    }

    table
}

/// Lists every distinct node of the cached optimized plans, one row per node and plan, in the
/// order of [`cached_plans_table`]. The hash column identifies the cache key.
pub fn cached_operators_table(cache: &PlanCache) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Operator", "Plan Hash", "Description"]);

    let plans = cache
        .snapshot()
        .into_iter()
        .map(|(plan, entry)| (plan.hash_value(), entry.value, entry.frequency))
        .sorted_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
    for (hash, optimized, _) in plans {
        let plan_hash = format!("{:x}", hash);
        add_operator_rows(&mut table, &optimized, &plan_hash, &mut HashSet::new());
    }

    table
}

fn add_operator_rows(
    table: &mut Table,
    node: &PlanNode,
    plan_hash: &str,
    visited: &mut HashSet<PlanNodeId>,
) {
    if !visited.insert(node.id()) {
        return;
    }

    table.add_row(row![node.kind(), plan_hash, node.description()]);
    for input in node.inputs() {
        add_operator_rows(table, input, plan_hash, visited);
    }
}

#[cfg(test)]
mod tests {
    use crate::cache::{cache_plan, cached_operators_table, cached_plans_table, PlanCache};
    use crate::plan::LogicalPlanBuilder;
    use crate::test_utils::{abc_mock_node, column_ids};

    #[test]
    fn test_lookup_by_structure() {
        let cache = PlanCache::new(4);
        let plan = LogicalPlanBuilder::default()
            .with_root(abc_mock_node(vec![]))
            .limit(3)
            .build()
            .unwrap()
            .root();
        cache_plan(&cache, &plan, &plan);

        // Built independently, structurally equal.
        let same_plan = LogicalPlanBuilder::default()
            .with_root(abc_mock_node(vec![]))
            .limit(3)
            .build()
            .unwrap()
            .root();
        assert!(cache.has(&same_plan));

        // Mutating the original doesn't reach the cached copy.
        plan.inputs()[0]
            .set_pruned_column_ids(column_ids(&[0]))
            .unwrap();
        assert!(!cache.has(&plan));
        assert_eq!(Some(same_plan.clone()), cache.try_get(&same_plan));
        assert_eq!(2, cache.frequency(&same_plan));
    }

    #[test]
    fn test_cached_plans_table() {
        let cache = PlanCache::new(4);
        let leaf = abc_mock_node(vec![]);
        let limit = LogicalPlanBuilder::default()
            .with_root(leaf.clone())
            .limit(3)
            .build()
            .unwrap()
            .root();
        cache_plan(&cache, &leaf, &leaf);
        cache_plan(&cache, &limit, &limit);
        cache.try_get(&limit);

        let table = cached_plans_table(&cache);
        assert_eq!(3, table.len());

        let first = table.get_row(1).unwrap();
        assert_eq!(format!("{:x}", limit.hash_value()), first.get_cell(0).unwrap().get_content());
        assert_eq!("[Limit] 3 row(s)", first.get_cell(1).unwrap().get_content());
        assert_eq!("2", first.get_cell(2).unwrap().get_content());
        assert_eq!(
            leaf.description(),
            table.get_row(2).unwrap().get_cell(1).unwrap().get_content()
        );
    }

    #[test]
    fn test_cached_operators_table_lists_shared_node_once() {
        let cache = PlanCache::new(4);
        let leaf = abc_mock_node(vec![]);
        let plan = LogicalPlanBuilder::default()
            .with_root(leaf.clone())
            .cross_join(leaf.clone())
            .limit(3)
            .build()
            .unwrap()
            .root();
        cache_plan(&cache, &plan, &plan);

        let table = cached_operators_table(&cache);
        assert_eq!(4, table.len());

        let plan_hash = format!("{:x}", plan.hash_value());
        let rows: Vec<Vec<String>> = (1..table.len())
            .map(|i| {
                let row = table.get_row(i).unwrap();
                (0..3)
                    .map(|j| row.get_cell(j).unwrap().get_content())
                    .collect()
            })
            .collect();
        assert_eq!(
            vec![
                vec!["Limit".to_string(), plan_hash.clone(), "[Limit] 3 row(s)".to_string()],
                vec!["Join".to_string(), plan_hash.clone(), "[Join] Mode: Cross".to_string()],
                vec!["MockNode".to_string(), plan_hash, leaf.description()],
            ],
            rows
        );
    }
}
