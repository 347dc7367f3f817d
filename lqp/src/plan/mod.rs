//! Logical plan graph.
//!
//! A plan is a single root dag of [`PlanNode`]s. Nodes are shared through [`PlanNodeRef`], so a
//! node may be the input of several parents, and pruning a shared node is visible to all of
//! them. Use [`PlanNode::deep_copy`] before specializing a subtree for one consumer only.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::mem::swap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use log::{debug, trace};
use once_cell::sync::OnceCell;
use parking_lot::{RwLock, RwLockReadGuard};

use crate::catalog::IndexStatistics;
use crate::error::{PlanError, PlanResult};
use crate::operator::{LogicalOperator, OperatorTrait};
use crate::properties::{FunctionalDependency, PlanUniqueConstraint};
use crate::pruning::normalize_pruned_ids;
use crate::types::{ChunkId, ColumnDefinition, ColumnId};

mod builder;
pub use builder::*;
mod column_ref;
pub use column_ref::*;
mod dedup;
pub use dedup::*;
pub mod explain;

pub type PlanNodeId = u32;

pub type PlanNodeRef = Arc<PlanNode>;

/// Maps ids of original nodes to their copies, see [`PlanNode::deep_copy_with_mapping`].
pub type PlanNodeMapping = HashMap<PlanNodeId, PlanNodeRef>;

static NEXT_PLAN_NODE_ID: AtomicU32 = AtomicU32::new(1);

fn next_plan_node_id() -> PlanNodeId {
    NEXT_PLAN_NODE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Artifacts derived lazily for leaf nodes, dropped as a whole by any pruning change.
#[derive(Default)]
struct DerivedProperties {
    column_expressions: OnceCell<Vec<PlanColumnReference>>,
    constraints: OnceCell<Vec<PlanUniqueConstraint>>,
    functional_dependencies: OnceCell<Vec<FunctionalDependency>>,
}

/// One node in a plan.
///
/// Equality and hashing are structural: they look at the operator and, recursively, the inputs,
/// but never at `id` or at the identity of the node.
///
/// Pruning setters take `&self` since nodes are shared. They are internally synchronized, but
/// concurrent pruning of a shared node by several optimizer passes still races logically and
/// should be serialized by the caller.
pub struct PlanNode {
    id: PlanNodeId,
    operator: RwLock<LogicalOperator>,
    inputs: Vec<PlanNodeRef>,
    derived: RwLock<Arc<DerivedProperties>>,
    this: Weak<PlanNode>,
}

impl PlanNode {
    /// Creates a node, checking the number of inputs against the operator.
    pub fn new(operator: LogicalOperator, inputs: Vec<PlanNodeRef>) -> PlanResult<PlanNodeRef> {
        if operator.arity() != inputs.len() {
            return Err(PlanError::InvalidInputCount {
                kind: operator.kind(),
                expected: operator.arity(),
                actual: inputs.len(),
            });
        }

        Ok(Self::new_unchecked(operator, inputs))
    }

    fn new_unchecked(operator: LogicalOperator, inputs: Vec<PlanNodeRef>) -> PlanNodeRef {
        Arc::new_cyclic(|this| PlanNode {
            id: next_plan_node_id(),
            operator: RwLock::new(operator),
            inputs,
            derived: RwLock::new(Arc::default()),
            this: this.clone(),
        })
    }

    pub fn id(&self) -> PlanNodeId {
        self.id
    }

    /// Read access to the operator.
    ///
    /// Derivations re-enter the lock of the node they run on, so reads never wait for queued
    /// writers.
    pub fn operator(&self) -> RwLockReadGuard<'_, LogicalOperator> {
        self.operator.read_recursive()
    }

    pub fn kind(&self) -> &'static str {
        self.operator().kind()
    }

    pub fn inputs(&self) -> &[PlanNodeRef] {
        &self.inputs
    }

    /// Input at `idx`. The input count is checked at construction.
    pub(crate) fn input(&self, idx: usize) -> &PlanNodeRef {
        &self.inputs[idx]
    }

    pub(crate) fn weak_ref(&self) -> &Weak<PlanNode> {
        &self.this
    }

    pub fn is_leaf(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn description(&self) -> String {
        self.operator().description(self)
    }

    /// Output columns after pruning, in ascending original column id order for leaves.
    pub fn column_expressions(&self) -> PlanResult<Vec<PlanColumnReference>> {
        self.derive_cached(
            |d| &d.column_expressions,
            |op| op.derive_column_expressions(self),
        )
    }

    /// Unique constraints whose key survives pruning, in declaration order.
    pub fn constraints(&self) -> PlanResult<Vec<PlanUniqueConstraint>> {
        self.derive_cached(|d| &d.constraints, |op| op.derive_constraints(self))
    }

    pub fn functional_dependencies(&self) -> PlanResult<Vec<FunctionalDependency>> {
        self.derive_cached(
            |d| &d.functional_dependencies,
            |op| op.derive_functional_dependencies(self),
        )
    }

    /// Secondary indexes over surviving columns. Only stored tables have any.
    pub fn indexes_statistics(&self) -> PlanResult<Vec<IndexStatistics>> {
        match &*self.operator() {
            LogicalOperator::StoredTable(table) => table.indexes_statistics(),
            _ => Ok(vec![]),
        }
    }

    /// All columns of a leaf before pruning.
    pub fn original_column_definitions(&self) -> PlanResult<Vec<ColumnDefinition>> {
        self.operator().original_column_definitions()
    }

    /// Looks up a column by name.
    ///
    /// Leaves search all of their original columns, so a pruned column can still be resolved.
    /// Inner nodes search their output columns.
    pub fn get_column(&self, name: &str) -> PlanResult<PlanColumnReference> {
        let mut candidates: Vec<PlanColumnReference> = if self.is_leaf() {
            self.original_column_definitions()?
                .iter()
                .enumerate()
                .filter(|(_, column)| column.name == name)
                .map(|(idx, _)| PlanColumnReference::from_weak(self.this.clone(), idx.into()))
                .collect()
        } else {
            self.column_expressions()?
                .into_iter()
                .filter(|c| c.column_definition().map_or(false, |d| d.name == name))
                .collect()
        };

        match candidates.len() {
            0 => Err(PlanError::ColumnNotFound(name.to_string())),
            1 => Ok(candidates.remove(0)),
            _ => Err(PlanError::AmbiguousColumn(name.to_string())),
        }
    }

    pub fn pruned_column_ids(&self) -> Vec<ColumnId> {
        self.operator().pruned_column_ids().to_vec()
    }

    pub fn pruned_chunk_ids(&self) -> Vec<ChunkId> {
        self.operator().pruned_chunk_ids().to_vec()
    }

    /// Replaces the pruned column set and drops all derived artifacts of this node.
    ///
    /// Ids out of range are rejected with [`PlanError::InvalidColumnId`] and nothing changes.
    pub fn set_pruned_column_ids<I>(&self, ids: I) -> PlanResult<()>
    where
        I: IntoIterator<Item = ColumnId>,
    {
        let ids = normalize_pruned_ids(ids);
        debug!("Pruning columns {:?} of plan node {}", ids, self.id);
        self.operator.write().set_pruned_column_ids(ids)?;
        self.invalidate_derived();
        Ok(())
    }

    /// Replaces the pruned chunk set. Only stored tables support chunk pruning.
    pub fn set_pruned_chunk_ids<I>(&self, ids: I) -> PlanResult<()>
    where
        I: IntoIterator<Item = ChunkId>,
    {
        let ids = normalize_pruned_ids(ids);
        debug!("Pruning chunks {:?} of plan node {}", ids, self.id);
        self.operator.write().set_pruned_chunk_ids(ids)?;
        self.invalidate_derived();
        Ok(())
    }

    /// Structural hash, equal for structurally equal nodes.
    pub fn hash_value(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Copies this node and everything below it.
    ///
    /// The copy is equal to the original but shares no state with it. Nodes reachable through
    /// several paths are copied once, so the copy has the same shape.
    pub fn deep_copy(&self) -> PlanNodeRef {
        self.deep_copy_with_mapping(&mut PlanNodeMapping::new())
    }

    /// Like [`PlanNode::deep_copy`], recording every copied node in `mapping`.
    pub fn deep_copy_with_mapping(&self, mapping: &mut PlanNodeMapping) -> PlanNodeRef {
        if let Some(copy) = mapping.get(&self.id) {
            return copy.clone();
        }

        let inputs = self
            .inputs
            .iter()
            .map(|input| input.deep_copy_with_mapping(mapping))
            .collect();
        let copy = Self::new_unchecked(self.operator().clone(), inputs);
        mapping.insert(self.id, copy.clone());
        copy
    }

    /// Creates a node with the same operator on top of other inputs.
    pub(crate) fn with_inputs(&self, inputs: Vec<PlanNodeRef>) -> PlanNodeRef {
        Self::new_unchecked(self.operator().clone(), inputs)
    }

    /// Only leaves memoize. Inner nodes recompute from their inputs on every call.
    fn derive_cached<T: Clone>(
        &self,
        slot: fn(&DerivedProperties) -> &OnceCell<T>,
        derive: impl FnOnce(&LogicalOperator) -> PlanResult<T>,
    ) -> PlanResult<T> {
        if !self.is_leaf() {
            return derive(&self.operator());
        }

        let derived = self.derived.read().clone();
        slot(&derived)
            .get_or_try_init(|| {
                trace!("Deriving properties of plan node {}", self.id);
                derive(&self.operator())
            })
            .cloned()
    }

    fn invalidate_derived(&self) {
        *self.derived.write() = Arc::default();
    }
}

impl PlanNode {
    /// Hash of the subtree, each distinct node hashed once per call.
    fn subtree_hash(&self, hashes: &mut HashMap<PlanNodeId, u64>) -> u64 {
        if let Some(hash) = hashes.get(&self.id) {
            return *hash;
        }

        let mut hasher = DefaultHasher::new();
        self.operator().hash(&mut hasher);
        for input in &self.inputs {
            hasher.write_u64(input.subtree_hash(hashes));
        }
        let hash = hasher.finish();
        hashes.insert(self.id, hash);
        hash
    }

    /// Structural equality, each pair of distinct nodes compared once per call.
    fn subtree_eq(
        &self,
        other: &PlanNode,
        equal: &mut HashSet<(PlanNodeId, PlanNodeId)>,
    ) -> bool {
        if std::ptr::eq(self, other) || equal.contains(&(self.id, other.id)) {
            return true;
        }

        let is_equal = self.inputs.len() == other.inputs.len()
            && *self.operator() == *other.operator()
            && self
                .inputs
                .iter()
                .zip(&other.inputs)
                .all(|(this, that)| this.subtree_eq(that, equal));
        if is_equal {
            equal.insert((self.id, other.id));
        }
        is_equal
    }
}

impl PartialEq for PlanNode {
    fn eq(&self, other: &Self) -> bool {
        self.subtree_eq(other, &mut HashSet::new())
    }
}

impl Eq for PlanNode {}

impl Hash for PlanNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.subtree_hash(&mut HashMap::new()));
    }
}

/// Inputs are listed by id, shared inputs would otherwise be printed once per path.
impl Debug for PlanNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanNode")
            .field("id", &self.id)
            .field("operator", &*self.operator())
            .field(
                "inputs",
                &self.inputs.iter().map(|input| input.id).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Display for PlanNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A query plan.
///
/// A query plan is a single root dag(directed acyclic graph) of logical operators.
#[derive(PartialEq, Debug)]
pub struct Plan {
    root: PlanNodeRef,
}

/// Breath first iterator of a single root dag plan.
struct BFSPlanNodeIter {
    visited: HashSet<PlanNodeId>,
    cur_level: Vec<PlanNodeRef>,
    next_level: Vec<PlanNodeRef>,
}

impl Iterator for BFSPlanNodeIter {
    type Item = PlanNodeRef;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur_level.is_empty() {
            swap(&mut self.cur_level, &mut self.next_level);
            self.cur_level.reverse();
        }

        if let Some(p) = self.cur_level.pop() {
            for input in &p.inputs {
                if self.visited.insert(input.id) {
                    self.next_level.push(input.clone());
                }
            }

            Some(p)
        } else {
            None
        }
    }
}

impl Plan {
    pub fn new(root: PlanNodeRef) -> Self {
        Self { root }
    }

    pub fn root(&self) -> PlanNodeRef {
        self.root.clone()
    }

    /// Visits every distinct node once, level by level starting at the root.
    pub fn bfs_iterator(&self) -> impl Iterator<Item = PlanNodeRef> {
        let mut visited = HashSet::new();
        visited.insert(self.root.id);

        BFSPlanNodeIter {
            cur_level: vec![self.root.clone()],
            next_level: vec![],
            visited,
        }
    }

    pub fn deep_copy(&self) -> Plan {
        Plan::new(self.root.deep_copy())
    }
}
