use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::cache::PlanCache;
use crate::catalog::Catalog;
use crate::plan::LogicalPlanBuilder;

pub const DEFAULT_PLAN_CACHE_CAPACITY: usize = 1024;

/// Settings read by the host, e.g. from a YAML or JSON file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub plan_cache_capacity: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            plan_cache_capacity: DEFAULT_PLAN_CACHE_CAPACITY,
        }
    }
}

/// Context for optimization. Includes access to catalog and the plan cache.
#[derive(Clone)]
pub struct OptimizerContext {
    pub catalog: Arc<dyn Catalog>,
    pub plan_cache: Arc<PlanCache>,
}

impl OptimizerContext {
    pub fn new(config: &OptimizerConfig, catalog: Arc<dyn Catalog>) -> Self {
        debug!("Creating optimizer context with {:?}", config);
        Self {
            catalog,
            plan_cache: Arc::new(PlanCache::new(config.plan_cache_capacity)),
        }
    }

    /// Builder resolving stored tables against this context's catalog.
    pub fn plan_builder(&self) -> LogicalPlanBuilder {
        LogicalPlanBuilder::new(self.catalog.clone())
    }
}
