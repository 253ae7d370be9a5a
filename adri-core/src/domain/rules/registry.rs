// adri-core/src/domain/rules/registry.rs

use arc_swap::ArcSwap;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{debug, warn};

use crate::domain::dimensions::Dimension;
use crate::domain::error::DomainError;
use crate::domain::rules::{Rule, RuleDescriptor, RuleSpec, builtin};

type RuleTable = BTreeMap<String, RuleDescriptor>;

static GLOBAL_REGISTRY: OnceLock<Arc<RuleRegistry>> = OnceLock::new();

/// Rule id -> factory map.
///
/// Readers load the current table without locking and never observe a partial
/// update. Writers serialize on `writer`, copy the table and swap the copy in.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    table: ArcSwap<RuleTable>,
    writer: Mutex<()>,
}

impl RuleRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let registry = Self::empty();
        for descriptor in builtin::descriptors() {
            registry.register(descriptor);
        }
        registry
    }

    /// Process-wide registry, seeded with the built-in rules on first access.
    pub fn global() -> Arc<RuleRegistry> {
        GLOBAL_REGISTRY
            .get_or_init(|| Arc::new(Self::with_builtins()))
            .clone()
    }

    /// Adds a rule; an existing id is overwritten with a warning (last registration wins).
    pub fn register(&self, descriptor: RuleDescriptor) {
        let _writer = self.writer.lock().unwrap_or_else(|p| p.into_inner());
        let mut table = RuleTable::clone(&self.table.load());
        let id = descriptor.id.clone();
        if table.insert(id.clone(), descriptor).is_some() {
            warn!(rule = %id, "Rule id already registered, overwriting previous registration");
        } else {
            debug!(rule = %id, "Rule registered");
        }
        self.table.store(Arc::new(table));
    }

    pub fn snapshot(&self) -> Arc<RuleTable> {
        self.table.load_full()
    }

    pub fn get(&self, id: &str) -> Result<RuleDescriptor, DomainError> {
        self.snapshot()
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::UnknownRule(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.snapshot().contains_key(id)
    }

    pub fn list(&self) -> Vec<RuleDescriptor> {
        self.snapshot().values().cloned().collect()
    }

    pub fn list_by_dimension(&self, dimension: Dimension) -> Vec<RuleDescriptor> {
        self.snapshot()
            .values()
            .filter(|d| d.dimension == dimension)
            .cloned()
            .collect()
    }

    pub fn instantiate(&self, spec: &RuleSpec) -> Result<Box<dyn Rule>, DomainError> {
        self.get(&spec.id)?.instantiate(&spec.params)
    }
}
