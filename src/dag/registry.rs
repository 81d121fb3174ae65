// src/dag/registry.rs

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::dag::target::Target;
use crate::dag::task::{FnTask, Task, TaskFuture};
use crate::engine::TaskContext;
use crate::errors::{AssetpipeError, Result};
use crate::types::TaskName;

/// What a registered name resolves to.
#[derive(Clone)]
pub enum Entry {
    Task(Arc<dyn Task>),
    Target(Target),
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Task(_) => f.write_str("Task(..)"),
            Entry::Target(t) => f.debug_tuple("Target").field(t).finish(),
        }
    }
}

/// Name -> task / composite target table.
///
/// Tasks and targets share one namespace, so a composite can reference
/// either. Registering a name twice replaces the earlier entry.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    entries: BTreeMap<TaskName, Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_task(&mut self, name: impl Into<TaskName>, task: impl Task + 'static) -> &mut Self {
        self.insert(name.into(), Entry::Task(Arc::new(task)))
    }

    /// Register a closure as a task.
    pub fn register_fn<F>(&mut self, name: impl Into<TaskName>, f: F) -> &mut Self
    where
        F: Fn(TaskContext) -> TaskFuture + Send + Sync + 'static,
    {
        self.register_task(name, FnTask(f))
    }

    pub fn register_target(&mut self, name: impl Into<TaskName>, target: Target) -> &mut Self {
        self.insert(name.into(), Entry::Target(target))
    }

    fn insert(&mut self, name: TaskName, entry: Entry) -> &mut Self {
        if self.entries.insert(name.clone(), entry).is_some() {
            debug!(name = %name, "replaced existing registry entry");
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names of plain tasks, sorted.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|(name, entry)| match entry {
            Entry::Task(_) => Some(name.as_str()),
            Entry::Target(_) => None,
        })
    }

    /// Composite targets with their definitions, sorted by name.
    pub fn targets(&self) -> impl Iterator<Item = (&str, &Target)> {
        self.entries.iter().filter_map(|(name, entry)| match entry {
            Entry::Task(_) => None,
            Entry::Target(t) => Some((name.as_str(), t)),
        })
    }

    /// Check that every reference resolves and that no target (directly or
    /// transitively) references itself.
    pub fn validate(&self) -> Result<()> {
        for (name, target) in self.targets() {
            for reference in target.references() {
                if !self.contains(reference) {
                    return Err(AssetpipeError::ConfigError(format!(
                        "target '{name}' references unknown task '{reference}'"
                    )));
                }
            }
        }

        // Edge direction: target -> referenced name.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for name in self.entries.keys() {
            graph.add_node(name.as_str());
        }
        for (name, target) in self.targets() {
            for reference in target.references() {
                graph.add_edge(name, reference, ());
            }
        }

        match toposort(&graph, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => Err(AssetpipeError::TargetCycle(format!(
                "cycle detected in task graph involving '{}'",
                cycle.node_id()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::target::{parallel, series, task};

    fn noop(_cx: TaskContext) -> TaskFuture {
        Box::pin(async { Ok(()) })
    }

    #[test]
    fn unknown_reference_is_a_config_error() {
        let mut reg = Registry::new();
        reg.register_fn("a", noop)
            .register_target("all", series([task("a"), task("missing")]));

        match reg.validate() {
            Err(AssetpipeError::ConfigError(msg)) => {
                assert!(msg.contains("all"));
                assert!(msg.contains("missing"));
            }
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn mutually_recursive_targets_are_rejected() {
        let mut reg = Registry::new();
        reg.register_target("x", series([task("y")]))
            .register_target("y", parallel([task("x")]));

        assert!(matches!(reg.validate(), Err(AssetpipeError::TargetCycle(_))));
    }

    #[test]
    fn self_reference_is_rejected() {
        let mut reg = Registry::new();
        reg.register_target("loop", series([task("loop")]));
        assert!(matches!(reg.validate(), Err(AssetpipeError::TargetCycle(_))));
    }

    #[test]
    fn listing_separates_tasks_from_targets() {
        let mut reg = Registry::new();
        reg.register_fn("b", noop)
            .register_fn("a", noop)
            .register_target("both", parallel([task("a"), task("b")]));

        assert!(reg.validate().is_ok());
        assert_eq!(reg.task_names().collect::<Vec<_>>(), vec!["a", "b"]);
        let targets: Vec<_> = reg.targets().map(|(n, _)| n).collect();
        assert_eq!(targets, vec!["both"]);
    }
}
