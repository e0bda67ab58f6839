// src/dag/graph.rs

use std::collections::BTreeMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{Result, SqlBranchError};

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone, Default)]
struct DagNode {
    /// Direct dependencies: the task's `after` list.
    deps: Vec<String>,
    /// Direct dependents: tasks listing this one in their `after`.
    dependents: Vec<String>,
}

/// In-memory DAG over branch operators and plain tasks, keyed by task id.
///
/// Built once while the config is validated; construction fails on a cycle,
/// so a `DagGraph` always carries a valid topological order. Dependents are
/// kept sorted by name so the downstream set handed to an operator is
/// deterministic.
#[derive(Debug, Clone)]
pub struct DagGraph {
    nodes: BTreeMap<String, DagNode>,
    order: Vec<String>,
}

impl DagGraph {
    /// Build a DAG from `(task, after)` pairs.
    ///
    /// Every name listed in an `after` must itself be one of the tasks.
    pub fn build<'a, I>(tasks: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a [String])>,
    {
        let mut nodes: BTreeMap<String, DagNode> = BTreeMap::new();
        for (name, after) in tasks {
            nodes.insert(
                name.to_string(),
                DagNode {
                    deps: after.to_vec(),
                    dependents: Vec::new(),
                },
            );
        }

        // BTreeMap iteration is sorted, so each dependents list ends up sorted.
        let edges: Vec<(String, String)> = nodes
            .iter()
            .flat_map(|(name, node)| node.deps.iter().map(move |d| (d.clone(), name.clone())))
            .collect();
        for (dep, task) in edges {
            if let Some(dep_node) = nodes.get_mut(&dep) {
                dep_node.dependents.push(task);
            }
        }

        let order = topological_order(&nodes)?;
        Ok(Self { nodes, order })
    }

    /// Return all task names.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Immediate dependencies of a task (the tasks listed in its `after`).
    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task: its downstream set.
    pub fn dependents_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// All task names in dependency order (every task after its `after`s).
    pub fn topological_order(&self) -> &[String] {
        &self.order
    }
}

fn topological_order(nodes: &BTreeMap<String, DagNode>) -> Result<Vec<String>> {
    // Edge direction: dep -> task.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for (name, node) in nodes.iter() {
        graph.add_node(name.as_str());
        for dep in node.deps.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    toposort(&graph, None)
        .map(|order| order.into_iter().map(str::to_string).collect())
        .map_err(|cycle| {
            SqlBranchError::DagCycle(format!(
                "cycle detected in task DAG involving task '{}'",
                cycle.node_id()
            ))
        })
}
