//! Dependency ordering of parsed models.
//!
//! Models are nodes of a directed graph; an edge `A -> B` means `B` has a
//! field of type `A` and must therefore be declared after it. Only edges
//! between models are kept, so scalars, enums and unknown names never
//! constrain the order.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tracing::{debug, warn};

use crate::error::{GenError, GenResult};
use crate::model::{DomainModel, DomainModelCollection};

impl DomainModelCollection {
    /// Graph of model dependencies. Node indices follow declaration order.
    pub fn dependency_graph(&self) -> DiGraph<&str, ()> {
        let mut graph = DiGraph::new();
        let index: HashMap<&str, NodeIndex> = self
            .models
            .iter()
            .map(|m| (m.name(), graph.add_node(m.name())))
            .collect();

        for model in &self.models {
            let target = index[model.name()];
            for dep in model.dependencies() {
                match index.get(dep) {
                    Some(&source) => {
                        graph.update_edge(source, target, ());
                    }
                    None if self.is_enum(dep) || self.is_scalar(dep) => {}
                    None => warn!(
                        "Model {} references unknown type {}; it will not affect ordering",
                        model.name(),
                        dep
                    ),
                }
            }
        }

        graph
    }

    /// Models ordered so each one comes after every model it references.
    ///
    /// Among models that are ready at the same time the one declared first
    /// wins, which keeps the output stable across runs. A cycle, including a
    /// model referencing itself, is an error.
    pub fn topological_order(&self) -> GenResult<Vec<&DomainModel>> {
        let graph = self.dependency_graph();

        let mut in_degree: Vec<usize> = graph
            .node_indices()
            .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
            .collect();

        let mut ready: BinaryHeap<Reverse<NodeIndex>> = graph
            .node_indices()
            .filter(|n| in_degree[n.index()] == 0)
            .map(Reverse)
            .collect();

        let mut ordered = Vec::with_capacity(self.models.len());
        while let Some(Reverse(node)) = ready.pop() {
            ordered.push(&self.models[node.index()]);
            for next in graph.neighbors_directed(node, Direction::Outgoing) {
                in_degree[next.index()] -= 1;
                if in_degree[next.index()] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if ordered.len() < self.models.len() {
            return Err(GenError::Cycle {
                models: cycle_members(&graph),
            });
        }

        debug!(
            "Dependency order: {}",
            ordered
                .iter()
                .map(|m| m.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(ordered)
    }
}

/// Names of models on a cycle, from the first cyclic component in
/// declaration order.
fn cycle_members(graph: &DiGraph<&str, ()>) -> Vec<String> {
    let mut cyclic: Vec<Vec<NodeIndex>> = tarjan_scc(graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
        .collect();

    for scc in &mut cyclic {
        scc.sort();
    }
    cyclic.sort();

    cyclic
        .into_iter()
        .next()
        .unwrap_or_default()
        .into_iter()
        .map(|n| graph[n].to_string())
        .collect()
}
