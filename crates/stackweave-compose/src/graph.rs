//! Dependency graph management using `petgraph`.
//!
//! Builds a directed graph from declared dependencies and resolves a
//! deterministic emission order. The same graph is used between stacks
//! and between the descriptors of one stack.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use stackweave_common::error::{Result, StackweaveError};

/// A dependency graph of named nodes.
///
/// Node indices follow declaration order, which is also the tie-break
/// order when several nodes are ready at once.
#[derive(Debug)]
pub struct DependencyGraph {
    /// Scope reported in cycle errors (`app` or a stack name).
    scope: String,
    /// Internal petgraph representation.
    graph: petgraph::Graph<String, ()>,
    /// Name to node lookup.
    nodes: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph for `scope`.
    #[must_use]
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            graph: petgraph::Graph::new(),
            nodes: HashMap::new(),
        }
    }

    /// Adds a node, or returns the existing node of the same name.
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeIndex {
        let name = name.into();
        if let Some(&idx) = self.nodes.get(&name) {
            return idx;
        }
        let idx = self.graph.add_node(name.clone());
        let _ = self.nodes.insert(name, idx);
        idx
    }

    /// Looks up a node by name.
    pub fn node(&self, name: &str) -> Option<NodeIndex> {
        self.nodes.get(name).copied()
    }

    /// Adds a dependency edge: `dependent` depends on `dependency`.
    ///
    /// The graph edge points from `dependency` to `dependent`
    /// so that dependencies are emitted first.
    pub fn add_dependency(&mut self, dependent: NodeIndex, dependency: NodeIndex) {
        let _ = self.graph.update_edge(dependency, dependent, ());
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns the emission order.
    ///
    /// Kahn's algorithm; among ready nodes the earliest declared is
    /// emitted first, so the order is stable across runs.
    ///
    /// # Errors
    ///
    /// Returns [`StackweaveError::CyclicDependency`] carrying the minimal
    /// cycle if any node cannot be emitted. No partial order is returned.
    pub fn resolve_order(&self) -> Result<Vec<String>> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .count()
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(i)) = ready.pop() {
            let idx = NodeIndex::new(i);
            order.push(self.graph[idx].clone());
            for next in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                let deg = &mut in_degree[next.index()];
                *deg -= 1;
                if *deg == 0 {
                    ready.push(Reverse(next.index()));
                }
            }
        }

        if order.len() < self.graph.node_count() {
            let cycle = self.minimal_cycle();
            tracing::warn!(scope = %self.scope, ?cycle, "dependency cycle");
            return Err(StackweaveError::CyclicDependency {
                scope: self.scope.clone(),
                cycle,
            });
        }

        tracing::debug!(scope = %self.scope, ?order, "resolved emission order");
        Ok(order)
    }

    /// Finds the shortest cycle, preferring the earliest declared start node.
    ///
    /// The cycle is listed in "depends on" direction and closed by
    /// repeating its first node: `[A, B, A]` means A depends on B and B
    /// depends on A.
    fn minimal_cycle(&self) -> Vec<String> {
        let mut candidates: Vec<NodeIndex> = petgraph::algo::tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .flatten()
            .collect();
        candidates.sort_unstable();

        let mut best: Option<Vec<NodeIndex>> = None;
        for start in candidates {
            if let Some(path) = self.shortest_loop(start) {
                if best.as_ref().is_none_or(|b| path.len() < b.len()) {
                    best = Some(path);
                }
            }
        }

        best.unwrap_or_default()
            .into_iter()
            .map(|idx| self.graph[idx].clone())
            .collect()
    }

    /// Breadth-first search from `start` along dependencies back to `start`.
    fn shortest_loop(&self, start: NodeIndex) -> Option<Vec<NodeIndex>> {
        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            let mut deps: Vec<NodeIndex> = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .collect();
            deps.sort_unstable();
            for dep in deps {
                if dep == start {
                    let mut path = vec![start];
                    let mut cursor = node;
                    let mut tail = Vec::new();
                    while cursor != start {
                        tail.push(cursor);
                        cursor = parent[&cursor];
                    }
                    path.extend(tail.into_iter().rev());
                    path.push(start);
                    return Some(path);
                }
                if dep != start && !parent.contains_key(&dep) {
                    let _ = parent.insert(dep, node);
                    queue.push_back(dep);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn graph_of(nodes: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new("test");
        for n in nodes {
            let _ = graph.add_node(*n);
        }
        for (dependent, dependency) in edges {
            let a = graph.add_node(*dependent);
            let b = graph.add_node(*dependency);
            graph.add_dependency(a, b);
        }
        graph
    }

    fn cycle_of(graph: &DependencyGraph) -> Vec<String> {
        match graph.resolve_order() {
            Err(StackweaveError::CyclicDependency { cycle, .. }) => cycle,
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn empty_graph_resolves_to_empty() {
        let graph = DependencyGraph::new("test");
        let order = graph.resolve_order().expect("should resolve");
        assert!(order.is_empty());
    }

    #[test]
    fn single_node_resolves() {
        let graph = graph_of(&["api"], &[]);
        let order = graph.resolve_order().expect("should resolve");
        assert_eq!(order, vec!["api"]);
    }

    #[test]
    fn linear_dependency_chain() {
        let graph = graph_of(&["api", "db"], &[("api", "db")]);
        let order = graph.resolve_order().expect("should resolve");
        assert_eq!(order, vec!["db", "api"]);
    }

    #[test]
    fn nodes_are_deduplicated_by_name() {
        let mut graph = DependencyGraph::new("test");
        let a = graph.add_node("a");
        let again = graph.add_node("a");
        assert_eq!(a, again);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn diamond_dependency() {
        let graph = graph_of(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        );
        let order = graph.resolve_order().expect("should resolve");
        assert_eq!(order, vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn ties_break_by_declaration_order() {
        let graph = graph_of(
            &[
                "S3BucketStack",
                "FastApiAppStack",
                "CICDFastApiStack",
                "NextJsAppStack",
                "CICDNextJsStack",
                "Route53Stack",
            ],
            &[
                ("FastApiAppStack", "S3BucketStack"),
                ("NextJsAppStack", "FastApiAppStack"),
                ("Route53Stack", "NextJsAppStack"),
                ("CICDFastApiStack", "FastApiAppStack"),
                ("CICDNextJsStack", "NextJsAppStack"),
            ],
        );
        let order = graph.resolve_order().expect("should resolve");
        assert_eq!(
            order,
            vec![
                "S3BucketStack",
                "FastApiAppStack",
                "CICDFastApiStack",
                "NextJsAppStack",
                "CICDNextJsStack",
                "Route53Stack",
            ]
        );
    }

    #[test]
    fn two_node_cycle_is_reported_closed() {
        let graph = graph_of(&["A", "B"], &[("A", "B"), ("B", "A")]);
        assert_eq!(cycle_of(&graph), vec!["A", "B", "A"]);
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let graph = graph_of(&["A"], &[("A", "A")]);
        assert_eq!(cycle_of(&graph), vec!["A", "A"]);
    }

    #[test]
    fn minimal_cycle_is_preferred() {
        // a -> b -> c -> a plus the shorter c -> d -> c
        let graph = graph_of(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "a"), ("c", "d"), ("d", "c")],
        );
        assert_eq!(cycle_of(&graph), vec!["c", "d", "c"]);
    }

    #[test]
    fn three_node_cycle_is_listed_in_dependency_direction() {
        let graph = graph_of(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);
        assert_eq!(cycle_of(&graph), vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn cycle_downstream_nodes_are_not_reported() {
        let graph = graph_of(
            &["root", "x", "y", "leaf"],
            &[("x", "y"), ("y", "x"), ("leaf", "x"), ("x", "root")],
        );
        assert_eq!(cycle_of(&graph), vec!["x", "y", "x"]);
    }

    /// Random DAG: edges only from a later node to an earlier one.
    fn dag_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
        (1usize..12).prop_flat_map(|n| {
            let edges = prop::collection::vec((0..n, 0..n), 0..n * 2).prop_map(|pairs| {
                pairs
                    .into_iter()
                    .filter(|(a, b)| a != b)
                    .map(|(a, b)| if a > b { (a, b) } else { (b, a) })
                    .collect::<Vec<_>>()
            });
            (Just(n), edges)
        })
    }

    fn build(n: usize, edges: &[(usize, usize)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new("prop");
        let idx: Vec<NodeIndex> = (0..n).map(|i| graph.add_node(format!("n{i}"))).collect();
        for &(dependent, dependency) in edges {
            graph.add_dependency(idx[dependent], idx[dependency]);
        }
        graph
    }

    proptest! {
        #[test]
        fn prop_acyclic_orders_are_topological((n, edges) in dag_strategy()) {
            let graph = build(n, &edges);
            let order = graph.resolve_order().expect("acyclic");
            prop_assert_eq!(order.len(), n);
            let pos = |i: usize| order.iter().position(|name| *name == format!("n{i}"));
            for (dependent, dependency) in &edges {
                prop_assert!(pos(*dependency) < pos(*dependent));
            }
        }

        #[test]
        fn prop_resolution_is_deterministic((n, edges) in dag_strategy()) {
            let first = build(n, &edges).resolve_order().expect("acyclic");
            let second = build(n, &edges).resolve_order().expect("acyclic");
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_back_edge_always_fails((n, edges) in dag_strategy()) {
            prop_assume!(n >= 2);
            let mut graph = build(n, &edges);
            // n0 depends on the last node and the last node on n0
            let first = graph.add_node("n0");
            let last = graph.add_node(format!("n{}", n - 1));
            graph.add_dependency(first, last);
            graph.add_dependency(last, first);
            let result = graph.resolve_order();
            let is_cycle = matches!(
                result,
                Err(StackweaveError::CyclicDependency { ref cycle, .. }) if cycle.len() >= 3
            );
            prop_assert!(is_cycle, "expected a cycle, got {:?}", result);
        }
    }
}
