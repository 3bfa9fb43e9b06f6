use std::collections::HashMap;

use petgraph::Directed;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::{Graph, NodeIndex};

use crate::deps::{DependencyKind, Registry};

/// A set of packages that depend on each other, directly or transitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCycle {
    /// Packages forming the cycle, sorted by name.
    /// The first package is repeated at the end to close the visual cycle.
    pub packages: Vec<String>,
}

/// Detect cycles between packages over the dependencies actually observed.
///
/// Builds a package graph from used edges (declared-and-used as well as
/// forbidden and inferred ones; invalid targets and self-dependencies are
/// skipped) and reports every strongly connected component with more than one
/// package. Cycles are sorted by their first package.
pub fn find_package_cycles<S>(registry: &Registry<S>) -> Vec<PackageCycle> {
    let mut graph: Graph<&str, (), Directed> = Graph::new();
    let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

    for edge in registry.edges() {
        let participates = match edge.kind() {
            DependencyKind::Primary
            | DependencyKind::Secondary
            | DependencyKind::Forbidden
            | DependencyKind::Inferred => edge.used,
            DependencyKind::Invalid | DependencyKind::Cycle => false,
        };
        if !participates || edge.source == edge.target {
            continue;
        }
        let src = node_for(&mut graph, &mut nodes, &edge.source);
        let dst = node_for(&mut graph, &mut nodes, &edge.target);
        graph.update_edge(src, dst, ());
    }

    let mut cycles: Vec<PackageCycle> = kosaraju_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            let mut packages: Vec<String> =
                scc.iter().map(|&idx| graph[idx].to_owned()).collect();
            packages.sort();
            // Close the visual cycle: a -> b -> c -> a.
            let first = packages[0].clone();
            packages.push(first);
            PackageCycle { packages }
        })
        .collect();

    cycles.sort_by(|a, b| a.packages[0].cmp(&b.packages[0]));
    cycles
}

fn node_for<'r>(
    graph: &mut Graph<&'r str, (), Directed>,
    nodes: &mut HashMap<&'r str, NodeIndex>,
    name: &'r str,
) -> NodeIndex {
    *nodes.entry(name).or_insert_with(|| graph.add_node(name))
}
