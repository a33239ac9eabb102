//! Point-to-point route analysis: shortest-path metrics for a single
//! origin/destination pair, and the pair's sensitivity to losing any one of
//! the transit nodes along the way.

use std::{collections::VecDeque, fmt::Debug, hash::Hash};

use crate::{error::Error, graph::Graph};

/// Shortest-path metrics for one origin/destination pair.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteReport<T> {
    /// Whether any path between the pair exists.
    pub connected: bool,
    /// Length of the shortest path in hops; `None` when disconnected.
    pub hops: Option<u32>,
    /// Number of distinct shortest paths, saturating at `u64::MAX`.
    pub num_shortest_paths: u64,
    /// One shortest path, origin first. Among equal-length paths the
    /// reconstruction always picks the smallest predecessor at every step,
    /// so the result is deterministic.
    pub path: Option<Vec<T>>,
}

/// The effect of losing a single transit node on a route.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitImpact<T> {
    /// The transit node that was removed.
    pub removed: T,
    /// The route metrics without it.
    pub report: RouteReport<T>,
}

/// Computes shortest-path metrics between `source` and `target`.
///
/// A route from a node to itself is connected with zero hops and a single
/// (trivial) path. Returns [`Error::UnknownVertex`] when either endpoint is
/// not in the graph.
///
/// # Examples
///
/// ```
/// use redoubt::edge::Edge;
/// use redoubt::graph::Graph;
/// use redoubt::route::analyze_route;
///
/// let mut graph = Graph::new();
/// graph.insert(Edge::new("a", "b"));
/// graph.insert(Edge::new("b", "c"));
///
/// let report = analyze_route(&mut graph, "a", "c").unwrap();
/// assert_eq!(report.hops, Some(2));
/// assert_eq!(report.path, Some(vec!["a", "b", "c"]));
/// ```
pub fn analyze_route<T>(graph: &mut Graph<T>, source: T, target: T) -> Result<RouteReport<T>, Error>
where
    T: Copy + Eq + Hash + Ord + Debug,
{
    let nodes = graph.vertices();
    let adjacency = graph.adjacency_list();

    let source_index = position(&nodes, &source)?;
    let target_index = position(&nodes, &target)?;

    Ok(route_between(
        &adjacency,
        &nodes,
        source_index,
        target_index,
        None,
    ))
}

/// Measures how fragile a route is to the loss of any single transit node.
///
/// Every interior node of the baseline shortest path is removed on its own
/// (each removal is independent, not cumulative) and the route metrics are
/// recomputed without it. Impacts are returned in path order. A route with
/// no transit nodes, or no route at all, yields an empty list.
pub fn transit_fragility<T>(
    graph: &mut Graph<T>,
    source: T,
    target: T,
) -> Result<Vec<TransitImpact<T>>, Error>
where
    T: Copy + Eq + Hash + Ord + Debug,
{
    let nodes = graph.vertices();
    let adjacency = graph.adjacency_list();

    let source_index = position(&nodes, &source)?;
    let target_index = position(&nodes, &target)?;

    let baseline = route_between(&adjacency, &nodes, source_index, target_index, None);
    let Some(path) = baseline.path else {
        return Ok(Vec::new());
    };

    let impacts = path[1..path.len().saturating_sub(1)]
        .iter()
        .map(|&transit| {
            // Safety: the node came off a path through this graph.
            let masked = position(&nodes, &transit).unwrap();
            TransitImpact {
                removed: transit,
                report: route_between(&adjacency, &nodes, source_index, target_index, Some(masked)),
            }
        })
        .collect();

    Ok(impacts)
}

fn position<T>(nodes: &[T], vertex: &T) -> Result<usize, Error>
where
    T: Copy + Eq + Ord + Debug,
{
    nodes
        .binary_search(vertex)
        .map_err(|_| Error::UnknownVertex(format!("{vertex:?}")))
}

/// BFS from `source` with shortest-path counting, optionally treating one
/// masked node as absent.
///
/// Path counts accumulate like the forward pass of Brandes's betweenness
/// algorithm, except over saturating integers so dense graphs can't
/// overflow. The returned path follows the smallest predecessor backwards
/// from the target.
fn route_between<T>(
    adjacency: &[Vec<crate::graph::GraphIndex>],
    nodes: &[T],
    source: usize,
    target: usize,
    masked: Option<usize>,
) -> RouteReport<T>
where
    T: Copy + Eq + Ord + Debug,
{
    let num_nodes = adjacency.len();

    if source == target {
        return RouteReport {
            connected: true,
            hops: Some(0),
            num_shortest_paths: 1,
            path: Some(vec![nodes[source]]),
        };
    }

    let unreached = num_nodes + 1;
    let mut distance: Vec<usize> = vec![unreached; num_nodes];
    let mut sigma: Vec<u64> = vec![0; num_nodes];
    let mut best_predecessor: Vec<usize> = vec![unreached; num_nodes];
    let mut queue: VecDeque<usize> = VecDeque::new();

    distance[source] = 0;
    sigma[source] = 1;
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        for w in &adjacency[v] {
            let w = *w as usize;
            if Some(w) == masked {
                continue;
            }
            if distance[w] == unreached {
                distance[w] = distance[v] + 1;
                queue.push_back(w);
            }
            if distance[w] == distance[v] + 1 {
                sigma[w] = sigma[w].saturating_add(sigma[v]);
                best_predecessor[w] = best_predecessor[w].min(v);
            }
        }
    }

    if distance[target] == unreached {
        return RouteReport {
            connected: false,
            hops: None,
            num_shortest_paths: 0,
            path: None,
        };
    }

    // Walk the smallest predecessors back from the target.
    let mut path = vec![nodes[target]];
    let mut current = target;
    while current != source {
        current = best_predecessor[current];
        path.push(nodes[current]);
    }
    path.reverse();

    RouteReport {
        connected: true,
        hops: Some(distance[target] as u32),
        num_shortest_paths: sigma[target],
        path: Some(path),
    }
}
