//! Reinforcement planning based on total effective resistance.
//!
//! Treating the graph as an electrical network with unit resistors on every
//! edge, the effective resistance between two nodes measures how fragile the
//! connection between them is: well-connected pairs with many disjoint paths
//! have low resistance, pairs joined through long or narrow corridors have
//! high resistance. Adding an edge between a high-resistance pair therefore
//! buys the largest redundancy gain per new link.
//!
//! Pairwise resistances are read off the Moore-Penrose pseudoinverse of the
//! graph Laplacian: `R(u, v) = L+[u, u] + L+[v, v] - 2 * L+[u, v]`. The
//! pseudoinverse is only meaningful per connected component, so planning is
//! restricted to the largest connected component.

use std::{fmt::Debug, hash::Hash};

use itertools::Itertools;
use nalgebra::DMatrix;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    dsu::ComponentTracker,
    edge::Edge,
    graph::{Graph, GraphIndex},
};

/// Tuning knobs for reinforcement planning.
#[derive(Clone, Copy, Debug)]
pub struct TerParams {
    /// Number of edges to propose.
    pub k: usize,
    /// Upper bound on the number of candidate pairs that are scored. When
    /// the largest component has more non-adjacent pairs than this, a
    /// seeded sample of them is scored instead.
    pub max_candidates: usize,
    /// Optional cap on the pairwise distance of proposed edges, in whatever
    /// unit the caller's distance function reports. Pairs whose distance is
    /// unknown remain eligible.
    pub max_distance: Option<f64>,
    /// Seed for candidate sampling; runs are reproducible per seed.
    pub seed: u64,
}

impl Default for TerParams {
    fn default() -> Self {
        Self {
            k: 200,
            max_candidates: 20_000,
            max_distance: None,
            seed: 0,
        }
    }
}

/// A proposed reinforcement edge, scored by the effective resistance of its
/// endpoint pair in the input graph.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReinforcedEdge<T> {
    pub source: T,
    pub target: T,
    pub resistance: f64,
}

/// Proposes up to `k` new edges between high-resistance node pairs in the
/// largest connected component and returns the reinforced graph alongside
/// the proposals, ordered by descending resistance.
///
/// Scoring is static: every pair is scored against the input topology, and
/// the top `k` are taken in one pass. Only non-adjacent pairs inside the
/// largest component are considered. When a `distance` function is supplied
/// together with [`TerParams::max_distance`], pairs known to be further
/// apart than the cap are excluded; pairs with unknown distance are kept.
///
/// The input graph is left untouched. If no eligible candidate pair exists
/// (or the pseudoinverse cannot be computed), the returned graph is an
/// unchanged copy and the proposal list is empty.
#[allow(clippy::type_complexity)]
pub fn reinforce_ter<T>(
    graph: &mut Graph<T>,
    params: &TerParams,
    distance: Option<&dyn Fn(&T, &T) -> Option<f64>>,
) -> (Graph<T>, Vec<ReinforcedEdge<T>>)
where
    T: Copy + Eq + Hash + Ord + Debug,
{
    let nodes = graph.vertices();
    let adjacency = graph.adjacency_list();

    let component = largest_component(&adjacency);
    if component.len() < 3 {
        tracing::warn!(
            component_size = component.len(),
            "largest component is too small for reinforcement"
        );
        return (graph.clone(), Vec::new());
    }

    // Local indexing for the component's Laplacian: `component` is sorted, so
    // position lookup is a binary search.
    let local = |v: GraphIndex| -> usize {
        // Safety: callers only pass members of the component.
        component.binary_search(&v).unwrap()
    };

    let laplacian = component_laplacian(&adjacency, &component);
    let pseudoinverse = match laplacian.pseudo_inverse(1e-10) {
        Ok(matrix) => matrix,
        Err(reason) => {
            tracing::warn!(reason, "laplacian pseudoinverse failed");
            return (graph.clone(), Vec::new());
        }
    };

    // All non-adjacent pairs inside the component, distance-capped when the
    // caller provides geography.
    let mut candidates: Vec<(GraphIndex, GraphIndex)> = Vec::new();
    for (&u, &v) in component.iter().tuple_combinations() {
        if adjacency[u as usize].binary_search(&v).is_ok() {
            continue;
        }
        if let (Some(cap), Some(distance)) = (params.max_distance, distance) {
            let known_too_far =
                distance(&nodes[u as usize], &nodes[v as usize]).is_some_and(|d| d > cap);
            if known_too_far {
                continue;
            }
        }
        candidates.push((u, v));
    }

    if candidates.is_empty() {
        tracing::warn!("no eligible candidate pair for reinforcement");
        return (graph.clone(), Vec::new());
    }

    if candidates.len() > params.max_candidates {
        tracing::debug!(
            total = candidates.len(),
            sampled = params.max_candidates,
            "sampling candidate pairs"
        );
        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        let (sampled, _) = candidates.partial_shuffle(&mut rng, params.max_candidates);
        let mut sampled = sampled.to_vec();
        sampled.sort_unstable();
        candidates = sampled;
    }

    let mut proposals: Vec<ReinforcedEdge<T>> = candidates
        .into_iter()
        .map(|(u, v)| {
            let (i, j) = (local(u), local(v));
            let resistance =
                pseudoinverse[(i, i)] + pseudoinverse[(j, j)] - 2.0 * pseudoinverse[(i, j)];
            ReinforcedEdge {
                source: nodes[u as usize],
                target: nodes[v as usize],
                resistance,
            }
        })
        .collect();

    // Descending resistance, ties by ascending endpoint pair.
    proposals.sort_by(|a, b| {
        b.resistance
            .total_cmp(&a.resistance)
            .then_with(|| (a.source, a.target).cmp(&(b.source, b.target)))
    });
    proposals.truncate(params.k);

    let mut reinforced = graph.clone();
    for proposal in &proposals {
        reinforced.insert(Edge::new(proposal.source, proposal.target));
    }

    tracing::info!(
        proposed = proposals.len(),
        component_size = component.len(),
        "reinforcement planning finished"
    );

    (reinforced, proposals)
}

/// Members of the largest connected component, sorted ascending. Ties are
/// broken towards the component containing the smallest index.
fn largest_component(adjacency: &[Vec<GraphIndex>]) -> Vec<GraphIndex> {
    let n = adjacency.len();
    if n == 0 {
        return Vec::new();
    }

    let mut tracker = ComponentTracker::new(n);
    for (u, neighbours) in adjacency.iter().enumerate() {
        for &v in neighbours {
            tracker.union(u as GraphIndex, v);
        }
    }

    // The scan runs over ascending indices, so the first vertex seen in each
    // component is its smallest index; the strict comparison settles ties
    // towards it.
    let mut best_root = tracker.find(0);
    let mut best_size = tracker.union(0, 0);
    for v in 1..n as GraphIndex {
        let size = tracker.union(v, v);
        if size > best_size {
            best_size = size;
            best_root = tracker.find(v);
        }
    }
    (0..n as GraphIndex)
        .filter(|&v| tracker.find(v) == best_root)
        .collect()
}

/// The Laplacian of the subgraph induced by `component` (sorted indices),
/// using local positions.
fn component_laplacian(adjacency: &[Vec<GraphIndex>], component: &[GraphIndex]) -> DMatrix<f64> {
    let m = component.len();
    let mut matrix = DMatrix::<f64>::zeros(m, m);

    for (i, &u) in component.iter().enumerate() {
        // Every neighbour of a component member is itself a member.
        matrix[(i, i)] = adjacency[u as usize].len() as f64;
        for &v in &adjacency[u as usize] {
            // Safety: `v` shares a component with `u`, so it is present.
            let j = component.binary_search(&v).unwrap();
            matrix[(i, j)] = -1.0;
        }
    }

    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph() -> Graph<&'static str> {
        let mut graph = Graph::new();
        graph.insert(Edge::new("a", "b"));
        graph.insert(Edge::new("b", "c"));
        graph.insert(Edge::new("c", "d"));
        graph
    }

    #[test]
    fn path_endpoints_have_the_highest_resistance() {
        // On a path every edge is a unit resistor in series, so the
        // effective resistance between two nodes is their hop distance.
        let mut graph = path_graph();
        let params = TerParams {
            k: 1,
            ..Default::default()
        };

        let (reinforced, proposals) = reinforce_ter(&mut graph, &params, None);

        assert_eq!(proposals.len(), 1);
        assert_eq!((proposals[0].source, proposals[0].target), ("a", "d"));
        assert!((proposals[0].resistance - 3.0).abs() < 1e-9);
        assert!(reinforced.contains(&Edge::new("a", "d")));
        assert_eq!(reinforced.edge_count(), graph.edge_count() + 1);
    }

    #[test]
    fn proposals_are_sorted_and_ties_break_on_the_pair() {
        let mut graph = path_graph();
        let params = TerParams {
            k: 10,
            ..Default::default()
        };

        let (_, proposals) = reinforce_ter(&mut graph, &params, None);

        // (a, d) at resistance 3, then the tied pair (a, c) and (b, d) at 2.
        let pairs: Vec<_> = proposals.iter().map(|p| (p.source, p.target)).collect();
        assert_eq!(pairs, vec![("a", "d"), ("a", "c"), ("b", "d")]);
        assert!((proposals[1].resistance - 2.0).abs() < 1e-9);
        assert!((proposals[2].resistance - 2.0).abs() < 1e-9);
    }

    #[test]
    fn never_proposes_an_existing_edge() {
        let mut graph = path_graph();
        let params = TerParams {
            k: 10,
            ..Default::default()
        };

        let (_, proposals) = reinforce_ter(&mut graph, &params, None);

        for proposal in proposals {
            assert!(!graph.contains(&Edge::new(proposal.source, proposal.target)));
        }
    }

    #[test]
    fn restricted_to_the_largest_component() {
        // A 4-path plus a separate pair: the pair's nodes never appear in a
        // proposal.
        let mut graph = path_graph();
        graph.insert(Edge::new("x", "y"));
        let params = TerParams {
            k: 10,
            ..Default::default()
        };

        let (_, proposals) = reinforce_ter(&mut graph, &params, None);

        assert_eq!(proposals.len(), 3);
        for proposal in proposals {
            assert!(proposal.source < "x" && proposal.target < "x");
        }
    }

    #[test]
    fn distance_cap_excludes_known_far_pairs_only() {
        let mut graph = path_graph();
        let params = TerParams {
            k: 10,
            max_distance: Some(100.0),
            ..Default::default()
        };
        // (a, d) is too far; (a, c) has no known distance and stays
        // eligible; (b, d) is in range.
        let distance = |u: &&str, v: &&str| -> Option<f64> {
            match (*u, *v) {
                ("a", "d") => Some(250.0),
                ("a", "c") => None,
                _ => Some(50.0),
            }
        };

        let (_, proposals) = reinforce_ter(&mut graph, &params, Some(&distance));

        let pairs: Vec<_> = proposals.iter().map(|p| (p.source, p.target)).collect();
        assert_eq!(pairs, vec![("a", "c"), ("b", "d")]);
    }

    #[test]
    fn input_graph_is_untouched() {
        let mut graph = path_graph();
        let edges_before = graph.edges().clone();

        let (_, _) = reinforce_ter(&mut graph, &TerParams::default(), None);

        assert_eq!(graph.edges(), &edges_before);
    }

    #[test]
    fn sampling_is_reproducible() {
        let mut graph = Graph::new();
        // A cycle of 10 nodes has 35 non-adjacent pairs.
        for i in 0..10u32 {
            graph.insert(Edge::new(i, (i + 1) % 10));
        }
        let params = TerParams {
            k: 5,
            max_candidates: 10,
            seed: 42,
            ..Default::default()
        };

        let (_, first) = reinforce_ter(&mut graph, &params, None);
        let (_, second) = reinforce_ter(&mut graph, &params, None);

        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
    }

    #[test]
    fn too_small_a_component_is_a_noop() {
        let mut graph = Graph::new();
        graph.insert(Edge::new("a", "b"));

        let (unchanged, proposals) = reinforce_ter(&mut graph, &TerParams::default(), None);

        assert!(proposals.is_empty());
        assert_eq!(unchanged.edges(), graph.edges());
    }
}
