//! Attack-strategy rankings: total removal orders over the vertices of a
//! graph.
//!
//! A ranking is computed once from the undamaged graph ("static" order); the
//! adaptive degree variant is the exception and re-ranks after each
//! conceptual removal. All non-random strategies are deterministic for a
//! given graph, with ties broken by ascending vertex identifier so orders
//! are reproducible.

use std::{cmp::Ordering, fmt::Debug, hash::Hash, thread};

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    betweenness::compute_betweenness,
    graph::{Graph, GraphIndex},
};

/// Graphs above this vertex count get the sampled betweenness approximation
/// instead of the exact O(n·m) computation.
pub const MAX_EXACT_BETWEENNESS: usize = 500;

/// Number of source pivots used by the sampled betweenness approximation.
const BETWEENNESS_PIVOTS: usize = 100;

/// The damping factor for the PageRank ranking.
const PAGERANK_DAMPING: f64 = 0.85;
const PAGERANK_MAX_ITERATIONS: usize = 100;
const PAGERANK_TOLERANCE: f64 = 1e-10;

/// The supported node-removal strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackStrategy {
    /// A uniformly random permutation, reproducible for a given seed.
    Random { seed: u64 },
    /// Descending degree. The adaptive variant re-ranks after every removal,
    /// reflecting cascading structural change.
    Degree { adaptive: bool },
    /// Descending PageRank score on the undamaged graph.
    PageRank,
    /// Descending betweenness centrality on the undamaged graph. Large
    /// graphs are approximated from a deterministic pivot subset.
    Betweenness,
}

/// A total removal order over the vertices of a graph.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackOrder<T> {
    /// The vertices, most attack-worthy first. A permutation of the graph's
    /// vertex set.
    pub nodes: Vec<T>,
    /// Whether a precision downgrade was applied (sampled betweenness on a
    /// large graph).
    pub approximate: bool,
}

/// Ranks the graph's vertices under the given strategy.
///
/// Pure with respect to the graph: the graph is only mutated through its
/// internal caches. An empty graph yields an empty order.
///
/// # Examples
///
/// ```
/// use redoubt::attack::{rank_nodes, AttackStrategy};
/// use redoubt::edge::Edge;
/// use redoubt::graph::Graph;
///
/// let mut graph = Graph::new();
/// graph.insert(Edge::new("hub", "a"));
/// graph.insert(Edge::new("hub", "b"));
///
/// let order = rank_nodes(&mut graph, AttackStrategy::Degree { adaptive: false });
/// assert_eq!(order.nodes[0], "hub");
/// ```
pub fn rank_nodes<T>(graph: &mut Graph<T>, strategy: AttackStrategy) -> AttackOrder<T>
where
    T: Copy + Eq + Hash + Ord + Debug,
{
    let nodes = graph.vertices();
    if nodes.is_empty() {
        return AttackOrder {
            nodes,
            approximate: false,
        };
    }

    match strategy {
        AttackStrategy::Random { seed } => {
            let mut nodes = nodes;
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            nodes.shuffle(&mut rng);

            AttackOrder {
                nodes,
                approximate: false,
            }
        }
        AttackStrategy::Degree { adaptive: false } => {
            let adjacency_list = graph.adjacency_list();
            let scores: Vec<f64> = adjacency_list.iter().map(|n| n.len() as f64).collect();

            AttackOrder {
                nodes: order_by_score_descending(&nodes, &scores),
                approximate: false,
            }
        }
        AttackStrategy::Degree { adaptive: true } => AttackOrder {
            nodes: adaptive_degree_order(&nodes, &graph.adjacency_list()),
            approximate: false,
        },
        AttackStrategy::PageRank => {
            let scores = pagerank(&graph.adjacency_list());

            AttackOrder {
                nodes: order_by_score_descending(&nodes, &scores),
                approximate: false,
            }
        }
        AttackStrategy::Betweenness => {
            let adjacency_list = graph.adjacency_list();
            let n = adjacency_list.len();

            // Above the exact threshold, accumulate dependencies from a
            // strided pivot subset only. The stride keeps the downgrade
            // deterministic without a seed.
            let sources = (n > MAX_EXACT_BETWEENNESS).then(|| {
                let stride = n.div_ceil(BETWEENNESS_PIVOTS);
                (0..n).step_by(stride).collect::<Vec<_>>()
            });
            let approximate = sources.is_some();
            if let Some(sources) = &sources {
                tracing::warn!(
                    num_nodes = n,
                    num_pivots = sources.len(),
                    "graph too large for exact betweenness, using sampled approximation"
                );
            }

            let num_threads = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
            let scores = compute_betweenness(adjacency_list, num_threads, sources);

            AttackOrder {
                nodes: order_by_score_descending(&nodes, &scores),
                approximate,
            }
        }
    }
}

/// Sorts the nodes by descending score, breaking ties by ascending
/// identifier (the node list is sorted, so index order is identifier order).
fn order_by_score_descending<T: Copy>(nodes: &[T], scores: &[f64]) -> Vec<T> {
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&i, &j| {
        scores[j]
            .partial_cmp(&scores[i])
            .unwrap_or(Ordering::Equal)
            .then(i.cmp(&j))
    });

    order.into_iter().map(|i| nodes[i]).collect()
}

/// Repeatedly removes the currently highest-degree node, decrementing the
/// degrees of its remaining neighbours after each pick.
fn adaptive_degree_order<T: Copy>(nodes: &[T], adjacency_list: &[Vec<GraphIndex>]) -> Vec<T> {
    let n = nodes.len();
    let mut degrees: Vec<usize> = adjacency_list.iter().map(|n| n.len()).collect();
    let mut removed = vec![false; n];
    let mut order = Vec::with_capacity(n);

    for _ in 0..n {
        // Highest remaining degree, ties by smallest index (= identifier).
        // Safety: each of the n iterations removes one node, so at least one
        // remains here.
        let target = (0..n)
            .filter(|&i| !removed[i])
            .max_by(|&i, &j| degrees[i].cmp(&degrees[j]).then(j.cmp(&i)))
            .unwrap();

        removed[target] = true;
        order.push(nodes[target]);

        for &neighbour in &adjacency_list[target] {
            let neighbour = neighbour as usize;
            if !removed[neighbour] {
                degrees[neighbour] -= 1;
            }
        }
    }

    order
}

/// Power-iteration PageRank over an undirected adjacency list.
///
/// The mass of dangling (degree-zero) nodes is redistributed uniformly, as
/// is the teleportation term.
fn pagerank(adjacency_list: &[Vec<GraphIndex>]) -> Vec<f64> {
    let n = adjacency_list.len();
    if n == 0 {
        return vec![];
    }

    let uniform = 1.0 / n as f64;
    let mut ranks = vec![uniform; n];

    for _ in 0..PAGERANK_MAX_ITERATIONS {
        let dangling_mass: f64 = (0..n)
            .filter(|&i| adjacency_list[i].is_empty())
            .map(|i| ranks[i])
            .sum();

        let base = (1.0 - PAGERANK_DAMPING) * uniform
            + PAGERANK_DAMPING * dangling_mass * uniform;
        let mut next = vec![base; n];

        for (i, neighbours) in adjacency_list.iter().enumerate() {
            if neighbours.is_empty() {
                continue;
            }
            let share = PAGERANK_DAMPING * ranks[i] / neighbours.len() as f64;
            for &j in neighbours {
                next[j as usize] += share;
            }
        }

        let delta: f64 = ranks
            .iter()
            .zip(next.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();
        ranks = next;

        if delta < PAGERANK_TOLERANCE {
            break;
        }
    }

    ranks
}
