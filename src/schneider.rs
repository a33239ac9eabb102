//! The Schneider edge-swap optimizer: a stochastic local search that rewires
//! existing edges to raise the graph's robustness index while preserving the
//! node set, the edge count and every node's degree.
//!
//! Swapping two edges `(a, b)` and `(c, d)` into `(a, c), (b, d)` or
//! `(a, d), (b, c)` keeps all four degrees intact, which has two useful
//! consequences: the degree-targeted removal order never changes across the
//! whole run (so it is computed once and cached), and accepted swaps steer
//! the topology towards the degree-assortative "onion" structure associated
//! with attack robustness.

use std::{collections::HashSet, fmt::Debug, hash::Hash};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    attack::AttackStrategy,
    dsu::ComponentTracker,
    edge::Edge,
    error::Error,
    graph::{Graph, GraphIndex},
};

/// Tuning knobs for the optimizer.
#[derive(Clone, Copy, Debug)]
pub struct SchneiderParams {
    /// Maximum number of swap trials before stopping.
    pub max_trials: usize,
    /// Stop after this many consecutive trials without an accepted swap.
    pub patience: usize,
    /// Minimum R-index gain for a swap to be accepted.
    pub min_delta_r: f64,
    /// Skip the expensive curve evaluation for candidates that don't improve
    /// the degree-mixing heuristic (a necessary-but-not-sufficient proxy for
    /// a robustness gain).
    pub prefilter: bool,
    /// Seed for the trial sampler; runs are reproducible per seed.
    pub seed: u64,
    /// The removal order optimised against. Only
    /// `Degree { adaptive: false }` is accepted: degree-based orders are the
    /// only ones invariant under degree-preserving swaps, so any other
    /// strategy would silently evaluate against a stale order.
    pub strategy: AttackStrategy,
}

impl Default for SchneiderParams {
    fn default() -> Self {
        Self {
            max_trials: 20_000,
            patience: 5_000,
            min_delta_r: 1e-6,
            prefilter: true,
            seed: 0,
            strategy: AttackStrategy::Degree { adaptive: false },
        }
    }
}

/// The outcome of an optimizer run.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchneiderReport {
    /// Number of swaps applied permanently.
    pub accepted_swaps: usize,
    /// Number of trials performed.
    pub trials: usize,
    /// R-index of the input graph under the cached removal order.
    pub initial_r: f64,
    /// R-index of the returned graph; non-decreasing across the run.
    pub r_best: f64,
}

/// A candidate rewiring evaluated as an overlay on the working adjacency
/// list, so trial evaluation never mutates (and never has to revert) the
/// canonical state.
struct SwapOverlay {
    removed: [(GraphIndex, GraphIndex); 2],
    added: [(GraphIndex, GraphIndex); 2],
}

impl SwapOverlay {
    fn removes(&self, u: GraphIndex, v: GraphIndex) -> bool {
        let pair = canonical(u, v);
        self.removed[0] == pair || self.removed[1] == pair
    }

    /// Neighbours of `u` introduced by the overlay.
    fn added_neighbours(&self, u: GraphIndex) -> impl Iterator<Item = GraphIndex> + '_ {
        self.added.iter().filter_map(move |&(a, b)| {
            if a == u {
                Some(b)
            } else if b == u {
                Some(a)
            } else {
                None
            }
        })
    }
}

/// Reshuffles existing edges to maximise the R-index under a degree-targeted
/// attack, preserving the node set, edge count and degree sequence.
///
/// Stops after `max_trials` trials or once `patience` consecutive trials
/// fail to improve on the best R-index by at least `min_delta_r`. A graph
/// with fewer than two edges cannot be swapped and is returned unchanged
/// with zero trials performed.
///
/// Returns the optimised graph together with a [`SchneiderReport`].
pub fn optimize_schneider<T>(
    graph: &mut Graph<T>,
    params: &SchneiderParams,
) -> Result<(Graph<T>, SchneiderReport), Error>
where
    T: Copy + Eq + Hash + Ord + Debug,
{
    if !matches!(params.strategy, AttackStrategy::Degree { adaptive: false }) {
        return Err(Error::UnsupportedStrategy(
            "the optimizer's cached removal order requires a static degree strategy",
        ));
    }

    let nodes = graph.vertices();
    let mut adjacency = graph.adjacency_list();

    // Degrees are invariant under swapping, so both the degree table and the
    // removal order derived from it are computed once and reused for every
    // trial.
    let degrees: Vec<i64> = adjacency.iter().map(|n| n.len() as i64).collect();
    let order = degree_order(&degrees);
    let fractions: Vec<f64> = (0..=nodes.len())
        .map(|k| k as f64 / nodes.len().max(1) as f64)
        .collect();

    let initial_r = evaluate_r(&adjacency, &order, &fractions, None);

    let mut edge_list: Vec<(GraphIndex, GraphIndex)> = adjacency
        .iter()
        .enumerate()
        .flat_map(|(i, neighbours)| {
            neighbours
                .iter()
                .filter(move |&&j| (j as usize) > i)
                .map(move |&j| (i as GraphIndex, j))
        })
        .collect();
    edge_list.sort_unstable();
    let mut edge_set: HashSet<(GraphIndex, GraphIndex)> = edge_list.iter().copied().collect();

    if edge_list.len() < 2 {
        tracing::warn!(
            edges = edge_list.len(),
            "graph has fewer than two edges, no swap is possible"
        );
        return Ok((
            graph.clone(),
            SchneiderReport {
                accepted_swaps: 0,
                trials: 0,
                initial_r,
                r_best: initial_r,
            },
        ));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let mut r_best = initial_r;
    let mut accepted_swaps = 0;
    let mut trials = 0;
    let mut stale_trials = 0;

    while trials < params.max_trials && stale_trials < params.patience {
        trials += 1;

        // Two distinct edges, sampled uniformly without replacement.
        let first = rng.gen_range(0..edge_list.len());
        let second = {
            let mut second = rng.gen_range(0..edge_list.len());
            while second == first {
                second = rng.gen_range(0..edge_list.len());
            }
            second
        };
        let (a, b) = edge_list[first];
        let (c, d) = edge_list[second];

        // The two rewirings that preserve all four degrees.
        let rewirings = [[(a, c), (b, d)], [(a, d), (b, c)]];
        let mut best_candidate: Option<(f64, [(GraphIndex, GraphIndex); 2])> = None;

        for rewiring in rewirings {
            let [(x1, y1), (x2, y2)] = rewiring;

            // Reject self-loops and edges already present.
            if x1 == y1 || x2 == y2 {
                continue;
            }
            let added = [canonical(x1, y1), canonical(x2, y2)];
            if edge_set.contains(&added[0]) || edge_set.contains(&added[1]) {
                continue;
            }

            // Cheap degree-mixing prefilter: a candidate that doesn't reduce
            // the degree-difference sum cannot move the topology towards
            // assortativity, so skip the curve evaluation entirely.
            if params.prefilter {
                let mixing_after = (degrees[x1 as usize] - degrees[y1 as usize]).abs()
                    + (degrees[x2 as usize] - degrees[y2 as usize]).abs();
                let mixing_before = (degrees[a as usize] - degrees[b as usize]).abs()
                    + (degrees[c as usize] - degrees[d as usize]).abs();
                if mixing_after - mixing_before >= 0 {
                    continue;
                }
            }

            let overlay = SwapOverlay {
                removed: [canonical(a, b), canonical(c, d)],
                added,
            };
            let r_candidate = evaluate_r(&adjacency, &order, &fractions, Some(&overlay));

            if best_candidate.map_or(true, |(r, _)| r_candidate > r) {
                best_candidate = Some((r_candidate, added));
            }
        }

        match best_candidate {
            Some((r_candidate, added)) if r_candidate > r_best + params.min_delta_r => {
                apply_swap(
                    &mut adjacency,
                    &mut edge_list,
                    &mut edge_set,
                    [first, second],
                    [canonical(a, b), canonical(c, d)],
                    added,
                );
                r_best = r_candidate;
                accepted_swaps += 1;
                stale_trials = 0;

                tracing::debug!(trials, accepted_swaps, r_best, "accepted edge swap");
            }
            _ => stale_trials += 1,
        }
    }

    tracing::info!(
        trials,
        accepted_swaps,
        initial_r,
        r_best,
        "edge-swap optimisation finished"
    );

    // Materialise the optimised topology as a fresh graph value.
    let mut optimized = Graph::new();
    for &node in &nodes {
        optimized.insert_vertex(node);
    }
    for &(u, v) in &edge_list {
        optimized.insert(Edge::new(nodes[u as usize], nodes[v as usize]));
    }

    Ok((
        optimized,
        SchneiderReport {
            accepted_swaps,
            trials,
            initial_r,
            r_best,
        },
    ))
}

fn canonical(u: GraphIndex, v: GraphIndex) -> (GraphIndex, GraphIndex) {
    if u <= v {
        (u, v)
    } else {
        (v, u)
    }
}

/// Descending degree, ties by ascending index; identical to the public
/// degree ranking because the node list is sorted by identifier.
fn degree_order(degrees: &[i64]) -> Vec<GraphIndex> {
    let mut order: Vec<GraphIndex> = (0..degrees.len() as GraphIndex).collect();
    order.sort_by(|&i, &j| {
        degrees[j as usize]
            .cmp(&degrees[i as usize])
            .then(i.cmp(&j))
    });

    order
}

/// R-index of the adjacency list (with an optional swap overlay applied)
/// under the given removal order: the reverse-insertion LCC curve integrated
/// with the trapezoidal rule.
fn evaluate_r(
    adjacency: &[Vec<GraphIndex>],
    order: &[GraphIndex],
    fractions: &[f64],
    overlay: Option<&SwapOverlay>,
) -> f64 {
    let n = order.len();
    if n == 0 {
        return 0.0;
    }

    let mut tracker = ComponentTracker::new(n);
    let mut active = vec![false; n];
    let mut max_component_size = 0;
    let mut lcc_norm = vec![0.0; n + 1];

    for t in 1..=n {
        let u = order[n - t];
        active[u as usize] = true;
        max_component_size = max_component_size.max(1);

        for &v in &adjacency[u as usize] {
            if overlay.is_some_and(|o| o.removes(u, v)) {
                continue;
            }
            if active[v as usize] {
                max_component_size = max_component_size.max(tracker.union(u, v));
            }
        }
        if let Some(overlay) = overlay {
            for v in overlay.added_neighbours(u) {
                if active[v as usize] {
                    max_component_size = max_component_size.max(tracker.union(u, v));
                }
            }
        }

        lcc_norm[n - t] = max_component_size as f64 / n as f64;
    }

    fractions
        .windows(2)
        .zip(lcc_norm.windows(2))
        .map(|(f, y)| (f[1] - f[0]) * (y[0] + y[1]) / 2.0)
        .sum()
}

/// Permanently applies an accepted swap to the working state.
fn apply_swap(
    adjacency: &mut [Vec<GraphIndex>],
    edge_list: &mut [(GraphIndex, GraphIndex)],
    edge_set: &mut HashSet<(GraphIndex, GraphIndex)>,
    positions: [usize; 2],
    removed: [(GraphIndex, GraphIndex); 2],
    added: [(GraphIndex, GraphIndex); 2],
) {
    for (u, v) in removed {
        edge_set.remove(&(u, v));
        adjacency[u as usize].retain(|&w| w != v);
        adjacency[v as usize].retain(|&w| w != u);
    }
    for (position, (u, v)) in positions.into_iter().zip(added) {
        edge_set.insert((u, v));
        edge_list[position] = (u, v);
        adjacency[u as usize].push(v);
        adjacency[v as usize].push(u);
    }
}
