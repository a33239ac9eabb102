//! The robustness curve engine: largest-connected-component size and
//! diameter as a function of the number of nodes removed, plus the scalar
//! R-index integrating that curve.
//!
//! The LCC curve is *not* produced by deleting nodes and re-solving
//! connectivity at every step (O(n²)). The removal order is processed in
//! reverse: starting from an empty graph, nodes are re-inserted back-to-front
//! and merged into components with a union-find tracker, so the entire curve
//! costs O(n + m) amortised.

use std::{collections::VecDeque, fmt::Debug, hash::Hash};

use crate::{
    attack::AttackOrder,
    dsu::ComponentTracker,
    error::Error,
    graph::{Graph, GraphIndex},
};

/// Graphs above this vertex count get the subsampled diameter computation
/// instead of an exact diameter at every removal step.
pub const DIAMETER_EXACT_MAX: usize = 128;

/// Number of evenly spaced removal steps at which the diameter is computed
/// when subsampling.
const DIAMETER_SAMPLES: usize = 11;

/// The degradation profile of a graph under a fixed removal order.
///
/// All sequences are aligned and indexed by `k`, the number of nodes removed
/// so far, for `k = 0..=n`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RobustnessCurve {
    /// The fraction of nodes removed, `k / n`.
    pub fractions: Vec<f64>,
    /// Size of the largest connected component after `k` removals.
    pub lcc_size: Vec<u32>,
    /// `lcc_size` normalised by the original vertex count.
    pub lcc_norm: Vec<f64>,
    /// Diameter of the largest component after `k` removals, `None` when the
    /// component has fewer than two nodes or when the step was skipped by
    /// the subsampled computation.
    pub diameter: Vec<Option<u32>>,
    /// Whether the diameter was computed at every step. `false` flags the
    /// precision downgrade applied to large graphs.
    pub diameter_exact: bool,
}

impl RobustnessCurve {
    /// The robustness index of this curve: the trapezoidal integral of the
    /// normalised LCC size over the removed fraction. Higher is more robust.
    pub fn r_index(&self) -> Result<f64, Error> {
        robustness_index(&self.fractions, &self.lcc_norm)
    }
}

/// Computes the robustness curve of the graph under the given removal order.
///
/// The order must be a permutation of the graph's vertex set. An empty graph
/// yields the trivial zero curve rather than an error.
///
/// # Examples
///
/// ```
/// use redoubt::attack::{rank_nodes, AttackStrategy};
/// use redoubt::curve::compute_curve;
/// use redoubt::edge::Edge;
/// use redoubt::graph::Graph;
///
/// let mut graph = Graph::new();
/// graph.insert(Edge::new("a", "b"));
/// graph.insert(Edge::new("b", "c"));
///
/// let order = rank_nodes(&mut graph, AttackStrategy::Degree { adaptive: false });
/// let curve = compute_curve(&mut graph, &order).unwrap();
///
/// // Removing the middle node first splits the path immediately.
/// assert_eq!(curve.lcc_size, vec![3, 1, 1, 0]);
/// ```
pub fn compute_curve<T>(graph: &mut Graph<T>, order: &AttackOrder<T>) -> Result<RobustnessCurve, Error>
where
    T: Copy + Eq + Hash + Ord + Debug,
{
    let nodes = graph.vertices();
    let n = nodes.len();

    if n == 0 {
        if !order.nodes.is_empty() {
            return Err(Error::InvalidOrder);
        }
        // Trivial two-point zero curve so the R-index stays defined.
        return Ok(RobustnessCurve {
            fractions: vec![0.0, 1.0],
            lcc_size: vec![0, 0],
            lcc_norm: vec![0.0, 0.0],
            diameter: vec![None, None],
            diameter_exact: true,
        });
    }

    let order_indices = order_as_indices(&nodes, &order.nodes)?;
    let adjacency_list = graph.adjacency_list();

    let lcc_size = lcc_curve(&adjacency_list, &order_indices);

    // Exact diameters for small graphs; evenly spaced samples above the
    // threshold, since each step costs a full all-sources BFS of the LCC.
    let diameter_exact = n <= DIAMETER_EXACT_MAX;
    let steps: Vec<usize> = if diameter_exact {
        (0..=n).collect()
    } else {
        tracing::warn!(
            num_nodes = n,
            num_samples = DIAMETER_SAMPLES,
            "graph too large for per-step diameters, subsampling the curve"
        );
        (0..DIAMETER_SAMPLES)
            .map(|i| i * n / (DIAMETER_SAMPLES - 1))
            .collect()
    };

    let mut diameter = vec![None; n + 1];
    for &k in &steps {
        diameter[k] = diameter_after_removals(&adjacency_list, &order_indices, k);
    }

    let fractions: Vec<f64> = (0..=n).map(|k| k as f64 / n as f64).collect();
    let lcc_norm: Vec<f64> = lcc_size.iter().map(|&s| s as f64 / n as f64).collect();

    Ok(RobustnessCurve {
        fractions,
        lcc_size,
        lcc_norm,
        diameter,
        diameter_exact,
    })
}

/// Computes the trapezoidal-rule integral of the normalised LCC curve over
/// the removed fraction.
///
/// `fractions` must be ascending with endpoints 0 and 1, the same length as
/// the curve (at least two points), and both sequences must be finite.
///
/// # Examples
///
/// ```
/// use redoubt::curve::robustness_index;
///
/// let r = robustness_index(&[0.0, 0.5, 1.0], &[1.0, 0.5, 0.0]).unwrap();
/// assert_eq!(r, 0.5);
/// ```
pub fn robustness_index(fractions: &[f64], lcc_norm: &[f64]) -> Result<f64, Error> {
    if fractions.len() != lcc_norm.len() {
        return Err(Error::MalformedCurve(format!(
            "length mismatch: {} fractions vs {} values",
            fractions.len(),
            lcc_norm.len()
        )));
    }
    if fractions.len() < 2 {
        return Err(Error::MalformedCurve(
            "curve needs at least two points".into(),
        ));
    }
    if fractions[0] != 0.0 || *fractions.last().unwrap() != 1.0 {
        return Err(Error::MalformedCurve(
            "fractions must span [0, 1]".into(),
        ));
    }
    if fractions.windows(2).any(|w| w[1] < w[0]) {
        return Err(Error::MalformedCurve(
            "fractions must be sorted ascending".into(),
        ));
    }
    if fractions.iter().chain(lcc_norm).any(|v| !v.is_finite()) {
        return Err(Error::MalformedCurve("values must be finite".into()));
    }

    let area = fractions
        .windows(2)
        .zip(lcc_norm.windows(2))
        .map(|(f, y)| (f[1] - f[0]) * (y[0] + y[1]) / 2.0)
        .sum();

    Ok(area)
}

/// Maps the order onto graph indices, verifying it is a permutation of the
/// vertex set.
fn order_as_indices<T: Ord>(nodes: &[T], order: &[T]) -> Result<Vec<GraphIndex>, Error> {
    if order.len() != nodes.len() {
        return Err(Error::InvalidOrder);
    }

    let mut seen = vec![false; nodes.len()];
    let mut indices = Vec::with_capacity(order.len());

    for node in order {
        let i = nodes.binary_search(node).map_err(|_| Error::InvalidOrder)?;
        if seen[i] {
            return Err(Error::InvalidOrder);
        }
        seen[i] = true;
        indices.push(i as GraphIndex);
    }

    Ok(indices)
}

/// The largest-component size after `k` removals for every `k`, by reverse
/// incremental insertion over a union-find tracker.
fn lcc_curve(adjacency_list: &[Vec<GraphIndex>], order: &[GraphIndex]) -> Vec<u32> {
    let n = order.len();
    let mut tracker = ComponentTracker::new(n);
    let mut active = vec![false; n];
    let mut max_component_size = 0;

    let mut lcc_size = vec![0; n + 1];

    // Re-insert nodes from the end of the order: after step t, exactly the
    // first n - t entries of the order are still "removed".
    for t in 1..=n {
        let u = order[n - t];
        active[u as usize] = true;
        max_component_size = max_component_size.max(1);

        for &v in &adjacency_list[u as usize] {
            if active[v as usize] {
                let merged = tracker.union(u, v);
                max_component_size = max_component_size.max(merged);
            }
        }

        lcc_size[n - t] = max_component_size;
    }

    lcc_size
}

/// The diameter of the largest component once the first `k` nodes of the
/// order are removed, or `None` if that component has fewer than two nodes.
fn diameter_after_removals(
    adjacency_list: &[Vec<GraphIndex>],
    order: &[GraphIndex],
    k: usize,
) -> Option<u32> {
    let n = order.len();
    let mut active = vec![true; n];
    for &u in &order[..k] {
        active[u as usize] = false;
    }

    // Find the members of the largest component; ties go to the component
    // discovered first (smallest starting index) for determinism.
    let mut visited = vec![false; n];
    let mut largest: Vec<GraphIndex> = vec![];

    for start in 0..n {
        if !active[start] || visited[start] {
            continue;
        }

        let mut component = vec![start as GraphIndex];
        visited[start] = true;
        let mut queue = VecDeque::from([start as GraphIndex]);

        while let Some(u) = queue.pop_front() {
            for &v in &adjacency_list[u as usize] {
                if active[v as usize] && !visited[v as usize] {
                    visited[v as usize] = true;
                    component.push(v);
                    queue.push_back(v);
                }
            }
        }

        if component.len() > largest.len() {
            largest = component;
        }
    }

    if largest.len() < 2 {
        return None;
    }

    // Diameter = max eccentricity over a BFS from every member, bounded to
    // the component.
    let mut diameter = 0;
    let mut distance = vec![u32::MAX; n];

    for &source in &largest {
        for &u in &largest {
            distance[u as usize] = u32::MAX;
        }
        distance[source as usize] = 0;
        let mut queue = VecDeque::from([source]);

        while let Some(u) = queue.pop_front() {
            for &v in &adjacency_list[u as usize] {
                if active[v as usize] && distance[v as usize] == u32::MAX {
                    distance[v as usize] = distance[u as usize] + 1;
                    diameter = diameter.max(distance[v as usize]);
                    queue.push_back(v);
                }
            }
        }
    }

    Some(diameter)
}

#[cfg(test)]
mod tests {
    use crate::{
        attack::{rank_nodes, AttackStrategy},
        edge::Edge,
    };

    use super::*;

    fn order_of<T: Copy>(nodes: &[T]) -> AttackOrder<T> {
        AttackOrder {
            nodes: nodes.to_vec(),
            approximate: false,
        }
    }

    fn path_graph(ids: &[&'static str]) -> Graph<&'static str> {
        let mut graph = Graph::new();
        for pair in ids.windows(2) {
            graph.insert(Edge::new(pair[0], pair[1]));
        }
        graph
    }

    #[test]
    fn path_graph_leaf_to_leaf_removal() {
        let mut graph = path_graph(&["a", "b", "c", "d", "e"]);
        let order = order_of(&["a", "b", "c", "d", "e"]);

        let curve = compute_curve(&mut graph, &order).unwrap();

        // Removing from one end shortens the path by one node per step.
        assert_eq!(curve.lcc_size, vec![5, 4, 3, 2, 1, 0]);
        assert_eq!(
            curve.diameter,
            vec![Some(4), Some(3), Some(2), Some(1), None, None]
        );
        assert!(curve.diameter_exact);
        assert_eq!(curve.fractions, vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
    }

    #[test]
    fn lcc_never_exceeds_remaining_node_count() {
        let mut graph = path_graph(&["a", "b", "c", "d", "e", "f"]);
        let order = rank_nodes(&mut graph, AttackStrategy::Degree { adaptive: false });

        let curve = compute_curve(&mut graph, &order).unwrap();

        let n = graph.vertex_count();
        for (k, &size) in curve.lcc_size.iter().enumerate() {
            assert!(size as usize <= n - k);
        }
    }

    #[test]
    fn isolated_vertices_participate() {
        let mut graph = path_graph(&["a", "b"]);
        graph.insert_vertex("c");

        let order = order_of(&["c", "a", "b"]);
        let curve = compute_curve(&mut graph, &order).unwrap();

        assert_eq!(curve.lcc_size, vec![2, 2, 1, 0]);
        assert_eq!(curve.diameter, vec![Some(1), Some(1), None, None]);
    }

    #[test]
    fn empty_graph_yields_trivial_curve() {
        let mut graph: Graph<&str> = Graph::new();
        let order = order_of::<&str>(&[]);

        let curve = compute_curve(&mut graph, &order).unwrap();

        assert_eq!(curve.lcc_size, vec![0, 0]);
        assert_eq!(curve.fractions, vec![0.0, 1.0]);
        assert_eq!(curve.r_index().unwrap(), 0.0);
    }

    #[test]
    fn order_must_be_a_permutation() {
        let mut graph = path_graph(&["a", "b", "c"]);

        // Too short.
        let result = compute_curve(&mut graph, &order_of(&["a", "b"]));
        assert!(matches!(result, Err(Error::InvalidOrder)));

        // Duplicate entry.
        let result = compute_curve(&mut graph, &order_of(&["a", "b", "b"]));
        assert!(matches!(result, Err(Error::InvalidOrder)));

        // Unknown vertex.
        let result = compute_curve(&mut graph, &order_of(&["a", "b", "z"]));
        assert!(matches!(result, Err(Error::InvalidOrder)));
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let mut graph = path_graph(&["a", "b", "c", "d", "e", "f", "g"]);
        let order = rank_nodes(&mut graph, AttackStrategy::PageRank);

        let first = compute_curve(&mut graph, &order).unwrap();
        let second = compute_curve(&mut graph, &order).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn large_graphs_subsample_the_diameter() {
        let mut graph = Graph::new();
        for i in 0u32..150 {
            graph.insert(Edge::new(i, i + 1));
        }

        let order = rank_nodes(&mut graph, AttackStrategy::Degree { adaptive: false });
        let curve = compute_curve(&mut graph, &order).unwrap();

        assert!(!curve.diameter_exact);
        // The full chain's diameter is still reported at k = 0.
        assert_eq!(curve.diameter[0], Some(150));
        // Only the sampled steps carry a value.
        let sampled = curve.diameter.iter().filter(|d| d.is_some()).count();
        assert!(sampled <= DIAMETER_SAMPLES);
    }

    #[test]
    fn r_index_of_constant_full_curve_is_one() {
        let fractions = vec![0.0, 0.25, 0.5, 0.75, 1.0];
        let lcc_norm = vec![1.0; 5];

        assert_eq!(robustness_index(&fractions, &lcc_norm).unwrap(), 1.0);
    }

    #[test]
    fn r_index_stays_within_unit_interval() {
        let mut graph = path_graph(&["a", "b", "c", "d", "e"]);
        let order = rank_nodes(&mut graph, AttackStrategy::Degree { adaptive: false });

        let r = compute_curve(&mut graph, &order).unwrap().r_index().unwrap();

        assert!((0.0..=1.0).contains(&r));
    }

    #[test]
    fn r_index_rejects_malformed_curves() {
        // Length mismatch.
        assert!(matches!(
            robustness_index(&[0.0, 1.0], &[1.0]),
            Err(Error::MalformedCurve(_))
        ));
        // Endpoints not spanning [0, 1].
        assert!(matches!(
            robustness_index(&[0.0, 0.5], &[1.0, 0.5]),
            Err(Error::MalformedCurve(_))
        ));
        // Not ascending.
        assert!(matches!(
            robustness_index(&[0.0, 0.8, 0.2, 1.0], &[1.0, 0.5, 0.5, 0.0]),
            Err(Error::MalformedCurve(_))
        ));
        // Non-finite values.
        assert!(matches!(
            robustness_index(&[0.0, 1.0], &[f64::NAN, 0.0]),
            Err(Error::MalformedCurve(_))
        ));
    }
}
