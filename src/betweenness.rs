//! A module for performing the multi-threaded computation of betweenness.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    thread,
};

use crate::graph::{GraphIndex, MAX_NUM_THREADS, MIN_NUM_THREADS};

/// This is an implementation of Ulrik Brandes's
/// A Faster Algorithm for Betweenness Centrality
/// http://snap.stanford.edu/class/cs224w-readings/brandes01centrality.pdf
/// page 10, "Algorithm 1: Betweenness centrality in unweighted graphs",
/// accumulating the dependencies of a single source node.
fn betweenness_for_source(
    source: usize,
    indices: &[Vec<GraphIndex>],
    betweenness_count: &mut [f64],
) {
    let num_nodes = indices.len();

    let mut sigma: Vec<f64> = vec![0.0; num_nodes];
    let mut distance: Vec<usize> = vec![num_nodes + 1; num_nodes];
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); num_nodes];
    let mut delta: Vec<f64> = vec![0.0; num_nodes];
    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut stack: Vec<usize> = Vec::new();

    sigma[source] = 1.0;
    distance[source] = 0;
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        stack.push(v);

        for w in &indices[v] {
            let w = *w as usize;
            if distance[w] == num_nodes + 1 {
                distance[w] = distance[v] + 1;
                queue.push_back(w);
            }
            if distance[w] == distance[v] + 1 {
                sigma[w] += sigma[v];
                predecessors[w].push(v);
            }
        }
    }

    while let Some(w) = stack.pop() {
        for j in 0..predecessors[w].len() {
            let v = predecessors[w][j];
            delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
        }
        if w != source {
            betweenness_count[w] += delta[w];
        }
    }
}

/// This function is the thread task, grabbing the next unprocessed source
/// from the shared list. If no more sources remain, we exit, returning this
/// worker's betweenness accumulator.
fn betweenness_task(
    acounter: Arc<Mutex<usize>>,
    aindices: Arc<Vec<Vec<GraphIndex>>>,
    asources: Arc<Vec<usize>>,
) -> Vec<f64> {
    let indices = &aindices;
    let num_nodes = indices.len();

    // each worker thread keeps its own cache of data
    // these are returned when the thread finishes
    // and then summed by the caller
    let mut betweenness_count: Vec<f64> = vec![0.0; num_nodes];

    loop {
        let mut counter = acounter.lock().unwrap();
        let position: usize = *counter;
        *counter += 1;
        drop(counter);
        if position < asources.len() {
            betweenness_for_source(asources[position], indices, &mut betweenness_count);
        } else {
            break;
        }
    }
    betweenness_count
}

/// Computes (per-node) betweenness counts over the given adjacency list,
/// doing the heavy lifting across multiple worker threads.
///
/// When `sources` is `Some`, only the listed source nodes contribute
/// shortest-path dependencies — the sampled approximation used for large
/// graphs. When it is `None` every node is a source and the counts are
/// exact.
///
/// It is responsible for:
/// - setting up the data to be passed to the threads
/// - instantiating and spawning the threads
/// - collecting the results when each is finished
/// - adding the results together, and returning them
///
/// It is public for the attack ranking, but is not exposed in the public
/// library interface.
pub(crate) fn compute_betweenness(
    indices: Vec<Vec<GraphIndex>>,
    mut num_threads: usize,
    sources: Option<Vec<usize>>,
) -> Vec<f64> {
    num_threads = num_threads.clamp(MIN_NUM_THREADS, MAX_NUM_THREADS);

    let num_nodes = indices.len();
    let sources = sources.unwrap_or_else(|| (0..num_nodes).collect());

    tracing::debug!(
        num_nodes,
        num_sources = sources.len(),
        num_threads,
        "computing betweenness counts"
    );

    let mut betweenness_count: Vec<f64> = vec![0.0; num_nodes];

    let mut handles = Vec::with_capacity(num_threads);
    let wrapped_indices = Arc::new(indices);
    let wrapped_sources = Arc::new(sources);
    let wrapped_counter = Arc::new(Mutex::new(0));

    for _ in 0..num_threads {
        let acounter = Arc::clone(&wrapped_counter);
        let aindices = Arc::clone(&wrapped_indices);
        let asources = Arc::clone(&wrapped_sources);
        let handle = thread::spawn(move || betweenness_task(acounter, aindices, asources));
        handles.push(handle);
    }

    // Non-normalized counts: every undirected pair is counted from both
    // endpoints, so we must divide by two. (Normalisation is irrelevant for
    // ranking, which only needs the relative order.)
    let divisor: f64 = 2.0;
    for h in handles {
        let b = h.join().unwrap();
        for i in 0..num_nodes {
            betweenness_count[i] += b[i] / divisor;
        }
    }

    betweenness_count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_graph_counts() {
        // a - b - c - d: the middle nodes each sit on two source-target
        // pairs' shortest paths.
        let indices = vec![vec![1], vec![0, 2], vec![1, 3], vec![2]];

        let counts = compute_betweenness(indices, 2, None);

        assert_eq!(counts, vec![0.0, 2.0, 2.0, 0.0]);
    }

    #[test]
    fn star_centre_dominates() {
        // Star with centre 0: all pairs of leaves route through it.
        let indices = vec![vec![1, 2, 3], vec![0], vec![0], vec![0]];

        let counts = compute_betweenness(indices, 1, None);

        assert_eq!(counts[0], 3.0);
        assert_eq!(&counts[1..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn disconnected_pairs_contribute_nothing() {
        let indices = vec![vec![1], vec![0], vec![3], vec![2]];

        let counts = compute_betweenness(indices, 2, None);

        assert_eq!(counts, vec![0.0; 4]);
    }

    #[test]
    fn sampled_sources_preserve_path_ranking() {
        // Path graph again, but only node 0 as a pivot: the counts shrink
        // but the interior nodes still dominate the leaves.
        let indices = vec![vec![1], vec![0, 2], vec![1, 3], vec![2]];

        let counts = compute_betweenness(indices, 1, Some(vec![0]));

        assert!(counts[1] > 0.0);
        assert!(counts[2] > 0.0);
        assert_eq!(counts[0], 0.0);
        assert_eq!(counts[3], 0.0);
    }
}
