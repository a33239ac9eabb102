//! A module for working with graphs.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt::Debug,
    hash::Hash,
};

use nalgebra::DMatrix;

use crate::edge::Edge;

/// The integer type used to index vertices once a stable ordering has been
/// assigned. Dense algorithms (BFS, union-find, Brandes) all operate on these
/// indices rather than on vertex identifiers.
pub type GraphIndex = u32;

pub(crate) const MIN_NUM_THREADS: usize = 1;
pub(crate) const MAX_NUM_THREADS: usize = 128;

/// An undirected, unweighted, simple graph.
///
/// Vertices are tracked explicitly so facilities without any link are
/// representable; inserting an edge also registers both endpoints. Self-loops
/// and duplicate edges are rejected at insertion, so every stored edge is an
/// unordered pair of distinct vertices.
///
/// Derived state (the sorted vertex index, the adjacency list and the
/// Laplacian matrix) is cached lazily and invalidated on any mutation.
#[derive(Clone, Debug)]
pub struct Graph<T> {
    /// The edges in the graph.
    edges: HashSet<Edge<T>>,
    /// The vertices in the graph, a superset of all edge endpoints.
    vertices: HashSet<T>,
    /// A mapping of vertices to their indices, sorted by `T`'s `Ord`. The
    /// sorted collection keeps the index assignment stable between
    /// computations, which every index-based consumer relies on.
    index: Option<BTreeMap<T, usize>>,
    /// Cache the adjacency list when possible. Neighbour lists are sorted.
    adjacency_list: Option<Vec<Vec<GraphIndex>>>,
    /// Cache the laplacian matrix when possible.
    laplacian_matrix: Option<DMatrix<f64>>,
}

impl<T> Default for Graph<T>
where
    T: Copy + Eq + Hash + Ord + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Graph<T>
where
    T: Copy + Eq + Hash + Ord + Debug,
{
    /// Creates an empty graph.
    ///
    /// # Examples
    ///
    /// ```
    /// use redoubt::graph::Graph;
    ///
    /// let graph: Graph<&str> = Graph::new();
    /// ```
    pub fn new() -> Self {
        Self {
            edges: Default::default(),
            vertices: Default::default(),
            index: None,
            adjacency_list: None,
            laplacian_matrix: None,
        }
    }

    /// Creates a graph from an iterator of edges.
    pub fn from_edges(edges: impl IntoIterator<Item = Edge<T>>) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.insert(edge);
        }

        graph
    }

    /// Returns the set of edges in the graph.
    pub fn edges(&self) -> &HashSet<Edge<T>> {
        &self.edges
    }

    /// Inserts an edge into the graph, registering both endpoints as
    /// vertices.
    ///
    /// Self-loops are rejected. Returns whether the edge was newly inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use redoubt::edge::Edge;
    /// use redoubt::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    ///
    /// assert_eq!(graph.insert(Edge::new("a", "b")), true);
    /// assert_eq!(graph.insert(Edge::new("b", "a")), false);
    /// assert_eq!(graph.insert(Edge::new("a", "a")), false);
    /// ```
    pub fn insert(&mut self, edge: Edge<T>) -> bool {
        if edge.is_loop() {
            return false;
        }

        self.vertices.insert(*edge.source());
        self.vertices.insert(*edge.target());
        let is_inserted = self.edges.insert(edge);

        // Delete the cached objects if the edge was successfully inserted
        // because we can't reliably update them from the new connection
        // alone.
        if is_inserted && self.index.is_some() {
            self.clear_cache()
        }

        is_inserted
    }

    /// Inserts a vertex without any incident edges.
    ///
    /// Returns whether the vertex was newly inserted.
    pub fn insert_vertex(&mut self, vertex: T) -> bool {
        let is_inserted = self.vertices.insert(vertex);

        if is_inserted && self.index.is_some() {
            self.clear_cache()
        }

        is_inserted
    }

    /// Removes an edge and returns whether it was present in the graph.
    ///
    /// The endpoints remain vertices of the graph.
    ///
    /// # Examples
    ///
    /// ```
    /// use redoubt::edge::Edge;
    /// use redoubt::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    /// graph.insert(Edge::new("a", "b"));
    ///
    /// assert_eq!(graph.remove(&Edge::new("a", "b")), true);
    /// assert_eq!(graph.remove(&Edge::new("a", "c")), false);
    /// assert_eq!(graph.vertex_count(), 2);
    /// ```
    pub fn remove(&mut self, edge: &Edge<T>) -> bool {
        let is_removed = self.edges.remove(edge);

        if is_removed && self.index.is_some() {
            self.clear_cache()
        }

        is_removed
    }

    /// Checks if the graph contains an edge.
    pub fn contains(&self, edge: &Edge<T>) -> bool {
        self.edges.contains(edge)
    }

    /// Checks if the graph contains a vertex.
    pub fn contains_vertex(&self, vertex: &T) -> bool {
        self.vertices.contains(vertex)
    }

    /// Returns the vertex count of the graph.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the edge count of the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the vertices of the graph, sorted ascending.
    ///
    /// The position of a vertex in this list is its [`GraphIndex`]: the
    /// adjacency list, the Laplacian matrix and every index-based result in
    /// the crate use the same assignment.
    pub fn vertices(&mut self) -> Vec<T> {
        if self.index.is_none() {
            self.generate_index();
        }

        // Safety: the previous call guarantees the index has been generated.
        self.index.as_ref().unwrap().keys().copied().collect()
    }

    /// Computes the density of the graph, the ratio of edges with respect to
    /// the maximum possible edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use redoubt::edge::Edge;
    /// use redoubt::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    ///
    /// graph.insert(Edge::new("a", "b"));
    /// assert_eq!(graph.density(), 1.0);
    ///
    /// graph.insert(Edge::new("a", "c"));
    /// assert_eq!(graph.density(), 2.0 / 3.0);
    /// ```
    pub fn density(&self) -> f64 {
        let vc = self.vertex_count() as f64;
        let ec = self.edge_count() as f64;

        // Calculate the total number of possible edges given a vertex count.
        let pec = vc * (vc - 1.0) / 2.0;
        // Actual edges divided by the possible edges gives the density.
        ec / pec
    }

    /// Returns a mapping of vertices to their degree (number of incident
    /// edges) in the graph.
    ///
    /// # Examples
    ///
    /// ```
    /// use redoubt::edge::Edge;
    /// use redoubt::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    /// graph.insert(Edge::new("a", "b"));
    /// graph.insert(Edge::new("a", "c"));
    ///
    /// assert_eq!(graph.degree_centrality().get("a"), Some(&2));
    /// ```
    pub fn degree_centrality(&mut self) -> HashMap<T, u32> {
        let adjacency_list = self.adjacency_list();

        // Safety: the previous call guarantees the index has been generated.
        self.index
            .as_ref()
            .unwrap()
            .keys()
            .zip(adjacency_list.iter())
            .map(|(vertex, neighbours)| (*vertex, neighbours.len() as u32))
            .collect()
    }

    /// Constructs the adjacency list for this graph, indexed consistently
    /// with [`vertices`](Self::vertices). Neighbour lists are sorted
    /// ascending.
    ///
    /// # Examples
    ///
    /// ```
    /// use redoubt::edge::Edge;
    /// use redoubt::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    /// graph.insert(Edge::new("a", "b"));
    /// graph.insert(Edge::new("a", "c"));
    ///
    /// // Indexing is sorted: a: 0, b: 1, c: 2.
    /// assert_eq!(graph.adjacency_list(), vec![vec![1, 2], vec![0], vec![0]]);
    /// ```
    pub fn adjacency_list(&mut self) -> Vec<Vec<GraphIndex>> {
        // Check the cache.
        if let Some(list) = self.adjacency_list.clone() {
            return list;
        }

        if self.index.is_none() {
            self.generate_index();
        }

        // Safety: the previous call guarantees the index has been generated
        // and stored.
        let index = self.index.as_ref().unwrap();
        let mut list: Vec<Vec<GraphIndex>> = vec![vec![]; index.len()];

        for edge in &self.edges {
            // Safety: the index was generated from this set of edges and
            // vertices, so both endpoints must be present.
            let i = *index.get(edge.source()).unwrap();
            let j = *index.get(edge.target()).unwrap();

            list[i].push(j as GraphIndex);
            list[j].push(i as GraphIndex);
        }

        // Sorted neighbour lists keep traversal order deterministic.
        for neighbours in list.iter_mut() {
            neighbours.sort_unstable();
        }

        // Cache the list.
        self.adjacency_list = Some(list.clone());

        list
    }

    /// Constructs the laplacian matrix for this graph (degree matrix minus
    /// adjacency matrix).
    ///
    /// # Examples
    ///
    /// ```
    /// use nalgebra::dmatrix;
    /// use redoubt::edge::Edge;
    /// use redoubt::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    /// graph.insert(Edge::new("a", "b"));
    /// assert_eq!(
    ///     graph.laplacian_matrix(),
    ///     dmatrix![1.0, -1.0;
    ///              -1.0, 1.0]
    /// );
    /// ```
    pub fn laplacian_matrix(&mut self) -> DMatrix<f64> {
        // Check the cache.
        if let Some(matrix) = self.laplacian_matrix.clone() {
            return matrix;
        }

        let adjacency_list = self.adjacency_list();
        let n = adjacency_list.len();
        let mut matrix = DMatrix::<f64>::zeros(n, n);

        for (i, neighbours) in adjacency_list.iter().enumerate() {
            matrix[(i, i)] = neighbours.len() as f64;
            for &j in neighbours {
                matrix[(i, j as usize)] = -1.0;
            }
        }

        // Cache the matrix.
        self.laplacian_matrix = Some(matrix.clone());

        matrix
    }

    //
    // Private
    //

    /// Clears the computed state.
    ///
    /// This should be called every time the graph is mutated since the
    /// cached state won't correspond to the new graph.
    fn clear_cache(&mut self) {
        self.index = None;
        self.adjacency_list = None;
        self.laplacian_matrix = None;
    }

    /// Constructs and stores an index of vertices for this graph.
    ///
    /// The index will be sorted by `T`'s implementation of `Ord`.
    fn generate_index(&mut self) {
        // It should be impossible to call this function if the cache is not
        // empty.
        debug_assert!(self.index.is_none());

        let mut vertices: Vec<T> = self.vertices.iter().copied().collect();
        vertices.sort_unstable();

        let index: BTreeMap<T, usize> = vertices
            .iter()
            .enumerate()
            .map(|(i, &vertex)| (vertex, i))
            .collect();

        self.index = Some(index);
    }
}
