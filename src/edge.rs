//! A module for working with edges.

/// A pair of vertices representing an undirected graph edge.
///
/// The endpoints are normalised on construction: the smaller vertex (by
/// `Ord`) is always stored first. This makes `(a, b)` and `(b, a)` the same
/// value, lets the standard `Eq`/`Hash`/`Ord` derives do the right thing and
/// gives every edge a canonical form that the rest of the crate relies on for
/// deterministic tie-breaking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge<T> {
    source: T,
    target: T,
}

impl<T: Ord> Edge<T> {
    /// Creates a new edge from two vertices.
    ///
    /// # Examples
    ///
    /// ```
    /// use redoubt::edge::Edge;
    ///
    /// let edge = Edge::new("a", "b");
    /// assert_eq!(edge, Edge::new("b", "a"));
    /// ```
    pub fn new(a: T, b: T) -> Self {
        if a <= b {
            Self {
                source: a,
                target: b,
            }
        } else {
            Self {
                source: b,
                target: a,
            }
        }
    }

    /// Returns the smaller of the two vertices forming the edge.
    ///
    /// # Examples
    ///
    /// ```
    /// use redoubt::edge::Edge;
    ///
    /// let edge = Edge::new("b", "a");
    /// assert_eq!(edge.source(), &"a");
    /// ```
    pub fn source(&self) -> &T {
        &self.source
    }

    /// Returns the larger of the two vertices forming the edge.
    ///
    /// # Examples
    ///
    /// ```
    /// use redoubt::edge::Edge;
    ///
    /// let edge = Edge::new("b", "a");
    /// assert_eq!(edge.target(), &"b");
    /// ```
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Returns whether the edge contains the given vertex.
    ///
    /// # Examples
    ///
    /// ```
    /// use redoubt::edge::Edge;
    ///
    /// let edge = Edge::new("a", "b");
    ///
    /// assert_eq!(edge.contains(&"a"), true);
    /// assert_eq!(edge.contains(&"b"), true);
    /// assert_eq!(edge.contains(&"c"), false);
    /// ```
    pub fn contains(&self, vertex: &T) -> bool {
        self.source() == vertex || self.target() == vertex
    }

    /// Returns whether both endpoints are the same vertex.
    pub fn is_loop(&self) -> bool {
        self.source == self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalises_endpoint_order() {
        let edge = Edge::new("b", "a");

        assert_eq!(edge.source(), &"a");
        assert_eq!(edge.target(), &"b");
    }

    #[test]
    fn contains() {
        let edge = Edge::new("a", "b");

        assert!(edge.contains(&"a"));
        assert!(edge.contains(&"b"));
        assert!(!edge.contains(&"c"));
    }

    #[test]
    fn is_loop() {
        assert!(Edge::new("a", "a").is_loop());
        assert!(!Edge::new("a", "b").is_loop());
    }

    #[test]
    fn eq_is_orientation_independent() {
        let (a, b) = ("a", "b");

        assert_eq!(Edge::new(a, b), Edge::new(a, b));
        assert_eq!(Edge::new(a, b), Edge::new(b, a));
    }

    #[test]
    fn hash_is_orientation_independent() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(Edge::new("a", "b"));

        // The reversed orientation must collide with the stored edge.
        assert!(!set.insert(Edge::new("b", "a")));
        assert_eq!(set.len(), 1);
    }
}
