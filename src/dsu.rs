//! A union-find tracker for incremental connectivity queries.
//!
//! This is the leaf dependency of the robustness curve engine: the curve is
//! produced by re-inserting removed nodes in reverse and merging components,
//! which needs amortised near-O(1) `union`/`find` over node *indices*. The
//! tracker is an internal helper; indices are trusted to be in range.

/// Tracks a dynamic partition of `0..n` into connected components.
#[derive(Clone, Debug)]
pub(crate) struct ComponentTracker {
    /// Parent pointer for each index; roots point at themselves.
    parent: Vec<u32>,
    /// Component size, valid at root indices only.
    size: Vec<u32>,
}

impl ComponentTracker {
    /// Creates a tracker with every index in its own singleton component.
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
            size: vec![1; n],
        }
    }

    /// Returns the root index of the component containing `i`.
    ///
    /// Every index visited on the way up is re-pointed directly at the root
    /// (path compression).
    pub(crate) fn find(&mut self, i: u32) -> u32 {
        let mut root = i;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }

        // Second pass: compress the visited path onto the root.
        let mut current = i;
        while self.parent[current as usize] != root {
            let next = self.parent[current as usize];
            self.parent[current as usize] = root;
            current = next;
        }

        root
    }

    /// Merges the components containing `i` and `j` and returns the size of
    /// the resulting component.
    ///
    /// Union-by-size: the smaller tree's root is attached under the larger.
    /// Joining two indices already in the same component is a no-op that
    /// returns the current component size.
    pub(crate) fn union(&mut self, i: u32, j: u32) -> u32 {
        let root_i = self.find(i);
        let root_j = self.find(j);

        if root_i == root_j {
            return self.size[root_i as usize];
        }

        let (large, small) = if self.size[root_i as usize] >= self.size[root_j as usize] {
            (root_i, root_j)
        } else {
            (root_j, root_i)
        };

        self.parent[small as usize] = large;
        self.size[large as usize] += self.size[small as usize];

        self.size[large as usize]
    }
}
