//! Redoubt is a toolkit for analysing how robust an undirected network is to
//! targeted attack, and for planning the reinforcements that would make it
//! more robust.
//!
//! # Basic usage
//!
//! The library is centered around the [`Graph`](graph::Graph) structure which
//! can be constructed from one or more [`Edge`](edge::Edge) instances. An
//! attack simulation then has three steps: rank the nodes with an
//! [`AttackStrategy`](attack::AttackStrategy), play the removals through
//! [`compute_curve`](curve::compute_curve), and summarise the result with the
//! curve's [`r_index`](curve::RobustnessCurve::r_index).
//!
//! ```rust
//! use redoubt::attack::{rank_nodes, AttackStrategy};
//! use redoubt::curve::compute_curve;
//! use redoubt::edge::Edge;
//! use redoubt::graph::Graph;
//!
//! // Construct the graph instance, a hub with three spokes.
//! let mut graph = Graph::new();
//!
//! // The IDs can be any type that is `Copy + Eq + Hash + Ord`.
//! graph.insert(Edge::new("hub", "a"));
//! graph.insert(Edge::new("hub", "b"));
//! graph.insert(Edge::new("hub", "c"));
//!
//! // Remove nodes by descending degree and measure what's left standing.
//! let order = rank_nodes(&mut graph, AttackStrategy::Degree { adaptive: false });
//! let curve = compute_curve(&mut graph, &order).unwrap();
//!
//! // The hub goes first and the graph shatters immediately.
//! assert_eq!(curve.lcc_size, vec![4, 1, 1, 1, 0]);
//! assert!(curve.r_index().unwrap() < 0.5);
//! ```
//!
//! Beyond measurement, [`schneider`] rewires existing edges to harden the
//! topology without touching any node's degree, [`resistance`] proposes new
//! edges where the network is electrically weakest, and [`route`] zooms in
//! on the fragility of a single origin/destination pair.

pub mod attack;
mod betweenness;
pub mod curve;
mod dsu;
pub mod edge;
pub mod error;
pub mod graph;
pub mod resistance;
pub mod route;
pub mod schneider;
