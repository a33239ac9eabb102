//! End-to-end scenarios exercising the attack, measurement and hardening
//! stages together.

use std::collections::BTreeMap;

use redoubt::{
    attack::{rank_nodes, AttackStrategy},
    curve::compute_curve,
    edge::Edge,
    graph::Graph,
    resistance::{reinforce_ter, TerParams},
    schneider::{optimize_schneider, SchneiderParams},
};

/// A 6-node cycle with a pendant node 6 attached to node 0 over a single
/// bridge edge. Node 0 is the unique highest-degree node.
fn cycle_with_pendant() -> Graph<u32> {
    let mut graph = Graph::new();
    for i in 0..6u32 {
        graph.insert(Edge::new(i, (i + 1) % 6));
    }
    graph.insert(Edge::new(0, 6));
    graph
}

fn degree_multiset(graph: &mut Graph<u32>) -> BTreeMap<u32, usize> {
    let mut multiset = BTreeMap::new();
    for (_, degree) in graph.degree_centrality() {
        *multiset.entry(degree).or_insert(0) += 1;
    }
    multiset
}

#[test]
fn degree_attack_severs_the_pendant_first() {
    let mut graph = cycle_with_pendant();

    let order = rank_nodes(&mut graph, AttackStrategy::Degree { adaptive: false });
    assert_eq!(order.nodes[0], 0);

    let curve = compute_curve(&mut graph, &order).unwrap();

    // The first removal takes out the bridge endpoint, so the component
    // drops by two nodes at once and then shrinks down the leftover path.
    assert_eq!(curve.lcc_size, vec![7, 5, 4, 3, 2, 1, 1, 0]);
    assert_eq!(curve.diameter[0], Some(4));
    assert_eq!(curve.diameter[1], Some(4));
}

#[test]
fn edge_swapping_never_hurts_the_r_index() {
    let mut graph = cycle_with_pendant();
    let before_degrees = degree_multiset(&mut graph);

    let params = SchneiderParams {
        max_trials: 2_000,
        patience: 2_000,
        prefilter: false,
        seed: 11,
        ..Default::default()
    };
    let (mut hardened, report) = optimize_schneider(&mut graph, &params).unwrap();

    // The search is stochastic, so only the direction is guaranteed.
    assert!(report.r_best >= report.initial_r);

    // The rewiring must leave node count, edge count and the degree
    // sequence untouched regardless of how many swaps were accepted.
    assert_eq!(hardened.vertex_count(), graph.vertex_count());
    assert_eq!(hardened.edge_count(), graph.edge_count());
    assert_eq!(degree_multiset(&mut hardened), before_degrees);

    // And the reported best must match what the returned topology scores.
    let order = rank_nodes(&mut hardened, AttackStrategy::Degree { adaptive: false });
    let recomputed = compute_curve(&mut hardened, &order)
        .unwrap()
        .r_index()
        .unwrap();
    assert!((recomputed - report.r_best).abs() < 1e-9);
}

#[test]
fn the_full_pipeline_is_deterministic() {
    let run = || {
        let mut graph = cycle_with_pendant();
        let order = rank_nodes(&mut graph, AttackStrategy::Betweenness);
        let curve = compute_curve(&mut graph, &order).unwrap();
        let r = curve.r_index().unwrap();
        (order.nodes, curve.lcc_size, curve.diameter, r)
    };

    assert_eq!(run(), run());
}

#[test]
fn reinforcement_only_adds_edges_within_the_distance_bound() {
    let mut graph = cycle_with_pendant();
    let edges_before = graph.edges().clone();

    let params = TerParams {
        k: 3,
        max_distance: Some(10.0),
        ..Default::default()
    };
    // Pairs that wrap past node 4 are "too far"; everything else is close.
    let distance = |u: &u32, v: &u32| -> Option<f64> {
        if u.max(v) >= &4 {
            Some(50.0)
        } else {
            Some(5.0)
        }
    };

    let (reinforced, proposals) = reinforce_ter(&mut graph, &params, Some(&distance));

    assert!(proposals.len() <= 3);
    assert!(!proposals.is_empty());
    for proposal in &proposals {
        assert!(proposal.source.max(proposal.target) < 4);
        assert!(!edges_before.contains(&Edge::new(proposal.source, proposal.target)));
    }

    // Strict superset: every original edge survives, plus the proposals.
    for edge in &edges_before {
        assert!(reinforced.contains(edge));
    }
    assert_eq!(reinforced.edge_count(), edges_before.len() + proposals.len());
}

#[test]
fn reinforcement_improves_the_r_index() {
    let mut graph = cycle_with_pendant();

    let order = rank_nodes(&mut graph, AttackStrategy::Degree { adaptive: false });
    let before = compute_curve(&mut graph, &order)
        .unwrap()
        .r_index()
        .unwrap();

    let params = TerParams {
        k: 3,
        ..Default::default()
    };
    let (mut reinforced, _) = reinforce_ter(&mut graph, &params, None);

    let order = rank_nodes(&mut reinforced, AttackStrategy::Degree { adaptive: false });
    let after = compute_curve(&mut reinforced, &order)
        .unwrap()
        .r_index()
        .unwrap();

    assert!(after > before);
}

#[cfg(feature = "serde")]
mod serialisation {
    use redoubt::curve::RobustnessCurve;

    use super::*;

    #[test]
    fn curve_round_trips_through_json() {
        let mut graph = cycle_with_pendant();
        let order = rank_nodes(&mut graph, AttackStrategy::Degree { adaptive: false });
        let curve = compute_curve(&mut graph, &order).unwrap();

        let json = serde_json::to_string(&curve).unwrap();
        let back: RobustnessCurve = serde_json::from_str(&json).unwrap();

        assert_eq!(back.fractions, curve.fractions);
        assert_eq!(back.lcc_size, curve.lcc_size);
        assert_eq!(back.lcc_norm, curve.lcc_norm);
        assert_eq!(back.diameter, curve.diameter);
        assert_eq!(back.diameter_exact, curve.diameter_exact);
    }

    #[test]
    fn attack_order_round_trips_through_json() {
        let mut graph = cycle_with_pendant();
        let order = rank_nodes(&mut graph, AttackStrategy::PageRank);

        let json = serde_json::to_string(&order).unwrap();
        let back: redoubt::attack::AttackOrder<u32> = serde_json::from_str(&json).unwrap();

        assert_eq!(back.nodes, order.nodes);
        assert_eq!(back.approximate, order.approximate);
    }
}
