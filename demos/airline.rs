use redoubt::{
    attack::{rank_nodes, AttackStrategy},
    curve::compute_curve,
    edge::Edge,
    graph::Graph,
    resistance::{reinforce_ter, TerParams},
    route::{analyze_route, transit_fragility},
    schneider::{optimize_schneider, SchneiderParams},
};

// A mock airline network: three hub airports in a triangle, each serving a
// ring of regional spokes, plus one thin connection to a remote outpost.
fn build_network() -> Graph<&'static str> {
    let mut graph = Graph::new();

    let hubs = ["ATL", "ORD", "DFW"];
    let spokes = [
        ("ATL", ["AVL", "CHS", "SAV", "TYS"]),
        ("ORD", ["GRB", "MSN", "FWA", "CID"]),
        ("DFW", ["ABI", "LBB", "SHV", "TXK"]),
    ];

    for window in hubs.windows(2) {
        graph.insert(Edge::new(window[0], window[1]));
    }
    graph.insert(Edge::new(hubs[0], hubs[2]));

    for (hub, regionals) in spokes {
        for airport in regionals {
            graph.insert(Edge::new(hub, airport));
        }
    }

    // Regional ring segments, so losing a hub isn't always fatal.
    graph.insert(Edge::new("AVL", "TYS"));
    graph.insert(Edge::new("GRB", "MSN"));

    // The outpost hangs off a single spoke.
    graph.insert(Edge::new("TXK", "ELD"));

    graph
}

fn main() {
    let mut graph = build_network();
    println!(
        "Airline network: {} airports, {} routes\n",
        graph.vertex_count(),
        graph.edge_count()
    );

    // Compare attack strategies by their robustness index.
    let strategies = [
        ("random", AttackStrategy::Random { seed: 1 }),
        ("degree", AttackStrategy::Degree { adaptive: false }),
        ("degree (adaptive)", AttackStrategy::Degree { adaptive: true }),
        ("pagerank", AttackStrategy::PageRank),
        ("betweenness", AttackStrategy::Betweenness),
    ];

    println!("Attack simulation:");
    for (name, strategy) in strategies {
        let order = rank_nodes(&mut graph, strategy);
        let curve = compute_curve(&mut graph, &order).expect("order is a permutation");
        let r = curve.r_index().expect("curve is well-formed");

        println!(
            "  {name:<18} R = {r:.4}, first to fall: {:?}",
            &order.nodes[..3]
        );
    }

    // Harden the schedule without adding a single flight: rewire.
    let params = SchneiderParams {
        max_trials: 2_000,
        seed: 7,
        ..Default::default()
    };
    let (_, report) = optimize_schneider(&mut graph, &params).expect("degree strategy");
    println!(
        "\nEdge-swap hardening: R {:.4} -> {:.4} ({} swaps over {} trials)",
        report.initial_r, report.r_best, report.accepted_swaps, report.trials
    );

    // Or add a handful of new routes where the network is weakest.
    let params = TerParams {
        k: 3,
        ..Default::default()
    };
    let (_, proposals) = reinforce_ter(&mut graph, &params, None);
    println!("\nProposed reinforcement routes:");
    for proposal in proposals {
        println!(
            "  {} - {} (effective resistance {:.3})",
            proposal.source, proposal.target, proposal.resistance
        );
    }

    // Zoom in on a single itinerary.
    let report = analyze_route(&mut graph, "AVL", "ELD").expect("both airports exist");
    println!(
        "\nAVL -> ELD: {} hops via {:?} ({} shortest routings)",
        report.hops.expect("route exists"),
        report.path.as_ref().expect("route exists"),
        report.num_shortest_paths
    );

    for impact in transit_fragility(&mut graph, "AVL", "ELD").expect("both airports exist") {
        match impact.report.hops {
            Some(hops) => println!("  without {}: {hops} hops", impact.removed),
            None => println!("  without {}: unreachable", impact.removed),
        }
    }
}
