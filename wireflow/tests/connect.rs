mod common;

use common::{LoopUnit, NumberRelay, NumberSink, NumberSource, TextSink};
use std::sync::Arc;
use wireflow::{Address, Capacity, Error, Graph, GraphConfig, Wirable};

#[test]
fn fan_out_shares_one_channel() {
    let mut graph = Graph::new();
    graph.add("a", NumberSource::new());
    graph.add("b", NumberSink::new());
    graph.add("c", NumberSink::new());

    graph
        .connect_buf("a", "out", "b", "in", Capacity::Bounded(4))
        .unwrap();
    graph
        .connect_buf("a", "out", "c", "in", Capacity::Bounded(4))
        .unwrap();

    let conns = graph.connections();
    assert_eq!(conns.len(), 2);
    assert_eq!(conns[0].channel(), conns[1].channel());
    assert_eq!(graph.sender_count(conns[0].channel()), 1);
}

#[test]
fn fan_in_counts_every_sender() {
    let mut graph = Graph::new();
    graph.add("a", NumberSource::new());
    graph.add("c", NumberSource::new());
    graph.add("b", NumberSink::new());

    graph
        .connect_buf("a", "out", "b", "in", Capacity::Bounded(4))
        .unwrap();
    graph
        .connect_buf("c", "out", "b", "in", Capacity::Bounded(4))
        .unwrap();

    let conns = graph.connections();
    assert_eq!(conns.len(), 2);
    assert_eq!(conns[0].channel(), conns[1].channel());
    assert_eq!(graph.sender_count(conns[0].channel()), 2);
}

#[test]
fn requested_capacity_sizes_only_fresh_channels() {
    let mut graph = Graph::new();
    graph.add("a", NumberSource::new());
    graph.add("b", NumberSink::new());
    graph.add("c", NumberSink::new());

    graph
        .connect_buf("a", "out", "b", "in", Capacity::Bounded(10))
        .unwrap();
    graph
        .connect_buf("a", "out", "c", "in", Capacity::Bounded(99))
        .unwrap();

    let conns = graph.connections();
    assert_eq!(conns[0].channel().capacity(), Capacity::Bounded(10));
    assert_eq!(conns[1].channel().capacity(), Capacity::Bounded(10));
    // the record keeps what was asked for, the channel keeps what it got
    assert_eq!(conns[1].capacity(), Capacity::Bounded(99));
}

#[test]
fn default_buffer_size_comes_from_config() {
    let mut graph = Graph::with_config(GraphConfig {
        buffer_size: Capacity::Bounded(7),
    });
    graph.add("a", NumberSource::new());
    graph.add("b", NumberSink::new());

    graph.connect("a", "out", "b", "in").unwrap();
    assert_eq!(
        graph.connections()[0].channel().capacity(),
        Capacity::Bounded(7)
    );
}

#[test]
fn unknown_process_and_port_are_reported() {
    let mut graph = Graph::new();
    graph.add("a", NumberSource::new());
    graph.add("b", NumberSink::new());

    let err = graph.connect("x", "out", "b", "in").unwrap_err();
    assert!(matches!(err, Error::ProcessNotFound { .. }));

    let err = graph.connect("a", "nope", "b", "in").unwrap_err();
    assert!(matches!(err, Error::PortNotFound { .. }));

    let err = graph.connect("a", "out", "b", "nope").unwrap_err();
    assert!(matches!(err, Error::PortNotFound { .. }));

    assert!(graph.connections().is_empty());
}

#[test]
fn wrong_direction_leaves_the_graph_unchanged() {
    let mut graph = Graph::new();
    graph.add("a", NumberSink::new());
    graph.add("b", NumberSink::new());

    // a's only port receives; using it as the sending end must fail
    let err = graph
        .connect_buf("a", "in", "b", "in", Capacity::Bounded(1))
        .unwrap_err();
    assert!(matches!(err, Error::PortWrongDirection { .. }));
    assert!(graph.connections().is_empty());

    // the sink stayed unwired and can still take a proper connection
    graph.add("src", NumberSource::new());
    graph
        .connect_buf("src", "out", "a", "in", Capacity::Bounded(1))
        .unwrap();
    assert_eq!(graph.connections().len(), 1);
}

#[test]
fn aliased_shared_node_is_not_settable() {
    let mut graph = Graph::new();
    let outside: Arc<dyn Wirable> = Arc::new(NumberSink::new());
    graph.add("a", NumberSource::new());
    graph.add_shared("b", outside.clone());
    assert!(graph.contains("b"));

    let err = graph
        .connect_buf("a", "out", "b", "in", Capacity::Bounded(1))
        .unwrap_err();
    assert!(matches!(err, Error::ProcessNotSettable { .. }));
    assert!(graph.connections().is_empty());

    // once the outside alias is gone the same call wires fine
    drop(outside);
    graph
        .connect_buf("a", "out", "b", "in", Capacity::Bounded(1))
        .unwrap();
    assert_eq!(graph.connections().len(), 1);
}

#[test]
fn type_mismatch_rolls_the_sender_back() {
    let mut graph = Graph::new();
    graph.add("a", NumberSource::new());
    graph.add("t", TextSink::new());
    graph.add("b", NumberSink::new());

    let err = graph
        .connect_buf("a", "out", "t", "in", Capacity::Bounded(1))
        .unwrap_err();
    assert!(matches!(err, Error::ChannelTypeMismatch { .. }));
    assert!(graph.connections().is_empty());

    // the rolled-back sender slot is free to take a fresh channel
    graph
        .connect_buf("a", "out", "b", "in", Capacity::Bounded(1))
        .unwrap();
    assert_eq!(graph.connections().len(), 1);
}

#[test]
fn conflicting_receiver_keeps_earlier_wiring_intact() {
    let mut graph = Graph::new();
    graph.add("a", NumberSource::new());
    graph.add("c", NumberSource::new());
    graph.add("b", NumberSink::new());
    graph.add("d", NumberSink::new());

    graph
        .connect_buf("a", "out", "b", "in", Capacity::Bounded(1))
        .unwrap();
    graph
        .connect_buf("c", "out", "d", "in", Capacity::Bounded(1))
        .unwrap();

    // a.out is glued to b's channel and d.in to c's; they cannot meet
    let err = graph
        .connect_buf("a", "out", "d", "in", Capacity::Bounded(1))
        .unwrap_err();
    assert!(matches!(err, Error::PortNotAssignable { .. }));

    let conns = graph.connections();
    assert_eq!(conns.len(), 2);
    assert_eq!(graph.sender_count(conns[0].channel()), 1);
    assert_eq!(graph.sender_count(conns[1].channel()), 1);
}

#[test]
fn failed_sender_attach_reverts_the_fan_in_count() {
    let mut graph = Graph::new();
    graph.add("a", NumberSource::new());
    graph.add("b", NumberSink::new());
    graph.add("x", NumberSink::new());

    graph
        .connect_buf("a", "out", "b", "in", Capacity::Bounded(1))
        .unwrap();

    // x would join b's inbound channel as a sender, but its only port
    // receives
    let err = graph
        .connect_buf("x", "in", "b", "in", Capacity::Bounded(1))
        .unwrap_err();
    assert!(matches!(err, Error::PortWrongDirection { .. }));

    let conns = graph.connections();
    assert_eq!(conns.len(), 1);
    assert_eq!(graph.sender_count(conns[0].channel()), 1);
}

#[test]
fn keyed_addresses_reuse_by_exact_key() {
    let mut graph = Graph::new();
    graph.add("a", NumberSource::new());
    graph.add("b", NumberSink::new());
    graph.add("c", NumberSink::new());

    graph
        .connect_buf("a", "out[x]", "b", "in", Capacity::Bounded(1))
        .unwrap();
    graph
        .connect_buf("a", "out[x]", "c", "in", Capacity::Bounded(1))
        .unwrap();

    let conns = graph.connections();
    assert_eq!(conns[0].channel(), conns[1].channel());
    assert_eq!(conns[0].source(), &Address::parse("a", "out[x]"));
    assert_eq!(conns[0].source(), conns[1].source());
}

#[test]
fn distinct_keys_do_not_share_a_member_slot() {
    let mut graph = Graph::new();
    graph.add("a", NumberSource::new());
    graph.add("b", NumberSink::new());
    graph.add("c", NumberSink::new());

    graph
        .connect_buf("a", "out[x]", "b", "in", Capacity::Bounded(1))
        .unwrap();

    // out[y] is a different reuse identity but the same member slot
    let err = graph
        .connect_buf("a", "out[y]", "c", "in", Capacity::Bounded(1))
        .unwrap_err();
    assert!(matches!(err, Error::PortNotAssignable { .. }));
    assert_eq!(graph.connections().len(), 1);
}

#[test]
fn unit_can_feed_itself() {
    let mut graph = Graph::new();
    graph.add("relay", NumberRelay::new());

    graph
        .connect_buf("relay", "out", "relay", "in", Capacity::Bounded(2))
        .unwrap();

    let conn = &graph.connections()[0];
    assert_eq!(conn.source(), &Address::parse("relay", "out"));
    assert_eq!(conn.target(), &Address::parse("relay", "in"));
}

#[test]
fn duplex_port_serves_either_end() {
    let mut graph = Graph::new();
    graph.add("lp", LoopUnit::new());
    graph.add("snk", NumberSink::new());
    graph
        .connect_buf("lp", "loop", "snk", "in", Capacity::Bounded(1))
        .unwrap();

    let mut graph = Graph::new();
    graph.add("lp", LoopUnit::new());
    graph.add("src", NumberSource::new());
    graph
        .connect_buf("src", "out", "lp", "loop", Capacity::Bounded(1))
        .unwrap();
}

#[test]
fn self_loop_over_one_duplex_port() {
    let mut graph = Graph::new();
    graph.add("lp", LoopUnit::new());

    graph
        .connect_buf("lp", "loop", "lp", "loop", Capacity::Bounded(2))
        .unwrap();

    let conn = &graph.connections()[0];
    assert_eq!(conn.source(), conn.target());
    assert_eq!(graph.sender_count(conn.channel()), 1);
}

#[test]
fn connections_keep_call_order() {
    let mut graph = Graph::new();
    graph.add("a", NumberSource::new());
    graph.add("b", NumberRelay::new());
    graph.add("c", NumberSink::new());

    graph
        .connect_buf("a", "out", "b", "in", Capacity::Bounded(1))
        .unwrap();
    graph
        .connect_buf("b", "out", "c", "in", Capacity::Bounded(1))
        .unwrap();

    let rendered: Vec<_> = graph
        .connections()
        .iter()
        .map(|conn| conn.to_string())
        .collect();
    assert_eq!(rendered, ["a.out -> b.in", "b.out -> c.in"]);
}
