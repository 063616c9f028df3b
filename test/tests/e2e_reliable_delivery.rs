//! End-to-end delivery through two command queues on a local network:
//! lossless commands are retried until acknowledged, lossy ones go out once.

use cmdlink_shared::{
    AckPayload, CmdQueueConfig, Command, Destination, LocalNetwork, Packet, SendOutcome,
    TownUiMessage, MAX_FRAME_SIZE,
};
use cmdlink_test::{
    assert_pending, assert_queue_empty, message_packet, sync_packet, CompletionLog, TestPeer,
};

fn ack_from(peer: &TestPeer, command: Command, id: u32) -> Vec<u8> {
    let mut ack = Packet::from_payload(&AckPayload { command, id });
    ack.set_id(9_000);
    ack.set_sender(peer.address);
    ack.seal();
    ack.to_bytes()
}

#[test]
fn lossless_message_is_retained_until_acked() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();

    let network = LocalNetwork::new();
    let mut a = TestPeer::new(&network, 1);
    let b = TestPeer::new(&network, 2);
    let log = CompletionLog::new();

    let id = a.queue.enqueue(
        message_packet("hello"),
        Destination::Unicast(b.address),
        140,
        7,
        Some(log.callback()),
    );

    a.tick(1);
    assert_pending!(a.queue, Command::Message, 1);
    let entry = a.queue.entry(Command::Message, id).unwrap();
    assert_eq!(entry.retry_at(), Some(141));
    assert_eq!(entry.attempts(), 1);
    assert!(log.is_empty());

    // well-formed ACK for (MESSAGE, id) from b
    network.inject(&a.address, &ack_from(&b, Command::Message, id));
    a.queue.process_receives();

    assert_pending!(a.queue, Command::Message, 0);
    assert_eq!(log.outcomes(), vec![(SendOutcome::Acknowledged, 7, id)]);
    assert_eq!(a.queue.stats().acks_matched, 1);
}

#[test]
fn receiver_acks_and_dispatches() {
    let network = LocalNetwork::new();
    let mut a = TestPeer::new(&network, 1);
    let mut b = TestPeer::new(&network, 2);
    let log = CompletionLog::new();

    let id = a.queue.enqueue(
        message_packet("hello"),
        Destination::Unicast(b.address),
        140,
        0,
        Some(log.callback()),
    );
    a.tick(1);
    b.tick(1);

    let received = b.recorder.of(Command::Message);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].id, id);
    assert_eq!(received[0].sender, a.address);
    // the ACK is lossy: gone from b's queue once transmitted
    assert_queue_empty!(b.queue);
    assert_eq!(b.queue.stats().acks_sent, 1);

    a.tick(2);
    assert_queue_empty!(a.queue);
    assert_eq!(log.len(), 1);
    assert_eq!(a.recorder.count(Command::Ack), 0);
}

#[test]
fn retransmission_reuses_packet_id() {
    let network = LocalNetwork::new();
    let mut a = TestPeer::new(&network, 1);
    let b = TestPeer::new(&network, 2);

    let id = a.queue.enqueue(
        message_packet("again"),
        Destination::Unicast(b.address),
        140,
        0,
        None,
    );
    a.tick(1);
    assert_eq!(network.take_inbox(&b.address).len(), 1);

    for now in 2..141 {
        a.tick(now);
    }
    assert_eq!(network.inbox_len(&b.address), 0);

    a.tick(141);
    let blocks = network.take_inbox(&b.address);
    assert_eq!(blocks.len(), 1);
    let retransmitted = Packet::from_bytes(&blocks[0]).unwrap();
    assert_eq!(retransmitted.id(), id);
    assert!(retransmitted.verify_checksum().is_ok());
    assert_eq!(a.queue.stats().retransmissions, 1);
    assert_eq!(a.queue.entry(Command::Message, id).unwrap().retry_at(), Some(281));
}

#[test]
fn duplicate_and_unmatched_acks_are_noops() {
    let network = LocalNetwork::new();
    let mut a = TestPeer::new(&network, 1);
    let b = TestPeer::new(&network, 2);
    let log = CompletionLog::new();

    let id = a.queue.enqueue(
        message_packet("once"),
        Destination::Unicast(b.address),
        140,
        0,
        Some(log.callback()),
    );
    let other = a.queue.enqueue(
        message_packet("twice"),
        Destination::Unicast(b.address),
        140,
        0,
        None,
    );
    a.tick(1);

    let ack = ack_from(&b, Command::Message, id);
    network.inject(&a.address, &ack);
    network.inject(&a.address, &ack);
    network.inject(&a.address, &ack_from(&b, Command::Message, 12_345));
    a.queue.process_receives();

    assert_eq!(log.len(), 1);
    assert!(a.queue.is_pending(Command::Message, other));
    assert!(!a.queue.is_pending(Command::Message, id));
    assert_eq!(a.queue.stats().acks_matched, 1);
    assert_eq!(a.queue.stats().acks_unmatched, 2);
}

#[test]
fn ack_for_lossy_command_type_is_ignored() {
    let network = LocalNetwork::new();
    let mut a = TestPeer::new(&network, 1);
    let b = TestPeer::new(&network, 2);

    let id = a.queue.enqueue(
        message_packet("keep"),
        Destination::Unicast(b.address),
        140,
        0,
        None,
    );
    a.tick(1);

    network.inject(&a.address, &ack_from(&b, Command::Sync, id));
    a.queue.process_receives();

    assert!(a.queue.is_pending(Command::Message, id));
    assert_eq!(a.queue.stats().acks_unmatched, 1);
}

#[test]
fn lossy_sync_is_sent_once_and_never_acked() {
    let network = LocalNetwork::new();
    let mut a = TestPeer::new(&network, 1);
    let mut b = TestPeer::new(&network, 2);
    let log = CompletionLog::new();

    let id = a.queue.enqueue(
        sync_packet(10, 1),
        Destination::Unicast(b.address),
        140,
        3,
        Some(log.callback()),
    );
    a.tick(1);
    assert_pending!(a.queue, Command::Sync, 0);
    assert_eq!(log.outcomes(), vec![(SendOutcome::Transmitted, 3, id)]);

    b.tick(1);
    assert_eq!(b.recorder.count(Command::Sync), 1);
    assert_queue_empty!(b.queue);
    assert_eq!(b.queue.stats().acks_sent, 0);
    assert_eq!(network.inbox_len(&a.address), 0);

    for now in 2..300 {
        a.tick(now);
    }
    assert_eq!(network.sent(&a.address), 1);
}

#[test]
fn lossy_sync_is_dropped_on_send_failure() {
    let network = LocalNetwork::new();
    let mut a = TestPeer::new(&network, 1);
    let b = TestPeer::new(&network, 2);
    let log = CompletionLog::new();
    network.set_send_failure(&a.address, true);

    let id = a.queue.enqueue(
        sync_packet(10, 1),
        Destination::Unicast(b.address),
        140,
        0,
        Some(log.callback()),
    );
    a.tick(1);

    assert_pending!(a.queue, Command::Sync, 0);
    assert_eq!(log.outcomes(), vec![(SendOutcome::Dropped, 0, id)]);
    assert_eq!(a.queue.stats().lossy_dropped, 1);
    assert_eq!(a.queue.stats().send_failures, 1);

    network.set_send_failure(&a.address, false);
    a.tick(2);
    assert_eq!(network.inbox_len(&b.address), 0);
}

#[test]
fn lossless_survives_send_failure() {
    let network = LocalNetwork::new();
    let mut a = TestPeer::new(&network, 1);
    let mut b = TestPeer::new(&network, 2);
    network.set_send_failure(&a.address, true);

    let id = a.queue.enqueue(
        message_packet("persist"),
        Destination::Unicast(b.address),
        20,
        0,
        None,
    );
    a.tick(1);
    assert!(a.queue.is_pending(Command::Message, id));
    assert_eq!(a.queue.entry(Command::Message, id).unwrap().retry_at(), Some(21));

    network.set_send_failure(&a.address, false);
    for now in 2..21 {
        a.tick(now);
    }
    assert_eq!(network.inbox_len(&b.address), 0);

    a.tick(21);
    b.tick(21);
    a.tick(22);
    assert_eq!(b.recorder.count(Command::Message), 1);
    assert_queue_empty!(a.queue);
}

#[test]
fn broadcast_lossless_is_discarded_after_transmit() {
    let network = LocalNetwork::new();
    let mut a = TestPeer::new(&network, 1);
    let mut b = TestPeer::new(&network, 2);
    let mut c = TestPeer::new(&network, 3);
    let log = CompletionLog::new();

    let id = a.queue.enqueue(
        message_packet("everyone"),
        Destination::Broadcast,
        140,
        0,
        Some(log.callback()),
    );
    a.tick(1);
    assert_queue_empty!(a.queue);
    assert_eq!(log.outcomes(), vec![(SendOutcome::Transmitted, 0, id)]);

    b.tick(1);
    c.tick(1);
    assert_eq!(b.recorder.count(Command::Message), 1);
    assert_eq!(c.recorder.count(Command::Message), 1);

    // both receivers still acknowledge; the ACKs find nothing to resolve
    a.tick(2);
    assert_eq!(a.queue.stats().acks_unmatched, 2);
    assert_eq!(log.len(), 1);
}

#[test]
fn budget_defers_packets_that_do_not_fit() {
    let network = LocalNetwork::new();
    let config = CmdQueueConfig {
        bytes_per_tick: 100,
        ..CmdQueueConfig::default()
    };
    let mut a = TestPeer::with_config(&network, 1, config);
    let b = TestPeer::new(&network, 2);

    let first = a.queue.enqueue(
        message_packet("first"),
        Destination::Unicast(b.address),
        140,
        0,
        None,
    );
    let second = a.queue.enqueue(
        message_packet("second"),
        Destination::Unicast(b.address),
        140,
        0,
        None,
    );

    a.tick(1);
    assert_eq!(network.sent(&a.address), 1);
    assert_eq!(a.queue.stats().bytes_sent, 86);
    assert_eq!(a.queue.entry(Command::Message, first).unwrap().attempts(), 1);
    assert_eq!(a.queue.entry(Command::Message, second).unwrap().attempts(), 0);

    a.tick(2);
    assert_eq!(network.sent(&a.address), 2);
    assert_eq!(a.queue.entry(Command::Message, second).unwrap().attempts(), 1);
}

#[test]
fn budget_stops_scheduling_for_the_tick() {
    let network = LocalNetwork::new();
    let config = CmdQueueConfig {
        bytes_per_tick: 100,
        ..CmdQueueConfig::default()
    };
    let mut a = TestPeer::with_config(&network, 1, config);
    let b = TestPeer::new(&network, 2);

    for sequence in 0..5 {
        a.queue.enqueue(
            sync_packet(1, sequence),
            Destination::Unicast(b.address),
            140,
            0,
            None,
        );
    }

    a.tick(1);
    assert_eq!(a.queue.stats().bytes_sent, 96);
    assert_pending!(a.queue, Command::Sync, 1);

    a.tick(2);
    assert_pending!(a.queue, Command::Sync, 0);
    assert_eq!(network.sent(&a.address), 5);
}

#[test]
fn budget_below_a_long_frame_is_raised() {
    let network = LocalNetwork::new();
    let config = CmdQueueConfig {
        bytes_per_tick: 60,
        ..CmdQueueConfig::default()
    };
    let mut a = TestPeer::with_config(&network, 1, config);
    let b = TestPeer::new(&network, 2);
    assert_eq!(a.queue.config().bytes_per_tick, MAX_FRAME_SIZE);

    let town = a.queue.enqueue(
        Packet::from_payload(&TownUiMessage::new("market")),
        Destination::Unicast(b.address),
        140,
        0,
        None,
    );
    a.queue.enqueue(
        sync_packet(1, 1),
        Destination::Unicast(b.address),
        140,
        0,
        None,
    );

    a.tick(1);
    assert_eq!(a.queue.entry(Command::TownUiMessage, town).unwrap().attempts(), 1);
    assert_eq!(a.queue.stats().bytes_sent, MAX_FRAME_SIZE as u64);

    a.tick(2);
    assert_pending!(a.queue, Command::Sync, 0);
    assert_eq!(network.sent(&a.address), 2);
}

#[test]
fn acks_are_scheduled_before_other_commands() {
    let network = LocalNetwork::new();
    let mut a = TestPeer::new(&network, 1);
    let config = CmdQueueConfig {
        bytes_per_tick: 100,
        ..CmdQueueConfig::default()
    };
    let mut b = TestPeer::with_config(&network, 2, config);

    let reply = b.queue.enqueue(
        message_packet("reply"),
        Destination::Unicast(a.address),
        140,
        0,
        None,
    );
    let id = a.queue.enqueue(
        message_packet("hello"),
        Destination::Unicast(b.address),
        140,
        0,
        None,
    );
    a.tick(1);
    b.tick(1);

    assert_eq!(b.queue.stats().acks_sent, 1);
    assert!(b.queue.is_pending(Command::Message, reply));
    assert_eq!(b.queue.entry(Command::Message, reply).unwrap().attempts(), 0);

    a.tick(2);
    assert!(!a.queue.is_pending(Command::Message, id));
}

#[test]
fn clear_port_discards_everything() {
    let network = LocalNetwork::new();
    let mut a = TestPeer::new(&network, 1);
    let b = TestPeer::new(&network, 2);
    let log = CompletionLog::new();

    for text in ["one", "two"] {
        a.queue.enqueue(
            message_packet(text),
            Destination::Unicast(b.address),
            140,
            0,
            Some(log.callback()),
        );
    }
    a.queue.enqueue(
        sync_packet(1, 1),
        Destination::Unicast(b.address),
        140,
        0,
        Some(log.callback()),
    );
    network.inject(&a.address, &message_packet("late").to_bytes());

    a.queue.clear_port();

    assert_queue_empty!(a.queue);
    assert_eq!(network.inbox_len(&a.address), 0);
    assert!(a.recorder.all().is_empty());
    assert_eq!(log.len(), 3);
    assert!(log
        .outcomes()
        .iter()
        .all(|(outcome, _, _)| *outcome == SendOutcome::Cleared));
}
