/// PROPERTY-BASED TESTS: command queue and framing invariants
///
/// Key invariants:
/// 1. The checksum is a pure function of id, length and payload, and any
///    single-byte payload change alters it
/// 2. One scheduling pass never puts more than the byte budget on the wire,
///    and always has room for at least one packet
/// 3. Lossy commands leave the queue after their first attempt
/// 4. Lossless commands leave the queue only when acknowledged
/// 5. Repeated ACKs resolve a send exactly once

use proptest::prelude::*;

use cmdlink_shared::{
    checksum, AckPayload, CmdQueueConfig, Command, Destination, LocalNetwork, Packet,
    LONG_PACKET_LENGTH, MAX_FRAME_SIZE,
};
use cmdlink_test::{message_packet, sync_packet, CompletionLog, TestPeer};

fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=LONG_PACKET_LENGTH)
}

proptest! {
    #[test]
    fn prop_checksum_is_pure(id in any::<u32>(), data in payload_strategy()) {
        let length = data.len() as u8;
        prop_assert_eq!(checksum(id, length, &data), checksum(id, length, &data));

        let mut sealed = Packet::with_length(&data).unwrap();
        sealed.set_id(id);
        sealed.seal();
        prop_assert!(sealed.verify_checksum().is_ok());
        let parsed = Packet::from_bytes(&sealed.to_bytes()).unwrap();
        prop_assert_eq!(parsed.header().checksum, sealed.header().checksum);
    }

    #[test]
    fn prop_checksum_detects_single_byte_change(
        id in any::<u32>(),
        data in payload_strategy(),
        position in any::<prop::sample::Index>(),
        delta in 1u8..=255,
    ) {
        let length = data.len() as u8;
        let position = position.index(data.len());
        let mut mutated = data.clone();
        mutated[position] = mutated[position].wrapping_add(delta);

        prop_assert_ne!(checksum(id, length, &data), checksum(id, length, &mutated));
    }

    #[test]
    fn prop_budget_is_never_exceeded(
        budget in 24usize..600,
        kinds in prop::collection::vec(any::<bool>(), 1..30),
    ) {
        let network = LocalNetwork::new();
        let config = CmdQueueConfig {
            bytes_per_tick: budget,
            ..CmdQueueConfig::default()
        };
        let mut a = TestPeer::with_config(&network, 1, config);
        let b = TestPeer::new(&network, 2);

        for (sequence, long) in kinds.iter().enumerate() {
            let packet = if *long {
                message_packet("payload")
            } else {
                sync_packet(0, sequence as u16)
            };
            a.queue.enqueue(packet, Destination::Unicast(b.address), 140, 0, None);
        }

        // every pass fits at least one packet, so each entry goes out once
        // within kinds.len() passes
        let effective = budget.max(MAX_FRAME_SIZE) as u64;
        let mut previous = 0;
        for now in 1..=kinds.len() as u32 {
            a.queue.schedule_sends(now);
            let sent = a.queue.stats().bytes_sent;
            prop_assert!(sent - previous <= effective);
            previous = sent;
        }
        prop_assert_eq!(a.queue.stats().packets_sent, kinds.len() as u64);
    }

    #[test]
    fn prop_lossy_sent_at_most_once(
        count in 1usize..20,
        failing in prop::collection::vec(any::<bool>(), 1..10),
    ) {
        let network = LocalNetwork::new();
        let mut a = TestPeer::new(&network, 1);
        let b = TestPeer::new(&network, 2);
        let log = CompletionLog::new();

        for sequence in 0..count {
            a.queue.enqueue(
                sync_packet(0, sequence as u16),
                Destination::Unicast(b.address),
                1,
                0,
                Some(log.callback()),
            );
        }

        for (now, fail) in failing.iter().enumerate() {
            network.set_send_failure(&a.address, *fail);
            a.tick(now as u32 + 1);
            prop_assert_eq!(a.queue.pending(Command::Sync), 0);
        }

        let delivered = network.inbox_len(&b.address);
        prop_assert!(delivered == 0 || delivered == count);
        prop_assert_eq!(log.len(), count);
        prop_assert_eq!(
            a.queue.stats().packets_sent + a.queue.stats().send_failures,
            count as u64
        );
    }

    #[test]
    fn prop_lossless_waits_for_ack(
        count in 1usize..10,
        failing in prop::collection::vec(any::<bool>(), 1..60),
    ) {
        let network = LocalNetwork::new();
        let mut a = TestPeer::new(&network, 1);
        let b = TestPeer::new(&network, 2);

        for _ in 0..count {
            a.queue.enqueue(
                message_packet("hold"),
                Destination::Unicast(b.address),
                3,
                0,
                None,
            );
        }

        for (now, fail) in failing.iter().enumerate() {
            network.set_send_failure(&a.address, *fail);
            a.tick(now as u32 + 1);
            prop_assert_eq!(a.queue.pending(Command::Message), count);
        }
    }

    #[test]
    fn prop_repeated_acks_resolve_once(count in 1usize..8, repeats in 1usize..5) {
        let network = LocalNetwork::new();
        let mut a = TestPeer::new(&network, 1);
        let b = TestPeer::new(&network, 2);
        let log = CompletionLog::new();

        let ids: Vec<u32> = (0..count)
            .map(|_| {
                a.queue.enqueue(
                    message_packet("ack me"),
                    Destination::Unicast(b.address),
                    140,
                    0,
                    Some(log.callback()),
                )
            })
            .collect();
        a.tick(1);

        for _ in 0..repeats {
            for id in &ids {
                let mut ack = Packet::from_payload(&AckPayload {
                    command: Command::Message,
                    id: *id,
                });
                ack.set_sender(b.address);
                ack.seal();
                network.inject(&a.address, &ack.to_bytes());
            }
        }
        a.queue.process_receives();

        prop_assert_eq!(log.len(), count);
        prop_assert_eq!(a.queue.pending(Command::Message), 0);
        prop_assert_eq!(a.queue.stats().acks_matched, count as u64);
        prop_assert_eq!(
            a.queue.stats().acks_unmatched,
            ((repeats - 1) * count) as u64
        );
    }
}
