/// Assert that a queue holds exactly `n` entries for a command type
#[macro_export]
macro_rules! assert_pending {
    ($queue:expr, $command:expr, $n:expr) => {
        assert_eq!(
            $queue.pending($command),
            $n,
            "expected {} pending {:?} entries, found {}",
            $n,
            $command,
            $queue.pending($command)
        );
    };
}

/// Assert that a queue has nothing left to send
#[macro_export]
macro_rules! assert_queue_empty {
    ($queue:expr) => {
        assert_eq!(
            $queue.total_pending(),
            0,
            "expected an empty queue, {} entries pending",
            $queue.total_pending()
        );
    };
}

/// Assert the top-level state of a session
#[macro_export]
macro_rules! assert_session_state {
    ($session:expr, $state:expr) => {
        assert_eq!(
            $session.state(),
            Some($state),
            "session in {:?} (phase state {:?}), expected {:?}",
            $session.state(),
            $session.phase_state(),
            $state
        );
    };
}
