/// Running counters for one port. Never reset by the queue itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Successful transmissions, first attempts and retries alike
    pub packets_sent: u64,
    pub bytes_sent: u64,
    /// Successful transmissions of a packet that had been attempted before
    pub retransmissions: u64,
    /// Transport refusals
    pub send_failures: u64,
    pub acks_sent: u64,
    /// ACKs that resolved a queued send
    pub acks_matched: u64,
    /// Late, duplicate or unknown ACKs
    pub acks_unmatched: u64,
    /// Lossy packets discarded after a refused transmission
    pub lossy_dropped: u64,
    /// Received packets dropped for an out-of-range command or bad payload
    pub invalid_received: u64,
    /// Received blocks dropped for framing errors
    pub malformed_received: u64,
    pub checksum_failures: u64,
    /// Packets handed to a registered handler
    pub dispatched: u64,
}
