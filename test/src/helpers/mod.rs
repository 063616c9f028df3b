pub mod assertions;
pub mod test_peer;

pub use recording::{CompletionLog, Received, Recorder};
pub use session_pair::SessionPair;
pub use test_peer::{message_packet, sync_packet, tick_all, TestPeer};
