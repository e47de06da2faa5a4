pub mod assertions;
pub mod peer_pair;
pub mod relay_harness;
pub mod test_clock;

pub use peer_pair::{peer_config, PeerPair};
pub use relay_harness::RelayHarness;
pub use test_clock::{TestClock, FRAME};
