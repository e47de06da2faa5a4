/// Assert that two sessions that reached the same frame agree on the world
#[macro_export]
macro_rules! assert_same_world_at {
    ($left:expr, $right:expr) => {
        assert_eq!(
            $left.current_frame(),
            $right.current_frame(),
            "sessions are at different frames"
        );
        assert_eq!(
            $left.state().fingerprint(),
            $right.state().fingerprint(),
            "worlds differ at frame {}",
            $left.current_frame()
        );
    };
}

/// Assert that a session verified fingerprints and never saw a mismatch
#[macro_export]
macro_rules! assert_in_agreement {
    ($session:expr) => {
        assert!(
            $session.hash_successes() > 0,
            "no fingerprint was ever verified"
        );
        assert_eq!(
            $session.hash_failures(),
            0,
            "fingerprint mismatches were detected"
        );
    };
}
