//! Strict-majority quorums over a fixed peer set.

/// Number of affirmative votes needed out of `count` peers.
pub fn majority(count: usize) -> usize {
    count / 2 + 1
}

/// Whether `votes` out of `count` peers form a quorum.
pub fn is_majority(votes: usize, count: usize) -> bool {
    votes > count / 2
}
