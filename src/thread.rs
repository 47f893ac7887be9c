//! # Summary
//!
//! This module contains the roles each peer plays in the protocol.
//!
//! With the exception of `peer`, which serves requests arriving from other
//! servers, each module correlates to a role described in
//! [Paxos Made Moderately Complex][1], applied to one instance at a time.
//!
//! [1]: http://paxos.systems/index.html

/// Distributed memory.
pub(crate) mod acceptor;

/// Value proposer.
pub(crate) mod commander;

/// Peer server communication.
pub(crate) mod peer;

/// Round driver.
pub(crate) mod proposer;

/// Ballot proposer.
pub(crate) mod scout;
