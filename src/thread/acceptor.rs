//! # Summary
//!
//! This module defines the `Acceptor` struct, which acts as Paxos's
//! distributed memory. Acceptors keep track of the highest ballot promised
//! and the most recently accepted value for each instance, and learn decided
//! values and peer watermarks from `Decide` messages.
//!
//! Each handler runs entirely under the table's write lock. Mutation only
//! happens on the accepting branch of a ballot comparison.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::message::{self, Code};
use crate::shared;
use crate::state;

/// Passive half of a peer.
#[derive(Derivative)]
#[derivative(Clone(bound = ""))]
pub struct Acceptor<V: state::Value> {
    /// Index of this peer
    id: usize,

    /// Instance table shared with proposers and the application
    shared: shared::Shared<V>,

    /// Set once by `kill`; remote requests are refused afterwards
    dead: Arc<AtomicBool>,

    /// Remote requests served so far
    rpc_count: Arc<AtomicUsize>,
}

impl<V: state::Value> Acceptor<V> {

    pub fn new(id: usize, shared: shared::Shared<V>) -> Self {
        Acceptor {
            id,
            shared,
            dead: Arc::default(),
            rpc_count: Arc::default(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn shared(&self) -> &shared::Shared<V> {
        &self.shared
    }

    pub fn kill(&self) {
        self.dead.store(true, Ordering::SeqCst);
    }

    pub fn is_dead(&self) -> bool {
        self.dead.load(Ordering::SeqCst)
    }

    pub fn rpc_count(&self) -> usize {
        self.rpc_count.load(Ordering::SeqCst)
    }

    /// Entry point for requests arriving from another peer.
    /// Returns `None` once this peer has been killed.
    pub fn serve(&self, request: message::Request<V>) -> Option<message::Response<V>> {
        if self.is_dead() {
            return None
        }
        self.rpc_count.fetch_add(1, Ordering::SeqCst);
        Some(self.handle(request))
    }

    /// Dispatches a request to the matching handler.
    pub fn handle(&self, request: message::Request<V>) -> message::Response<V> {
        trace!("{} received {:?}", self.id, request);
        match request {
        | message::Request::Prepare(prepare) => message::Response::Prepare(self.prepare(prepare)),
        | message::Request::Accept(accept) => message::Response::Accept(self.accept(accept)),
        | message::Request::Decide(decide) => message::Response::Decide(self.decide(decide)),
        }
    }

    /// Promises not to accept anything below `prepare.ballot`, unless an
    /// equal or higher promise has already been made. Always reports the
    /// most recently accepted value and its ballot.
    pub fn prepare(&self, prepare: message::Prepare) -> message::PrepareReply<V> {
        let mut table = self.shared.write();
        let instance = table.instance(prepare.seq);
        let code = if prepare.ballot >= instance.promised {
            instance.promised = prepare.ballot;
            Code::Ok
        } else {
            Code::Rejected
        };
        message::PrepareReply {
            code,
            value: instance.value.clone(),
            ballot: instance.accepted,
        }
    }

    /// Accepts `accept.value` unless a higher ballot has been promised.
    pub fn accept(&self, accept: message::Accept<V>) -> message::AcceptReply {
        let mut table = self.shared.write();
        let instance = table.instance(accept.seq);
        if accept.ballot < instance.promised {
            return message::AcceptReply { code: Code::Rejected }
        }
        instance.promised = accept.ballot;
        instance.accepted = accept.ballot;
        if instance.status == state::Status::Undecided {
            instance.value = Some(accept.value);
        }
        message::AcceptReply { code: Code::Ok }
    }

    /// Records a chosen value regardless of ballots, along with the sender's watermark.
    ///
    /// The watermark is only ever raised: a stale `Decide` arriving after a
    /// newer one leaves it alone, so `min` cannot move backwards.
    pub fn decide(&self, decide: message::Decide<V>) -> message::DecideReply {
        let mut table = self.shared.write();
        let instance = table.instance(decide.seq);
        instance.status = state::Status::Decided;
        instance.value = Some(decide.value);
        table.learn(decide.sender, decide.done);
        message::DecideReply
    }
}
