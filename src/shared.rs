//! # Summary
//!
//! This module implements the table of per-instance acceptor state shared
//! between the acceptor handlers, every running proposer, and the
//! application. We wrap the central `Table` type with Arc<RwLock<T>>: handlers
//! and eviction take the write lock, lookups take the read lock.

use std::sync::Arc;

use hashbrown::HashMap as Map;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::message::{Ballot, Seq};
use crate::state;

/// Thread-safe wrapper around the instance `Table`.
#[derive(Derivative)]
#[derivative(Clone(bound = ""))]
pub struct Shared<V: state::Value>(Arc<RwLock<Table<V>>>);

impl<V: state::Value> Shared<V> {

    /// Initializes an empty table for peer `id` out of `count` peers.
    pub fn new(id: usize, count: usize) -> Self {
        Shared(Arc::new(RwLock::new(Table::new(id, count))))
    }

    /// Acquires a read lock on the underlying table.
    pub fn read(&self) -> RwLockReadGuard<Table<V>> {
        self.0.read()
    }

    /// Acquires a write lock on the underlying table.
    pub fn write(&self) -> RwLockWriteGuard<Table<V>> {
        self.0.write()
    }
}

/// Acceptor state for one sequence number.
#[derive(Derivative)]
#[derivative(Default(bound = ""), Debug(bound = ""))]
pub struct Instance<V: state::Value> {
    pub status: state::Status,
    pub value: Option<V>,
    pub promised: Ballot,
    pub accepted: Ballot,
}

/// Instances known to this peer, and what every peer has declared done.
pub struct Table<V: state::Value> {
    id: usize,
    instances: Map<Seq, Instance<V>>,
    /// `None` until the peer has called `done` at least once.
    done: Vec<Option<Seq>>,
}

impl<V: state::Value> Table<V> {

    fn new(id: usize, count: usize) -> Self {
        Table {
            id,
            instances: Map::default(),
            done: vec![None; count],
        }
    }

    /// Returns the instance for `seq`, creating it if this is the first message about it.
    pub fn instance(&mut self, seq: Seq) -> &mut Instance<V> {
        self.instances.entry(seq).or_default()
    }

    /// Decided value of `seq`, if any.
    pub fn status(&self, seq: Seq) -> Option<V> {
        self.instances
            .get(&seq)
            .filter(|instance| instance.status == state::Status::Decided)
            .and_then(|instance| instance.value.clone())
    }

    /// Highest sequence number present, or zero.
    pub fn max(&self) -> Seq {
        self.instances.keys().max().copied().unwrap_or(0)
    }

    /// This peer's own done watermark.
    pub fn watermark(&self) -> Option<Seq> {
        self.done[self.id]
    }

    /// Raises this peer's watermark to `seq`. Never lowers it.
    pub fn done(&mut self, seq: Seq) {
        let id = self.id;
        self.learn(id, Some(seq));
    }

    /// Records a watermark piggybacked by `peer`. Stale watermarks delivered
    /// out of order are ignored, so `min` never moves backwards.
    pub fn learn(&mut self, peer: usize, done: Option<Seq>) {
        if let Some(current) = self.done.get_mut(peer) {
            if done > *current {
                *current = done;
            }
        }
    }

    /// Forgets every decided instance below the lowest watermark across all
    /// peers, and returns one more than that watermark.
    ///
    /// Stays at zero until every peer has been heard from.
    pub fn forget(&mut self) -> Seq {
        let low = match self.done.iter().min().copied().flatten() {
        | Some(low) => low,
        | None => return 0,
        };
        self.instances.retain(|seq, instance| {
            *seq >= low || instance.status == state::Status::Undecided
        });
        low + 1
    }
}
