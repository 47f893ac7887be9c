//! # Summary
//!
//! Drives one instance to a decision. Each round runs a `Scout` to collect
//! promises and a `Commander` to collect acceptances and disseminate the
//! result; a lost round is retried with a fresh ballot until one wins.
//! There is no way to cancel a proposer once started.

use rand::Rng;

use crate::message::Seq;
use crate::paxos::Paxos;
use crate::state;
use crate::thread::commander::{self, Commander};
use crate::thread::scout::{self, Scout};

pub struct Proposer<V: state::Value> {
    paxos: Paxos<V>,
    seq: Seq,

    /// Value originally proposed. Every round starts from it again.
    value: V,
}

impl<V: state::Value> Proposer<V> {
    pub fn new(paxos: Paxos<V>, seq: Seq, value: V) -> Self {
        Proposer {
            paxos,
            seq,
            value,
        }
    }

    pub async fn run(self) {
        debug!("{} proposing {:?} for {}", self.paxos.id(), self.value, self.seq);
        let broadcast = self.paxos.broadcast();
        loop {
            let ballot = self.paxos.next_ballot();

            let value = match Scout::new(&broadcast, self.seq, ballot).run().await {
            | scout::Out::Adopt(adopted) => adopted.unwrap_or_else(|| self.value.clone()),
            | scout::Out::Preempt => {
                self.backoff().await;
                continue
            }
            };

            match Commander::new(&broadcast, self.seq, ballot, value).run().await {
            | commander::Out::Decided => break,
            | commander::Out::Preempt => self.backoff().await,
            }
        }
    }

    /// Pauses between rounds. Without a configured backoff this only yields,
    /// so dueling proposers may keep preempting each other for a while.
    async fn backoff(&self) {
        match self.paxos.backoff() {
        | Some(limit) if !limit.is_zero() => {
            let delay = rand::thread_rng().gen_range(std::time::Duration::ZERO..limit);
            tokio::time::sleep(delay).await;
        }
        | _ => tokio::task::yield_now().await,
        }
    }
}

impl<V: state::Value> Drop for Proposer<V> {
    fn drop(&mut self) {
        trace!("{} dropping proposer for {}", self.paxos.id(), self.seq);
    }
}
