use crate::broadcast::Broadcast;
use crate::error::Error;
use crate::message::{self, Ballot, Code, Seq};
use crate::quorum;
use crate::state;

/// Outcome of the prepare phase.
#[derive(Debug, PartialEq, Eq)]
pub enum Out<V> {
    /// A majority promised. Carries the value this ballot must propose
    /// instead of its own, if any acceptor had already accepted one.
    Adopt(Option<V>),

    /// Too few promises; the round is lost.
    Preempt,
}

/// Runs phase one of a single round: collects promises for `ballot`.
pub struct Scout<'a, V: state::Value> {
    broadcast: &'a Broadcast<'a, V>,
    seq: Seq,
    ballot: Ballot,
}

impl<'a, V: state::Value> Scout<'a, V> {
    pub fn new(broadcast: &'a Broadcast<'a, V>, seq: Seq, ballot: Ballot) -> Self {
        Scout {
            broadcast,
            seq,
            ballot,
        }
    }

    pub async fn run(self) -> Out<V> {
        let prepare = message::Request::Prepare(message::Prepare {
            seq: self.seq,
            ballot: self.ballot,
        });
        let promises = self.broadcast
            .send(prepare)
            .await
            .into_iter()
            .filter_map(|outcome| match self.promise(outcome) {
            | Ok(promise) => Some(promise),
            | Err(err) => {
                trace!("{:?} for {}: {}", self.ballot, self.seq, err);
                None
            }
            })
            .collect::<Vec<_>>();

        if !quorum::is_majority(promises.len(), self.broadcast.count()) {
            debug!("{:?} preempted for {} with {} promises", self.ballot, self.seq, promises.len());
            return Out::Preempt
        }

        debug!("{:?} adopted for {}", self.ballot, self.seq);
        Out::Adopt(highest(promises))
    }

    fn promise(&self, outcome: Result<message::Response<V>, Error>) -> Result<message::PrepareReply<V>, Error> {
        match outcome? {
        | message::Response::Prepare(reply) if reply.code == Code::Ok => Ok(reply),
        | message::Response::Prepare(_) => Err(Error::Rejected(self.seq)),
        | _ => Err(Error::Protocol("prepare")),
        }
    }
}

/// Value accepted at the highest ballot among `promises`, if any carry one.
pub fn highest<V, I>(promises: I) -> Option<V>
    where I: IntoIterator<Item = message::PrepareReply<V>>,
          V: state::Value,
{
    promises
        .into_iter()
        .filter_map(|promise| {
            let ballot = promise.ballot;
            promise.value.map(|value| (ballot, value))
        })
        .max_by_key(|(ballot, _)| *ballot)
        .map(|(_, value)| value)
}
