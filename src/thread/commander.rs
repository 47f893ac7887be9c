use crate::broadcast::Broadcast;
use crate::error::Error;
use crate::message::{self, Ballot, Code, Seq};
use crate::quorum;
use crate::state;

/// Outcome of the accept phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Out {
    /// A majority accepted and every peer has been told.
    Decided,

    /// Too few acceptances; the round is lost.
    Preempt,
}

/// Runs phase two of a single round, then disseminates the decision.
pub struct Commander<'a, V: state::Value> {
    broadcast: &'a Broadcast<'a, V>,
    seq: Seq,
    ballot: Ballot,
    value: V,
}

impl<'a, V: state::Value> Commander<'a, V> {
    pub fn new(broadcast: &'a Broadcast<'a, V>, seq: Seq, ballot: Ballot, value: V) -> Self {
        Commander {
            broadcast,
            seq,
            ballot,
            value,
        }
    }

    pub async fn run(self) -> Out {
        let accept = message::Request::Accept(message::Accept {
            seq: self.seq,
            value: self.value.clone(),
            ballot: self.ballot,
        });
        let accepted = self.broadcast
            .send(accept)
            .await
            .into_iter()
            .map(|outcome| self.accepted(outcome))
            .filter(|vote| match vote {
            | Ok(()) => true,
            | Err(err) => {
                trace!("{:?} for {}: {}", self.ballot, self.seq, err);
                false
            }
            })
            .count();

        if !quorum::is_majority(accepted, self.broadcast.count()) {
            debug!("{:?} preempted for {} with {} accepts", self.ballot, self.seq, accepted);
            return Out::Preempt
        }

        self.send_decide().await;
        Out::Decided
    }

    fn accepted(&self, outcome: Result<message::Response<V>, Error>) -> Result<(), Error> {
        match outcome? {
        | message::Response::Accept(reply) if reply.code == Code::Ok => Ok(()),
        | message::Response::Accept(_) => Err(Error::Rejected(self.seq)),
        | _ => Err(Error::Protocol("accept")),
        }
    }

    /// Tells every peer the outcome, piggybacking this peer's watermark.
    /// No quorum is needed: the value is already chosen.
    async fn send_decide(self) {
        let done = self.broadcast.acceptor().shared().read().watermark();
        debug!("{:?} decided {} as {:?}", self.ballot, self.seq, self.value);
        let decide = message::Request::Decide(message::Decide {
            seq: self.seq,
            value: self.value,
            sender: self.broadcast.id(),
            done,
        });
        let missed = self.broadcast
            .send(decide)
            .await
            .into_iter()
            .filter(Result::is_err)
            .count();
        if missed > 0 {
            debug!("{} peers missed the decision for {}", missed, self.seq);
        }
    }
}
