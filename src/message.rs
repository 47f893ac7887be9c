use serde_derive::{Deserialize, Serialize};

use crate::state;

/// Instance sequence number.
pub type Seq = usize;

/// Round identifier. Ordered by `stamp`, then by the issuing peer's `id`,
/// so ballots from different peers never compare equal.
///
/// The default ballot is lower than any ballot a proposer issues and marks
/// "nothing accepted yet".
#[derive(Serialize, Deserialize)]
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ballot {
    pub stamp: u64,
    pub id: usize,
}

impl Ballot {
    pub fn is_none(&self) -> bool {
        *self == Ballot::default()
    }
}

/// Acceptor verdict on a ballot.
#[derive(Serialize, Deserialize)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Code {
    Ok,
    Rejected,
}

#[derive(Serialize, Deserialize)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Prepare {
    pub seq: Seq,
    pub ballot: Ballot,
}

/// Promise (or refusal), carrying whatever the acceptor last accepted.
#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = ""))]
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct PrepareReply<V: state::Value> {
    pub code: Code,
    pub value: Option<V>,
    pub ballot: Ballot,
}

#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = ""))]
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct Accept<V: state::Value> {
    pub seq: Seq,
    pub value: V,
    pub ballot: Ballot,
}

#[derive(Serialize, Deserialize)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AcceptReply {
    pub code: Code,
}

/// Chosen value, plus the sender's done watermark piggybacked for
/// garbage collection.
#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = ""))]
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct Decide<V: state::Value> {
    pub seq: Seq,
    pub value: V,
    pub sender: usize,
    pub done: Option<Seq>,
}

#[derive(Serialize, Deserialize)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DecideReply;

/// Everything one peer may ask of another.
#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = ""))]
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub enum Request<V: state::Value> {
    Prepare(Prepare),
    Accept(Accept<V>),
    Decide(Decide<V>),
}

#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = ""))]
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub enum Response<V: state::Value> {
    Prepare(PrepareReply<V>),
    Accept(AcceptReply),
    Decide(DecideReply),
}

impl<V: state::Value> Request<V> {
    pub fn seq(&self) -> Seq {
        match self {
        | Request::Prepare(prepare) => prepare.seq,
        | Request::Accept(accept) => accept.seq,
        | Request::Decide(decide) => decide.seq,
        }
    }
}
