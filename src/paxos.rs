use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::broadcast::Broadcast;
use crate::message::{Ballot, Seq};
use crate::state;
use crate::thread::acceptor::Acceptor;
use crate::thread::proposer::Proposer;
use crate::transport::Transport;

/// One peer: proposes values for instances and votes on everyone else's.
///
/// Cloning is cheap; all clones refer to the same peer.
#[derive(Derivative)]
#[derivative(Clone(bound = ""))]
pub struct Paxos<V: state::Value>(Arc<Inner<V>>);

struct Inner<V: state::Value> {
    /// Index of this peer in `peers`
    id: usize,

    /// Every peer, including this one, in a fixed order
    peers: Vec<SocketAddr>,

    acceptor: Acceptor<V>,

    transport: Box<dyn Transport<V>>,

    /// Upper bound on the random pause between failed rounds
    backoff: Option<Duration>,

    /// Last ballot stamp handed out by this peer
    stamp: AtomicU64,

    /// Inbound connection loop, if serving over TCP
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl<V: state::Value> Paxos<V> {

    pub(crate) fn new(
        id: usize,
        peers: Vec<SocketAddr>,
        acceptor: Acceptor<V>,
        transport: Box<dyn Transport<V>>,
        backoff: Option<Duration>,
    ) -> Self {
        Paxos(Arc::new(Inner {
            id,
            peers,
            acceptor,
            transport,
            backoff,
            stamp: AtomicU64::new(0),
            listener: Mutex::new(None),
        }))
    }

    pub(crate) fn attach(&self, listener: JoinHandle<()>) {
        if let Some(previous) = self.0.listener.lock().replace(listener) {
            previous.abort();
        }
    }

    pub(crate) fn acceptor(&self) -> &Acceptor<V> {
        &self.0.acceptor
    }

    pub(crate) fn backoff(&self) -> Option<Duration> {
        self.0.backoff
    }

    pub(crate) fn broadcast(&self) -> Broadcast<'_, V> {
        Broadcast::new(self.0.id, &self.0.peers, &self.0.acceptor, &*self.0.transport)
    }

    /// Issues a ballot higher than every ballot this peer has issued before.
    /// Wall-clock based, so ballots from different peers tend to increase too.
    pub(crate) fn next_ballot(&self) -> Ballot {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or_default();
        let next = |last: u64| std::cmp::max(now, last + 1);
        let (Ok(last) | Err(last)) = self.0.stamp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(next(last)));
        Ballot {
            stamp: next(last),
            id: self.0.id,
        }
    }

    /// Index of this peer.
    pub fn id(&self) -> usize {
        self.0.id
    }

    /// All peers, including this one.
    pub fn peers(&self) -> &[SocketAddr] {
        &self.0.peers
    }

    /// Starts agreement on instance `seq` with proposed value `value`.
    ///
    /// Returns immediately; use `status` to find out whether and what was
    /// decided. Does nothing if `seq` has already been forgotten. Must be
    /// called from within a `tokio` runtime.
    pub fn start(&self, seq: Seq, value: V) {
        if seq < self.min() {
            debug!("{} ignoring start for forgotten instance {}", self.0.id, seq);
            return
        }
        tokio::spawn(Proposer::new(self.clone(), seq, value).run());
    }

    /// Value decided for `seq`, if this peer knows of one. Never touches the network.
    pub fn status(&self, seq: Seq) -> Option<V> {
        self.0.acceptor.shared().read().status(seq)
    }

    /// Declares every instance up to and including `seq` no longer needed by this peer.
    pub fn done(&self, seq: Seq) {
        self.0.acceptor.shared().write().done(seq);
    }

    /// Highest instance sequence number known to this peer, or zero.
    pub fn max(&self) -> Seq {
        self.0.acceptor.shared().read().max()
    }

    /// One more than the lowest watermark any peer has declared done.
    ///
    /// Decided instances below that watermark are forgotten as a side effect.
    /// Cannot advance until every peer's watermark has been heard of, which
    /// happens through the `Decide` messages those peers send.
    pub fn min(&self) -> Seq {
        self.0.acceptor.shared().write().forget()
    }

    /// Stops serving requests from other peers. Proposals already running
    /// keep going, and local state is kept.
    pub fn kill(&self) {
        info!("{} shutting down", self.0.id);
        self.0.acceptor.kill();
        if let Some(listener) = self.0.listener.lock().take() {
            listener.abort();
        }
    }

    pub fn is_dead(&self) -> bool {
        self.0.acceptor.is_dead()
    }

    /// Number of requests served on behalf of other peers.
    pub fn rpc_count(&self) -> usize {
        self.0.acceptor.rpc_count()
    }
}

impl<V: state::Value> Drop for Inner<V> {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.get_mut().take() {
            listener.abort();
        }
    }
}
