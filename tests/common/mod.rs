#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use synod::{transport, Config, Paxos, Seq};

pub fn addrs(count: usize) -> Vec<SocketAddr> {
    (0..count)
        .map(|id| SocketAddr::from(([127, 0, 0, 1], 20000 + id as u16)))
        .collect()
}

/// `count` peers joined by an in-process network.
pub fn cluster(count: usize) -> (transport::Local<String>, Vec<Paxos<String>>) {
    cluster_with(count, |config| config.with_backoff(Duration::from_millis(5)))
}

pub fn cluster_with<F>(count: usize, configure: F) -> (transport::Local<String>, Vec<Paxos<String>>)
    where F: Fn(Config<String>) -> Config<String>
{
    let _ = pretty_env_logger::try_init();
    let network = transport::Local::new();
    let peers = addrs(count);
    let paxos = (0..count)
        .map(|id| configure(Config::new(peers.clone(), id)))
        .map(|config| config.local(&network).expect("valid configuration"))
        .collect();
    (network, paxos)
}

/// Number of peers that have decided `seq`. Panics if any two disagree.
pub fn ndecided(peers: &[Paxos<String>], seq: Seq) -> usize {
    let mut decided: Option<String> = None;
    let mut count = 0;
    for paxos in peers {
        if let Some(value) = paxos.status(seq) {
            if let Some(previous) = &decided {
                assert_eq!(previous, &value, "peers disagree on instance {}", seq);
            }
            decided = Some(value);
            count += 1;
        }
    }
    count
}

/// Waits until at least `wanted` peers have decided `seq`.
pub async fn wait_n(peers: &[Paxos<String>], seq: Seq, wanted: usize) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while ndecided(peers, seq) < wanted {
        assert!(Instant::now() < deadline, "too few peers decided instance {}", seq);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub async fn wait_min(paxos: &Paxos<String>, min: Seq) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while paxos.min() < min {
        assert!(Instant::now() < deadline, "min stuck at {} on peer {}", paxos.min(), paxos.id());
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Checks that no peer ever decides `seq` within `wait`.
pub async fn wait_none(peers: &[Paxos<String>], seq: Seq, wait: Duration) {
    let deadline = Instant::now() + wait;
    while Instant::now() < deadline {
        assert_eq!(ndecided(peers, seq), 0, "instance {} decided without a majority", seq);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
