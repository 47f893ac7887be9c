mod common;

use std::time::Duration;

use synod::message::{Accept, Code, Prepare, Request, Response};
use synod::transport::Transport;
use synod::{Ballot, Config};

use crate::common::{cluster, cluster_with, ndecided, wait_min, wait_n, wait_none};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_proposer() {
    let (_network, peers) = cluster(3);
    peers[0].start(0, "x".to_string());
    wait_n(&peers, 0, 3).await;
    for paxos in &peers {
        assert_eq!(paxos.status(0).as_deref(), Some("x"));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_proposer_without_backoff() {
    let (_network, peers) = cluster_with(3, |config| config);
    peers[1].start(4, "x".to_string());
    wait_n(&peers, 4, 3).await;
    assert_eq!(peers[2].status(4).as_deref(), Some("x"));
    assert_eq!(peers[2].max(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_peer_decides_alone() {
    let (_network, peers) = cluster(1);
    peers[0].start(0, "alone".to_string());
    wait_n(&peers, 0, 1).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_proposers_agree() {
    let (_network, peers) = cluster(3);
    peers[0].start(3, "p".to_string());
    peers[1].start(3, "q".to_string());
    wait_n(&peers, 3, 3).await;
    let decided = peers[2].status(3).unwrap();
    assert!(decided == "p" || decided == "q", "decided {}", decided);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_peer_proposes_something_different() {
    let (_network, peers) = cluster(5);
    for seq in 0..5 {
        for paxos in &peers {
            paxos.start(seq, format!("{}-{}", seq, paxos.id()));
        }
    }
    for seq in 0..5 {
        wait_n(&peers, seq, 5).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn decided_value_survives_later_proposals() {
    let (_network, peers) = cluster(3);
    peers[0].start(1, "first".to_string());
    wait_n(&peers, 1, 3).await;

    peers[1].start(1, "second".to_string());
    peers[2].start(1, "third".to_string());
    tokio::time::sleep(Duration::from_millis(100)).await;
    for paxos in &peers {
        assert_eq!(paxos.status(1).as_deref(), Some("first"));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn out_of_order_instances() {
    let (_network, peers) = cluster(3);
    for seq in (0..10).rev() {
        peers[seq % 3].start(seq, seq.to_string());
    }
    for seq in 0..10 {
        wait_n(&peers, seq, 3).await;
        assert_eq!(peers[0].status(seq), Some(seq.to_string()));
    }
    assert_eq!(peers[1].max(), 9);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn majority_unreachable_never_decides() {
    let (_network, peers) = cluster(3);
    peers[1].kill();
    peers[2].kill();
    peers[0].start(7, "y".to_string());
    wait_none(&peers, 7, Duration::from_millis(500)).await;
    assert_eq!(peers[0].status(7), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn three_of_five_unreachable_never_decides() {
    let (_network, peers) = cluster(5);
    for paxos in &peers[2..] {
        paxos.kill();
    }
    peers[0].start(0, "a".to_string());
    peers[1].start(0, "b".to_string());
    wait_none(&peers, 0, Duration::from_millis(500)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn minority_unreachable_still_decides() {
    let (_network, peers) = cluster(5);
    peers[3].kill();
    peers[4].kill();
    peers[0].start(0, "z".to_string());
    wait_n(&peers[..3], 0, 3).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn disconnected_peer_misses_decisions() {
    let (network, peers) = cluster(3);
    network.disconnect(&peers[2].peers()[2]);
    peers[0].start(0, "x".to_string());
    wait_n(&peers, 0, 2).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(peers[2].status(0), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn killed_peer_still_proposes_and_keeps_state() {
    let (_network, peers) = cluster(3);
    peers[0].start(0, "before".to_string());
    wait_n(&peers, 0, 3).await;

    peers[2].kill();
    assert!(peers[2].is_dead());
    assert_eq!(peers[2].status(0).as_deref(), Some("before"));

    // Its own proposals still reach the live majority.
    peers[2].start(1, "after".to_string());
    wait_n(&peers[..2], 1, 2).await;
    assert_eq!(peers[2].status(1).as_deref(), Some("after"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn done_advances_min_everywhere() {
    let (_network, peers) = cluster(3);
    for seq in 0..6 {
        peers[seq % 3].start(seq, seq.to_string());
    }
    for seq in 0..6 {
        wait_n(&peers, seq, 3).await;
    }
    for paxos in &peers {
        assert_eq!(paxos.min(), 0);
        paxos.done(5);
    }

    // Each decision carries its proposer's watermark to everyone else.
    for (i, paxos) in peers.iter().enumerate() {
        paxos.start(6 + i, "gc".to_string());
    }
    for seq in 6..9 {
        wait_n(&peers, seq, 3).await;
    }
    for paxos in &peers {
        wait_min(paxos, 6).await;
        assert_eq!(paxos.min(), 6);
        assert_eq!(paxos.status(0), None);
        assert_eq!(paxos.status(4), None);
        assert_eq!(paxos.status(6).as_deref(), Some("gc"));
        assert_eq!(paxos.max(), 8);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn min_waits_for_silent_peer() {
    let (_network, peers) = cluster(3);
    peers[0].done(3);
    peers[1].done(3);
    peers[0].start(4, "a".to_string());
    peers[1].start(5, "b".to_string());
    wait_n(&peers, 4, 3).await;
    wait_n(&peers, 5, 3).await;
    for paxos in &peers {
        assert_eq!(paxos.min(), 0);
    }

    peers[2].done(3);
    peers[2].start(6, "c".to_string());
    wait_n(&peers, 6, 3).await;
    for paxos in &peers {
        wait_min(paxos, 4).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn min_never_moves_backwards() {
    let (_network, peers) = cluster(3);
    let mut mins = vec![0; 3];
    for round in 0..5 {
        for paxos in &peers {
            paxos.done(round * 2);
        }
        for (i, paxos) in peers.iter().enumerate() {
            paxos.start(100 + round * 3 + i, "w".to_string());
        }
        for i in 0..3 {
            wait_n(&peers, 100 + round * 3 + i, 3).await;
        }
        for (min, paxos) in mins.iter_mut().zip(&peers) {
            let now = paxos.min();
            assert!(now >= *min, "min went from {} to {}", min, now);
            assert!(now <= round * 2 + 1);
            *min = now;
        }
    }
    assert!(mins.iter().all(|min| *min == 9));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn undecided_instances_are_never_forgotten() {
    let (network, peers) = cluster(3);
    let addr = peers[0].peers()[0];

    // A lone accept with nobody driving it to a decision.
    let stray = Ballot { stamp: 1, id: 1 };
    let accept = Request::Accept(Accept { seq: 1, value: "kept".to_string(), ballot: stray });
    match network.call(addr, accept).await {
    | Ok(Response::Accept(reply)) => assert_eq!(reply.code, Code::Ok),
    | other => panic!("unexpected {:?}", other),
    }

    for (seq, paxos) in [0, 2, 3].into_iter().zip(&peers) {
        paxos.start(seq, "old".to_string());
    }
    for seq in [0, 2, 3] {
        wait_n(&peers, seq, 3).await;
    }

    for paxos in &peers {
        paxos.done(5);
    }
    for (i, paxos) in peers.iter().enumerate() {
        paxos.start(6 + i, "new".to_string());
    }
    for seq in 6..9 {
        wait_n(&peers, seq, 3).await;
    }

    wait_min(&peers[0], 6).await;
    assert_eq!(peers[0].status(0), None);
    assert_eq!(peers[0].status(2), None);
    assert_eq!(peers[0].status(3), None);
    assert_eq!(peers[0].max(), 8);

    let prepare = Request::Prepare(Prepare { seq: 1, ballot: Ballot { stamp: 2, id: 2 } });
    match network.call(addr, prepare).await {
    | Ok(Response::Prepare(reply)) => {
        assert_eq!(reply.code, Code::Ok);
        assert_eq!(reply.value.as_deref(), Some("kept"));
        assert_eq!(reply.ballot, stray);
    }
    | other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn forgotten_instances_are_not_restarted() {
    let (_network, peers) = cluster(3);
    for paxos in &peers {
        paxos.done(2);
    }
    for (i, paxos) in peers.iter().enumerate() {
        paxos.start(3 + i, "x".to_string());
    }
    for seq in 3..6 {
        wait_n(&peers, seq, 3).await;
    }
    for paxos in &peers {
        wait_min(paxos, 3).await;
    }

    peers[0].start(1, "late".to_string());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(ndecided(&peers, 1), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn remote_requests_are_counted() {
    let (_network, peers) = cluster(3);
    peers[0].start(0, "x".to_string());
    wait_n(&peers, 0, 3).await;
    assert_eq!(peers[0].rpc_count(), 0);
    // Prepare, accept and decide from peer 0, at least.
    assert!(peers[1].rpc_count() >= 3);
    assert!(peers[2].rpc_count() >= 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unreliable_network_still_agrees() {
    let (_network, peers) = cluster_with(3, |config| {
        config
            .with_unreliable(true)
            .with_backoff(Duration::from_millis(5))
    });
    for seq in 0..10 {
        for paxos in &peers {
            paxos.start(seq, format!("{}-{}", seq, paxos.id()));
        }
    }
    for seq in 0..10 {
        wait_n(&peers, seq, 3).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn peers_on_different_networks_cannot_agree() {
    let (_network, mut peers) = cluster(3);
    let other = synod::transport::Local::new();
    let addrs = peers[0].peers().to_vec();
    // Same address book, but nobody else is on this network.
    peers.push(Config::new(addrs, 0).local(&other).unwrap());
    peers[3].start(0, "isolated".to_string());
    wait_none(&peers[3..], 0, Duration::from_millis(200)).await;
}
