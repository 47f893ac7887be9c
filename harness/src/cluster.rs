use std::net::SocketAddr;
use std::time::{Duration, Instant};

use synod::{transport, Config, Paxos, Seq};

const POLL: Duration = Duration::from_millis(10);

/// Loopback addresses on `count` consecutive ports starting at `base`.
fn addrs(count: usize, base: u16) -> Result<Vec<SocketAddr>, synod::Error> {
    (0..count)
        .map(|id| {
            u16::try_from(id)
                .ok()
                .and_then(|id| base.checked_add(id))
                .map(|port| SocketAddr::from(([127, 0, 0, 1], port)))
                .ok_or_else(|| synod::Error::Config(format!("{} peers do not fit above port {}", count, base)))
        })
        .collect()
}

/// Every peer the harness has booted, all living in this process.
pub struct Cluster {
    peers: Vec<Paxos<String>>,
}

impl Cluster {
    pub async fn spawn(count: usize, port: Option<u16>, unreliable: bool) -> Result<Self, synod::Error> {
        let addrs = addrs(count, port.unwrap_or(20000))?;

        let mut peers = Vec::with_capacity(count);
        match port {
        | Some(_) => {
            for id in 0..count {
                let config = Config::new(addrs.clone(), id).with_unreliable(unreliable);
                peers.push(config.run().await?);
            }
        }
        | None => {
            let network = transport::Local::new();
            for id in 0..count {
                let config = Config::new(addrs.clone(), id).with_unreliable(unreliable);
                peers.push(config.local(&network)?);
            }
        }
        }
        info!("spawned {} peers", count);
        Ok(Cluster { peers })
    }

    pub fn peer(&self, id: usize) -> Result<&Paxos<String>, synod::Error> {
        self.peers
            .get(id)
            .ok_or_else(|| synod::Error::Config(format!("no peer {} out of {}", id, self.peers.len())))
    }

    /// Polls peer `id` until `seq` is decided as `value`, or for the whole
    /// window when `value` is `None`. Returns what the peer saw last.
    pub async fn expect(&self, id: usize, seq: Seq, value: &Option<String>, within: Duration) -> Result<Option<String>, synod::Error> {
        let paxos = self.peer(id)?;
        let deadline = Instant::now() + within;
        loop {
            let status = paxos.status(seq);
            if value.is_some() && status == *value {
                return Ok(status)
            }
            if value.is_none() && status.is_some() {
                return Ok(status)
            }
            if Instant::now() >= deadline {
                return Ok(status)
            }
            tokio::time::sleep(POLL).await;
        }
    }

    /// Polls peer `id` until its minimum reaches `min`. Returns the last minimum seen.
    pub async fn expect_min(&self, id: usize, min: Seq, within: Duration) -> Result<Seq, synod::Error> {
        let paxos = self.peer(id)?;
        let deadline = Instant::now() + within;
        loop {
            let now = paxos.min();
            if now >= min || Instant::now() >= deadline {
                return Ok(now)
            }
            tokio::time::sleep(POLL).await;
        }
    }

    pub fn report(&self) {
        for paxos in &self.peers {
            info!(
                "peer {}: min {} max {} rpcs {}{}",
                paxos.id(),
                paxos.min(),
                paxos.max(),
                paxos.rpc_count(),
                if paxos.is_dead() { " (dead)" } else { "" },
            );
        }
    }
}
