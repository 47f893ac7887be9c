use serde_derive::{Serialize, Deserialize};

#[derive(Serialize, Deserialize)]
pub struct Execution(pub Vec<Command>);

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
#[derive(Clone, Debug)]
pub enum Command {
    /// Boot `count` peers, over TCP on consecutive ports from `port` if given,
    /// otherwise over an in-process network
    Spawn {
        count: usize,
        #[serde(default)]
        port: Option<u16>,
        #[serde(default)]
        unreliable: bool,
    },

    /// Ask peer `id` to propose `value` for instance `seq`
    Start {
        id: usize,
        seq: usize,
        value: String,
    },

    /// Tell peer `id` it no longer needs instances up to `seq`
    Done {
        id: usize,
        seq: usize,
    },

    /// Stop peer `id` from answering the others
    Kill {
        id: usize,
    },

    /// Sleep the test harness for `ms` milliseconds
    Sleep {
        ms: u64,
    },

    /// Peer `id` must have decided `value` for `seq` within `within_ms`.
    /// A missing `value` means the instance must stay undecided that long.
    Expect {
        id: usize,
        seq: usize,
        #[serde(default)]
        value: Option<String>,
        within_ms: u64,
    },

    /// Peer `id` must report a minimum of at least `min` within `within_ms`
    ExpectMin {
        id: usize,
        min: usize,
        within_ms: u64,
    },

    /// Log every peer's view of the cluster
    Report,
}
