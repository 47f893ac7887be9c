//! # Summary
//!
//! A Paxos library, to be embedded in an application. Each application
//! process runs one peer; the set of peers is fixed. Peers agree on a
//! sequence of values, one independent Synod instance per sequence number,
//! and cope with message loss, reordering and partitions. Nothing is stored
//! persistently, so a peer that crashes cannot rejoin.
//!
//! ```no_run
//! # async fn example() -> Result<(), synod::Error> {
//! let peers = vec![
//!     "127.0.0.1:20000".parse().unwrap(),
//!     "127.0.0.1:20001".parse().unwrap(),
//!     "127.0.0.1:20002".parse().unwrap(),
//! ];
//! let paxos = synod::Config::<String>::new(peers, 0).run().await?;
//! paxos.start(0, "hello".to_string());
//! // ... later
//! if let Some(value) = paxos.status(0) {
//!     println!("decided {}", value);
//!     paxos.done(0);
//! }
//! # Ok(())
//! # }
//! ```

#[macro_use] extern crate derivative;
#[macro_use] extern crate log;

mod broadcast;
mod config;
mod error;
pub mod message;
mod paxos;
pub mod quorum;
mod shared;
mod socket;
mod state;
mod thread;
pub mod transport;

pub use crate::config::Config;
pub use crate::error::Error;
pub use crate::message::{Ballot, Seq};
pub use crate::paxos::Paxos;
pub use crate::state::Value;
