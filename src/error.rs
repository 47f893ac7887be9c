use std::io;
use std::net::SocketAddr;

use quick_error::quick_error;

use crate::message::Seq;

quick_error! {
    /// Errors surfaced by transports and configuration.
    ///
    /// Inside a round every variant means the same thing: no vote from that
    /// peer. None of them implies the peer is down.
    #[derive(Debug)]
    pub enum Error {
        /// The acceptor has promised an equal or higher ballot elsewhere.
        Rejected(seq: Seq) {
            display("instance {} promised a higher ballot", seq)
        }

        /// Could not connect to the peer.
        Unreachable(addr: SocketAddr, err: io::Error) {
            display("peer {} unreachable: {}", addr, err)
            source(err)
        }

        /// The peer did not answer in time.
        Timeout(addr: SocketAddr) {
            display("peer {} timed out", addr)
        }

        /// The connection closed before a reply arrived.
        Closed(addr: SocketAddr) {
            display("peer {} closed the connection", addr)
        }

        /// Discarded on purpose by fault injection.
        Dropped(addr: SocketAddr) {
            display("message to {} dropped", addr)
        }

        /// The peer answered with the wrong kind of reply.
        Protocol(expected: &'static str) {
            display("expected {} reply", expected)
        }

        Io(err: io::Error) {
            from()
            display("I/O error: {}", err)
            source(err)
        }

        Codec(err: bincode::Error) {
            from()
            display("codec error: {}", err)
            source(err)
        }

        Config(reason: String) {
            display("invalid configuration: {}", reason)
        }
    }
}
