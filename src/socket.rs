//! # Summary
//!
//! This module abstracts over connections between peer servers.
//!
//! Uses `bincode` on top of `tokio-util`'s length-delimited codec, which in
//! turn wraps `tokio`'s asynchronous TCP stream. This allows us to serialize
//! and deserialize Rust structs through a TCP connection with minimal
//! boilerplate on the sending and receiving ends.

use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{ready, Sink, Stream};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};

use crate::error::Error;

/// Receiving half. Yields length-delimited, bincode-encoded values of type `T`.
pub struct Rx<T>(FramedRead<OwnedReadHalf, LengthDelimitedCodec>, PhantomData<fn() -> T>);

/// Transmitting half. Sends length-delimited, bincode-encoded values of type `T`.
pub struct Tx<T>(FramedWrite<OwnedWriteHalf, LengthDelimitedCodec>, PhantomData<fn(T)>);

/// Split a `TcpStream` into a pair of receiving and transmitting channels.
pub fn split<R, T>(stream: TcpStream) -> (Rx<R>, Tx<T>)
where R: serde::de::DeserializeOwned,
      T: serde::Serialize,
{
    let (rx, tx) = stream.into_split();
    let rx = FramedRead::new(rx, LengthDelimitedCodec::new());
    let tx = FramedWrite::new(tx, LengthDelimitedCodec::new());
    (Rx(rx, PhantomData), Tx(tx, PhantomData))
}

impl<R: serde::de::DeserializeOwned> Stream for Rx<R> {
    type Item = Result<R, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let frame = match ready!(Pin::new(&mut self.0).poll_next(cx)) {
        | Some(frame) => frame,
        | None => return Poll::Ready(None),
        };
        let item = frame
            .map_err(Error::from)
            .and_then(|bytes| bincode::deserialize(&bytes).map_err(Error::from));
        Poll::Ready(Some(item))
    }
}

impl<T: serde::Serialize> Sink<T> for Tx<T> {
    type Error = Error;

    fn poll_ready(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Sink::<Bytes>::poll_ready(Pin::new(&mut self.0), cx).map_err(Error::from)
    }

    fn start_send(mut self: Pin<&mut Self>, item: T) -> Result<(), Self::Error> {
        let bytes = bincode::serialize(&item)?;
        Pin::new(&mut self.0).start_send(Bytes::from(bytes))?;
        Ok(())
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Sink::<Bytes>::poll_flush(Pin::new(&mut self.0), cx).map_err(Error::from)
    }

    fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Sink::<Bytes>::poll_close(Pin::new(&mut self.0), cx).map_err(Error::from)
    }
}
