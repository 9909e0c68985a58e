//! Connection handling abstractions for the server listener.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};

/// An accepted client connection.
///
/// Dropping the value closes the socket, so whoever owns the stream owns the
/// connection's lifetime.
#[derive(Debug)]
pub struct ConnectionStream {
    stream: TcpStream,
    peer: SocketAddr,
}

impl ConnectionStream {
    /// Wraps an accepted TCP stream.
    #[must_use]
    pub const fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self { stream, peer }
    }

    /// Address of the connected client.
    #[must_use]
    pub const fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Read for ConnectionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for ConnectionStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// Handles accepted socket connections.
pub trait ConnectionHandler: Send + Sync + 'static {
    /// Serves a single connection until it closes. Runs on a detached thread
    /// per connection, so implementations should avoid panicking.
    fn handle(&self, stream: ConnectionStream);
}
