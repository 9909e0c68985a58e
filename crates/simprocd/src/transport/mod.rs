//! Socket transport for the server.
//!
//! The listener binds the configured TCP endpoint and accepts connections on a
//! background thread, handing each one to a [`ConnectionHandler`] on its own
//! detached thread. [`LineFramer`] turns a connection into discrete lines.

mod errors;
mod framer;
mod handler;
mod listener;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub use self::framer::{FrameError, LineFramer};
pub use self::handler::{ConnectionHandler, ConnectionStream};
pub(crate) use self::listener::SocketListener;
#[cfg(test)]
pub(crate) use self::test_utils::CountingHandler;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
