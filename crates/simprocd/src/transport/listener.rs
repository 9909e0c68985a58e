//! TCP listener and accept loop.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, error, info, warn};

use simproc_config::SocketEndpoint;

use crate::runtime::ShutdownFlag;

use super::{ConnectionHandler, ConnectionStream, LISTENER_TARGET, ListenerError};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const LISTEN_BACKLOG: i32 = 16;

/// Listener bound to a TCP endpoint, not yet accepting.
#[derive(Debug)]
pub(crate) struct SocketListener {
    endpoint: SocketEndpoint,
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl SocketListener {
    pub(crate) fn bind(endpoint: &SocketEndpoint) -> Result<Self, ListenerError> {
        let addr = resolve(endpoint)?;
        let listener = bind_tcp(addr)?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ListenerError::Socket { addr, source })?;
        Ok(Self {
            endpoint: endpoint.clone(),
            listener,
            local_addr,
        })
    }

    /// Address actually bound, with the OS-assigned port when `0` was requested.
    pub(crate) const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Runs the accept loop on a background thread until `shutdown` is raised.
    pub(crate) fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
        shutdown: ShutdownFlag,
    ) -> Result<ListenerHandle, ListenerError> {
        self.listener
            .set_nonblocking(true)
            .map_err(|source| ListenerError::NonBlocking { source })?;
        let loop_shutdown = shutdown.clone();
        let handle = thread::Builder::new()
            .name("simprocd-accept".to_owned())
            .spawn(move || run_accept_loop(self, &loop_shutdown, &handler))
            .map_err(|source| ListenerError::Spawn { source })?;
        Ok(ListenerHandle {
            shutdown,
            handle: Some(handle),
        })
    }
}

/// Handle to the background accept thread.
pub(crate) struct ListenerHandle {
    shutdown: ShutdownFlag,
    handle: Option<thread::JoinHandle<Result<(), ListenerError>>>,
}

impl ListenerHandle {
    /// Waits for the accept loop to stop, returning the reason it stopped.
    pub(crate) fn join(mut self) -> Result<(), ListenerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| ListenerError::ThreadPanic)?,
            None => Ok(()),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.shutdown.trigger();
        }
    }
}

fn run_accept_loop(
    listener: SocketListener,
    shutdown: &ShutdownFlag,
    handler: &Arc<dyn ConnectionHandler>,
) -> Result<(), ListenerError> {
    info!(
        target: LISTENER_TARGET,
        endpoint = %listener.endpoint,
        addr = %listener.local_addr,
        "socket listener active"
    );
    let outcome = loop {
        if shutdown.is_triggered() {
            break Ok(());
        }
        match listener.listener.accept() {
            Ok((stream, peer)) => spawn_connection(stream, peer, handler),
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_BACKOFF);
            }
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(source) => {
                error!(
                    target: LISTENER_TARGET,
                    error = %source,
                    "socket accept failed, stopping listener"
                );
                break Err(ListenerError::Accept { source });
            }
        }
    };

    let addr = listener.local_addr;
    drop(listener);
    info!(target: LISTENER_TARGET, %addr, "socket listener closed");
    outcome
}

/// Hands a connection to its own detached thread.
fn spawn_connection(stream: TcpStream, peer: SocketAddr, handler: &Arc<dyn ConnectionHandler>) {
    // Accepted sockets may inherit the listener's non-blocking mode.
    if let Err(error) = stream.set_nonblocking(false) {
        warn!(
            target: LISTENER_TARGET,
            %peer,
            %error,
            "dropping connection that cannot block"
        );
        return;
    }
    let connection_handler = Arc::clone(handler);
    let spawned = thread::Builder::new()
        .name(format!("simprocd-conn-{peer}"))
        .spawn(move || connection_handler.handle(ConnectionStream::new(stream, peer)));
    match spawned {
        Ok(_detached) => debug!(target: LISTENER_TARGET, %peer, "connection accepted"),
        Err(error) => warn!(
            target: LISTENER_TARGET,
            %peer,
            %error,
            "failed to spawn connection thread"
        ),
    }
}

fn resolve(endpoint: &SocketEndpoint) -> Result<SocketAddr, ListenerError> {
    let (host, port) = (endpoint.host(), endpoint.port());
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?;
    addrs.next().ok_or_else(|| ListenerError::ResolveEmpty {
        host: host.to_owned(),
        port,
    })
}

fn bind_tcp(addr: SocketAddr) -> Result<TcpListener, ListenerError> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
        .map_err(|source| ListenerError::Socket { addr, source })?;
    socket
        .set_reuse_address(true)
        .map_err(|source| ListenerError::Socket { addr, source })?;
    socket
        .bind(&addr.into())
        .map_err(|source| ListenerError::BindTcp { addr, source })?;
    socket
        .listen(LISTEN_BACKLOG)
        .map_err(|source| ListenerError::Listen { addr, source })?;
    Ok(socket.into())
}
