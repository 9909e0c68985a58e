//! Test harness utilities for the behavioural suites.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde_json::Value;
use tempfile::TempDir;

use simproc_config::{Config, ConfigError, ProcessConfigSource, ResolvedProcessConfig};

use crate::bootstrap::{BootstrapError, ConfigLoader, StaticConfigLoader};
use crate::dispatch::ConnectionSummary;
use crate::health::HealthReporter;
use crate::runtime::{LaunchError, ShutdownError, ShutdownFlag, ShutdownSignal, run_server_with};

const WAIT_LIMIT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Lifecycle events captured by [`RecordingHealthReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded {
        process: String,
        source: ProcessConfigSource,
    },
    BootstrapFailed,
    ListenerReady(SocketAddr),
    ConnectionOpened,
    ConnectionClosed {
        commands: usize,
        reason: String,
    },
    ShutdownCompleted,
}

/// Reporter that stores every event for later assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events.lock().expect("events lock").clone()
    }

    fn push(&self, event: HealthEvent) {
        self.events.lock().expect("events lock").push(event);
    }

    pub fn listener_addr(&self) -> Option<SocketAddr> {
        self.events().into_iter().find_map(|event| match event {
            HealthEvent::ListenerReady(addr) => Some(addr),
            _ => None,
        })
    }

    pub fn closed_connections(&self) -> Vec<(usize, String)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HealthEvent::ConnectionClosed { commands, reason } => Some((commands, reason)),
                _ => None,
            })
            .collect()
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.push(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config, process: &ResolvedProcessConfig) {
        self.push(HealthEvent::BootstrapSucceeded {
            process: process.config.name().to_owned(),
            source: process.source.clone(),
        });
    }

    fn bootstrap_failed(&self, _error: &BootstrapError) {
        self.push(HealthEvent::BootstrapFailed);
    }

    fn listener_ready(&self, addr: SocketAddr) {
        self.push(HealthEvent::ListenerReady(addr));
    }

    fn connection_opened(&self, _peer: SocketAddr) {
        self.push(HealthEvent::ConnectionOpened);
    }

    fn connection_closed(&self, _peer: SocketAddr, summary: &ConnectionSummary) {
        self.push(HealthEvent::ConnectionClosed {
            commands: summary.commands,
            reason: summary.reason.to_string(),
        });
    }

    fn shutdown_completed(&self) {
        self.push(HealthEvent::ShutdownCompleted);
    }
}

/// Shutdown source the test raises by hand.
#[derive(Debug, Default)]
pub struct ManualShutdownSignal {
    flag: Mutex<Option<ShutdownFlag>>,
}

impl ManualShutdownSignal {
    pub fn trigger(&self) {
        if let Some(flag) = self.flag.lock().expect("flag lock").as_ref() {
            flag.trigger();
        }
    }
}

impl ShutdownSignal for ManualShutdownSignal {
    fn install(&self, flag: &ShutdownFlag) -> Result<(), ShutdownError> {
        *self.flag.lock().expect("flag lock") = Some(flag.clone());
        Ok(())
    }
}

/// Shutdown source whose installation always fails.
#[derive(Debug, Default)]
pub struct FailingShutdownSignal;

impl ShutdownSignal for FailingShutdownSignal {
    fn install(&self, _flag: &ShutdownFlag) -> Result<(), ShutdownError> {
        Err(ShutdownError::Install {
            source: io::Error::other("signal handlers unavailable"),
        })
    }
}

/// Loader that fails the way a bad command line does.
#[derive(Debug, Default)]
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        Config::load_from_iter(["simprocd", "--port", "not-a-port"])
    }
}

/// Loopback configuration whose record paths live in `dir`.
pub fn loopback_config(dir: &Path) -> Config {
    Config {
        host: "127.0.0.1".to_owned(),
        port: 0,
        config_path: dir.join("config.json"),
        fallback_config_path: dir.join("default_config.json"),
        log_filter: "off".to_owned(),
        ..Config::default()
    }
}

/// Polls `condition` until it holds or the wait limit passes.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT_LIMIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(POLL_INTERVAL);
    }
    condition()
}

/// A running server on an ephemeral loopback port.
pub struct ServerHarness {
    pub addr: SocketAddr,
    pub reporter: Arc<RecordingHealthReporter>,
    signal: Arc<ManualShutdownSignal>,
    server: JoinHandle<Result<(), LaunchError>>,
    _dir: TempDir,
}

impl ServerHarness {
    /// Starts a server with no process record on disk.
    pub fn start() -> Self {
        Self::start_with(|_| {})
    }

    /// Starts a server after `prepare` has written any record files.
    pub fn start_with(prepare: impl FnOnce(&Path)) -> Self {
        let dir = TempDir::new().expect("temp dir");
        prepare(dir.path());
        let config = loopback_config(dir.path());
        let reporter = Arc::new(RecordingHealthReporter::default());
        let signal = Arc::new(ManualShutdownSignal::default());

        let server = {
            let reporter = Arc::clone(&reporter);
            let signal = Arc::clone(&signal);
            thread::spawn(move || {
                let loader = StaticConfigLoader::new(config);
                run_server_with(&loader, reporter, signal.as_ref())
            })
        };

        assert!(
            wait_until(|| reporter.listener_addr().is_some()),
            "server did not become ready"
        );
        let addr = reporter.listener_addr().expect("listener addr");
        Self {
            addr,
            reporter,
            signal,
            server,
            _dir: dir,
        }
    }

    pub fn connect(&self) -> Client {
        Client::connect(self.addr)
    }

    /// Raises the shutdown flag and waits for the server to return.
    pub fn stop(self) -> Result<(), LaunchError> {
        self.signal.trigger();
        self.server.join().expect("server thread")
    }
}

/// Line-oriented protocol client.
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl Client {
    pub fn connect(addr: SocketAddr) -> Self {
        let writer = TcpStream::connect(addr).expect("connect");
        writer
            .set_read_timeout(Some(WAIT_LIMIT))
            .expect("read timeout");
        let reader = BufReader::new(writer.try_clone().expect("clone stream"));
        Self { reader, writer }
    }

    /// Writes raw bytes exactly as given.
    pub fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).expect("write");
        self.writer.flush().expect("flush");
    }

    /// Writes raw bytes, reporting failure instead of panicking.
    pub fn try_send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()
    }

    /// Reads one reply line, without its terminator.
    pub fn read_line(&mut self) -> String {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).expect("read reply");
        assert!(read > 0, "server closed the connection");
        line.trim_end_matches('\n').to_owned()
    }

    pub fn read_reply(&mut self) -> Value {
        serde_json::from_str(&self.read_line()).expect("reply is json")
    }

    /// Sends one line and returns the reply text.
    pub fn request_raw(&mut self, line: &str) -> String {
        self.send_raw(format!("{line}\n").as_bytes());
        self.read_line()
    }

    pub fn request(&mut self, line: &str) -> Value {
        serde_json::from_str(&self.request_raw(line)).expect("reply is json")
    }

    /// Reports whether the server has closed its side.
    pub fn at_end_of_stream(&mut self) -> bool {
        let mut line = String::new();
        matches!(self.reader.read_line(&mut line), Ok(0))
    }

    /// Reads whatever lines arrive until the server closes the connection.
    pub fn drain_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) | Err(_) => return lines,
                Ok(_) => lines.push(line.trim_end_matches('\n').to_owned()),
            }
        }
    }

    pub fn finish_writing(&self) {
        self.writer.shutdown(Shutdown::Write).expect("half close");
    }
}

/// Builds an `update` request line.
pub fn update_line(state: &Value, interval: f64) -> String {
    serde_json::json!({
        "command": "update",
        "arguments": {"state": state, "interval": interval},
    })
    .to_string()
}
