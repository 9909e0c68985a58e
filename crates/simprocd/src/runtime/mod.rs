//! Server lifecycle: launch sequencing and shutdown coordination.

mod errors;
mod launch;
mod shutdown;

pub use self::errors::LaunchError;
pub use self::launch::{run_server, run_server_with};
pub use self::shutdown::{ShutdownError, ShutdownFlag, ShutdownSignal, SystemShutdownSignal};

const RUNTIME_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::runtime");
