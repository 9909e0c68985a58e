//! Line-delimited JSON command dispatch.
//!
//! Every connection gets its own process and runs a loop that reads one JSON
//! object per line, routes it, and writes exactly one JSON reply line back.
//! Lines that are empty or hold only spaces, tabs and carriage returns are
//! skipped without a reply.
//!
//! ## Protocol
//!
//! ```json
//! {"command":"inputs"}
//! {"command":"outputs"}
//! {"command":"update","arguments":{"state":{"counter":5},"interval":2}}
//! ```
//!
//! Replies are the process's own objects, for example `{"counter":7}` for the
//! `update` above. Malformed requests produce `{"error": "<message>"}` and the
//! connection stays open.

mod errors;
mod handler;
mod request;
mod router;

pub use self::errors::ProtocolError;
pub use self::handler::{CloseReason, ConnectionSummary, ProcessConnectionHandler};
pub use self::request::{CommandRequest, UpdateArguments};
pub use self::router::{Command, CommandRouter, is_blank};
