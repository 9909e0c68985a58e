//! Behavioural suites for the server, driven over loopback TCP.

mod concurrency_behaviour;
mod support;
