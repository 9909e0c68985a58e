//! Independence of concurrent connections.

use std::thread;

use rstest::{fixture, rstest};
use serde_json::json;

use super::support::{Client, ServerHarness, update_line, wait_until};

#[fixture]
fn server() -> ServerHarness {
    ServerHarness::start()
}

#[rstest]
fn interleaved_clients_get_their_own_replies(server: ServerHarness) {
    let mut first = server.connect();
    let mut second = server.connect();

    first.send_raw(format!("{}\n", update_line(&json!({"counter": 100}), 1.0)).as_bytes());
    second.send_raw(b"{\"command\":\"outputs\"}\n");

    assert_eq!(
        second.read_reply(),
        json!({"counter": {"_type": "number", "_apply": "set"}})
    );
    assert_eq!(first.read_reply(), json!({"counter": 101}));

    drop(first);
    drop(second);
    server.stop().expect("server stops cleanly");
}

#[rstest]
fn idle_client_does_not_block_others(server: ServerHarness) {
    let _idle = server.connect();
    let mut active = server.connect();
    assert_eq!(
        active.request(r#"{"command":"inputs"}"#),
        json!({"counter": {"_type": "number"}})
    );
    drop(active);
    server.stop().expect("server stops cleanly");
}

#[rstest]
fn many_clients_run_in_parallel(server: ServerHarness) {
    const CLIENTS: u32 = 8;
    const ROUNDS: u32 = 20;

    let addr = server.addr;
    let workers: Vec<_> = (0..CLIENTS)
        .map(|client_id| {
            thread::spawn(move || {
                let mut client = Client::connect(addr);
                for round in 0..ROUNDS {
                    let start = client_id * 1000 + round;
                    let reply = client.request(&update_line(&json!({"counter": start}), 1.0));
                    assert_eq!(reply, json!({"counter": start + 1}));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("client thread");
    }

    assert!(wait_until(|| {
        server.reporter.closed_connections().len() == CLIENTS as usize
    }));
    for (commands, reason) in server.reporter.closed_connections() {
        assert_eq!(commands, ROUNDS as usize);
        assert_eq!(reason, "end_of_stream");
    }
    server.stop().expect("server stops cleanly");
}
