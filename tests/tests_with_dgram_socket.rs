use ping_watch::{PingError, PingRunner, PingRunnerConfig, Session};
use std::sync::Once;
use std::time::Duration;

use more_asserts as ma;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

static SETUP: Once = Once::new();

fn setup() {
    SETUP.call_once(|| {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::ERROR).finish();
        tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
    });
}

/*
* Note: Unprivileged ICMP sockets need the group id to be in net.ipv4.ping_group_range on Linux.
*/
fn open_session(receive_timeout: Duration) -> Option<Session<ping_watch::DgramSocket>> {
    match Session::open(receive_timeout) {
        Ok(session) => Some(session),
        Err(PingError::Io(e)) => {
            println!("skipping: unprivileged ICMP socket not available: {e}");
            None
        }
        Err(e) => panic!("unexpected error opening session: {e}"),
    }
}

#[test]
fn test_ping_to_localhost_with_dgram_socket() {
    setup();

    let config = PingRunnerConfig {
        receive_timeout: Duration::from_millis(100),
        ..PingRunnerConfig::new("127.0.0.1", Duration::from_millis(50))
    };
    let Some(session) = open_session(config.receive_timeout) else {
        return;
    };

    let ping_runner = PingRunner::start(&config, session);
    std::thread::sleep(Duration::from_millis(500));
    let statistics = ping_runner.halt().unwrap();

    ma::assert_ge!(statistics.pings_received, 1);
    ma::assert_le!(statistics.pings_received, statistics.pings_sent);
    ma::assert_ge!(statistics.max_latency_ms, statistics.min_latency_ms);
    ma::assert_gt!(statistics.success_rate(), 0.0);
}

#[test]
fn test_ping_to_unresolvable_destination_with_dgram_socket() {
    setup();

    let config = PingRunnerConfig {
        receive_timeout: Duration::from_millis(100),
        ..PingRunnerConfig::new("localhost:not-a-port", Duration::from_millis(50))
    };
    let Some(session) = open_session(config.receive_timeout) else {
        return;
    };

    let result = PingRunner::start(&config, session).wait();

    assert!(matches!(result, Err(PingError::Resolution(_))));
}
