//! Supervisor lifecycle tests against real shell-script workers

mod common;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use herdsman::application::MAX_LINE_BYTES;
use herdsman::domain::models::{ConnectionState, OutputEvent, OutputStream, StatusMessage};
use herdsman::infrastructure::broadcast::{BroadcastClient, BASE_PORT};
use herdsman::{ConfigLoader, Supervisor};

use common::{config_with, fast_timings, script_option, temp_dir, wait_for, write_script};

async fn next_line(rx: &mut mpsc::UnboundedReceiver<OutputEvent>) -> OutputEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for worker output")
        .expect("output channel closed")
}

fn forward_output(supervisor: &Supervisor) -> mpsc::UnboundedReceiver<OutputEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    let errors = tx.clone();
    supervisor.subscribe_output(move |event: &OutputEvent| {
        let _ = tx.send(event.clone());
    });
    supervisor.subscribe_errors(move |event: &OutputEvent| {
        let _ = errors.send(event.clone());
    });
    rx
}

#[tokio::test]
async fn test_output_reaches_observers_log_and_broadcast() {
    let dir = temp_dir();
    let script = write_script(dir.path(), "miner.sh", "echo hello\necho oops >&2\nexec sleep 30");
    let mut config = config_with(dir.path(), vec![script_option("sh", script)], &[("w1", "sh")]);
    config.debug_logging = true;
    let log_path = config.worker_log_path("w1");

    let base_port = BASE_PORT + 400;
    let client = BroadcastClient::with_base_port(base_port);
    let (status_tx, mut status_rx) = mpsc::unbounded_channel();
    client.subscribe(move |status: &StatusMessage| {
        let _ = status_tx.send(status.clone());
    });
    client.start();
    assert!(
        client
            .wait_for_state(ConnectionState::Connected, Duration::from_secs(2))
            .await
    );

    let supervisor = Supervisor::new()
        .with_timings(fast_timings())
        .with_broadcast_base_port(base_port);
    let mut output = forward_output(&supervisor);
    supervisor.start(Arc::new(config)).await.unwrap();

    let mut events = vec![next_line(&mut output).await, next_line(&mut output).await];
    events.sort_by_key(|e| e.stream == OutputStream::Stderr);
    assert_eq!(events[0].line, "hello");
    assert_eq!(events[0].stream, OutputStream::Stdout);
    assert_eq!(events[1].line, "oops");
    assert_eq!(events[1].stream, OutputStream::Stderr);
    assert!(events.iter().all(|e| e.worker == "w1"));

    let mut statuses = Vec::new();
    for _ in 0..2 {
        let status = tokio::time::timeout(Duration::from_secs(5), status_rx.recv())
            .await
            .unwrap()
            .unwrap();
        statuses.push(status.text);
    }
    statuses.sort();
    assert_eq!(statuses, vec!["hello", "oops"]);

    let report = supervisor.stop().await;
    assert_eq!(report.exited, vec!["w1"]);
    client.stop().await;

    let log = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().any(|l| l.ends_with(": hello")));
    assert!(lines.iter().any(|l| l.ends_with(": oops")));
}

#[tokio::test]
async fn test_without_debug_logging_only_observers_see_output() {
    let dir = temp_dir();
    let script = write_script(dir.path(), "miner.sh", "echo quiet\nexec sleep 30");
    let config = config_with(dir.path(), vec![script_option("sh", script)], &[("w1", "sh")]);
    let log_path = config.worker_log_path("w1");

    let supervisor = Supervisor::new().with_timings(fast_timings());
    let mut output = forward_output(&supervisor);
    supervisor.start(Arc::new(config)).await.unwrap();

    assert_eq!(next_line(&mut output).await.line, "quiet");
    supervisor.stop().await;

    let log = std::fs::read_to_string(&log_path).unwrap_or_default();
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_stubborn_worker_is_killed_after_graceful_window() {
    let dir = temp_dir();
    let script = write_script(
        dir.path(),
        "stubborn.sh",
        "trap '' INT TERM\necho ready\nwhile true; do sleep 0.1; done",
    );
    let config = config_with(
        dir.path(),
        vec![script_option("sh", script)],
        &[("stubborn", "sh")],
    );

    let timings = fast_timings();
    let supervisor = Supervisor::new().with_timings(timings);
    let mut output = forward_output(&supervisor);
    supervisor.start(Arc::new(config)).await.unwrap();
    assert_eq!(next_line(&mut output).await.line, "ready");

    let started = Instant::now();
    let report = supervisor.stop().await;
    let elapsed = started.elapsed();

    assert_eq!(report.killed, vec!["stubborn"]);
    assert!(report.exited.is_empty());
    assert!(elapsed >= timings.graceful_window(), "killed too early: {elapsed:?}");
    assert!(
        elapsed <= timings.graceful_window() + timings.poll_interval,
        "killed too late: {elapsed:?}"
    );
}

#[tokio::test]
async fn test_worker_exits_on_etx() {
    let dir = temp_dir();
    let script = write_script(
        dir.path(),
        "polite.sh",
        "trap '' TERM\necho ready\nread -r line\nexit 0",
    );
    let config = config_with(
        dir.path(),
        vec![script_option("sh", script)],
        &[("polite", "sh")],
    );

    let timings = fast_timings();
    let supervisor = Supervisor::new().with_timings(timings);
    let mut output = forward_output(&supervisor);
    supervisor.start(Arc::new(config)).await.unwrap();
    assert_eq!(next_line(&mut output).await.line, "ready");

    let started = Instant::now();
    let report = supervisor.stop().await;

    assert_eq!(report.exited, vec!["polite"]);
    assert!(report.killed.is_empty());
    assert!(started.elapsed() < timings.graceful_window());
}

#[tokio::test]
async fn test_crashing_worker_is_retried_then_given_up() {
    let dir = temp_dir();
    let script = write_script(dir.path(), "crash.sh", "echo started\nexit 1");
    let mut config = config_with(dir.path(), vec![script_option("sh", script)], &[("w1", "sh")]);
    config.workers[0].recovery.retries = 2;
    config.workers[0].recovery.interval_seconds = 0;

    let supervisor = Arc::new(Supervisor::new().with_timings(fast_timings()));
    let starts = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&starts);
    supervisor.subscribe_output(move |_: &OutputEvent| {
        *counter.lock().unwrap() += 1;
    });

    let report = supervisor.start(Arc::new(config)).await.unwrap();
    assert_eq!(report.started, vec!["w1"]);

    let deadline = Instant::now() + Duration::from_secs(10);
    while !supervisor.running_workers().await.is_empty() {
        assert!(Instant::now() < deadline, "worker was never given up on");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let counter = Arc::clone(&starts);
    assert!(wait_for(move || *counter.lock().unwrap() >= 3, 2_000).await);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(*starts.lock().unwrap(), 3);

    let report = supervisor.stop().await;
    assert!(report.exited.is_empty());
    assert!(report.killed.is_empty());
}

#[tokio::test]
async fn test_crashing_worker_switches_to_alternate_option() {
    let dir = temp_dir();
    let bad = write_script(dir.path(), "bad.sh", "echo bad\nexit 1");
    let good = write_script(dir.path(), "good.sh", "echo good\nexec sleep 30");
    let mut config = config_with(
        dir.path(),
        vec![script_option("bad", bad), script_option("good", good)],
        &[("w1", "bad")],
    );
    config.workers[0].recovery.retries = 0;
    config.workers[0].recovery.interval_seconds = 0;
    config.workers[0].recovery.alternate_option = Some("good".to_string());

    let supervisor = Supervisor::new().with_timings(fast_timings());
    let mut output = forward_output(&supervisor);
    supervisor.start(Arc::new(config)).await.unwrap();

    assert_eq!(next_line(&mut output).await.line, "bad");
    assert_eq!(next_line(&mut output).await.line, "good");
    assert_eq!(supervisor.running_workers().await, vec!["w1"]);

    let report = supervisor.stop().await;
    assert_eq!(report.exited, vec!["w1"]);
}

#[tokio::test]
async fn test_disable_worker_log_stops_writes() {
    let dir = temp_dir();
    let script = write_script(
        dir.path(),
        "ticker.sh",
        "while true; do echo tick; sleep 0.1; done",
    );
    let mut config = config_with(dir.path(), vec![script_option("sh", script)], &[("w1", "sh")]);
    config.debug_logging = true;
    let log_path = config.worker_log_path("w1");

    let supervisor = Supervisor::new()
        .with_timings(fast_timings())
        .with_broadcast_base_port(BASE_PORT + 450);
    let mut output = forward_output(&supervisor);
    supervisor.start(Arc::new(config)).await.unwrap();

    next_line(&mut output).await;
    next_line(&mut output).await;
    assert!(supervisor.disable_worker_log("w1").await);
    tokio::time::sleep(Duration::from_millis(150)).await;

    let before = std::fs::read_to_string(&log_path).unwrap().lines().count();
    assert!(before >= 1);
    tokio::time::sleep(Duration::from_millis(400)).await;
    let after = std::fs::read_to_string(&log_path).unwrap().lines().count();
    assert_eq!(before, after);

    supervisor.stop().await;
}

#[tokio::test]
async fn test_worker_starts_from_relative_config_directory() {
    let dir = tempfile::Builder::new()
        .prefix("herdsman-rel-")
        .tempdir_in(".")
        .unwrap();
    write_script(dir.path(), "minerd", "echo up\nexec sleep 30");
    std::fs::write(
        dir.path().join("herdsman.yaml"),
        "default_option: sh\noptions:\n  - name: sh\n    executable: minerd\nworkers:\n  - name: w1\n",
    )
    .unwrap();
    let relative = std::path::Path::new(dir.path().file_name().unwrap());
    assert!(relative.is_relative());

    let config = ConfigLoader::load(relative).unwrap();
    assert!(config.options[0].executable.is_absolute());

    let supervisor = Supervisor::new().with_timings(fast_timings());
    let mut output = forward_output(&supervisor);
    let report = supervisor.start(Arc::new(config)).await.unwrap();

    assert_eq!(report.started, vec!["w1"]);
    assert!(report.failed.is_empty());
    assert_eq!(next_line(&mut output).await.line, "up");

    supervisor.stop().await;
}

#[tokio::test]
async fn test_unterminated_output_is_chunked() {
    let dir = temp_dir();
    let total = 200_000;
    let script = write_script(
        dir.path(),
        "flood.sh",
        &format!("head -c {total} /dev/zero | tr '\\0' 'a'\necho\nexec sleep 30"),
    );
    let config = config_with(dir.path(), vec![script_option("sh", script)], &[("w1", "sh")]);

    let supervisor = Supervisor::new().with_timings(fast_timings());
    let mut output = forward_output(&supervisor);
    supervisor.start(Arc::new(config)).await.unwrap();

    let mut lengths = Vec::new();
    while lengths.iter().sum::<usize>() < total {
        let event = next_line(&mut output).await;
        assert!(event.line.bytes().all(|b| b == b'a'));
        lengths.push(event.line.len());
    }

    let max = usize::try_from(MAX_LINE_BYTES).unwrap();
    assert_eq!(lengths.iter().sum::<usize>(), total);
    assert!(lengths.iter().all(|len| *len <= max));
    assert_eq!(lengths[0], max);

    supervisor.stop().await;
}

#[tokio::test]
async fn test_stop_survives_panicking_observer() {
    let dir = temp_dir();
    let script = write_script(dir.path(), "miner.sh", "echo boom\nexec sleep 30");
    let config = config_with(dir.path(), vec![script_option("sh", script)], &[("w1", "sh")]);

    let supervisor = Supervisor::new().with_timings(fast_timings());
    let seen = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&seen);
    supervisor.subscribe_output(move |_: &OutputEvent| {
        *flag.lock().unwrap() = true;
        panic!("observer failure");
    });
    supervisor.start(Arc::new(config)).await.unwrap();

    let flag = Arc::clone(&seen);
    assert!(wait_for(move || *flag.lock().unwrap(), 5_000).await);

    let report = supervisor.stop().await;
    assert_eq!(report.exited, vec!["w1"]);
    assert!(report.killed.is_empty());
}
