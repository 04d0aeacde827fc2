//! Worker process supervisor
//!
//! Launches every enabled worker with its resolved command line, pumps its
//! output to observers, the worker's log file and the status broadcast, and
//! shuts everything down within a bounded window.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::recovery::{monitor_worker, RecoveryTracker};
use crate::domain::errors::{LaunchError, LaunchResult, SupervisorError};
use crate::domain::models::{
    GlobalConfig, OutputEvent, OutputStream, PriorityClass, StartReport, StopReport,
    SupervisorState, WorkerSpec, DEFAULT_PORT,
};
use crate::domain::ports::ProcessControl;
use crate::infrastructure::broadcast::{format_status, BroadcastServer, BASE_PORT};
use crate::infrastructure::logging::{SecretScrubber, WorkerLogSink};
use crate::infrastructure::process::{apply_identity, resolve_identity, UnixProcessControl};
use crate::services::{
    build_command_line, resolve_cpu_affinity, resolve_host_port, resolve_priority, sanitize_line,
    split_command_line, CommandLineParams, ObserverId, ObserverRegistry,
};

/// Environment variable carrying the worker's name into its process
pub const WORKER_NAME_ENV: &str = "HERDSMAN_WORKER_NAME";

/// Byte written to a worker's stdin to ask it to quit
const ETX: u8 = 0x03;

/// Longest output line passed on whole; longer runs are split into chunks
pub const MAX_LINE_BYTES: u64 = 64 * 1024;

/// Timing knobs for liveness polling and shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownTimings {
    /// Delay between liveness checks while waiting for workers to exit
    pub poll_interval: Duration,
    /// Liveness checks before survivors are killed
    pub poll_attempts: u32,
    /// Delay between recovery monitor checks
    pub monitor_interval: Duration,
}

impl Default for ShutdownTimings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            poll_attempts: 8,
            monitor_interval: Duration::from_secs(1),
        }
    }
}

impl ShutdownTimings {
    /// Total time workers get to exit on their own
    pub fn graceful_window(&self) -> Duration {
        self.poll_interval * self.poll_attempts
    }
}

/// A launched worker process
pub(crate) struct RunningWorker {
    pub(crate) child: Child,
    pub(crate) pid: Option<u32>,
    output_cancel: CancellationToken,
    pumps: Vec<JoinHandle<()>>,
}

impl RunningWorker {
    /// Query errors count as exited
    fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Stop output pumping, send ETX on stdin and request a close
    async fn request_close(&mut self, name: &str, control: &dyn ProcessControl) {
        self.output_cancel.cancel();

        if let Some(mut stdin) = self.child.stdin.take() {
            if let Err(e) = stdin.write_all(&[ETX]).await {
                debug!(worker = name, error = %e, "failed to write ETX");
            }
            if let Err(e) = stdin.flush().await {
                debug!(worker = name, error = %e, "failed to flush stdin");
            }
        }

        if let Some(pid) = self.pid.filter(|_| self.is_alive()) {
            if let Err(e) = control.request_close(pid) {
                warn!(worker = name, error = %e, "failed to request worker close");
            }
        }
    }
}

impl Drop for RunningWorker {
    fn drop(&mut self) {
        self.output_cancel.cancel();
    }
}

pub(crate) type WorkerTable = Arc<Mutex<HashMap<String, RunningWorker>>>;

/// State shared by output pumps and recovery monitors for one run
pub(crate) struct SupervisorContext {
    pub(crate) config: Arc<GlobalConfig>,
    log_sink: Arc<WorkerLogSink>,
    server: Option<Arc<BroadcastServer>>,
    output_observers: Arc<ObserverRegistry<OutputEvent>>,
    error_observers: Arc<ObserverRegistry<OutputEvent>>,
    control: Arc<dyn ProcessControl>,
    scrubber: Option<SecretScrubber>,
}

impl SupervisorContext {
    async fn handle_line(&self, worker: &str, stream: OutputStream, line: String) {
        let event = OutputEvent {
            worker: worker.to_string(),
            stream,
            line,
        };
        match stream {
            OutputStream::Stdout => self.output_observers.notify(&event),
            OutputStream::Stderr => self.error_observers.notify(&event),
        }

        if !self.config.debug_logging || event.line.trim().is_empty() {
            return;
        }

        let clean = sanitize_line(&event.line);
        match stream {
            OutputStream::Stdout => info!(worker, "{clean}"),
            OutputStream::Stderr => error!(worker, "{clean}"),
        }

        if let Err(e) = self.log_sink.write(worker, &clean).await {
            warn!(worker, error = %e, "failed to write worker log");
        }

        let publish = self
            .config
            .worker(worker)
            .is_some_and(|spec| spec.status_updates);
        if let (true, Some(server)) = (publish, self.server.as_ref()) {
            server.write(&format_status(worker, &clean)).await;
        }
    }

    fn scrub(&self, line: &str, secrets: &[&str]) -> String {
        self.scrubber.as_ref().map_or_else(
            || "[command line withheld]".to_string(),
            |scrubber| scrubber.scrub_with(line, secrets),
        )
    }
}

/// Build and spawn a worker's process with the given option template
pub(crate) fn launch_worker(
    ctx: &Arc<SupervisorContext>,
    spec: &WorkerSpec,
    option_key: &str,
) -> LaunchResult<RunningWorker> {
    let config = &ctx.config;
    let option = config
        .option(option_key)
        .ok_or_else(|| LaunchError::UnknownOption {
            worker: spec.name.clone(),
            option: option_key.to_string(),
        })?;

    if option.executable.as_os_str().is_empty() {
        return Err(LaunchError::EmptyCommandLine(spec.name.clone()));
    }

    let (host, port) = resolve_host_port(spec, config.pool_for(spec), DEFAULT_PORT);
    let password = config.password_for(spec);
    let line = build_command_line(
        &option.argument_format,
        &CommandLineParams {
            host: &host,
            port,
            username: config.username_for(spec),
            password,
            extra_args: spec.arguments.as_deref().unwrap_or(&option.arguments),
        },
    );
    let identity = resolve_identity(&spec.name, &spec.process)?;

    // The child changes directory before exec, so the program path must not be relative
    let program = std::path::absolute(&option.executable).map_err(|source| LaunchError::Spawn {
        worker: spec.name.clone(),
        source,
    })?;

    let mut command = Command::new(&program);
    command
        .args(split_command_line(&line))
        .env(WORKER_NAME_ENV, &spec.name)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = program.parent() {
        command.current_dir(dir);
    }
    if let Some(identity) = &identity {
        apply_identity(&mut command, identity, spec.process.load_user_profile);
    }

    info!(
        worker = %spec.name,
        option = option_key,
        executable = %program.display(),
        args = %ctx.scrub(&line, &[password]),
        run_as = identity.as_ref().map(|i| i.name.as_str()),
        "launching worker"
    );

    let mut child = command.spawn().map_err(|source| LaunchError::Spawn {
        worker: spec.name.clone(),
        source,
    })?;
    let pid = child.id();

    if let Some(pid) = pid {
        apply_process_controls(ctx.control.as_ref(), &spec.name, pid, spec);
    }

    let stdout = child.stdout.take().ok_or_else(|| LaunchError::MissingPipe {
        worker: spec.name.clone(),
        stream: OutputStream::Stdout,
    })?;
    let stderr = child.stderr.take().ok_or_else(|| LaunchError::MissingPipe {
        worker: spec.name.clone(),
        stream: OutputStream::Stderr,
    })?;

    let output_cancel = CancellationToken::new();
    let pumps = vec![
        tokio::spawn(pump_output(
            Arc::clone(ctx),
            spec.name.clone(),
            OutputStream::Stdout,
            stdout,
            output_cancel.clone(),
        )),
        tokio::spawn(pump_output(
            Arc::clone(ctx),
            spec.name.clone(),
            OutputStream::Stderr,
            stderr,
            output_cancel.clone(),
        )),
    ];

    Ok(RunningWorker {
        child,
        pid,
        output_cancel,
        pumps,
    })
}

fn apply_process_controls(control: &dyn ProcessControl, worker: &str, pid: u32, spec: &WorkerSpec) {
    let priority = resolve_priority(spec.process.priority);
    if priority != PriorityClass::Normal {
        if let Err(e) = control.set_priority(pid, priority) {
            warn!(worker, pid, %priority, error = %e, "failed to set worker priority");
        }
    }

    if let Some(mask) = resolve_cpu_affinity(&spec.process.cpu_affinity) {
        if let Err(e) = control.set_affinity(pid, mask) {
            warn!(worker, pid, mask, error = %e, "failed to set worker CPU affinity");
        }
    }
}

async fn pump_output<R>(
    ctx: Arc<SupervisorContext>,
    worker: String,
    stream: OutputStream,
    reader: R,
    cancel: CancellationToken,
) where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader).take(MAX_LINE_BYTES);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        reader.set_limit(MAX_LINE_BYTES);
        let read = tokio::select! {
            () = cancel.cancelled() => break,
            read = reader.read_until(b'\n', &mut buf) => read,
        };

        match read {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                ctx.handle_line(&worker, stream, line).await;
            }
            Err(e) => {
                warn!(worker = %worker, %stream, error = %e, "failed to read worker output");
                break;
            }
        }
    }

    debug!(worker = %worker, %stream, "output pump finished");
}

struct Session {
    context: Arc<SupervisorContext>,
    monitor_cancel: CancellationToken,
    monitors: Vec<JoinHandle<()>>,
}

/// Starts, watches and stops the configured workers
pub struct Supervisor {
    session: Mutex<Option<Session>>,
    state: StdMutex<SupervisorState>,
    workers: WorkerTable,
    log_sink: Arc<WorkerLogSink>,
    output_observers: Arc<ObserverRegistry<OutputEvent>>,
    error_observers: Arc<ObserverRegistry<OutputEvent>>,
    control: Arc<dyn ProcessControl>,
    scrubber: Option<SecretScrubber>,
    timings: ShutdownTimings,
    broadcast_base_port: u16,
}

impl Supervisor {
    pub fn new() -> Self {
        let scrubber = SecretScrubber::new()
            .map_err(|e| warn!(error = %e, "secret scrubber unavailable, command lines will not be logged"))
            .ok();

        Self {
            session: Mutex::new(None),
            state: StdMutex::new(SupervisorState::Stopped),
            workers: Arc::new(Mutex::new(HashMap::new())),
            log_sink: Arc::new(WorkerLogSink::new()),
            output_observers: Arc::new(ObserverRegistry::new()),
            error_observers: Arc::new(ObserverRegistry::new()),
            control: Arc::new(UnixProcessControl::new()),
            scrubber,
            timings: ShutdownTimings::default(),
            broadcast_base_port: BASE_PORT,
        }
    }

    /// Override liveness polling and shutdown timings
    #[must_use]
    pub fn with_timings(mut self, timings: ShutdownTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Replace the OS process controls
    #[must_use]
    pub fn with_process_control(mut self, control: Arc<dyn ProcessControl>) -> Self {
        self.control = control;
        self
    }

    /// Send status broadcasts to a different port range
    #[must_use]
    pub fn with_broadcast_base_port(mut self, base_port: u16) -> Self {
        self.broadcast_base_port = base_port;
        self
    }

    /// Launch every enabled worker
    ///
    /// Workers are started in name order. A worker that fails to launch is
    /// reported in [`StartReport::failed`] without affecting the others.
    pub async fn start(&self, config: Arc<GlobalConfig>) -> Result<StartReport, SupervisorError> {
        let mut session = self.session.lock().await;
        if session.is_some() {
            return Err(SupervisorError::AlreadyStarted);
        }

        let server = if config.debug_logging {
            let server = BroadcastServer::start_with_base(self.broadcast_base_port)
                .await
                .map_err(|e| SupervisorError::Broadcast(e.to_string()))?;
            Some(Arc::new(server))
        } else {
            None
        };

        for worker in config.enabled_workers().filter(|w| w.log.enabled) {
            let path = config.worker_log_path(&worker.name);
            if let Err(e) = self
                .log_sink
                .open(&worker.name, &path, worker.log.max_bytes)
                .await
            {
                warn!(
                    worker = %worker.name,
                    path = %path.display(),
                    error = %e,
                    "failed to open worker log, continuing without it"
                );
            }
        }

        let ctx = Arc::new(SupervisorContext {
            config: Arc::clone(&config),
            log_sink: Arc::clone(&self.log_sink),
            server,
            output_observers: Arc::clone(&self.output_observers),
            error_observers: Arc::clone(&self.error_observers),
            control: Arc::clone(&self.control),
            scrubber: self.scrubber.clone(),
        });

        let mut specs: Vec<&WorkerSpec> = config.workers.iter().collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));

        let monitor_cancel = CancellationToken::new();
        let mut monitors = Vec::new();
        let mut report = StartReport::default();

        for spec in specs {
            if !spec.enabled {
                debug!(worker = %spec.name, "worker disabled, skipping");
                report.skipped.push(spec.name.clone());
                continue;
            }

            let option = config.option_key_for(spec).to_string();
            match launch_worker(&ctx, spec, &option) {
                Ok(running) => {
                    info!(worker = %spec.name, pid = ?running.pid, "worker started");
                    self.workers.lock().await.insert(spec.name.clone(), running);
                    report.started.push(spec.name.clone());

                    monitors.push(tokio::spawn(monitor_worker(
                        Arc::clone(&ctx),
                        Arc::clone(&self.workers),
                        spec.name.clone(),
                        RecoveryTracker::new(option, spec.recovery.clone()),
                        self.timings.monitor_interval,
                        monitor_cancel.clone(),
                    )));
                }
                Err(e) => {
                    error!(worker = %spec.name, error = %e, "failed to launch worker");
                    report.failed.push((spec.name.clone(), e.to_string()));
                }
            }
        }

        *session = Some(Session {
            context: ctx,
            monitor_cancel,
            monitors,
        });
        self.set_state(SupervisorState::Started);

        info!(
            started = report.started.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "supervisor started"
        );
        Ok(report)
    }

    /// Ask every worker to exit, then kill whatever is left
    ///
    /// Workers get ETX on stdin and a close request, then up to
    /// `poll_attempts` checks `poll_interval` apart before being killed.
    /// Stopping a stopped supervisor returns an empty report.
    pub async fn stop(&self) -> StopReport {
        let mut session_slot = self.session.lock().await;
        let Some(session) = session_slot.take() else {
            return StopReport::default();
        };

        session.monitor_cancel.cancel();
        for monitor in session.monitors {
            if let Err(e) = monitor.await {
                warn!(error = %e, "recovery monitor ended abnormally");
            }
        }

        let mut workers = self.workers.lock().await;
        info!(workers = workers.len(), "stopping workers");
        for (name, worker) in workers.iter_mut() {
            worker.request_close(name, session.context.control.as_ref()).await;
        }

        for _ in 0..self.timings.poll_attempts {
            if !workers.values_mut().any(RunningWorker::is_alive) {
                break;
            }
            tokio::time::sleep(self.timings.poll_interval).await;
        }

        let mut report = StopReport::default();
        let mut pumps = Vec::new();
        for (name, mut worker) in workers.drain() {
            if worker.is_alive() {
                warn!(worker = %name, "worker did not exit in time, killing");
                if let Err(e) = worker.child.kill().await {
                    error!(worker = %name, error = %e, "failed to kill worker");
                }
                report.killed.push(name);
            } else {
                report.exited.push(name);
            }
            pumps.append(&mut worker.pumps);
        }
        drop(workers);

        for pump in pumps {
            if let Err(e) = pump.await {
                warn!(error = %e, "output pump ended abnormally");
            }
        }
        report.exited.sort();
        report.killed.sort();

        if let Some(server) = &session.context.server {
            server.stop().await;
        }
        self.log_sink.close_all().await;
        self.set_state(SupervisorState::Stopped);

        info!(
            exited = report.exited.len(),
            killed = report.killed.len(),
            "supervisor stopped"
        );
        report
    }

    pub fn state(&self) -> SupervisorState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Names of the workers currently tracked, sorted
    pub async fn running_workers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.workers.lock().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Process id of a tracked worker
    pub async fn worker_pid(&self, name: &str) -> Option<u32> {
        self.workers.lock().await.get(name).and_then(|w| w.pid)
    }

    /// Register a callback for stdout lines
    pub fn subscribe_output<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&OutputEvent) + Send + Sync + 'static,
    {
        self.output_observers.subscribe(callback)
    }

    /// Register a callback for stderr lines
    pub fn subscribe_errors<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&OutputEvent) + Send + Sync + 'static,
    {
        self.error_observers.subscribe(callback)
    }

    pub fn unsubscribe_output(&self, id: ObserverId) -> bool {
        self.output_observers.unsubscribe(id)
    }

    pub fn unsubscribe_errors(&self, id: ObserverId) -> bool {
        self.error_observers.unsubscribe(id)
    }

    /// Stop writing a worker's log file until the next start
    pub async fn disable_worker_log(&self, name: &str) -> bool {
        self.log_sink.disable(name).await
    }

    fn set_state(&self, state: SupervisorState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        if let Some(session) = self.session.get_mut().take() {
            session.monitor_cancel.cancel();
        }

        if let Ok(mut workers) = self.workers.try_lock() {
            for (name, worker) in workers.iter_mut() {
                if worker.is_alive() {
                    warn!(worker = %name, "supervisor dropped while running, killing worker");
                    let _ = worker.child.start_kill();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ProcessControlError;
    use crate::domain::models::OptionTemplate;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingControl {
        calls: StdMutex<Vec<String>>,
    }

    impl ProcessControl for RecordingControl {
        fn set_priority(&self, _pid: u32, priority: PriorityClass) -> Result<(), ProcessControlError> {
            self.calls.lock().unwrap().push(format!("priority:{priority}"));
            Ok(())
        }

        fn set_affinity(&self, _pid: u32, mask: u64) -> Result<(), ProcessControlError> {
            self.calls.lock().unwrap().push(format!("affinity:{mask:#x}"));
            Ok(())
        }

        fn request_close(&self, pid: u32) -> Result<(), ProcessControlError> {
            self.calls.lock().unwrap().push("close".to_string());
            UnixProcessControl::new().request_close(pid)
        }
    }

    fn shell_config(dir: &TempDir, script: &str) -> GlobalConfig {
        GlobalConfig {
            default_option: "sh".to_string(),
            base_path: dir.path().to_path_buf(),
            options: vec![OptionTemplate {
                name: "sh".to_string(),
                executable: PathBuf::from("/bin/sh"),
                argument_format: format!("-c \"{script}\""),
                arguments: String::new(),
            }],
            workers: vec![WorkerSpec::new("w1", "sh")],
            ..Default::default()
        }
    }

    fn fast_timings() -> ShutdownTimings {
        ShutdownTimings {
            poll_interval: Duration::from_millis(50),
            poll_attempts: 4,
            monitor_interval: Duration::from_millis(50),
        }
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let dir = TempDir::new().unwrap();
        let config = Arc::new(shell_config(&dir, "exec sleep 30"));
        let supervisor = Supervisor::new().with_timings(fast_timings());

        let report = supervisor.start(Arc::clone(&config)).await.unwrap();
        assert_eq!(report.started, vec!["w1"]);
        assert_eq!(supervisor.state(), SupervisorState::Started);

        let err = supervisor.start(config).await.unwrap_err();
        assert!(matches!(err, SupervisorError::AlreadyStarted));

        let stopped = supervisor.stop().await;
        assert_eq!(stopped.exited, vec!["w1"]);
        assert_eq!(supervisor.state(), SupervisorState::Stopped);
        assert!(supervisor.running_workers().await.is_empty());
    }

    #[tokio::test]
    async fn test_stop_when_stopped_is_empty() {
        let supervisor = Supervisor::new();
        let report = supervisor.stop().await;
        assert!(report.exited.is_empty());
        assert!(report.killed.is_empty());
    }

    #[tokio::test]
    async fn test_process_controls_applied_after_spawn() {
        let dir = TempDir::new().unwrap();
        let mut config = shell_config(&dir, "exec sleep 30");
        config.workers[0].process.priority = -1;
        config.workers[0].process.cpu_affinity = "1".to_string();

        let control = Arc::new(RecordingControl::default());
        let supervisor = Supervisor::new()
            .with_timings(fast_timings())
            .with_process_control(Arc::clone(&control) as Arc<dyn ProcessControl>);

        supervisor.start(Arc::new(config)).await.unwrap();
        supervisor.stop().await;

        let calls = control.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["priority:below_normal", "affinity:0x1", "close"]);
    }

    #[tokio::test]
    async fn test_normal_priority_and_no_affinity_leave_process_alone() {
        let dir = TempDir::new().unwrap();
        let config = shell_config(&dir, "exec sleep 30");

        let control = Arc::new(RecordingControl::default());
        let supervisor = Supervisor::new()
            .with_timings(fast_timings())
            .with_process_control(Arc::clone(&control) as Arc<dyn ProcessControl>);

        supervisor.start(Arc::new(config)).await.unwrap();
        supervisor.stop().await;

        assert_eq!(*control.calls.lock().unwrap(), vec!["close"]);
    }

    #[tokio::test]
    async fn test_launch_failures_are_isolated() {
        let dir = TempDir::new().unwrap();
        let mut config = shell_config(&dir, "exec sleep 30");
        config.options.push(OptionTemplate {
            name: "missing".to_string(),
            executable: dir.path().join("no-such-miner"),
            ..Default::default()
        });
        config.workers.push(WorkerSpec::new("broken", "missing"));
        let mut disabled = WorkerSpec::new("idle", "sh");
        disabled.enabled = false;
        config.workers.push(disabled);

        let supervisor = Supervisor::new().with_timings(fast_timings());
        let report = supervisor.start(Arc::new(config)).await.unwrap();

        assert_eq!(report.started, vec!["w1"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "broken");
        assert_eq!(report.skipped, vec!["idle"]);
        assert!(!report.all_started());

        supervisor.stop().await;
    }

    #[tokio::test]
    async fn test_worker_name_is_exported() {
        let dir = TempDir::new().unwrap();
        let config = shell_config(&dir, "echo name=$HERDSMAN_WORKER_NAME; exec sleep 30");
        let supervisor = Supervisor::new().with_timings(fast_timings());

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        supervisor.subscribe_output(move |event: &OutputEvent| {
            let _ = tx.send(event.line.clone());
        });

        supervisor.start(Arc::new(config)).await.unwrap();
        let line = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(line, "name=w1");

        supervisor.stop().await;
    }

    #[test]
    fn test_default_graceful_window() {
        assert_eq!(
            ShutdownTimings::default().graceful_window(),
            Duration::from_secs(4)
        );
    }
}
