//! Launch parameter resolution
//!
//! Pure functions that turn a worker's configuration into the endpoint,
//! command line, scheduling class and CPU mask it is started with.

use crate::domain::models::{Pool, PriorityClass, WorkerSpec};

/// Values substituted into an option template's argument format
#[derive(Debug, Clone, Copy)]
pub struct CommandLineParams<'a> {
    pub host: &'a str,
    pub port: u16,
    pub username: &'a str,
    pub password: &'a str,
    pub extra_args: &'a str,
}

/// Resolve the host and port a worker connects to
///
/// Worker overrides win, then the pool's endpoint. A worker with neither
/// gets an empty host and `default_port`.
pub fn resolve_host_port(
    worker: &WorkerSpec,
    pool: Option<&Pool>,
    default_port: u16,
) -> (String, u16) {
    let host = match (worker.host.as_deref(), pool) {
        (Some(host), _) if !host.is_empty() => host.to_string(),
        (_, Some(pool)) => pool.host.clone(),
        (host, None) => host.unwrap_or_default().to_string(),
    };

    let port = worker
        .port
        .or_else(|| pool.map(|p| p.port))
        .unwrap_or(default_port);

    (host, port)
}

/// Substitute placeholders in an argument format
///
/// `{host}`, `{username}`, `{password}` and `{port}` are replaced first,
/// then `{combinedhost}`, then `{args}`. Unknown placeholders are left as
/// they are. No quoting is applied to substituted values.
pub fn build_command_line(format: &str, params: &CommandLineParams<'_>) -> String {
    let mut line = format
        .replace("{host}", params.host)
        .replace("{username}", params.username)
        .replace("{password}", params.password)
        .replace("{port}", &params.port.to_string());

    if line.contains("{combinedhost}") {
        line = line.replace("{combinedhost}", &combined_host(params));
    }

    line.replace("{args}", params.extra_args)
}

/// Host with the credential block embedded, e.g. `stratum+tcp://u:p@pool:3333`
fn combined_host(params: &CommandLineParams<'_>) -> String {
    if params.host.is_empty() || params.username.is_empty() {
        return params.host.to_string();
    }

    let auth = if params.password.is_empty() {
        format!("{}@", params.username)
    } else {
        format!("{}:{}@", params.username, params.password)
    };

    match params.host.find("://") {
        Some(idx) => {
            let split = idx + "://".len();
            format!("{}{}{}", &params.host[..split], auth, &params.host[split..])
        }
        None => format!("http://{}{}", auth, params.host),
    }
}

/// Split a built command line into argv on whitespace
///
/// Quotes and backslashes are passed through verbatim; no shell is involved.
pub fn split_command_line(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_owned).collect()
}

/// Map a configured priority level onto a scheduling class
pub const fn resolve_priority(level: i16) -> PriorityClass {
    PriorityClass::from_level(level)
}

/// Parse a CPU list into an affinity bitmask
///
/// Accepts a comma-separated list of 1-based CPU indices (`1,2,4,6`), a single
/// inclusive range (`3-4`) or a single index (`5`). Bit `n - 1` is set for
/// CPU `n`. Returns `None` when nothing valid is found, meaning "OS default".
pub fn resolve_cpu_affinity(spec: &str) -> Option<u64> {
    let spec = spec.trim();
    if spec.is_empty() {
        return None;
    }

    let mask = if spec.contains(',') {
        spec.split(',')
            .filter_map(|token| token.trim().parse::<i64>().ok())
            .filter_map(cpu_bit)
            .fold(0, |acc, bit| acc | bit)
    } else if let Some((low, high)) = spec.split_once('-') {
        let low = low.trim().parse::<i64>().ok()?;
        let high = high.trim().parse::<i64>().ok()?;
        (low.max(1)..=high.min(64))
            .filter_map(cpu_bit)
            .fold(0, |acc, bit| acc | bit)
    } else {
        cpu_bit(spec.parse::<i64>().ok()?)?
    };

    (mask != 0).then_some(mask)
}

fn cpu_bit(cpu: i64) -> Option<u64> {
    (1..=64).contains(&cpu).then(|| 1u64 << (cpu - 1))
}

/// Strip characters that do not belong in a log line
///
/// Letters, digits, punctuation, separators and whitespace are kept. ANSI
/// escape sequences and other control characters are dropped.
pub fn sanitize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            if chars.peek() == Some(&'[') {
                chars.next();
                // CSI parameters run until a final byte in '@'..='~'
                for next in chars.by_ref() {
                    if ('@'..='~').contains(&next) {
                        break;
                    }
                }
            }
            continue;
        }

        if is_printable(c) {
            out.push(c);
        }
    }

    out
}

fn is_printable(c: char) -> bool {
    c.is_alphanumeric()
        || c.is_ascii_punctuation()
        || (c.is_whitespace() && c != '\u{85}')
        || is_unicode_punctuation(c)
}

fn is_unicode_punctuation(c: char) -> bool {
    matches!(
        c,
        '\u{a1}' | '\u{a7}' | '\u{ab}' | '\u{b6}' | '\u{b7}' | '\u{bb}' | '\u{bf}'
            | '\u{2010}'..='\u{2027}'
            | '\u{2030}'..='\u{205e}'
            | '\u{3001}'..='\u{3003}'
            | '\u{3008}'..='\u{3011}'
    )
}
