//! The tray-channel client: lockfile discovery plus a fire-and-forget
//! HTTP POST to the tray receiver process. Uses `reqwest::blocking` to
//! stay inside this crate's single-threaded, synchronous model — there
//! is no async runtime anywhere else in it.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::error::{AppError, AppResult};

const NOTIFICATION_DURATION_MS: u64 = 8_000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub trait NotificationSender {
    fn send(&self, message: &str) -> AppResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TrayEndpoint {
    port: u16,
    pid: u32,
    secret: String,
}

#[derive(Serialize)]
struct NotifyPayload<'a> {
    text: &'a str,
    duration_ms: u64,
}

pub struct TrayClient {
    lockfile_path: PathBuf,
}

impl TrayClient {
    pub fn new(tray_config_dir: impl Into<PathBuf>) -> Self {
        TrayClient {
            lockfile_path: tray_config_dir.into().join("daylit-tray.lock"),
        }
    }

    fn discover(&self) -> AppResult<TrayEndpoint> {
        let raw = fs::read_to_string(&self.lockfile_path).map_err(|_| {
            AppError::precondition("tray lockfile not found; is the tray process running?")
        })?;
        parse_lockfile(raw.trim())
    }
}

impl NotificationSender for TrayClient {
    fn send(&self, message: &str) -> AppResult<()> {
        let endpoint = self.discover()?;
        if !process_is_daylit_tray(endpoint.pid) {
            return Err(AppError::precondition(
                "tray lockfile points at a process that is not daylit-tray",
            ));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| AppError::other(format!("failed to build http client: {err}")))?;

        let response = client
            .post(format!("http://127.0.0.1:{}", endpoint.port))
            .header("X-Daylit-Secret", &endpoint.secret)
            .json(&NotifyPayload {
                text: message,
                duration_ms: NOTIFICATION_DURATION_MS,
            })
            .send()
            .map_err(|err| AppError::other(format!("tray delivery failed: {err}")))?;

        if !response.status().is_success() {
            return Err(AppError::other(format!(
                "tray responded with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

fn parse_lockfile(contents: &str) -> AppResult<TrayEndpoint> {
    let fields: Vec<&str> = contents.split('|').collect();
    if fields.len() != 3 {
        return Err(AppError::validation(
            "tray lockfile must have exactly three pipe-delimited fields",
        ));
    }
    let [port_str, pid_str, secret] = [fields[0], fields[1], fields[2]];

    if port_str.is_empty() || pid_str.is_empty() || secret.trim().is_empty() {
        return Err(AppError::validation("tray lockfile has an empty field"));
    }

    let port: u16 = port_str
        .parse()
        .map_err(|_| AppError::validation("tray lockfile port is not a valid port number"))?;
    if port == 0 {
        return Err(AppError::validation("tray lockfile port must be between 1 and 65535"));
    }

    let pid: u32 = pid_str
        .parse()
        .map_err(|_| AppError::validation("tray lockfile pid is not a valid process id"))?;

    Ok(TrayEndpoint {
        port,
        pid,
        secret: secret.to_string(),
    })
}

#[cfg(target_os = "linux")]
fn process_is_daylit_tray(pid: u32) -> bool {
    process_comm(pid)
        .map(|comm| comm.starts_with("daylit-tray"))
        .unwrap_or(false)
}

#[cfg(target_os = "linux")]
fn process_comm(pid: u32) -> Option<String> {
    fs::read_to_string(format!("/proc/{pid}/comm"))
        .ok()
        .map(|s| s.trim().to_string())
}

#[cfg(not(target_os = "linux"))]
fn process_is_daylit_tray(_pid: u32) -> bool {
    // No portable process-inspection API without an extra dependency;
    // the lockfile's pid/secret pairing is still required.
    true
}
