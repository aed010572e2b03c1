//! Background worker that owns one yt-dlp invocation.
//!
//! The worker never touches widget state; everything the UI needs to know
//! travels through the [`WorkerEvent`] channel, ending with exactly one
//! `Finished`.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::{fs::File, io::Write};

use rust_embed::RustEmbed;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::Command,
    sync::mpsc::UnboundedSender,
};

use crate::model::{LogLevel, WorkerEvent};
use crate::options::DownloadRequest;
use crate::progress::{PROGRESS_TEMPLATE, ProgressLine, parse_progress_line};

#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct Asset;

/// Failures of a single run, flattened to one error log line at the UI
/// boundary.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("yt-dlp not found: bundle it under assets/ or install it on PATH")]
    MissingBinary,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("yt-dlp exited with {0}")]
    Engine(ExitStatus),
}

/// Runs one download to completion, reporting through `events`.
///
/// Infallible from the caller's side: every failure becomes an error log
/// line, and `Finished` is always the last event sent.
pub async fn run_download(request: DownloadRequest, events: UnboundedSender<WorkerEvent>) {
    match execute(&request, &events).await {
        Ok(()) => {
            let _ = events.send(WorkerEvent::progress("Done.", 1.0));
            let _ = events.send(WorkerEvent::log(
                LogLevel::Success,
                "Process finished successfully!",
            ));
        }
        Err(err) => {
            let _ = events.send(WorkerEvent::log(
                LogLevel::Error,
                format!("Download failed: {err}"),
            ));
        }
    }
    let _ = events.send(WorkerEvent::Finished);
}

async fn execute(
    request: &DownloadRequest,
    events: &UnboundedSender<WorkerEvent>,
) -> Result<(), DownloadError> {
    let bin = locate_engine()?;

    let mut args = request.to_args();
    args.push("--newline".to_owned());
    args.push("--progress-template".to_owned());
    args.push(PROGRESS_TEMPLATE.to_owned());
    args.push(request.url.clone());

    tracing::debug!(?bin, ?args, "spawning engine");

    let mut child = Command::new(bin)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let out = child.stdout.take().unwrap();
    let err = child.stderr.take().unwrap();

    // Drain stderr on its own task so neither pipe can fill up and stall
    // the engine.
    let diag_events = events.clone();
    let diagnostics = tokio::spawn(async move {
        let mut lines = BufReader::new(err).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match classify_diagnostic(&line) {
                Some((level, message)) => {
                    let _ = diag_events.send(WorkerEvent::log(level, message));
                }
                None => tracing::debug!("engine: {line}"),
            }
        }
    });

    let mut lines = BufReader::new(out).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_progress_line(&line) {
            Some(ProgressLine::Downloading { message, fraction }) => {
                let _ = events.send(WorkerEvent::progress(message, fraction));
            }
            Some(ProgressLine::Finished) => {
                let _ = events.send(WorkerEvent::log(
                    LogLevel::Info,
                    "Download finished. Running post-processing...",
                ));
            }
            None => tracing::debug!("engine: {line}"),
        }
    }

    let _ = diagnostics.await;

    let status = child.wait().await?;
    if status.success() {
        Ok(())
    } else {
        Err(DownloadError::Engine(status))
    }
}

/// Splits the engine's stderr by severity. Warnings and errors reach the UI
/// log; anything else is dropped to the debug stream by the caller.
fn classify_diagnostic(line: &str) -> Option<(LogLevel, String)> {
    if line.starts_with("WARNING:") {
        Some((LogLevel::Warning, line.to_owned()))
    } else if line.starts_with("ERROR:") {
        Some((LogLevel::Error, line.to_owned()))
    } else {
        None
    }
}

/// Finds the engine: a copy bundled under `assets/` wins, unpacked once to
/// the temp directory; otherwise fall back to whatever is on PATH.
fn locate_engine() -> Result<PathBuf, DownloadError> {
    let bin = if cfg!(target_os = "windows") {
        "yt-dlp.exe"
    } else {
        "yt-dlp"
    };

    if let Some(embedded) = Asset::get(bin) {
        let target = std::env::temp_dir().join(bin);
        if !target.exists() {
            let mut file = File::create(&target)?;
            file.write_all(&embedded.data)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o755))?;
            }
        }
        return Ok(target);
    }

    which::which(bin).map_err(|_| DownloadError::MissingBinary)
}

/// Startup probe used to seed a warning into the log view before the first
/// click.
pub fn engine_available() -> bool {
    locate_engine().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_and_errors_are_forwarded_tagged() {
        assert_eq!(
            classify_diagnostic("WARNING: unable to extract chapter data"),
            Some((
                LogLevel::Warning,
                "WARNING: unable to extract chapter data".to_owned()
            ))
        );
        assert_eq!(
            classify_diagnostic("ERROR: Unsupported URL: https://nope"),
            Some((
                LogLevel::Error,
                "ERROR: Unsupported URL: https://nope".to_owned()
            ))
        );
    }

    #[test]
    fn debug_chatter_is_discarded() {
        assert_eq!(classify_diagnostic("[debug] Loaded 1832 extractors"), None);
        assert_eq!(classify_diagnostic("[youtube] abc: Downloading webpage"), None);
        assert_eq!(classify_diagnostic(""), None);
    }

    #[test]
    fn failures_flatten_to_display_strings() {
        assert_eq!(
            DownloadError::MissingBinary.to_string(),
            "yt-dlp not found: bundle it under assets/ or install it on PATH"
        );
    }
}
