/// Severity tag for a line in the log view.
///
/// The tag only selects the display color; all levels land in the same
/// append-only log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    /// Informational notices (download started, conversion phase, ...)
    Info,
    /// Engine warnings, forwarded verbatim
    Warning,
    /// Engine or worker failures
    Error,
    /// Final confirmation of a completed run
    Success,
}

/// Events the download worker sends back to the UI thread.
///
/// Events of one run arrive in emission order; `Finished` is sent exactly
/// once per run and always last.
#[derive(Clone, Debug, PartialEq)]
pub enum WorkerEvent {
    /// Transfer status: one display line plus the fractional percentage
    /// (0.0 to 1.0) for the progress bar.
    Progress { message: String, fraction: f32 },
    /// A tagged line for the log view.
    Log { level: LogLevel, message: String },
    /// Terminal event; returns the UI to idle.
    Finished,
}

impl WorkerEvent {
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        Self::Log {
            level,
            message: message.into(),
        }
    }

    pub fn progress(message: impl Into<String>, fraction: f32) -> Self {
        Self::Progress {
            message: message.into(),
            fraction,
        }
    }
}
