//! Parsing of the engine's templated progress lines.
//!
//! The worker passes `--progress-template` so every transfer update arrives
//! on stdout as one line:
//!
//! `progress:<status>|<percent>|<speed>|<eta>`

/// Template handed to the engine; keep in sync with [`parse_progress_line`].
pub const PROGRESS_TEMPLATE: &str =
    "progress:%(progress.status)s|%(progress._percent_str)s|%(progress._speed_str)s|%(progress._eta_str)s";

const PROGRESS_PREFIX: &str = "progress:";

/// A decoded progress line.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressLine {
    /// Transfer in flight: display line plus fraction in 0.0..=1.0.
    Downloading { message: String, fraction: f32 },
    /// Download phase done, post-processing about to start.
    Finished,
}

/// Decodes one stdout line, or `None` if it is not a well-formed progress
/// line. Malformed percent fields are swallowed here rather than surfaced.
pub fn parse_progress_line(line: &str) -> Option<ProgressLine> {
    let payload = line.strip_prefix(PROGRESS_PREFIX)?;
    let mut fields = payload.split('|');
    let status = fields.next()?.trim();

    match status {
        "downloading" => {
            let percent = fields.next()?.trim();
            let speed = fields.next()?.trim();
            let eta = fields.next()?.trim();
            let number = percent.strip_suffix('%')?.trim();
            let value: f32 = number.parse().ok()?;
            let fraction = (value / 100.0).clamp(0.0, 1.0);
            Some(ProgressLine::Downloading {
                message: format!("{number}% | {speed} | ETA: {eta}"),
                fraction,
            })
        }
        "finished" => Some(ProgressLine::Finished),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downloading_line_yields_fraction_and_display_line() {
        let parsed = parse_progress_line("progress:downloading|  50.0%|   1.25MiB/s|00:31");
        assert_eq!(
            parsed,
            Some(ProgressLine::Downloading {
                message: "50.0% | 1.25MiB/s | ETA: 00:31".into(),
                fraction: 0.5,
            })
        );
    }

    #[test]
    fn finished_line_marks_phase_change() {
        assert_eq!(
            parse_progress_line("progress:finished|100%|N/A|00:00"),
            Some(ProgressLine::Finished)
        );
    }

    #[test]
    fn unknown_status_is_ignored() {
        assert_eq!(parse_progress_line("progress:error|0%|N/A|N/A"), None);
    }

    #[test]
    fn malformed_percent_is_swallowed() {
        assert_eq!(parse_progress_line("progress:downloading|N/A|N/A|N/A"), None);
        assert_eq!(parse_progress_line("progress:downloading|oops%|N/A|N/A"), None);
        assert_eq!(parse_progress_line("progress:downloading"), None);
    }

    #[test]
    fn ordinary_engine_output_is_not_progress() {
        assert_eq!(parse_progress_line("[download] Destination: clip.mp4"), None);
        assert_eq!(parse_progress_line(""), None);
    }

    #[test]
    fn fraction_is_clamped_to_unit_range() {
        match parse_progress_line("progress:downloading|105.0%|fast|00:00") {
            Some(ProgressLine::Downloading { fraction, .. }) => assert_eq!(fraction, 1.0),
            other => panic!("unexpected parse: {other:?}"),
        }
    }
}
