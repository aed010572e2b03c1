//! Translation of the UI snapshot into yt-dlp command-line arguments.

/// Which option tab was active when the download was started.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Video,
    Audio,
    Playlist,
}

/// Video stream selection offered on the Video tab.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VideoQuality {
    /// Best available streams (4K/1080)
    #[default]
    Best,
    P1080,
    P720,
    Worst,
}

impl VideoQuality {
    pub const ALL: [Self; 4] = [Self::Best, Self::P1080, Self::P720, Self::Worst];

    pub fn label(self) -> &'static str {
        match self {
            Self::Best => "Best (4K/1080)",
            Self::P1080 => "1080p",
            Self::P720 => "720p",
            Self::Worst => "Worst",
        }
    }

    /// Format-selection expression handed to the engine.
    fn expression(self) -> &'static str {
        match self {
            Self::Best => "bestvideo+bestaudio/best",
            Self::P1080 => "bestvideo[height<=1080]+bestaudio/best[height<=1080]",
            Self::P720 => "bestvideo[height<=720]+bestaudio/best[height<=720]",
            Self::Worst => "worst",
        }
    }
}

/// Merge container for video downloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VideoContainer {
    #[default]
    Mp4,
    Mkv,
}

impl VideoContainer {
    pub const ALL: [Self; 2] = [Self::Mp4, Self::Mkv];

    pub fn label(self) -> &'static str {
        match self {
            Self::Mp4 => "MP4",
            Self::Mkv => "MKV",
        }
    }

    fn as_arg(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mkv => "mkv",
        }
    }
}

/// Target codec for the audio-extraction post-processing step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AudioCodec {
    #[default]
    Mp3,
    M4a,
    Wav,
    Flac,
}

impl AudioCodec {
    pub const ALL: [Self; 4] = [Self::Mp3, Self::M4a, Self::Wav, Self::Flac];

    pub fn label(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::M4a => "m4a",
            Self::Wav => "wav",
            Self::Flac => "flac",
        }
    }
}

/// Per-entry output format on the Playlist tab.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaylistFormat {
    #[default]
    Mp4,
    Mp3,
}

impl PlaylistFormat {
    pub const ALL: [Self; 2] = [Self::Mp4, Self::Mp3];

    pub fn label(self) -> &'static str {
        match self {
            Self::Mp4 => "MP4",
            Self::Mp3 => "MP3",
        }
    }
}

/// Bitrates offered for audio extraction, in kbps.
pub const AUDIO_BITRATES: [u32; 3] = [320, 192, 128];

/// One download's worth of UI state, snapshotted at button press.
///
/// Built fresh per click, moved into the worker and dropped when the run
/// ends. Only `url` and `output_dir` are validated; everything else is
/// handed to the engine as-is.
#[derive(Clone, Debug, PartialEq)]
pub struct DownloadRequest {
    pub url: String,
    pub output_dir: String,
    pub cookies_file: Option<String>,
    pub mode: Mode,
    pub video_quality: VideoQuality,
    pub video_container: VideoContainer,
    pub subtitles: bool,
    pub audio_codec: AudioCodec,
    pub audio_bitrate_kbps: u32,
    pub playlist_start: u32,
    pub playlist_end: u32,
    pub playlist_format: PlaylistFormat,
    pub embed_metadata: bool,
    pub embed_thumbnail: bool,
    pub restrict_filenames: bool,
}

impl Default for DownloadRequest {
    fn default() -> Self {
        Self {
            url: String::new(),
            output_dir: String::new(),
            cookies_file: None,
            mode: Mode::default(),
            video_quality: VideoQuality::default(),
            video_container: VideoContainer::default(),
            subtitles: false,
            audio_codec: AudioCodec::default(),
            audio_bitrate_kbps: AUDIO_BITRATES[0],
            playlist_start: 1,
            playlist_end: 0,
            playlist_format: PlaylistFormat::default(),
            embed_metadata: true,
            embed_thumbnail: false,
            restrict_filenames: false,
        }
    }
}

impl DownloadRequest {
    /// Builds the engine argument vector for this request.
    ///
    /// Pure and deterministic; the URL and the worker's own plumbing flags
    /// (`--newline`, `--progress-template`) are appended by the downloader,
    /// not here.
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();

        let template = match self.mode {
            // Playlist entries get an index prefix so order survives sorting
            Mode::Playlist => format!("{}/%(playlist_index)s - %(title)s.%(ext)s", self.output_dir),
            _ => format!("{}/%(title)s.%(ext)s", self.output_dir),
        };
        push(&mut args, ["-o", &template]);

        if let Some(cookies) = &self.cookies_file {
            push(&mut args, ["--cookies", cookies]);
        }

        if self.restrict_filenames {
            args.push("--restrict-filenames".into());
        } else {
            args.push("--no-restrict-filenames".into());
        }

        match self.mode {
            Mode::Video => {
                push(&mut args, ["-f", self.video_quality.expression()]);
                push(
                    &mut args,
                    ["--merge-output-format", self.video_container.as_arg()],
                );
                if self.subtitles {
                    args.push("--write-subs".into());
                    args.push("--write-auto-subs".into());
                    push(&mut args, ["--sub-langs", "all"]);
                }
            }
            Mode::Audio => {
                push(&mut args, ["-f", "bestaudio/best"]);
                args.push("-x".into());
                push(&mut args, ["--audio-format", self.audio_codec.label()]);
                // Passed through even for lossless codecs, where the engine
                // ignores it.
                push(
                    &mut args,
                    ["--audio-quality", &format!("{}K", self.audio_bitrate_kbps)],
                );
            }
            Mode::Playlist => {
                if self.playlist_start > 1 {
                    push(&mut args, ["--playlist-start", &self.playlist_start.to_string()]);
                }
                if self.playlist_end > 0 {
                    push(&mut args, ["--playlist-end", &self.playlist_end.to_string()]);
                }
                match self.playlist_format {
                    PlaylistFormat::Mp3 => {
                        push(&mut args, ["-f", "bestaudio/best"]);
                        args.push("-x".into());
                        push(&mut args, ["--audio-format", "mp3"]);
                    }
                    PlaylistFormat::Mp4 => {
                        push(&mut args, ["-f", "bestvideo+bestaudio/best"]);
                    }
                }
            }
        }

        if self.embed_metadata {
            args.push("--embed-metadata".into());
        }
        if self.embed_thumbnail {
            args.push("--write-thumbnail".into());
            args.push("--embed-thumbnail".into());
        }

        args
    }
}

fn push(args: &mut Vec<String>, pair: [&str; 2]) {
    args.extend(pair.into_iter().map(str::to_owned));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(mode: Mode) -> DownloadRequest {
        DownloadRequest {
            url: "https://www.youtube.com/watch?v=abc123".into(),
            output_dir: "/tmp/out".into(),
            mode,
            embed_metadata: false,
            ..DownloadRequest::default()
        }
    }

    #[test]
    fn video_defaults_produce_exact_args() {
        let args = request(Mode::Video).to_args();
        assert_eq!(
            args,
            vec![
                "-o",
                "/tmp/out/%(title)s.%(ext)s",
                "--no-restrict-filenames",
                "-f",
                "bestvideo+bestaudio/best",
                "--merge-output-format",
                "mp4",
            ]
        );
    }

    #[test]
    fn video_720_mkv_caps_height_and_sets_container() {
        let mut req = request(Mode::Video);
        req.video_quality = VideoQuality::P720;
        req.video_container = VideoContainer::Mkv;
        let args = req.to_args();
        let f = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[f + 1], "bestvideo[height<=720]+bestaudio/best[height<=720]");
        let m = args.iter().position(|a| a == "--merge-output-format").unwrap();
        assert_eq!(args[m + 1], "mkv");
    }

    #[test]
    fn video_worst_maps_to_worst_expression() {
        let mut req = request(Mode::Video);
        req.video_quality = VideoQuality::Worst;
        let args = req.to_args();
        assert!(args.windows(2).any(|w| w[0] == "-f" && w[1] == "worst"));
    }

    #[test]
    fn subtitles_request_manual_and_auto_in_all_languages() {
        let mut req = request(Mode::Video);
        req.subtitles = true;
        let args = req.to_args();
        assert!(args.contains(&"--write-subs".to_string()));
        assert!(args.contains(&"--write-auto-subs".to_string()));
        assert!(args.windows(2).any(|w| w[0] == "--sub-langs" && w[1] == "all"));

        req.subtitles = false;
        let args = req.to_args();
        assert!(!args.iter().any(|a| a.starts_with("--write-subs")));
        assert!(!args.contains(&"--sub-langs".to_string()));
    }

    #[test]
    fn audio_always_selects_best_audio_with_extraction_step() {
        let mut req = request(Mode::Audio);
        req.audio_codec = AudioCodec::M4a;
        req.audio_bitrate_kbps = 192;
        let args = req.to_args();
        assert!(args.windows(2).any(|w| w[0] == "-f" && w[1] == "bestaudio/best"));
        assert!(args.contains(&"-x".to_string()));
        assert!(args.windows(2).any(|w| w[0] == "--audio-format" && w[1] == "m4a"));
        assert!(args.windows(2).any(|w| w[0] == "--audio-quality" && w[1] == "192K"));
    }

    #[test]
    fn flac_still_carries_the_inert_bitrate() {
        let mut req = request(Mode::Audio);
        req.audio_codec = AudioCodec::Flac;
        req.audio_bitrate_kbps = 320;
        let args = req.to_args();
        assert!(args.windows(2).any(|w| w[0] == "--audio-format" && w[1] == "flac"));
        assert!(args.windows(2).any(|w| w[0] == "--audio-quality" && w[1] == "320K"));
    }

    #[test]
    fn playlist_default_bounds_are_omitted() {
        let args = request(Mode::Playlist).to_args();
        assert!(!args.contains(&"--playlist-start".to_string()));
        assert!(!args.contains(&"--playlist-end".to_string()));
    }

    #[test]
    fn playlist_bounds_are_emitted_when_non_default() {
        let mut req = request(Mode::Playlist);
        req.playlist_start = 3;
        req.playlist_end = 7;
        let args = req.to_args();
        assert!(args.windows(2).any(|w| w[0] == "--playlist-start" && w[1] == "3"));
        assert!(args.windows(2).any(|w| w[0] == "--playlist-end" && w[1] == "7"));
    }

    #[test]
    fn playlist_template_is_index_prefixed() {
        let args = request(Mode::Playlist).to_args();
        assert_eq!(args[1], "/tmp/out/%(playlist_index)s - %(title)s.%(ext)s");
    }

    #[test]
    fn playlist_mp3_extracts_fixed_codec_without_bitrate() {
        let mut req = request(Mode::Playlist);
        req.playlist_format = PlaylistFormat::Mp3;
        // The Audio tab's bitrate control must not leak into playlist mode
        req.audio_bitrate_kbps = 128;
        let args = req.to_args();
        assert!(args.contains(&"-x".to_string()));
        assert!(args.windows(2).any(|w| w[0] == "--audio-format" && w[1] == "mp3"));
        assert!(!args.contains(&"--audio-quality".to_string()));
    }

    #[test]
    fn playlist_mp4_selects_best_streams_without_merge_container() {
        let args = request(Mode::Playlist).to_args();
        assert!(args.windows(2).any(|w| w[0] == "-f" && w[1] == "bestvideo+bestaudio/best"));
        assert!(!args.contains(&"--merge-output-format".to_string()));
    }

    #[test]
    fn global_flags_apply_in_every_mode() {
        for mode in [Mode::Video, Mode::Audio, Mode::Playlist] {
            let mut req = request(mode);
            req.embed_metadata = true;
            req.embed_thumbnail = true;
            req.restrict_filenames = true;
            req.cookies_file = Some("/home/u/cookies.txt".into());
            let args = req.to_args();
            assert!(args.contains(&"--embed-metadata".to_string()));
            assert!(args.contains(&"--write-thumbnail".to_string()));
            assert!(args.contains(&"--embed-thumbnail".to_string()));
            assert!(args.contains(&"--restrict-filenames".to_string()));
            assert!(!args.contains(&"--no-restrict-filenames".to_string()));
            assert!(args.windows(2).any(|w| w[0] == "--cookies" && w[1] == "/home/u/cookies.txt"));
        }
    }

    #[test]
    fn cookies_omitted_when_unset() {
        let args = request(Mode::Video).to_args();
        assert!(!args.contains(&"--cookies".to_string()));
    }

    #[test]
    fn translation_is_deterministic() {
        let mut req = request(Mode::Playlist);
        req.playlist_start = 2;
        req.playlist_end = 9;
        req.playlist_format = PlaylistFormat::Mp3;
        req.embed_thumbnail = true;
        assert_eq!(req.to_args(), req.to_args());
    }
}
