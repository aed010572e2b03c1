//! YT-DLP-GG: desktop front-end for the yt-dlp download engine.

// Background worker driving the external engine
mod downloader;
// Worker-to-UI event types
mod model;
// UI snapshot to engine-argument translation
mod options;
// Templated progress line parsing
mod progress;
// Thumbnail preview fetching
mod thumbnail;

use downloader::run_download;
use model::{LogLevel, WorkerEvent};
use options::{
    AUDIO_BITRATES, AudioCodec, DownloadRequest, Mode, PlaylistFormat, VideoContainer,
    VideoQuality,
};

use eframe::{App, Frame, egui};
use egui::{Color32, ColorImage, RichText, TextureOptions, Visuals};
use once_cell::sync::OnceCell;
use rfd::{FileDialog, MessageDialog, MessageLevel};
use std::sync::{Arc, Mutex};
use tokio::{
    runtime::Runtime,
    sync::mpsc::{UnboundedReceiver, unbounded_channel},
};

// Global Tokio runtime shared by all workers; the worker task itself is
// created fresh per download.
static RUNTIME: OnceCell<Arc<Runtime>> = OnceCell::new();

/// Program entry point: diagnostics, runtime, then the window.
fn main() -> Result<(), eframe::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let rt = Arc::new(Runtime::new().unwrap());
    RUNTIME.set(rt).unwrap();

    let native = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([850.0, 700.0]),
        ..Default::default()
    };
    eframe::run_native(
        "YT-DLP-GG",
        native,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(Visuals::dark());
            Box::new(GgApp::new())
        }),
    )
}

/// All window state. Widgets are only ever touched from here; the worker
/// communicates exclusively through the event channel.
struct GgApp {
    /// Source URL, as typed
    url: String,
    /// Destination folder; empty until chosen
    output_dir: String,
    /// Optional cookies.txt path; empty means none
    cookies_file: String,
    /// Active option tab, doubles as the download mode
    active_tab: Mode,
    video_quality: VideoQuality,
    video_container: VideoContainer,
    subtitles: bool,
    audio_codec: AudioCodec,
    audio_bitrate_kbps: u32,
    playlist_start: u32,
    playlist_end: u32,
    playlist_format: PlaylistFormat,
    embed_metadata: bool,
    embed_thumbnail: bool,
    restrict_filenames: bool,
    /// Single-flight guard; set before spawning, cleared on `Finished`
    is_downloading: bool,
    /// Whether the last run ended with a success event
    last_run_ok: bool,
    /// One-line transfer status shown next to the progress bar
    status_line: String,
    /// Fraction for the progress bar, kept non-decreasing within a run
    progress: f32,
    /// Append-only color-coded log
    log: Vec<(LogLevel, String)>,
    /// Receiver for the in-flight run, if any
    events: Option<UnboundedReceiver<WorkerEvent>>,
    /// Incoming thumbnail fetch result
    thumbnail_result: Arc<Mutex<Option<ColorImage>>>,
    /// Decoded preview texture for the current run
    thumbnail: Option<egui::TextureHandle>,
}

impl GgApp {
    fn new() -> Self {
        let mut log = Vec::new();
        if !downloader::engine_available() {
            log.push((
                LogLevel::Warning,
                "yt-dlp was not found (neither bundled nor on PATH); downloads will fail until it is installed.".to_owned(),
            ));
        }
        Self {
            url: String::new(),
            output_dir: String::new(),
            cookies_file: String::new(),
            active_tab: Mode::Video,
            video_quality: VideoQuality::Best,
            video_container: VideoContainer::Mp4,
            subtitles: false,
            audio_codec: AudioCodec::Mp3,
            audio_bitrate_kbps: AUDIO_BITRATES[0],
            playlist_start: 1,
            playlist_end: 0,
            playlist_format: PlaylistFormat::Mp4,
            embed_metadata: true,
            embed_thumbnail: false,
            restrict_filenames: false,
            is_downloading: false,
            last_run_ok: false,
            status_line: "Waiting...".to_owned(),
            progress: 0.0,
            log,
            events: None,
            thumbnail_result: Arc::new(Mutex::new(None)),
            thumbnail: None,
        }
    }

    /// Drains worker events delivered since the last frame.
    fn poll_worker(&mut self) {
        let Some(rx) = &mut self.events else { return };
        let mut finished = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                WorkerEvent::Progress { message, fraction } => {
                    self.status_line = message;
                    // Displayed percentage never moves backwards mid-run
                    if fraction > self.progress {
                        self.progress = fraction;
                    }
                }
                WorkerEvent::Log { level, message } => {
                    if level == LogLevel::Success {
                        self.last_run_ok = true;
                    }
                    self.log.push((level, message));
                }
                WorkerEvent::Finished => finished = true,
            }
        }
        if finished {
            // Back to idle: start button re-enabled, bar reset
            self.is_downloading = false;
            self.progress = 0.0;
            self.events = None;
        }
    }

    /// Validates the snapshot and hands one request to a fresh worker.
    fn start_download(&mut self, ctx: &egui::Context) {
        if self.is_downloading {
            warn_dialog("A download is already in progress.");
            return;
        }
        let url = self.url.trim().to_owned();
        if url.is_empty() {
            warn_dialog("Please enter a URL.");
            return;
        }
        if self.output_dir.is_empty() {
            warn_dialog("Please choose a destination folder.");
            return;
        }

        let request = DownloadRequest {
            url: url.clone(),
            output_dir: self.output_dir.clone(),
            cookies_file: (!self.cookies_file.is_empty()).then(|| self.cookies_file.clone()),
            mode: self.active_tab,
            video_quality: self.video_quality,
            video_container: self.video_container,
            subtitles: self.subtitles,
            audio_codec: self.audio_codec,
            audio_bitrate_kbps: self.audio_bitrate_kbps,
            playlist_start: self.playlist_start,
            playlist_end: self.playlist_end,
            playlist_format: self.playlist_format,
            embed_metadata: self.embed_metadata,
            embed_thumbnail: self.embed_thumbnail,
            restrict_filenames: self.restrict_filenames,
        };

        self.is_downloading = true;
        self.last_run_ok = false;
        self.progress = 0.0;
        self.status_line = "Starting...".to_owned();
        self.log
            .push((LogLevel::Info, format!("Starting download of: {url}")));

        // Preview fetch runs blocking, off the UI thread
        self.thumbnail = None;
        if let Some(id) = thumbnail::extract_video_id(&url) {
            let results = Arc::clone(&self.thumbnail_result);
            let ctx = ctx.clone();
            RUNTIME.get().unwrap().spawn_blocking(move || {
                if let Some(img) = thumbnail::fetch_thumbnail(&id) {
                    *results.lock().unwrap() = Some(img);
                    ctx.request_repaint();
                }
            });
        }

        let (tx, rx) = unbounded_channel();
        self.events = Some(rx);
        RUNTIME.get().unwrap().spawn(run_download(request, tx));
    }

    fn video_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Quality:");
            egui::ComboBox::from_id_source("video_quality")
                .selected_text(self.video_quality.label())
                .show_ui(ui, |ui| {
                    for q in VideoQuality::ALL {
                        ui.selectable_value(&mut self.video_quality, q, q.label());
                    }
                });
            ui.label("Container:");
            egui::ComboBox::from_id_source("video_container")
                .selected_text(self.video_container.label())
                .show_ui(ui, |ui| {
                    for c in VideoContainer::ALL {
                        ui.selectable_value(&mut self.video_container, c, c.label());
                    }
                });
        });
        ui.checkbox(&mut self.subtitles, "Download subtitles (.srt)");
    }

    fn audio_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Format:");
            egui::ComboBox::from_id_source("audio_codec")
                .selected_text(self.audio_codec.label())
                .show_ui(ui, |ui| {
                    for c in AudioCodec::ALL {
                        ui.selectable_value(&mut self.audio_codec, c, c.label());
                    }
                });
            ui.label("Bitrate:");
            egui::ComboBox::from_id_source("audio_bitrate")
                .selected_text(format!("{} kbps", self.audio_bitrate_kbps))
                .show_ui(ui, |ui| {
                    for b in AUDIO_BITRATES {
                        ui.selectable_value(
                            &mut self.audio_bitrate_kbps,
                            b,
                            format!("{b} kbps"),
                        );
                    }
                });
        });
    }

    fn playlist_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Start:");
            ui.add(egui::DragValue::new(&mut self.playlist_start).clamp_range(1..=9999));
            ui.label("End (0 = all):");
            ui.add(egui::DragValue::new(&mut self.playlist_end).clamp_range(0..=9999));
        });
        ui.horizontal(|ui| {
            ui.label("Output format:");
            egui::ComboBox::from_id_source("playlist_format")
                .selected_text(self.playlist_format.label())
                .show_ui(ui, |ui| {
                    for f in PlaylistFormat::ALL {
                        ui.selectable_value(&mut self.playlist_format, f, f.label());
                    }
                });
        });
    }
}

impl App for GgApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_worker();

        // Pick up a finished thumbnail fetch, if any
        if let Some(img) = self.thumbnail_result.lock().unwrap().take() {
            self.thumbnail = Some(ctx.load_texture("thumbnail", img, TextureOptions::default()));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(RichText::new("YT-DLP-GG").color(Color32::from_rgb(0xef, 0x44, 0x44)));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak("v1.0");
                });
            });
            ui.separator();

            ui.label("Source (URL):");
            ui.add(
                egui::TextEdit::singleline(&mut self.url)
                    .hint_text("Paste the video or playlist link here...")
                    .desired_width(f32::INFINITY),
            );

            ui.horizontal(|ui| {
                ui.label("Save to:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.output_dir)
                        .interactive(false)
                        .hint_text("Choose a destination folder..."),
                );
                if ui.button("Select...").clicked() {
                    if let Some(folder) = FileDialog::new().pick_folder() {
                        self.output_dir = folder.display().to_string();
                    }
                }
                if self.last_run_ok
                    && !self.output_dir.is_empty()
                    && ui.button("Open folder").clicked()
                {
                    open_folder(self.output_dir.clone());
                }
            });

            ui.horizontal(|ui| {
                ui.label("Cookies:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.cookies_file)
                        .interactive(false)
                        .hint_text("cookies.txt (optional)"),
                );
                if ui.button("Load...").clicked() {
                    if let Some(file) = FileDialog::new()
                        .add_filter("Text file", &["txt"])
                        .pick_file()
                    {
                        self.cookies_file = file.display().to_string();
                        self.log.push((
                            LogLevel::Info,
                            format!("Cookies loaded: {}", self.cookies_file),
                        ));
                    }
                }
            });

            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.active_tab, Mode::Video, "Video");
                ui.selectable_value(&mut self.active_tab, Mode::Audio, "Audio");
                ui.selectable_value(&mut self.active_tab, Mode::Playlist, "Playlist");
            });
            ui.group(|ui| {
                ui.set_min_width(ui.available_width());
                match self.active_tab {
                    Mode::Video => self.video_tab(ui),
                    Mode::Audio => self.audio_tab(ui),
                    Mode::Playlist => self.playlist_tab(ui),
                }
            });

            ui.horizontal(|ui| {
                ui.checkbox(&mut self.embed_metadata, "Embed metadata");
                ui.checkbox(&mut self.embed_thumbnail, "Embed thumbnail");
                ui.checkbox(&mut self.restrict_filenames, "Safe filenames (underscores)")
                    .on_hover_text(
                        "Checked: restrict names to a safe character set.\n\
                         Unchecked: keep the original title characters.",
                    );
            });

            ui.add_space(6.0);
            ui.horizontal(|ui| {
                if let Some(tex) = &self.thumbnail {
                    ui.image((tex.id(), egui::vec2(96.0, 54.0)));
                }
                ui.label("Status:");
                ui.label(&self.status_line);
            });
            ui.add(egui::ProgressBar::new(self.progress).show_percentage());

            let label = if self.is_downloading {
                "Downloading..."
            } else {
                "START DOWNLOAD"
            };
            if ui
                .add_enabled(
                    !self.is_downloading,
                    egui::Button::new(RichText::new(label).strong())
                        .min_size(egui::vec2(ui.available_width(), 32.0)),
                )
                .clicked()
            {
                self.start_download(ctx);
            }

            ui.add_space(6.0);
            ui.label("Execution log:");
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for (level, line) in &self.log {
                        ui.label(RichText::new(line).color(log_color(*level)).monospace());
                    }
                });
        });

        // Keep draining the channel while a run is active
        if self.is_downloading {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

/// Display color per log tag, matching the log view's palette.
fn log_color(level: LogLevel) -> Color32 {
    match level {
        LogLevel::Info => Color32::from_rgb(0x3b, 0x82, 0xf6),
        LogLevel::Warning => Color32::from_rgb(0xfa, 0xcc, 0x15),
        LogLevel::Error => Color32::from_rgb(0xef, 0x44, 0x44),
        LogLevel::Success => Color32::from_rgb(0x22, 0xc5, 0x5e),
    }
}

/// Blocking modal used for synchronous validation failures.
fn warn_dialog(message: &str) {
    MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title("Warning")
        .set_description(message)
        .show();
}

/// Opens the destination folder with the platform file manager.
fn open_folder(folder: String) {
    std::thread::spawn(move || {
        #[cfg(target_os = "windows")]
        let _ = std::process::Command::new("explorer").arg(&folder).spawn();
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&folder).spawn();
        #[cfg(all(unix, not(target_os = "macos")))]
        let _ = std::process::Command::new("xdg-open").arg(&folder).spawn();
    });
}
