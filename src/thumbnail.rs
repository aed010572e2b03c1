//! Best-effort thumbnail preview for the status area.

use eframe::egui::ColorImage;

/// Pulls the video id out of a YouTube URL, handling both the `watch?v=`
/// and the short `youtu.be/` forms. `None` for anything else; the preview
/// is skipped, never an error.
pub fn extract_video_id(url: &str) -> Option<String> {
    if let Some(rest) = url.split("youtu.be/").nth(1) {
        let id = rest.split(['?', '&', '/']).next()?;
        if !id.is_empty() {
            return Some(id.to_owned());
        }
    }
    url.split("v=")
        .nth(1)
        .and_then(|s| s.split('&').next())
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
}

/// Fetches and decodes the title-card JPEG for a video id.
///
/// Blocking; run on a blocking task, never on the UI thread. Any network or
/// decode failure just suppresses the preview.
pub fn fetch_thumbnail(video_id: &str) -> Option<ColorImage> {
    let url = format!("https://img.youtube.com/vi/{video_id}/mqdefault.jpg");
    let bytes = reqwest::blocking::get(&url).ok()?.bytes().ok()?;
    let rgba = image::load_from_memory(&bytes).ok()?.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Some(ColorImage::from_rgba_unmultiplied(size, &rgba))
}
