//! The outgoing side of the conversation: draft text, an attached preview
//! with its image filter, voice recording and the sticker picker.

use std::fmt;
use std::path::Path;

use log::{debug, warn};
use tokio::time::{Duration, Instant};
use uuid::Uuid;

use crate::models::{MediaAttachment, MediaKind};
use crate::timers::Interval;

pub const RECORDING_TICK: Duration = Duration::from_millis(1000);

pub const FILTER_MIN: u16 = 0;
pub const FILTER_MAX: u16 = 200;
pub const FILTER_DEFAULT: u16 = 100;

/// A locally selected file, as handed over by whatever picked it.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub name: String,
    pub content_type: String,
}

impl MediaFile {
    pub fn new(name: &str, content_type: &str) -> Self {
        MediaFile {
            name: name.to_string(),
            content_type: content_type.to_string(),
        }
    }

    /// Describes a file on disk, declaring its content type from the
    /// extension.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let content_type = match extension.as_str() {
            "mp4" | "m4v" => "video/mp4",
            "webm" => "video/webm",
            "mov" => "video/quicktime",
            "mkv" => "video/x-matroska",
            "avi" => "video/x-msvideo",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "svg" => "image/svg+xml",
            "jpg" | "jpeg" => "image/jpeg",
            _ => "application/octet-stream",
        };
        MediaFile::new(&name, content_type)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub kind: MediaKind,
    pub source: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChannel {
    Brightness,
    Contrast,
    Saturation,
}

impl FilterChannel {
    pub const ALL: [FilterChannel; 3] = [
        FilterChannel::Brightness,
        FilterChannel::Contrast,
        FilterChannel::Saturation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FilterChannel::Brightness => "Brightness",
            FilterChannel::Contrast => "Contrast",
            FilterChannel::Saturation => "Saturation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filter {
    pub brightness: u16,
    pub contrast: u16,
    pub saturation: u16,
}

impl Default for Filter {
    fn default() -> Self {
        Filter {
            brightness: FILTER_DEFAULT,
            contrast: FILTER_DEFAULT,
            saturation: FILTER_DEFAULT,
        }
    }
}

impl Filter {
    pub fn get(&self, channel: FilterChannel) -> u16 {
        match channel {
            FilterChannel::Brightness => self.brightness,
            FilterChannel::Contrast => self.contrast,
            FilterChannel::Saturation => self.saturation,
        }
    }

    pub fn set(&mut self, channel: FilterChannel, value: i32) {
        let value = value.clamp(FILTER_MIN as i32, FILTER_MAX as i32) as u16;
        match channel {
            FilterChannel::Brightness => self.brightness = value,
            FilterChannel::Contrast => self.contrast = value,
            FilterChannel::Saturation => self.saturation = value,
        }
    }

    /// The filter descriptor handed to whatever renders the preview.
    pub fn expression(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "brightness({}%) contrast({}%) saturate({}%)",
            self.brightness, self.contrast, self.saturation
        )
    }
}

/// A recording in progress. Holds the tick interval, so ending the recording
/// (or dropping the composer) stops the ticks.
#[derive(Debug)]
struct Recording {
    ticker: Interval,
    elapsed: u32,
}

/// What a successful commit hands to the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub text: String,
    pub media: Option<MediaAttachment>,
}

#[derive(Debug, Default)]
pub struct Composer {
    text: String,
    preview: Option<Preview>,
    filter: Filter,
    recording: Option<Recording>,
    stickers_open: bool,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn filter_expression(&self) -> String {
        self.filter.expression()
    }

    /// Replaces the preview with `file`. Without a file nothing happens.
    pub fn attach_media(&mut self, file: Option<MediaFile>) -> bool {
        let Some(file) = file else {
            debug!("No file selected, keeping current preview");
            return false;
        };

        let kind = if file.content_type.starts_with("video") {
            MediaKind::Video
        } else {
            MediaKind::Image
        };
        self.preview = Some(Preview {
            kind,
            source: format!("blob:chatmock/{}", Uuid::new_v4()),
            file_name: file.name,
        });
        true
    }

    pub fn update_filter(&mut self, channel: FilterChannel, value: i32) {
        self.filter.set(channel, value);
    }

    pub fn reset_filter(&mut self) {
        self.filter = Filter::default();
    }

    /// Drops the preview and its filter settings; the text stays.
    pub fn clear_draft(&mut self) {
        self.preview = None;
        self.reset_filter();
    }

    /// Takes the draft if there is anything to send, leaving the composer
    /// empty. A blank draft without media stays where it is.
    pub fn commit(&mut self) -> Option<Outgoing> {
        if self.text.trim().is_empty() && self.preview.is_none() {
            return None;
        }

        let media = self
            .preview
            .take()
            .map(|preview| MediaAttachment::new(preview.kind, &preview.source));
        let text = std::mem::take(&mut self.text);
        self.reset_filter();
        Some(Outgoing { text, media })
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Seconds recorded so far, 0 when idle.
    pub fn recording_elapsed(&self) -> u32 {
        self.recording.as_ref().map_or(0, |r| r.elapsed)
    }

    pub fn start_recording(&mut self, now: Instant) {
        if self.recording.is_some() {
            warn!("Recording restarted while already recording, previous take discarded");
        }
        self.recording = Some(Recording {
            ticker: Interval::new(now, RECORDING_TICK),
            elapsed: 0,
        });
    }

    /// Ends the recording and returns the voice attachment for it, or `None`
    /// if nothing was being recorded.
    pub fn stop_recording(&mut self) -> Option<MediaAttachment> {
        self.recording
            .take()
            .map(|recording| MediaAttachment::voice(recording.elapsed))
    }

    /// Ends the recording without producing a message.
    pub fn cancel_recording(&mut self) -> bool {
        self.recording.take().is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.recording.as_ref().map(|r| r.ticker.deadline())
    }

    /// Advances the recording clock. Returns the number of ticks applied.
    pub fn tick_recording(&mut self, now: Instant) -> u32 {
        match self.recording.as_mut() {
            Some(recording) => {
                let ticks = recording.ticker.poll(now);
                recording.elapsed += ticks;
                ticks
            }
            None => 0,
        }
    }

    pub fn stickers_open(&self) -> bool {
        self.stickers_open
    }

    pub fn toggle_stickers(&mut self) {
        self.stickers_open = !self.stickers_open;
    }

    pub fn hide_stickers(&mut self) {
        self.stickers_open = false;
    }
}
