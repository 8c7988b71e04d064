pub type ContactId = u32;
pub type MessageId = u32;

#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub avatar: String,
    pub last_message: String,
    pub last_activity: String,
    pub online: bool,
    pub typing: bool,
    pub last_seen: Option<String>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Sender {
    Me,
    Peer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub timestamp: String, // "HH:MM", display only
    pub media: Option<MediaAttachment>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MediaKind {
    Image,
    Video,
    Voice,
    Sticker,
    Gif,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaAttachment {
    pub kind: MediaKind,
    pub source: String,
    pub duration_secs: Option<u32>, // Voice messages only
}

impl MediaAttachment {
    pub fn new(kind: MediaKind, source: &str) -> Self {
        MediaAttachment {
            kind,
            source: source.to_string(),
            duration_secs: None,
        }
    }

    pub fn voice(duration_secs: u32) -> Self {
        MediaAttachment {
            kind: MediaKind::Voice,
            source: "#".to_string(),
            duration_secs: Some(duration_secs),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CallModality {
    Audio,
    Video,
}

/// Formats a number of seconds as `m:ss`, the way recordings and voice
/// messages display their length.
pub fn format_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Local wall-clock label attached to outgoing messages.
pub fn timestamp_label() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}
