//! The single owner of all client state.
//!
//! Every key press and every timer expiry ends up as one call on
//! [`ChatApp`]. Operations that cannot apply (an empty draft, a full call, a
//! switched-off feature) leave the state untouched and report that through
//! their return value; none of them fail.

use log::{debug, info};
use tokio::time::Instant;

use crate::call::CallSession;
use crate::composer::{Composer, FilterChannel, MediaFile};
use crate::config::Features;
use crate::conversation::Conversation;
use crate::models::{timestamp_label, CallModality, ContactId, MediaAttachment, MediaKind, MessageId, Sender};

pub struct ChatApp {
    features: Features,
    conversation: Conversation,
    composer: Composer,
    call: CallSession,
}

impl ChatApp {
    pub fn new(features: Features) -> Self {
        Self::with_conversation(features, Conversation::seeded())
    }

    pub fn with_conversation(features: Features, conversation: Conversation) -> Self {
        ChatApp {
            features,
            conversation,
            composer: Composer::new(),
            call: CallSession::new(),
        }
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn call(&self) -> &CallSession {
        &self.call
    }

    // --- conversation ---

    pub fn select_conversation(&mut self, contact: ContactId) {
        self.conversation.select(contact);
    }

    pub fn simulate_typing(&mut self, now: Instant) -> bool {
        if !self.features.typing_simulation {
            debug!("Typing simulation is disabled");
            return false;
        }
        self.conversation.simulate_typing(now)
    }

    // --- draft ---

    pub fn set_draft_text(&mut self, text: &str) {
        self.composer.set_text(text);
    }

    pub fn attach_media(&mut self, file: Option<MediaFile>) -> bool {
        if !self.features.media {
            debug!("Media attachments are disabled");
            return false;
        }
        self.composer.attach_media(file)
    }

    pub fn update_filter(&mut self, channel: FilterChannel, value: i32) -> bool {
        if !self.features.media_filters_enabled() {
            return false;
        }
        self.composer.update_filter(channel, value);
        true
    }

    pub fn reset_filter(&mut self) {
        self.composer.reset_filter();
    }

    pub fn clear_draft(&mut self) {
        self.composer.clear_draft();
    }

    pub fn filter_expression(&self) -> String {
        self.composer.filter_expression()
    }

    /// Sends the draft as a new message. `None` when the draft is blank and
    /// has no attachment, in which case nothing changes.
    pub fn commit_draft(&mut self) -> Option<MessageId> {
        let outgoing = self.composer.commit()?;
        let id = self
            .conversation
            .append(Sender::Me, &outgoing.text, outgoing.media, timestamp_label());
        if let Some(id) = id {
            info!("Sent message {}", id);
        }
        id
    }

    // --- voice ---

    pub fn start_recording(&mut self, now: Instant) -> bool {
        if !self.features.voice_messages {
            debug!("Voice messages are disabled");
            return false;
        }
        self.composer.start_recording(now);
        true
    }

    /// Finishes the recording and sends it as a voice message.
    pub fn stop_recording(&mut self) -> Option<MessageId> {
        let voice = self.composer.stop_recording()?;
        let seconds = voice.duration_secs.unwrap_or(0);
        let id = self
            .conversation
            .append(Sender::Me, "", Some(voice), timestamp_label());
        info!("Sent voice message of {}s", seconds);
        id
    }

    pub fn cancel_recording(&mut self) -> bool {
        self.composer.cancel_recording()
    }

    // --- stickers ---

    pub fn toggle_stickers(&mut self) {
        if self.features.stickers {
            self.composer.toggle_stickers();
        }
    }

    pub fn hide_stickers(&mut self) {
        self.composer.hide_stickers();
    }

    pub fn send_sticker(&mut self, glyph: &str) -> Option<MessageId> {
        self.send_picked(MediaKind::Sticker, glyph)
    }

    pub fn send_gif(&mut self, source: &str) -> Option<MessageId> {
        self.send_picked(MediaKind::Gif, source)
    }

    // Picker sends skip the draft entirely
    fn send_picked(&mut self, kind: MediaKind, source: &str) -> Option<MessageId> {
        if !self.features.stickers {
            debug!("Stickers are disabled");
            return None;
        }
        let media = MediaAttachment::new(kind, source);
        let id = self
            .conversation
            .append(Sender::Me, "", Some(media), timestamp_label());
        self.composer.hide_stickers();
        id
    }

    // --- calls ---

    pub fn start_call(&mut self, modality: CallModality) -> bool {
        if !self.features.calls {
            debug!("Calls are disabled");
            return false;
        }
        let contact = self.conversation.active_contact_id();
        self.call.start(modality, contact);
        info!("Started {:?} call with {}", modality, contact);
        true
    }

    pub fn start_group_call(&mut self) -> bool {
        if !self.features.group_calls_enabled() {
            debug!("Group calls are disabled");
            return false;
        }
        self.call.start_group();
        info!("Started group call with {:?}", self.call.participants());
        true
    }

    pub fn add_participant(&mut self, contact: ContactId) -> bool {
        self.call.add_participant(contact)
    }

    pub fn end_call(&mut self) {
        if self.call.is_active() {
            info!("Call ended");
        }
        self.call.end();
    }

    // --- timers ---

    /// When the next timer (typing expiry or recording tick) is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        crate::timers::earliest(
            self.conversation.next_deadline(),
            self.composer.next_deadline(),
        )
    }

    /// Applies every timer due at `now`. Returns how many fired.
    pub fn run_due_timers(&mut self, now: Instant) -> usize {
        let expired = self.conversation.expire_typing(now);
        let ticks = self.composer.tick_recording(now) as usize;
        expired + ticks
    }
}
