//! Contacts, the active conversation and the message thread.

use log::debug;
use tokio::time::{Duration, Instant};

use crate::models::{Contact, ContactId, MediaAttachment, Message, MessageId, Sender};
use crate::seed;
use crate::timers::OneShotQueue;

/// How long a simulated typing indicator stays up.
pub const TYPING_TIMEOUT: Duration = Duration::from_millis(3000);

pub struct Conversation {
    contacts: Vec<Contact>,
    active: ContactId,
    messages: Vec<Message>,
    next_id: MessageId,
    typing_expiry: OneShotQueue<ContactId>,
}

impl Conversation {
    /// Starts from the fixed roster and opening thread.
    pub fn seeded() -> Self {
        Self::new(seed::contacts(), seed::messages(), seed::INITIAL_CONTACT)
    }

    pub fn new(contacts: Vec<Contact>, messages: Vec<Message>, active: ContactId) -> Self {
        let next_id = messages.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        Conversation {
            contacts,
            active,
            messages,
            next_id,
            typing_expiry: OneShotQueue::new(),
        }
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn contact(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    pub fn active_contact_id(&self) -> ContactId {
        self.active
    }

    /// `None` when the selected id does not name a known contact.
    pub fn active_contact(&self) -> Option<&Contact> {
        self.contact(self.active)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Switches the visible conversation. The id is not checked against the
    /// roster; an unknown id simply has no contact to show.
    pub fn select(&mut self, id: ContactId) {
        if self.contact(id).is_none() {
            debug!("Selected unknown contact {}", id);
        }
        self.active = id;
    }

    /// Appends a message to the thread and returns its id. A message with
    /// neither text nor media is dropped and `None` is returned.
    pub fn append(
        &mut self,
        sender: Sender,
        text: &str,
        media: Option<MediaAttachment>,
        timestamp: String,
    ) -> Option<MessageId> {
        if text.is_empty() && media.is_none() {
            debug!("Dropping empty message");
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message {
            id,
            text: text.to_string(),
            sender,
            timestamp,
            media,
        });
        Some(id)
    }

    /// Shows the typing indicator for the active contact and arms a timer to
    /// hide it again. Repeated calls arm additional timers instead of
    /// restarting the pending one, so the first expiry clears the flag.
    pub fn simulate_typing(&mut self, now: Instant) -> bool {
        let id = self.active;
        match self.contacts.iter_mut().find(|c| c.id == id) {
            Some(contact) => {
                contact.typing = true;
                self.typing_expiry.arm(now + TYPING_TIMEOUT, id);
                true
            }
            None => false,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.typing_expiry.next_deadline()
    }

    /// Clears typing indicators whose timers expired. Returns how many fired.
    pub fn expire_typing(&mut self, now: Instant) -> usize {
        let due = self.typing_expiry.drain_due(now);
        for id in &due {
            if let Some(contact) = self.contacts.iter_mut().find(|c| c.id == *id) {
                contact.typing = false;
            }
        }
        due.len()
    }

    /// Contacts whose name contains `query`, ignoring case. An empty query
    /// matches everyone.
    pub fn search_contacts(&self, query: &str) -> Vec<&Contact> {
        let needle = query.trim().to_lowercase();
        self.contacts
            .iter()
            .filter(|c| needle.is_empty() || c.name.to_lowercase().contains(&needle))
            .collect()
    }
}

/// Presence line shown under a contact's name.
pub fn status_line(contact: &Contact) -> String {
    if contact.typing {
        "typing…".to_string()
    } else if contact.online {
        "online".to_string()
    } else {
        contact
            .last_seen
            .clone()
            .unwrap_or_else(|| "offline".to_string())
    }
}
