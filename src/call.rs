//! Simulated calls. There is no signalling behind any of this: starting a
//! call flips local state and nothing else.

use log::debug;

use crate::models::{CallModality, Contact, ContactId};

pub const MAX_PARTICIPANTS: usize = 6;

/// Who joins a group call, whoever the active conversation is.
pub const GROUP_CALL_SEED: [ContactId; 3] = [1, 2, 3];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallSession {
    active: bool,
    modality: Option<CallModality>,
    participants: Vec<ContactId>,
}

impl CallSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn modality(&self) -> Option<CallModality> {
        self.modality
    }

    pub fn participants(&self) -> &[ContactId] {
        &self.participants
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= MAX_PARTICIPANTS
    }

    /// One-to-one call with `contact`. Starting over an active call replaces it.
    pub fn start(&mut self, modality: CallModality, contact: ContactId) {
        self.active = true;
        self.modality = Some(modality);
        self.participants = vec![contact];
    }

    pub fn start_group(&mut self) {
        self.active = true;
        self.modality = Some(CallModality::Video);
        self.participants = GROUP_CALL_SEED.to_vec();
    }

    /// Adds `contact` to the running call. Returns `false`, changing nothing,
    /// when no call is active, the contact is already in it, or the call is
    /// full.
    pub fn add_participant(&mut self, contact: ContactId) -> bool {
        if !self.active {
            debug!("No active call to add {} to", contact);
            return false;
        }
        if self.participants.contains(&contact) {
            return false;
        }
        if self.is_full() {
            debug!("Call is full, not adding {}", contact);
            return false;
        }
        self.participants.push(contact);
        true
    }

    pub fn end(&mut self) {
        self.active = false;
        self.modality = None;
        self.participants.clear();
    }

    /// Contacts that could still be invited; empty once the call is full.
    pub fn addable<'a>(&self, contacts: &'a [Contact]) -> Vec<&'a Contact> {
        if !self.active || self.is_full() {
            return Vec::new();
        }
        contacts
            .iter()
            .filter(|c| !self.participants.contains(&c.id))
            .collect()
    }
}
