//! Fixed startup data: the contact roster, the opening thread and the
//! sticker/GIF catalogue.

use crate::models::{Contact, MediaAttachment, MediaKind, Message, Sender};

pub const STICKERS: [&str; 24] = [
    "😀", "😂", "😍", "🥰", "😎", "🤩", "😜", "🤔", "😴", "🥳", "😇", "🤗",
    "👍", "👏", "🙌", "💪", "🔥", "❤️", "💯", "✨", "🎉", "🎈", "🌟", "⭐",
];

pub const GIFS: [&str; 3] = ["/placeholder.svg", "/placeholder.svg", "/placeholder.svg"];

fn contact(
    id: u32,
    name: &str,
    avatar: &str,
    last_message: &str,
    last_activity: &str,
    online: bool,
    last_seen: Option<&str>,
) -> Contact {
    Contact {
        id,
        name: name.to_string(),
        avatar: avatar.to_string(),
        last_message: last_message.to_string(),
        last_activity: last_activity.to_string(),
        online,
        typing: false,
        last_seen: last_seen.map(|s| s.to_string()),
    }
}

pub fn contacts() -> Vec<Contact> {
    vec![
        contact(1, "Анна Смирнова", "👩🏻", "Отправила фото", "14:23", true, None),
        contact(2, "Дмитрий Козлов", "👨🏻", "Увидимся завтра!", "13:15", false, Some("был в 13:15")),
        contact(3, "Мария Петрова", "👩🏼", "Спасибо за видео 🎥", "11:40", true, None),
        contact(4, "Иван Волков", "👨🏼", "Отлично!", "Вчера", false, Some("был вчера")),
        contact(5, "Елена Новикова", "👩🏻‍🦰", "Посмотри это", "Вчера", true, None),
    ]
}

pub fn messages() -> Vec<Message> {
    let message = |id, text: &str, sender, timestamp: &str, media| Message {
        id,
        text: text.to_string(),
        sender,
        timestamp: timestamp.to_string(),
        media,
    };

    vec![
        message(1, "Привет! Как дела?", Sender::Peer, "14:20", None),
        message(2, "Отлично! Смотри, что я нашла", Sender::Peer, "14:21", None),
        message(3, "Круто! Где это?", Sender::Me, "14:22", None),
        message(
            4,
            "Это в новом парке! Отправила тебе фото",
            Sender::Peer,
            "14:23",
            Some(MediaAttachment::new(MediaKind::Image, "/placeholder.svg")),
        ),
    ]
}

/// The conversation shown when the client starts.
pub const INITIAL_CONTACT: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_contacts_have_unique_ids() {
        let ids: HashSet<u32> = contacts().iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 5);
        assert!(ids.contains(&INITIAL_CONTACT));
    }

    #[test]
    fn test_seed_messages_hold_text_or_media() {
        let seeded = messages();
        assert_eq!(seeded.len(), 4);
        for (i, m) in seeded.iter().enumerate() {
            assert_eq!(m.id as usize, i + 1);
            assert!(!m.text.is_empty() || m.media.is_some());
        }
    }
}
