use anyhow::Result;
use crossterm::{
    event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, info};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::{io, path::Path};
use textwrap::wrap;
use tokio::time::Instant;
use tui_input::{backend::crossterm::EventHandler, Input};

use chatmock::{
    call::MAX_PARTICIPANTS,
    composer::{FilterChannel, MediaFile, FILTER_MAX},
    conversation::status_line,
    models::{format_duration, CallModality, ContactId, MediaAttachment, MediaKind, Sender},
    seed::{GIFS, STICKERS},
    ChatApp,
};

// Export types needed by main module
pub use ratatui::Terminal;
pub use ratatui::backend::CrosstermBackend;

const FILTER_STEP: i32 = 5;
const PICKER_COLUMNS: usize = 6;
const PICKER_ITEMS: usize = STICKERS.len() + GIFS.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

enum Focus {
    Contacts,
    Messages,
}

enum Dialog {
    Attach(Input),
    Filters { channel: usize },
    AddParticipant { selected: usize },
    Help,
}

/// Terminal front end: owns the text widgets, focus and popups, and turns
/// key presses into [`ChatApp`] operations. Everything it draws comes from the
/// app's state.
pub struct ChatUI {
    input: Input,
    search: Input,
    focus: Focus,
    contact_cursor: usize,
    sticker_cursor: usize,
    dialog: Option<Dialog>,
}

impl ChatUI {
    pub fn new() -> Self {
        ChatUI {
            input: Input::default(),
            search: Input::default(),
            focus: Focus::Messages,
            contact_cursor: 0,
            sticker_cursor: 0,
            dialog: None,
        }
    }

    pub fn handle_event(&mut self, app: &mut ChatApp, event: Event, now: Instant) -> Flow {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(app, key, now),
            _ => Flow::Continue,
        }
    }

    fn handle_key(&mut self, app: &mut ChatApp, key: KeyEvent, now: Instant) -> Flow {
        // Popups, the call screen, the recorder and the sticker picker each
        // take over the keyboard while shown
        if let Some(dialog) = self.dialog.take() {
            self.dialog = self.handle_dialog_key(app, dialog, key);
            return Flow::Continue;
        }
        if app.call().is_active() {
            self.handle_call_key(app, key);
            return Flow::Continue;
        }
        if app.composer().is_recording() {
            handle_recording_key(app, key);
            return Flow::Continue;
        }
        if app.composer().stickers_open() {
            self.handle_picker_key(app, key);
            return Flow::Continue;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Messages => Focus::Contacts,
                    Focus::Contacts => Focus::Messages,
                };
            }
            KeyCode::F(1) => self.dialog = Some(Dialog::Help),
            KeyCode::Char(c) if ctrl => self.handle_shortcut(app, c, now),
            _ => match self.focus {
                Focus::Contacts => self.handle_contacts_key(app, key),
                Focus::Messages => self.handle_composer_key(app, key),
            },
        }
        Flow::Continue
    }

    fn handle_shortcut(&mut self, app: &mut ChatApp, c: char, now: Instant) {
        let features = *app.features();
        match c.to_ascii_lowercase() {
            'a' if features.media => {
                self.dialog = Some(Dialog::Attach(Input::default()));
            }
            'e' if features.media_filters_enabled() && app.composer().preview().is_some() => {
                self.dialog = Some(Dialog::Filters { channel: 0 });
            }
            'x' => app.clear_draft(),
            's' => {
                self.sticker_cursor = 0;
                app.toggle_stickers();
            }
            'r' => {
                if app.start_recording(now) {
                    info!("UI: recording started");
                }
            }
            't' => {
                app.simulate_typing(now);
            }
            'p' => {
                app.start_call(CallModality::Audio);
            }
            'v' => {
                app.start_call(CallModality::Video);
            }
            'g' => {
                app.start_group_call();
            }
            'h' => self.dialog = Some(Dialog::Help),
            other => debug!("UI: unbound shortcut Ctrl+{}", other),
        }
    }

    fn handle_contacts_key(&mut self, app: &mut ChatApp, key: KeyEvent) {
        let matches: Vec<ContactId> = app
            .conversation()
            .search_contacts(self.search.value())
            .iter()
            .map(|c| c.id)
            .collect();

        match key.code {
            KeyCode::Up | KeyCode::Down if !matches.is_empty() => {
                let len = matches.len();
                self.contact_cursor = if key.code == KeyCode::Up {
                    (self.contact_cursor.min(len - 1) + len - 1) % len
                } else {
                    (self.contact_cursor + 1) % len
                };
                app.select_conversation(matches[self.contact_cursor]);
            }
            KeyCode::Enter => self.focus = Focus::Messages,
            _ => {
                self.search.handle_event(&Event::Key(key));
                self.contact_cursor = 0;
                let first = app
                    .conversation()
                    .search_contacts(self.search.value())
                    .first()
                    .map(|c| c.id);
                if let Some(id) = first {
                    app.select_conversation(id);
                }
            }
        }
    }

    fn handle_composer_key(&mut self, app: &mut ChatApp, key: KeyEvent) {
        if key.code == KeyCode::Enter {
            app.set_draft_text(self.input.value());
            if app.commit_draft().is_some() {
                self.input = Input::default();
            }
            return;
        }
        self.input.handle_event(&Event::Key(key));
        app.set_draft_text(self.input.value());
    }

    fn handle_call_key(&mut self, app: &mut ChatApp, key: KeyEvent) {
        let call = app.call();
        let can_add = call.modality() == Some(CallModality::Video) && !call.is_full();
        match key.code {
            KeyCode::Esc | KeyCode::Char('e') => app.end_call(),
            KeyCode::Char('a') if can_add => {
                self.dialog = Some(Dialog::AddParticipant { selected: 0 });
            }
            _ => {}
        }
    }

    fn handle_picker_key(&mut self, app: &mut ChatApp, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => app.hide_stickers(),
            KeyCode::Char('s') if ctrl => app.hide_stickers(),
            KeyCode::Left => self.sticker_cursor = self.sticker_cursor.saturating_sub(1),
            KeyCode::Right => self.sticker_cursor = (self.sticker_cursor + 1).min(PICKER_ITEMS - 1),
            KeyCode::Up => self.sticker_cursor = self.sticker_cursor.saturating_sub(PICKER_COLUMNS),
            KeyCode::Down => {
                self.sticker_cursor = (self.sticker_cursor + PICKER_COLUMNS).min(PICKER_ITEMS - 1)
            }
            KeyCode::Enter => {
                if self.sticker_cursor < STICKERS.len() {
                    app.send_sticker(STICKERS[self.sticker_cursor]);
                } else {
                    app.send_gif(GIFS[self.sticker_cursor - STICKERS.len()]);
                }
            }
            _ => {}
        }
    }

    /// Returns the dialog to keep showing, or `None` once it closes.
    fn handle_dialog_key(&mut self, app: &mut ChatApp, dialog: Dialog, key: KeyEvent) -> Option<Dialog> {
        match dialog {
            Dialog::Attach(mut input) => match key.code {
                KeyCode::Esc => None,
                KeyCode::Enter => {
                    let path = input.value().trim().to_string();
                    let file = if path.is_empty() {
                        None
                    } else {
                        Some(MediaFile::from_path(Path::new(&path)))
                    };
                    if app.attach_media(file) {
                        info!("UI: attached {}", path);
                    }
                    None
                }
                _ => {
                    input.handle_event(&Event::Key(key));
                    Some(Dialog::Attach(input))
                }
            },
            Dialog::Filters { channel } => {
                let selected = FilterChannel::ALL[channel];
                let value = app.composer().filter().get(selected) as i32;
                match key.code {
                    KeyCode::Esc | KeyCode::Enter => return None,
                    KeyCode::Up => return Some(Dialog::Filters { channel: channel.saturating_sub(1) }),
                    KeyCode::Down => {
                        let last = FilterChannel::ALL.len() - 1;
                        return Some(Dialog::Filters { channel: (channel + 1).min(last) });
                    }
                    KeyCode::Left => {
                        app.update_filter(selected, value - FILTER_STEP);
                    }
                    KeyCode::Right => {
                        app.update_filter(selected, value + FILTER_STEP);
                    }
                    KeyCode::Char('r') => app.reset_filter(),
                    _ => {}
                }
                Some(Dialog::Filters { channel })
            }
            Dialog::AddParticipant { selected } => {
                let candidates: Vec<ContactId> = app
                    .call()
                    .addable(app.conversation().contacts())
                    .iter()
                    .map(|c| c.id)
                    .collect();
                if candidates.is_empty() {
                    return None;
                }
                match key.code {
                    KeyCode::Up => Some(Dialog::AddParticipant { selected: selected.saturating_sub(1) }),
                    KeyCode::Down => Some(Dialog::AddParticipant {
                        selected: (selected + 1).min(candidates.len() - 1),
                    }),
                    KeyCode::Enter => {
                        let id = candidates[selected.min(candidates.len() - 1)];
                        app.add_participant(id);
                        None
                    }
                    KeyCode::Esc => None,
                    _ => Some(Dialog::AddParticipant { selected }),
                }
            }
            Dialog::Help => None,
        }
    }

    pub fn draw<B: Backend>(&self, frame: &mut Frame<B>, app: &ChatApp) {
        let size = frame.size();

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(28), // Contacts panel
                Constraint::Percentage(72), // Chat panel
            ])
            .split(size);

        let composer_height = if app.composer().preview().is_some() { 6 } else { 3 };
        let chat_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),               // Contact header
                Constraint::Min(5),                  // Thread
                Constraint::Length(composer_height), // Preview + input
                Constraint::Length(1),               // Help line
            ])
            .split(chunks[1]);

        let contacts_focused = matches!(self.focus, Focus::Contacts);
        draw_contacts(frame, chunks[0], app, &self.search, self.contact_cursor, contacts_focused);
        draw_header(frame, chat_chunks[0], app);
        draw_thread(frame, chat_chunks[1], app);
        draw_composer(frame, chat_chunks[2], app, &self.input, !contacts_focused);
        draw_help_line(frame, chat_chunks[3], app);

        if !contacts_focused && !app.composer().is_recording() && self.dialog.is_none() {
            let input_area = chat_chunks[2];
            frame.set_cursor(
                input_area.x + self.input.cursor() as u16 + 1,
                input_area.y + input_area.height.saturating_sub(2),
            );
        }

        if app.composer().stickers_open() {
            draw_sticker_picker(frame, size, self.sticker_cursor);
        }
        if app.call().is_active() {
            draw_call_overlay(frame, size, app);
        }

        match &self.dialog {
            Some(Dialog::Attach(input)) => draw_attach_dialog(frame, size, input),
            Some(Dialog::Filters { channel }) => draw_filter_dialog(frame, size, app, *channel),
            Some(Dialog::AddParticipant { selected }) => draw_add_participant_dialog(frame, size, app, *selected),
            Some(Dialog::Help) => draw_help_dialog(frame, size, app),
            None => {}
        }
    }
}

fn handle_recording_key(app: &mut ChatApp, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => {
            app.stop_recording();
        }
        KeyCode::Char('r') if ctrl => {
            app.stop_recording();
        }
        KeyCode::Esc => {
            app.cancel_recording();
        }
        KeyCode::Char('k') if ctrl => {
            app.cancel_recording();
        }
        _ => {}
    }
}

/// Centered popup of at most `width` x `height`.
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn popup_block(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn draw_contacts<B: Backend>(
    f: &mut Frame<B>,
    area: Rect,
    app: &ChatApp,
    search: &Input,
    cursor: usize,
    focused: bool,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let search_widget = Paragraph::new(search.value())
        .block(Block::default().title("Search").borders(Borders::ALL).border_style(focus_style(focused)));
    f.render_widget(search_widget, chunks[0]);

    let active = app.conversation().active_contact_id();
    let items: Vec<ListItem> = app
        .conversation()
        .search_contacts(search.value())
        .iter()
        .map(|c| {
            let presence = if c.online { "●" } else { "○" };
            let marker = if c.id == active { ">" } else { " " };
            let preview = if c.typing { "typing…" } else { c.last_message.as_str() };
            let style = if c.id == active {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Text::from(vec![
                Line::from(format!("{} {} {} {}  {}", marker, presence, c.avatar, c.name, c.last_activity)),
                Line::from(Span::styled(format!("     {}", preview), Style::default().fg(Color::Gray))),
            ]))
            .style(style)
        })
        .collect();

    let mut state = ListState::default();
    if focused && !items.is_empty() {
        state.select(Some(cursor.min(items.len() - 1)));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .title("Contacts (Tab to focus)")
                .borders(Borders::ALL)
                .border_style(focus_style(focused)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray));
    f.render_stateful_widget(list, chunks[1], &mut state);
}

fn draw_header<B: Backend>(f: &mut Frame<B>, area: Rect, app: &ChatApp) {
    let line = match app.conversation().active_contact() {
        Some(contact) => {
            let status_color = if contact.typing || contact.online { Color::Green } else { Color::Gray };
            Line::from(vec![
                Span::styled(
                    format!("{} {}", contact.avatar, contact.name),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(status_line(contact), Style::default().fg(status_color)),
            ])
        }
        None => Line::from(""),
    };
    f.render_widget(Paragraph::new(line).block(Block::default().borders(Borders::ALL)), area);
}

fn describe_media(media: &MediaAttachment) -> String {
    match media.kind {
        MediaKind::Image => format!("[image {}]", media.source),
        MediaKind::Video => format!("[video {}]", media.source),
        MediaKind::Voice => format!("[voice {}]", format_duration(media.duration_secs.unwrap_or(0))),
        MediaKind::Sticker => media.source.clone(),
        MediaKind::Gif => format!("[GIF {}]", media.source),
    }
}

fn draw_thread<B: Backend>(f: &mut Frame<B>, area: Rect, app: &ChatApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Messages
            Constraint::Length(1), // Typing indicator
        ])
        .split(area);

    let peer = app.conversation().active_contact();
    let peer_name = peer.map_or("Unknown", |c| c.name.as_str());
    let wrap_width = (area.width.saturating_sub(2) as usize).max(1);

    let items: Vec<ListItem> = app
        .conversation()
        .messages()
        .iter()
        .flat_map(|m| {
            let (who, style) = match m.sender {
                Sender::Me => ("You", Style::default().fg(Color::Magenta)),
                Sender::Peer => (peer_name, Style::default()),
            };
            let body = match (&m.media, m.text.is_empty()) {
                (Some(media), true) => describe_media(media),
                (Some(media), false) => format!("{} {}", describe_media(media), m.text),
                (None, _) => m.text.clone(),
            };
            let full = format!("[{}] {}: {}", m.timestamp, who, body);
            let lines: Vec<String> = wrap(&full, wrap_width)
                .into_iter()
                .map(|l| l.into_owned())
                .collect();
            lines
                .into_iter()
                .map(move |line| ListItem::new(Text::from(line)).style(style))
        })
        .collect();

    // Keep the newest message in view
    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(items.len() - 1));
    }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Messages"))
        .highlight_style(Style::default());
    f.render_stateful_widget(list, chunks[0], &mut state);

    if let Some(contact) = peer.filter(|c| c.typing) {
        let typing = Paragraph::new(format!("{} is typing…", contact.name))
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC));
        f.render_widget(typing, chunks[1]);
    }
}

fn draw_composer<B: Backend>(f: &mut Frame<B>, area: Rect, app: &ChatApp, input: &Input, focused: bool) {
    let composer = app.composer();
    let input_area = match composer.preview() {
        Some(preview) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Length(3)])
                .split(area);
            let kind = if preview.kind == MediaKind::Video { "Video" } else { "Image" };
            let mut spans = vec![
                Span::styled(format!("{} ready to send: ", kind), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(preview.file_name.clone()),
            ];
            if app.features().media_filters_enabled() {
                spans.push(Span::styled(
                    format!("  {}", composer.filter_expression()),
                    Style::default().fg(Color::Cyan),
                ));
            }
            let widget = Paragraph::new(Line::from(spans))
                .block(Block::default().title("Attachment (Ctrl+E edit, Ctrl+X remove)").borders(Borders::ALL));
            f.render_widget(widget, chunks[0]);
            chunks[1]
        }
        None => area,
    };

    if composer.is_recording() {
        let widget = Paragraph::new(Line::from(vec![
            Span::styled("● ", Style::default().fg(Color::Red)),
            Span::raw("Recording voice message… "),
            Span::styled(
                format_duration(composer.recording_elapsed()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]))
        .block(
            Block::default()
                .title("Enter send | Esc cancel")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
        f.render_widget(widget, input_area);
        return;
    }

    let widget = Paragraph::new(input.value())
        .block(Block::default().title("Message").borders(Borders::ALL).border_style(focus_style(focused)));
    f.render_widget(widget, input_area);
}

fn draw_help_line<B: Backend>(f: &mut Frame<B>, area: Rect, app: &ChatApp) {
    let features = app.features();
    let mut parts = vec!["ESC quit", "TAB switch"];
    if features.media {
        parts.push("Ctrl+A attach");
    }
    if features.stickers {
        parts.push("Ctrl+S stickers");
    }
    if features.voice_messages {
        parts.push("Ctrl+R record");
    }
    if features.calls {
        parts.push("Ctrl+P/V call");
    }
    if features.group_calls_enabled() {
        parts.push("Ctrl+G group");
    }
    parts.push("F1 help");
    let help = Paragraph::new(Line::from(Span::styled(parts.join(" | "), Style::default().fg(Color::Gray))));
    f.render_widget(help, area);
}

fn draw_sticker_picker<B: Backend>(f: &mut Frame<B>, area: Rect, cursor: usize) {
    let popup = popup_area(area, 44, 12);
    f.render_widget(Clear, popup);
    f.render_widget(popup_block("Stickers & GIFs (Enter send, Esc close)", Color::Yellow), popup);

    let cell = |index: usize, label: &str| {
        let style = if index == cursor {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        Span::styled(format!(" {} ", label), style)
    };

    let mut lines: Vec<Line> = STICKERS
        .chunks(PICKER_COLUMNS)
        .enumerate()
        .map(|(row, stickers)| {
            Line::from(
                stickers
                    .iter()
                    .enumerate()
                    .map(|(col, s)| cell(row * PICKER_COLUMNS + col, s))
                    .collect::<Vec<_>>(),
            )
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(
        (0..GIFS.len())
            .map(|i| cell(STICKERS.len() + i, &format!("GIF {}", i + 1)))
            .collect::<Vec<_>>(),
    ));

    let inner = popup.inner(&Margin { vertical: 1, horizontal: 2 });
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_call_overlay<B: Backend>(f: &mut Frame<B>, area: Rect, app: &ChatApp) {
    let call = app.call();
    let video = call.modality() == Some(CallModality::Video);
    let popup = popup_area(area, 60, 18);
    f.render_widget(Clear, popup);
    let title = if video { "Video call" } else { "Audio call" };
    f.render_widget(popup_block(title, Color::Green), popup);

    let conversation = app.conversation();
    let mut lines = Vec::new();
    if let Some(contact) = conversation.active_contact() {
        lines.push(Line::from(Span::styled(
            format!("{} {}", contact.avatar, contact.name),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }

    if video {
        lines.push(Line::from(format!(
            "Participants ({}/{}):",
            call.participants().len(),
            MAX_PARTICIPANTS
        )));
        for id in call.participants() {
            let name = conversation
                .contact(*id)
                .map(|c| format!("{} {}", c.avatar, c.name))
                .unwrap_or_else(|| format!("#{}", id));
            lines.push(Line::from(format!("  {}", name)));
        }
        lines.push(Line::from(""));
    }

    let mut controls = vec![Span::styled("[e] end call", Style::default().fg(Color::Red))];
    if video && !call.is_full() {
        controls.push(Span::raw(" | [a] add participant"));
    }
    lines.push(Line::from(controls));

    let inner = popup.inner(&Margin { vertical: 1, horizontal: 2 });
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_attach_dialog<B: Backend>(f: &mut Frame<B>, area: Rect, input: &Input) {
    let popup = popup_area(area, 60, 7);
    f.render_widget(Clear, popup);
    f.render_widget(popup_block("Attach photo or video", Color::Yellow), popup);

    let inner = popup.inner(&Margin { vertical: 1, horizontal: 2 });
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(3)])
        .split(inner);

    f.render_widget(Paragraph::new("Path to file (Enter attach, Esc cancel):"), chunks[0]);
    let field = Paragraph::new(input.value()).block(Block::default().borders(Borders::ALL));
    f.render_widget(field, chunks[1]);
    f.set_cursor(chunks[1].x + input.cursor() as u16 + 1, chunks[1].y + 1);
}

fn draw_filter_dialog<B: Backend>(f: &mut Frame<B>, area: Rect, app: &ChatApp, selected: usize) {
    const BAR: u16 = 20;
    let popup = popup_area(area, 56, 10);
    f.render_widget(Clear, popup);
    f.render_widget(popup_block("Edit media", Color::Yellow), popup);

    let filter = app.composer().filter();
    let mut lines: Vec<Line> = FilterChannel::ALL
        .iter()
        .enumerate()
        .map(|(i, channel)| {
            let value = filter.get(*channel);
            let filled = (value * BAR / FILTER_MAX) as usize;
            let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR as usize - filled));
            let marker = if i == selected { ">" } else { " " };
            Line::from(format!("{} {:<11}{:>4}% {}", marker, channel.label(), value, bar))
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        app.filter_expression(),
        Style::default().fg(Color::Cyan),
    )));
    lines.push(Line::from(Span::styled(
        "↑↓ channel | ←→ adjust | r reset | Esc done",
        Style::default().fg(Color::Gray),
    )));

    let inner = popup.inner(&Margin { vertical: 1, horizontal: 2 });
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_add_participant_dialog<B: Backend>(f: &mut Frame<B>, area: Rect, app: &ChatApp, selected: usize) {
    let popup = popup_area(area, 40, 10);
    f.render_widget(Clear, popup);

    let items: Vec<ListItem> = app
        .call()
        .addable(app.conversation().contacts())
        .iter()
        .map(|c| ListItem::new(format!("{} {}", c.avatar, c.name)))
        .collect();
    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(selected.min(items.len() - 1)));
    }
    let list = List::new(items)
        .block(popup_block("Add participant", Color::Yellow))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, popup, &mut state);
}

fn draw_help_dialog<B: Backend>(f: &mut Frame<B>, area: Rect, app: &ChatApp) {
    let features = app.features();
    let popup = popup_area(area, 56, 20);
    f.render_widget(Clear, popup);

    let mut shortcuts = vec![
        ("Esc", "Quit / close popup"),
        ("Tab", "Switch between contacts and message"),
        ("↑/↓", "Choose conversation (contacts focused)"),
        ("Enter", "Send message"),
    ];
    if features.media {
        shortcuts.push(("Ctrl+A", "Attach photo or video"));
        shortcuts.push(("Ctrl+X", "Remove attachment"));
    }
    if features.media_filters_enabled() {
        shortcuts.push(("Ctrl+E", "Edit attachment filters"));
    }
    if features.stickers {
        shortcuts.push(("Ctrl+S", "Stickers and GIFs"));
    }
    if features.voice_messages {
        shortcuts.push(("Ctrl+R", "Record voice message (Ctrl+K cancel)"));
    }
    if features.typing_simulation {
        shortcuts.push(("Ctrl+T", "Simulate typing"));
    }
    if features.calls {
        shortcuts.push(("Ctrl+P", "Audio call"));
        shortcuts.push(("Ctrl+V", "Video call"));
    }
    if features.group_calls_enabled() {
        shortcuts.push(("Ctrl+G", "Group call"));
    }

    let items: Vec<ListItem> = shortcuts
        .iter()
        .map(|(key, what)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<8}", key), Style::default().fg(Color::Yellow)),
                Span::raw(*what),
            ]))
        })
        .collect();
    let list = List::new(items).block(popup_block("Shortcuts (any key to close)", Color::Blue));
    f.render_widget(list, popup);
}

pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

pub fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatmock::Features;
    use ratatui::backend::TestBackend;
    use tokio::time::Duration;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn type_text(ui: &mut ChatUI, app: &mut ChatApp, text: &str, now: Instant) {
        for c in text.chars() {
            ui.handle_event(app, key(KeyCode::Char(c)), now);
        }
    }

    fn render(ui: &ChatUI, app: &ChatApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| ui.draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol.as_str())
            .collect()
    }

    #[test]
    fn test_render_shows_roster_and_thread() {
        let app = ChatApp::new(Features::default());
        let ui = ChatUI::new();
        let screen = render(&ui, &app);

        assert!(screen.contains("Contacts (Tab to focus)"));
        assert!(screen.contains("Дмитрий Козлов"));
        assert!(screen.contains("Привет! Как дела?"));
        assert!(screen.contains("[image /placeholder.svg]"));
    }

    #[test]
    fn test_enter_sends_typed_text() {
        let now = Instant::now();
        let mut app = ChatApp::new(Features::default());
        let mut ui = ChatUI::new();

        type_text(&mut ui, &mut app, "hello", now);
        assert_eq!(app.composer().text(), "hello");

        ui.handle_event(&mut app, key(KeyCode::Enter), now);
        let last = app.conversation().messages().last().unwrap();
        assert_eq!(last.text, "hello");
        assert_eq!(last.sender, Sender::Me);
        assert_eq!(ui.input.value(), "");
        assert_eq!(app.composer().text(), "");
    }

    #[test]
    fn test_enter_on_blank_input_sends_nothing() {
        let now = Instant::now();
        let mut app = ChatApp::new(Features::default());
        let mut ui = ChatUI::new();

        type_text(&mut ui, &mut app, "   ", now);
        ui.handle_event(&mut app, key(KeyCode::Enter), now);
        assert_eq!(app.conversation().messages().len(), 4);
        assert_eq!(ui.input.value(), "   ");
    }

    #[test]
    fn test_group_call_overlay() {
        let now = Instant::now();
        let mut app = ChatApp::new(Features::default());
        let mut ui = ChatUI::new();

        ui.handle_event(&mut app, ctrl('g'), now);
        assert!(app.call().is_active());
        let screen = render(&ui, &app);
        assert!(screen.contains("Video call"));
        assert!(screen.contains("Participants (3/6):"));
        assert!(screen.contains("[a] add participant"));

        // Add the first addable contact (Иван Волков)
        ui.handle_event(&mut app, key(KeyCode::Char('a')), now);
        ui.handle_event(&mut app, key(KeyCode::Enter), now);
        assert_eq!(app.call().participants(), &[1, 2, 3, 4]);

        ui.handle_event(&mut app, key(KeyCode::Char('e')), now);
        assert!(!app.call().is_active());
        // Esc after the call ended quits
        assert_eq!(ui.handle_event(&mut app, key(KeyCode::Esc), now), Flow::Quit);
    }

    #[test]
    fn test_recording_indicator_and_send() {
        let t0 = Instant::now();
        let mut app = ChatApp::new(Features::default());
        let mut ui = ChatUI::new();

        ui.handle_event(&mut app, ctrl('r'), t0);
        app.run_due_timers(t0 + Duration::from_secs(2));
        let screen = render(&ui, &app);
        assert!(screen.contains("Recording voice message"));
        assert!(screen.contains("0:02"));

        ui.handle_event(&mut app, key(KeyCode::Enter), t0 + Duration::from_secs(2));
        let last = app.conversation().messages().last().unwrap();
        assert_eq!(last.media.as_ref().and_then(|m| m.duration_secs), Some(2));
        assert!(!app.composer().is_recording());
    }

    #[test]
    fn test_sticker_picker_sends_selected_sticker() {
        let now = Instant::now();
        let mut app = ChatApp::new(Features::default());
        let mut ui = ChatUI::new();

        ui.handle_event(&mut app, ctrl('s'), now);
        assert!(app.composer().stickers_open());
        ui.handle_event(&mut app, key(KeyCode::Right), now);
        ui.handle_event(&mut app, key(KeyCode::Enter), now);

        let last = app.conversation().messages().last().unwrap();
        let media = last.media.as_ref().unwrap();
        assert_eq!(media.kind, MediaKind::Sticker);
        assert_eq!(media.source, STICKERS[1]);
        assert!(!app.composer().stickers_open());
    }

    #[test]
    fn test_disabled_features_ignore_shortcuts() {
        let now = Instant::now();
        let features = Features {
            stickers: false,
            calls: false,
            ..Features::default()
        };
        let mut app = ChatApp::new(features);
        let mut ui = ChatUI::new();

        ui.handle_event(&mut app, ctrl('s'), now);
        ui.handle_event(&mut app, ctrl('g'), now);
        ui.handle_event(&mut app, ctrl('v'), now);
        assert!(!app.composer().stickers_open());
        assert!(!app.call().is_active());

        let screen = render(&ui, &app);
        assert!(!screen.contains("Ctrl+S stickers"));
    }

    #[test]
    fn test_contact_search_selects_first_match() {
        let now = Instant::now();
        let mut app = ChatApp::new(Features::default());
        let mut ui = ChatUI::new();

        ui.handle_event(&mut app, key(KeyCode::Tab), now);
        type_text(&mut ui, &mut app, "иван", now);
        assert_eq!(app.conversation().active_contact_id(), 4);

        let screen = render(&ui, &app);
        assert!(!screen.contains("Мария Петрова"));
    }

    #[test]
    fn test_attach_dialog_with_empty_path_is_noop() {
        let now = Instant::now();
        let mut app = ChatApp::new(Features::default());
        let mut ui = ChatUI::new();

        ui.handle_event(&mut app, ctrl('a'), now);
        assert!(render(&ui, &app).contains("Attach photo or video"));
        ui.handle_event(&mut app, key(KeyCode::Enter), now);
        assert!(app.composer().preview().is_none());

        ui.handle_event(&mut app, ctrl('a'), now);
        type_text(&mut ui, &mut app, "clip.mp4", now);
        ui.handle_event(&mut app, key(KeyCode::Enter), now);
        assert_eq!(app.composer().preview().map(|p| p.kind), Some(MediaKind::Video));
        assert!(render(&ui, &app).contains("Video ready to send: clip.mp4"));
    }
}
