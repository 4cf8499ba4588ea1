use anyhow::Result;
use aura_core::notifications::NotificationTopic;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, HelpView, InputMode, Popup, Screen};
use crate::tui::AppEvent;

/// Guide opened when a connection alert is followed
const CONNECTION_GUIDE: &str = "slow-internet";

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Alert(alert) => {
            tracing::info!(title = %alert.title, "alert posted to dashboard");
            app.push_alert(alert);
        }
        AppEvent::TrackerTick => {
            // a tick can race the screen switch that cancelled the timer
            if app.screen == Screen::Track {
                app.advance_technician();
            }
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.popup.is_some() {
        handle_popup(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_chat_editing(app, key),
    }
}

fn handle_popup(app: &mut App, key: KeyEvent) {
    match app.popup {
        Some(Popup::ConfirmBooking) => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => app.confirm_booking(),
            KeyCode::Char('n') | KeyCode::Esc => app.popup = None,
            _ => {}
        },
        Some(Popup::Notice { .. }) => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                app.popup = None;
            }
        }
        None => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    // Screen switching
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('1') => return app.set_screen(Screen::Dashboard),
        KeyCode::Char('2') => return app.set_screen(Screen::Help),
        KeyCode::Char('3') => return app.set_screen(Screen::Chat),
        KeyCode::Char('4') => return app.set_screen(Screen::Track),
        KeyCode::Tab => return app.set_screen(app.screen.next()),
        KeyCode::BackTab => return app.set_screen(app.screen.prev()),
        _ => {}
    }

    match app.screen {
        Screen::Dashboard => handle_dashboard(app, key),
        Screen::Help => handle_help(app, key),
        Screen::Chat => handle_chat_normal(app, key),
        Screen::Track => handle_track(app, key),
    }
}

fn handle_dashboard(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.alert_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.alert_nav_up(),

        // Follow the selected alert
        KeyCode::Enter => {
            let topic = app
                .alert_state
                .selected()
                .and_then(|i| app.dashboard.alerts.get(i))
                .map(|alert| alert.topic);
            if topic == Some(NotificationTopic::ConnectionIssue) {
                open_guide_by_id(app, CONNECTION_GUIDE);
            }
        }

        // Quick actions
        KeyCode::Char('h') => app.set_screen(Screen::Help),
        KeyCode::Char('a') => {
            app.set_screen(Screen::Chat);
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('t') => app.set_screen(Screen::Track),
        _ => {}
    }
}

fn open_guide_by_id(app: &mut App, guide_id: &str) {
    if let Some(idx) = app.guides.iter().position(|g| g.id == guide_id) {
        app.set_screen(Screen::Help);
        app.guide_state.select(Some(idx));
        app.open_guide();
    }
}

fn handle_help(app: &mut App, key: KeyEvent) {
    match app.help_view {
        HelpView::Guides => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.guide_nav_down(),
            KeyCode::Char('k') | KeyCode::Up => app.guide_nav_up(),
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.open_guide(),
            KeyCode::Char('a') => {
                app.set_screen(Screen::Chat);
                app.input_mode = InputMode::Editing;
            }
            _ => {}
        },
        HelpView::Steps => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.step_nav_down(),
            KeyCode::Char('k') | KeyCode::Up => app.step_nav_up(),
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('x') => app.toggle_selected_step(),
            KeyCode::Char('r') => app.resolve_guide(),
            KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace => {
                app.close_guide()
            }
            // Still stuck: hand over to the assistant
            KeyCode::Char('a') => {
                app.set_screen(Screen::Chat);
                app.input_mode = InputMode::Editing;
            }
            _ => {}
        },
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),
        KeyCode::Char('g') => app.chat_scroll = 0,
        KeyCode::Char('b') => app.offer_booking(),
        KeyCode::Char('n') => app.reset_chat(),
        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            if !app.is_typing() {
                app.send_chat();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Backspace => {
            if app.chat_cursor > 0 {
                app.chat_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.chat_input.chars().count();
            if app.chat_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.chat_cursor = app.chat_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.chat_input.chars().count();
            app.chat_cursor = (app.chat_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.chat_cursor = 0;
        }
        KeyCode::End => {
            app.chat_cursor = app.chat_input.chars().count();
        }
        KeyCode::Char(c) => {
            if !app.chat_input_full() {
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.insert(byte_pos, c);
                app.chat_cursor += 1;
            }
        }
        _ => {}
    }
}

fn handle_track(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.refresh_location(),
        KeyCode::Char('c') => {
            app.status_line = Some(format!(
                "Calling {} at {}...",
                app.technician.name, app.technician.phone
            ));
        }
        KeyCode::Char('m') => {
            app.set_screen(Screen::Chat);
            app.input_mode = InputMode::Editing;
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => match app.screen {
            Screen::Dashboard => app.alert_nav_down(),
            Screen::Help if app.help_view == HelpView::Steps => app.step_nav_down(),
            Screen::Help => app.guide_nav_down(),
            Screen::Chat if in_chat => app.scroll_chat_down(3),
            _ => {}
        },
        MouseEventKind::ScrollUp => match app.screen {
            Screen::Dashboard => app.alert_nav_up(),
            Screen::Help if app.help_view == HelpView::Steps => app.step_nav_up(),
            Screen::Help => app.guide_nav_up(),
            Screen::Chat if in_chat => app.scroll_chat_up(3),
            _ => {}
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::api::ApiLatency;
    use aura_core::chat::MAX_INPUT_CHARS;
    use aura_core::Config;
    use tokio::sync::mpsc;

    fn test_app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let config = Config {
            latency: ApiLatency::instant(),
            ..Config::new()
        };
        App::new(config, tx)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_char_to_byte_index() {
        assert_eq!(char_to_byte_index("héllo", 0), 0);
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("héllo", 10), 6);
    }

    #[tokio::test]
    async fn test_number_keys_switch_screens() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.screen, Screen::Chat);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.screen, Screen::Track);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.screen, Screen::Chat);
    }

    #[tokio::test]
    async fn test_editing_with_cursor() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.input_mode, InputMode::Editing);

        type_text(&mut app, "wif");
        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Delete);
        press(&mut app, KeyCode::End);
        type_text(&mut app, "i?");
        assert_eq!(app.chat_input, "ifi?");

        // digits are text while editing, not screen switches
        type_text(&mut app, "2");
        assert_eq!(app.screen, Screen::Chat);
        assert_eq!(app.chat_input, "ifi?2");
    }

    #[tokio::test]
    async fn test_input_stops_at_limit() {
        let mut app = test_app();
        app.set_screen(Screen::Chat);
        app.input_mode = InputMode::Editing;
        type_text(&mut app, &"a".repeat(MAX_INPUT_CHARS + 20));
        assert_eq!(app.chat_input.chars().count(), MAX_INPUT_CHARS);
    }

    #[tokio::test]
    async fn test_enter_sends_message() {
        let mut app = test_app();
        app.set_screen(Screen::Chat);
        app.input_mode = InputMode::Editing;
        type_text(&mut app, "outage?");
        press(&mut app, KeyCode::Enter);

        assert!(app.is_typing());
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.chat.messages().last().unwrap().text, "outage?");
    }

    #[tokio::test]
    async fn test_connection_alert_opens_guide() {
        let mut app = test_app();
        // first seeded alert is the connection warning
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Help);
        assert_eq!(app.help_view, HelpView::Steps);
        assert_eq!(app.selected_guide().unwrap().id, CONNECTION_GUIDE);
    }

    #[tokio::test]
    async fn test_step_toggle_keys() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char(' '));

        let guide = app.selected_guide().unwrap();
        assert!(guide.steps[0].completed);
        assert!(guide.steps[1].completed);
        assert!(!guide.steps[2].completed);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.help_view, HelpView::Guides);
    }

    #[tokio::test]
    async fn test_popup_captures_keys() {
        let mut app = test_app();
        app.popup = Some(Popup::ConfirmBooking);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Char('n'));
        assert!(app.popup.is_none());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_tracker_tick_ignored_off_screen() {
        let mut app = test_app();
        let before = app.technician.eta_minutes;
        handle_event(&mut app, AppEvent::TrackerTick).unwrap();
        assert_eq!(app.technician.eta_minutes, before);

        app.set_screen(Screen::Track);
        handle_event(&mut app, AppEvent::TrackerTick).unwrap();
        assert_eq!(app.technician.eta_minutes, before - 1);
    }
}
