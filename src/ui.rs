use aura_core::chat::MAX_INPUT_CHARS;
use aura_core::checklist;
use aura_core::{NotificationKind, Originator, ResponseKind};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, HelpView, InputMode, Popup, Screen, OFFERED_SLOT};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Dashboard => render_dashboard(app, frame, body_area),
        Screen::Help => render_help(app, frame, body_area),
        Screen::Chat => render_chat(app, frame, body_area),
        Screen::Track => render_track(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    if let Some(popup) = app.popup.clone() {
        render_popup(&popup, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let [title_area, tabs_area] =
        Layout::horizontal([Constraint::Length(22), Constraint::Min(0)]).areas(area);

    let title = Line::from(vec![
        Span::styled(" AURA-Lite ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(title).style(Style::default().bg(Color::DarkGray)),
        title_area,
    );

    let titles: Vec<String> = Screen::all()
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{} {}", i + 1, s.title()))
        .collect();
    let selected = Screen::all()
        .iter()
        .position(|s| *s == app.screen)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .divider("|");
    frame.render_widget(tabs, tabs_area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " TYPING ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let keys: &[(&str, &str)] = match (app.screen, app.input_mode) {
        (_, InputMode::Editing) => &[("Enter", "send"), ("←/→", "move"), ("Esc", "stop typing")],
        (Screen::Dashboard, _) => &[
            ("j/k", "alerts"),
            ("Enter", "resolve"),
            ("h", "self-help"),
            ("a", "ask AURA"),
            ("t", "track"),
        ],
        (Screen::Help, _) if app.help_view == HelpView::Steps => &[
            ("j/k", "nav"),
            ("Space", "check"),
            ("r", "resolved"),
            ("a", "still need help"),
            ("Esc", "back"),
        ],
        (Screen::Help, _) => &[("j/k", "nav"), ("Enter", "open"), ("a", "ask AURA")],
        (Screen::Chat, _) => &[
            ("i", "type"),
            ("j/k", "scroll"),
            ("b", "book tech"),
            ("n", "new chat"),
        ],
        (Screen::Track, _) => &[("r", "locate"), ("c", "call"), ("m", "message")],
    };

    let mut hints = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in keys {
        hints.push(Span::styled(format!(" {} ", key), key_style));
        hints.push(Span::styled(format!(" {} ", label), label_style));
    }
    if app.input_mode == InputMode::Normal {
        hints.push(Span::styled(" Tab ", key_style));
        hints.push(Span::styled(" screen ", label_style));
        hints.push(Span::styled(" q ", key_style));
        hints.push(Span::styled(" quit ", label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

fn kind_style(kind: NotificationKind) -> (&'static str, Style) {
    match kind {
        NotificationKind::Warning => ("!", Style::default().fg(Color::Yellow)),
        NotificationKind::Info => ("i", Style::default().fg(Color::Cyan)),
        NotificationKind::Success => ("✓", Style::default().fg(Color::Green)),
    }
}

fn render_dashboard(app: &mut App, frame: &mut Frame, area: Rect) {
    let [status_area, alerts_area] =
        Layout::vertical([Constraint::Length(6), Constraint::Min(0)]).areas(area);

    let connection = &app.dashboard.connection;
    let status = Text::from(vec![
        Line::from(vec![
            Span::styled("Status  ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                connection.state.clone(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Speed   ", Style::default().fg(Color::DarkGray)),
            Span::raw(connection.speed_label()),
        ]),
        Line::from(vec![
            Span::styled("Service ", Style::default().fg(Color::DarkGray)),
            Span::raw(match &app.service {
                Some(service) => format!("{} ({} uptime)", service.status, service.uptime),
                None => "checking...".to_string(),
            }),
        ]),
        Line::from(Span::styled(
            "Quick actions: [h] self-help  [a] ask AURA  [t] track technician",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    let status_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Connection ");
    frame.render_widget(Paragraph::new(status).block(status_block), status_area);

    let items: Vec<ListItem> = app
        .dashboard
        .alerts
        .iter()
        .map(|alert| {
            let (icon, style) = kind_style(alert.kind);
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("[{}] ", icon), style),
                    Span::styled(alert.title.clone(), style.add_modifier(Modifier::BOLD)),
                    Span::styled(
                        format!("  {}", alert.timestamp),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]),
                Line::from(format!("    {}", alert.message)),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Alerts ({}) ", app.dashboard.alerts.len())),
        )
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, alerts_area, &mut app.alert_state);
}

fn progress_gauge(completed: usize, total: usize, ratio: f64) -> Gauge<'static> {
    Gauge::default()
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("{}/{} steps", completed, total))
}

fn render_help(app: &mut App, frame: &mut Frame, area: Rect) {
    match app.help_view {
        HelpView::Guides => render_guide_list(app, frame, area),
        HelpView::Steps => render_guide_steps(app, frame, area),
    }
}

fn render_guide_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = app
        .guides
        .iter()
        .map(|guide| {
            let done = checklist::completed_count(guide);
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(guide.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(
                        format!("  {}/{}", done, guide.steps.len()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("  {}", guide.description),
                    Style::default().fg(Color::Gray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Self-Help Guides "),
        )
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.guide_state);
}

fn render_guide_steps(app: &mut App, frame: &mut Frame, area: Rect) {
    let Some(guide) = app.selected_guide().cloned() else {
        return;
    };

    let [gauge_area, steps_area, detail_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(5),
    ])
    .areas(area);

    let gauge = progress_gauge(
        checklist::completed_count(&guide),
        guide.steps.len(),
        checklist::progress(&guide),
    )
    .block(Block::default().borders(Borders::ALL).title(format!(" {} ", guide.title)));
    frame.render_widget(gauge, gauge_area);

    let items: Vec<ListItem> = guide
        .steps
        .iter()
        .map(|step| {
            let (mark, style) = if step.completed {
                ("[x]", Style::default().fg(Color::Green))
            } else {
                ("[ ]", Style::default())
            };
            ListItem::new(format!("{} {}. {}", mark, step.id, step.title)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Steps "))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, steps_area, &mut app.step_state);

    let detail = if checklist::is_complete(&guide) {
        Text::from(Span::styled(
            "All steps done. Press r if the issue is resolved, or a to ask AURA.",
            Style::default().fg(Color::Green),
        ))
    } else {
        let description = app
            .step_state
            .selected()
            .and_then(|i| guide.steps.get(i))
            .map(|step| step.description.clone())
            .unwrap_or_default();
        Text::from(description)
    };

    let detail = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title(" Details "))
        .wrap(Wrap { trim: true });
    frame.render_widget(detail, detail_area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    // Store chat area for mouse hit-testing and scroll calculations
    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let mut lines: Vec<Line> = Vec::new();
    for msg in app.chat.messages() {
        let (name, color) = match msg.originator {
            Originator::User => ("You", Color::Cyan),
            Originator::Assistant => ("AURA", Color::Yellow),
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}:", name),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {}", msg.time_label()),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        lines.push(Line::from(msg.text.as_str()));
        if msg.kind == ResponseKind::Actionable {
            lines.push(Line::from(Span::styled(
                format!("[b] Book technician for {}", OFFERED_SLOT),
                Style::default().fg(Color::Black).bg(Color::Yellow),
            )));
        }
        lines.push(Line::default());
    }

    if app.is_typing() {
        lines.push(Line::from(Span::styled(
            "AURA:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("AURA is thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" AURA Assistant "),
        )
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    let editing = app.input_mode == InputMode::Editing;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(format!(
            " Message ({}/{}) ",
            app.chat_input.chars().count(),
            MAX_INPUT_CHARS
        ));

    // Horizontal scroll to keep the cursor visible
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.chat_cursor;
    let scroll_offset = if inner_width == 0 || cursor_pos < inner_width {
        0
    } else {
        cursor_pos - inner_width + 1
    };
    let visible_text: String = app
        .chat_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, input_area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

fn render_track(app: &mut App, frame: &mut Frame, area: Rect) {
    let [card_area, eta_area, fix_area] = Layout::vertical([
        Constraint::Length(8),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let tech = &app.technician;
    let card = Text::from(vec![
        Line::from(Span::styled(
            tech.status.display_text(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled(tech.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", tech.phone), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(format!("Skills: {}", tech.skills.join(", "))),
        Line::from(format!("ETA: {}", tech.eta_label())),
        Line::from(tech.location.address.clone()),
    ]);
    frame.render_widget(
        Paragraph::new(card).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Your Technician "),
        ),
        card_area,
    );

    // Journey progress from the seeded 15 minute ETA down to arrival
    let journey = (15u32.saturating_sub(tech.eta_minutes)) as f64 / 14.0;
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .ratio(journey.clamp(0.0, 1.0))
        .label(tech.eta_label())
        .block(Block::default().borders(Borders::ALL).title(" ETA "));
    frame.render_widget(gauge, eta_area);

    let mut lines = Vec::new();
    if let Some(fix) = &app.last_fix {
        lines.push(Line::from(format!(
            "Last fix: {:.4}, {:.4} ({}, {})",
            fix.lat,
            fix.lng,
            fix.eta,
            fix.status.as_str()
        )));
    }
    if let Some(status) = &app.status_line {
        lines.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Yellow),
        )));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "Press r for a live location fix.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Live "))
            .wrap(Wrap { trim: true }),
        fix_area,
    );
}

fn render_popup(popup: &Popup, frame: &mut Frame, area: Rect) {
    let (title, body, color) = match popup {
        Popup::ConfirmBooking => (
            " Book Technician ".to_string(),
            format!(
                "Schedule a technician visit for {}?\n\n[y] confirm   [n] cancel",
                OFFERED_SLOT
            ),
            Color::Yellow,
        ),
        Popup::Notice { title, body } => (
            format!(" {} ", title),
            format!("{}\n\n[Enter] close", body),
            Color::Green,
        ),
    };

    // Calculate popup size and position (centered)
    let popup_width = 50.min(area.width.saturating_sub(4));
    let popup_height = 7.min(area.height.saturating_sub(2));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title);
    frame.render_widget(
        Paragraph::new(body).block(block).wrap(Wrap { trim: false }),
        popup_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::api::ApiLatency;
    use aura_core::Config;
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::mpsc;

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    fn test_app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let config = Config {
            latency: ApiLatency::instant(),
            ..Config::new()
        };
        App::new(config, tx)
    }

    #[tokio::test]
    async fn test_dashboard_shows_connection() {
        let mut app = test_app();
        let screen = draw(&mut app);
        assert!(screen.contains("ACTIVE"));
        assert!(screen.contains("85.2 Mbps"));
        assert!(screen.contains("Maintenance Scheduled"));
    }

    #[tokio::test]
    async fn test_chat_sizes_recorded() {
        let mut app = test_app();
        app.set_screen(Screen::Chat);
        draw(&mut app);
        assert_eq!(app.chat_width, 98);
        assert!(app.chat_area.is_some());
    }

    #[tokio::test]
    async fn test_booking_popup_drawn() {
        let mut app = test_app();
        app.popup = Some(Popup::ConfirmBooking);
        let screen = draw(&mut app);
        assert!(screen.contains("Book Technician"));
    }
}
