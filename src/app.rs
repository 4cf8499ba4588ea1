use std::sync::Arc;
use std::time::Duration;

use aura_core::api::{AppointmentRequest, IssueLog, ServiceStatus, TechLocation};
use aura_core::chat::MAX_INPUT_CHARS;
use aura_core::checklist::{self, HelpGuide};
use aura_core::notifications::schedule_proactive_alert;
use aura_core::{
    ChatRequest, ChatResponse, ChatSession, Config, Dashboard, MockApi, Notification, Technician,
    TimerGuard,
};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::tui::AppEvent;

/// The slot offered when the assistant proposes a visit
pub const OFFERED_SLOT: &str = "Tomorrow 2-4 PM";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Help,
    Chat,
    Track,
}

impl Screen {
    pub fn all() -> [Screen; 4] {
        [Screen::Dashboard, Screen::Help, Screen::Chat, Screen::Track]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Dashboard => "DASHBOARD",
            Screen::Help => "SELF-HELP",
            Screen::Chat => "AI SUPPORT",
            Screen::Track => "TECH TRACK",
        }
    }

    pub fn next(&self) -> Screen {
        let all = Screen::all();
        let i = all.iter().position(|s| s == self).unwrap_or(0);
        all[(i + 1) % all.len()]
    }

    pub fn prev(&self) -> Screen {
        let all = Screen::all();
        let i = all.iter().position(|s| s == self).unwrap_or(0);
        all[(i + all.len() - 1) % all.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Self-help shows either the guide list or one guide's steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpView {
    Guides,
    Steps,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Popup {
    ConfirmBooking,
    Notice { title: String, body: String },
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub popup: Option<Popup>,
    pub status_line: Option<String>,

    // Dashboard
    pub dashboard: Dashboard,
    pub alert_state: ListState,
    pub service: Option<ServiceStatus>,
    status_task: Option<JoinHandle<ServiceStatus>>,

    // Self-help
    pub guides: Vec<HelpGuide>,
    pub help_view: HelpView,
    pub guide_state: ListState,
    pub step_state: ListState,

    // Chat
    pub chat: ChatSession,
    pub chat_input: String,
    pub chat_cursor: usize, // cursor position in chat_input, in chars
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the message area
    pub chat_width: u16,  // inner width, for wrap estimates
    pub reply_task: Option<JoinHandle<(u64, ChatResponse)>>,

    // Tracking
    pub technician: Technician,
    pub last_fix: Option<TechLocation>,
    pub location_task: Option<JoinHandle<TechLocation>>,
    tracker_timer: Option<TimerGuard>,

    // Ticket / appointment requests, resolved into a notice popup
    pub notice_task: Option<JoinHandle<Popup>>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Area of the chat log for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    // Services
    pub api: MockApi,
    pub config: Config,
    events: UnboundedSender<AppEvent>,
    _alert_timer: Option<TimerGuard>,
}

impl App {
    pub fn new(config: Config, events: UnboundedSender<AppEvent>) -> Self {
        let rules = Arc::new(config.rule_set());
        let api = MockApi::new(rules, config.latency);

        let alert_tx = events.clone();
        let alert_timer = schedule_proactive_alert(
            Duration::from_secs(config.proactive_alert_secs),
            move |alert| {
                let _ = alert_tx.send(AppEvent::Alert(alert));
            },
        );

        let status_api = api.clone();
        let status_task = tokio::spawn(async move { status_api.get_service_status().await });

        let mut alert_state = ListState::default();
        alert_state.select(Some(0));
        let mut guide_state = ListState::default();
        guide_state.select(Some(0));

        Self {
            should_quit: false,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            popup: None,
            status_line: None,

            dashboard: Dashboard::default(),
            alert_state,
            service: None,
            status_task: Some(status_task),

            guides: checklist::seed_guides(),
            help_view: HelpView::Guides,
            guide_state,
            step_state: ListState::default(),

            chat: ChatSession::new(),
            chat_input: String::new(),
            chat_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            reply_task: None,

            technician: Technician::seed(),
            last_fix: None,
            location_task: None,
            tracker_timer: None,

            notice_task: None,

            animation_frame: 0,
            chat_area: None,

            api,
            config,
            events,
            _alert_timer: Some(alert_timer),
        }
    }

    /// Switch screens. The tracking timer only runs while its screen is up.
    pub fn set_screen(&mut self, screen: Screen) {
        if self.screen == screen {
            return;
        }

        if self.screen == Screen::Track {
            // dropping the guard cancels the timer
            self.tracker_timer = None;
        }

        self.screen = screen;
        self.input_mode = InputMode::Normal;
        self.status_line = None;

        if screen == Screen::Track {
            self.start_tracking();
        }
    }

    fn start_tracking(&mut self) {
        let tx = self.events.clone();
        let period = Duration::from_secs(self.config.tracker_tick_secs.max(1));
        self.tracker_timer = Some(TimerGuard::every(period, move || {
            tx.send(AppEvent::TrackerTick).is_ok()
        }));
    }

    pub fn is_tracking(&self) -> bool {
        self.tracker_timer.is_some()
    }

    pub fn advance_technician(&mut self) {
        self.technician = self.technician.advance();
    }

    pub fn refresh_location(&mut self) {
        if self.location_task.is_some() {
            return;
        }
        let api = self.api.clone();
        self.location_task = Some(tokio::spawn(async move {
            api.get_technician_location().await
        }));
        self.status_line = Some("Requesting location fix...".to_string());
    }

    // Dashboard
    pub fn push_alert(&mut self, alert: Notification) {
        self.dashboard = self.dashboard.with_alert(alert);
        self.alert_state.select(Some(0));
    }

    pub fn alert_nav_down(&mut self) {
        let len = self.dashboard.alerts.len();
        if len > 0 {
            let i = self.alert_state.selected().unwrap_or(0);
            self.alert_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn alert_nav_up(&mut self) {
        let i = self.alert_state.selected().unwrap_or(0);
        self.alert_state.select(Some(i.saturating_sub(1)));
    }

    // Self-help
    pub fn selected_guide(&self) -> Option<&HelpGuide> {
        self.guide_state.selected().and_then(|i| self.guides.get(i))
    }

    pub fn guide_nav_down(&mut self) {
        let len = self.guides.len();
        if len > 0 {
            let i = self.guide_state.selected().unwrap_or(0);
            self.guide_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn guide_nav_up(&mut self) {
        let i = self.guide_state.selected().unwrap_or(0);
        self.guide_state.select(Some(i.saturating_sub(1)));
    }

    pub fn open_guide(&mut self) {
        if self.selected_guide().is_some_and(|g| !g.steps.is_empty()) {
            self.help_view = HelpView::Steps;
            self.step_state.select(Some(0));
        }
    }

    pub fn close_guide(&mut self) {
        self.help_view = HelpView::Guides;
        self.step_state.select(None);
    }

    pub fn step_nav_down(&mut self) {
        let len = self.selected_guide().map(|g| g.steps.len()).unwrap_or(0);
        if len > 0 {
            let i = self.step_state.selected().unwrap_or(0);
            self.step_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn step_nav_up(&mut self) {
        let i = self.step_state.selected().unwrap_or(0);
        self.step_state.select(Some(i.saturating_sub(1)));
    }

    pub fn toggle_selected_step(&mut self) {
        let Some(guide) = self.selected_guide() else { return };
        let Some(step) = self.step_state.selected().and_then(|i| guide.steps.get(i)) else {
            return;
        };
        let (guide_id, step_id) = (guide.id.clone(), step.id.clone());
        self.guides = checklist::toggle_step(&self.guides, &guide_id, &step_id);
    }

    /// Log the finished guide as a resolved issue and go back to the list
    pub fn resolve_guide(&mut self) {
        let Some(guide) = self.selected_guide() else { return };
        if !checklist::is_complete(guide) || self.notice_task.is_some() {
            return;
        }

        let issue = IssueLog {
            issue_id: guide.id.clone(),
            steps_completed: checklist::completed_count(guide),
        };
        let api = self.api.clone();
        self.notice_task = Some(tokio::spawn(async move {
            let receipt = api.log_issue(issue).await;
            Popup::Notice {
                title: "ISSUE RESOLVED".to_string(),
                body: format!("Ticket {} logged. Glad we could help!", receipt.ticket_id),
            }
        }));
        self.close_guide();
    }

    // Chat
    pub fn send_chat(&mut self) {
        let Some(pending) = self.chat.submit(&self.chat_input) else {
            return;
        };

        self.chat_input.clear();
        self.chat_cursor = 0;
        self.scroll_chat_to_bottom();

        let api = self.api.clone();
        self.reply_task = Some(tokio::spawn(async move {
            let response = api
                .send_chat_message(ChatRequest {
                    message: pending.utterance,
                })
                .await;
            (pending.seq, response)
        }));
    }

    /// Start a new conversation, dropping any reply still in flight
    pub fn reset_chat(&mut self) {
        if let Some(task) = self.reply_task.take() {
            task.abort();
        }
        self.chat.reset();
        self.chat_scroll = 0;
    }

    pub fn chat_input_full(&self) -> bool {
        self.chat_input.chars().count() >= MAX_INPUT_CHARS
    }

    /// Offer the booking popup if the last reply proposed a visit
    pub fn offer_booking(&mut self) {
        if self.chat.pending_action().is_some() {
            self.popup = Some(Popup::ConfirmBooking);
        }
    }

    pub fn confirm_booking(&mut self) {
        self.popup = None;
        if self.notice_task.is_some() {
            return;
        }
        let api = self.api.clone();
        self.notice_task = Some(tokio::spawn(async move {
            let receipt = api
                .schedule_appointment(AppointmentRequest {
                    time_slot: OFFERED_SLOT.to_string(),
                })
                .await;
            Popup::Notice {
                title: "TECHNICIAN BOOKED".to_string(),
                body: format!(
                    "Appointment {} confirmed for {}.",
                    receipt.appointment_id, OFFERED_SLOT
                ),
            }
        }));
    }

    /// Collect whatever background requests have finished
    pub async fn poll_tasks(&mut self) {
        if let Some(task) = take_finished(&mut self.reply_task) {
            match task.await {
                Ok((seq, response)) => {
                    if self.chat.resolve(seq, response.into()) {
                        self.scroll_chat_to_bottom();
                    }
                }
                Err(e) => tracing::warn!("chat reply task failed: {}", e),
            }
        }

        if let Some(task) = take_finished(&mut self.notice_task) {
            match task.await {
                Ok(popup) => self.popup = Some(popup),
                Err(e) => tracing::warn!("request task failed: {}", e),
            }
        }

        if let Some(task) = take_finished(&mut self.status_task) {
            match task.await {
                Ok(status) => self.service = Some(status),
                Err(e) => tracing::warn!("service status task failed: {}", e),
            }
        }

        if let Some(task) = take_finished(&mut self.location_task) {
            match task.await {
                Ok(fix) => {
                    self.status_line = Some(format!(
                        "GPS fix {:.4}, {:.4} - {}",
                        fix.lat,
                        fix.lng,
                        fix.status.display_text()
                    ));
                    self.last_fix = Some(fix);
                }
                Err(e) => tracing::warn!("location task failed: {}", e),
            }
        }
    }

    pub fn is_typing(&self) -> bool {
        self.chat.is_pending()
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_typing() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    /// Scroll chat to bottom so the newest message (or typing indicator) is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: usize = 0;
        for msg in self.chat.messages() {
            total_lines += 1; // sender + time line
            let char_count = msg.text.chars().count();
            total_lines += (char_count / wrap_width) + 1;
            if msg.kind.is_actionable() {
                total_lines += 1; // booking hint
            }
            total_lines += 1; // blank line after message
        }

        if self.is_typing() {
            total_lines += 2;
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height as usize
        } else {
            20
        };

        let offset = total_lines.saturating_sub(visible_height);
        self.chat_scroll = u16::try_from(offset).unwrap_or(u16::MAX);
    }
}

fn take_finished<T>(slot: &mut Option<JoinHandle<T>>) -> Option<JoinHandle<T>> {
    if slot.as_ref().is_some_and(|task| task.is_finished()) {
        slot.take()
    } else {
        None
    }
}
