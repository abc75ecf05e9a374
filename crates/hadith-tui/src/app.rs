use std::sync::Arc;
use std::time::{Duration, Instant};

use hadith_core::verdict::{self, HadithTarget};
use hadith_core::{
    strings, ChatRole, ChatSession, GeminiClient, PendingVerification, SubmitError,
    Verification, VerificationClient, VerifyError,
};
use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::clipboard;

/// How long a transient notice stays on screen
const NOTICE_DURATION: Duration = Duration::from_secs(3);

pub type Verifier = VerificationClient<GeminiClient>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    expires_at: Instant,
}

struct InFlight {
    pending: PendingVerification,
    task: JoinHandle<Result<Verification, VerifyError>>,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub session: ChatSession,
    verifier: Arc<Verifier>,
    pub model: String,
    in_flight: Option<InFlight>,

    // Input state
    pub input: String,
    pub input_cursor: usize, // cursor position in chars

    // Chat viewport
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub total_chat_lines: u16,
    /// Keep the newest message in view until the user scrolls away
    pub follow_bottom: bool,
    pub chat_area: Option<Rect>,

    // Index into the session log of the verdict copy/share act on
    pub selected_message: Option<usize>,

    // Overlays
    pub show_reset_confirm: bool,
    pub notice: Option<Notice>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(session: ChatSession, verifier: Verifier, model: impl Into<String>) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            session,
            verifier: Arc::new(verifier),
            model: model.into(),
            in_flight: None,

            input: String::new(),
            input_cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            total_chat_lines: 0,
            follow_bottom: true,
            chat_area: None,

            selected_message: None,

            show_reset_confirm: false,
            notice: None,

            animation_frame: 0,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    /// Start verifying the current input in a background task
    pub fn submit(&mut self) {
        let pending = match self.session.begin_submission(&self.input) {
            Ok(pending) => pending,
            Err(SubmitError::EmptyInput) => return,
            Err(SubmitError::InFlight) => {
                warn!("Submit ignored, verification already running");
                return;
            }
        };

        self.input.clear();
        self.input_cursor = 0;
        self.follow_bottom = true;

        let verifier = Arc::clone(&self.verifier);
        let prompt = pending.prompt.clone();
        let task = tokio::spawn(async move { verifier.verify(&prompt).await });

        info!(model = %self.model, "Verification task spawned");
        self.in_flight = Some(InFlight { pending, task });
    }

    /// Fold a finished verification task back into the session
    pub async fn poll_verification(&mut self) {
        let finished = self
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.task.is_finished());
        if !finished {
            return;
        }

        if let Some(InFlight { pending, task }) = self.in_flight.take() {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) => Err(VerifyError::Interrupted {
                    message: e.to_string(),
                }),
            };
            self.session.complete(&pending, outcome);
            self.follow_bottom = true;
            self.selected_message = self.last_verdict_index();
        }
    }

    /// Tick animation frame and expire notices (called by Tick event)
    pub fn tick(&mut self) {
        if self.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        if self
            .notice
            .as_ref()
            .is_some_and(|n| Instant::now() >= n.expires_at)
        {
            self.notice = None;
        }
    }

    pub fn show_notice(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            expires_at: Instant::now() + NOTICE_DURATION,
        });
    }

    // Reset flow
    pub fn request_reset(&mut self) {
        if self.is_busy() {
            return;
        }
        self.show_reset_confirm = true;
    }

    pub fn answer_reset(&mut self, confirmed: bool) {
        self.show_reset_confirm = false;
        match self.session.reset(confirmed) {
            Ok(true) => {
                self.selected_message = None;
                self.chat_scroll = 0;
                self.follow_bottom = true;
                self.show_notice(strings::NOTICE_RESET);
            }
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Reset refused"),
        }
    }

    /// Put one of the example prompts in the input box
    pub fn use_example(&mut self, index: usize) {
        if let Some(example) = strings::EXAMPLES.get(index) {
            self.input = example.to_string();
            self.input_cursor = self.input.chars().count();
            self.input_mode = InputMode::Editing;
        }
    }

    // Verdict selection
    fn verdict_indices(&self) -> Vec<usize> {
        self.session
            .messages()
            .iter()
            .enumerate()
            .filter(|(_, m)| m.role == ChatRole::Assistant && !m.is_loading())
            .filter(|(_, m)| verdict::parse(&m.content).sections().is_some())
            .map(|(i, _)| i)
            .collect()
    }

    fn last_verdict_index(&self) -> Option<usize> {
        self.verdict_indices().last().copied()
    }

    pub fn select_next_verdict(&mut self) {
        let indices = self.verdict_indices();
        self.selected_message = match self.selected_message {
            Some(current) => indices
                .iter()
                .copied()
                .find(|i| *i > current)
                .or(Some(current)),
            None => indices.first().copied(),
        };
    }

    pub fn select_prev_verdict(&mut self) {
        let indices = self.verdict_indices();
        self.selected_message = match self.selected_message {
            Some(current) => indices
                .iter()
                .rev()
                .copied()
                .find(|i| *i < current)
                .or(Some(current)),
            None => indices.last().copied(),
        };
    }

    fn selected_sections(&self) -> Option<verdict::VerdictSections> {
        let index = self.selected_message.or_else(|| self.last_verdict_index())?;
        let message = self.session.messages().get(index)?;
        match verdict::parse(&message.content) {
            verdict::ParsedContent::Structured(sections) => Some(sections),
            verdict::ParsedContent::Unstructured => None,
        }
    }

    pub fn copy_selected(&mut self, target: HadithTarget) {
        let text = self
            .selected_sections()
            .and_then(|s| s.hadith(target).map(str::to_string));

        match text {
            Some(text) => self.deliver_to_clipboard(&text, strings::NOTICE_COPIED),
            None => self.show_notice(strings::NOTICE_NOTHING_TO_COPY),
        }
    }

    /// No share surface exists in a terminal, so sharing copies a formatted
    /// share text instead.
    pub fn share_selected(&mut self, target: HadithTarget) {
        let text = self
            .selected_sections()
            .and_then(|s| verdict::share_text(&s, target));

        match text {
            Some(text) => self.deliver_to_clipboard(&text, strings::NOTICE_SHARED),
            None => self.show_notice(strings::NOTICE_NOTHING_TO_COPY),
        }
    }

    fn deliver_to_clipboard(&mut self, text: &str, success_notice: &str) {
        match clipboard::copy_to_clipboard(text) {
            Ok(()) => self.show_notice(success_notice),
            Err(e) => {
                warn!(error = %e, "Clipboard copy failed");
                self.show_notice(e.to_string());
            }
        }
    }

    // Chat scrolling
    fn max_scroll(&self) -> u16 {
        self.total_chat_lines.saturating_sub(self.chat_height)
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_scroll());
        self.follow_bottom = self.chat_scroll >= self.max_scroll();
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_bottom = false;
    }

    pub fn scroll_to_top(&mut self) {
        self.chat_scroll = 0;
        self.follow_bottom = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
    }

    /// Called by the renderer once the wrapped line count is known
    pub fn update_chat_metrics(&mut self, height: u16, total_lines: u16) {
        self.chat_height = height;
        self.total_chat_lines = total_lines;
        if self.follow_bottom {
            self.chat_scroll = self.max_scroll();
        } else {
            self.chat_scroll = self.chat_scroll.min(self.max_scroll());
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{add_verdict, test_app};
    use super::*;

    #[test]
    fn test_use_example_fills_input() {
        let mut app = test_app();
        app.use_example(0);
        assert_eq!(app.input, strings::EXAMPLES[0]);
        assert_eq!(app.input_cursor, strings::EXAMPLES[0].chars().count());
        app.use_example(99);
        assert_eq!(app.input, strings::EXAMPLES[0]);
    }

    #[test]
    fn test_verdict_selection_skips_plain_messages() {
        let mut app = test_app();
        add_verdict(&mut app, "[TEXT]: أ [STATUS]: صحيح");
        add_verdict(&mut app, "رد غير منظم");
        add_verdict(&mut app, "[TEXT]: ب [STATUS]: ضعيف");

        // greeting(0) user(1) verdict(2) user(3) plain(4) user(5) verdict(6)
        app.select_next_verdict();
        assert_eq!(app.selected_message, Some(2));
        app.select_next_verdict();
        assert_eq!(app.selected_message, Some(6));
        app.select_next_verdict();
        assert_eq!(app.selected_message, Some(6));
        app.select_prev_verdict();
        assert_eq!(app.selected_message, Some(2));
    }

    #[test]
    fn test_reset_flow_shows_notice() {
        let mut app = test_app();
        add_verdict(&mut app, "[TEXT]: أ [STATUS]: صحيح");

        app.request_reset();
        assert!(app.show_reset_confirm);
        app.answer_reset(false);
        assert_eq!(app.session.messages().len(), 3);
        assert!(app.notice.is_none());

        app.request_reset();
        app.answer_reset(true);
        assert!(app.session.is_fresh());
        assert_eq!(app.notice.as_ref().map(|n| n.text.as_str()), Some(strings::NOTICE_RESET));
    }

    #[test]
    fn test_notice_expires_on_tick() {
        let mut app = test_app();
        app.notice = Some(Notice {
            text: "x".to_string(),
            expires_at: Instant::now(),
        });
        app.tick();
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_scroll_metrics_follow_bottom() {
        let mut app = test_app();
        app.update_chat_metrics(10, 30);
        assert_eq!(app.chat_scroll, 20);

        app.scroll_up(5);
        assert!(!app.follow_bottom);
        app.update_chat_metrics(10, 40);
        assert_eq!(app.chat_scroll, 15);

        app.scroll_down(100);
        assert!(app.follow_bottom);
        assert_eq!(app.chat_scroll, 30);
    }
}
