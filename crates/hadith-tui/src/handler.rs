use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use hadith_core::HadithTarget;
use ratatui::layout::Rect;

use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Lines moved per mouse wheel notch
const WHEEL_LINES: u16 = 3;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick(),
    }

    app.poll_verification().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_reset_confirm {
        handle_reset_confirm(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_reset_confirm(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.answer_reset(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.answer_reset(false),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,

        // Chat scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_down(app.chat_height / 2)
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_up(app.chat_height / 2)
        }
        KeyCode::PageDown => app.scroll_down(app.chat_height),
        KeyCode::PageUp => app.scroll_up(app.chat_height),
        KeyCode::Char('g') => app.scroll_to_top(),
        KeyCode::Char('G') => app.scroll_to_bottom(),

        // Verdict actions
        KeyCode::Char('n') => app.select_next_verdict(),
        KeyCode::Char('p') => app.select_prev_verdict(),
        KeyCode::Char('c') => app.copy_selected(HadithTarget::Text),
        KeyCode::Char('C') => app.copy_selected(HadithTarget::Alternative),
        KeyCode::Char('s') => app.share_selected(HadithTarget::Text),
        KeyCode::Char('S') => app.share_selected(HadithTarget::Alternative),

        KeyCode::Char('R') => app.request_reset(),

        // Example prompts are only offered on a fresh conversation
        KeyCode::Char(c @ '1'..='4') if app.session.is_fresh() => {
            app.use_example(c as usize - '1' as usize);
        }

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            if !app.is_busy() {
                app.submit();
            }
        }
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
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
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(WHEEL_LINES),
        MouseEventKind::ScrollUp => app.scroll_up(WHEEL_LINES),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{add_verdict, test_app};
    use hadith_core::strings;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_editing_inserts_at_cursor() {
        let mut app = test_app();
        type_text(&mut app, "حدث");
        press(&mut app, KeyCode::Left);
        type_text(&mut app, "ي");
        assert_eq!(app.input, "حديث");

        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.input, "ديث");
        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.input, "دي");
        assert_eq!(app.input_cursor, 2);
    }

    #[test]
    fn test_enter_while_busy_does_not_submit() {
        let mut app = test_app();
        app.session.begin_submission("سؤال سابق").unwrap();
        let before = app.session.messages().len();

        type_text(&mut app, "نص");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.input, "نص");
        assert_eq!(app.session.messages().len(), before);
    }

    #[test]
    fn test_reset_goes_through_confirmation() {
        let mut app = test_app();
        add_verdict(&mut app, "[TEXT]: نص [STATUS]: صحيح");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);

        press(&mut app, KeyCode::Char('R'));
        assert!(app.show_reset_confirm);
        // Other keys are swallowed while the popup is up
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Char('n'));
        assert!(!app.show_reset_confirm);
        assert_eq!(app.session.messages().len(), 3);

        press(&mut app, KeyCode::Char('R'));
        press(&mut app, KeyCode::Char('y'));
        assert!(!app.show_reset_confirm);
        assert!(app.session.is_fresh());
    }

    #[test]
    fn test_reset_key_ignored_while_busy() {
        let mut app = test_app();
        app.session.begin_submission("سؤال").unwrap();
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('R'));
        assert!(!app.show_reset_confirm);
    }

    #[test]
    fn test_example_keys_only_on_fresh_log() {
        let mut app = test_app();
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.input, strings::EXAMPLES[1]);
        assert_eq!(app.input_mode, InputMode::Editing);

        let mut app = test_app();
        add_verdict(&mut app, "[TEXT]: نص [STATUS]: صحيح");
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('2'));
        assert!(app.input.is_empty());
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_ctrl_c_quits_from_any_mode() {
        let mut app = test_app();
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_char_to_byte_index_arabic() {
        let s = "حديث";
        assert_eq!(char_to_byte_index(s, 0), 0);
        assert_eq!(char_to_byte_index(s, 1), 2);
        assert_eq!(char_to_byte_index(s, 4), s.len());
        assert_eq!(char_to_byte_index(s, 10), s.len());
    }

    #[test]
    fn test_point_in_rect() {
        let rect = Rect::new(2, 3, 10, 5);
        assert!(point_in_rect(2, 3, rect));
        assert!(point_in_rect(11, 7, rect));
        assert!(!point_in_rect(12, 7, rect));
        assert!(!point_in_rect(1, 4, rect));
    }
}
