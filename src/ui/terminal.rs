use std::io::{BufRead, Write};

use crossterm::cursor::{self, MoveToColumn};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};

use crate::application::autocomplete::{AutocompleteState, InputKey, RenderFrame};
use crate::application::catalog::RepositorySearch;
use crate::ui::console::Console;

const SUGGESTION_COLOR: Color = Color::DarkGrey;

pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn write_line(&mut self, line: &str) {
        println!("{line}");
    }

    fn write_prompt(&mut self, prompt: &str) {
        print!("{prompt}");
        let _ = std::io::stdout().flush();
    }

    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn read_with_autocomplete(
        &mut self,
        search: &dyn RepositorySearch,
    ) -> std::io::Result<Option<String>> {
        let mut stdout = std::io::stdout();
        stdout.flush()?;

        let raw_mode = RawModeGuard::enable()?;
        let (origin, _) = cursor::position()?;
        let mut state = AutocompleteState::new();

        while !state.is_finished() {
            let Event::Key(key_event) = event::read()? else {
                continue;
            };
            if key_event.kind == KeyEventKind::Release {
                continue;
            }

            if state.handle_key(input_key(key_event), search) {
                render_frame(&mut stdout, origin, &state.frame())?;
                stdout.flush()?;
            }
        }

        drop(raw_mode);
        println!();
        Ok(state.outcome())
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

pub fn input_key(key_event: KeyEvent) -> InputKey {
    let control = key_event.modifiers.contains(KeyModifiers::CONTROL);
    match key_event.code {
        KeyCode::Char('c') | KeyCode::Char('d') if control => InputKey::Cancel,
        KeyCode::Char(_) if control => InputKey::Ignored,
        KeyCode::Char(character) => InputKey::Char(character),
        KeyCode::Backspace => InputKey::Backspace,
        KeyCode::Tab => InputKey::Tab,
        KeyCode::Enter => InputKey::Enter,
        KeyCode::Esc => InputKey::Cancel,
        _ => InputKey::Ignored,
    }
}

/// Redraws typed text plus the muted completion, leaving the cursor after the typed text.
pub fn render_frame(
    output: &mut impl Write,
    origin: u16,
    frame: &RenderFrame<'_>,
) -> std::io::Result<()> {
    let offset = u16::try_from(frame.cursor_offset).unwrap_or(u16::MAX);
    queue!(
        output,
        MoveToColumn(origin),
        Clear(ClearType::UntilNewLine),
        Print(frame.typed),
    )?;
    if !frame.completion.is_empty() {
        queue!(
            output,
            SetForegroundColor(SUGGESTION_COLOR),
            Print(frame.completion),
            ResetColor,
        )?;
    }
    queue!(output, MoveToColumn(origin.saturating_add(offset)))
}

#[cfg(test)]
mod tests {
    use super::{input_key, render_frame};
    use crate::application::autocomplete::{InputKey, RenderFrame};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn key_events_map_to_input_keys() {
        let plain = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(input_key(plain(KeyCode::Char('a'))), InputKey::Char('a'));
        assert_eq!(
            input_key(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            InputKey::Char('A')
        );
        assert_eq!(input_key(plain(KeyCode::Backspace)), InputKey::Backspace);
        assert_eq!(input_key(plain(KeyCode::Tab)), InputKey::Tab);
        assert_eq!(input_key(plain(KeyCode::Enter)), InputKey::Enter);
        assert_eq!(input_key(plain(KeyCode::Esc)), InputKey::Cancel);
        assert_eq!(input_key(plain(KeyCode::Left)), InputKey::Ignored);
        assert_eq!(
            input_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            InputKey::Cancel
        );
        assert_eq!(
            input_key(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL)),
            InputKey::Ignored
        );
    }

    #[test]
    fn render_frame_writes_typed_text_then_completion() {
        let mut output = Vec::new();
        let frame = RenderFrame {
            typed: "gra",
            completion: "vel",
            cursor_offset: 3,
        };
        render_frame(&mut output, 2, &frame).expect("render should succeed");

        let text = String::from_utf8(output).expect("output should be utf8");
        let typed_at = text.find("gra").expect("typed text should render");
        let completion_at = text.find("vel").expect("completion should render");
        assert!(typed_at < completion_at);
        // MoveToColumn is 0-based in the API and 1-based on the wire.
        assert!(text.ends_with("\u{1b}[6G"));
    }

    #[test]
    fn render_frame_skips_color_without_completion() {
        let mut output = Vec::new();
        let frame = RenderFrame {
            typed: "zzz",
            completion: "",
            cursor_offset: 3,
        };
        render_frame(&mut output, 0, &frame).expect("render should succeed");

        let text = String::from_utf8(output).expect("output should be utf8");
        assert!(text.contains("zzz"));
        assert!(!text.contains("\u{1b}[38;5;"));
        assert!(text.ends_with("\u{1b}[4G"));
    }
}
