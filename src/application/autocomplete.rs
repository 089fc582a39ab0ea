use unicode_width::UnicodeWidthStr;

use crate::application::catalog::RepositorySearch;
use crate::domain::directory_base_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    Char(char),
    Backspace,
    Tab,
    Enter,
    Cancel,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputStatus {
    Editing,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFrame<'a> {
    pub typed: &'a str,
    pub completion: &'a str,
    /// Terminal columns from the render anchor to the end of the typed text.
    pub cursor_offset: usize,
}

/// Edit buffer plus the suggestion derived from it.
///
/// The suggestion is recomputed from the current buffer after every mutation,
/// so a rendered frame never shows a completion for an older buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocompleteState {
    buffer: String,
    suggestion: Option<String>,
    status: InputStatus,
}

impl Default for AutocompleteState {
    fn default() -> Self {
        Self::new()
    }
}

impl AutocompleteState {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            suggestion: None,
            status: InputStatus::Editing,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    pub fn status(&self) -> InputStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status != InputStatus::Editing
    }

    /// Applies one key event; returns true when the frame needs redrawing.
    pub fn handle_key(&mut self, key: InputKey, search: &dyn RepositorySearch) -> bool {
        if self.is_finished() {
            return false;
        }

        match key {
            InputKey::Char(character) if !character.is_control() => {
                self.buffer.push(character);
                self.refresh_suggestion(search);
                true
            }
            InputKey::Backspace if !self.buffer.is_empty() => {
                let _ = self.buffer.pop();
                self.refresh_suggestion(search);
                true
            }
            InputKey::Tab => {
                let Some(suggestion) = self.suggestion.take() else {
                    return false;
                };
                self.buffer = suggestion;
                self.refresh_suggestion(search);
                true
            }
            InputKey::Enter => {
                self.status = InputStatus::Confirmed;
                self.suggestion = None;
                true
            }
            InputKey::Cancel => {
                self.status = InputStatus::Cancelled;
                self.suggestion = None;
                true
            }
            InputKey::Char(_) | InputKey::Backspace | InputKey::Ignored => false,
        }
    }

    /// The untyped remainder of the suggestion.
    pub fn completion(&self) -> &str {
        let Some(suggestion) = self.suggestion.as_deref() else {
            return "";
        };
        let typed_chars = self.buffer.chars().count();
        match suggestion.char_indices().nth(typed_chars) {
            Some((index, _)) => &suggestion[index..],
            None => "",
        }
    }

    pub fn frame(&self) -> RenderFrame<'_> {
        RenderFrame {
            typed: &self.buffer,
            completion: self.completion(),
            cursor_offset: self.buffer.width(),
        }
    }

    /// Confirmed text verbatim; cancellation and blank input select nothing.
    pub fn outcome(&self) -> Option<String> {
        match self.status {
            InputStatus::Confirmed if !self.buffer.is_empty() => Some(self.buffer.clone()),
            InputStatus::Confirmed | InputStatus::Editing | InputStatus::Cancelled => None,
        }
    }

    fn refresh_suggestion(&mut self, search: &dyn RepositorySearch) {
        self.suggestion = suggestion_for(&self.buffer, search);
    }
}

pub fn suggestion_for(buffer: &str, search: &dyn RepositorySearch) -> Option<String> {
    if buffer.is_empty() {
        return None;
    }

    let first = search.search(buffer).into_iter().next()?;
    let name = directory_base_name(&first);
    starts_with_ignore_case(&name, buffer).then_some(name)
}

pub fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    let mut text_chars = text.chars();
    prefix.chars().all(|expected| {
        text_chars
            .next()
            .is_some_and(|actual| actual.to_lowercase().eq(expected.to_lowercase()))
    })
}
