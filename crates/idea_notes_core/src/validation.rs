//! Client-side checks that mirror the backend's request schemas, so obviously
//! bad input never costs a round trip.

use crate::domain::{NoteChanges, NoteDraft};

pub const MAX_PROMPT_CHARS: usize = 2000;
pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_NOTES_PER_GENERATION: usize = 10;
pub const MIN_USERNAME_CHARS: usize = 3;
pub const MAX_USERNAME_CHARS: usize = 32;
pub const MIN_PASSWORD_CHARS: usize = 8;

pub fn validate_prompt(prompt: &str) -> Result<(), String> {
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(format!(
            "Prompt must be at most {MAX_PROMPT_CHARS} characters"
        ));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("Please enter a title".to_string());
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(format!("Title must be at most {MAX_TITLE_CHARS} characters"));
    }
    Ok(())
}

pub fn validate_selection_size(count: usize) -> Result<(), String> {
    if count == 0 {
        return Err("Please select at least one note".to_string());
    }
    if count > MAX_NOTES_PER_GENERATION {
        return Err(format!(
            "Please select at most {MAX_NOTES_PER_GENERATION} notes"
        ));
    }
    Ok(())
}

/// Usernames are 3-32 characters of ASCII letters, digits and underscores.
pub fn validate_username(username: &str) -> Result<(), String> {
    let len = username.chars().count();
    if !(MIN_USERNAME_CHARS..=MAX_USERNAME_CHARS).contains(&len) {
        return Err(format!(
            "Username must be between {MIN_USERNAME_CHARS} and {MAX_USERNAME_CHARS} characters"
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err("Username may only contain letters, digits and underscores".to_string());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_CHARS} characters"
        ));
    }
    Ok(())
}

pub fn validate_note_draft(draft: &NoteDraft) -> Result<(), String> {
    validate_title(&draft.title)?;
    if draft.content.trim().is_empty() {
        return Err("Please enter some content".to_string());
    }
    Ok(())
}

pub fn validate_note_changes(changes: &NoteChanges) -> Result<(), String> {
    if changes.is_empty() {
        return Err("Nothing to update".to_string());
    }
    if let Some(title) = &changes.title {
        validate_title(title)?;
    }
    if let Some(content) = &changes.content {
        if content.trim().is_empty() {
            return Err("Please enter some content".to_string());
        }
    }
    Ok(())
}
