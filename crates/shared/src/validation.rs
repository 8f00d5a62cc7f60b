use crate::constants::*;

pub fn validate_message_text(text: &str) -> Result<(), String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("Message text is required".into());
    }
    if trimmed.len() > MAX_MESSAGE_LENGTH {
        return Err(format!(
            "Message must be at most {} characters",
            MAX_MESSAGE_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err("Email is required".into());
    }
    // Shape check only; the backend is the authority on the address itself
    let mut parts = trimmed.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err("Email address is invalid".into());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_full_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.len() < MIN_FULL_NAME_LENGTH {
        return Err(format!(
            "Name must be at least {} characters",
            MIN_FULL_NAME_LENGTH
        ));
    }
    if trimmed.len() > MAX_FULL_NAME_LENGTH {
        return Err(format!(
            "Name must be at most {} characters",
            MAX_FULL_NAME_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_session_title(title: &str) -> Result<(), String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err("Session title is required".into());
    }
    if trimmed.len() > MAX_TITLE_LENGTH {
        return Err(format!(
            "Session title must be at most {} characters",
            MAX_TITLE_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_goal_title(title: &str) -> Result<(), String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err("Goal title is required".into());
    }
    if trimmed.len() > MAX_TITLE_LENGTH {
        return Err(format!(
            "Goal title must be at most {} characters",
            MAX_TITLE_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_progress_percentage(value: i64) -> Result<(), String> {
    if !(0..=100).contains(&value) {
        return Err("Progress must be between 0 and 100".into());
    }
    Ok(())
}
