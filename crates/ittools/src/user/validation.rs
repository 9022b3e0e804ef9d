//! Username and email rules.

/// Validate username format: 3-50 ASCII alphanumerics, underscores or hyphens.
pub fn is_valid_username(username: &str) -> bool {
    let len = username.len();
    if !(3..=50).contains(&len) {
        return false;
    }

    username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Basic email validation.
pub fn is_valid_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }
    !parts[0].is_empty() && parts[1].contains('.')
}

/// Reduce arbitrary text (a display name, an email local part) to a valid
/// username, or `None` if too little survives.
pub fn sanitize_username(raw: &str) -> Option<String> {
    let base: String = raw
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .take(50)
        .collect();

    is_valid_username(&base).then_some(base)
}

/// Generate a username from an email address.
pub fn username_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    sanitize_username(local).unwrap_or_else(|| format!("user_{}", nanoid::nanoid!(8)))
}
