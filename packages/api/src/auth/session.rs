//! Session helpers shared by every authenticated server function.

use tower_sessions::Session;
use uuid::Uuid;

use crate::error::ApiError;

/// Key for storing user ID in session.
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// The logged-in user's id, or [`ApiError::NotAuthenticated`].
pub async fn current_user_id(session: &Session) -> Result<Uuid, ApiError> {
    let user_id: Option<String> = session.get(SESSION_USER_ID_KEY).await?;
    let Some(user_id) = user_id else {
        return Err(ApiError::NotAuthenticated);
    };
    Uuid::parse_str(&user_id).map_err(|_| ApiError::NotAuthenticated)
}

/// Normalise and check sign-up fields. Returns the lowercased email and trimmed name.
pub fn validate_registration(
    email: &str,
    password: &str,
    name: &str,
) -> Result<(String, String), ApiError> {
    let email = email.trim().to_lowercase();
    let name = name.trim().to_string();

    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::Validation("Invalid email address".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if name.is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }
    Ok((email, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_registration() {
        let (email, name) =
            validate_registration("  Ann@Example.COM ", "longenough", " Ann ").unwrap();
        assert_eq!(email, "ann@example.com");
        assert_eq!(name, "Ann");

        assert!(validate_registration("no-at-sign", "longenough", "Ann").is_err());
        assert!(validate_registration("a@b.c", "short", "Ann").is_err());
        assert!(validate_registration("a@b.c", "longenough", "   ").is_err());
    }
}
