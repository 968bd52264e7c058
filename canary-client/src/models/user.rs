use crate::models::news::Preferences;
use serde::{Deserialize, Serialize};

/// The user object returned alongside a token by login and registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "userId", alias = "id")]
    pub user_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl User {
    /// Username when set, otherwise the local part of the email.
    pub fn display_name(&self) -> String {
        match self.username.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => self
                .email
                .split('@')
                .next()
                .filter(|local| !local.is_empty())
                .unwrap_or("User")
                .to_string(),
        }
    }

    pub fn initials(&self) -> String {
        let name = self.display_name();
        let initials: String = name.chars().take(2).collect();
        if initials.is_empty() {
            "U".to_string()
        } else {
            initials.to_uppercase()
        }
    }
}

/// `GET /auth/profile` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(alias = "id")]
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub preferences: Option<Preferences>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl UserProfile {
    pub fn to_user(&self) -> User {
        User {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
        }
    }
}

/// Login and registration response. Token and user are both optional on the
/// wire; only a response carrying both can start a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub username: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_accepts_id_alias() {
        let user: User = serde_json::from_str(r#"{"id":"u1","email":"a@b.com"}"#).unwrap();
        assert_eq!(user.user_id, "u1");
        assert_eq!(user.username, None);

        let user: User =
            serde_json::from_str(r#"{"userId":"u2","email":"c@d.com","username":"cee"}"#).unwrap();
        assert_eq!(user.user_id, "u2");
        assert_eq!(user.username.as_deref(), Some("cee"));
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user = User {
            user_id: "u1".to_string(),
            email: "jane.doe@example.com".to_string(),
            username: None,
        };
        assert_eq!(user.display_name(), "jane.doe");
        assert_eq!(user.initials(), "JA");

        let named = User {
            username: Some("Jane".to_string()),
            ..user
        };
        assert_eq!(named.display_name(), "Jane");
    }

    #[test]
    fn test_profile_parses_backend_shape() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "userId": "u1",
            "email": "a@b.com",
            "username": "a",
            "preferences": {"interests": ["AI"], "monitoring_topics": ["Tesla"]},
            "createdAt": "2025-06-01T10:00:00.000000Z"
        }))
        .unwrap();

        assert_eq!(profile.to_user().user_id, "u1");
        let preferences = profile.preferences.unwrap();
        assert_eq!(preferences.monitoring_topics, vec!["Tesla".to_string()]);
    }
}
