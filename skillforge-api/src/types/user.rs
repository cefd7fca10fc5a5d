//! User-related API types

use serde::{Deserialize, Serialize};
use skillforge_core::{LevelProgress, UserProfile};

/// Request to register (or re-register) the caller.
///
/// Every field is optional: the verified token supplies the identity and,
/// when present, the email and name claims.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    /// Must match the token subject when given
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Response for the register upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterUserResponse {
    pub message: String,
    pub user: UserProfile,
}

/// Profile with its level progress summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserProfileResponse {
    #[serde(flatten)]
    pub user: UserProfile,
    pub progress: LevelProgress,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(user: UserProfile) -> Self {
        let progress = LevelProgress::of(&user);
        Self { user, progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillforge_core::UserUid;

    #[test]
    fn test_register_request_accepts_empty_body() -> Result<(), serde_json::Error> {
        let request: RegisterUserRequest = serde_json::from_str("{}")?;
        assert_eq!(request, RegisterUserRequest::default());
        Ok(())
    }

    #[test]
    fn test_profile_response_is_flat() -> Result<(), serde_json::Error> {
        let mut user = UserProfile::new(UserUid::new("u1"), "Ada", "ada@example.com");
        user.xp = 1500;
        user.level = 2;

        let value = serde_json::to_value(UserProfileResponse::from(user))?;
        assert_eq!(value["uid"], "u1");
        assert_eq!(value["xp"], 1500);
        assert_eq!(value["progress"]["level"], 2);
        assert_eq!(value["progress"]["nextThreshold"], 2000);
        Ok(())
    }
}
