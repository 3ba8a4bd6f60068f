//! Wire types for the GoTrue-compatible REST API.

use serde::{Deserialize, Serialize};

use crate::domain::{AccessToken, ProviderSession, SessionIdentity, UserId};

#[derive(Debug, Serialize)]
pub(super) struct PasswordGrantDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct SignupDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
    pub(super) data: UserMetadataDto,
}

#[derive(Debug, Serialize)]
pub(super) struct RecoverDto<'a> {
    pub(super) email: &'a str,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct UserMetadataDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserDto {
    pub(super) id: String,
    #[serde(default)]
    pub(super) email: Option<String>,
    #[serde(default)]
    pub(super) user_metadata: UserMetadataDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponseDto {
    pub(super) access_token: String,
    pub(super) user: UserDto,
}

/// Error bodies differ between endpoints and server versions.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    pub(super) error: Option<String>,
    #[serde(default)]
    pub(super) error_description: Option<String>,
    #[serde(default)]
    pub(super) msg: Option<String>,
    #[serde(default)]
    pub(super) message: Option<String>,
}

impl ErrorBodyDto {
    pub(super) fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
            .filter(|message| !message.trim().is_empty())
    }
}

impl UserDto {
    pub(super) fn into_identity(self) -> Result<SessionIdentity, String> {
        let user_id = UserId::new(self.id).map_err(|err| err.to_string())?;
        Ok(SessionIdentity {
            user_id,
            email: self.email.unwrap_or_default(),
            display_name: self
                .user_metadata
                .name
                .filter(|name| !name.trim().is_empty()),
        })
    }
}

impl TokenResponseDto {
    pub(super) fn into_session(self) -> Result<ProviderSession, String> {
        if self.access_token.trim().is_empty() {
            return Err("empty access_token".to_owned());
        }
        Ok(ProviderSession {
            access_token: AccessToken::new(self.access_token),
            identity: self.user.into_identity()?,
        })
    }
}
