//! Reqwest-backed adapter for a GoTrue-compatible identity service.
//!
//! The adapter owns transport details only: endpoint construction, the
//! `apikey` header, status mapping and JSON decoding. Session state lives
//! with the caller; the adapter is stateless apart from its event channel.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::debug;

use super::remote_dto::{
    ErrorBodyDto, PasswordGrantDto, RecoverDto, SignupDto, TokenResponseDto, UserDto,
    UserMetadataDto,
};
use crate::domain::ports::{
    IdentityProvider, IdentityProviderError, SESSION_EVENT_CAPACITY, SessionChange,
};
use crate::domain::{
    AccessToken, LoginCredentials, PasswordResetRequest, ProviderSession, SignupForm,
};

const API_KEY_HEADER: &str = "apikey";
const AUTH_ROOT: &str = "/auth/v1";
/// Description GoTrue sends with a 400 for a wrong email/password pair.
const INVALID_LOGIN_TEXT: &str = "invalid login credentials";
const PREVIEW_CHAR_LIMIT: usize = 160;

/// Which call a response belongs to; status mapping differs slightly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    SignIn,
    Other,
}

/// Identity provider speaking the GoTrue REST dialect.
pub struct RemoteIdentityProvider {
    client: Client,
    base_url: Url,
    api_key: String,
    events: broadcast::Sender<SessionChange>,
}

impl RemoteIdentityProvider {
    /// Build an adapter for the service at `base_url`, either the project
    /// origin (`https://x.supabase.co`) or its GoTrue root
    /// (`https://x.supabase.co/auth/v1`).
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        Ok(Self {
            client,
            base_url: auth_root(base_url),
            api_key: api_key.into(),
            events,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, IdentityProviderError> {
        self.base_url.join(path).map_err(|err| {
            IdentityProviderError::unavailable(format!("invalid endpoint {path}: {err}"))
        })
    }

    fn post(&self, url: Url) -> RequestBuilder {
        self.client
            .post(url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
    }

    fn publish(&self, change: SessionChange) {
        if self.events.send(change).is_err() {
            debug!("no session listeners attached");
        }
    }

    async fn send(
        &self,
        request: RequestBuilder,
        operation: Operation,
    ) -> Result<Vec<u8>, IdentityProviderError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref(), operation));
        }
        Ok(body.to_vec())
    }
}

fn auth_root(mut url: Url) -> Url {
    let trimmed = url.path().trim_end_matches('/');
    let path = if trimmed.ends_with(AUTH_ROOT) {
        format!("{trimmed}/")
    } else {
        format!("{trimmed}{AUTH_ROOT}/")
    };
    url.set_path(&path);
    url
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, IdentityProviderError> {
    serde_json::from_slice(body).map_err(|err| {
        IdentityProviderError::decode(format!("invalid identity provider JSON: {err}"))
    })
}

#[async_trait]
impl IdentityProvider for RemoteIdentityProvider {
    async fn sign_in_with_password(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<ProviderSession, IdentityProviderError> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let request = self.post(url).json(&PasswordGrantDto {
            email: credentials.email(),
            password: credentials.password(),
        });
        let body = self.send(request, Operation::SignIn).await?;
        let session = decode::<TokenResponseDto>(&body)?
            .into_session()
            .map_err(IdentityProviderError::decode)?;
        self.publish(SessionChange::signed_in(session.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        form: &SignupForm,
        redirect_url: &str,
    ) -> Result<(), IdentityProviderError> {
        let mut url = self.endpoint("signup")?;
        url.query_pairs_mut().append_pair("redirect_to", redirect_url);
        let request = self.post(url).json(&SignupDto {
            email: form.email(),
            password: form.password(),
            data: UserMetadataDto {
                name: Some(form.display_name().to_owned()),
            },
        });
        self.send(request, Operation::Other).await.map(drop)
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), IdentityProviderError> {
        let url = self.endpoint("logout")?;
        let request = self.post(url).bearer_auth(token.expose());
        self.send(request, Operation::Other).await?;
        self.publish(SessionChange::signed_out());
        Ok(())
    }

    async fn reset_password_for_email(
        &self,
        request: &PasswordResetRequest,
        redirect_url: &str,
    ) -> Result<(), IdentityProviderError> {
        let mut url = self.endpoint("recover")?;
        url.query_pairs_mut().append_pair("redirect_to", redirect_url);
        let http = self.post(url).json(&RecoverDto {
            email: request.email(),
        });
        self.send(http, Operation::Other).await.map(drop)
    }

    async fn current_session(
        &self,
        token: Option<AccessToken>,
    ) -> Result<Option<ProviderSession>, IdentityProviderError> {
        // The service keeps no session for us; without a token nobody is signed in.
        let Some(token) = token else {
            return Ok(None);
        };
        let url = self.endpoint("user")?;
        let request = self
            .client
            .get(url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .bearer_auth(token.expose());
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            self.publish(SessionChange::expired());
            return Ok(None);
        }
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref(), Operation::Other));
        }
        let identity = decode::<UserDto>(&body)?
            .into_identity()
            .map_err(IdentityProviderError::decode)?;
        Ok(Some(ProviderSession {
            access_token: token,
            identity,
        }))
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.events.subscribe()
    }
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    if error.is_timeout() {
        IdentityProviderError::timeout(error.to_string())
    } else {
        IdentityProviderError::unavailable(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8], operation: Operation) -> IdentityProviderError {
    let provider_text = serde_json::from_slice::<ErrorBodyDto>(body)
        .ok()
        .and_then(ErrorBodyDto::into_message);

    if operation == Operation::SignIn
        && matches!(status, StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED)
    {
        return match provider_text {
            Some(text) if !is_invalid_login(&text) => IdentityProviderError::rejected(text),
            _ => IdentityProviderError::invalid_credentials(),
        };
    }

    let message = provider_text.unwrap_or_else(|| {
        let preview = body_preview(body);
        if preview.is_empty() {
            format!("status {}", status.as_u16())
        } else {
            format!("status {}: {preview}", status.as_u16())
        }
    });

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            IdentityProviderError::timeout(message)
        }
        StatusCode::TOO_MANY_REQUESTS => IdentityProviderError::unavailable(message),
        _ if status.is_client_error() => IdentityProviderError::rejected(message),
        _ => IdentityProviderError::unavailable(message),
    }
}

/// Bare `invalid_grant` or GoTrue's wrong-password text. Anything else the
/// provider says on a failed grant (unconfirmed email, banned user) is shown.
fn is_invalid_login(text: &str) -> bool {
    let text = text.trim().to_ascii_lowercase();
    text == "invalid_grant" || text.contains(INVALID_LOGIN_TEXT)
}

fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
