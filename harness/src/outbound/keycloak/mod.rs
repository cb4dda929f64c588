//! Reqwest-backed Keycloak admin API adapter.
//!
//! This adapter owns transport details only: endpoint layout, request
//! serialisation, timeout and HTTP error mapping, and created-entity id
//! extraction. It implements both the session and directory ports; the
//! domain never sees a URL or a status code other than through port errors.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url, header};

use crate::domain::ports::{
    AdminSession, DirectoryError, GroupId, IdentityDirectory, NewUser, SessionError, TokenGrant,
    UserId,
};

mod dto;

use dto::{GroupRepresentation, TokenResponse, UserRepresentation};

/// Connection and identity settings for the adapter.
pub struct KeycloakGatewayConfig {
    /// Identity provider base URL.
    pub base_url: Url,
    /// Realm authenticated against and populated with entities.
    pub realm: String,
    /// Admin account for the password grant.
    pub admin_username: String,
    /// Admin account password.
    pub admin_password: String,
    /// OAuth client id presented on token requests.
    pub client_id: String,
    /// Optional OAuth client secret for refresh requests.
    pub client_secret: Option<String>,
    /// Per-request timeout applied to the HTTP client.
    pub request_timeout: Duration,
}

/// Errors raised while constructing the adapter.
#[derive(Debug, thiserror::Error)]
pub enum GatewayBuildError {
    /// The reqwest client could not be constructed.
    #[error("failed to construct HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    /// An endpoint URL could not be derived from the base URL.
    #[error("failed to build endpoint URL: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Admin API adapter implementing the session and directory ports.
pub struct KeycloakAdminGateway {
    client: Client,
    token_url: Url,
    groups_url: Url,
    users_url: Url,
    admin_username: String,
    admin_password: String,
    client_id: String,
    client_secret: Option<String>,
}

impl KeycloakAdminGateway {
    /// Build an adapter with its endpoints resolved up front.
    ///
    /// # Errors
    ///
    /// [`GatewayBuildError`] when the HTTP client cannot be constructed or an
    /// endpoint URL cannot be derived from the base URL.
    pub fn new(config: KeycloakGatewayConfig) -> Result<Self, GatewayBuildError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        let token_url = endpoint(
            &config.base_url,
            &format!("realms/{}/protocol/openid-connect/token", config.realm),
        )?;
        let groups_url = endpoint(&config.base_url, &format!("admin/realms/{}/groups", config.realm))?;
        let users_url = endpoint(&config.base_url, &format!("admin/realms/{}/users", config.realm))?;
        Ok(Self {
            client,
            token_url,
            groups_url,
            users_url,
            admin_username: config.admin_username,
            admin_password: config.admin_password,
            client_id: config.client_id,
            client_secret: config.client_secret,
        })
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenGrant, SessionError> {
        let response = self
            .client
            .post(self.token_url.clone())
            .form(form)
            .send()
            .await
            .map_err(map_session_transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_session_transport)?;
        if !status.is_success() {
            return Err(SessionError::rejected(
                status.as_u16(),
                body_preview(body.as_ref()),
            ));
        }
        decode_token_grant(body.as_ref())
    }

    fn child_groups_url(&self, parent: &GroupId) -> Result<Url, DirectoryError> {
        let mut url = self.groups_url.clone();
        url.path_segments_mut()
            .map_err(|()| DirectoryError::transport("admin endpoint cannot be a base URL"))?
            .push(parent.as_str())
            .push("children");
        Ok(url)
    }
}

#[async_trait]
impl AdminSession for KeycloakAdminGateway {
    async fn login(&self) -> Result<TokenGrant, SessionError> {
        let form = [
            ("grant_type", "password"),
            ("client_id", self.client_id.as_str()),
            ("username", self.admin_username.as_str()),
            ("password", self.admin_password.as_str()),
        ];
        self.token_request(&form).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, SessionError> {
        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("refresh_token", refresh_token),
        ];
        if let Some(secret) = self.client_secret.as_deref() {
            form.push(("client_secret", secret));
        }
        self.token_request(&form).await
    }
}

#[async_trait]
impl IdentityDirectory for KeycloakAdminGateway {
    async fn create_group(&self, token: &str, name: &str) -> Result<GroupId, DirectoryError> {
        let response = self
            .client
            .post(self.groups_url.clone())
            .bearer_auth(token)
            .json(&GroupRepresentation { name })
            .send()
            .await
            .map_err(map_directory_transport)?;
        created_id(response).await.map(GroupId::new)
    }

    async fn create_child_group(
        &self,
        token: &str,
        parent: &GroupId,
        name: &str,
    ) -> Result<GroupId, DirectoryError> {
        let url = self.child_groups_url(parent)?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&GroupRepresentation { name })
            .send()
            .await
            .map_err(map_directory_transport)?;
        created_id(response).await.map(GroupId::new)
    }

    async fn create_user(&self, token: &str, user: &NewUser) -> Result<UserId, DirectoryError> {
        let response = self
            .client
            .post(self.users_url.clone())
            .bearer_auth(token)
            .json(&UserRepresentation {
                username: &user.username,
                enabled: user.enabled,
                groups: &user.group_paths,
            })
            .send()
            .await
            .map_err(map_directory_transport)?;
        created_id(response).await.map(UserId::new)
    }
}

fn endpoint(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let raw = format!("{}/{}", base.as_str().trim_end_matches('/'), path);
    Url::parse(&raw)
}

fn decode_token_grant(body: &[u8]) -> Result<TokenGrant, SessionError> {
    let decoded: TokenResponse = serde_json::from_slice(body)
        .map_err(|error| SessionError::decode(format!("invalid token payload: {error}")))?;
    Ok(TokenGrant {
        access_token: decoded.access_token,
        refresh_token: decoded.refresh_token,
        expires_in: Duration::from_secs(decoded.expires_in),
    })
}

async fn created_id(response: Response) -> Result<String, DirectoryError> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .bytes()
            .await
            .map(|body| body_preview(body.as_ref()))
            .unwrap_or_default();
        return Err(DirectoryError::status(status.as_u16(), message));
    }
    location_id(response.headers())
}

fn location_id(headers: &header::HeaderMap) -> Result<String, DirectoryError> {
    let location = headers
        .get(header::LOCATION)
        .ok_or_else(|| DirectoryError::decode("created response carried no Location header"))?
        .to_str()
        .map_err(|error| {
            DirectoryError::decode(format!("Location header is not valid UTF-8: {error}"))
        })?;
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| {
            DirectoryError::decode(format!("Location header carries no identifier: {location}"))
        })
}

fn map_session_transport(error: reqwest::Error) -> SessionError {
    SessionError::transport(transport_detail(&error))
}

fn map_directory_transport(error: reqwest::Error) -> DirectoryError {
    DirectoryError::transport(transport_detail(&error))
}

fn transport_detail(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {error}")
    } else {
        error.to_string()
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

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
