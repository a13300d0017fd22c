pub mod auth;
pub mod rest;

use crate::error::Error;
use crate::http_client::json_client;
use pinboard::Pinboard;
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde_json::json;
use std::sync::LazyLock;
use tracing::warn;

pub(crate) const APIKEY: HeaderName = HeaderName::from_static("apikey");

static ENV: LazyLock<()> = LazyLock::new(|| {
    let _ = dotenvy::dotenv();
});

fn env_value(variable_name: &str) -> Option<String> {
    LazyLock::force(&ENV);
    std::env::var(variable_name).ok()
}

pub(crate) static SUPABASE_URL: LazyLock<String> = LazyLock::new(|| {
    env_value("SUPABASE_URL")
        .map(|it| it.trim_end_matches('/').to_string())
        .expect("supabase url not set")
});

static ANON_KEY: LazyLock<HeaderValue> = LazyLock::new(|| {
    HeaderValue::try_from(env_value("SUPABASE_ANON_KEY").expect("supabase anon key not set"))
        .expect("invalid supabase anon key")
});

static SERVICE_ROLE_KEY: LazyLock<HeaderValue> = LazyLock::new(|| {
    HeaderValue::try_from(
        env_value("SUPABASE_SERVICE_ROLE_KEY").expect("supabase service role key not set"),
    )
    .expect("invalid supabase service role key")
});

static SERVICE_ROLE_BEARER: LazyLock<HeaderValue> = LazyLock::new(|| {
    HeaderValue::try_from(format!(
        "Bearer {}",
        SERVICE_ROLE_KEY.to_str().expect("invalid service role key")
    ))
    .unwrap()
});

/// Caller session pinned after sign-in, refreshed by the background loop.
pub(crate) struct Session {
    pub(crate) bearer_token: HeaderValue,
    pub(crate) refresh_token: String,
    pub(crate) timestamp: u32,
    pub(crate) expires_in: u32,
}

pub(crate) static SUPABASE_SESSION: LazyLock<Pinboard<Session>> =
    LazyLock::new(Pinboard::new_empty);

#[derive(Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u32,
    pub user: AuthUser,
}

#[derive(Deserialize)]
pub struct AuthUser {
    pub id: String,
}

/// Adds the service-role authority to a request. Bypasses row-level
/// security; only the provisioning workflow uses it.
pub(crate) fn with_service_role(request: RequestBuilder) -> RequestBuilder {
    request
        .header(APIKEY, SERVICE_ROLE_KEY.clone())
        .header(AUTHORIZATION, SERVICE_ROLE_BEARER.clone())
}

/// Adds the signed-in caller's authority to a request, so that the backend's
/// row-level security applies. Fails when no session is pinned.
pub(crate) fn with_caller_session(request: RequestBuilder) -> Result<RequestBuilder, Error> {
    let bearer_token = SUPABASE_SESSION
        .get_ref()
        .map(|it| it.bearer_token.clone())
        .ok_or(Error::NotAuthenticated)?;
    Ok(request
        .header(APIKEY, ANON_KEY.clone())
        .header(AUTHORIZATION, bearer_token))
}

fn pin_session(token: &Token, timestamp: u32) -> Result<(), Error> {
    let bearer_token = HeaderValue::try_from(format!("Bearer {}", token.access_token))
        .map_err(|_| Error::Backend("invalid access token".to_string()))?;
    SUPABASE_SESSION.set(Session {
        bearer_token,
        refresh_token: token.refresh_token.clone(),
        timestamp,
        expires_in: token.expires_in,
    });
    Ok(())
}

/// Password-grant sign-in. Pins the returned session.
pub(crate) async fn sign_in(email: &str, password: &str, timestamp: u32) -> Result<Token, Error> {
    let response = json_client()
        .post(format!("{}/auth/v1/token?grant_type=password", *SUPABASE_URL))
        .header(APIKEY, ANON_KEY.clone())
        .json(&json!({
            "email": email,
            "password": password,
        }))
        .send()
        .await?;
    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        warn!("sign in failed ({status}):\n{text}");
        return Err(Error::NotAuthenticated);
    }
    let token = response.json::<Token>().await?;
    pin_session(&token, timestamp)?;
    Ok(token)
}

/// Exchanges the pinned refresh token for a new session. Returns `None` on
/// failure so the refresh loop can retry on its shorter interval.
pub(crate) async fn refresh_session(timestamp: u32) -> Option<Token> {
    let refresh_token = SUPABASE_SESSION
        .get_ref()
        .map(|it| it.refresh_token.clone())?;
    match json_client()
        .post(format!(
            "{}/auth/v1/token?grant_type=refresh_token",
            *SUPABASE_URL
        ))
        .header(APIKEY, ANON_KEY.clone())
        .json(&json!({
            "refresh_token": refresh_token,
        }))
        .send()
        .await
    {
        Ok(response) => match response.json::<Token>().await {
            Ok(token) => {
                pin_session(&token, timestamp).ok()?;
                Some(token)
            }
            Err(err) => {
                warn!("failed to parse token refresh response:\n{err:?}");
                None
            }
        },
        Err(err) => {
            warn!("failed to get token refresh response:\n{err:?}");
            None
        }
    }
}

pub(crate) fn clear_session() {
    SUPABASE_SESSION.clear();
}
