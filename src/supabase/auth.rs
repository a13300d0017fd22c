use crate::error::Error;
use crate::http_client::json_client;
use crate::supabase::{clear_session, with_caller_session, with_service_role, AuthUser, SUPABASE_URL};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

#[derive(Deserialize)]
struct AuthFailure {
    error_code: Option<String>,
    msg: Option<String>,
}

/// Maps a failed identity-creation response. GoTrue answers 422 for several
/// rejections (duplicate email, password below the minimum length, ...), so
/// only its `email_exists` code becomes `DuplicateIdentity`; everything else
/// keeps the backend's own message.
fn identity_creation_error(status: StatusCode, text: &str) -> Error {
    if status == StatusCode::UNPROCESSABLE_ENTITY {
        if let Ok(failure) = serde_json::from_str::<AuthFailure>(text) {
            if failure.error_code.as_deref() == Some("email_exists") {
                return Error::DuplicateIdentity;
            }
            if let Some(msg) = failure.msg {
                return Error::Backend(format!("failed to create identity: {msg}"));
            }
        }
    }
    Error::Backend(format!("failed to create identity: {text}"))
}

/// Creates an auth identity with the service-role authority. The identity is
/// pre-marked as confirmed; there is no out-of-band verification step in
/// this flow.
pub(crate) async fn create_identity(email: &str, password: &str) -> Result<String, Error> {
    let client = json_client();
    let response = with_service_role(client.post(format!("{}/auth/v1/admin/users", *SUPABASE_URL)))
        .json(&json!({
            "email": email,
            "password": password,
            "email_confirm": true,
        }))
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        warn!("failed to create identity ({status}):\n{text}");
        return Err(identity_creation_error(status, &text));
    }
    let user = response.json::<AuthUser>().await?;
    Ok(user.id)
}

/// Deletes an auth identity. The backend cascades the delete through the
/// `users` and `participants` rows and everything referencing them.
pub(crate) async fn delete_identity(identity_id: &str) -> Result<(), Error> {
    let client = json_client();
    let response = with_service_role(client.delete(format!(
        "{}/auth/v1/admin/users/{identity_id}",
        *SUPABASE_URL
    )))
    .send()
    .await?;
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(Error::UserNotFound);
    }
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        warn!("failed to delete identity {identity_id} ({status}):\n{text}");
        return Err(Error::Backend(format!("failed to delete identity: {text}")));
    }
    Ok(())
}

/// Identity id of the signed-in caller, resolved from the pinned session.
/// `None` when no session is pinned or the backend rejects the token.
pub(crate) async fn current_caller() -> Result<Option<String>, Error> {
    let client = json_client();
    let request = match with_caller_session(client.get(format!("{}/auth/v1/user", *SUPABASE_URL))) {
        Ok(request) => request,
        Err(Error::NotAuthenticated) => return Ok(None),
        Err(err) => return Err(err),
    };
    let response = request.send().await?;
    if !response.status().is_success() {
        return Ok(None);
    }
    let user = response.json::<AuthUser>().await?;
    Ok(Some(user.id))
}

/// Revokes the pinned session on the backend and drops it locally.
pub(crate) async fn sign_out() -> Result<(), Error> {
    let client = json_client();
    let response = with_caller_session(client.post(format!("{}/auth/v1/logout", *SUPABASE_URL)))?
        .send()
        .await?;
    clear_session();
    if !response.status().is_success() {
        let status = response.status();
        warn!("sign out failed ({status})");
    }
    Ok(())
}
