use crate::error::Error;
use crate::phone::phone_to_email;
use crate::supabase;
use crate::supabase::rest::{self, Authority};
use crate::user::UserProfile;
use std::time::SystemTime;

/// Signs the caller in with a phone number and password. The phone is
/// mapped to its synthetic auth email; on success the session is pinned for
/// the other operations and the caller's profile row is returned so the
/// console can redirect by role.
pub async fn sign_in_with_phone(phone: &str, password: &str) -> Result<UserProfile, Error> {
    let email = phone_to_email(phone)?;
    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as u32;
    let token = supabase::sign_in(&email, password, timestamp).await?;
    profile_of(&token.user.id)
        .await?
        .ok_or(Error::UserNotFound)
}

/// Profile of the signed-in caller, if any.
pub async fn current_profile() -> Result<Option<UserProfile>, Error> {
    let Some(id) = supabase::auth::current_caller().await? else {
        return Ok(None);
    };
    profile_of(&id).await
}

async fn profile_of(identity_id: &str) -> Result<Option<UserProfile>, Error> {
    let filter = format!("eq.{identity_id}");
    rest::select_maybe_single(
        "users",
        &[("select", "*"), ("id", filter.as_str())],
        Authority::CallerSession,
    )
    .await
}

pub async fn sign_out() -> Result<(), Error> {
    supabase::auth::sign_out().await
}
