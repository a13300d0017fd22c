use crate::error::Error;
use crate::participant::{NewParticipantDetail, ParticipantIntake};
use crate::phone::{normalize_phone_to_digits, phone_to_email};
use crate::supabase::auth;
use crate::supabase::rest::{self, Authority};
use crate::user::{Language, NewUserProfile, Role};
use serde::Deserialize;
use tracing::error;

/// Identity and row operations the provisioning workflow needs from the
/// hosted backend. The two underlying stores (auth identities, profile
/// tables) share no transaction boundary, so the workflow compensates
/// manually on partial failure.
#[allow(async_fn_in_trait)]
pub trait AccountBackend {
    async fn current_caller(&self) -> Result<Option<String>, Error>;
    async fn role_of(&self, identity_id: &str) -> Result<Option<Role>, Error>;
    async fn create_identity(&self, email: &str, password: &str) -> Result<String, Error>;
    async fn delete_identity(&self, identity_id: &str) -> Result<(), Error>;
    async fn insert_profile(&self, profile: &NewUserProfile) -> Result<(), Error>;
    async fn delete_profile(&self, identity_id: &str) -> Result<(), Error>;
    async fn insert_detail(&self, detail: &NewParticipantDetail) -> Result<(), Error>;
}

pub struct SupabaseBackend;

#[derive(Deserialize)]
struct RoleRow {
    role: Role,
}

impl AccountBackend for SupabaseBackend {
    async fn current_caller(&self) -> Result<Option<String>, Error> {
        auth::current_caller().await
    }

    async fn role_of(&self, identity_id: &str) -> Result<Option<Role>, Error> {
        let filter = format!("eq.{identity_id}");
        let row = rest::select_maybe_single::<RoleRow>(
            "users",
            &[("select", "role"), ("id", filter.as_str())],
            Authority::ServiceRole,
        )
        .await?;
        Ok(row.map(|it| it.role))
    }

    async fn create_identity(&self, email: &str, password: &str) -> Result<String, Error> {
        auth::create_identity(email, password).await
    }

    async fn delete_identity(&self, identity_id: &str) -> Result<(), Error> {
        auth::delete_identity(identity_id).await
    }

    async fn insert_profile(&self, profile: &NewUserProfile) -> Result<(), Error> {
        rest::insert("users", profile, Authority::ServiceRole).await
    }

    async fn delete_profile(&self, identity_id: &str) -> Result<(), Error> {
        let filter = format!("eq.{identity_id}");
        rest::delete("users", &[("id", filter.as_str())], Authority::ServiceRole).await
    }

    async fn insert_detail(&self, detail: &NewParticipantDetail) -> Result<(), Error> {
        rest::insert("participants", detail, Authority::ServiceRole).await
    }
}

/// The authenticated caller of a mutating operation.
pub struct Caller {
    pub id: String,
    pub role: Role,
}

/// Authorization guard shared by every mutating operation: resolves the
/// caller and its role, and fails closed (`NotAuthenticated` without a
/// session or profile, `NotAuthorized` when the role is not allowed).
pub async fn authorize(
    backend: &impl AccountBackend,
    allowed: &[Role],
) -> Result<Caller, Error> {
    let id = backend
        .current_caller()
        .await?
        .ok_or(Error::NotAuthenticated)?;
    let role = backend
        .role_of(&id)
        .await?
        .ok_or(Error::NotAuthenticated)?;
    if !allowed.contains(&role) {
        return Err(Error::NotAuthorized);
    }
    Ok(Caller { id, role })
}

/// Inputs for account creation. `intake` only matters when `role` is
/// participant.
pub struct CreateAccount {
    pub phone: String,
    pub password: String,
    pub role: Role,
    pub full_name: String,
    pub preferred_language: Language,
    pub intake: ParticipantIntake,
}

/// Forward progress of the creation workflow. Each state knows how to undo
/// everything committed so far, in reverse order. A failed undo is logged
/// and the triggering error still propagates, so the caller may be left
/// with an orphan it cannot distinguish from a clean rollback.
enum Provisioned {
    Identity,
    Profile,
}

impl Provisioned {
    async fn compensate(&self, backend: &impl AccountBackend, identity_id: &str) {
        if let Self::Profile = self {
            if let Err(err) = backend.delete_profile(identity_id).await {
                error!("failed to roll back profile row {identity_id}:\n{err:?}");
            }
        }
        if let Err(err) = backend.delete_identity(identity_id).await {
            error!("failed to roll back identity {identity_id}:\n{err:?}");
        }
    }
}

fn failure_message(err: Error) -> String {
    match err {
        Error::Backend(message) => message,
        other => other.to_string(),
    }
}

/// Creates an identity, its profile row and, for participants, the intake
/// detail row, as one logical transaction. On any failure everything
/// already committed is deleted before the error is surfaced. Returns the
/// new identity's id.
pub async fn create_account(
    backend: &impl AccountBackend,
    request: CreateAccount,
) -> Result<String, Error> {
    let caller = authorize(backend, &[Role::Admin, Role::Volunteer]).await?;
    // volunteers can only create participants
    if caller.role == Role::Volunteer && request.role != Role::Participant {
        return Err(Error::NotAuthorized);
    }
    let phone = normalize_phone_to_digits(&request.phone)?;
    let email = phone_to_email(&request.phone)?;
    let identity_id = backend.create_identity(&email, &request.password).await?;
    let profile = NewUserProfile {
        id: identity_id.clone(),
        role: request.role,
        preferred_language: request.preferred_language,
        phone,
        full_name: request.full_name,
    };
    if let Err(err) = backend.insert_profile(&profile).await {
        Provisioned::Identity.compensate(backend, &identity_id).await;
        return Err(Error::ProfileInsert(failure_message(err)));
    }
    if request.role == Role::Participant {
        let detail = NewParticipantDetail {
            user_id: identity_id.clone(),
            intake: request.intake,
        };
        if let Err(err) = backend.insert_detail(&detail).await {
            Provisioned::Profile.compensate(backend, &identity_id).await;
            return Err(Error::DetailInsert(failure_message(err)));
        }
    }
    Ok(identity_id)
}

/// Deletes an account. The backend cascades the identity delete through the
/// profile, detail and dependent rows, so a single call is enough and no
/// compensation is needed.
pub async fn delete_account(
    backend: &impl AccountBackend,
    target_identity_id: &str,
) -> Result<(), Error> {
    let caller = authorize(backend, &[Role::Admin, Role::Volunteer]).await?;
    if caller.id == target_identity_id {
        return Err(Error::SelfDeletionForbidden);
    }
    if caller.role == Role::Volunteer {
        let target_role = backend
            .role_of(target_identity_id)
            .await?
            .ok_or(Error::UserNotFound)?;
        if target_role != Role::Participant {
            return Err(Error::NotAuthorized);
        }
    }
    backend.delete_identity(target_identity_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct State {
        identities: Vec<(String, String)>,
        profiles: Vec<(String, Role)>,
        details: Vec<String>,
        next_id: u32,
    }

    #[derive(Default)]
    struct FakeBackend {
        state: Mutex<State>,
        caller: Option<(String, Role)>,
        fail_profile_insert: bool,
        fail_detail_insert: bool,
    }

    impl FakeBackend {
        fn signed_in(id: &str, role: Role) -> Self {
            let backend = Self {
                caller: Some((id.to_string(), role)),
                ..Self::default()
            };
            backend
                .state
                .lock()
                .unwrap()
                .profiles
                .push((id.to_string(), role));
            backend
        }
    }

    impl AccountBackend for FakeBackend {
        async fn current_caller(&self) -> Result<Option<String>, Error> {
            Ok(self.caller.as_ref().map(|(id, _)| id.clone()))
        }

        async fn role_of(&self, identity_id: &str) -> Result<Option<Role>, Error> {
            Ok(self
                .state
                .lock()
                .unwrap()
                .profiles
                .iter()
                .find(|(id, _)| id == identity_id)
                .map(|(_, role)| *role))
        }

        async fn create_identity(&self, email: &str, _password: &str) -> Result<String, Error> {
            let mut state = self.state.lock().unwrap();
            if state.identities.iter().any(|(_, it)| it == email) {
                return Err(Error::DuplicateIdentity);
            }
            state.next_id += 1;
            let id = format!("identity-{}", state.next_id);
            state.identities.push((id.clone(), email.to_string()));
            Ok(id)
        }

        async fn delete_identity(&self, identity_id: &str) -> Result<(), Error> {
            let mut state = self.state.lock().unwrap();
            let before = state.identities.len();
            state.identities.retain(|(id, _)| id != identity_id);
            if state.identities.len() == before {
                return Err(Error::UserNotFound);
            }
            // backend cascade
            state.profiles.retain(|(id, _)| id != identity_id);
            state.details.retain(|id| id != identity_id);
            Ok(())
        }

        async fn insert_profile(&self, profile: &NewUserProfile) -> Result<(), Error> {
            if self.fail_profile_insert {
                return Err(Error::Backend("users insert rejected".to_string()));
            }
            self.state
                .lock()
                .unwrap()
                .profiles
                .push((profile.id.clone(), profile.role));
            Ok(())
        }

        async fn delete_profile(&self, identity_id: &str) -> Result<(), Error> {
            self.state
                .lock()
                .unwrap()
                .profiles
                .retain(|(id, _)| id != identity_id);
            Ok(())
        }

        async fn insert_detail(&self, detail: &NewParticipantDetail) -> Result<(), Error> {
            if self.fail_detail_insert {
                return Err(Error::Backend("participants insert rejected".to_string()));
            }
            self.state
                .lock()
                .unwrap()
                .details
                .push(detail.user_id.clone());
            Ok(())
        }
    }

    fn participant_request(phone: &str) -> CreateAccount {
        CreateAccount {
            phone: phone.to_string(),
            password: "changeme123".to_string(),
            role: Role::Participant,
            full_name: "Test Participant".to_string(),
            preferred_language: Language::Id,
            intake: ParticipantIntake {
                emergency_contact_name: Some("Contact".to_string()),
                emergency_contact_phone: Some("0812000000".to_string()),
                ..ParticipantIntake::default()
            },
        }
    }

    #[tokio::test]
    async fn test_admin_creates_participant() {
        let backend = FakeBackend::signed_in("admin-1", Role::Admin);
        let id = create_account(&backend, participant_request("0812345678"))
            .await
            .unwrap();
        let state = backend.state.lock().unwrap();
        assert_eq!(1, state.identities.len());
        assert_eq!(
            "p62812345678@oceanfolx.org",
            state.identities.first().unwrap().1
        );
        assert!(state.profiles.iter().any(|(it, _)| *it == id));
        assert_eq!(vec![id], state.details);
    }

    #[tokio::test]
    async fn test_volunteer_creates_participant() {
        let backend = FakeBackend::signed_in("vol-1", Role::Volunteer);
        assert!(
            create_account(&backend, participant_request("0812345678"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_volunteer_cannot_create_admin() {
        let backend = FakeBackend::signed_in("vol-1", Role::Volunteer);
        let request = CreateAccount {
            role: Role::Admin,
            ..participant_request("0812345678")
        };
        assert!(matches!(
            create_account(&backend, request).await,
            Err(Error::NotAuthorized)
        ));
        let state = backend.state.lock().unwrap();
        assert!(state.identities.is_empty());
        assert!(state.details.is_empty());
    }

    #[tokio::test]
    async fn test_participant_cannot_create_accounts() {
        let backend = FakeBackend::signed_in("part-1", Role::Participant);
        assert!(matches!(
            create_account(&backend, participant_request("0812345678")).await,
            Err(Error::NotAuthorized)
        ));
    }

    #[tokio::test]
    async fn test_unauthenticated_caller_is_rejected() {
        let backend = FakeBackend::default();
        assert!(matches!(
            create_account(&backend, participant_request("0812345678")).await,
            Err(Error::NotAuthenticated)
        ));
        assert!(backend.state.lock().unwrap().identities.is_empty());
    }

    #[tokio::test]
    async fn test_caller_without_profile_row_is_rejected() {
        // authenticated session, but no matching users row: the guard
        // fails closed before any mutation
        let backend = FakeBackend {
            caller: Some(("ghost-1".to_string(), Role::Admin)),
            ..FakeBackend::default()
        };
        assert!(matches!(
            create_account(&backend, participant_request("0812345678")).await,
            Err(Error::NotAuthenticated)
        ));
        let state = backend.state.lock().unwrap();
        assert!(state.identities.is_empty());
        assert!(state.profiles.is_empty());
        assert!(state.details.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_phone_creates_nothing() {
        let backend = FakeBackend::signed_in("admin-1", Role::Admin);
        assert!(matches!(
            create_account(&backend, participant_request("12345")).await,
            Err(Error::InvalidPhoneNumber)
        ));
        assert!(backend.state.lock().unwrap().identities.is_empty());
    }

    #[tokio::test]
    async fn test_profile_insert_failure_rolls_back_identity() {
        let mut backend = FakeBackend::signed_in("admin-1", Role::Admin);
        backend.fail_profile_insert = true;
        assert!(matches!(
            create_account(&backend, participant_request("0812345678")).await,
            Err(Error::ProfileInsert(_))
        ));
        let state = backend.state.lock().unwrap();
        assert!(state.identities.is_empty());
        assert!(state.details.is_empty());
    }

    #[tokio::test]
    async fn test_detail_insert_failure_rolls_back_profile_and_identity() {
        let mut backend = FakeBackend::signed_in("admin-1", Role::Admin);
        backend.fail_detail_insert = true;
        assert!(matches!(
            create_account(&backend, participant_request("0812345678")).await,
            Err(Error::DetailInsert(_))
        ));
        let state = backend.state.lock().unwrap();
        assert!(state.identities.is_empty());
        assert!(
            !state
                .profiles
                .iter()
                .any(|(id, _)| id.starts_with("identity-"))
        );
        assert!(state.details.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_identity_aborts_before_profile() {
        let backend = FakeBackend::signed_in("admin-1", Role::Admin);
        create_account(&backend, participant_request("0812345678"))
            .await
            .unwrap();
        assert!(matches!(
            create_account(&backend, participant_request("+62 812-345-678")).await,
            Err(Error::DuplicateIdentity)
        ));
        let state = backend.state.lock().unwrap();
        assert_eq!(1, state.identities.len());
        assert_eq!(1, state.details.len());
    }

    #[tokio::test]
    async fn test_non_participant_skips_detail_row() {
        let backend = FakeBackend::signed_in("admin-1", Role::Admin);
        let request = CreateAccount {
            role: Role::Volunteer,
            ..participant_request("0812345678")
        };
        create_account(&backend, request).await.unwrap();
        assert!(backend.state.lock().unwrap().details.is_empty());
    }

    #[tokio::test]
    async fn test_self_deletion_is_forbidden() {
        let backend = FakeBackend::signed_in("admin-1", Role::Admin);
        assert!(matches!(
            delete_account(&backend, "admin-1").await,
            Err(Error::SelfDeletionForbidden)
        ));
    }

    #[tokio::test]
    async fn test_volunteer_can_only_delete_participants() {
        let backend = FakeBackend::signed_in("vol-1", Role::Volunteer);
        let target = create_account(&backend, participant_request("0812345678"))
            .await
            .unwrap();
        backend
            .state
            .lock()
            .unwrap()
            .profiles
            .push(("admin-2".to_string(), Role::Admin));
        assert!(matches!(
            delete_account(&backend, "admin-2").await,
            Err(Error::NotAuthorized)
        ));
        assert!(matches!(
            delete_account(&backend, "missing").await,
            Err(Error::UserNotFound)
        ));
        delete_account(&backend, &target).await.unwrap();
        let state = backend.state.lock().unwrap();
        assert!(state.identities.is_empty());
        assert!(state.details.is_empty());
    }
}
