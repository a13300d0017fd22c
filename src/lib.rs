pub mod auth;
pub mod error;
pub mod gear;
mod http_client;
pub mod participant;
pub mod phone;
pub mod progress;
pub mod provisioning;
pub mod schedule;
pub mod session;
pub mod supabase;
pub mod update;
pub mod user;

#[cfg(test)]
mod tests {
    use crate::auth::sign_in_with_phone;
    use crate::participant::ParticipantIntake;
    use crate::provisioning::{create_account, CreateAccount, SupabaseBackend};
    use crate::session::upcoming_sessions;
    use crate::user::{Language, Role};
    use chrono::Utc;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .compact()
            .with_ansi(true)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .without_time()
            .with_env_filter(tracing_subscriber::EnvFilter::new("oceanfolx_server=debug"))
            .try_init();
    }

    #[tokio::test]
    #[ignore]
    async fn test_sign_in_and_list_sessions() {
        init_tracing();
        let phone = std::env::var("TEST_PHONE").expect("test phone not set");
        let password = std::env::var("TEST_PASSWORD").expect("test password not set");
        let profile = sign_in_with_phone(&phone, &password)
            .await
            .expect("failed to sign in");
        println!("signed in as {:?} {:?}", profile.full_name, profile.role);
        let sessions = upcoming_sessions(Utc::now().date_naive())
            .await
            .expect("failed to list sessions");
        println!("upcoming sessions: {}", sessions.len());
    }

    #[tokio::test]
    #[ignore]
    async fn test_create_participant_account() {
        init_tracing();
        let phone = std::env::var("TEST_PHONE").expect("test phone not set");
        let password = std::env::var("TEST_PASSWORD").expect("test password not set");
        sign_in_with_phone(&phone, &password)
            .await
            .expect("failed to sign in");
        let id = create_account(
            &SupabaseBackend,
            CreateAccount {
                phone: "0812999000111".to_string(),
                password: "changeme123".to_string(),
                role: Role::Participant,
                full_name: "Smoke Test".to_string(),
                preferred_language: Language::Id,
                intake: ParticipantIntake::default(),
            },
        )
        .await
        .expect("failed to create account");
        println!("created {id}");
    }
}
