use crate::error::Error;
use crate::supabase::rest::{self, Authority};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Copy, Clone)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    SignedUp,
    Present,
    Absent,
    SelfReported,
}

/// Row in the `sessions` table: one lesson occurrence.
#[derive(Debug, Deserialize, Clone)]
pub struct Session {
    pub id: String,
    pub date: NaiveDate,
    pub time: String,
    #[serde(rename = "type")]
    pub session_type: String,
    pub created_at: Option<String>,
}

/// Insert payload for the `sessions` table.
#[derive(Debug, Serialize)]
pub struct NewSession {
    pub date: NaiveDate,
    pub time: String,
    #[serde(rename = "type")]
    pub session_type: String,
}

/// Row in the `session_participants` table: a sign-up or attendance mark.
#[derive(Debug, Deserialize, Clone)]
pub struct SessionParticipant {
    pub id: String,
    pub session_id: String,
    pub participant_id: String,
    pub status: AttendanceStatus,
    pub signed_up_at: Option<String>,
    pub marked_at: Option<String>,
    pub validated_by_volunteer_id: Option<String>,
    pub notes: Option<String>,
}

/// All sessions, newest first.
pub async fn list_sessions() -> Result<Vec<Session>, Error> {
    rest::select(
        "sessions",
        &[("select", "*"), ("order", "date.desc,time.desc")],
        Authority::CallerSession,
    )
    .await
}

/// Sessions on or after the given date, soonest first.
pub async fn upcoming_sessions(from: NaiveDate) -> Result<Vec<Session>, Error> {
    let filter = format!("gte.{from}");
    rest::select(
        "sessions",
        &[
            ("select", "*"),
            ("date", filter.as_str()),
            ("order", "date.asc,time.asc"),
        ],
        Authority::CallerSession,
    )
    .await
}

/// Sessions on a single date, used for same-day self check-in.
pub async fn sessions_for_date(date: NaiveDate) -> Result<Vec<Session>, Error> {
    let filter = format!("eq.{date}");
    rest::select(
        "sessions",
        &[
            ("select", "*"),
            ("date", filter.as_str()),
            ("order", "time.asc"),
        ],
        Authority::CallerSession,
    )
    .await
}

/// Sign-ups and attendance marks for one session, in sign-up order.
pub async fn roster(session_id: &str) -> Result<Vec<SessionParticipant>, Error> {
    let filter = format!("eq.{session_id}");
    rest::select(
        "session_participants",
        &[
            ("select", "*"),
            ("session_id", filter.as_str()),
            ("order", "signed_up_at.asc"),
        ],
        Authority::CallerSession,
    )
    .await
}

/// A participant's own sign-ups and attendance history.
pub async fn participation(participant_id: &str) -> Result<Vec<SessionParticipant>, Error> {
    let filter = format!("eq.{participant_id}");
    rest::select(
        "session_participants",
        &[("select", "*"), ("participant_id", filter.as_str())],
        Authority::CallerSession,
    )
    .await
}

/// Signs a participant up for a session.
pub async fn sign_up(session_id: &str, participant_id: &str) -> Result<(), Error> {
    rest::insert(
        "session_participants",
        &json!({
            "session_id": session_id,
            "participant_id": participant_id,
            "status": AttendanceStatus::SignedUp,
        }),
        Authority::CallerSession,
    )
    .await
}

/// Withdraws a sign-up that has not been validated yet.
pub async fn cancel_signup(session_id: &str, participant_id: &str) -> Result<(), Error> {
    let session_filter = format!("eq.{session_id}");
    let participant_filter = format!("eq.{participant_id}");
    rest::delete(
        "session_participants",
        &[
            ("session_id", session_filter.as_str()),
            ("participant_id", participant_filter.as_str()),
            ("status", "eq.signed_up"),
        ],
        Authority::CallerSession,
    )
    .await
}

/// Volunteer check-in: marks a participant present or absent, stamping who
/// validated it and when. Upserts so a mark can overwrite a prior sign-up
/// or an earlier mark for the same session.
pub async fn mark_attendance(
    session_id: &str,
    participant_id: &str,
    status: AttendanceStatus,
    volunteer_id: &str,
) -> Result<(), Error> {
    rest::upsert(
        "session_participants",
        &json!({
            "session_id": session_id,
            "participant_id": participant_id,
            "status": status,
            "validated_by_volunteer_id": volunteer_id,
            "marked_at": Utc::now().to_rfc3339(),
        }),
        "session_id,participant_id",
        Authority::CallerSession,
    )
    .await
}

/// Participant self check-in for a same-day session; awaits volunteer
/// validation.
pub async fn self_report(session_id: &str, participant_id: &str) -> Result<(), Error> {
    rest::insert(
        "session_participants",
        &json!({
            "session_id": session_id,
            "participant_id": participant_id,
            "status": AttendanceStatus::SelfReported,
        }),
        Authority::CallerSession,
    )
    .await
}
