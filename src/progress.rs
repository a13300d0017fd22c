use crate::error::Error;
use crate::supabase::rest::{self, Authority};
use serde::{Deserialize, Serialize};

/// Row in the `levels` table. Names and descriptions are bilingual
/// (English / Indonesian).
#[derive(Debug, Deserialize, Clone)]
pub struct Level {
    pub id: String,
    pub name_en: String,
    pub name_id: String,
    pub description_en: Option<String>,
    pub description_id: Option<String>,
    pub order_number: u32,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewLevel {
    pub name_en: String,
    pub name_id: String,
    pub description_en: Option<String>,
    pub description_id: Option<String>,
    pub order_number: u32,
}

/// Row in the `skills` table; every skill belongs to a level.
#[derive(Debug, Deserialize, Clone)]
pub struct Skill {
    pub id: String,
    pub level_id: String,
    pub name_en: String,
    pub name_id: String,
    pub description_en: Option<String>,
    pub description_id: Option<String>,
    pub order_number: u32,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewSkill {
    pub level_id: String,
    pub name_en: String,
    pub name_id: String,
    pub description_en: Option<String>,
    pub description_id: Option<String>,
    pub order_number: u32,
}

/// Row in the `participant_progress` table: a skill or level achieved by a
/// participant, validated by a volunteer.
#[derive(Debug, Deserialize, Clone)]
pub struct ParticipantProgress {
    pub id: String,
    pub participant_id: String,
    pub skill_id: Option<String>,
    pub level_id: Option<String>,
    pub achieved_date: Option<String>,
    pub validated_by_volunteer_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<String>,
}

/// Insert payload for `participant_progress`; exactly one of `skill_id` and
/// `level_id` should be set.
#[derive(Debug, Serialize, Default)]
pub struct NewProgress {
    pub participant_id: String,
    pub skill_id: Option<String>,
    pub level_id: Option<String>,
    pub achieved_date: Option<String>,
    pub validated_by_volunteer_id: Option<String>,
    pub notes: Option<String>,
}

pub async fn levels() -> Result<Vec<Level>, Error> {
    rest::select(
        "levels",
        &[("select", "*"), ("order", "order_number.asc")],
        Authority::CallerSession,
    )
    .await
}

pub async fn skills() -> Result<Vec<Skill>, Error> {
    rest::select(
        "skills",
        &[("select", "*"), ("order", "order_number.asc")],
        Authority::CallerSession,
    )
    .await
}

pub async fn create_level(level: &NewLevel) -> Result<(), Error> {
    rest::insert("levels", level, Authority::CallerSession).await
}

pub async fn update_level(level_id: &str, level: &NewLevel) -> Result<(), Error> {
    let filter = format!("eq.{level_id}");
    rest::update(
        "levels",
        level,
        &[("id", filter.as_str())],
        Authority::CallerSession,
    )
    .await
}

/// Deleting a level cascades to its skills through the backend's
/// referential rules.
pub async fn delete_level(level_id: &str) -> Result<(), Error> {
    let filter = format!("eq.{level_id}");
    rest::delete("levels", &[("id", filter.as_str())], Authority::CallerSession).await
}

pub async fn create_skill(skill: &NewSkill) -> Result<(), Error> {
    rest::insert("skills", skill, Authority::CallerSession).await
}

pub async fn update_skill(skill_id: &str, skill: &NewSkill) -> Result<(), Error> {
    let filter = format!("eq.{skill_id}");
    rest::update(
        "skills",
        skill,
        &[("id", filter.as_str())],
        Authority::CallerSession,
    )
    .await
}

pub async fn delete_skill(skill_id: &str) -> Result<(), Error> {
    let filter = format!("eq.{skill_id}");
    rest::delete("skills", &[("id", filter.as_str())], Authority::CallerSession).await
}

/// Records an achieved skill or level for a participant.
pub async fn record_progress(progress: &NewProgress) -> Result<(), Error> {
    rest::insert("participant_progress", progress, Authority::CallerSession).await
}

/// A participant's achievements, most recent first.
pub async fn progress_for_participant(
    participant_id: &str,
) -> Result<Vec<ParticipantProgress>, Error> {
    let filter = format!("eq.{participant_id}");
    rest::select(
        "participant_progress",
        &[
            ("select", "*"),
            ("participant_id", filter.as_str()),
            ("order", "achieved_date.desc"),
        ],
        Authority::CallerSession,
    )
    .await
}
