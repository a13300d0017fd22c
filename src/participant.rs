use crate::error::Error;
use crate::supabase::rest::{self, Authority};
use serde::{Deserialize, Serialize};

/// Self-rated swimming/surfing ability from the intake form.
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Copy, Clone)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    None,
    Poor,
    Competent,
    Advanced,
}

#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Copy, Clone)]
#[serde(rename_all = "snake_case")]
pub enum HijabPhotoPreference {
    WithOrWithout,
    OnlyWith,
}

/// Intake-form fields for a participant account. Every field is optional;
/// unset free text and enums insert as null, unset agreements as false.
#[derive(Debug, Serialize, Default, Clone)]
pub struct ParticipantIntake {
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub shoe_size: Option<String>,
    pub clothing_size: Option<String>,
    pub age: Option<String>,
    pub village: Option<String>,
    pub number_of_children: Option<String>,
    pub respiratory_issues: Option<String>,
    pub diabetes: Option<String>,
    pub neurological_conditions: Option<String>,
    pub chronic_illnesses: Option<String>,
    pub head_injuries: Option<String>,
    pub hospitalizations: Option<String>,
    pub medications: Option<String>,
    pub medications_not_taking_during_program: Option<String>,
    pub medical_dietary_requirements: Option<String>,
    pub religious_personal_dietary_restrictions: Option<String>,
    pub swim_ability_calm: Option<Ability>,
    pub swim_ability_moving: Option<Ability>,
    pub surfing_experience: Option<Ability>,
    pub commitment_statement: bool,
    pub acknowledgment_agreement_authorization: bool,
    pub risks_release_indemnity_agreement: bool,
    pub media_release_agreement: bool,
    pub hijab_photo_preference: Option<HijabPhotoPreference>,
    pub signature: Option<String>,
    pub signature_date: Option<String>,
}

/// Insert payload for the `participants` table.
#[derive(Debug, Serialize)]
pub struct NewParticipantDetail {
    pub user_id: String,
    #[serde(flatten)]
    pub intake: ParticipantIntake,
}

/// Row in the `participants` table, one-to-one with a `users` row of role
/// participant.
#[derive(Debug, Deserialize, Clone)]
pub struct ParticipantDetail {
    pub id: String,
    pub user_id: String,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub shoe_size: Option<String>,
    pub clothing_size: Option<String>,
    pub age: Option<String>,
    pub village: Option<String>,
    pub number_of_children: Option<String>,
    pub respiratory_issues: Option<String>,
    pub diabetes: Option<String>,
    pub neurological_conditions: Option<String>,
    pub chronic_illnesses: Option<String>,
    pub head_injuries: Option<String>,
    pub hospitalizations: Option<String>,
    pub medications: Option<String>,
    pub medications_not_taking_during_program: Option<String>,
    pub medical_dietary_requirements: Option<String>,
    pub religious_personal_dietary_restrictions: Option<String>,
    pub swim_ability_calm: Option<Ability>,
    pub swim_ability_moving: Option<Ability>,
    pub surfing_experience: Option<Ability>,
    pub commitment_statement: Option<bool>,
    pub acknowledgment_agreement_authorization: Option<bool>,
    pub risks_release_indemnity_agreement: Option<bool>,
    pub media_release_agreement: Option<bool>,
    pub hijab_photo_preference: Option<HijabPhotoPreference>,
    pub signature: Option<String>,
    pub signature_date: Option<String>,
    pub created_at: Option<String>,
}

/// The intake row belonging to a `users` row, when its role is participant.
pub async fn participant_for_user(user_id: &str) -> Result<Option<ParticipantDetail>, Error> {
    let filter = format!("eq.{user_id}");
    rest::select_maybe_single(
        "participants",
        &[("select", "*"), ("user_id", filter.as_str())],
        Authority::CallerSession,
    )
    .await
}

/// All intake rows, for the admin and volunteer participant listings.
pub async fn participants() -> Result<Vec<ParticipantDetail>, Error> {
    rest::select(
        "participants",
        &[("select", "*"), ("order", "created_at.desc")],
        Authority::CallerSession,
    )
    .await
}
