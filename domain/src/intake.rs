//! Patient intake submissions received through intake links.

use crate::error::Error;
use crate::intake_store::IntakeStore;
use chrono::{DateTime, NaiveDate, Utc};
use intake_auth::{TokenPayload, TokenType};
use log::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

const MAX_NAME_LEN: usize = 100;
const MAX_NOTES_LEN: usize = 4000;

/// How the patient reached the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IntakeSource {
    /// Expiring link shared by email or SMS
    Link,
    /// Front-desk tablet
    Tablet,
}

impl From<TokenType> for IntakeSource {
    fn from(kind: TokenType) -> Self {
        match kind {
            TokenType::Expiring => IntakeSource::Link,
            TokenType::Tablet => IntakeSource::Tablet,
        }
    }
}

/// Intake form fields as submitted by the patient.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct NewPatientIntake {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// A stored intake submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientIntake {
    pub id: Uuid,
    pub organization_id: String,
    pub source: IntakeSource,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PatientIntake {
    pub fn new(organization_id: &str, source: IntakeSource, intake: NewPatientIntake) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id: organization_id.to_string(),
            source,
            first_name: intake.first_name,
            last_name: intake.last_name,
            date_of_birth: intake.date_of_birth,
            email: intake.email,
            phone: intake.phone,
            notes: intake.notes,
            created_at: Utc::now(),
        }
    }
}

impl NewPatientIntake {
    /// Trims every field, drops blank optional fields and checks the result.
    pub fn validate(self, today: NaiveDate) -> Result<Self, Error> {
        let first_name = required(self.first_name, "first_name")?;
        let last_name = required(self.last_name, "last_name")?;

        if let Some(date_of_birth) = self.date_of_birth {
            if date_of_birth > today {
                return Err(Error::invalid("date_of_birth is in the future"));
            }
        }

        let email = optional(self.email);
        if let Some(email) = &email {
            if !is_plausible_email(email) {
                return Err(Error::invalid("email is not a valid address"));
            }
        }

        let notes = optional(self.notes);
        if notes.as_ref().is_some_and(|n| n.chars().count() > MAX_NOTES_LEN) {
            return Err(Error::invalid("notes are too long"));
        }

        Ok(Self {
            first_name,
            last_name,
            date_of_birth: self.date_of_birth,
            email,
            phone: optional(self.phone),
            notes,
        })
    }
}

fn required(value: String, field: &str) -> Result<String, Error> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::invalid(&format!("{field} is required")));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(Error::invalid(&format!("{field} is too long")));
    }
    Ok(value.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}

/// Validates `intake` and stores it under the organization the intake link was minted for.
pub async fn submit(
    store: &dyn IntakeStore,
    payload: &TokenPayload,
    intake: NewPatientIntake,
) -> Result<PatientIntake, Error> {
    let intake = intake.validate(Utc::now().date_naive())?;
    let source = IntakeSource::from(payload.kind);

    let stored = store.insert(&payload.org_id, source, intake).await?;
    info!(
        "Stored patient intake {} for organization {} via {:?}",
        stored.id, stored.organization_id, source
    );

    Ok(stored)
}
