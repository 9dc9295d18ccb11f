//! Storage seam for patient intake submissions.

use crate::error::Error;
use crate::intake::{IntakeSource, NewPatientIntake, PatientIntake};
use async_trait::async_trait;
use dashmap::DashMap;

/// Trait for persisting patient intake submissions.
///
/// Every record is scoped to the organization named by the verified intake token.
/// Implementations should handle concurrent access safely.
#[async_trait]
pub trait IntakeStore: Send + Sync {
    /// Store a validated intake for an organization.
    ///
    /// # Arguments
    ///
    /// * `organization_id` - Organization the intake link was minted for
    /// * `source` - Whether the intake came from a shared link or a tablet
    /// * `intake` - The validated intake fields
    async fn insert(
        &self,
        organization_id: &str,
        source: IntakeSource,
        intake: NewPatientIntake,
    ) -> Result<PatientIntake, Error>;

    /// All intakes stored for an organization, oldest first.
    async fn find_by_organization(&self, organization_id: &str)
        -> Result<Vec<PatientIntake>, Error>;
}

/// Process-local intake store.
#[derive(Debug, Default)]
pub struct InMemoryIntakeStore {
    intakes: DashMap<String, Vec<PatientIntake>>,
}

impl InMemoryIntakeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IntakeStore for InMemoryIntakeStore {
    async fn insert(
        &self,
        organization_id: &str,
        source: IntakeSource,
        intake: NewPatientIntake,
    ) -> Result<PatientIntake, Error> {
        let stored = PatientIntake::new(organization_id, source, intake);
        self.intakes
            .entry(organization_id.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn find_by_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<PatientIntake>, Error> {
        Ok(self
            .intakes
            .get(organization_id)
            .map(|intakes| intakes.value().clone())
            .unwrap_or_default())
    }
}
