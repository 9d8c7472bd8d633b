//! Grant record.
//!
//! # Invariants
//! - A grant is created with a principal investigator. The reference becomes
//!   absent ("unassigned") only when the researcher delete cascade clears it;
//!   such a grant can still be updated.
//! - `amount` is finite and non-negative.
//! - `end_date` is not earlier than `start_date`.

use super::ids::{optional_ref, GrantId, ProjectId, ResearcherId};
use super::optional_date;
use super::validation::{
    check_date_range, check_id, check_name, check_optional_ref, check_refs, ValidationError,
};
use super::{Dataset, Entity, EntityKind, EntityRef};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantStatus {
    Pending,
    Submitted,
    Awarded,
    Active,
    Closed,
    #[serde(rename = "Not Funded")]
    NotFunded,
}

impl GrantStatus {
    /// Grants that currently bring money in.
    pub fn is_funded(self) -> bool {
        matches!(self, Self::Awarded | Self::Active)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
    pub id: GrantId,
    pub title: String,
    #[serde(default)]
    pub agency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub award_number: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub principal_investigator_id: Option<ResearcherId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub co_pi_ids: Vec<ResearcherId>,
    pub amount: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: GrantStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub project_ids: Vec<ProjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub proposal_due_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub award_date: Option<NaiveDate>,
}

impl Grant {
    /// Creates a pending grant with a generated id and the given PI.
    pub fn new(
        title: impl Into<String>,
        principal_investigator_id: impl Into<ResearcherId>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self::with_id(
            GrantId::generate(),
            title,
            principal_investigator_id,
            start_date,
            end_date,
        )
    }

    pub fn with_id(
        id: impl Into<GrantId>,
        title: impl Into<String>,
        principal_investigator_id: impl Into<ResearcherId>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            agency: String::new(),
            award_number: None,
            principal_investigator_id: Some(principal_investigator_id.into()),
            co_pi_ids: Vec::new(),
            amount: 0.0,
            start_date,
            end_date,
            status: GrantStatus::Pending,
            project_ids: Vec::new(),
            description: None,
            proposal_due_date: None,
            award_date: None,
        }
    }
}

impl Entity for Grant {
    type Id = GrantId;

    const KIND: EntityKind = EntityKind::Grant;

    fn id(&self) -> &GrantId {
        &self.id
    }

    fn reference(id: &GrantId) -> EntityRef {
        EntityRef::Grant(id.clone())
    }

    /// New grants must also name their principal investigator; a blank id
    /// counts as missing.
    fn validate_new(&self) -> Result<(), ValidationError> {
        let named = self
            .principal_investigator_id
            .as_ref()
            .is_some_and(|id| !id.as_str().trim().is_empty());
        if !named {
            return Err(ValidationError::MissingGrantPrincipalInvestigator(
                self.id.clone(),
            ));
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_id(Self::KIND, self.id.as_str())?;
        check_name(Self::KIND, self.id.as_str(), &self.title)?;
        check_optional_ref(
            EntityKind::Researcher,
            self.principal_investigator_id.as_ref(),
        )?;
        check_refs(EntityKind::Researcher, &self.co_pi_ids)?;
        check_refs(EntityKind::Project, &self.project_ids)?;
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ValidationError::InvalidAmount {
                id: self.id.clone(),
                amount: self.amount,
            });
        }
        check_date_range(
            Self::KIND,
            self.id.as_str(),
            self.start_date,
            Some(self.end_date),
        )
    }

    fn collection(dataset: &Dataset) -> &[Self] {
        &dataset.grants
    }

    fn collection_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.grants
    }
}

#[cfg(test)]
mod tests {
    use super::{Grant, GrantStatus};
    use crate::model::{Entity, EntityKind, ValidationError};
    use chrono::NaiveDate;

    fn sample() -> Grant {
        Grant::with_id(
            "g1",
            "NSF CAREER",
            "r1",
            NaiveDate::from_ymd_opt(2023, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2028, 8, 31).unwrap(),
        )
    }

    #[test]
    fn new_grant_requires_principal_investigator() {
        let mut grant = sample();
        assert!(grant.validate_new().is_ok());

        grant.principal_investigator_id = None;
        assert!(grant.validate().is_ok());
        assert!(matches!(
            grant.validate_new(),
            Err(ValidationError::MissingGrantPrincipalInvestigator(_))
        ));
    }

    #[test]
    fn blank_principal_investigator_counts_as_missing() {
        for blank in ["", "   "] {
            let mut grant = sample();
            grant.principal_investigator_id = Some(blank.into());
            assert!(matches!(
                grant.validate_new(),
                Err(ValidationError::MissingGrantPrincipalInvestigator(_))
            ));
            assert!(matches!(
                grant.validate(),
                Err(ValidationError::InvalidId { kind: EntityKind::Researcher, .. })
            ));
        }
    }

    #[test]
    fn blank_co_pi_or_project_link_is_rejected() {
        let mut grant = sample();
        grant.co_pi_ids = vec!["r2".into(), "".into()];
        assert!(matches!(
            grant.validate(),
            Err(ValidationError::InvalidId { kind: EntityKind::Researcher, ref id }) if id.is_empty()
        ));

        let mut grant = sample();
        grant.project_ids = vec!["p 1".into()];
        assert!(matches!(
            grant.validate(),
            Err(ValidationError::InvalidId { kind: EntityKind::Project, .. })
        ));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let mut grant = sample();
        grant.amount = -1.0;
        assert!(matches!(
            grant.validate(),
            Err(ValidationError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn legacy_empty_pi_reads_as_unassigned() {
        let grant: Grant = serde_json::from_str(
            r#"{"id":"g9","title":"Orphaned","agency":"NSF","principalInvestigatorId":"",
                "amount":1000,"startDate":"2024-01-01","endDate":"2025-01-01","status":"Not Funded"}"#,
        )
        .unwrap();
        assert_eq!(grant.principal_investigator_id, None);
        assert_eq!(grant.status, GrantStatus::NotFunded);
    }
}
