//! Read-only dashboard projections.
//!
//! Everything here is derived from one dataset snapshot and a reference
//! date; nothing is cached or persisted.

use crate::model::{
    ComputeResourceId, Dataset, EntityKind, EntityRef, GrantId, GrantStatus, LabId, NoteId,
    ProjectId, ResearcherId,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashSet};

/// Grants ending within this many days (inclusive) are flagged.
pub const ENDING_SOON_WINDOW_DAYS: i64 = 90;
const ENDING_SOON_LIMIT: usize = 5;
const RECENT_PROJECTS_LIMIT: usize = 5;
const LATEST_NOTES_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub counts: BTreeMap<EntityKind, usize>,
    pub note_count: usize,
    /// Sum of `amount` over Awarded and Active grants.
    pub funded_total: f64,
    /// Active/Awarded grants ending within the window, soonest first.
    pub ending_soon: Vec<GrantDeadline>,
    /// Most recently started projects, newest first.
    pub recent_projects: Vec<ProjectId>,
    /// Latest note of the researchers most recently written about.
    pub latest_notes: Vec<LatestNote>,
    pub dangling: Vec<DanglingReference>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantDeadline {
    pub grant_id: GrantId,
    pub title: String,
    pub end_date: NaiveDate,
    pub days_left: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestNote {
    pub researcher_id: ResearcherId,
    pub note_id: NoteId,
    pub updated_at: DateTime<Utc>,
}

/// A weak reference whose target no longer exists.
///
/// Reported for display; updates never repair these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub holder: EntityRef,
    /// Field name in the stored form, e.g. `leadResearcherId`.
    pub field: &'static str,
    pub target: EntityRef,
}

pub fn summarize(dataset: &Dataset, today: NaiveDate) -> DashboardSummary {
    let counts = EntityKind::ALL
        .into_iter()
        .map(|kind| (kind, collection_len(dataset, kind)))
        .collect();

    let funded_total = dataset
        .grants
        .iter()
        .filter(|grant| grant.status.is_funded())
        .map(|grant| grant.amount)
        .sum();

    DashboardSummary {
        counts,
        note_count: dataset.note_count(),
        funded_total,
        ending_soon: grants_ending_soon(dataset, today),
        recent_projects: recent_projects(dataset),
        latest_notes: latest_notes(dataset),
        dangling: dangling_references(dataset),
    }
}

pub fn grants_ending_soon(dataset: &Dataset, today: NaiveDate) -> Vec<GrantDeadline> {
    let mut deadlines: Vec<GrantDeadline> = dataset
        .grants
        .iter()
        .filter(|grant| matches!(grant.status, GrantStatus::Active | GrantStatus::Awarded))
        .filter_map(|grant| {
            let days_left = (grant.end_date - today).num_days();
            (0..=ENDING_SOON_WINDOW_DAYS)
                .contains(&days_left)
                .then(|| GrantDeadline {
                    grant_id: grant.id.clone(),
                    title: grant.title.clone(),
                    end_date: grant.end_date,
                    days_left,
                })
        })
        .collect();
    deadlines.sort_by_key(|deadline| deadline.end_date);
    deadlines.truncate(ENDING_SOON_LIMIT);
    deadlines
}

fn recent_projects(dataset: &Dataset) -> Vec<ProjectId> {
    let mut projects: Vec<_> = dataset.projects.iter().collect();
    projects.sort_by(|a, b| b.start_date.cmp(&a.start_date));
    projects
        .into_iter()
        .take(RECENT_PROJECTS_LIMIT)
        .map(|project| project.id.clone())
        .collect()
}

fn latest_notes(dataset: &Dataset) -> Vec<LatestNote> {
    let mut latest: Vec<LatestNote> = dataset
        .researchers
        .iter()
        .filter_map(|researcher| {
            researcher
                .notes
                .iter()
                .max_by_key(|note| note.updated_at)
                .map(|note| LatestNote {
                    researcher_id: researcher.id.clone(),
                    note_id: note.id.clone(),
                    updated_at: note.updated_at,
                })
        })
        .collect();
    latest.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    latest.truncate(LATEST_NOTES_LIMIT);
    latest
}

/// Lists every reference whose target id is missing from `dataset`.
pub fn dangling_references(dataset: &Dataset) -> Vec<DanglingReference> {
    let researchers: HashSet<&ResearcherId> = dataset.researchers.iter().map(|r| &r.id).collect();
    let labs: HashSet<&LabId> = dataset.labs.iter().map(|l| &l.id).collect();
    let projects: HashSet<&ProjectId> = dataset.projects.iter().map(|p| &p.id).collect();
    let resources: HashSet<&ComputeResourceId> =
        dataset.compute_resources.iter().map(|c| &c.id).collect();
    let grants: HashSet<&GrantId> = dataset.grants.iter().map(|g| &g.id).collect();

    let mut found = Vec::new();
    let mut check = |holder: EntityRef, field: &'static str, target: EntityRef, exists: bool| {
        if !exists {
            found.push(DanglingReference {
                holder,
                field,
                target,
            });
        }
    };

    for researcher in &dataset.researchers {
        if let Some(lab_id) = &researcher.lab_id {
            check(
                EntityRef::Researcher(researcher.id.clone()),
                "labId",
                EntityRef::Lab(lab_id.clone()),
                labs.contains(lab_id),
            );
        }
    }
    for lab in &dataset.labs {
        let holder = EntityRef::Lab(lab.id.clone());
        if let Some(pi) = &lab.principal_investigator_id {
            check(
                holder.clone(),
                "principalInvestigatorId",
                EntityRef::Researcher(pi.clone()),
                researchers.contains(pi),
            );
        }
        for project_id in &lab.project_ids {
            check(
                holder.clone(),
                "projectIds",
                EntityRef::Project(project_id.clone()),
                projects.contains(project_id),
            );
        }
    }
    for project in &dataset.projects {
        let holder = EntityRef::Project(project.id.clone());
        if let Some(lead) = &project.lead_researcher_id {
            check(
                holder.clone(),
                "leadResearcherId",
                EntityRef::Researcher(lead.clone()),
                researchers.contains(lead),
            );
        }
        for lab_id in &project.lab_ids {
            check(
                holder.clone(),
                "labIds",
                EntityRef::Lab(lab_id.clone()),
                labs.contains(lab_id),
            );
        }
        for resource_id in &project.compute_resource_ids {
            check(
                holder.clone(),
                "computeResourceIds",
                EntityRef::ComputeResource(resource_id.clone()),
                resources.contains(resource_id),
            );
        }
        for grant_id in &project.grant_ids {
            check(
                holder.clone(),
                "grantIds",
                EntityRef::Grant(grant_id.clone()),
                grants.contains(grant_id),
            );
        }
    }
    for resource in &dataset.compute_resources {
        for project_id in &resource.project_ids {
            check(
                EntityRef::ComputeResource(resource.id.clone()),
                "projectIds",
                EntityRef::Project(project_id.clone()),
                projects.contains(project_id),
            );
        }
    }
    for grant in &dataset.grants {
        let holder = EntityRef::Grant(grant.id.clone());
        if let Some(pi) = &grant.principal_investigator_id {
            check(
                holder.clone(),
                "principalInvestigatorId",
                EntityRef::Researcher(pi.clone()),
                researchers.contains(pi),
            );
        }
        for co_pi in &grant.co_pi_ids {
            check(
                holder.clone(),
                "coPiIds",
                EntityRef::Researcher(co_pi.clone()),
                researchers.contains(co_pi),
            );
        }
        for project_id in &grant.project_ids {
            check(
                holder.clone(),
                "projectIds",
                EntityRef::Project(project_id.clone()),
                projects.contains(project_id),
            );
        }
    }
    found
}

fn collection_len(dataset: &Dataset, kind: EntityKind) -> usize {
    match kind {
        EntityKind::Researcher => dataset.researchers.len(),
        EntityKind::Lab => dataset.labs.len(),
        EntityKind::Project => dataset.projects.len(),
        EntityKind::ComputeResource => dataset.compute_resources.len(),
        EntityKind::Grant => dataset.grants.len(),
    }
}
