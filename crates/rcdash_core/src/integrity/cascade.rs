//! Delete cascade planning and application.
//!
//! Rules (deleted -> affected: effect):
//! - researcher -> lab: clear `principal_investigator_id`
//! - researcher -> project: clear `lead_researcher_id`
//! - researcher -> grant: clear `principal_investigator_id`, strip `co_pi_ids`
//! - lab -> researcher: clear `lab_id`
//! - lab -> project: strip `lab_ids`
//! - project -> lab, compute resource, grant: strip `project_ids`
//! - compute resource -> project: strip `compute_resource_ids`
//! - grant -> project: strip `grant_ids`
//!
//! Rows are independent, so the order they are evaluated in is irrelevant.

use crate::model::ids::{clear_ref, strip_ref};
use crate::model::{
    ComputeResource, Dataset, Entity, EntityKind, EntityRef, Grant, Lab, Project, Researcher,
};
use std::collections::{BTreeMap, BTreeSet};

/// Rewritten dependent records produced by one delete.
///
/// Each vector holds the full new value of every record whose references
/// changed; untouched records are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadePlan {
    pub researchers: Vec<Researcher>,
    pub labs: Vec<Lab>,
    pub projects: Vec<Project>,
    pub compute_resources: Vec<ComputeResource>,
    pub grants: Vec<Grant>,
}

impl CascadePlan {
    pub fn is_empty(&self) -> bool {
        self.researchers.is_empty()
            && self.labs.is_empty()
            && self.projects.is_empty()
            && self.compute_resources.is_empty()
            && self.grants.is_empty()
    }

    /// Collections holding at least one rewritten record.
    pub fn touched(&self) -> BTreeSet<EntityKind> {
        self.summary().edited.into_keys().collect()
    }

    /// Ids of edited records grouped by collection.
    pub fn summary(&self) -> CascadeSummary {
        let mut edited = BTreeMap::new();
        collect_ids(&mut edited, &self.researchers);
        collect_ids(&mut edited, &self.labs);
        collect_ids(&mut edited, &self.projects);
        collect_ids(&mut edited, &self.compute_resources);
        collect_ids(&mut edited, &self.grants);
        CascadeSummary { edited }
    }

    /// Installs every rewritten record into `dataset`, matching by id.
    ///
    /// Records that no longer exist in `dataset` are skipped.
    pub fn apply(self, dataset: &mut Dataset) {
        install(dataset, self.researchers);
        install(dataset, self.labs);
        install(dataset, self.projects);
        install(dataset, self.compute_resources);
        install(dataset, self.grants);
    }
}

/// Report of which dependents a delete edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub edited: BTreeMap<EntityKind, Vec<String>>,
}

impl CascadeSummary {
    pub fn edited_count(&self) -> usize {
        self.edited.values().map(Vec::len).sum()
    }

    pub fn edited_ids(&self, kind: EntityKind) -> &[String] {
        self.edited.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Computes the dependent edits required when `target` is deleted.
///
/// Pure and total: reads `snapshot` only and never fails. The deleted record
/// itself is not part of the plan.
pub fn plan_delete(snapshot: &Dataset, target: &EntityRef) -> CascadePlan {
    let mut plan = CascadePlan::default();
    match target {
        EntityRef::Researcher(id) => {
            plan.labs = rewrite(&snapshot.labs, |lab| {
                clear_ref(&mut lab.principal_investigator_id, id)
            });
            plan.projects = rewrite(&snapshot.projects, |project| {
                clear_ref(&mut project.lead_researcher_id, id)
            });
            plan.grants = rewrite(&snapshot.grants, |grant| {
                let pi_cleared = clear_ref(&mut grant.principal_investigator_id, id);
                let co_pi_stripped = strip_ref(&mut grant.co_pi_ids, id);
                pi_cleared || co_pi_stripped
            });
        }
        EntityRef::Lab(id) => {
            plan.researchers = rewrite(&snapshot.researchers, |researcher| {
                clear_ref(&mut researcher.lab_id, id)
            });
            plan.projects = rewrite(&snapshot.projects, |project| {
                strip_ref(&mut project.lab_ids, id)
            });
        }
        EntityRef::Project(id) => {
            plan.labs = rewrite(&snapshot.labs, |lab| strip_ref(&mut lab.project_ids, id));
            plan.compute_resources = rewrite(&snapshot.compute_resources, |resource| {
                strip_ref(&mut resource.project_ids, id)
            });
            plan.grants = rewrite(&snapshot.grants, |grant| {
                strip_ref(&mut grant.project_ids, id)
            });
        }
        EntityRef::ComputeResource(id) => {
            plan.projects = rewrite(&snapshot.projects, |project| {
                strip_ref(&mut project.compute_resource_ids, id)
            });
        }
        EntityRef::Grant(id) => {
            plan.projects = rewrite(&snapshot.projects, |project| {
                strip_ref(&mut project.grant_ids, id)
            });
        }
    }
    plan
}

/// Removes `target` from `dataset` and applies its cascade.
///
/// Returns `None` (and leaves `dataset` untouched) when the target is not
/// present, which makes repeated deletes no-ops.
pub fn apply_delete(dataset: &mut Dataset, target: &EntityRef) -> Option<CascadeSummary> {
    let removed = match target {
        EntityRef::Researcher(id) => remove::<Researcher>(dataset, id),
        EntityRef::Lab(id) => remove::<Lab>(dataset, id),
        EntityRef::Project(id) => remove::<Project>(dataset, id),
        EntityRef::ComputeResource(id) => remove::<ComputeResource>(dataset, id),
        EntityRef::Grant(id) => remove::<Grant>(dataset, id),
    };
    if !removed {
        return None;
    }

    let plan = plan_delete(dataset, target);
    let summary = plan.summary();
    plan.apply(dataset);
    Some(summary)
}

fn remove<T: Entity>(dataset: &mut Dataset, id: &T::Id) -> bool {
    match dataset.position::<T>(id) {
        Some(index) => {
            T::collection_mut(dataset).remove(index);
            true
        }
        None => false,
    }
}

fn rewrite<T: Clone>(records: &[T], mut edit: impl FnMut(&mut T) -> bool) -> Vec<T> {
    records
        .iter()
        .filter_map(|record| {
            let mut candidate = record.clone();
            edit(&mut candidate).then_some(candidate)
        })
        .collect()
}

fn install<T: Entity>(dataset: &mut Dataset, records: Vec<T>) {
    for record in records {
        dataset.replace(record);
    }
}

fn collect_ids<T: Entity>(edited: &mut BTreeMap<EntityKind, Vec<String>>, records: &[T]) {
    if records.is_empty() {
        return;
    }
    edited.insert(
        T::KIND,
        records
            .iter()
            .map(|record| record.id().to_string())
            .collect(),
    );
}

#[cfg(test)]
mod tests {
    use super::{apply_delete, plan_delete};
    use crate::model::{
        ComputeResource, ComputeResourceId, ComputeResourceType, Dataset, EntityKind, EntityRef,
        Grant, GrantId, Lab, LabId, Project, ProjectId, Researcher, ResearcherId,
    };
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn grant(id: &str, pi: &str) -> Grant {
        Grant::with_id(id, format!("Grant {id}"), pi, date(2024, 1, 1), date(2026, 1, 1))
    }

    /// Two of everything, densely linked.
    fn fixture() -> Dataset {
        let mut lab_a = Lab::with_id("l1", "Lab A", "").led_by("r1");
        lab_a.project_ids = vec!["p1".into(), "p2".into()];
        let mut lab_b = Lab::with_id("l2", "Lab B", "").led_by("r1");
        lab_b.project_ids = vec!["p1".into()];

        let mut p1 = Project::with_id("p1", "Phoenix", date(2023, 1, 15));
        p1.lead_researcher_id = Some("r1".into());
        p1.lab_ids = vec!["l1".into(), "l2".into()];
        p1.compute_resource_ids = vec!["cr1".into()];
        p1.grant_ids = vec!["g1".into(), "g2".into()];
        let mut p2 = Project::with_id("p2", "Eco", date(2023, 3, 1));
        p2.lead_researcher_id = Some("r2".into());
        p2.lab_ids = vec!["l1".into()];
        p2.compute_resource_ids = vec!["cr1".into(), "cr2".into()];
        p2.grant_ids = vec!["g1".into()];

        let mut cr1 = ComputeResource::with_id("cr1", "Olympus", ComputeResourceType::Cluster);
        cr1.project_ids = vec!["p1".into(), "p2".into()];
        let mut cr2 = ComputeResource::with_id("cr2", "Titan", ComputeResourceType::HighEndWorkstation);
        cr2.project_ids = vec!["p2".into()];

        let mut g1 = grant("g1", "r1");
        g1.co_pi_ids = vec!["r2".into(), "r3".into()];
        g1.project_ids = vec!["p1".into(), "p2".into()];
        let mut g2 = grant("g2", "r2");
        g2.co_pi_ids = vec!["r1".into()];
        g2.project_ids = vec!["p1".into()];

        Dataset {
            researchers: vec![
                Researcher::with_id("r1", "Alice").in_lab("l1"),
                Researcher::with_id("r2", "Bob").in_lab("l1"),
                Researcher::with_id("r3", "Carol").in_lab("l2"),
            ],
            labs: vec![lab_a, lab_b],
            projects: vec![p1, p2],
            compute_resources: vec![cr1, cr2],
            grants: vec![g1, g2],
        }
    }

    #[test]
    fn researcher_delete_clears_every_role() {
        let mut data = fixture();
        let summary = apply_delete(&mut data, &EntityRef::Researcher("r1".into())).unwrap();

        assert!(data.labs.iter().all(|lab| lab.principal_investigator_id.is_none()));
        assert_eq!(data.projects[0].lead_researcher_id, None);
        assert_eq!(data.projects[1].lead_researcher_id, Some(ResearcherId::from("r2")));
        assert_eq!(data.grants[0].principal_investigator_id, None);
        assert!(data.grants[1].co_pi_ids.is_empty());
        assert_eq!(summary.edited_ids(EntityKind::Lab), ["l1", "l2"]);
        assert_eq!(summary.edited_ids(EntityKind::Grant), ["g1", "g2"]);
    }

    #[test]
    fn co_pi_removal_keeps_principal_investigator() {
        let mut data = fixture();
        apply_delete(&mut data, &EntityRef::Researcher("r3".into())).unwrap();

        assert_eq!(data.grants[0].co_pi_ids, vec![ResearcherId::from("r2")]);
        assert_eq!(data.grants[0].principal_investigator_id, Some(ResearcherId::from("r1")));
    }

    #[test]
    fn lab_delete_strips_projects_and_researchers() {
        let mut data = fixture();
        apply_delete(&mut data, &EntityRef::Lab("l1".into())).unwrap();

        assert_eq!(data.projects[0].lab_ids, vec![LabId::from("l2")]);
        assert!(data.projects[1].lab_ids.is_empty());
        assert_eq!(data.researchers[0].lab_id, None);
        assert_eq!(data.researchers[1].lab_id, None);
        assert_eq!(data.researchers[2].lab_id, Some(LabId::from("l2")));
    }

    #[test]
    fn project_delete_strips_labs_compute_and_grants() {
        let mut data = fixture();
        let summary = apply_delete(&mut data, &EntityRef::Project("p1".into())).unwrap();

        assert_eq!(data.labs[0].project_ids, vec![ProjectId::from("p2")]);
        assert!(data.labs[1].project_ids.is_empty());
        assert_eq!(data.compute_resources[0].project_ids, vec![ProjectId::from("p2")]);
        assert_eq!(data.grants[0].project_ids, vec![ProjectId::from("p2")]);
        assert!(data.grants[1].project_ids.is_empty());
        assert_eq!(summary.edited_ids(EntityKind::ComputeResource), ["cr1"]);
        assert_eq!(summary.edited_count(), 5);
    }

    #[test]
    fn compute_delete_strips_projects() {
        let mut data = fixture();
        apply_delete(&mut data, &EntityRef::ComputeResource("cr1".into())).unwrap();

        assert!(data.projects[0].compute_resource_ids.is_empty());
        assert_eq!(
            data.projects[1].compute_resource_ids,
            vec![ComputeResourceId::from("cr2")]
        );
    }

    #[test]
    fn grant_delete_strips_projects() {
        let mut data = fixture();
        apply_delete(&mut data, &EntityRef::Grant("g1".into())).unwrap();

        assert_eq!(data.projects[0].grant_ids, vec![GrantId::from("g2")]);
        assert!(data.projects[1].grant_ids.is_empty());
    }

    #[test]
    fn cascade_never_removes_dependents() {
        let mut data = fixture();
        let before = data.len();
        apply_delete(&mut data, &EntityRef::Researcher("r1".into())).unwrap();
        apply_delete(&mut data, &EntityRef::Lab("l1".into())).unwrap();
        assert_eq!(data.len(), before - 2);
        assert_eq!(data.projects.len(), 2);
        assert_eq!(data.grants.len(), 2);
    }

    #[test]
    fn duplicate_links_inside_one_list_are_all_removed() {
        let mut data = fixture();
        data.grants[0].co_pi_ids = vec!["r2".into(), "r2".into(), "r3".into()];
        apply_delete(&mut data, &EntityRef::Researcher("r2".into())).unwrap();
        assert_eq!(data.grants[0].co_pi_ids, vec![ResearcherId::from("r3")]);
    }

    #[test]
    fn second_delete_is_a_no_op() {
        let mut data = fixture();
        apply_delete(&mut data, &EntityRef::Project("p2".into())).unwrap();
        let after_first = data.clone();

        assert!(apply_delete(&mut data, &EntityRef::Project("p2".into())).is_none());
        assert_eq!(data, after_first);
    }

    #[test]
    fn planning_is_pure_and_idempotent() {
        let data = fixture();
        let target = EntityRef::Lab("l1".into());
        let plan = plan_delete(&data, &target);
        assert_eq!(data, fixture());

        let mut once = data.clone();
        plan.clone().apply(&mut once);
        let mut twice = once.clone();
        plan.apply(&mut twice);
        assert_eq!(once, twice);
        assert!(plan_delete(&once, &target).is_empty());
    }

    #[test]
    fn unknown_target_plans_nothing() {
        let data = fixture();
        let plan = plan_delete(&data, &EntityRef::Grant("g404".into()));
        assert!(plan.is_empty());
        assert!(plan.touched().is_empty());
    }
}
