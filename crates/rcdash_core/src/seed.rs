//! Default dataset.
//!
//! Loaded on first start (nothing persisted yet) and used for any collection
//! an import document leaves out. Cross-links are consistent: every id
//! referenced here exists here. Links are one-directional, so `g2 -> p3`
//! has no `p3 -> g2` counterpart.

use crate::model::{
    ComputeResource, ComputeResourceStatus, ComputeResourceType, Dataset, Grant, GrantStatus, Lab,
    Note, NoteId, Project, Researcher, ResearcherId,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Builds the default dataset. Note timestamps are placed relative to `now`.
pub fn default_dataset(now: DateTime<Utc>) -> Dataset {
    Dataset {
        researchers: researchers(now),
        labs: labs(),
        projects: projects(),
        compute_resources: compute_resources(),
        grants: grants(),
    }
}

pub fn researchers(now: DateTime<Utc>) -> Vec<Researcher> {
    let mut alice = Researcher::with_id("r1", "Dr. Alice Wonderland").in_lab("l1");
    alice.first_name = Some("Alice".to_string());
    alice.last_name = Some("Wonderland".to_string());
    alice.net_id = Some("alicew".to_string());
    alice.title = Some("Lead AI Researcher".to_string());
    alice.email = Some("alice.w@ucr.edu".to_string());
    alice.employee_id = Some("E12345".to_string());
    alice.ucr_cid = Some("UCR001".to_string());
    alice.org = Some("College of Engineering".to_string());
    alice.div = Some("CSE Department".to_string());
    alice.department = Some("Computer Science".to_string());
    alice.research = Some(
        "Artificial Intelligence, Machine Learning, Natural Language Processing".to_string(),
    );
    alice.profile_url = Some("https://sample-ucr.edu/profiles/alicew".to_string());
    alice.notes = vec![
        seeded_note(
            "n1_1",
            &alice.id,
            "Met with Alice to discuss new AI project proposal. Seems promising.",
            now - Duration::days(2),
        ),
        seeded_note(
            "n1_2",
            &alice.id,
            "Followed up on GPU requirements for the project.",
            now - Duration::days(1),
        ),
    ];

    let mut bob = Researcher::with_id("r2", "Dr. Bob The Builder").in_lab("l2");
    bob.first_name = Some("Bob".to_string());
    bob.last_name = Some("Builder".to_string());
    bob.net_id = Some("bobb".to_string());
    bob.title = Some("Senior Engineer".to_string());
    bob.email = Some("bob.b@ucr.edu".to_string());
    bob.employee_id = Some("E67890".to_string());
    bob.ucr_cid = Some("UCR002".to_string());
    bob.org = Some("College of Engineering".to_string());
    bob.div = Some("MAE Department".to_string());
    bob.department = Some("Engineering".to_string());
    bob.research = Some("Sustainable Materials, Structural Engineering".to_string());
    bob.profile_url = Some("https://sample-ucr.edu/profiles/bobb".to_string());

    let mut carol = Researcher::with_id("r3", "Dr. Carol Danvers");
    carol.first_name = Some("Carol".to_string());
    carol.last_name = Some("Danvers".to_string());
    carol.net_id = Some("carold".to_string());
    carol.title = Some("Professor of Physics".to_string());
    carol.email = Some("carol.d@ucr.edu".to_string());
    carol.employee_id = Some("E11223".to_string());
    carol.ucr_cid = Some("UCR003".to_string());
    carol.org = Some("College of Natural and Agricultural Sciences".to_string());
    carol.div = Some("Physics Department".to_string());
    carol.department = Some("Physics".to_string());
    carol.research = Some("Quantum Mechanics, Astrophysics".to_string());

    vec![alice, bob, carol]
}

pub fn labs() -> Vec<Lab> {
    let mut ai = Lab::with_id(
        "l1",
        "AI & ML Research Lab",
        "Focuses on cutting-edge AI research.",
    )
    .led_by("r1");
    ai.project_ids = vec!["p1".into()];

    let mut green = Lab::with_id(
        "l2",
        "Sustainable Engineering Solutions Lab",
        "Developing green tech for the future.",
    )
    .led_by("r2");
    green.project_ids = vec!["p2".into()];

    vec![ai, green]
}

pub fn projects() -> Vec<Project> {
    let mut phoenix = Project::with_id("p1", "Project Phoenix: Next-Gen AI", ymd(2023, 1, 15));
    phoenix.description = "Developing advanced AI models.".to_string();
    phoenix.lead_researcher_id = Some("r1".into());
    phoenix.lab_ids = vec!["l1".into()];
    phoenix.compute_resource_ids = vec!["cr1".into()];
    phoenix.grant_ids = vec!["g1".into()];

    let mut eco = Project::with_id("p2", "EcoStructures Initiative", ymd(2023, 3, 1));
    eco.description = "Research into sustainable building materials.".to_string();
    eco.end_date = Some(ymd(2024, 8, 30));
    eco.lead_researcher_id = Some("r2".into());
    eco.lab_ids = vec!["l2".into()];
    eco.compute_resource_ids = vec!["cr2".into()];

    let mut quantum = Project::with_id("p3", "Quantum Entanglement Studies", ymd(2024, 2, 20));
    quantum.description = "Exploring quantum phenomena.".to_string();
    quantum.lead_researcher_id = Some("r3".into());

    vec![phoenix, eco, quantum]
}

pub fn compute_resources() -> Vec<ComputeResource> {
    let mut olympus = ComputeResource::with_id("cr1", "Olympus Cluster", ComputeResourceType::Cluster);
    olympus.specification =
        "High-performance computing cluster with 256 nodes and 1024 NVIDIA A100 GPUs.".to_string();
    olympus.project_ids = vec!["p1".into()];
    olympus.cluster_type = Some("HPC".to_string());
    olympus.nodes = Some(256);
    olympus.cpus = Some(512);
    olympus.cpus_per_node = Some(2);
    olympus.node_memory = Some("512GB".to_string());
    olympus.total_ram = Some("128TB".to_string());
    olympus.gpus = Some(1024);
    olympus.gpus_per_node = Some(4);
    olympus.cluster_name = Some("ucr-hpc-olympus".to_string());
    olympus.total_cores = Some(16384);

    let mut titan = ComputeResource::with_id(
        "cr2",
        "Titan Workstation",
        ComputeResourceType::HighEndWorkstation,
    );
    titan.specification = "128 Core CPU, 512GB RAM, 4x RTX A6000".to_string();
    titan.status = ComputeResourceStatus::InUse;
    titan.project_ids = vec!["p2".into()];
    titan.cpus = Some(1);
    titan.node_memory = Some("512GB".to_string());
    titan.total_ram = Some("512GB".to_string());
    titan.gpus = Some(4);
    titan.total_cores = Some(128);

    vec![olympus, titan]
}

pub fn grants() -> Vec<Grant> {
    let mut career = Grant::with_id(
        "g1",
        "NSF CAREER: Advancing AI for Scientific Discovery",
        "r1",
        ymd(2023, 9, 1),
        ymd(2028, 8, 31),
    );
    career.agency = "National Science Foundation".to_string();
    career.award_number = Some("NSF-2300001".to_string());
    career.co_pi_ids = vec!["r2".into()];
    career.amount = 750_000.0;
    career.status = GrantStatus::Active;
    career.project_ids = vec!["p1".into()];
    career.description = Some(
        "A 5-year project to develop novel AI algorithms for accelerating discovery in materials science."
            .to_string(),
    );
    career.award_date = Some(ymd(2023, 7, 15));

    let mut quantum = Grant::with_id(
        "g2",
        "DOE Grant for Quantum Computing Research",
        "r3",
        ymd(2024, 1, 1),
        ymd(2027, 12, 31),
    );
    quantum.agency = "Department of Energy".to_string();
    quantum.award_number = Some("DOE-QC-005".to_string());
    quantum.amount = 1_200_000.0;
    quantum.status = GrantStatus::Awarded;
    quantum.project_ids = vec!["p3".into()];
    quantum.description = Some("Exploring new quantum algorithms and their applications.".to_string());
    quantum.proposal_due_date = Some(ymd(2023, 6, 1));
    quantum.award_date = Some(ymd(2023, 11, 1));

    let mut cellular = Grant::with_id(
        "g3",
        "NIH Research Grant on Cellular Biology",
        "r1",
        ymd(2022, 6, 1),
        ymd(2025, 5, 31),
    );
    cellular.agency = "National Institutes of Health".to_string();
    cellular.award_number = Some("NIH-CB-001".to_string());
    cellular.amount = 450_000.0;
    cellular.status = GrantStatus::Active;
    cellular.description =
        Some("Investigating cellular mechanisms in response to external stimuli.".to_string());
    cellular.award_date = Some(ymd(2022, 4, 10));

    vec![career, quantum, cellular]
}

fn seeded_note(id: &str, owner: &ResearcherId, content: &str, at: DateTime<Utc>) -> Note {
    Note {
        id: NoteId::from(id),
        researcher_id: owner.clone(),
        content: content.to_string(),
        created_at: at,
        updated_at: at,
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    // Literal calendar dates above are all valid.
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}
