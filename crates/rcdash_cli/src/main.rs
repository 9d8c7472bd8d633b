//! `rcdash` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the SQLite-backed store.
//! - Map subcommands onto core store operations and print plain-text results.

use clap::{Parser, Subcommand};
use log::{info, warn};
use rcdash_core::model::display_or_na;
use rcdash_core::{
    export_document, init_logging, summarize, Clock, CollectionStore, CoreConfig, Dataset,
    EntityKind, EntityRef, EntityStore, Lab, Researcher, ResearcherId, SqliteCollectionStore,
    SystemClock,
};
use std::error::Error;
use std::fs;
use std::path::PathBuf;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser, Debug)]
#[command(name = "rcdash")]
#[command(about = "Research computing dashboard records", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "RCDASH_CONFIG", default_value = "rcdash.toml")]
    config: PathBuf,

    /// Directory holding the database (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Counts, funding, grants ending soon and dangling references
    Summary,
    /// List one collection (researchers, labs, projects, computeResources, grants)
    List { collection: String },
    /// Write the full dataset as a JSON document
    Export {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Replace the whole dataset with a JSON document
    Import { file: PathBuf },
    /// Delete one record and clean up references to it
    Delete { collection: String, id: String },
    /// Researcher notes
    Note {
        #[command(subcommand)]
        action: NoteCommand,
    },
}

#[derive(Subcommand, Debug)]
enum NoteCommand {
    /// Append a note to a researcher
    Add { researcher: String, text: String },
    /// Show a researcher's notes
    List { researcher: String },
}

fn main() {
    if let Err(err) = run(Args::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> CliResult<()> {
    let mut config = CoreConfig::load(&args.config)?.with_env_overrides()?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    if let Err(err) = init_logging(&config.log_level, &config.resolved_log_dir()) {
        eprintln!("warning: logging disabled: {err}");
    }

    let conn = rcdash_core::db::open_db(config.db_path())?;
    let mut store = EntityStore::open(SqliteCollectionStore::try_new(conn)?, SystemClock)?;
    info!("event=cli_command module=cli status=start command={:?}", args.command);

    match args.command {
        Command::Summary => print_summary(&store),
        Command::List { collection } => {
            print_list(store.snapshot(), parse_kind(&collection)?);
        }
        Command::Export { out } => {
            let document = export_document(store.snapshot())?;
            match out {
                Some(path) => {
                    fs::write(&path, document)?;
                    println!("exported {} records to {}", store.snapshot().len(), path.display());
                }
                None => println!("{document}"),
            }
        }
        Command::Import { file } => {
            let json = fs::read_to_string(&file)?;
            store.import_document(&json)?;
            println!("imported {} records", store.snapshot().len());
        }
        Command::Delete { collection, id } => {
            let target = EntityRef::parse(parse_kind(&collection)?, &id);
            let outcome = store.delete_ref(&target)?;
            if !outcome.removed {
                warn!("event=cli_delete module=cli status=ok removed=false");
                println!("{target} not found; nothing deleted");
                return Ok(());
            }
            println!("deleted {target}");
            for (kind, ids) in &outcome.cascade.edited {
                println!("  updated {}: {}", kind.collection_key(), ids.join(", "));
            }
        }
        Command::Note { action } => match action {
            NoteCommand::Add { researcher, text } => {
                let note = store.add_note(&ResearcherId::from(researcher), text)?;
                println!("added note {}", note.id);
            }
            NoteCommand::List { researcher } => {
                for note in store.notes(&ResearcherId::from(researcher))? {
                    println!(
                        "{}\t{}\t{}",
                        note.id,
                        note.updated_at.format("%Y-%m-%d %H:%M"),
                        note.content
                    );
                }
            }
        },
    }
    Ok(())
}

fn parse_kind(collection: &str) -> CliResult<EntityKind> {
    EntityKind::from_collection_key(collection)
        .ok_or_else(|| format!("unknown collection `{collection}`").into())
}

fn print_summary<S: CollectionStore, C: Clock>(store: &EntityStore<S, C>) {
    let summary = summarize(store.snapshot(), store.clock().today());
    for (kind, count) in &summary.counts {
        println!("{:<18}{count}", kind.collection_key());
    }
    println!("{:<18}{}", "notes", summary.note_count);
    println!("{:<18}{:.2}", "fundedTotal", summary.funded_total);

    if summary.ending_soon.is_empty() {
        println!("no active or awarded grants end within 90 days");
    }
    for deadline in &summary.ending_soon {
        println!(
            "ending soon: {} {} ({} days, {})",
            deadline.grant_id, deadline.title, deadline.days_left, deadline.end_date
        );
    }
    for dangling in &summary.dangling {
        println!(
            "dangling: {} {} -> {}",
            dangling.holder, dangling.field, dangling.target
        );
    }
}

fn print_list(data: &Dataset, kind: EntityKind) {
    let researcher_name = |id: Option<&ResearcherId>| {
        display_or_na(id.and_then(|id| data.find::<Researcher>(id)), |r| r.name.as_str())
    };
    match kind {
        EntityKind::Researcher => {
            for researcher in &data.researchers {
                let lab = display_or_na(
                    researcher
                        .lab_id
                        .as_ref()
                        .and_then(|id| data.find::<Lab>(id)),
                    |lab| lab.name.as_str(),
                );
                println!("{}\t{}\t{lab}", researcher.id, researcher.name);
            }
        }
        EntityKind::Lab => {
            for lab in &data.labs {
                let pi = researcher_name(lab.principal_investigator_id.as_ref());
                println!("{}\t{}\t{pi}\t{} projects", lab.id, lab.name, lab.project_ids.len());
            }
        }
        EntityKind::Project => {
            for project in &data.projects {
                let lead = researcher_name(project.lead_researcher_id.as_ref());
                let end = project
                    .end_date
                    .map_or_else(|| "Ongoing".to_string(), |date| date.to_string());
                println!(
                    "{}\t{}\t{lead}\t{} to {end}",
                    project.id, project.name, project.start_date
                );
            }
        }
        EntityKind::ComputeResource => {
            for resource in &data.compute_resources {
                println!(
                    "{}\t{}\t{:?}\t{:?}",
                    resource.id, resource.name, resource.kind, resource.status
                );
            }
        }
        EntityKind::Grant => {
            for grant in &data.grants {
                let pi = researcher_name(grant.principal_investigator_id.as_ref());
                println!(
                    "{}\t{}\t{pi}\t{:.2}\t{:?}",
                    grant.id, grant.title, grant.amount, grant.status
                );
            }
        }
    }
}
