use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde_json::{Value, json};
use std::path::PathBuf;

use vault_backend::Result;
use vault_backend::assistant::{identify_knowledge_gaps, suggest_review_schedule};
use vault_backend::config::{Config, defaults, env_vars, threshold_arg};
use vault_backend::intelligence::VaultSession;
use vault_backend::memory::{ConceptMemory, extract_concepts};
use vault_backend::organizer::KnowledgeOrganizer;
use vault_backend::templates::{daily_note_plan, weekly_review_plan};

#[derive(Parser)]
#[command(name = "vault-backend")]
#[command(about = "Notes, templates, concept memory and vault intelligence for a markdown vault")]
struct Cli {
    /// Vault root directory
    #[arg(long, env = env_vars::VAULT_PATH)]
    vault: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Notes lexically similar to a note
    Similar {
        path: String,
        #[arg(long, value_parser = threshold_arg)]
        threshold: Option<f64>,
        #[arg(long, default_value_t = defaults::SIMILAR_LIMIT)]
        limit: usize,
    },

    /// Notes mentioned in a note's content but not linked yet
    BacklinksSuggest { path: String },

    /// Pairs of near-identical notes
    Duplicates {
        #[arg(long, value_parser = threshold_arg)]
        threshold: Option<f64>,
    },

    /// Notes with no backlinks and at most one outgoing link
    Orphans,

    /// Tag clusters and knowledge hubs
    Clusters,

    /// Vault health scores and recommendations
    Health,

    /// Read a note
    Read { path: String },

    /// Create or overwrite a note
    Write {
        path: String,
        #[arg(long)]
        content: String,
        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
        #[arg(long, default_value = "")]
        title: String,
    },

    /// Search note names and content
    Search {
        query: String,
        #[arg(long, default_value_t = defaults::SEARCH_LIMIT)]
        limit: usize,
    },

    /// Search restricted by frontmatter filters
    AdvancedSearch {
        query: String,
        /// Comma-separated filters, e.g. template:research,created:2024,tags:ai
        #[arg(long, default_value = "")]
        filters: String,
        #[arg(long, default_value_t = defaults::SEARCH_LIMIT)]
        limit: usize,
    },

    /// List notes in a folder
    List {
        #[arg(long, default_value = "")]
        folder: String,
        /// Only the folder itself, not subfolders
        #[arg(long)]
        shallow: bool,
    },

    /// Notes linking to a note
    Backlinks { path: String },

    /// Note, word and tag counts
    Stats,

    /// Available templates and their variables
    Templates,

    /// Create a note from a template
    CreateFromTemplate {
        path: String,
        #[arg(long)]
        template: String,
        #[arg(long, default_value = "")]
        project: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long, default_value = "")]
        tags: String,
    },

    /// Create today's (or the given day's) daily note
    Daily {
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Create this week's review note
    Weekly,

    /// Counts and top concepts in memory
    ConceptsSummary,

    /// Everything remembered about a concept
    Recall {
        concept: String,
        #[arg(long, default_value_t = defaults::RECALL_DAYS)]
        days: i64,
    },

    /// Store a conversation insight
    Remember {
        content: String,
        #[arg(long, default_value = "general")]
        insight_type: String,
        #[arg(long, default_value_t = 0.5)]
        importance: f64,
        #[arg(long)]
        conversation_id: Option<String>,
    },

    /// Related concepts from memory not mentioned in the text
    Forgotten { text: String },

    /// Shallowly explored concepts and disconnected notes
    Gaps,

    /// Important concepts worth revisiting
    ReviewSchedule,

    /// Content categories and tag hierarchy
    Organize,

    /// Task completion across the vault
    Progress,
}

fn main() {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(vault) = cli.vault {
        config.vault_path = vault;
    }

    match run(&config, cli.command) {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                log::error!("Failed to format output: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn run(config: &Config, command: Commands) -> Result<Value> {
    let session = VaultSession::open(&config.vault_path)?;

    let output = match command {
        Commands::Similar { path, threshold, limit } => {
            let threshold = threshold.unwrap_or(config.similarity_threshold);
            json!(session.intelligence()?.find_similar_notes(&path, threshold, limit))
        }
        Commands::BacklinksSuggest { path } => {
            json!(session.intelligence()?.suggest_missing_backlinks(&path))
        }
        Commands::Duplicates { threshold } => {
            let threshold = threshold.unwrap_or(config.duplicate_threshold);
            json!(session.intelligence()?.detect_duplicate_content(threshold))
        }
        Commands::Orphans => json!(session.intelligence()?.identify_orphaned_notes()),
        Commands::Clusters => json!(session.intelligence()?.analyze_knowledge_clusters()),
        Commands::Health => json!(session.intelligence()?.get_vault_health_report()),

        Commands::Read { path } => json!(session.notes().read_note(&path)?),
        Commands::Write { path, content, tags, title } => {
            json!({ "path": session.write_note(&path, &content, &tags, &title)? })
        }
        Commands::Search { query, limit } => json!(session.notes().search_notes(&query, limit)?),
        Commands::AdvancedSearch { query, filters, limit } => {
            json!(session.notes().advanced_search(&query, &filters, limit)?)
        }
        Commands::List { folder, shallow } => json!(session.notes().list_notes(&folder, !shallow)?),
        Commands::Backlinks { path } => json!(session.notes().get_backlinks(&path)?),
        Commands::Stats => json!(session.notes().vault_stats()?),

        Commands::Templates => json!(session.templates().template_info()),
        Commands::CreateFromTemplate { path, template, project, content, tags } => {
            json!({ "path": session.create_structured_note(&path, &template, &project, &content, &tags)? })
        }
        Commands::Daily { date } => {
            let plan = daily_note_plan(date, Local::now().date_naive());
            let path = session.create_structured_note(&plan.path, &plan.template, "", "", &plan.suggested_tags)?;
            json!({ "path": path, "plan": plan })
        }
        Commands::Weekly => {
            let plan = weekly_review_plan(Local::now().date_naive());
            let path = session.create_structured_note(&plan.path, &plan.template, "", "", &plan.suggested_tags)?;
            json!({ "path": path, "plan": plan })
        }

        Commands::ConceptsSummary => json!(open_memory(config)?.get_knowledge_summary()?),
        Commands::Recall { concept, days } => {
            match open_memory(config)?.recall_concept_history(&concept, days)? {
                Some(history) => json!(history),
                None => json!({ "error": format!("No information found for concept: {}", concept) }),
            }
        }
        Commands::Remember { content, insight_type, importance, conversation_id } => {
            let memory = open_memory(config)?;
            let id = memory.store_conversation_insight(
                &content,
                &insight_type,
                importance,
                conversation_id.as_deref(),
            )?;
            json!({ "conversation_id": id, "concepts": extract_concepts(&content) })
        }
        Commands::Forgotten { text } => {
            let concepts = extract_concepts(&text);
            json!(open_memory(config)?.suggest_forgotten_connections(&concepts)?)
        }

        Commands::Gaps => {
            let intelligence = session.intelligence()?;
            json!(identify_knowledge_gaps(&open_memory(config)?, Some(&*intelligence))?)
        }
        Commands::ReviewSchedule => json!(suggest_review_schedule(&open_memory(config)?)?),

        Commands::Organize => {
            let organizer = KnowledgeOrganizer::new(&config.vault_path)?;
            json!({
                "categories": organizer.categorize_notes_by_content()?,
                "tag_hierarchy": organizer.create_tag_hierarchy()?,
            })
        }
        Commands::Progress => json!(KnowledgeOrganizer::new(&config.vault_path)?.progress_summary()?),
    };

    Ok(output)
}

fn open_memory(config: &Config) -> Result<ConceptMemory> {
    ConceptMemory::open(&config.memory_db_path())
}
