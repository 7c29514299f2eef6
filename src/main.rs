//! # Career Mentor CLI (`mentor`)
//!
//! The `mentor` binary is the primary interface for Career Mentor. It
//! provides commands for initializing and seeding the knowledge base,
//! searching it, adding new knowledge, inspecting stats, and producing a
//! full resume-optimization plan for a candidate.
//!
//! ## Usage
//!
//! ```bash
//! mentor --config ./config/mentor.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mentor init` | Create the persist directory and seed the knowledge base |
//! | `mentor search "<query>"` | Semantic search with optional role/type filters |
//! | `mentor knowledge "<query>"` | Search split into tips and examples, with fallback |
//! | `mentor add "<content>"` | Insert a tip or example (near-duplicates rejected) |
//! | `mentor stats` | Engine status, document count, embedding dimension |
//! | `mentor roles` | List known job roles and their requirements |
//! | `mentor advise` | Full pipeline: requirements → tips → examples → resume plan |

mod advisor;
mod config;
mod embedding;
mod engine;
mod error;
mod generate;
mod index;
mod models;
mod persist;
mod seed;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::engine::{AddOutcome, RetrievalEngine};
use crate::generate::{Tone, UserProfile};
use crate::models::ContentType;

/// Career Mentor — a local-first semantic retrieval engine for career
/// advice and resume examples.
#[derive(Parser)]
#[command(
    name = "mentor",
    about = "Career Mentor — a local-first semantic retrieval engine for career advice and resume examples",
    version,
    long_about = "Career Mentor keeps career tips and resume-example bullets in a persistent \
    vector index, supports filtered semantic search and duplicate-suppressed insertion, and \
    assembles resume-optimization plans grounded in the retrieved knowledge."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/mentor.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the knowledge base.
    ///
    /// Creates the persist directory and seeds the initial corpus when no
    /// snapshot exists yet. Idempotent — an existing snapshot is loaded,
    /// not overwritten.
    Init,

    /// Search the knowledge base.
    Search {
        /// The search query string.
        query: String,

        /// Filter results to one job role (e.g. "product manager").
        #[arg(long)]
        role: Option<String>,

        /// Filter results to one content type: career_tip or resume_example.
        #[arg(long)]
        content_type: Option<ContentType>,

        /// Maximum number of results to return.
        #[arg(long, default_value_t = 5)]
        limit: usize,

        /// Print results as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Search the knowledge base, split into tips and examples.
    ///
    /// A degraded or empty knowledge base answers from the built-in
    /// role dictionaries instead.
    Knowledge {
        /// The search query string.
        query: String,

        /// Bias fallback content toward one job role.
        #[arg(long)]
        role: Option<String>,

        /// Print results as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Add a knowledge snippet.
    ///
    /// Near-duplicates of existing content (similarity above the
    /// configured threshold) are rejected.
    Add {
        /// The tip or resume bullet to store.
        content: String,

        /// Job role the content relates to.
        #[arg(long)]
        role: String,

        /// Content type: career_tip or resume_example.
        #[arg(long)]
        content_type: ContentType,

        /// Provenance tag recorded in the metadata.
        #[arg(long, default_value = "user_added")]
        source: String,
    },

    /// Show engine status, document count, and embedding dimension.
    Stats {
        /// Print stats as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// List known job roles and their skill requirements.
    Roles,

    /// Produce a resume-optimization plan for a candidate.
    ///
    /// Retrieves role requirements, career tips, and resume examples,
    /// analyzes skill gaps, and generates tailored bullets (falling back
    /// to example-based assembly when generation is unavailable).
    Advise {
        /// Candidate name.
        #[arg(long)]
        name: String,

        /// Target job role.
        #[arg(long)]
        role: String,

        /// Current skills, comma-separated.
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,

        /// Tone preference: professional or creative.
        #[arg(long, default_value = "professional")]
        tone: Tone,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let engine = RetrievalEngine::open(config).await;
            let stats = engine.stats();
            println!("Knowledge base ready.");
            println!("  Status:     {}", stats.status);
            println!("  Documents:  {}", stats.count);
            println!("  Dimension:  {}", stats.dimension);
        }

        Commands::Search {
            query,
            role,
            content_type,
            limit,
            json,
        } => {
            let engine = RetrievalEngine::open(config).await;
            let hits = engine
                .search(&query, role.as_deref(), content_type, limit)
                .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else if hits.is_empty() {
                println!("No results.");
            } else {
                for (i, hit) in hits.iter().enumerate() {
                    println!(
                        "{}. [{:.3}] {} / {}",
                        i + 1,
                        hit.score,
                        hit.metadata.job_role,
                        hit.metadata.content_type
                    );
                    println!("    {}", hit.document);
                    println!("    source: {}", hit.metadata.source);
                    println!();
                }
            }
        }

        Commands::Knowledge { query, role, json } => {
            let retrieval = config.retrieval.clone();
            let engine = RetrievalEngine::open(config).await;
            let result =
                advisor::search_knowledge(&engine, &retrieval, &query, role.as_deref()).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Search method: {}", result.search_method.as_str());
                println!();
                println!("Career tips:");
                for (i, tip) in result.career_tips.iter().enumerate() {
                    match result.tip_scores.get(i) {
                        Some(score) => println!("  {}. [{score:.3}] {tip}", i + 1),
                        None => println!("  {}. {tip}", i + 1),
                    }
                }
                println!();
                println!("Resume examples:");
                for (i, example) in result.resume_examples.iter().enumerate() {
                    match result.example_scores.get(i) {
                        Some(score) => println!("  {}. [{score:.3}] {example}", i + 1),
                        None => println!("  {}. {example}", i + 1),
                    }
                }
            }
        }

        Commands::Add {
            content,
            role,
            content_type,
            source,
        } => {
            let mut engine = RetrievalEngine::open(config).await;
            match engine.add(&content, &role, content_type, &source).await {
                AddOutcome::Added => {
                    println!("Added {} for {}.", content_type, models::normalize_role(&role));
                }
                AddOutcome::Duplicate => {
                    println!("Rejected: similar content already exists.");
                }
                AddOutcome::Unavailable => {
                    println!("Knowledge base unavailable; nothing added.");
                }
                AddOutcome::Failed => {
                    println!("Could not add content: embedding failed. See logs for details.");
                }
            }
        }

        Commands::Stats { json } => {
            let engine = RetrievalEngine::open(config).await;
            let stats = engine.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Career Mentor — Knowledge Base Stats");
                println!("====================================");
                println!();
                println!("  Status:     {}", stats.status);
                println!("  Documents:  {}", stats.count);
                println!("  Dimension:  {}", stats.dimension);
            }
        }

        Commands::Roles => {
            for role in advisor::all_roles() {
                let reqs = advisor::job_requirements(role);
                println!("{}", reqs.role);
                println!("  required:     {}", reqs.required_skills.join(", "));
                println!("  nice to have: {}", reqs.nice_to_have.join(", "));
                println!();
            }
        }

        Commands::Advise {
            name,
            role,
            skills,
            tone,
        } => {
            let retrieval = config.retrieval.clone();
            let generation = config.generation.clone();
            let engine = RetrievalEngine::open(config).await;

            let profile = UserProfile {
                name,
                skills: skills
                    .iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                target_role: role.clone(),
                tone,
            };

            let requirements = advisor::job_requirements(&role);
            let tips = advisor::career_tips(&engine, &retrieval, &role).await;
            let examples = advisor::resume_examples(&engine, &retrieval, &role).await;
            let gaps = advisor::skill_gaps(&profile.skills, &requirements.required_skills);

            let plan = match generate::generate_plan(&generation, &profile, &requirements, &tips)
                .await
            {
                Ok(plan) => plan,
                Err(e) => {
                    eprintln!("Generation unavailable ({e}); using example-based plan.");
                    generate::fallback_plan(&profile, &examples, gaps.clone())
                }
            };

            println!("Candidate:   {}", profile.name);
            println!("Target role: {}", requirements.role);
            println!("Tone:        {}", profile.tone.as_str());
            println!();
            println!("{}", serde_json::to_string_pretty(&plan)?);
            println!();
            println!("Top career tips:");
            for (i, tip) in tips.iter().take(3).enumerate() {
                println!("  {}. {}", i + 1, tip);
            }
            if !gaps.is_empty() {
                println!();
                println!("Skill gaps to close: {}", gaps.join(", "));
            }
        }
    }

    Ok(())
}
