mod db;
mod error;
mod export;
mod models;
mod saved;
mod search;
mod session;
mod tui;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use db::Database;
use models::{
    Candidate, CandidateFilters, Domain, FilterSet, Opening, OpeningFilters, PageRequest,
    SearchResult, SkillMatchMode, SortDirection,
};
use saved::SavedSearchRepository;
use search::{CandidateDomain, OpeningDomain, SearchClient, SearchDomain};
use session::SearchSession;

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "Recruitment search from the terminal - filter, page, save, and export")]
struct Cli {
    /// Backend server URL (or set SCOUT_SERVER)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Path to bearer token file (or set SCOUT_TOKEN)
    #[arg(long, global = true)]
    token_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search candidates
    Candidates(CandidateArgs),

    /// Search job openings
    Openings(OpeningArgs),

    /// Run a text query across both domains
    All {
        /// Query text
        query: String,
    },

    /// Manage saved searches
    Saved {
        #[command(subcommand)]
        command: SavedCommands,
    },

    /// Browse both domains interactively
    Browse,
}

#[derive(Args)]
struct CandidateArgs {
    /// Free-text query (name, email, skills)
    #[arg(short, long)]
    query: Option<String>,

    /// Primary skill (repeatable)
    #[arg(long = "skill")]
    skills: Vec<String>,

    /// Require all primary skills instead of any
    #[arg(long)]
    match_all: bool,

    /// Secondary skill (repeatable)
    #[arg(long = "secondary-skill")]
    secondary_skills: Vec<String>,

    /// Location (repeatable)
    #[arg(long = "location")]
    locations: Vec<String>,

    /// Candidate status (repeatable: PENDING, INTERESTED, CONTACTED, ...)
    #[arg(long = "status")]
    statuses: Vec<String>,

    /// Sourcing channel (repeatable)
    #[arg(long = "source")]
    sources: Vec<String>,

    /// Minimum years of experience
    #[arg(long)]
    min_experience: Option<u32>,

    /// Maximum years of experience
    #[arg(long)]
    max_experience: Option<u32>,

    /// Minimum current package (LPA)
    #[arg(long)]
    min_package: Option<f64>,

    /// Maximum current package (LPA)
    #[arg(long)]
    max_package: Option<f64>,

    /// Minimum expected CTC (LPA)
    #[arg(long)]
    min_expected_ctc: Option<f64>,

    /// Maximum expected CTC (LPA)
    #[arg(long)]
    max_expected_ctc: Option<f64>,

    /// Created on or after (YYYY-MM-DD)
    #[arg(long)]
    created_from: Option<NaiveDate>,

    /// Created on or before (YYYY-MM-DD)
    #[arg(long)]
    created_to: Option<NaiveDate>,

    /// Start from a saved search id; flags override its fields
    #[arg(long)]
    load: Option<i64>,

    /// Save these filters under a name before searching
    #[arg(long, value_name = "NAME")]
    save_as: Option<String>,

    /// Print the request payload without searching
    #[arg(long)]
    dry_run: bool,

    /// Write the result page to CSV
    #[arg(long)]
    export: bool,

    /// CSV output path (defaults to candidates_search_results_<date>.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    page: PageArgs,
}

#[derive(Args)]
struct OpeningArgs {
    /// Free-text query (title, description, skills)
    #[arg(short, long)]
    query: Option<String>,

    /// Department (repeatable)
    #[arg(long = "department")]
    departments: Vec<String>,

    /// Opening type (repeatable: Full-Time, Part-Time, Contract, ...)
    #[arg(long = "type")]
    types: Vec<String>,

    /// Location (repeatable)
    #[arg(long = "location")]
    locations: Vec<String>,

    /// Required skill (repeatable)
    #[arg(long = "skill")]
    skills: Vec<String>,

    /// Opening status (repeatable: ACTIVE, INACTIVE, CLOSED)
    #[arg(long = "status")]
    statuses: Vec<String>,

    /// Minimum years of experience
    #[arg(long)]
    min_experience: Option<u32>,

    /// Maximum years of experience
    #[arg(long)]
    max_experience: Option<u32>,

    /// Minimum salary (LPA)
    #[arg(long)]
    min_salary: Option<f64>,

    /// Maximum salary (LPA)
    #[arg(long)]
    max_salary: Option<f64>,

    /// Created on or after (YYYY-MM-DD)
    #[arg(long)]
    created_from: Option<NaiveDate>,

    /// Created on or before (YYYY-MM-DD)
    #[arg(long)]
    created_to: Option<NaiveDate>,

    /// Start from a saved search id; flags override its fields
    #[arg(long)]
    load: Option<i64>,

    /// Save these filters under a name before searching
    #[arg(long, value_name = "NAME")]
    save_as: Option<String>,

    /// Print the request payload without searching
    #[arg(long)]
    dry_run: bool,

    /// Write the result page to CSV
    #[arg(long)]
    export: bool,

    /// CSV output path (defaults to openings_search_results_<date>.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    page: PageArgs,
}

#[derive(Args)]
struct PageArgs {
    /// Page number (0-based)
    #[arg(long, default_value = "0")]
    page: u32,

    /// Page size
    #[arg(long, default_value = "20")]
    size: u32,

    /// Sort field
    #[arg(long, default_value = "createdAt")]
    sort_by: String,

    /// Sort ascending (default is descending)
    #[arg(long)]
    asc: bool,
}

impl PageArgs {
    fn to_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            size: self.size,
            sort_by: self.sort_by.clone(),
            sort_direction: if self.asc {
                SortDirection::Asc
            } else {
                SortDirection::Desc
            },
        }
    }
}

#[derive(Subcommand)]
enum SavedCommands {
    /// List saved searches for a domain
    List {
        /// Domain (candidates or openings)
        #[arg(short, long, default_value = "candidates")]
        domain: String,
    },

    /// Show a saved search's filters
    Show {
        /// Saved search id
        id: i64,

        /// Domain (candidates or openings)
        #[arg(short, long, default_value = "candidates")]
        domain: String,
    },

    /// Delete a saved search
    Delete {
        /// Saved search id
        id: i64,

        /// Domain (candidates or openings)
        #[arg(short, long, default_value = "candidates")]
        domain: String,
    },

    /// Load a saved search and run it
    Run {
        /// Saved search id
        id: i64,

        /// Domain (candidates or openings)
        #[arg(short, long, default_value = "candidates")]
        domain: String,

        /// Write the result page to CSV
        #[arg(long)]
        export: bool,

        /// CSV output path
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        page: PageArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let repo = SavedSearchRepository::new(Database::open()?);

    match cli.command {
        Commands::Candidates(args) => {
            let filters = candidate_filters(&args, &repo)?;
            let page = args.page.to_request();

            if args.dry_run {
                let body = CandidateDomain::request_body(&filters, &page);
                println!("{}", serde_json::to_string_pretty(&body)?);
                return Ok(());
            }

            if let Some(name) = &args.save_as {
                let saved = repo.save::<CandidateDomain>(name, &filters)?;
                println!("Saved search '{}' (id {})", saved.name, saved.id);
            }

            let client = build_client(&cli.server, &cli.token_file)?;
            let results = client
                .execute::<CandidateDomain>(&filters, &page)
                .context("Candidate search failed")?;
            print_candidates(&results);

            if args.export {
                let path = export_candidates(&results.content, args.output)?;
                println!("Exported {} row(s) to {}", results.content.len(), path.display());
            }
        }

        Commands::Openings(args) => {
            let filters = opening_filters(&args, &repo)?;
            let page = args.page.to_request();

            if args.dry_run {
                let body = OpeningDomain::request_body(&filters, &page);
                println!("{}", serde_json::to_string_pretty(&body)?);
                return Ok(());
            }

            if let Some(name) = &args.save_as {
                let saved = repo.save::<OpeningDomain>(name, &filters)?;
                println!("Saved search '{}' (id {})", saved.name, saved.id);
            }

            let client = build_client(&cli.server, &cli.token_file)?;
            let results = client
                .execute::<OpeningDomain>(&filters, &page)
                .context("Opening search failed")?;
            print_openings(&results);

            if args.export {
                let path = export_openings(&results.content, args.output)?;
                println!("Exported {} row(s) to {}", results.content.len(), path.display());
            }
        }

        Commands::All { query } => {
            let client = build_client(&cli.server, &cli.token_file)?;
            let page = PageRequest::default();

            let filters = CandidateFilters {
                text_query: query.clone(),
                ..Default::default()
            };
            match client.execute::<CandidateDomain>(&filters, &page) {
                Ok(results) => {
                    println!("Candidates: {} match(es)", results.total_elements);
                    for candidate in results.content.iter().take(5) {
                        println!(
                            "  {} | {}",
                            truncate(&candidate.full_name(), 30),
                            candidate.current_location.as_deref().unwrap_or("-")
                        );
                    }
                }
                Err(err) => eprintln!("Candidates: search failed: {}", err),
            }

            let filters = OpeningFilters {
                text_query: query,
                ..Default::default()
            };
            match client.execute::<OpeningDomain>(&filters, &page) {
                Ok(results) => {
                    println!("Openings: {} match(es)", results.total_elements);
                    for opening in results.content.iter().take(5) {
                        println!(
                            "  {} | {}",
                            truncate(opening.title.as_deref().unwrap_or("(untitled)"), 30),
                            opening.department.as_deref().unwrap_or("-")
                        );
                    }
                }
                Err(err) => eprintln!("Openings: search failed: {}", err),
            }
        }

        Commands::Saved { command } => match command {
            SavedCommands::List { domain } => match parse_domain(&domain)? {
                Domain::Candidates => print_saved_list(&repo.list::<CandidateDomain>()),
                Domain::Openings => print_saved_list(&repo.list::<OpeningDomain>()),
            },

            SavedCommands::Show { id, domain } => match parse_domain(&domain)? {
                Domain::Candidates => {
                    let filters = repo.load::<CandidateDomain>(id)?;
                    println!("{}", serde_json::to_string_pretty(&filters)?);
                }
                Domain::Openings => {
                    let filters = repo.load::<OpeningDomain>(id)?;
                    println!("{}", serde_json::to_string_pretty(&filters)?);
                }
            },

            SavedCommands::Delete { id, domain } => {
                let removed = match parse_domain(&domain)? {
                    Domain::Candidates => repo.delete::<CandidateDomain>(id)?,
                    Domain::Openings => repo.delete::<OpeningDomain>(id)?,
                };
                if removed {
                    println!("Deleted saved search {}", id);
                } else {
                    println!("No saved search with id {}", id);
                }
            }

            SavedCommands::Run {
                id,
                domain,
                export,
                output,
                page,
            } => {
                let client = build_client(&cli.server, &cli.token_file)?;
                let page = page.to_request();
                match parse_domain(&domain)? {
                    Domain::Candidates => {
                        let filters = repo.load::<CandidateDomain>(id)?;
                        let results = client
                            .execute::<CandidateDomain>(&filters, &page)
                            .context("Candidate search failed")?;
                        print_candidates(&results);
                        if export {
                            let path = export_candidates(&results.content, output)?;
                            println!(
                                "Exported {} row(s) to {}",
                                results.content.len(),
                                path.display()
                            );
                        }
                    }
                    Domain::Openings => {
                        let filters = repo.load::<OpeningDomain>(id)?;
                        let results = client
                            .execute::<OpeningDomain>(&filters, &page)
                            .context("Opening search failed")?;
                        print_openings(&results);
                        if export {
                            let path = export_openings(&results.content, output)?;
                            println!(
                                "Exported {} row(s) to {}",
                                results.content.len(),
                                path.display()
                            );
                        }
                    }
                }
            }
        },

        Commands::Browse => {
            let client = build_client(&cli.server, &cli.token_file)?;
            let mut session = SearchSession::new();
            tui::run_browse(&mut session, &client)?;
        }
    }

    Ok(())
}

fn candidate_filters(
    args: &CandidateArgs,
    repo: &SavedSearchRepository<Database>,
) -> Result<CandidateFilters> {
    let mut filters = match args.load {
        Some(id) => repo.load::<CandidateDomain>(id)?,
        None => CandidateFilters::default(),
    };
    if let Some(query) = &args.query {
        filters.text_query = query.clone();
    }
    if !args.skills.is_empty() {
        filters.primary_skills = args.skills.clone();
    }
    if args.match_all {
        filters.skill_match_mode = SkillMatchMode::All;
    }
    if !args.secondary_skills.is_empty() {
        filters.secondary_skills = args.secondary_skills.clone();
    }
    if !args.locations.is_empty() {
        filters.locations = args.locations.clone();
    }
    if !args.statuses.is_empty() {
        filters.statuses = args.statuses.clone();
    }
    if !args.sources.is_empty() {
        filters.sources = args.sources.clone();
    }
    if args.min_experience.is_some() {
        filters.min_experience = args.min_experience;
    }
    if args.max_experience.is_some() {
        filters.max_experience = args.max_experience;
    }
    if args.min_package.is_some() {
        filters.min_current_package = args.min_package;
    }
    if args.max_package.is_some() {
        filters.max_current_package = args.max_package;
    }
    if args.min_expected_ctc.is_some() {
        filters.min_expected_ctc = args.min_expected_ctc;
    }
    if args.max_expected_ctc.is_some() {
        filters.max_expected_ctc = args.max_expected_ctc;
    }
    if args.created_from.is_some() {
        filters.created_from = args.created_from;
    }
    if args.created_to.is_some() {
        filters.created_to = args.created_to;
    }
    Ok(filters)
}

fn opening_filters(
    args: &OpeningArgs,
    repo: &SavedSearchRepository<Database>,
) -> Result<OpeningFilters> {
    let mut filters = match args.load {
        Some(id) => repo.load::<OpeningDomain>(id)?,
        None => OpeningFilters::default(),
    };
    if let Some(query) = &args.query {
        filters.text_query = query.clone();
    }
    if !args.departments.is_empty() {
        filters.departments = args.departments.clone();
    }
    if !args.types.is_empty() {
        filters.types = args.types.clone();
    }
    if !args.locations.is_empty() {
        filters.locations = args.locations.clone();
    }
    if !args.skills.is_empty() {
        filters.skills = args.skills.clone();
    }
    if !args.statuses.is_empty() {
        filters.statuses = args.statuses.clone();
    }
    if args.min_experience.is_some() {
        filters.min_experience = args.min_experience;
    }
    if args.max_experience.is_some() {
        filters.max_experience = args.max_experience;
    }
    if args.min_salary.is_some() {
        filters.min_salary = args.min_salary;
    }
    if args.max_salary.is_some() {
        filters.max_salary = args.max_salary;
    }
    if args.created_from.is_some() {
        filters.created_from = args.created_from;
    }
    if args.created_to.is_some() {
        filters.created_to = args.created_to;
    }
    Ok(filters)
}

fn build_client(server: &Option<String>, token_file: &Option<String>) -> Result<SearchClient> {
    let server = match server {
        Some(server) => server.clone(),
        None => std::env::var("SCOUT_SERVER")
            .unwrap_or_else(|_| "http://localhost:8080".to_string()),
    };
    Ok(SearchClient::new(&server, resolve_token(token_file))?)
}

fn resolve_token(token_file: &Option<String>) -> Option<String> {
    if let Ok(token) = std::env::var("SCOUT_TOKEN") {
        let token = token.trim().to_string();
        if !token.is_empty() {
            return Some(token);
        }
    }

    // Expand ~ in path
    let path = match token_file {
        Some(path) if path.starts_with("~/") => {
            let home = std::env::var("HOME").unwrap_or_default();
            PathBuf::from(format!("{}/{}", home, &path[2..]))
        }
        Some(path) => PathBuf::from(path),
        None => {
            let home = std::env::var("HOME").unwrap_or_default();
            PathBuf::from(format!("{}/.scout.token", home))
        }
    };

    std::fs::read_to_string(&path)
        .ok()
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn parse_domain(name: &str) -> Result<Domain> {
    match name.to_lowercase().as_str() {
        "candidates" | "candidate" => Ok(Domain::Candidates),
        "openings" | "opening" => Ok(Domain::Openings),
        other => anyhow::bail!("Unknown domain '{}'. Use candidates or openings.", other),
    }
}

fn print_candidates(results: &SearchResult<Candidate>) {
    if results.content.is_empty() {
        println!("No candidates found.");
    } else {
        println!(
            "{:<28} {:<26} {:<14} {:>4} {:<12}",
            "NAME", "EMAIL", "LOCATION", "EXP", "STATUS"
        );
        println!("{}", "-".repeat(88));
        for candidate in &results.content {
            println!(
                "{:<28} {:<26} {:<14} {:>4} {:<12}",
                truncate(&candidate.full_name(), 26),
                truncate(candidate.email.as_deref().unwrap_or("-"), 24),
                truncate(candidate.current_location.as_deref().unwrap_or("-"), 12),
                candidate.experience.as_deref().unwrap_or("-"),
                candidate.status.as_deref().unwrap_or("-"),
            );
        }
    }
    print_page_summary(
        results.page,
        results.total_pages,
        results.total_elements,
        results.search_time_ms,
    );
}

fn print_openings(results: &SearchResult<Opening>) {
    if results.content.is_empty() {
        println!("No openings found.");
    } else {
        println!(
            "{:<30} {:<16} {:<12} {:<14} {:<10}",
            "TITLE", "DEPARTMENT", "TYPE", "SALARY", "STATUS"
        );
        println!("{}", "-".repeat(86));
        for opening in &results.content {
            println!(
                "{:<30} {:<16} {:<12} {:<14} {:<10}",
                truncate(opening.title.as_deref().unwrap_or("(untitled)"), 28),
                truncate(opening.department.as_deref().unwrap_or("-"), 14),
                truncate(opening.opening_type.as_deref().unwrap_or("-"), 10),
                truncate(&opening.salary_range(), 12),
                opening.status.as_deref().unwrap_or("-"),
            );
        }
    }
    print_page_summary(
        results.page,
        results.total_pages,
        results.total_elements,
        results.search_time_ms,
    );
}

fn print_page_summary(page: u32, total_pages: u32, total_elements: u64, search_time_ms: u64) {
    println!(
        "\nPage {}/{} - {} match(es) in {}ms",
        page + 1,
        total_pages.max(1),
        total_elements,
        search_time_ms
    );
}

fn print_saved_list<F: FilterSet>(entries: &[models::SavedSearch<F>]) {
    if entries.is_empty() {
        println!("No saved searches.");
        return;
    }
    println!("{:<16} {:<24} {:>8} {:<18}", "ID", "NAME", "FILTERS", "SAVED");
    println!("{}", "-".repeat(68));
    for entry in entries {
        println!(
            "{:<16} {:<24} {:>8} {:<18}",
            entry.id,
            truncate(&entry.name, 22),
            entry.filters.active_count(),
            entry.saved_at.format("%Y-%m-%d %H:%M"),
        );
    }
}

fn export_candidates(rows: &[Candidate], output: Option<PathBuf>) -> Result<PathBuf> {
    let path = output.unwrap_or_else(|| {
        PathBuf::from(export::export_filename(
            Domain::Candidates,
            Local::now().date_naive(),
        ))
    });
    std::fs::write(&path, export::candidates_to_csv(rows))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn export_openings(rows: &[Opening], output: Option<PathBuf>) -> Result<PathBuf> {
    let path = output.unwrap_or_else(|| {
        PathBuf::from(export::export_filename(
            Domain::Openings,
            Local::now().date_naive(),
        ))
    });
    std::fs::write(&path, export::openings_to_csv(rows))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}
