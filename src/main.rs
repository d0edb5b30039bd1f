//! # df-skilldb
//!
//! Builds the local skill cache from the Dungeon & Fighter open API and
//! answers skill / cast-time queries against it.

use anyhow::{Context, Result, bail};
use clap::Parser;
use df_skilldb::api::{GameApi, NeopleClient};
use df_skilldb::config::{API_KEY_VAR, Config, DATA_PATH_VAR};
use df_skilldb::jobs::{self, Catalog};
use df_skilldb::model::CharacterStats;
use df_skilldb::skill::{self, FullSkill};
use df_skilldb::skill_db::SkillDatabase;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "df-skilldb: caches Dungeon & Fighter skill data as JSON files and computes\n\
                  skill cast times from character speed stats."
)]
struct Args {
    /// Neople open API key
    #[arg(long, env = API_KEY_VAR, hide_env_values = true)]
    api_key: Option<String>,

    /// Root directory of the skill cache
    #[arg(short, long, env = DATA_PATH_VAR)]
    data_path: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Show all paths used by the application and exit
    #[arg(long)]
    config: bool,

    /// Job grow id of the skill to show
    #[arg(short, long, requires = "skill")]
    job_grow: Option<String>,

    /// Skill id to show
    #[arg(short, long, requires = "job_grow")]
    skill: Option<String>,

    /// Only print this level's option values
    #[arg(short, long)]
    level: Option<u32>,

    /// Server id of the character whose stats to use (e.g. cain)
    #[arg(long, requires = "character")]
    server: Option<String>,

    /// Character name to look up on --server
    #[arg(long, requires = "server")]
    character: Option<String>,

    /// Print the character's skill-style tree
    #[arg(long, requires = "character")]
    skill_style: bool,

    /// Attack speed bonus in percent (overrides the character's)
    #[arg(long)]
    attack_speed: Option<f64>,

    /// Cast speed bonus in percent (overrides the character's)
    #[arg(long)]
    cast_speed: Option<f64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.config {
        println!("{}", config_summary(&args));
        return Ok(());
    }

    let config = Config::new(
        args.api_key.clone(),
        args.data_path.clone(),
        Some(Duration::from_secs(args.timeout_secs)),
    )
    .context("configuration incomplete; set it via flags or the environment")?;

    let client = NeopleClient::new(&config).context("failed to build HTTP client")?;
    let catalog = jobs::resolve_jobs(&client).context("failed to fetch job list")?;

    let mut db = SkillDatabase::new(&config.data_path);
    db.populate(&client, &catalog)
        .context("failed to prepare skill cache")?;

    let mut stats = CharacterStats::default();
    if let (Some(server), Some(name)) = (&args.server, &args.character) {
        let character_id = client
            .character_id(server, name)
            .with_context(|| format!("character {name} not found on {server}"))?;
        let status = client.character_status(server, &character_id)?;
        stats = CharacterStats::from_status(&status);
        println!(
            "{name} ({character_id}): attack speed {:.1}%, cast speed {:.1}%",
            stats.attack_speed, stats.cast_speed
        );

        if args.skill_style {
            let style = client.character_skill_style(server, &character_id)?;
            println!("{}", serde_json::to_string_pretty(&style)?);
        }
    }
    if let Some(v) = args.attack_speed {
        stats.attack_speed = v;
    }
    if let Some(v) = args.cast_speed {
        stats.cast_speed = v;
    }

    if let (Some(job_grow_id), Some(skill_id)) = (&args.job_grow, &args.skill) {
        let meta_path = match job_grow_name(&catalog, job_grow_id) {
            Some(name) => config.meta_path().join(format!("{name}.json")),
            None => bail!("unknown job grow id: {job_grow_id}"),
        };
        let meta = skill::load_meta_file(&meta_path)
            .with_context(|| format!("failed to read {}", meta_path.display()))?;
        let full = skill::load_full_skill(&db, &meta, job_grow_id, skill_id)?;
        print_skill(&full, &stats, args.level);
    } else if !args.skill_style {
        println!(
            "Cached {} job grows under {}",
            db.len(),
            db.data_path().display()
        );
    }

    Ok(())
}

/// Describes the configured locations. Needs no API key, so it works before
/// the rest of the configuration is in place.
fn config_summary(args: &Args) -> String {
    let mut lines = Vec::new();
    match &args.data_path {
        Some(path) => {
            lines.push(format!("Data directory: {}", path.display()));
            lines.push(format!("Meta directory: {}", path.join("meta").display()));
        }
        None => lines.push(format!(
            "Data directory: (not set, use --data-path or {DATA_PATH_VAR})"
        )),
    }
    lines.push(format!("API endpoint:   {}", df_skilldb::api::BASE_URL));
    let key_state = if args.api_key.is_some() { "set" } else { "not set" };
    lines.push(format!("API key:        {key_state} ({API_KEY_VAR})"));
    lines.join("\n")
}

fn job_grow_name<'a>(catalog: &'a Catalog, job_grow_id: &str) -> Option<&'a str> {
    catalog
        .values()
        .find_map(|job| job.job_grows.get(job_grow_id))
        .map(String::as_str)
}

fn print_skill(full: &FullSkill, stats: &CharacterStats, level: Option<u32>) {
    let data = &full.data;
    println!("{} [{}] {:?}", data.name, data.skill_id, data.skill_type);
    println!("{}", data.description);

    for (lv, info) in &data.levels {
        if level.is_some_and(|wanted| wanted != *lv) {
            continue;
        }
        let values = info
            .values
            .iter()
            .map(|(key, v)| match v {
                Some(v) => format!("{key}={v}"),
                None => format!("{key}=-"),
            })
            .collect::<Vec<_>>()
            .join(" ");
        println!("  Lv.{lv:<3} {values}");
    }

    match data.speed_dependency {
        Some(dep) => println!("Speed: {:?} x{}", dep, data.speed_coeff),
        None => println!("Speed: fixed x{}", data.speed_coeff),
    }
    println!("Cast time: {:.3}s", full.cast_time(stats));
}
