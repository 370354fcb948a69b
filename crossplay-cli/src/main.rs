//! crossplay CLI
//!
//! Compares GOG Galaxy libraries across users and lists the games they can
//! play together, enriched with IGDB multiplayer data.

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use clap::Parser;

use crossplay_compare::{
    ClassifyContext, ExtractOptions, FilterCriteria, FilterOutcome, OwnershipMode, UserLibrary,
    classify_collection, extract_user_library, filter_collection, merge_libraries,
};
use crossplay_core::{Config, GameCollection, MaxPlayers, RawLibrary, UserId};
use crossplay_db::GalaxyDb;
use crossplay_igdb::{
    CatalogCache, EnrichOptions, IgdbClient, IgdbCredentials, enrich_collection,
};

#[derive(Parser)]
#[command(name = "crossplay")]
#[command(about = "Compare GOG Galaxy game libraries across users", long_about = None)]
struct Cli {
    /// Path of the YAML config file
    #[arg(short, long, default_value = "config.yml")]
    config_file: PathBuf,

    /// User ids to compare (repeatable; defaults to every configured user)
    #[arg(short, long = "userid")]
    userid: Vec<UserId>,

    /// List games owned by any selected user instead of titles common to all
    #[arg(short, long)]
    all_games: bool,

    /// Include single-player titles in the result
    #[arg(short = 'I', long)]
    include_single_player: bool,

    /// Only titles every selected user has installed
    #[arg(short, long)]
    installed_only: bool,

    /// Only titles owned by no one outside the selected users
    #[arg(short, long)]
    exclusive: bool,

    /// Platform to exclude (repeatable, e.g. epic)
    #[arg(short = 'x', long = "exclude-platform")]
    exclude_platform: Vec<String>,

    /// Pick one random title from the result
    #[arg(short, long)]
    random: bool,

    /// Discard cached IGDB data and re-fetch everything
    #[arg(long)]
    force_refresh: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = match Config::load(&cli.config_file) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let users: BTreeSet<UserId> = if cli.userid.is_empty() {
        config.users.keys().copied().collect()
    } else {
        cli.userid.iter().copied().collect()
    };
    if users.is_empty() {
        eprintln!("Error: no users selected and none configured");
        std::process::exit(1);
    }

    let exclude_platforms: HashSet<String> = cli.exclude_platform.iter().cloned().collect();

    let libraries = load_libraries(&config, &users, &exclude_platforms);
    if libraries.is_empty() {
        eprintln!("Error: no readable user databases");
        std::process::exit(1);
    }

    let mut collection = merge_libraries(&libraries);
    log::info!("{} titles after merge", collection.len());

    let cache = enrich(&config, &collection, cli.force_refresh).await;

    let ctx = ClassifyContext {
        metadata: &config.metadata,
        single_player: &config.single_player,
        cache: &cache,
    };
    classify_collection(&mut collection, &ctx);

    let criteria = FilterCriteria {
        users,
        exclude_platforms,
        include_single_player: cli.include_single_player,
        ownership: if cli.all_games {
            OwnershipMode::AnySelected
        } else {
            OwnershipMode::CommonToAll
        },
        installed_only: cli.installed_only,
        exclusive: cli.exclusive,
        randomize: cli.random,
    };
    let outcome = filter_collection(&collection, &criteria);

    print_result(&config, &outcome);
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Open and extract every selected user's library. Per-user failures are
/// logged and skipped so one corrupt database doesn't sink the comparison.
fn load_libraries(
    config: &Config,
    users: &BTreeSet<UserId>,
    exclude_platforms: &HashSet<String>,
) -> Vec<UserLibrary> {
    let options = ExtractOptions {
        hidden: Some(&config.hidden),
        exclude_platforms: Some(exclude_platforms),
    };

    let mut libraries = Vec::new();
    for &user_id in users {
        let raw = match load_raw(config, user_id) {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("Skipping user {user_id}: {e}");
                continue;
            }
        };
        let library = extract_user_library(&raw, &options);
        log::info!(
            "{}: {} titles extracted",
            config.username(user_id),
            library.records.len()
        );
        libraries.push(library);
    }
    libraries
}

fn load_raw(config: &Config, user_id: UserId) -> Result<RawLibrary, String> {
    let path = config.db_file(user_id).map_err(|e| e.to_string())?;
    let db = GalaxyDb::open(&path).map_err(|e| e.to_string())?;
    let mut raw = db.raw_library().map_err(|e| e.to_string())?;
    if raw.user_id != user_id {
        log::warn!(
            "{}: database belongs to user {}, using configured id {user_id}",
            path.display(),
            raw.user_id
        );
        raw.user_id = user_id;
    }
    Ok(raw)
}

/// Run the IGDB enrichment pass, returning the cache for classification.
/// Missing credentials disable enrichment for the run; any pre-existing
/// cache entries still feed the classifier.
async fn enrich(config: &Config, collection: &GameCollection, force_refresh: bool) -> CatalogCache {
    let mut cache = match &config.cache {
        Some(path) => CatalogCache::load(path),
        None => CatalogCache::in_memory(),
    };

    let creds = match IgdbCredentials::resolve(
        config.igdb_client_id.as_deref(),
        config.igdb_client_secret.as_deref(),
    ) {
        Ok(creds) => creds,
        Err(e) => {
            log::warn!("{e}; running without IGDB enrichment");
            return cache;
        }
    };
    let client = match IgdbClient::new(creds) {
        Ok(client) => client,
        Err(e) => {
            log::warn!("Failed to build IGDB client: {e}; running without enrichment");
            return cache;
        }
    };

    let options = EnrichOptions { force_refresh };
    let cancel = AtomicBool::new(false);
    match enrich_collection(&client, &mut cache, collection, &options, &cancel).await {
        Ok(summary) => {
            log::info!(
                "IGDB: {} fetched, {} cached, {} misses, {} errors",
                summary.fetched,
                summary.cached,
                summary.misses,
                summary.errors
            );
        }
        Err(e) => {
            log::warn!("IGDB enrichment disabled: {e}");
        }
    }

    if let Err(e) = cache.flush() {
        log::warn!("Failed to write IGDB cache: {e}");
    }
    cache
}

fn print_result(config: &Config, outcome: &FilterOutcome) {
    for entry in &outcome.games {
        let owners: Vec<String> = entry
            .owners
            .iter()
            .map(|&id| config.username(id))
            .collect();

        let mut line = format!("{} ({})", entry.title, entry.platforms.join(", "));
        if entry.max_players != MaxPlayers::Unknown {
            line.push_str(&format!("  Players: {}", entry.max_players));
        }
        line.push_str(&format!("  [{}]", owners.join(", ")));
        if let Some(comment) = &entry.comment {
            line.push_str(&format!("  {comment}"));
        }
        if let Some(url) = &entry.url {
            line.push_str(&format!("  {url}"));
        }
        println!("{line}");
    }
    println!("{}", outcome.caption);
}
