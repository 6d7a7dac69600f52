use checotype::{
    config::{Config, ConfigStore, FileConfigStore},
    history::{self, HistoryFormat},
    ingest,
    language::{DirectoryAssets, WordLists, WordSampler},
    IngestError, ResultPayload, ResultStore, SqliteResultStore, StatsEngine, UserId,
};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::{
    error::Error,
    io::{self, Read},
    path::PathBuf,
    process::ExitCode,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// typing practice core: sample words, record finished tests, and report personal stats
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Cli {
    /// path to the results database (overrides config)
    #[clap(long, global = true)]
    db: Option<PathBuf>,

    /// directory with <tag>.txt word lists (overrides config and embedded lists)
    #[clap(long, global = true)]
    words_dir: Option<PathBuf>,

    /// path to the config file
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// sample practice words as {"words": [...]}
    Words {
        /// language tag (en, es, fr, de, pt); unknown tags use en
        #[clap(short = 'l', long)]
        lang: Option<String>,

        /// number of words; zero or negative means the default, capped at 10000
        #[clap(short = 'c', long, allow_negative_numbers = true)]
        count: Option<i64>,
    },

    /// record a finished test from a JSON payload (stdin when --payload is absent)
    Submit {
        #[clap(short = 'u', long)]
        user: i64,

        #[clap(short = 'p', long)]
        payload: Option<String>,
    },

    /// print aggregated statistics for a user
    Summary {
        #[clap(short = 'u', long)]
        user: i64,

        #[clap(short = 'f', long, value_enum, default_value_t = SummaryFormat::Json)]
        format: SummaryFormat,
    },

    /// list a user's most recent results
    History {
        #[clap(short = 'u', long)]
        user: i64,

        #[clap(short = 'n', long)]
        limit: Option<usize>,

        #[clap(short = 'f', long, value_enum, default_value_t = HistoryFormat::Table)]
        format: HistoryFormat,
    },

    /// print the effective configuration
    Config {
        /// write the effective configuration back to the config file
        #[clap(long)]
        save: bool,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SummaryFormat {
    Json,
    Text,
}

impl Cli {
    /// Merge CLI overrides into the stored configuration
    fn effective_config(&self, store: &FileConfigStore) -> Config {
        let mut cfg = store.load();
        if let Some(db) = &self.db {
            cfg.database_path = Some(db.clone());
        }
        if let Some(dir) = &self.words_dir {
            cfg.words_dir = Some(dir.clone());
        }
        cfg
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn open_store(cfg: &Config) -> Result<SqliteResultStore, Box<dyn Error>> {
    Ok(SqliteResultStore::open(cfg.resolved_database_path())?)
}

fn word_sampler(cfg: &Config) -> WordSampler {
    let lists = match &cfg.words_dir {
        Some(dir) => WordLists::load(&DirectoryAssets::new(dir)),
        None => WordLists::embedded(),
    };
    WordSampler::new(lists)
}

fn read_payload(payload: Option<String>) -> io::Result<String> {
    match payload {
        Some(body) => Ok(body),
        None => {
            let mut body = String::new();
            io::stdin().read_to_string(&mut body)?;
            Ok(body)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let config_store = cli
        .config
        .as_ref()
        .map(FileConfigStore::with_path)
        .unwrap_or_default();
    let cfg = cli.effective_config(&config_store);
    init_tracing(&cfg.log_level);
    debug!(?cfg, "effective configuration");

    match cli.command {
        Command::Words { lang, count } => {
            let sampler = word_sampler(&cfg);
            let lang = lang.unwrap_or_else(|| cfg.default_language.clone());
            let count = count.unwrap_or(cfg.default_word_count);
            println!("{}", serde_json::to_string(&sampler.respond(&lang, count))?);
        }
        Command::Submit { user, payload } => {
            let body = read_payload(payload)?;
            let store = open_store(&cfg)?;
            let outcome = ResultPayload::from_json(&body)
                .map_err(IngestError::from)
                .and_then(|payload| ingest(&store, UserId(user), &payload));

            match outcome {
                Ok(id) => println!("{}", serde_json::json!({ "ok": true, "id": id })),
                Err(IngestError::Validation(e)) => {
                    eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
                    return Ok(ExitCode::from(2));
                }
                Err(IngestError::Store(e)) => return Err(e.into()),
            }
        }
        Command::Summary { user, format } => {
            let engine = StatsEngine::new(open_store(&cfg)?);
            let summary = engine.summarize(UserId(user))?;
            match format {
                SummaryFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                SummaryFormat::Text => println!("{summary}"),
            }
        }
        Command::History {
            user,
            limit,
            format,
        } => {
            let store = open_store(&cfg)?;
            let results =
                store.fetch_recent_results(UserId(user), limit.unwrap_or(cfg.history_limit))?;
            print!("{}", history::render(&results, format, Utc::now())?);
        }
        Command::Config { save } => {
            if save {
                config_store.save(&cfg)?;
                debug!(path = %config_store.path().display(), "saved configuration");
            }
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();
    run(cli)
}
