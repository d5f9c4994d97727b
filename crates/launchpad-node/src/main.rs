//! launchpad-node: command-line front end of the launchpad state machine.
//!
//! Subcommands:
//!   init          import a genesis file into a fresh state database
//!   export        print the current state as a genesis file
//!   apply         execute a JSON batch of messages in order
//!   describe      summarize one chain
//!   hash-genesis  print the hash to pin a custom initial genesis

mod msg;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use launchpad_core::chain::genesis_hash;
use launchpad_core::collab::ShareLedger;
use launchpad_core::error::LaunchpadError;
use launchpad_core::types::LaunchId;
use launchpad_genesis::{export_genesis, init_genesis, CampaignLedger, GenesisState};
use launchpad_profile::{CoordinatorBook, ProfileGenesis};
use launchpad_state::{LaunchEngine, LaunchQuery, StateDb};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::msg::Msg;

const META_PROFILE: &str = "profile";
const META_CAMPAIGNS: &str = "campaigns";

#[derive(Parser, Debug)]
#[command(
    name = "launchpad-node",
    version,
    about = "Launchpad node: chain registration, genesis requests and coordinator approvals"
)]
struct Args {
    /// Directory for the persistent state database.
    #[arg(long, default_value = "~/.launchpad/data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate and import a genesis file into an empty database.
    Init {
        #[arg(long)]
        genesis: PathBuf,
    },
    /// Print the current state as a genesis file.
    Export,
    /// Execute a JSON array of messages, skipping the ones that fail.
    /// An internal error stops the batch and exits non-zero.
    Apply {
        #[arg(long)]
        msgs: PathBuf,
    },
    /// Print a one-line summary of a chain.
    Describe { launch_id: LaunchId },
    /// Print the hex hash of a genesis file.
    HashGenesis { file: PathBuf },
}

/// On-disk genesis file: launch state, coordinator profiles and campaign
/// share balances.
#[derive(Debug, Default, Serialize, Deserialize)]
struct GenesisFile {
    #[serde(default)]
    launch: GenesisState,
    #[serde(default)]
    profile: ProfileGenesis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    campaigns: Option<CampaignLedger>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,launchpad=debug")),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::HashGenesis { file } => {
            let bytes = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            println!("{}", genesis_hash(&bytes));
            Ok(())
        }
        Command::Init { genesis } => {
            let db = open_db(&args.data_dir)?;
            init(&db, &genesis)
        }
        Command::Export => {
            let db = open_db(&args.data_dir)?;
            export(&db)
        }
        Command::Apply { msgs } => apply(open_db(&args.data_dir)?, &msgs),
        Command::Describe { launch_id } => {
            let db = open_db(&args.data_dir)?;
            let now = chrono::Utc::now().timestamp();
            println!("{}", LaunchQuery::new(&db).describe_chain(launch_id, now)?);
            Ok(())
        }
    }
}

fn open_db(data_dir: &Path) -> anyhow::Result<Arc<StateDb>> {
    let data_dir = expand_tilde(data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;
    let db = StateDb::open(&data_dir).context("opening state database")?;
    Ok(Arc::new(db))
}

fn init(db: &StateDb, path: &Path) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading genesis file {}", path.display()))?;
    let file: GenesisFile = serde_json::from_str(&json).context("parsing genesis file")?;

    let book = CoordinatorBook::from_genesis(file.profile).context("validating profile genesis")?;
    let shares = file.campaigns.as_ref().map(|c| c as &dyn ShareLedger);
    init_genesis(db, &file.launch, shares).context("importing launch genesis")?;

    save_profile(db, &book)?;
    if let Some(campaigns) = &file.campaigns {
        db.put_meta(META_CAMPAIGNS, &serde_json::to_vec(campaigns)?)?;
    }
    db.flush()?;
    info!(
        coordinators = book.len(),
        chains = file.launch.chain_list.len(),
        "genesis imported"
    );
    Ok(())
}

fn export(db: &StateDb) -> anyhow::Result<()> {
    let campaigns = match db.get_meta(META_CAMPAIGNS)? {
        Some(bytes) => Some(serde_json::from_slice(&bytes).context("decoding stored campaigns")?),
        None => None,
    };
    let file = GenesisFile {
        launch: export_genesis(db)?,
        profile: load_profile(db)?.export_genesis(),
        campaigns,
    };
    println!("{}", serde_json::to_string_pretty(&file)?);
    Ok(())
}

fn apply(db: Arc<StateDb>, path: &Path) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading messages {}", path.display()))?;
    let msgs: Vec<Msg> = serde_json::from_str(&json).context("parsing message batch")?;

    let book = load_profile(&db)?;
    let mut engine = LaunchEngine::new(Arc::clone(&db), book);

    let total = msgs.len();
    let mut failed = 0usize;
    for (index, msg) in msgs.into_iter().enumerate() {
        let name = msg.name();
        let now = chrono::Utc::now().timestamp();
        let outcome = match msg.execute(&mut engine, now) {
            Ok(result) => {
                info!(index, msg = name, "message applied");
                serde_json::json!({ "index": index, "msg": name, "ok": true, "result": result })
            }
            Err(e) => {
                let critical = e.downcast_ref::<LaunchpadError>().is_some_and(|le| le.is_critical());
                let outcome =
                    serde_json::json!({ "index": index, "msg": name, "ok": false, "error": format!("{e:#}") });
                if critical {
                    println!("{outcome}");
                    error!(index, msg = name, error = %format!("{e:#}"), "internal error, halting batch");
                    save_profile(&db, &engine.identity)?;
                    db.flush()?;
                    return Err(e.context(format!("message {index} ({name}) hit an internal error")));
                }
                failed += 1;
                warn!(index, msg = name, error = %format!("{e:#}"), "message failed");
                outcome
            }
        };
        println!("{outcome}");
    }

    save_profile(&db, &engine.identity)?;
    db.flush()?;
    info!(total, failed, "message batch processed");
    Ok(())
}

fn load_profile(db: &StateDb) -> anyhow::Result<CoordinatorBook> {
    match db.get_meta(META_PROFILE)? {
        Some(bytes) => serde_json::from_slice(&bytes).context("decoding stored profile"),
        None => Ok(CoordinatorBook::default()),
    }
}

fn save_profile(db: &StateDb, book: &CoordinatorBook) -> anyhow::Result<()> {
    db.put_meta(META_PROFILE, &serde_json::to_vec(book)?)?;
    Ok(())
}

/// Expand a leading `~` to the user's home directory (`HOME` or `USERPROFILE`).
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
