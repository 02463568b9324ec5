//! veritas-node — administrative CLI for a single Veritas Documents ledger.
//!
//! There is no server loop here: every subcommand opens the storage fabric,
//! does one thing, and exits. Multi-writer consensus, P2P, and an RPC/HTTP
//! surface are out of scope (spec §1/§6) — this binary is the whole
//! deployment surface for a single-master ledger.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use veritas_core::Transaction;
use veritas_identity::{
    activate, login, AccountPolicyView, ActivationRequest, SessionStore, StorageAccountStore, StorageInviteStore,
};
use veritas_ledger::{mine_block, submit_transaction, verify_chain, PendingPool, StorageKeyRegistry};
use veritas_storage::StorageFabric;
use veritas_system::SystemIdentityConfig;
use zeroize::Zeroizing;

#[derive(Parser, Debug)]
#[command(
    name = "veritas-node",
    version,
    about = "Veritas Documents — single-master ledger administration"
)]
struct Args {
    /// Directory holding the storage fabric's sled databases.
    #[arg(long, default_value = "./veritas-data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the storage fabric, applying genesis if no tip exists yet.
    Init {
        /// File holding the first half of the split system signing secret.
        #[arg(long)]
        system_key_share_1: PathBuf,
        /// File holding the second half of the split system signing secret.
        #[arg(long)]
        system_key_share_2: PathBuf,
        /// File holding the system's Dilithium2 public key.
        #[arg(long)]
        system_pub: PathBuf,
    },
    /// Validate and submit an already-issued invite's activation transaction.
    Activate {
        #[arg(long)]
        invite: String,
        /// Pre-built, pre-signed USER_REGISTRATION transaction, as JSON.
        #[arg(long)]
        transaction: PathBuf,
    },
    /// Exercise the challenge-response login flow.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        timestamp: i64,
        /// Raw detached Dilithium2 signature bytes over the login challenge.
        #[arg(long)]
        signature: PathBuf,
    },
    /// Feed a pre-built, pre-signed transaction file into the pending pool.
    Submit {
        #[arg(long)]
        tx: PathBuf,
    },
    /// Mine the pending pool into a new block.
    Mine,
    /// Walk the chain from genesis and report the first failing block.
    VerifyChain,
    /// Print the current tip and pending pool size.
    Status,
}

const PENDING_POOL_KEY: &[u8] = b"cli:pending_pool";

/// `PendingPool` is an in-process mutex-guarded map (spec §4.7's single-writer
/// discipline); this binary is a short-lived process per invocation, so its
/// contents are rehydrated from the KV tier at the start of any subcommand
/// that touches the pool and written back before exit.
fn load_pool(fabric: &StorageFabric) -> anyhow::Result<PendingPool> {
    let pool = PendingPool::new();
    let saved: Vec<Transaction> = fabric.kv().get_json(PENDING_POOL_KEY)?.unwrap_or_default();
    for tx in saved {
        pool.insert(tx)?;
    }
    Ok(pool)
}

fn save_pool(fabric: &StorageFabric, pool: &PendingPool) -> anyhow::Result<()> {
    fabric.kv().put_json(PENDING_POOL_KEY, &pool.snapshot())?;
    Ok(())
}

fn load_system_identity(
    share_1: &PathBuf,
    share_2: &PathBuf,
    pub_key: &PathBuf,
    key_version: u32,
) -> anyhow::Result<SystemIdentityConfig> {
    let share_a = std::fs::read(share_1).with_context(|| format!("reading {}", share_1.display()))?;
    let share_b = std::fs::read(share_2).with_context(|| format!("reading {}", share_2.display()))?;
    let public_key_bytes = std::fs::read(pub_key).with_context(|| format!("reading {}", pub_key.display()))?;

    Ok(SystemIdentityConfig::new(
        Zeroizing::new(share_a),
        Zeroizing::new(share_b),
        veritas_core::SigPublicKey(public_key_bytes),
        key_version,
    )?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,veritas=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    std::fs::create_dir_all(&args.data_dir).with_context(|| format!("creating data dir {}", args.data_dir.display()))?;
    let now = chrono::Utc::now().timestamp_millis();

    match args.command {
        Command::Init {
            system_key_share_1,
            system_key_share_2,
            system_pub,
        } => {
            let fabric = StorageFabric::open(&args.data_dir).context("opening storage fabric")?;
            let system = load_system_identity(&system_key_share_1, &system_key_share_2, &system_pub, 0)?;

            if veritas_genesis::is_genesis_applied(&fabric)? {
                tracing::info!("genesis already applied — nothing to do");
            } else {
                let genesis = veritas_genesis::apply_genesis(&fabric, &system).context("applying genesis")?;
                tracing::info!(block_number = genesis.block_number, "genesis applied");
            }
        }

        Command::Activate { invite, transaction } => {
            let fabric = StorageFabric::open(&args.data_dir).context("opening storage fabric")?;
            let system = bootstrap_system_for_ledger_ops(&fabric)?;
            let pool = load_pool(&fabric)?;
            let invites = StorageInviteStore::new(fabric.kv());
            let accounts = StorageAccountStore::new(fabric.kv());

            let tx_json = std::fs::read_to_string(&transaction).with_context(|| format!("reading {}", transaction.display()))?;
            let tx: Transaction = serde_json::from_str(&tx_json).context("parsing transaction JSON")?;

            activate(
                &pool,
                &system,
                &invites,
                &accounts,
                ActivationRequest {
                    invite_token: invite,
                    transaction: tx,
                },
                now,
            )
            .map_err(|e| anyhow::anyhow!("activation failed: {e}"))?;

            save_pool(&fabric, &pool)?;
            tracing::info!("account activated and queued for mining");
        }

        Command::Login { email, timestamp, signature } => {
            let fabric = StorageFabric::open(&args.data_dir).context("opening storage fabric")?;
            let accounts = StorageAccountStore::new(fabric.kv());
            let sessions = SessionStore::new(fabric.kv());

            let sig_bytes = std::fs::read(&signature).with_context(|| format!("reading {}", signature.display()))?;
            let session = login(
                &accounts,
                &sessions,
                &email,
                timestamp,
                &veritas_core::Signature(sig_bytes),
                now,
            )
            .map_err(|e| anyhow::anyhow!("login failed: {e}"))?;

            println!("session token: {}", session.token);
            println!("expires at: {}", session.expires_at);
        }

        Command::Submit { tx } => {
            let fabric = StorageFabric::open(&args.data_dir).context("opening storage fabric")?;
            let system = bootstrap_system_for_ledger_ops(&fabric)?;
            let pool = load_pool(&fabric)?;
            let accounts = StorageAccountStore::new(fabric.kv());

            let tx_json = std::fs::read_to_string(&tx).with_context(|| format!("reading {}", tx.display()))?;
            let transaction: Transaction = serde_json::from_str(&tx_json).context("parsing transaction JSON")?;

            submit_transaction(&pool, &system, &AccountPolicyView(&accounts), transaction, now)
                .map_err(|e| anyhow::anyhow!("submission failed: {e}"))?;
            tracing::info!(pending = pool.len(), "transaction accepted into the pending pool");
            save_pool(&fabric, &pool)?;
        }

        Command::Mine => {
            let fabric = StorageFabric::open(&args.data_dir).context("opening storage fabric")?;
            let system = bootstrap_system_for_ledger_ops(&fabric)?;
            let pool = load_pool(&fabric)?;

            let result = mine_block(&fabric, &pool, &system, now).map_err(|e| anyhow::anyhow!("mining failed: {e}"));
            save_pool(&fabric, &pool)?;
            let block = result?;
            println!("mined block {} ({})", block.block_number, block.hash);
        }

        Command::VerifyChain => {
            let fabric = StorageFabric::open(&args.data_dir).context("opening storage fabric")?;
            let registry = StorageKeyRegistry::new(fabric.kv());

            match verify_chain(&fabric, &registry) {
                Ok(()) => println!("chain verifies end to end"),
                Err(e) => {
                    println!("chain verification failed: {e}");
                    std::process::exit(1);
                }
            }
        }

        Command::Status => {
            let fabric = StorageFabric::open(&args.data_dir).context("opening storage fabric")?;
            match veritas_ledger::read_tip(&fabric)? {
                Some(tip) => println!("tip: block {} ({})", tip.block_number, tip.hash),
                None => println!("tip: none (genesis not applied)"),
            }
            let pool = load_pool(&fabric)?;
            println!("pending: {} transaction(s)", pool.len());
        }
    }

    Ok(())
}

/// Subcommands that only need to verify or co-sign against the ledger's
/// already-registered system identity (not mint a new one) load the current
/// key version from the registry and expect the same key-share files used
/// at `init` time to be supplied via the `VERITAS_SYSTEM_KEY_SHARE_{1,2}`
/// and `VERITAS_SYSTEM_PUB` environment variables.
fn bootstrap_system_for_ledger_ops(fabric: &StorageFabric) -> anyhow::Result<SystemIdentityConfig> {
    let registry = StorageKeyRegistry::new(fabric.kv());
    let key_version = veritas_system::SystemKeyRegistry::current_version(&registry).context("no system key registered yet — run `init` first")?;

    let share_1 = std::env::var("VERITAS_SYSTEM_KEY_SHARE_1").context("VERITAS_SYSTEM_KEY_SHARE_1 not set")?;
    let share_2 = std::env::var("VERITAS_SYSTEM_KEY_SHARE_2").context("VERITAS_SYSTEM_KEY_SHARE_2 not set")?;
    let pub_key = std::env::var("VERITAS_SYSTEM_PUB").context("VERITAS_SYSTEM_PUB not set")?;

    load_system_identity(
        &PathBuf::from(share_1),
        &PathBuf::from(share_2),
        &PathBuf::from(pub_key),
        key_version,
    )
}
