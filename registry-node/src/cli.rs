//! Registry CLI - commands for operating a registry from the shell
//!
//! Each mutating command loads the snapshot, applies exactly one call through
//! a [`RegistryHost`], and writes the snapshot back. Queries never write.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use clap::Subcommand;
use content_registry::{Call, ContentRegistry, Receipt, RegistryHost, Transaction};
use content_registry_integrity::{parse_status, AgentId, ContentId, ContentMetadata};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::config::Config;
use crate::state_file;

/// Registry CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a fresh registry state file
    Init {
        /// Initial admin principal (overrides config)
        #[arg(long)]
        admin: Option<String>,
        /// Overwrite an existing state file
        #[arg(long)]
        force: bool,
    },

    /// Submit a content record
    Submit {
        /// Content hash (at most 64 characters)
        #[arg(long)]
        hash: String,
        /// Publication source
        #[arg(long)]
        source: String,
        /// Publication timestamp
        #[arg(long)]
        timestamp: u64,
        /// Category (politics, economy, technology, health, environment,
        /// sports, entertainment, other)
        #[arg(long)]
        category: String,
    },

    /// Flag a content record
    Flag { content_id: ContentId },

    /// Set the review status of a record (admin)
    SetStatus {
        content_id: ContentId,
        /// pending, verified, rejected or flagged
        status: String,
    },

    /// Pause submissions and flags (admin)
    Pause,

    /// Resume submissions and flags (admin)
    Unpause,

    /// Hand the admin role to another principal (admin)
    TransferAdmin { new_admin: String },

    /// Show a content record
    Show { content_id: ContentId },

    /// Show the status of a content record
    Status { content_id: ContentId },

    /// Show flag count and flaggers of a record
    Flags { content_id: ContentId },

    /// Check whether a principal flagged a record
    HasFlagged { content_id: ContentId, user: String },

    /// Show admin, pause state, height and counters
    Info,

    /// List records, optionally filtered by status
    List {
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Apply a JSON array of transactions in order
    Replay { file: PathBuf },

    /// Print the SHA-256 of a file, usable as a content hash
    Hash { file: PathBuf },
}

impl Commands {
    fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Submit { .. }
                | Self::Flag { .. }
                | Self::SetStatus { .. }
                | Self::Pause
                | Self::Unpause
                | Self::TransferAdmin { .. }
        )
    }
}

/// What a command runs against.
pub struct NodeContext {
    pub config: Config,
    pub state_path: PathBuf,
    pub sender: Option<AgentId>,
}

impl NodeContext {
    fn sender(&self) -> anyhow::Result<AgentId> {
        self.sender
            .clone()
            .ok_or_else(|| anyhow!("this command needs --sender (or REGISTRY_SENDER)"))
    }

    fn open_host(&self) -> anyhow::Result<RegistryHost> {
        let registry = state_file::load(&self.state_path)?;
        Ok(RegistryHost::with_registry(registry, &self.config.registry))
    }

    async fn persist(&self, host: &RegistryHost) -> anyhow::Result<()> {
        state_file::save(&self.state_path, &host.snapshot().await)
    }
}

/// Execute a command, returning the text to print.
pub async fn execute_command(ctx: &NodeContext, cmd: Commands) -> anyhow::Result<String> {
    if cmd.is_mutation() {
        let sender = ctx.sender()?;
        let call = into_call(cmd)?;
        return apply_one(ctx, sender, call).await;
    }

    match cmd {
        Commands::Init { admin, force } => init(ctx, admin, force),
        Commands::Show { content_id } => {
            let registry = state_file::load(&ctx.state_path)?;
            let record = registry
                .get_content(content_id)
                .ok_or_else(|| anyhow!("content {content_id} not found"))?;
            Ok(serde_json::to_string_pretty(record)?)
        }
        Commands::Status { content_id } => {
            let registry = state_file::load(&ctx.state_path)?;
            Ok(registry.get_content_status(content_id)?.to_string())
        }
        Commands::Flags { content_id } => {
            let registry = state_file::load(&ctx.state_path)?;
            flags(&registry, content_id)
        }
        Commands::HasFlagged { content_id, user } => {
            let registry = state_file::load(&ctx.state_path)?;
            Ok(registry
                .has_flagged(content_id, &AgentId::new(user))
                .to_string())
        }
        Commands::Info => {
            let registry = state_file::load(&ctx.state_path)?;
            Ok(info_text(&registry))
        }
        Commands::List { status } => {
            let registry = state_file::load(&ctx.state_path)?;
            list(&registry, status.as_deref())
        }
        Commands::Replay { file } => replay(ctx, &file).await,
        Commands::Hash { file } => hash_file(&file),
        // Mutations were handled above.
        other => bail!("unhandled command {other:?}"),
    }
}

fn into_call(cmd: Commands) -> anyhow::Result<Call> {
    Ok(match cmd {
        Commands::Submit {
            hash,
            source,
            timestamp,
            category,
        } => Call::SubmitContent {
            hash,
            metadata: ContentMetadata::new(source, timestamp, category),
        },
        Commands::Flag { content_id } => Call::FlagContent { content_id },
        Commands::SetStatus { content_id, status } => Call::UpdateStatus {
            content_id,
            new_status: status,
        },
        Commands::Pause => Call::SetPaused { pause: true },
        Commands::Unpause => Call::SetPaused { pause: false },
        Commands::TransferAdmin { new_admin } => Call::TransferAdmin {
            new_admin: AgentId::new(new_admin),
        },
        other => bail!("{other:?} is not a registry call"),
    })
}

fn init(ctx: &NodeContext, admin: Option<String>, force: bool) -> anyhow::Result<String> {
    if ctx.state_path.exists() && !force {
        bail!(
            "state file {} already exists; pass --force to replace it",
            ctx.state_path.display()
        );
    }

    let mut registry_config = ctx.config.registry.clone();
    if let Some(admin) = admin {
        registry_config.admin = AgentId::new(admin);
    }
    let registry = registry_config.build_registry()?;
    state_file::save(&ctx.state_path, &registry.snapshot())?;

    info!(
        admin = %registry.get_admin(),
        path = %ctx.state_path.display(),
        "Initialized registry"
    );
    Ok(format!(
        "Initialized registry at {} (admin {})",
        ctx.state_path.display(),
        registry.get_admin()
    ))
}

async fn apply_one(ctx: &NodeContext, sender: AgentId, call: Call) -> anyhow::Result<String> {
    let host = ctx.open_host()?;
    let receipt = host.execute(sender, call).await;
    ctx.persist(&host).await?;

    match &receipt.result {
        Ok(_) => Ok(serde_json::to_string_pretty(&receipt)?),
        Err(e) => bail!("{} failed: {e} (code {})", receipt.call.name(), e.code()),
    }
}

async fn replay(ctx: &NodeContext, file: &Path) -> anyhow::Result<String> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("reading replay log {}", file.display()))?;
    let txs: Vec<Transaction> = serde_json::from_str(&json)
        .with_context(|| format!("decoding replay log {}", file.display()))?;

    let host = ctx.open_host()?;
    let receipts = host.execute_all(txs).await;
    ctx.persist(&host).await?;

    let failed = receipts.iter().filter(|r| !r.is_ok()).count();
    info!(applied = receipts.len(), failed, "Replayed transaction log");

    let mut lines: Vec<String> = receipts.iter().map(receipt_line).collect();
    lines.push(format!(
        "{} transactions, {} failed",
        receipts.len(),
        failed
    ));
    Ok(lines.join("\n"))
}

fn receipt_line(receipt: &Receipt) -> String {
    let outcome = match &receipt.result {
        Ok(value) => format!("ok {value}"),
        Err(e) => format!("err {} ({})", e.code(), e),
    };
    format!(
        "#{} h{} {} {} -> {}",
        receipt.sequence,
        receipt.height,
        receipt.sender,
        receipt.call.name(),
        outcome
    )
}

fn flags(registry: &ContentRegistry, content_id: ContentId) -> anyhow::Result<String> {
    let count = registry.get_flag_count(content_id)?;
    let flaggers = registry.get_flaggers(content_id).unwrap_or_default();

    let mut out = format!("{count} flag(s)");
    for flagger in flaggers {
        out.push_str(&format!("\n  {flagger}"));
    }
    Ok(out)
}

fn info_text(registry: &ContentRegistry) -> String {
    format!(
        "admin: {}\npaused: {}\nheight: {}\nrecords: {}\nnext id: {}",
        registry.get_admin(),
        registry.is_paused(),
        registry.block_height(),
        registry.content_count(),
        registry.get_next_id()
    )
}

fn list(registry: &ContentRegistry, status: Option<&str>) -> anyhow::Result<String> {
    let records: Vec<_> = match status {
        Some(status) => registry.contents_by_status(parse_status(status)?),
        None => registry.contents().collect(),
    };

    if records.is_empty() {
        return Ok("No records".to_string());
    }
    Ok(records
        .iter()
        .map(|r| {
            format!(
                "{:>6}  {:<8}  {:>3} flag(s)  {:<13}  {}",
                r.content_id,
                r.status.as_str(),
                r.flag_count,
                r.category.as_str(),
                r.hash
            )
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

/// SHA-256 of a file as lowercase hex.
pub fn hash_file(file: &Path) -> anyhow::Result<String> {
    let bytes = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    Ok(compute_hash(&bytes))
}

pub fn compute_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
