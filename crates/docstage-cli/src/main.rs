//! Docstage CLI: stage documents, upload batches, browse documents and manage tags.
//!
//! Reads configuration from the environment (a `.env` file is loaded first).
//! Commands touching stored data identify the user through the JWT in
//! DOCSTAGE_TOKEN.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use docstage_cli::selection::load_selection;
use docstage_cli::stage::{stage_selections, PromptDecisions, StageReport};
use docstage_cli::{failure_message, init_tracing, truncate_string};
use docstage_core::{Config, ErrorMetadata, UserId};
use docstage_db::{setup_database, DocumentRepository, TagRepository};
use docstage_services::{
    create_storage, AuthProvider, BatchReport, JwtAuthProvider, LibraryService, Storage,
    TagService, UploadOutcome, UploadService,
};
use docstage_staging::{FileValidator, TagWizard};
use serde::Serialize;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "docstage", about = "Document staging and upload CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage files or directories, one selection per path, resolving collisions interactively
    Stage {
        /// Files or directories; each one is a separate selection
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Upload the resolved collection as a new batch
        #[arg(long)]
        upload: bool,
    },
    /// List your documents
    List {
        /// Only documents of this batch
        #[arg(long, value_name = "UUID")]
        batch: Option<Uuid>,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Print a time-limited access URL for a document
    Url {
        /// Document UUID
        document_id: Uuid,
        /// Expiry in seconds (default: SIGNED_URL_EXPIRY_SECS)
        #[arg(long)]
        expires: Option<u64>,
    },
    /// Tag operations
    Tag {
        #[command(subcommand)]
        sub: TagCommands,
    },
}

#[derive(Subcommand)]
enum TagCommands {
    /// Create a tag
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        industry: Option<String>,
        /// JSON file holding the extraction schema (an object)
        #[arg(long, value_name = "FILE")]
        schema: Option<PathBuf>,
        /// Sample document UUID
        #[arg(long, value_name = "UUID")]
        sample: Option<Uuid>,
    },
    /// List tags with their document counts
    List,
    /// Attach documents to a tag
    Attach {
        tag_id: Uuid,
        #[arg(required = true)]
        document_ids: Vec<Uuid>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

async fn authenticate(config: &Config) -> anyhow::Result<UserId> {
    let token = std::env::var("DOCSTAGE_TOKEN").context("DOCSTAGE_TOKEN must be set")?;
    let provider = JwtAuthProvider::from_config(config);
    let user_id = provider
        .authenticate(&token)
        .await
        .context("Authentication failed")?;
    Ok(user_id)
}

/// Connected backends for commands that read or write stored data
struct Backends {
    user_id: UserId,
    documents: Arc<DocumentRepository>,
    tags: Arc<TagRepository>,
    storage: Arc<dyn Storage>,
}

impl Backends {
    async fn connect(config: &Config) -> anyhow::Result<Self> {
        let user_id = authenticate(config).await?;
        let pool = setup_database(config).await?;
        let storage = create_storage(config)
            .await
            .context("Failed to initialize storage")?;

        Ok(Self {
            user_id,
            documents: Arc::new(DocumentRepository::new(pool.clone())),
            tags: Arc::new(TagRepository::new(pool)),
            storage,
        })
    }

    fn library(&self, config: &Config) -> LibraryService {
        LibraryService::new(
            self.documents.clone(),
            self.storage.clone(),
            config.signed_url_expiry(),
        )
    }

    fn tag_service(&self) -> TagService {
        TagService::new(self.tags.clone(), self.documents.clone())
    }
}

fn print_stage_report(report: &StageReport) {
    for rejection in &report.rejected {
        println!("rejected  {}: {}", rejection.file.name(), rejection.reason);
    }
    for failed in &report.failed {
        println!("failed    {}: {}", failed.file.name(), failed.error);
    }
    if report.cancelled > 0 {
        println!("{} selection(s) cancelled", report.cancelled);
    }
    println!("\nStaged {} file(s):", report.working.len());
    for (index, file) in report.working.iter().enumerate() {
        println!(
            "{:>4}  {:<40}  {:>10} B  {}",
            index + 1,
            truncate_string(file.name(), 40),
            file.byte_size(),
            file.mime_type()
        );
    }
}

/// `detailed` prints full error chains; off in production.
fn print_batch_report(report: &BatchReport, detailed: bool) {
    println!("\nBatch {}", report.batch_id);
    for outcome in &report.outcomes {
        match outcome {
            UploadOutcome::Uploaded(doc) => println!("uploaded  {} -> {}", doc.name, doc.id),
            UploadOutcome::SkippedDuplicate { name, existing } => {
                println!("skipped   {}: same content as {}", name, existing.document_id)
            }
            UploadOutcome::Failed { name, error } => {
                println!("failed    {}: {}", name, failure_message(error, detailed));
                if let Some(action) = error.suggested_action() {
                    println!("          {}", action);
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("Invalid configuration")?;

    match cli.command {
        Commands::Stage { paths, upload } => {
            let validator = FileValidator::from_config(&config);
            let mut selections = Vec::with_capacity(paths.len());
            for path in &paths {
                selections.push(load_selection(path).await?);
            }

            let mut decisions = PromptDecisions::stdin();
            let report = stage_selections(selections, &validator, &mut decisions).await?;
            print_stage_report(&report);

            if upload && !report.working.is_empty() {
                let backends = Backends::connect(&config).await?;
                let uploads =
                    UploadService::new(backends.documents.clone(), backends.storage.clone(), validator);
                let batch = uploads.upload_batch(backends.user_id, &report.working).await;
                print_batch_report(&batch, !config.is_production());
            }
        }
        Commands::List { batch, format } => {
            let backends = Backends::connect(&config).await?;
            let documents = backends
                .library(&config)
                .list_documents(backends.user_id, batch)
                .await?;
            match format {
                OutputFormat::Json => print_json(&documents)?,
                OutputFormat::Table => {
                    println!(
                        "{:<36}  {:<30}  {:>10}  {:<8}  {:<36}",
                        "ID", "NAME", "SIZE", "STATUS", "BATCH"
                    );
                    for doc in &documents {
                        println!(
                            "{:<36}  {:<30}  {:>10}  {:<8}  {:<36}",
                            doc.id,
                            truncate_string(&doc.name, 30),
                            doc.file_size,
                            doc.status,
                            doc.batch_id
                        );
                    }
                }
            }
        }
        Commands::Url {
            document_id,
            expires,
        } => {
            let backends = Backends::connect(&config).await?;
            let url = backends
                .library(&config)
                .access_url(backends.user_id, document_id, expires.map(Duration::from_secs))
                .await?;
            println!("{}", url);
        }
        Commands::Tag { sub } => {
            let backends = Backends::connect(&config).await?;
            let tags = backends.tag_service();
            match sub {
                TagCommands::Create {
                    name,
                    description,
                    industry,
                    schema,
                    sample,
                } => {
                    let mut wizard = TagWizard::new();
                    wizard.set_details(name, description, industry);
                    wizard.next()?;
                    if let Some(path) = schema {
                        let text = tokio::fs::read_to_string(&path)
                            .await
                            .with_context(|| format!("Failed to read {}", path.display()))?;
                        wizard.set_schema_text(&text)?;
                    }
                    wizard.next()?;
                    wizard.set_sample_document(sample);
                    wizard.next()?;

                    let tag = tags.create_from_wizard(backends.user_id, wizard).await?;
                    print_json(&tag)?;
                }
                TagCommands::List => {
                    print_json(&tags.list_tags(backends.user_id).await?)?;
                }
                TagCommands::Attach {
                    tag_id,
                    document_ids,
                } => {
                    let attached = tags
                        .attach(backends.user_id, tag_id, &document_ids)
                        .await?;
                    print_json(&serde_json::json!({ "tag_id": tag_id, "attached": attached }))?;
                }
            }
        }
    }

    Ok(())
}
