//! openvocab: command-line client for the resource manager.
//!
//! Resources are read and written as N-Triples documents describing one
//! subject. Documents go to stdout; logs go to stderr.

mod backend;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use openvocab_core::{
    ConceptStatus, ErrorKind, NTriplesCodec, NamespaceRegistry, Resource, ResourceDecoder,
    ResourceEncoder, ResourceType, StandardNamespaces, Uri,
};
use openvocab_engine::{CreateOptions, UpdateOptions};

use backend::Backend;

#[derive(Parser)]
#[command(name = "openvocab")]
#[command(author, version, about = "Manage SKOS vocabularies in a triple store")]
#[command(propagate_version = true)]
struct Cli {
    /// Triple store backend
    #[arg(long, env = "OPENVOCAB_BACKEND", value_enum, default_value_t = Backend::Postgres)]
    backend: Backend,

    /// TOML file with [engine] and [sparql] tables
    #[arg(long, env = "OPENVOCAB_CONFIG")]
    config: Option<PathBuf>,

    /// API key of the acting user
    #[arg(long, env = "OPENVOCAB_API_KEY", hide_env_values = true)]
    key: String,

    /// Tenant code the request acts in
    #[arg(long, env = "OPENVOCAB_TENANT")]
    tenant: String,

    /// Apply pending database migrations first
    #[arg(long)]
    migrate: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a resource from an N-Triples document
    Create {
        /// Document path, or "-" for stdin
        file: PathBuf,

        /// Let the server mint the URI and UUID
        #[arg(long)]
        generate_ids: bool,

        /// Code of the set the resource joins
        #[arg(long)]
        set: Option<String>,

        /// Initial concept status
        #[arg(long)]
        status: Option<ConceptStatus>,
    },

    /// Replace a stored resource with an N-Triples document
    Update {
        /// Document path, or "-" for stdin
        file: PathBuf,

        /// Code of the set the resource moves to
        #[arg(long)]
        set: Option<String>,
    },

    /// Delete a resource (concepts are soft-deleted)
    Delete {
        uri: Uri,

        /// Only report whether the resource is still referenced
        #[arg(long)]
        dry_run: bool,
    },

    /// Print a resource by URI or UUID
    Get {
        id: String,
    },

    /// Print resources of one type
    List {
        /// concept, concept_scheme, skos_collection, set, tenant, person, relation_definition
        kind: ResourceType,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Add a relation edge between two concepts
    AddRelation {
        subject: Uri,
        /// Full URI or prefixed name such as skos:broader
        predicate: String,
        object: Uri,
    },

    /// Remove a relation edge (both directions for symmetric relations)
    RemoveRelation {
        subject: Uri,
        /// Full URI or prefixed name such as skos:broader
        predicate: String,
        object: Uri,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let _file_guard = init_logging();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Initialise tracing.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, enables file logging)
///   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
///   RUST_LOG    - standard env filter (default: "openvocab_engine=info,openvocab=info")
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "openvocab_engine=info,openvocab=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = if let Some(ref path) = log_file {
        let file_dir = Path::new(path).parent().unwrap_or(Path::new("."));
        let file_name = Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("openvocab.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        subsystem = "cli",
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stderr)"),
        "Logging initialized"
    );
    guard
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let manager = backend::connect(cli.backend, cli.config.as_deref(), cli.migrate).await?;
    let codec = NTriplesCodec::new();
    let (key, tenant) = (cli.key.as_str(), cli.tenant.as_str());

    match cli.command {
        Commands::Create {
            file,
            generate_ids,
            set,
            status,
        } => {
            let resource = read_document(&codec, &file)?;
            let options = CreateOptions {
                auto_generate_identifiers: generate_ids,
                set_code: set,
                status,
            };
            let created = manager.create_with(&resource, key, tenant, options).await?;
            print_resource(&codec, &created)?;
        }
        Commands::Update { file, set } => {
            let resource = read_document(&codec, &file)?;
            let options = UpdateOptions { set_code: set };
            let updated = manager.update_with(&resource, key, tenant, options).await?;
            print_resource(&codec, &updated)?;
        }
        Commands::Delete { uri, dry_run: true } => {
            if manager.can_delete(&uri).await? {
                eprintln!("<{}> can be deleted", uri);
            } else {
                eprintln!("<{}> is still referenced", uri);
            }
        }
        Commands::Delete { uri, dry_run: false } => {
            manager.delete(&uri, key, tenant).await?;
            eprintln!("Deleted <{}>", uri);
        }
        Commands::Get { id } => {
            let resource = manager.find_by_id(&id).await?;
            print_resource(&codec, &resource)?;
        }
        Commands::List { kind, limit } => {
            for resource in manager.list(kind, limit).await? {
                print_resource(&codec, &resource)?;
                println!();
            }
        }
        Commands::AddRelation {
            subject,
            predicate,
            object,
        } => {
            let predicate = expand_predicate(&predicate)?;
            manager
                .add_relation_edge(&subject, &predicate, &object, key, tenant)
                .await?;
            eprintln!("Added <{}> <{}> <{}>", subject, predicate, object);
        }
        Commands::RemoveRelation {
            subject,
            predicate,
            object,
        } => {
            let predicate = expand_predicate(&predicate)?;
            manager
                .remove_relation_edge(&subject, &predicate, &object, key, tenant)
                .await?;
            eprintln!("Removed <{}> <{}> <{}>", subject, predicate, object);
        }
    }
    Ok(())
}

fn read_document(codec: &NTriplesCodec, file: &Path) -> anyhow::Result<Resource> {
    let raw = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)?
    };
    Ok(codec.decode(&raw)?)
}

fn print_resource(codec: &NTriplesCodec, resource: &Resource) -> anyhow::Result<()> {
    print!("{}", codec.encode(resource)?);
    Ok(())
}

/// Accept `skos:broader` as well as a full URI.
fn expand_predicate(predicate: &str) -> anyhow::Result<Uri> {
    if predicate.contains("://") {
        return Ok(Uri::parse(predicate)?);
    }
    Ok(StandardNamespaces::new().expand_short_name(predicate)?)
}

/// Process exit status per error kind; anything unclassified exits 1.
fn exit_code(error: &anyhow::Error) -> u8 {
    let Some(error) = error.downcast_ref::<openvocab_core::Error>() else {
        return 1;
    };
    match error.kind() {
        ErrorKind::InvalidInput | ErrorKind::InvalidRelation => 2,
        ErrorKind::Configuration => 3,
        ErrorKind::Unauthorized => 4,
        ErrorKind::NotFound => 5,
        ErrorKind::Gone => 6,
        ErrorKind::Conflict => 7,
        ErrorKind::Reference => 8,
        ErrorKind::StoreUnavailable => 9,
        ErrorKind::Internal => 1,
    }
}
