//! # Draftsman CLI
//!
//! Command-line interface for Draftsman.
//!
//! The commands mirror the editor's API: every command runs one handler from
//! [`api`] and prints its JSON body on stdout. Diagnostics go to stderr.
//!
//! ## Commands
//!
//! - `models` - All models with classified relationships
//! - `model` - One model by class name
//! - `relations` - Every relationship, flattened
//! - `edges` - Relationships grouped by model pair
//! - `config` - Show, update or publish the settings file
//! - `snapshot` - Write a support snapshot
//!

pub mod api;
pub mod snapshot;
pub mod workspace;

use api::ApiResponse;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use draftsman_core::RelationKind;
use draftsman_ir::ClassifierOptions;
use serde_json::{Value, json};
use snapshot::SnapshotOptions;
use std::io::Read;
use std::path::PathBuf;

pub use workspace::Workspace;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = "draftsman";

// ============================================================================
// Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "draftsman")]
#[command(about = "Model relationship graphs and editor settings for the Draftsman visual editor", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Project root
    #[arg(long, global = true, env = "DRAFTSMAN_BASE_PATH", default_value = ".")]
    pub base_path: PathBuf,

    /// Model manifest (default: <base>/storage/draftsman/models.json)
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,

    /// Settings file (default: <base>/storage/draftsman/config.php)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Run `php artisan config:clear` after writing settings
    #[arg(long, global = true)]
    pub clear_cache: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List models with their classified relationships
    Models(ModelsArgs),

    /// Show one model
    Model {
        /// Fully-qualified class, e.g. App\Models\User
        id: String,
    },

    /// List every relationship
    Relations,

    /// List relationships grouped by model pair
    Edges,

    /// Settings management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Write a support snapshot
    Snapshot {
        /// Sections to leave out (repeatable or comma-separated)
        #[arg(long)]
        exclude: Vec<String>,

        /// Output file (*.json) or directory
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// Order by descending relation count
    #[arg(long)]
    pub presorted: bool,

    /// Relation kinds to leave out (repeatable or comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub omit: Vec<String>,

    /// Only keep these relation kinds (repeatable or comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

impl ModelsArgs {
    pub fn classifier_options(&self) -> ClassifierOptions {
        ClassifierOptions {
            omit: parse_kinds(&self.omit),
            restrict_to: parse_kinds(&self.only),
        }
    }
}

/// Parse kind filters, warning about names outside the fact table
///
/// Unknown names are kept: a custom relation class can still be filtered.
fn parse_kinds(raw: &[String]) -> Vec<RelationKind> {
    raw.iter()
        .map(|name| {
            let kind = RelationKind::parse(name.trim());
            if !kind.is_known() {
                let known: Vec<String> =
                    RelationKind::all().iter().map(|k| k.to_string()).collect();
                tracing::warn!(
                    "Unknown relation kind '{}' (known kinds: {})",
                    kind,
                    known.join(", ")
                );
            }
            kind
        })
        .collect()
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective settings
    Show,

    /// Merge a JSON mapping into the settings
    Update {
        /// JSON file to read (default: stdin)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Write the default settings file if none exists
    Init,
}

impl Cli {
    /// The workspace these arguments describe
    pub fn workspace(&self) -> Workspace {
        let mut ws = Workspace::new(&self.base_path).with_clear_cache(self.clear_cache);
        if let Some(manifest) = &self.manifest {
            let path = ws.resolve(manifest);
            ws = ws.with_manifest(path);
        }
        if let Some(settings) = &self.settings {
            let path = ws.resolve(settings);
            ws = ws.with_settings(path);
        }
        ws
    }

    /// Log filter for the verbosity flags
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

// ============================================================================
// Execution
// ============================================================================

/// Run a parsed command, returning the process exit code
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    let ws = cli.workspace();
    tracing::debug!("Workspace: {:?}", ws);

    let response = match &cli.command {
        Commands::Models(args) if args.presorted => {
            api::models_presorted(&ws, args.classifier_options())
        }
        Commands::Models(args) => api::models(&ws, args.classifier_options()),
        Commands::Model { id } => api::model(&ws, id),
        Commands::Relations => api::relations(&ws),
        Commands::Edges => api::edges(&ws),
        Commands::Config(ConfigCommands::Show) => api::get_config(&ws),
        Commands::Config(ConfigCommands::Update { file }) => {
            let body = read_payload(file.as_ref())?;
            api::update_config(&ws, &wrap_payload(body))
        }
        Commands::Config(ConfigCommands::Init) => init_config(&ws),
        Commands::Snapshot { exclude, path } => {
            let options = SnapshotOptions::new(exclude, path.clone());
            match snapshot::write_snapshot(&ws, &options) {
                Ok(written) => ApiResponse::ok(json!({
                    "message": "Draftsman snapshot saved.",
                    "path": written.display().to_string(),
                })),
                Err(e) => ApiResponse::error(
                    500,
                    "Failed to save Draftsman snapshot.",
                    Some(e.to_string()),
                ),
            }
        }
    };

    emit(&response, cli.pretty)?;
    Ok(if response.status >= 400 { 1 } else { 0 })
}

fn init_config(ws: &Workspace) -> ApiResponse {
    let settings = ws.settings();
    match settings.publish_defaults() {
        Ok(written) => {
            let message = if written {
                "Draftsman configuration published."
            } else {
                "Draftsman configuration already exists."
            };
            ApiResponse::ok(json!({
                "message": message,
                "path": settings.store().path().display().to_string(),
            }))
        }
        Err(e) => ApiResponse::error(500, api::CONFIG_UPDATE_FAILED, Some(e.to_string())),
    }
}

fn read_payload(file: Option<&PathBuf>) -> anyhow::Result<String> {
    use anyhow::Context;

    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload from '{}'", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read payload from stdin")?;
            Ok(buffer)
        }
    }
}

/// Accept either `{config: {...}}` or a bare settings mapping
fn wrap_payload(raw: String) -> Value {
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) if map.contains_key("config") => Value::Object(map),
        Ok(Value::Object(map)) => json!({"config": map}),
        Ok(other) => json!({"config": other}),
        Err(e) => {
            tracing::warn!("Payload is not valid JSON: {}", e);
            json!({"config": Value::Null})
        }
    }
}

fn emit(response: &ApiResponse, pretty: bool) -> anyhow::Result<()> {
    let body = if pretty {
        serde_json::to_string_pretty(&response.body)?
    } else {
        serde_json::to_string(&response.body)?
    };
    println!("{body}");

    if !response.is_success() {
        let message = response.body["message"].as_str().unwrap_or("request failed");
        eprintln!("{} {} ({})", "error:".red().bold(), message, response.status);
        if let Some(detail) = response.body["error"].as_str() {
            eprintln!("  {}", detail.dimmed());
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("draftsman").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_models_filters() {
        let cli = parse(&["models", "--omit", "MorphTo,MorphMany", "--only", "HasMany"]);
        let Commands::Models(args) = &cli.command else {
            panic!("expected models command");
        };
        let options = args.classifier_options();
        assert_eq!(options.omit, vec![RelationKind::MorphTo, RelationKind::MorphMany]);
        assert_eq!(options.restrict_to, vec![RelationKind::HasMany]);
    }

    #[test]
    fn test_unknown_kind_filter_is_kept() {
        let kinds = parse_kinds(&["HasManyDeep".to_string(), " MorphTo ".to_string()]);
        assert_eq!(
            kinds,
            vec![
                RelationKind::Other("HasManyDeep".to_string()),
                RelationKind::MorphTo
            ]
        );
    }

    #[test]
    fn test_global_paths() {
        let cli = parse(&[
            "--base-path",
            "/srv/shop",
            "--manifest",
            "dump.json",
            "-vv",
            "relations",
        ]);
        let ws = cli.workspace();
        assert_eq!(ws.manifest_path, PathBuf::from("/srv/shop/dump.json"));
        assert_eq!(ws.settings_path, PathBuf::from("/srv/shop/storage/draftsman/config.php"));
        assert_eq!(cli.log_level(), "debug");
    }

    #[test]
    fn test_wrap_payload() {
        assert_eq!(
            wrap_payload(r#"{"graph": {"grid_width": 10}}"#.into()),
            json!({"config": {"graph": {"grid_width": 10}}})
        );
        assert_eq!(
            wrap_payload(r#"{"config": {"front": {}}}"#.into()),
            json!({"config": {"front": {}}})
        );
        assert_eq!(wrap_payload("\"nope\"".into()), json!({"config": "nope"}));
        assert_eq!(wrap_payload("{oops".into()), json!({"config": null}));
    }
}
