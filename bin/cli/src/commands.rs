//! Subcommands and their execution.
//!
//! Each command opens an editor session on a flow in the file store, runs
//! one editor operation and returns the text to print. Notifications raised
//! by the session are appended to the output.

use crate::config::CliConfig;
use crate::error::CliError;
use crate::file_store::FileFlowStore;
use clap::Subcommand;
use flowdesk_core::FlowId;
use flowdesk_editor::store::FlowStore;
use flowdesk_editor::version::{parse_created, version_number};
use flowdesk_editor::{FlowDraft, FlowEditor};
use rootcause::prelude::Report;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create an empty flow
    New {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// URL-safe slug
        #[arg(short, long)]
        slug: String,
    },
    /// Print a flow's nodes, edges and versions
    Inspect {
        flow_id: String,
    },
    /// Append the nodes of a flow file and save
    Import {
        flow_id: String,

        /// Flow file to import
        file: PathBuf,
    },
    /// Write the saved flow document to a file
    Export {
        flow_id: String,

        /// Output path; defaults to `{slug}.json`
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Publish the flow as its next version
    Publish {
        flow_id: String,
    },
    /// List published versions, newest first
    Versions {
        flow_id: String,
    },
    /// Replace the flow's graph with a published version and save
    Restore {
        flow_id: String,

        /// Version number, e.g. `3`
        version: String,
    },
    /// Rename the flow
    Rename {
        flow_id: String,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        description: Option<String>,
    },
    /// Store a copy of the flow as a new flow
    Duplicate {
        flow_id: String,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::New { .. } => "new",
            Self::Inspect { .. } => "inspect",
            Self::Import { .. } => "import",
            Self::Export { .. } => "export",
            Self::Publish { .. } => "publish",
            Self::Versions { .. } => "versions",
            Self::Restore { .. } => "restore",
            Self::Rename { .. } => "rename",
            Self::Duplicate { .. } => "duplicate",
        }
    }
}

/// Runs `command` against the store in `config.store_dir`.
///
/// # Errors
///
/// Returns an error if the underlying editor operation or file access fails.
pub async fn run(command: Command, config: &CliConfig) -> Result<String, Report<CliError>> {
    let command_name = command.name();
    tracing::debug!(command = command_name, store_dir = %config.store_dir.display(), "Running command");
    let store = FileFlowStore::new(&config.store_dir);
    let context = move || CliError::Command {
        command: command_name,
    };

    match command {
        Command::New { name, slug } => {
            let mut editor = FlowEditor::new(store, config.editor.clone(), FlowDraft::new(name, slug));
            editor
                .save()
                .await
                .map_err(|report| report.context(context()))?;
            let flow_id = editor.flow().id.clone().map(String::from).unwrap_or_default();
            Ok(format!("{flow_id}\n"))
        }
        Command::Inspect { flow_id } => {
            let editor = open(store, config, &flow_id, context).await?;
            Ok(describe(&editor))
        }
        Command::Import { flow_id, file } => {
            let raw = read_file(&file).await?;
            let mut editor = open(store, config, &flow_id, context).await?;
            editor
                .import_file(&raw)
                .map_err(|report| report.context(context()))?;
            editor
                .save()
                .await
                .map_err(|report| report.context(context()))?;
            Ok(notifications(&mut editor))
        }
        Command::Export { flow_id, out } => {
            let editor = open(store, config, &flow_id, context).await?;
            let document = editor
                .export()
                .map_err(|report| report.context(context()))?;
            let path = out.unwrap_or_else(|| PathBuf::from(editor.export_file_name()));
            write_file(&path, &document).await?;
            Ok(format!("Exported {}\n", path.display()))
        }
        Command::Publish { flow_id } => {
            let mut editor = open(store, config, &flow_id, context).await?;
            editor
                .publish()
                .await
                .map_err(|report| report.context(context()))?;
            Ok(notifications(&mut editor))
        }
        Command::Versions { flow_id } => {
            let editor = open(store, config, &flow_id, context).await?;
            let mut output = String::new();
            for version in editor.versions() {
                let _ = writeln!(
                    output,
                    "v{}\t{}\t{}",
                    version_number(version.version.as_deref()),
                    version.name.as_deref().unwrap_or("-"),
                    version
                        .created
                        .as_ref()
                        .and_then(parse_created)
                        .map_or_else(|| "-".to_string(), |created| created.to_rfc3339()),
                );
            }
            Ok(output)
        }
        Command::Restore { flow_id, version } => {
            let mut editor = open(store, config, &flow_id, context).await?;
            let wanted = version_number(Some(&version));
            let Some(found) = editor
                .versions()
                .iter()
                .find(|v| version_number(v.version.as_deref()) == wanted)
                .cloned()
            else {
                return Err(CliError::VersionNotFound { version }.into());
            };
            editor
                .restore_version(&found)
                .map_err(|report| report.context(context()))?;
            editor
                .save()
                .await
                .map_err(|report| report.context(context()))?;
            Ok(notifications(&mut editor))
        }
        Command::Rename {
            flow_id,
            name,
            description,
        } => {
            let mut editor = open(store, config, &flow_id, context).await?;
            editor
                .rename(&name, description.as_deref())
                .await
                .map_err(|report| report.context(context()))?;
            Ok(notifications(&mut editor))
        }
        Command::Duplicate { flow_id } => {
            let mut editor = open(store, config, &flow_id, context).await?;
            let copy = editor
                .duplicate()
                .await
                .map_err(|report| report.context(context()))?;
            let mut output = notifications(&mut editor);
            let _ = writeln!(output, "{}", copy.id.map(String::from).unwrap_or_default());
            Ok(output)
        }
    }
}

async fn open<S: FlowStore>(
    store: S,
    config: &CliConfig,
    flow_id: &str,
    context: impl Fn() -> CliError,
) -> Result<FlowEditor<S>, Report<CliError>> {
    FlowEditor::open(store, config.editor.clone(), &FlowId::from(flow_id))
        .await
        .map_err(|report| report.context(context()))
}

fn notifications<S: FlowStore>(editor: &mut FlowEditor<S>) -> String {
    let mut output = String::new();
    for notification in editor.drain_notifications() {
        let _ = writeln!(output, "{notification}");
    }
    output
}

fn describe<S: FlowStore>(editor: &FlowEditor<S>) -> String {
    let graph = editor.graph();
    let flow = editor.flow();
    let mut output = String::new();
    let _ = writeln!(output, "{} ({})", flow.name, flow.slug);
    let _ = writeln!(output, "nodes: {}", graph.node_count());
    for node in graph.nodes() {
        let _ = writeln!(
            output,
            "  {}\t{}\t{}\t({}, {})",
            node.id, node.data.slug, node.data.title, node.position.x, node.position.y
        );
    }
    let _ = writeln!(output, "edges: {}", graph.edge_count());
    for edge in graph.edges() {
        let _ = writeln!(
            output,
            "  {}:{} -> {}:{}",
            edge.source, edge.source_port, edge.target, edge.target_port
        );
    }
    let open_ends: Vec<String> = editor
        .add_affordances()
        .iter()
        .map(ToString::to_string)
        .collect();
    let _ = writeln!(output, "open ends: {}", open_ends.join(", "));
    let _ = writeln!(output, "versions: {}", editor.versions().len());
    output
}

async fn read_file(path: &Path) -> Result<String, Report<CliError>> {
    Ok(tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CliError::Io {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?)
}

async fn write_file(path: &Path, contents: &str) -> Result<(), Report<CliError>> {
    Ok(tokio::fs::write(path, contents)
        .await
        .map_err(|e| CliError::Io {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?)
}
