//! Command-line front end for `urosgen`.
//!
//! Two subcommands mirror the two halves of the pipeline:
//!
//! - `urosgen graph` scans interface share directories and writes the schema
//!   graph as interchange-format JSON
//! - `urosgen generate` loads a graph and an endpoint configuration, runs the
//!   engine, and writes the artifact as JSON and/or a rendered main source

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use urosgen::codegen::{
    CodeGenEngine, DEFAULT_MAIN_TEMPLATE, EndpointSpec, RenderOptions, TemplateSet,
    render_main_source,
};
use urosgen::registry::{InterfaceRegistry, ResolutionPolicy};
use urosgen::schema::{PackageGraph, ParseMode};

#[derive(Parser)]
#[command(name = "urosgen", version, about = "micro-ROS project code generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan share directories and write the interface graph as JSON
    Graph {
        /// Root directory to scan; may be given multiple times
        #[arg(long = "share-dir", required = true)]
        share_dirs: Vec<PathBuf>,

        /// Output path for the interface graph
        #[arg(long, default_value = "interface_graph.json")]
        out: PathBuf,

        /// Resolve unqualified references to the lexicographically first
        /// match instead of preferring the referencing package
        #[arg(long)]
        lexicographic: bool,

        /// Fail on lines that match neither the field grammar nor a constant
        #[arg(long)]
        strict: bool,
    },

    /// Generate source fragments from a graph and an endpoint configuration
    Generate {
        /// Interface graph JSON produced by `urosgen graph`
        #[arg(long)]
        graph: PathBuf,

        /// Endpoint list JSON
        #[arg(long)]
        endpoints: PathBuf,

        /// Custom template set JSON (name → template text)
        #[arg(long)]
        templates: Option<PathBuf>,

        /// Custom main-source template file
        #[arg(long)]
        main_template: Option<PathBuf>,

        /// Write the artifact buckets as JSON to this path
        #[arg(long)]
        out: Option<PathBuf>,

        /// Render the main source to this path
        #[arg(long)]
        main_out: Option<PathBuf>,

        /// Node name substituted into the main source
        #[arg(long, default_value = "node")]
        node_name: String,

        /// Node namespace substituted into the main source
        #[arg(long, default_value = "")]
        namespace: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Graph {
            share_dirs,
            out,
            lexicographic,
            strict,
        } => build_graph(&share_dirs, &out, lexicographic, strict),
        Command::Generate {
            graph,
            endpoints,
            templates,
            main_template,
            out,
            main_out,
            node_name,
            namespace,
        } => generate(
            &graph,
            &endpoints,
            templates.as_deref(),
            main_template.as_deref(),
            out.as_deref(),
            main_out.as_deref(),
            RenderOptions {
                node_name,
                namespace,
            },
        ),
    }
}

fn build_graph(
    share_dirs: &[PathBuf],
    out: &std::path::Path,
    lexicographic: bool,
    strict: bool,
) -> Result<(), Box<dyn Error>> {
    let mut registry = InterfaceRegistry::new();
    for dir in share_dirs {
        registry = registry.root(dir);
    }
    if lexicographic {
        registry = registry.policy(ResolutionPolicy::FirstMatchLexicographic);
    }
    if strict {
        registry = registry.mode(ParseMode::Strict);
    }

    let outcome = registry.build()?;
    for diagnostic in &outcome.diagnostics {
        warn!("{diagnostic}");
    }

    fs::write(out, serde_json::to_string_pretty(&outcome.graph)?)?;
    info!(
        "Wrote {} msgs, {} srvs, {} actions -> {}",
        outcome.graph.message_count(),
        outcome.graph.service_count(),
        outcome.graph.action_count(),
        out.display()
    );
    Ok(())
}

fn generate(
    graph_path: &std::path::Path,
    endpoints_path: &std::path::Path,
    templates_path: Option<&std::path::Path>,
    main_template_path: Option<&std::path::Path>,
    out: Option<&std::path::Path>,
    main_out: Option<&std::path::Path>,
    options: RenderOptions,
) -> Result<(), Box<dyn Error>> {
    let graph: PackageGraph = serde_json::from_str(&fs::read_to_string(graph_path)?)?;
    let endpoints: Vec<EndpointSpec> = serde_json::from_str(&fs::read_to_string(endpoints_path)?)?;
    let templates = match templates_path {
        Some(path) => TemplateSet::from_json_file(path)?,
        None => TemplateSet::default(),
    };

    let engine = CodeGenEngine::new(&graph, &templates);
    let artifact = engine.generate(&endpoints)?;
    info!(
        endpoints = endpoints.len(),
        headers = artifact.required_headers.len(),
        "generation complete"
    );

    if let Some(path) = out {
        fs::write(path, serde_json::to_string_pretty(&artifact)?)?;
        info!("Wrote artifact -> {}", path.display());
    }

    if let Some(path) = main_out {
        let template = match main_template_path {
            Some(template_path) => fs::read_to_string(template_path)?,
            None => DEFAULT_MAIN_TEMPLATE.to_string(),
        };
        fs::write(path, render_main_source(&artifact, &template, &options))?;
        info!("Generated main source -> {}", path.display());
    }

    if out.is_none() && main_out.is_none() {
        println!("{}", serde_json::to_string_pretty(&artifact)?);
    }

    Ok(())
}
