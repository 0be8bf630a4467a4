use std::fmt::Write as _;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use flowplace_core::{
    DiagramOutput, LayoutAlgorithm, LayoutConfig, RankDirection, layout_graph, parse_flowchart,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read '{path}': {source}")]
    Read { path: String, source: io::Error },
    #[error("'{0}' is empty")]
    EmptyInput(String),
    #[error(transparent)]
    Core(#[from] flowplace_core::Error),
}

impl From<flowplace_core::ConfigError> for CliError {
    fn from(e: flowplace_core::ConfigError) -> Self {
        CliError::Core(e.into())
    }
}

impl From<flowplace_core::ParseError> for CliError {
    fn from(e: flowplace_core::ParseError) -> Self {
        CliError::Core(e.into())
    }
}

impl From<flowplace_core::LayoutError> for CliError {
    fn from(e: flowplace_core::LayoutError) -> Self {
        CliError::Core(e.into())
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Parser, Debug)]
#[command(
    name = "flowplace",
    about = "Compute node positions for a Mermaid flowchart",
    after_help = "Examples:\n  flowplace --file diagram.mmd\n  cat diagram.mmd | flowplace --layout hilbert\n  flowplace -f diagram.txt --horizontal 7 --vertical 5 --format text"
)]
struct Cli {
    /// Flowchart source file, `-` for stdin
    #[arg(long, short = 'f', default_value = "-")]
    file: PathBuf,

    /// Layout algorithm: flow or hilbert
    #[arg(long, short = 'l')]
    layout: Option<LayoutAlgorithm>,

    /// JSON layout config; command-line options override it
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Connection points on the top and bottom sides (1-20)
    #[arg(long)]
    horizontal: Option<u32>,

    /// Connection points on the left and right sides (1-20)
    #[arg(long)]
    vertical: Option<u32>,

    /// Where level 0 goes in the flow layout: bottom-up or top-down
    #[arg(long)]
    rank_direction: Option<RankDirection>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Log parsing and layout details to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn read_source(path: &Path) -> Result<String, CliError> {
    let name = path.display().to_string();
    let content = if name == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| CliError::Read { path: "<stdin>".into(), source })?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|source| CliError::Read { path: name.clone(), source })?
    };

    if content.trim().is_empty() {
        return Err(CliError::EmptyInput(name));
    }
    tracing::info!(source = %name, bytes = content.len(), "loaded flowchart");
    Ok(content)
}

fn load_config(cli: &Cli) -> Result<LayoutConfig, CliError> {
    let mut cfg = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|source| CliError::Read {
                path: path.display().to_string(),
                source,
            })?;
            LayoutConfig::from_json(&json)?
        }
        None => LayoutConfig::default(),
    };

    if let Some(layout) = cli.layout {
        cfg.algorithm = layout;
    }
    if let Some(h) = cli.horizontal {
        cfg.horizontal_connections = h;
    }
    if let Some(v) = cli.vertical {
        cfg.vertical_connections = v;
    }
    if let Some(dir) = cli.rank_direction {
        cfg.rank_direction = dir;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn render_text(output: &DiagramOutput) -> String {
    let mut out = String::new();
    for n in &output.nodes {
        let level = n.level.map(|l| l.to_string()).unwrap_or_else(|| "-".into());
        let _ = writeln!(
            out,
            "{}\t{}\t{:.2}\t{:.2}\t{}",
            n.id, level, n.center.x, n.center.y, n.label
        );
    }
    out
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let cfg = load_config(cli)?;
    let source = read_source(&cli.file)?;

    let graph = parse_flowchart(&source)?;
    tracing::info!(nodes = graph.len(), edges = graph.edges().len(), "parsed");

    let result = layout_graph(&graph, &cfg)?;
    tracing::info!(algorithm = %cfg.algorithm, placed = result.len(), "layout complete");

    let output = DiagramOutput::from_layout(&graph, &result, &cfg);
    match cli.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&output).map_err(flowplace_core::Error::from)?;
            println!("{json}");
        }
        OutputFormat::Text => print!("{}", render_text(&output)),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
