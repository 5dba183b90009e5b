use clap::{Parser, ValueEnum};
use graft::document::read_json;
use graft::prelude::*;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Define a CLI-specific enum for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum DirectionCli {
    Encapsulate,
    Inline,
}

impl From<DirectionCli> for Direction {
    fn from(direction: DirectionCli) -> Self {
        match direction {
            DirectionCli::Encapsulate => Direction::Encapsulate,
            DirectionCli::Inline => Direction::Inline,
        }
    }
}

/// Moves parts of a dataflow graph document into or out of a graph unit
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the host graph document (JSON)
    document_path: String,

    /// Id of the graph unit to move into or out of
    #[arg(short, long)]
    unit: String,

    /// Which way to move
    #[arg(short, long, value_enum, default_value = "inline")]
    direction: DirectionCli,

    /// Collapse map JSON; required to encapsulate, planned automatically when inlining
    #[arg(short, long)]
    map: Option<String>,

    /// Host wiring JSON to restore when inlining with an explicit map
    #[arg(short, long)]
    connect: Option<String>,

    /// Where to write the result; defaults to printing it
    #[arg(short, long)]
    output: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let start = Instant::now();

    let mut doc = GraphDocument::from_file(&cli.document_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to load graph document '{}': {}",
            &cli.document_path, e
        ))
    });

    let map: Option<CollapseMap> = cli.map.as_deref().map(|path| {
        read_json(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load collapse map '{}': {}", path, e)))
    });

    let report = match (Direction::from(cli.direction), map) {
        (Direction::Encapsulate, Some(map)) => doc.graph.encapsulate_into(&cli.unit, map),
        (Direction::Encapsulate, None) => {
            exit_with_error("A collapse map (--map) is required to encapsulate.")
        }
        (Direction::Inline, None) => doc.graph.explode_unit(&cli.unit),
        (Direction::Inline, Some(map)) => {
            let connect: ConnectOpt = match cli.connect.as_deref() {
                Some(path) => read_json(path).unwrap_or_else(|e| {
                    exit_with_error(&format!("Failed to load connect options '{}': {}", path, e))
                }),
                None => ConnectOpt::for_unit(&doc.graph, &cli.unit),
            };
            inline_with_map(&mut doc.graph, &cli.unit, map, connect)
        }
    }
    .unwrap_or_else(|e| exit_with_error(&format!("Move failed: {}", e)));

    if let Err(e) = doc.graph.validate() {
        exit_with_error(&format!("Resulting graph is inconsistent: {}", e));
    }

    match &cli.output {
        Some(path) => doc
            .save(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to write '{}': {}", path, e))),
        None => {
            let json = doc
                .to_json()
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize graph: {}", e)));
            println!("{}", json);
        }
    }

    info!(elapsed = ?start.elapsed(), "done");
    eprintln!("{}", report);
}

/// Inlines with a hand-written map, keeping the graph unit in place.
fn inline_with_map(
    host: &mut Graph,
    graph_id: &str,
    map: CollapseMap,
    connect: ConnectOpt,
) -> std::result::Result<MoveReport, MoveError> {
    let mut nested = host.take_unit_graph(graph_id)?;
    let result = SubgraphMove::builder(graph_id, map)
        .with_connect(connect)
        .direction(Direction::Inline)
        .build()
        .apply(&mut Scopes::split(&mut nested, host));
    host.put_unit_graph(graph_id, nested)?;
    result
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
