use clap::{Parser, ValueEnum};

use botforge::prelude::*;
use std::fs;
use std::time::Instant;

/// Which pipeline to run against the project graph.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeCli {
    /// Compute canvas coordinates and print them.
    Layout,
    /// Emit the runnable Python bot program.
    Generate,
}

/// A graph-to-code compiler for visual Telegram bot flows
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the stored project JSON (flat or multi-sheet)
    project_path: String,

    /// What to do with the graph
    #[arg(short, long, value_enum, default_value = "generate")]
    mode: ModeCli,

    /// Bot name used for the logger and suggested filename
    #[arg(short, long, default_value = "my_bot")]
    bot_name: String,

    /// Project id baked into the emitted program's API calls
    #[arg(short, long, default_value_t = 0)]
    project_id: i64,

    /// Emit the persistence middleware and save-message helpers
    #[arg(long)]
    user_database: bool,

    /// Prefix each handler with a generation-provenance comment
    #[arg(long)]
    comments: bool,

    /// Use the tighter mobile spacing constants for layout
    #[arg(long)]
    mobile: bool,

    /// Write the generated program here instead of the suggested filename
    #[arg(short, long)]
    output: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "botforge=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let json = fs::read_to_string(&cli.project_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read project file '{}': {}",
            &cli.project_path, e
        ))
    });
    let graph = ProjectGraph::from_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse project: {}", e)));

    println!(
        "Loaded project: {} nodes, {} connections",
        graph.nodes.len(),
        graph.connections.len()
    );

    match cli.mode {
        ModeCli::Layout => run_layout(graph, cli.mobile),
        ModeCli::Generate => run_generate(graph, &cli),
    }
}

fn run_layout(graph: ProjectGraph, mobile: bool) {
    let options = if mobile {
        LayoutOptions::mobile()
    } else {
        LayoutOptions::default()
    };

    let start = Instant::now();
    let placed = layout(&graph.nodes, &graph.connections, &options);
    let duration = start.elapsed();

    for node in &placed {
        println!(
            "  {:<24} {:<10} x={:>8.1} y={:>8.1}",
            node.id,
            node.kind.as_str(),
            node.position.x,
            node.position.y
        );
    }
    println!("\nLayout finished in {:?}", duration);
}

fn run_generate(graph: ProjectGraph, cli: &Cli) {
    let templates = TemplateLibrary::new();
    let ctx = GenerationContext::new(cli.bot_name.clone(), graph, cli.project_id)
        .with_user_database(cli.user_database)
        .with_comments(cli.comments);

    let start = Instant::now();
    let program = ProgramAssembler::new(&templates).assemble(&ctx);
    let duration = start.elapsed();

    let path = cli.output.clone().unwrap_or_else(|| program.filename.clone());
    fs::write(&path, &program.source)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to write '{}': {}", path, e)));

    println!(
        "Generated {} ({} lines) in {:?}",
        path,
        program.source.lines().count(),
        duration
    );
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
