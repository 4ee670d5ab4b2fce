use clap::{Args, Parser, Subcommand, ValueEnum};
use nagare::graph::{Graph, NodeGroup};
use nagare::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Run, wire and export flowcharts from the command line
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a single predicate against a JSON context
    Eval {
        predicate: String,
        /// Context as a JSON object
        #[arg(short, long, default_value = "{}")]
        context: String,
        /// Explain how the result was reached
        #[arg(short, long)]
        explain: bool,
    },
    /// Step through a flowchart until it halts
    Run {
        #[command(flatten)]
        input: FlowchartArgs,
        /// Give up after this many steps
        #[arg(long, default_value_t = 1000)]
        max_steps: usize,
    },
    /// Run a flowchart on the periodic tick, printing every cursor move
    Play {
        #[command(flatten)]
        input: FlowchartArgs,
        /// Stop after this many cursor changes
        #[arg(long, default_value_t = 100)]
        max_moves: usize,
    },
    /// Propose edges between matching output and input ports
    Suggest {
        #[command(flatten)]
        input: FlowchartArgs,
        /// Require declared port types to match exactly
        #[arg(long)]
        strict_types: bool,
        /// Compare port names verbatim
        #[arg(long)]
        no_normalize: bool,
        /// Add every suggestion and write the result to this file
        #[arg(long)]
        apply_to: Option<PathBuf>,
    },
    /// Print the Cubit code for a flowchart
    Codegen {
        #[command(flatten)]
        input: FlowchartArgs,
    },
    /// Print the node groups of a flowchart
    Groups {
        #[command(flatten)]
        input: FlowchartArgs,
        #[arg(long, value_enum, default_value_t = GroupByCli::Group)]
        by: GroupByCli,
    },
}

#[derive(Args, Debug)]
struct FlowchartArgs {
    /// Path to an exported flowchart JSON document
    flowchart: PathBuf,
    /// Context as a JSON object
    #[arg(short, long, default_value = "{}")]
    context: String,
    /// Optional engine configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GroupByCli {
    Group,
    Label,
    Shape,
}

impl From<GroupByCli> for GroupBy {
    fn from(value: GroupByCli) -> Self {
        match value {
            GroupByCli::Group => GroupBy::Group,
            GroupByCli::Label => GroupBy::Label,
            GroupByCli::Shape => GroupBy::Shape,
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Eval {
            predicate,
            context,
            explain,
        } => run_eval(&predicate, &context, explain),
        Command::Run { input, max_steps } => run_steps(&input, max_steps),
        Command::Play { input, max_moves } => run_playback(&input, max_moves),
        Command::Suggest {
            input,
            strict_types,
            no_normalize,
            apply_to,
        } => run_suggest(&input, strict_types, no_normalize, apply_to.as_deref()),
        Command::Codegen { input } => println!("{}", open_session(&input).generate_code()),
        Command::Groups { input, by } => {
            let session = open_session(&input);
            print_groups(&session.groups(by.into()));
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("Failed to initialize tracing: {}", e);
    }
}

fn open_session(input: &FlowchartArgs) -> Session {
    let graph = load_graph(&input.flowchart);
    let config = match &input.config {
        Some(path) => EngineConfig::from_file(path).unwrap_or_else(|e| {
            exit_with_error(&format!(
                "Failed to load configuration '{}': {}",
                path.display(),
                e
            ))
        }),
        None => EngineConfig::default(),
    };
    Session::builder()
        .with_graph(graph)
        .with_config(config)
        .with_context_json(input.context.as_str())
        .build()
}

fn load_graph(path: &Path) -> Graph {
    FlowchartDocument::from_file(path)
        .and_then(FlowchartDocument::into_graph)
        .unwrap_or_else(|e| {
            exit_with_error(&format!(
                "Failed to load flowchart '{}': {}",
                path.display(),
                e
            ))
        })
}

fn run_eval(predicate: &str, context_json: &str, explain: bool) {
    let context = Context::from_json_lenient(context_json);
    if !explain {
        println!("{}", Evaluator::evaluate_predicate_safe(predicate, &context));
        return;
    }

    match compile(predicate) {
        Ok(expression) => {
            let start = Instant::now();
            let trace = Evaluator::trace(&expression, &context);
            let elapsed = start.elapsed();
            let value = trace.get_outcome();
            println!("Result: {} (value {})", value.is_truthy(), value);
            println!("Reason: {}", TraceFormatter::format_trace(&trace));
            println!("Evaluated in {:?}", elapsed);
        }
        Err(e) => {
            println!("Result: false");
            println!("Reason: predicate does not parse: {}", e);
        }
    }
}

fn run_steps(input: &FlowchartArgs, max_steps: usize) {
    let mut session = open_session(input);
    for _ in 0..max_steps {
        match session.step() {
            StepOutcome::Entered(node) => println!("enter  {}", describe(session.graph(), node)),
            StepOutcome::Advanced {
                to, edge, choice, ..
            } => println!(
                "follow #{edge:<3} {:<22} -> {}",
                format!("{choice:?}"),
                describe(session.graph(), to)
            ),
            StepOutcome::Halted { at } => {
                println!("halt   {}", describe(session.graph(), at));
                return;
            }
            StepOutcome::EmptyGraph => {
                println!("The flowchart has no nodes.");
                return;
            }
        }
    }
    println!("Stopped after {} steps without halting.", max_steps);
}

fn run_playback(input: &FlowchartArgs, max_moves: usize) {
    let session = open_session(input);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to start runtime: {}", e)));

    runtime.block_on(async move {
        let graph = session.graph().clone();
        let mut playback = Playback::new(session);
        let mut cursor_rx = playback.subscribe();

        match playback.toggle_run() {
            Ok(RunToggle::Started) => {}
            Ok(_) => {
                println!("The flowchart has no nodes.");
                return;
            }
            Err(e) => exit_with_error(&e.to_string()),
        }
        print_cursor(&graph, *cursor_rx.borrow_and_update());

        let mut moves = 0;
        while cursor_rx.changed().await.is_ok() {
            let cursor = *cursor_rx.borrow_and_update();
            print_cursor(&graph, cursor);
            moves += 1;
            if !cursor.running {
                break;
            }
            if moves >= max_moves {
                playback.stop();
                println!("Stopped after {} moves.", moves);
                break;
            }
        }
        playback.finished().await;
    });
}

fn print_cursor(graph: &Graph, cursor: Cursor) {
    match cursor.current {
        Some(node) if cursor.running => println!("at     {}", describe(graph, node)),
        Some(node) => println!("paused {}", describe(graph, node)),
        None => println!("halted"),
    }
}

fn run_suggest(
    input: &FlowchartArgs,
    strict_types: bool,
    no_normalize: bool,
    apply_to: Option<&Path>,
) {
    let mut session = open_session(input);
    let options = SuggestionOptions {
        normalize: !no_normalize && session.config().suggestions.normalize,
        strict_types: strict_types || session.config().suggestions.strict_types,
    };

    let suggestions = session.compute_suggestions_with(options);
    if suggestions.is_empty() {
        println!("No suggestions.");
        return;
    }
    for s in suggestions {
        println!(
            "{:<6} {} -> {}  port '{}' ({} -> {})",
            s.id.to_string(),
            s.from,
            s.to,
            s.port_name,
            s.from_type.as_deref().unwrap_or("any"),
            s.to_type.as_deref().unwrap_or("any")
        );
    }

    if let Some(path) = apply_to {
        let added = session.apply_suggestions(ApplyScope::All);
        session.to_document().save(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to write '{}': {}", path.display(), e))
        });
        println!("Added {} edges, saved to {}", added, path.display());
    }
}

fn print_groups(groups: &[NodeGroup]) {
    for group in groups {
        println!(
            "{} \"{}\" nodes {:?} at ({}, {}) size {}x{}",
            group.id,
            group.title,
            group.node_ids,
            group.bbox.x,
            group.bbox.y,
            group.bbox.w,
            group.bbox.h
        );
    }
}

fn describe(graph: &Graph, id: NodeId) -> String {
    match graph.node(id) {
        Some(node) => match node.predicate() {
            Some(label) => format!("{} [{}] {}", id, node.shape, label),
            None => format!("{} [{}]", id, node.shape),
        },
        None => id.to_string(),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
