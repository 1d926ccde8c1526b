use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use taiwa::prelude::*;

/// Load, render, validate and submit conversational form schemas
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Optional controller config JSON file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the component tree as a user would see it
    Render {
        schema: PathBuf,
        /// Answers JSON to show in the tree
        #[arg(short, long)]
        answers: Option<PathBuf>,
    },
    /// Validate an answers file against a schema
    Validate { schema: PathBuf, answers: PathBuf },
    /// Report schema defects such as reused component ids
    Lint { schema: PathBuf },
    /// Answer a schema interactively and print the payload it would send
    Fill { schema: PathBuf },
    /// Validate and send an answers file to the schema's endpoint
    #[cfg(feature = "http")]
    Submit { schema: PathBuf, answers: PathBuf },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("taiwa=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ControllerConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => ControllerConfig::default(),
    };

    match cli.command {
        Command::Render { schema, answers } => run_render(&schema, answers.as_deref()),
        Command::Validate { schema, answers } => run_validate(&schema, &answers),
        Command::Lint { schema } => run_lint(&schema),
        Command::Fill { schema } => run_fill(&schema, config),
        #[cfg(feature = "http")]
        Command::Submit { schema, answers } => run_submit(&schema, &answers, config).await,
    }
}

fn load_schema(path: &Path) -> ChatSchema {
    SchemaLoader::shared().from_file(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to load schema '{}': {}", path.display(), e))
    })
}

fn load_answers(path: &Path) -> StateStore {
    let content = std::fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read answers '{}': {}", path.display(), e))
    });
    let answers: AnswerState = serde_json::from_str(&content)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse answers JSON: {}", e)));
    StateStore::from_answers(answers)
}

fn run_render(schema_path: &Path, answers_path: Option<&Path>) {
    let schema = load_schema(schema_path);
    let store = answers_path.map(load_answers).unwrap_or_default();
    let errors = match answers_path {
        Some(_) => Validator::validate(&schema.components, &store),
        None => ErrorMap::new(),
    };

    println!("{}", schema.message);
    print!("{}", DisplayRender(&Interpreter::render(&schema.components, &store, &errors)));
}

fn run_validate(schema_path: &Path, answers_path: &Path) {
    let start = Instant::now();
    let schema = load_schema(schema_path);
    let store = load_answers(answers_path);

    let errors = Validator::validate(&schema.components, &store);
    let missing = Validator::missing_required(&schema.components, &store);
    let duration = start.elapsed();

    if errors.is_empty() && missing.is_empty() {
        println!("Valid: {} leaves checked in {:?}", schema.leaves().len(), duration);
        return;
    }
    for (id, message) in &errors {
        println!("  {}: {}", id, message);
    }
    for path in missing.iter().filter(|p| p.leaf().is_some_and(|id| !errors.contains_key(id))) {
        println!("  {}: missing", path);
    }
    std::process::exit(2);
}

fn run_lint(schema_path: &Path) {
    let schema = load_schema(schema_path);
    let duplicates = schema.duplicate_ids();
    let unknown: Vec<_> = schema
        .nodes()
        .into_iter()
        .filter_map(|(path, node)| match &node.kind {
            ComponentKind::Unknown { kind, .. } => Some((path, kind.clone())),
            _ => None,
        })
        .collect();

    for duplicate in &duplicates {
        let paths: Vec<String> = duplicate.paths.iter().map(ToString::to_string).collect();
        println!("duplicate id '{}' at {}", duplicate.id, paths.join(", "));
    }
    for (path, kind) in &unknown {
        println!("unknown component type '{}' at {}", kind, path);
    }
    if schema.active_form().is_none() {
        println!("no form with an apiConfig, submissions are acknowledged locally");
    }

    if duplicates.is_empty() && unknown.is_empty() {
        println!("No defects found in '{}'.", schema_path.display());
    } else {
        std::process::exit(2);
    }
}

/// Prompts for every editable leaf until the controller accepts a submission.
fn run_fill(schema_path: &Path, config: ControllerConfig) {
    let schema = load_schema(schema_path);
    let leaves: Vec<(FieldPath, ComponentNode)> = schema
        .leaves()
        .into_iter()
        .map(|(path, node)| (path, node.clone()))
        .collect();

    println!("--- {} ---", schema.message);
    let mut controller = Controller::new(config);
    controller.bootstrap(schema);

    let mut pending: Vec<&(FieldPath, ComponentNode)> = leaves.iter().collect();
    let ticket = loop {
        for (path, node) in &pending {
            prompt_leaf(&mut controller, path, node);
        }
        match controller.begin_submit() {
            Ok(ticket) => break ticket,
            Err(SubmitRejection::Invalid { errors, missing }) => {
                println!("\nPlease fix the following:");
                for (id, message) in &errors {
                    println!("  {}: {}", id, message);
                }
                pending = leaves
                    .iter()
                    .filter(|(path, node)| errors.contains_key(&node.id) || missing.contains(path))
                    .collect();
            }
            Err(e) => exit_with_error(&e.to_string()),
        }
    };

    match ticket.api_config() {
        Some(api) => println!("\nWould send to {:?} {}:", api.method, api.endpoint),
        None => println!("\nNo endpoint configured. Payload:"),
    }
    match serde_json::to_string_pretty(ticket.payload()) {
        Ok(json) => println!("{}", json),
        Err(e) => exit_with_error(&format!("Failed to encode payload: {}", e)),
    }
}

fn prompt_leaf(controller: &mut Controller, path: &FieldPath, node: &ComponentNode) {
    let hint = match &node.kind {
        ComponentKind::Button(_) | ComponentKind::Unknown { .. } => return,
        ComponentKind::Select(spec) => {
            let values: Vec<&str> = spec.options.iter().map(|o| o.value.as_str()).collect();
            format!(" ({})", values.join("/"))
        }
        ComponentKind::Switch(_) => " (y/n)".to_string(),
        ComponentKind::Rating(spec) => format!(" (0-{})", spec.max_rating),
        ComponentKind::Date(spec) => format!(" ({:?})", spec.mode),
        _ => String::new(),
    };

    loop {
        let marker = if node.is_required() { "*" } else { "" };
        let line = prompt_for_input(&format!("{}{}{}", node.display_name(), marker, hint), None);
        if line.is_empty() && !node.is_required() {
            return;
        }
        let raw = match &node.kind {
            ComponentKind::Switch(_) => AnswerValue::Bool(matches!(line.as_str(), "y" | "yes" | "true")),
            ComponentKind::Rating(_) => match line.parse::<f64>() {
                Ok(n) => AnswerValue::Number(n),
                Err(_) => {
                    println!("  Please enter a number.");
                    continue;
                }
            },
            _ => AnswerValue::Text(line),
        };
        match controller.edit(path, raw) {
            Ok(()) => return,
            Err(e) => println!("  {}", e),
        }
    }
}

#[cfg(feature = "http")]
async fn run_submit(schema_path: &Path, answers_path: &Path, config: ControllerConfig) {
    let schema = load_schema(schema_path);
    let answers = load_answers(answers_path);

    let mut controller = Controller::new(config);
    let leaves: Vec<FieldPath> = schema.leaves().into_iter().map(|(path, _)| path).collect();
    controller.bootstrap(schema);
    for path in leaves {
        if let Some(value) = answers.get(&path) {
            if let Err(e) = controller.edit(&path, value.clone()) {
                exit_with_error(&format!("Answer for '{}' rejected: {}", path, e));
            }
        }
    }

    let start = Instant::now();
    let outcome = controller
        .submit(&HttpTransport::new())
        .await
        .unwrap_or_else(|e| exit_with_error(&format!("Submission refused: {}", e)));
    let duration = start.elapsed();

    for message in controller.messages().iter().skip(2) {
        println!("{:?}: {}", message.role, message.content);
    }
    println!("Outcome: {:?} in {:?}", outcome, duration);
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    if let Err(e) = io::stdout().flush() {
        exit_with_error(&format!("Failed to write prompt: {}", e));
    }
    if let Err(e) = io::stdin().read_line(&mut line) {
        exit_with_error(&format!("Failed to read line: {}", e));
    }
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
