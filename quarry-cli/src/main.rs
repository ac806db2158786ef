//! Quarry CLI
//!
//! Runs a CSS selector against a JSON document description and prints every
//! match with its document path.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, debug};
use owo_colors::OwoColorize;
use quarry_dom::{DomTree, NodeId};
use quarry_engine::{ALL_STRATEGIES, MemoryEngine};
use quarry_selector::pseudo::{Behavior, StrategyKind};
use quarry_selector::{CompiledSelector, CompilerConfig, CssFilter, QueryEngine, SelectorCompiler};

/// Quarry: CSS selectors with native, path-query and filter fallbacks
#[derive(Parser, Debug)]
#[command(name = "quarry")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Odd list items
    quarry page.json 'ul > li:nth-child(2n+1)'

    # Pretend the engine cannot evaluate :nth-child natively
    quarry --no-native nth-child page.json 'li:nth-child(3)'

    # Never probe; show the path queries that run instead
    quarry --path-only --plan page.json 'div:has(> p):last-child'
")]
struct Cli {
    /// JSON document description
    #[arg(value_name = "DOCUMENT")]
    document: PathBuf,

    /// Selector to run from the document node
    #[arg(value_name = "SELECTOR")]
    selector: String,

    /// Skip native probing and use path queries for every pseudo-class
    #[arg(long)]
    path_only: bool,

    /// Structural pseudo-class the engine rejects natively (repeatable)
    #[arg(long, value_name = "PSEUDO")]
    no_native: Vec<String>,

    /// Compiler configuration file (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the compiled plan before the matches
    #[arg(long)]
    plan: bool,

    /// More log output (-v info, -vv debug, -vvv trace); `RUST_LOG` overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;
    if cli.path_only {
        config.native_probing = false;
    }

    let rejected = cli
        .no_native
        .iter()
        .map(String::as_str)
        .map(strategy_kind)
        .collect::<Result<Vec<_>>>()?;

    let json = fs::read_to_string(&cli.document)
        .with_context(|| format!("failed to read {}", cli.document.display()))?;
    let tree = DomTree::from_json(&json)
        .with_context(|| format!("{} is not a document description", cli.document.display()))?;
    debug!("loaded {} node(s) from {}", tree.len(), cli.document.display());

    let engine = MemoryEngine::with_native_pseudo_classes(
        &tree,
        ALL_STRATEGIES
            .into_iter()
            .filter(|kind| !rejected.contains(kind)),
    );
    let compiled = SelectorCompiler::new(config)
        .compile(&engine, &cli.selector)
        .with_context(|| format!("cannot compile `{}`", cli.selector))?;

    if cli.plan {
        print_plan(&compiled);
    }

    let matches = compiled
        .execute(&engine, &engine.document())
        .with_context(|| format!("cannot run `{}`", cli.selector))?;
    for &id in &matches {
        println!("{}  {}", describe(&tree, id).green(), document_path(&tree, id).dimmed());
    }
    println!("{} match(es)", matches.len().bold());

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<CompilerConfig> {
    let Some(path) = path else {
        return Ok(CompilerConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("invalid configuration in {}", path.display()))
}

/// Resolve a `--no-native` name such as `nth-child` or `:empty`.
fn strategy_kind(name: &str) -> Result<StrategyKind> {
    match Behavior::resolve(name.trim_start_matches(':'))? {
        Behavior::Query(kind) => Ok(kind),
        Behavior::Filter(kind) => bail!(":{} is always evaluated in-process", kind.name()),
    }
}

fn print_plan(compiled: &CompiledSelector) {
    println!("{}", "=== Plan ===".bold());
    for (index, branch) in compiled.branches().iter().enumerate() {
        println!("branch {}:", index + 1);
        for step in &branch.steps {
            let filters: Vec<String> = step.filters.iter().map(filter_label).collect();
            if filters.is_empty() {
                println!("  {:?} {}", step.combinator, step.locator.cyan());
            } else {
                println!(
                    "  {:?} {} {}",
                    step.combinator,
                    step.locator.cyan(),
                    filters.join(" ").yellow()
                );
            }
        }
    }
    println!();
}

fn filter_label(filter: &CssFilter) -> String {
    match filter {
        CssFilter::Has(_) => ":has(..)".to_string(),
        CssFilter::Not(_) => ":not(..)".to_string(),
        CssFilter::Lang(code) => format!(":lang({code})"),
        CssFilter::Visible => ":visible".to_string(),
        CssFilter::Hidden => ":hidden".to_string(),
    }
}

/// `tag#id.class1.class2`
fn describe(tree: &DomTree, id: NodeId) -> String {
    let Some(element) = tree.as_element(id) else {
        return "#document".to_string();
    };
    let mut label = element.tag_name.clone();
    if let Some(element_id) = element.id() {
        label.push('#');
        label.push_str(element_id);
    }
    for class in element.attr("class").unwrap_or_default().split_ascii_whitespace() {
        label.push('.');
        label.push_str(class);
    }
    label
}

/// `/html[1]/body[1]/ul[2]`, counting same-name element siblings.
fn document_path(tree: &DomTree, id: NodeId) -> String {
    let mut segments = Vec::new();
    let mut current = Some(id);
    while let Some(node) = current {
        let Some(element) = tree.as_element(node) else {
            break;
        };
        let index = tree
            .preceding_siblings(node)
            .filter(|&sibling| {
                tree.as_element(sibling)
                    .is_some_and(|other| other.tag_name == element.tag_name)
            })
            .count()
            + 1;
        segments.push(format!("{}[{index}]", element.tag_name));
        current = tree.parent(node);
    }
    segments.reverse();
    format!("/{}", segments.join("/"))
}
