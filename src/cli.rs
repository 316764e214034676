//! CLI module
//!
//! This module provides the command-line surface of the cmdtree tool: a way
//! to resolve addresses, print suggestions, dump the menu tree, and drive
//! the palette interactively.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::{
    menu::{self, ActionRegistry},
    palette::{Outcome, Palette},
    source::CommandSource,
    tree::{BranchNode, Children, LeafNode, Node, ProducerError, ResolveError},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON menu definition (defaults to the built-in demo menu)
    #[arg(short, long)]
    menu: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an address against the menu and print the visited path
    Resolve {
        /// Address tokens, e.g. `experiments pause`
        address: Vec<String>,
    },

    /// Print suggestions for partially-typed input
    Suggest {
        /// The typed input, e.g. "experiments pa"
        input: String,
    },

    /// Print the full menu tree
    Tree,

    /// Run the palette interactively, one input line at a time
    Repl,

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Run the CLI application
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        generate(*shell, &mut Cli::command(), "cmdtree", &mut io::stdout());
        return Ok(());
    }

    let root = load_root(cli.menu.as_deref())?;
    let palette = Palette::new(root);

    match &cli.command {
        Commands::Resolve { address } => {
            let path = palette.root().resolve(address).await?;
            for (depth, node) in path.iter().enumerate() {
                println!("{}{}", "  ".repeat(depth), describe(node));
            }
            Ok(())
        }

        Commands::Suggest { input } => {
            let suggestions = palette.suggestions(input).await?;
            if suggestions.is_empty() {
                println!("no suggestions");
            }
            for suggestion in suggestions {
                println!("{}", suggestion.cyan());
            }
            Ok(())
        }

        Commands::Tree => {
            print_tree(palette.root().clone(), 0).await?;
            Ok(())
        }

        Commands::Repl => repl(&palette).await,

        Commands::Completions { .. } => Ok(()),
    }
}

/// Interactive loop: each line is tokenized and run against the palette.
async fn repl(palette: &Palette) -> Result<(), Box<dyn std::error::Error>> {
    println!("Type a command (blank line lists the top level, Ctrl-D exits)");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();

        match palette.run(input).await {
            Ok(Outcome::Executed { command }) => {
                println!("{} {}", "ok:".green(), command);
            }
            Ok(Outcome::Incomplete { suggestions }) => {
                for suggestion in suggestions {
                    println!("  {}", suggestion.cyan());
                }
            }
            Err(err @ ResolveError::BadPath { .. }) => {
                eprintln!("{} {}", "error:".red(), err);
                // Suggestions can still help when only the trailing token missed.
                if let Ok(suggestions) = palette.suggestions(input).await {
                    if !suggestions.is_empty() {
                        println!("did you mean:");
                        for suggestion in suggestions {
                            println!("  {}", suggestion.cyan());
                        }
                    }
                }
            }
            Err(err) => {
                eprintln!("{} {}", "error:".red(), err);
            }
        }
    }

    Ok(())
}

fn describe(node: &Node) -> String {
    match node {
        Node::Leaf(leaf) => format!("{}", leaf.title().green()),
        Node::Branch(branch) => format!("{}", branch.title().cyan().bold()),
    }
}

fn print_tree(node: Node, depth: usize) -> BoxFuture<'static, Result<(), ResolveError>> {
    async move {
        println!("{}{}", "  ".repeat(depth), describe(&node));
        if let Node::Branch(branch) = &node {
            for child in branch.expand().await? {
                print_tree(child, depth + 1).await?;
            }
        }
        Ok(())
    }
    .boxed()
}

fn load_root(menu_path: Option<&Path>) -> Result<Node, Box<dyn std::error::Error>> {
    match menu_path {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            let root = menu::from_json(&json, &default_actions())?;
            Ok(root)
        }
        None => Ok(demo_root()),
    }
}

/// Actions available to menu files loaded with `--menu`.
fn default_actions() -> ActionRegistry {
    let mut actions = ActionRegistry::new();
    actions.register("echo", announce);
    actions.register("noop", |_| {});
    actions
}

fn announce(leaf: &LeafNode) {
    println!("{} {}", "executed".green(), leaf.title());
}

/// Built-in demo menu exercising static, dynamic, and async branches.
fn demo_root() -> Node {
    let running: Arc<dyn CommandSource> = Arc::new(SampleTasks);

    Node::branch(
        "cmdtree",
        vec![
            Node::branch(
                "experiments",
                vec![
                    Node::leaf("activate", announce),
                    Node::leaf("pause", announce),
                    Node::leaf("kill", announce),
                ],
            ),
            Node::from_source("notebooks", running.clone()),
            Node::from_source("tensorboards", running),
            Node::dynamic("settings", |_| {
                Ok(vec![
                    Node::leaf("show", announce),
                    Node::branch(
                        "theme",
                        vec![Node::leaf("light", announce), Node::leaf("dark", announce)],
                    ),
                ])
            }),
        ],
    )
}

/// Stand-in for a service listing running tasks; real deployments would
/// query an API here. One source serves several branches, keyed by title.
struct SampleTasks;

#[async_trait::async_trait]
impl CommandSource for SampleTasks {
    async fn children(&self, branch: &BranchNode) -> Result<Children, ProducerError> {
        let names: &[&str] = match branch.title() {
            "notebooks" => &["nb-pensive-turing", "nb-eager-noether"],
            "tensorboards" => &["tb-exp-417", "tb-exp-502"],
            other => return Err(format!("no task listing for {other:?}").into()),
        };
        Ok(names
            .iter()
            .map(|name| {
                Node::leaf(*name, |leaf: &LeafNode| {
                    println!("{} {}", "opening".green(), leaf.title());
                })
            })
            .collect())
    }
}
