//! Wombat CLI - parse HTML or XML and query it with CSS selectors
//!
//! Usage:
//!   wombat <file>                        Print the parsed tree
//!   wombat <file> --format html          Print the normalized markup
//!   wombat <file> --format json          Dump the tree as JSON
//!   wombat <file> --select "a[href]"     Print only the matching elements
//!   wombat <file> --errors 20            Also report up to 20 parse errors
//!
//! Set `RUST_LOG=wombat=trace` to follow the tree builder.

mod output;

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, ValueEnum};
use log::{debug, info};
use owo_colors::OwoColorize;
use wombat_dom::{DomTree, NodeId};
use wombat_html::Parser;
use wombat_select::Select;

/// Output shape for the parsed document or the selected elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Indented outline, one node per line
    Tree,
    /// Serialized markup
    Html,
    /// JSON node objects
    Json,
}

/// Wombat: HTML5 and XML parser with CSS selector queries
#[derive(ClapParser, Debug)]
#[command(name = "wombat")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the DOM tree of a file
    wombat page.html

    # List every link
    wombat page.html --select "a[href]" --format html

    # Parse an inline snippet as XML
    wombat --xml --html '<feed><entry/></feed>'

    # Show the first 10 parse errors
    wombat page.html --errors 10
"#)]
struct Cli {
    /// Path to the HTML or XML file
    #[arg(value_name = "FILE", required_unless_present = "html")]
    path: Option<PathBuf>,

    /// Parse this markup string instead of a file
    #[arg(long, value_name = "HTML", conflicts_with = "path")]
    html: Option<String>,

    /// Use the XML tree builder
    #[arg(long)]
    xml: bool,

    /// Base URI for resolving relative links
    #[arg(long, value_name = "URI", default_value = "")]
    base_uri: String,

    /// Only output elements matching this CSS selector
    #[arg(short, long, value_name = "QUERY")]
    select: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Tree)]
    format: Format,

    /// Track and print up to this many parse errors
    #[arg(short, long, value_name = "N", default_value_t = 0)]
    errors: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let input = read_input(&cli)?;
    let mut parser = if cli.xml {
        Parser::xml_parser()
    } else {
        Parser::html_parser()
    }
    .track_errors(cli.errors);

    let tree = parser.parse_input(&input, &cli.base_uri);
    info!(
        target: "wombat::cli",
        "parsed {} chars into {} nodes",
        input.chars().count(),
        tree.len()
    );

    let targets = match &cli.select {
        Some(query) => {
            let found = tree
                .select(tree.root(), query)
                .with_context(|| format!("invalid selector {query:?}"))?;
            debug!(target: "wombat::cli", "{query:?} matched {} elements", found.len());
            found.into_iter().collect()
        }
        None => vec![tree.root()],
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_output(&tree, &targets, cli.format, &mut out)?;
    out.flush()?;

    if parser.is_track_errors() {
        let color = io::stderr().is_terminal();
        for error in parser.errors().iter() {
            if color {
                eprintln!("{}", error.red());
            } else {
                eprintln!("{error}");
            }
        }
    }
    Ok(())
}

/// Read the markup from `--html` or the input file.
fn read_input(cli: &Cli) -> Result<String> {
    if let Some(ref html) = cli.html {
        return Ok(html.clone());
    }
    let Some(ref path) = cli.path else {
        anyhow::bail!("No input file or --html provided");
    };
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_output(
    tree: &DomTree,
    targets: &[NodeId],
    format: Format,
    out: &mut impl Write,
) -> Result<()> {
    match format {
        Format::Tree => {
            let color = io::stdout().is_terminal();
            for &id in targets {
                output::write_tree(tree, id, out, color)?;
            }
        }
        Format::Html => {
            for &id in targets {
                writeln!(out, "{}", tree.outer_html(id))?;
            }
        }
        Format::Json => {
            let nodes: Vec<_> = targets
                .iter()
                .filter_map(|&id| output::to_json(tree, id))
                .collect();
            // A single document prints as an object, a selection as an array.
            let rendered = match nodes.as_slice() {
                [node] if targets.first() == Some(&tree.root()) => {
                    serde_json::to_string_pretty(node)?
                }
                _ => serde_json::to_string_pretty(&nodes)?,
            };
            writeln!(out, "{rendered}")?;
        }
    }
    Ok(())
}
