/*!
Main binary for ctrlsearch.
*/

use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::io::{self, IsTerminal, Read, stdout};
use std::path::{Path, PathBuf};

use ctrlsearch::{
    commands,
    query::{DEFAULT_MAX_NESTING, Query, SearchEngine},
    snapshot::{NodeId, SnapshotFormat, SnapshotTree},
    utils,
};

/// Search a saved accessibility-tree snapshot with a CPath query.
#[derive(Parser)]
#[command(
    name = "cpath",
    version,
    about,
    arg_required_else_help = true,
    long_about = None,
    disable_help_subcommand = true
)]
struct Args {
    /// Optional subcommands
    #[command(subcommand)]
    command: Option<Commands>,
    /// Query string (e.g., "//Pane[@Name='Left']/Button[2]")
    query: Option<String>,
    #[arg(value_name = "FILE")]
    /// Optional path to a snapshot file. If omitted, reads from STDIN
    input: Option<PathBuf>,
    /// Snapshot format (json, yaml, toml). Guessed from the file extension
    /// if omitted; STDIN defaults to JSON
    #[arg(short, long, value_parser = parse_format)]
    format: Option<SnapshotFormat>,
    /// Stop at the first match and fail if there is none
    #[arg(long, action = ArgAction::SetTrue)]
    first: bool,
    /// Display count of number of matches
    #[arg(long, action = ArgAction::SetTrue)]
    count: bool,
    /// Do not pretty-print the properties, instead use compact
    #[arg(long, action = ArgAction::SetTrue)]
    compact: bool,
    /// Do not display matched controls
    #[arg(short, long, action = ArgAction::SetTrue)]
    no_display: bool,
    /// Do not display the ancestry header of each match
    #[arg(long, action = ArgAction::SetTrue)]
    no_path: bool,
    /// Print the canonical form of the query and exit
    #[arg(long, action = ArgAction::SetTrue)]
    explain: bool,
    /// Maximum nesting depth of sub-queries
    #[arg(long, default_value_t = DEFAULT_MAX_NESTING)]
    max_nesting: usize,
    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,
}

/// Available subcommands for `cpath`
#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    /// Generate additional documentation and/or completions
    Generate(GenerateCommand),
}

/// Generate shell completions and man page
#[derive(Subcommand)]
enum GenerateCommand {
    /// Generate shell completions for the given shell to stdout.
    Shell { shell: clap_complete::Shell },
    /// Generate a man page for cpath to output directory if specified, else
    /// the current directory.
    Man {
        /// The output directory to write the man pages.
        #[clap(short, long)]
        output_dir: Option<PathBuf>,
    },
}

fn parse_format(text: &str) -> Result<SnapshotFormat, String> {
    text.parse()
}

/// Entry point for main binary.
///
/// This parses the command line arguments and runs the query against the
/// snapshot. If no file is given, the snapshot is read from STDIN. Matches
/// are printed to STDOUT, with formatting determined by the command line
/// arguments.
fn main() -> Result<()> {
    let mut args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbosity.log_level_filter())
        .init();

    match args.command.take() {
        Some(Commands::Generate(GenerateCommand::Shell { shell })) => {
            commands::generate::write_completions(
                shell,
                &mut Args::command(),
                &mut stdout().lock(),
            );
            Ok(())
        }
        Some(Commands::Generate(GenerateCommand::Man { output_dir })) => {
            let pages =
                commands::generate::generate_man_pages(&Args::command(), output_dir)?;
            for page in pages {
                println!("Generated: {}", page.display());
            }
            Ok(())
        }
        None => run(&args),
    }
}

fn run(args: &Args) -> Result<()> {
    let query: Query = args
        .query
        .as_deref()
        .ok_or_else(|| anyhow!("Query string required unless using subcommand"))?
        .parse()
        .context("Failed to parse query")?;

    let mut out = stdout().lock();
    if args.explain {
        return utils::write_line(&mut out, &query.to_string());
    }

    let Some(tree) = load_tree(args.input.as_deref(), args.format)? else {
        // No piped input and no file specified
        let mut cmd = Args::command();
        return Ok(cmd.print_help()?);
    };

    let engine = SearchEngine::new(&tree).with_max_nesting(args.max_nesting);
    let root = tree.root();
    let matches: Vec<NodeId> = if args.first {
        vec![engine.find_required(&query, &root)?]
    } else {
        engine
            .find_all(&query, &root)
            .collect::<Result<_, _>>()
            .context("Search failed")?
    };
    log::info!("{} matches for {query}", matches.len());

    if args.count {
        utils::write_line(&mut out, &format!("Found matches: {}", matches.len()))?;
    }
    if !args.no_display {
        for node in matches {
            utils::write_colored_match(
                &mut out,
                &tree,
                node,
                !args.compact,
                !args.no_path,
            )?;
        }
    }
    Ok(())
}

/// Reads the snapshot from `input`, or from STDIN if it is piped. Returns
/// `None` if there is nothing to read.
fn load_tree(
    input: Option<&Path>,
    format: Option<SnapshotFormat>,
) -> Result<Option<SnapshotTree>> {
    if let Some(path) = input {
        let tree = match format {
            Some(format) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read file {}", path.display()))?;
                SnapshotTree::parse(&text, format)?
            }
            None => SnapshotTree::load(path)?,
        };
        return Ok(Some(tree));
    }

    if io::stdin().is_terminal() {
        return Ok(None);
    }
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read STDIN")?;
    SnapshotTree::parse(&buffer, format.unwrap_or(SnapshotFormat::Json)).map(Some)
}
