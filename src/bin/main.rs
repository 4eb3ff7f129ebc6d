use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use suggest_core::config::SuggestConfig;
use suggest_core::core::normalize::normalize;
use suggest_core::loader::load_items;
use suggest_core::{build_suggest, load_suggest, save_suggest, SuggestIndex, SuggestionParameters};
use tracing::{info, warn};

/// Builds and queries prefix-suggestion artifacts.
#[derive(Parser, Debug)]
#[command(name = "suggest_engine")]
struct Cli {
    /// TOML config; defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build an artifact from a JSON / JSON Lines item file.
    Build {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        max_items_per_prefix: Option<usize>,
        #[arg(long)]
        postfix_weight_factor: Option<f32>,
    },
    /// Run one query and print the page as JSON.
    Query {
        #[arg(long)]
        data: PathBuf,
        #[command(flatten)]
        query: QueryArgs,
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Answer `SUGGEST <json>` lines from stdin until `EXIT`.
    Serve {
        #[arg(long)]
        data: PathBuf,
    },
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Text as typed by the user.
    #[arg(long)]
    original: String,
    /// Trie key; derived from `--original` when omitted.
    #[arg(long)]
    normalized: Option<String>,
    #[arg(long = "class")]
    classes: Vec<String>,
    #[arg(long = "exclude")]
    excluded_classes: Vec<String>,
}

impl QueryArgs {
    fn into_params(self) -> SuggestionParameters {
        let normalized_part = self.normalized.unwrap_or_else(|| normalize(&self.original));
        SuggestionParameters {
            original_part: self.original,
            normalized_part,
            classes: self.classes.into_iter().collect::<HashSet<_>>(),
            excluded_classes: self.excluded_classes.into_iter().collect::<HashSet<_>>(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SuggestConfig::load_or_default(cli.config.as_deref()).context("loading config")?;
    suggest_core::logging::init(&config.logging.level)?;

    match cli.command {
        Command::Build {
            input,
            output,
            max_items_per_prefix,
            postfix_weight_factor,
        } => {
            let max_items = max_items_per_prefix.unwrap_or(config.build.max_items_per_prefix);
            let factor = postfix_weight_factor.unwrap_or(config.build.postfix_weight_factor);
            let items = load_items(&input).with_context(|| format!("reading items from {}", input.display()))?;
            let artifact = build_suggest(items, max_items, factor)?;
            save_suggest(&artifact, &output).with_context(|| format!("writing {}", output.display()))?;
        }
        Command::Query {
            data,
            query,
            page,
            page_size,
        } => {
            let index = open_index(&data)?;
            let page_size = page_size.unwrap_or(config.query.page_size);
            let response = index.get_suggest_page(&query.into_params(), page, page_size);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Serve { data } => {
            let index = open_index(&data)?;
            serve(&index, config.query.page_size)?;
        }
    }
    Ok(())
}

fn open_index(path: &Path) -> Result<SuggestIndex> {
    load_suggest(path).with_context(|| format!("loading suggest artifact {}", path.display()))
}

fn serve(index: &SuggestIndex, page_size: usize) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    info!("serving suggestions on stdin");

    for line in stdin.lock().lines() {
        let input = line?;
        let (command, payload) = input.trim().split_once(' ').unwrap_or((input.trim(), ""));

        match command {
            "SUGGEST" => match serde_json::from_str::<SuggestionParameters>(payload) {
                Ok(params) => {
                    let response = index.get_suggest_page(&params, 0, page_size);
                    let body = serde_json::to_string(&response).map_err(io::Error::other)?;
                    writeln!(stdout, "{}", body)?;
                }
                Err(e) => {
                    warn!("bad SUGGEST payload: {}", e);
                    writeln!(stdout, "ERROR {}", e)?;
                }
            },
            "EXIT" => {
                info!("received EXIT");
                break;
            }
            "" => continue,
            _ => {
                warn!("unknown command {:?}", command);
                writeln!(stdout, "ERROR unknown command")?;
            }
        }
        stdout.flush()?;
    }
    info!("shutting down");
    Ok(())
}
