// Interactive prompt over a built artifact: type a prefix, see highlighted suggestions.
// Run with: cargo run --bin suggest_simulator -- --data suggest.pb
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::style::{Print, PrintStyledContent, Stylize};
use crossterm::{execute, queue};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use suggest_core::core::normalize::normalize;
use suggest_core::{load_suggest, SuggestAnswerItem, SuggestionParameters};

#[derive(Parser, Debug)]
#[command(name = "suggest_simulator")]
struct Cli {
    #[arg(long)]
    data: PathBuf,
    /// Suggestions shown per prefix.
    #[arg(long, default_value_t = 8)]
    limit: usize,
    #[arg(long = "class")]
    classes: Vec<String>,
    #[arg(long = "exclude")]
    excluded_classes: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let index = load_suggest(&cli.data).with_context(|| format!("loading {}", cli.data.display()))?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    execute!(stdout, Print(format!("{} items loaded. Empty line quits.\n> ", index.item_count())))?;
    for line in stdin.lock().lines() {
        let typed = line?;
        if typed.is_empty() {
            break;
        }
        let params = SuggestionParameters::new(&typed, &normalize(&typed))
            .require(cli.classes.iter().cloned())
            .exclude(cli.excluded_classes.iter().cloned());
        let suggestions = index.get_suggest(&params);
        render(&mut stdout, &suggestions, cli.limit)?;
    }
    Ok(())
}

fn render(stdout: &mut io::Stdout, suggestions: &[SuggestAnswerItem], limit: usize) -> io::Result<()> {
    if suggestions.is_empty() {
        queue!(stdout, PrintStyledContent("  no suggestions\n".dark_grey()))?;
    }
    for (i, suggestion) in suggestions.iter().take(limit).enumerate() {
        queue!(stdout, Print(format!("{:>2}. ", i + 1)))?;
        for block in &suggestion.text_blocks {
            if block.highlight {
                queue!(stdout, PrintStyledContent(block.text.as_str().bold().yellow()))?;
            } else {
                queue!(stdout, Print(&block.text))?;
            }
        }
        queue!(stdout, PrintStyledContent(format!("  ({:.3})\n", suggestion.weight).dark_grey()))?;
    }
    queue!(stdout, Print("> "))?;
    stdout.flush()
}
