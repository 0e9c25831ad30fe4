use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use toyrobot_lib::vm::Vm;

use std::fs;
use std::path::PathBuf;

#[cfg(feature = "dev")]
mod debugger;
mod repl;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// program to run as a whole. Starts a REPL when omitted
    script: Option<PathBuf>,

    /// run a single program line and exit
    #[arg(short, long, conflicts_with = "script")]
    eval: Option<String>,

    #[cfg(feature = "dev")]
    #[arg(short = 't', long)]
    show_tokens: bool,

    #[cfg(feature = "dev")]
    #[arg(short = 'i', long)]
    show_byte_code: bool,

    #[cfg(feature = "dev")]
    #[arg(short = 'b', long)]
    debug_bytecode: bool,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let src = match (&cli.script, &cli.eval) {
        (Some(path), _) => fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?,
        (None, Some(line)) => line.clone(),
        (None, None) => return repl::run(),
    };

    if dev_views(&cli, &src)? {
        return Ok(());
    }

    let mut vm = Vm::new();
    if let Err(e) = vm.run(&src) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

/// Logs go to stderr so they never mix with program output. `RUST_LOG`
/// overrides the default filter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "dev")]
#[derive(Debug, PartialEq, Eq)]
enum DevView {
    Tokens,
    ByteCode,
    Debugger,
}

/// the developer view asked for on the command line, if any
#[cfg(feature = "dev")]
fn selected_view(cli: &Cli) -> Option<DevView> {
    if cli.show_tokens {
        Some(DevView::Tokens)
    } else if cli.show_byte_code {
        Some(DevView::ByteCode)
    } else if cli.debug_bytecode {
        Some(DevView::Debugger)
    } else {
        None
    }
}

/// Runs the developer view selected on the command line, if any. Returns
/// whether one ran.
#[cfg(feature = "dev")]
fn dev_views(cli: &Cli, src: &str) -> Result<bool> {
    use crossterm::{self as ct, terminal};
    use std::io::stdout;
    use toyrobot_lib::{bytecode, compiler, tokenizer};

    let Some(view) = selected_view(cli) else {
        return Ok(false);
    };
    let tokens = tokenizer::tokenize(src)?;
    if view == DevView::Tokens {
        for token in tokens {
            println!("{:<16} {:?}", token.lexeme, token.kind);
        }
        return Ok(true);
    }

    let code = compiler::compile(&tokens)?;
    match view {
        DevView::ByteCode => print!("{}", bytecode::disassemble(&code)?),
        _ => {
            let mut stdout = stdout();
            ct::execute!(stdout, terminal::EnterAlternateScreen)?;
            let res = debugger::run(&code, src, &mut stdout);
            ct::execute!(stdout, terminal::LeaveAlternateScreen)?;
            res?;
        }
    }
    Ok(true)
}

#[cfg(not(feature = "dev"))]
fn dev_views(_: &Cli, _: &str) -> Result<bool> {
    Ok(false)
}

#[cfg(all(test, feature = "dev"))]
mod tests {
    use super::*;

    fn view_for(args: &[&str]) -> Option<DevView> {
        let cli = Cli::parse_from(std::iter::once("toyrobot").chain(args.iter().copied()));
        selected_view(&cli)
    }

    #[test]
    fn test_plain_runs_select_no_view() {
        assert_eq!(view_for(&["-e", "MOVE \"unterminated"]), None);
        assert_eq!(view_for(&["walk.bot"]), None);
    }

    #[test]
    fn test_dev_flags_select_a_view() {
        assert_eq!(view_for(&["-t", "-e", "MOVE"]), Some(DevView::Tokens));
        assert_eq!(view_for(&["--show-byte-code", "walk.bot"]), Some(DevView::ByteCode));
        assert_eq!(view_for(&["-b", "-e", "MOVE"]), Some(DevView::Debugger));
    }

    #[test]
    fn test_no_view_means_no_compilation() {
        let cli = Cli::parse_from(["toyrobot", "-e", "\"unterminated"]);
        assert!(!dev_views(&cli, "\"unterminated").unwrap());
    }
}
