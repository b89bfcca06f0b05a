//! Lox CLI - token dumper and REPL for the Lox scanner.

use std::env;
use std::fs;
use std::io;
use std::process::ExitCode;

use lox_scanner::{scan_tokens, Diagnostic, ErrorSink, Token};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// sysexits.h
const EX_USAGE: u8 = 64;
const EX_DATAERR: u8 = 65;
const EX_IOERR: u8 = 74;

#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("readline error: {0}")]
    Readline(#[from] ReadlineError),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Usage(_) => EX_USAGE,
            CliError::Read { .. } | CliError::Readline(_) => EX_IOERR,
        }
    }
}

/// Prints each lexical error to stderr and remembers that one occurred.
#[derive(Debug, Default)]
struct Reporter {
    had_error: bool,
}

impl ErrorSink for Reporter {
    fn record(&mut self, line: usize, message: &str) {
        let diagnostic = Diagnostic {
            line,
            message: message.to_string(),
        };
        eprintln!("{}", diagnostic);
        self.had_error = true;
    }
}

fn main() -> ExitCode {
    init_tracing();
    let args: Vec<String> = env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// Log filter comes from `RUST_LOG`, defaulting to warnings only.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: Vec<String>) -> Result<ExitCode, CliError> {
    let mut eval_code: Option<String> = None;
    let mut interactive = false;
    let mut file: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return Ok(ExitCode::SUCCESS);
            }
            "-v" | "--version" => {
                println!("lox {}", VERSION);
                return Ok(ExitCode::SUCCESS);
            }
            "-e" | "--eval" => {
                i += 1;
                if i >= args.len() {
                    return Err(CliError::Usage("-e requires an argument".to_string()));
                }
                eval_code = Some(args[i].clone());
            }
            "-i" | "--interactive" => {
                interactive = true;
            }
            arg if arg.starts_with('-') => {
                return Err(CliError::Usage(format!("Unknown option: {}", arg)));
            }
            _ => {
                if file.is_some() {
                    return Err(CliError::Usage("expected at most one file".to_string()));
                }
                file = Some(arg.clone());
            }
        }
        i += 1;
    }

    let had_error = if let Some(code) = eval_code {
        run_source(&code)
    } else if let Some(path) = file {
        run_file(&path)?
    } else {
        start_repl()?;
        return Ok(ExitCode::SUCCESS);
    };

    if interactive {
        start_repl()?;
    }

    if had_error {
        Ok(ExitCode::from(EX_DATAERR))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_usage() {
    println!(
        r#"
lox v{} - Lox scanner

Usage:
  lox [options] [file]

Options:
  -h, --help         Show this help message
  -v, --version      Show version
  -e, --eval         Scan code from the command line
  -i, --interactive  Start REPL after scanning

Examples:
  lox                      Start interactive REPL
  lox script.lox           Print the tokens of a script
  lox -e "print 1 + 2;"    Print the tokens of a snippet

Set RUST_LOG=lox_scanner=trace to log every token.
"#,
        VERSION
    );
}

/// Scan a file and print its tokens. Returns whether any errors were reported.
fn run_file(path: &str) -> Result<bool, CliError> {
    debug!(path, "scanning file");
    let source = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_string(),
        source,
    })?;
    Ok(run_source(&source))
}

/// Scan `source` and print its tokens. Returns whether any errors were reported.
fn run_source(source: &str) -> bool {
    let mut reporter = Reporter::default();
    let tokens = scan_tokens(source, &mut reporter);
    print_tokens(&tokens);
    reporter.had_error
}

fn print_tokens(tokens: &[Token]) {
    for token in tokens {
        println!("{}", token);
    }
}

fn start_repl() -> Result<(), CliError> {
    println!("lox v{} - Type 'exit' or Ctrl+D to quit", VERSION);
    println!();

    let mut rl = DefaultEditor::new()?;
    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { "> " } else { ". " };

        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if buffer.is_empty() && (trimmed == "exit" || trimmed == "quit") {
                    break;
                }

                if buffer.is_empty() && trimmed.starts_with(':') {
                    if handle_command(trimmed) == Command::Quit {
                        break;
                    }
                    continue;
                }

                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                // Keep reading while a string literal is still open.
                if is_complete(&buffer) {
                    if !buffer.trim().is_empty() {
                        rl.add_history_entry(buffer.trim()).ok();
                        run_source(&buffer);
                    }
                    buffer.clear();
                }
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                println!("^C");
            }
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// Check whether every string literal in the input is closed.
fn is_complete(input: &str) -> bool {
    let mut in_string = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => in_string = !in_string,
            '/' if !in_string && chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    !in_string
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Continue,
    Quit,
}

fn handle_command(cmd: &str) -> Command {
    let parts: Vec<&str> = cmd[1..].split_whitespace().collect();
    let command = parts.first().map(|s| s.to_lowercase()).unwrap_or_default();

    match command.as_str() {
        "help" => {
            println!(
                r#"
REPL Commands:
  :help     Show this help
  :clear    Clear the screen
  :quit     Exit the REPL
"#
            );
        }
        "clear" => {
            print!("\x1B[2J\x1B[1;1H");
        }
        "exit" | "quit" => return Command::Quit,
        _ => {
            println!("Unknown command: :{}. Type :help for available commands.", command);
        }
    }
    Command::Continue
}
