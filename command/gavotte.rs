//! Read an ASP program, splice in the files it includes, and print
//! every statement and directive that parsed. Syntax errors are
//! reported on standard error and make the exit status nonzero.
//!
//! Set `GAVOTTE_TRACE` to a comma-separated list of trace levels
//! (`lex`, `parse`, `recover`, `include`, or `all`) to watch it work.

use std::collections::BTreeSet;
use std::fs::{canonicalize, read_to_string};
use std::io::{stdin, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use atty::Stream;

use gavotte_syntax::{AspLexer, AspParser, Lex as _, Parse as _, Program};
use gavotte_tracer::{trace, Trace};

fn main() -> Result<ExitCode> {
    let trace = std::env::var("GAVOTTE_TRACE")
        .map(|names| Trace::from_names(&names))
        .unwrap_or_else(|_| Trace::none());
    let filename = std::env::args().nth(1);
    let filename = filename.as_deref().filter(|&f| f != "-");
    if filename.is_none() && atty::is(Stream::Stdin) && atty::is(Stream::Stdout) {
        println!("Welcome to Gavotte! Please enter your program, terminated with Ctrl-D.");
    }

    let program = Loader::new(trace).load(filename)?;
    print!("{program}");
    for diagnostic in &program.diagnostics {
        eprintln!("{diagnostic}");
    }
    match program.errors {
        0 => Ok(ExitCode::SUCCESS),
        1 => {
            eprintln!("1 syntax error");
            Ok(ExitCode::FAILURE)
        }
        n => {
            eprintln!("{n} syntax errors");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Parses a program and everything it includes, each file at most once.
struct Loader {
    trace: Trace,
    parser: AspParser,
    seen: BTreeSet<PathBuf>,
}

impl Loader {
    fn new(trace: Trace) -> Self {
        Self {
            trace,
            parser: AspParser::new(trace),
            seen: BTreeSet::new(),
        }
    }

    /// Load the named file, or standard input if there is none.
    /// Includes in standard input are relative to the working directory.
    fn load(mut self, filename: Option<&str>) -> Result<Program> {
        let text = read_file(filename)?;
        let program = self.parse(filename.unwrap_or("<stdin>"), &text)?;
        let dir = match filename {
            Some(filename) => {
                let path = canonicalize(filename).with_context(|| format!("Resolving {filename}"))?;
                let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
                self.seen.insert(path);
                dir
            }
            None => PathBuf::new(),
        };
        self.splice(program, &dir)
    }

    fn parse(&self, source: &str, text: &str) -> Result<Program> {
        let tokens = AspLexer::lex(source, text)?;
        trace!(self.trace, Lex, "Lexed {} tokens from {}", tokens.len(), source);
        Ok(self.parser.parse_program(&tokens)?)
    }

    /// Append the programs that `program` includes, with relative
    /// paths resolved against `dir`.
    fn splice(&mut self, mut program: Program, dir: &Path) -> Result<Program> {
        let includes: Vec<PathBuf> = program.includes().map(|path| dir.join(path)).collect();
        for path in includes {
            let path = canonicalize(&path)
                .with_context(|| format!("Resolving include {}", path.display()))?;
            if !self.seen.insert(path.clone()) {
                trace!(self.trace, Include, "Already included {}", path.display());
                continue;
            }
            trace!(self.trace, Include, "Including {}", path.display());
            let text = read_to_string(&path)
                .with_context(|| format!("Reading include {}", path.display()))?;
            let included = self.parse(&path.to_string_lossy(), &text)?;
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            let included = self.splice(included, &dir)?;
            program.append(included);
        }
        Ok(program)
    }
}

/// Read a file or standard input and return the content as a string.
fn read_file(filename: Option<&str>) -> Result<String> {
    match filename {
        None => {
            let mut buffer = String::new();
            stdin()
                .read_to_string(&mut buffer)
                .context("Reading from stdin")?;
            Ok(buffer)
        }
        Some(filename) => read_to_string(filename).with_context(|| format!("Reading {filename}")),
    }
}
