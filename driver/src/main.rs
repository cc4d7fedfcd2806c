//! # Entry point for the driver application
//!
//! A line-based read-eval-print loop on top of the Cumulus kernel.  Each
//! line is parsed into a statement, translated into kernel terms, and
//! executed; results are rendered back into concrete syntax.  A kernel error
//! prints a single-line diagnostic followed by a dump of the global context,
//! and the session continues.  An input file, if given on the command line,
//! is executed before the interactive loop starts.
//!
//! # Authors
//!
//! The Cumulus Development Team.
//!
//! # Copyright
//!
//! Copyright (c) The Cumulus Development Team, 2021.  All rights reserved (r).
//! Please see the `LICENSE.markdown` file in the *Cumulus* root directory for
//! licensing information.

mod error;
mod lexer;
mod parser;
mod printer;
mod syntax;

use anyhow::{anyhow, Result};
use clap::{App, Arg};
use cumulus::{error_code::ErrorCode, runtime_state::RuntimeState};
use log::info;
use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
    process::exit,
};

use crate::{
    parser::parse_statement,
    printer::display_term,
    syntax::{translate, ParseStatement},
};

////////////////////////////////////////////////////////////////////////////////
// Useful constants.
////////////////////////////////////////////////////////////////////////////////

const APPLICATION_NAME: &str = "Cumulus driver.";
const ABOUT_MESSAGE: &str =
    "Read-eval-print loop and file interpreter for the Cumulus kernel.";
const AUTHOR_LIST: &str = "The Cumulus Development Team.";
const VERSION_NUMBER: &str = "0.1.0";

////////////////////////////////////////////////////////////////////////////////
// Command-line parsing.
////////////////////////////////////////////////////////////////////////////////

/// Captures the command line arguments passed to the program.
struct CommandLineArguments {
    /// The path of an input file to execute before the interactive loop, if
    /// any.
    input_path: Option<PathBuf>,
    /// Whether the kernel's substitution-time type check is disabled.
    unsafe_substitution: bool,
    /// An override for the kernel's recursion limit, if any.
    recursion_limit: Option<usize>,
}

/// Parses the command line arguments of the program, exiting with an error
/// code if this cannot be done successfully.  Otherwise, packs the command
/// line arguments into a `CommandLineArguments` value, which is returned.
fn parse_command_line_arguments() -> CommandLineArguments {
    let matches = App::new(APPLICATION_NAME)
        .about(ABOUT_MESSAGE)
        .version(VERSION_NUMBER)
        .author(AUTHOR_LIST)
        .arg(
            Arg::new("input-file")
                .help("Path to an input file to execute before the REPL"),
        )
        .arg(
            Arg::new("unsafe")
                .long("unsafe")
                .help("Disable the substitution-time type check"),
        )
        .arg(
            Arg::new("recursion-limit")
                .long("recursion-limit")
                .takes_value(true)
                .help("Bound on the depth of kernel reductions"),
        )
        .get_matches();

    let recursion_limit = match matches.value_of("recursion-limit") {
        None => None,
        Some(limit) => match limit.parse::<usize>() {
            Ok(limit) => Some(limit),
            Err(_malformed) => {
                eprintln!("Malformed recursion limit: {}.", limit);
                exit(1)
            }
        },
    };

    CommandLineArguments {
        input_path: matches.value_of("input-file").map(PathBuf::from),
        unsafe_substitution: matches.is_present("unsafe"),
        recursion_limit,
    }
}

////////////////////////////////////////////////////////////////////////////////
// Statement execution.
////////////////////////////////////////////////////////////////////////////////

/// What executing a statement asks the session to do next.
enum Outcome {
    /// Print the rendering of a term.
    Display(String),
    /// Print the global context.
    Context,
    /// Print nothing.
    Silent,
    /// End the session.
    Quit,
}

/// Executes a parsed statement against the runtime state.
fn execute(
    state: &mut RuntimeState,
    statement: &ParseStatement,
) -> Result<Outcome, ErrorCode> {
    match statement {
        ParseStatement::Parameter { name, tau } => {
            let tau = translate(state, tau)?;
            let reference = state.global_register_parameter(name.clone(), tau)?;

            Ok(Outcome::Display(display_term(state, &reference)))
        }
        ParseStatement::Definition { name, body } => {
            let body = translate(state, body)?;
            let reference =
                state.global_register_definition(name.clone(), body)?;

            Ok(Outcome::Display(display_term(state, &reference)))
        }
        ParseStatement::TypedDefinition { name, tau, body } => {
            let tau = translate(state, tau)?;
            let body = translate(state, body)?;
            let reference = state
                .global_register_typed_definition(name.clone(), tau, body)?;

            Ok(Outcome::Display(display_term(state, &reference)))
        }
        ParseStatement::Check(term) => {
            let term = translate(state, term)?;
            let tau = state.term_check(term)?;

            Ok(Outcome::Display(display_term(state, &tau)))
        }
        ParseStatement::Evaluate(term) => {
            let term = translate(state, term)?;
            let result = state.term_evaluate(term)?;

            Ok(Outcome::Display(display_term(state, &result)))
        }
        ParseStatement::Expression(term) => {
            let term = translate(state, term)?;

            Ok(Outcome::Display(display_term(state, &term)))
        }
        ParseStatement::Context => Ok(Outcome::Context),
        ParseStatement::Quit => Ok(Outcome::Quit),
        ParseStatement::Silently(inner) => match execute(state, inner)? {
            Outcome::Quit => Ok(Outcome::Quit),
            _suppressed => Ok(Outcome::Silent),
        },
        ParseStatement::Empty => Ok(Outcome::Silent),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Diagnostics.
////////////////////////////////////////////////////////////////////////////////

/// Renders a kernel error as a single-line diagnostic, resolving embedded
/// term handles back into concrete syntax.
fn render_error(state: &RuntimeState, error: &ErrorCode) -> String {
    match error {
        ErrorCode::UnknownVariable(name) => {
            format!("Unknown variable: {}.", name)
        }
        ErrorCode::VariableExists(name) => {
            format!("Variable exists: {}.", name)
        }
        ErrorCode::TypeExpected(term) => {
            format!("Type expected: {}.", display_term(state, term))
        }
        ErrorCode::ProductExpected(term) => {
            format!("Product expected: {}.", display_term(state, term))
        }
        ErrorCode::TypeMismatch {
            term,
            actual,
            expected,
        } => format!(
            "Type mismatch: {} : {}, expected {}.",
            display_term(state, term),
            display_term(state, actual),
            display_term(state, expected)
        ),
        ErrorCode::RecursionLimitExceeded(term) => format!(
            "Recursion limit exceeded while reducing {}.",
            display_term(state, term)
        ),
        other => format!("{}", other),
    }
}

/// Prints the global context, in declaration order, to standard output.
fn print_context(state: &RuntimeState, header: &str) {
    println!("{}", header);

    for (name, declaration) in state.global_context() {
        match declaration.body() {
            None => println!(
                "    {} : {}",
                name,
                display_term(state, declaration.tau())
            ),
            Some(body) => println!(
                "    {} : {} := {}",
                name,
                display_term(state, declaration.tau()),
                display_term(state, body)
            ),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// The session loop.
////////////////////////////////////////////////////////////////////////////////

/// Parses and executes a single line, printing its result.  Returns `true`
/// iff the session should end.  Errors are printed, followed by a dump of the
/// global context, and do not end the session.
fn run_line(state: &mut RuntimeState, line: &str) -> bool {
    let statement = match parse_statement(line) {
        Ok(statement) => statement,
        Err(error) => {
            println!("{}", error);
            print_context(state, "Global context:");

            return false;
        }
    };

    match execute(state, &statement) {
        Ok(Outcome::Display(rendered)) => println!("{}", rendered),
        Ok(Outcome::Context) => print_context(state, "Context:"),
        Ok(Outcome::Silent) => {}
        Ok(Outcome::Quit) => return true,
        Err(error) => {
            println!("{}", render_error(state, &error));
            print_context(state, "Global context:");
        }
    }

    false
}

/// Executes every line of the input file.  Unlike the interactive loop, a
/// failing line aborts the whole session.
fn run_file(state: &mut RuntimeState, path: &PathBuf) -> Result<bool> {
    let file = File::open(path)?;

    for line in BufReader::new(file).lines() {
        let line = line?;
        let statement = parse_statement(&line)
            .map_err(|error| anyhow!("{}", error))?;

        match execute(state, &statement)
            .map_err(|error| anyhow!("{}", render_error(state, &error)))?
        {
            Outcome::Display(rendered) => println!("{}", rendered),
            Outcome::Context => print_context(state, "Context:"),
            Outcome::Silent => {}
            Outcome::Quit => return Ok(true),
        }
    }

    Ok(false)
}

////////////////////////////////////////////////////////////////////////////////
// Entry point.
////////////////////////////////////////////////////////////////////////////////

fn main() -> Result<()> {
    env_logger::init();

    let arguments = parse_command_line_arguments();
    let mut state = RuntimeState::new();

    if arguments.unsafe_substitution {
        state.set_unsafe_substitution(true);
    }
    if let Some(limit) = arguments.recursion_limit {
        state.set_recursion_limit(limit);
    }

    if let Some(path) = &arguments.input_path {
        info!("Executing input file {:?}.", path);

        if run_file(&mut state, path)? {
            return Ok(());
        }
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        match lines.next() {
            None => return Ok(()),
            Some(line) => {
                if run_line(&mut state, &line?) {
                    return Ok(());
                }
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests.
////////////////////////////////////////////////////////////////////////////////
