use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox as lox;

use lox::ast::Stmt;
use lox::ast_printer::AstPrinter;
use lox::error::Diagnostics;
use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::resolver::Resolver;
use lox::scanner::Scanner;
use lox::token::{Token, TokenType};

const EXIT_IO_ERROR: i32 = 74;

#[derive(ClapParser, Debug)]
#[command(version, about = "Rox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Option<Commands>,

    /// Enable logging to rox.log (filter with RUST_LOG)
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the token list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parses a file and prints the AST of every statement
    Parse { filename: PathBuf },

    /// Runs input from a file as a Rox program
    Run { filename: PathBuf },

    /// Starts an interactive session (the default)
    Repl,
}

/// Reads the contents of a file into a Vec<u8>; exits with 74 on failure.
fn read_file(filename: &Path) -> Vec<u8> {
    info!("Reading file: {:?}", filename);

    let result: Result<Vec<u8>> = File::open(filename)
        .with_context(|| format!("Failed to open file {:?}", filename))
        .and_then(|file| {
            let mut reader = BufReader::new(file);
            let mut buf = Vec::new();
            reader
                .read_to_end(&mut buf)
                .with_context(|| format!("Failed to read file {:?}", filename))?;
            Ok(buf)
        });

    match result {
        Ok(buf) => {
            info!("Read {} bytes from {:?}", buf.len(), filename);
            buf
        }
        Err(e) => {
            eprintln!("{:#}", e);
            process::exit(EXIT_IO_ERROR);
        }
    }
}

fn init_logger() -> Result<()> {
    let log_file = File::create("rox.log").context("Failed to create rox.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rox::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to rox.log");
    Ok(())
}

fn report_all(diagnostics: &Diagnostics) {
    for error in diagnostics.errors() {
        eprintln!("{}", error);
    }
}

/// Report everything collected and exit with the code the sink chooses,
/// if any error was recorded.
fn exit_on_errors(diagnostics: &Diagnostics) {
    if let Some(code) = diagnostics.exit_code() {
        report_all(diagnostics);
        debug!("Exiting with code {}", code);
        process::exit(code);
    }
}

fn tokenize(filename: &Path, json: bool) -> Result<()> {
    let buf = read_file(filename);
    let (tokens, errors) = Scanner::new(&buf).scan_all();

    let mut diagnostics = Diagnostics::new();
    diagnostics.extend(errors);

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }

    exit_on_errors(&diagnostics);

    info!("Tokenization completed successfully");
    Ok(())
}

fn parse(filename: &Path) -> Result<()> {
    let buf = read_file(filename);
    let (tokens, errors) = Scanner::new(&buf).scan_all();

    let mut diagnostics = Diagnostics::new();
    diagnostics.extend(errors);

    let mut parser = Parser::new(&tokens);
    let statements = parser.parse();
    diagnostics.extend(parser.into_errors());
    exit_on_errors(&diagnostics);

    for stmt in &statements {
        println!("{}", AstPrinter::print_stmt(stmt));
    }

    info!("Parse subcommand completed");
    Ok(())
}

fn run(filename: &Path) -> Result<()> {
    let buf = read_file(filename);
    let (tokens, errors) = Scanner::new(&buf).scan_all();

    let mut diagnostics = Diagnostics::new();
    diagnostics.extend(errors);

    let mut parser = Parser::new(&tokens);
    let statements = parser.parse();
    diagnostics.extend(parser.into_errors());

    let mut interpreter = Interpreter::new();

    if !diagnostics.had_error() {
        if let Err(errors) = Resolver::new(&mut interpreter).resolve(&statements) {
            diagnostics.extend(errors);
        }
    }

    exit_on_errors(&diagnostics);

    if let Err(e) = interpreter.interpret(&statements) {
        interpreter.output().flush()?;
        diagnostics.runtime_error(e);
    }
    exit_on_errors(&diagnostics);

    info!("Program executed successfully");
    Ok(())
}

/// Line-by-line session over one interpreter.  Each line's source, tokens
/// and AST are leaked so that functions and classes defined on one line stay
/// valid for the rest of the session.
struct Repl {
    interpreter: Interpreter<'static>,
    diagnostics: Diagnostics,
}

impl Repl {
    fn new() -> Self {
        Repl {
            interpreter: Interpreter::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    fn run(&mut self) -> Result<()> {
        info!("Starting REPL");

        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();

        loop {
            print!("> ");
            io::stdout().flush()?;

            let Some(line) = lines.next() else {
                println!();
                break;
            };

            self.eval_line(line?);
            report_all(&self.diagnostics);
            self.diagnostics.reset();
        }

        info!("REPL finished");
        Ok(())
    }

    fn eval_line(&mut self, line: String) {
        let source: &'static str = Box::leak(line.into_boxed_str());

        let (tokens, errors) = Scanner::new(source.as_bytes()).scan_all();
        if !errors.is_empty() {
            self.diagnostics.extend(errors);
            return;
        }
        let tokens: &'static [Token<'static>] = Box::leak(tokens.into_boxed_slice());

        let statements: &'static [Stmt<'static>] = match Self::parse_line(tokens) {
            Ok(statements) => Box::leak(statements.into_boxed_slice()),
            Err(errors) => {
                self.diagnostics.extend(errors);
                return;
            }
        };

        if let Err(errors) = Resolver::new(&mut self.interpreter).resolve(statements) {
            self.diagnostics.extend(errors);
            return;
        }

        if let Err(e) = self.interpreter.interpret(statements) {
            self.diagnostics.runtime_error(e);
        }
    }

    /// A line is a program, or a bare expression which is printed.
    fn parse_line(
        tokens: &'static [Token<'static>],
    ) -> std::result::Result<Vec<Stmt<'static>>, Vec<lox::error::LoxError>> {
        let mut parser = Parser::new(tokens);
        let statements = parser.parse();
        if !parser.had_error() {
            return Ok(statements);
        }

        let ends_statement = tokens
            .iter()
            .rev()
            .nth(1)
            .is_some_and(|t| matches!(t.token_type, TokenType::SEMICOLON | TokenType::RIGHT_BRACE));

        if !ends_statement {
            let mut expr_parser = Parser::new(tokens);
            if let Some(expr) = expr_parser.parse_expression() {
                if !expr_parser.had_error() {
                    debug!("REPL line parsed as a bare expression");
                    return Ok(vec![Stmt::Print(expr)]);
                }
            }
        }

        Err(parser.into_errors())
    }
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    }

    info!("CLI arguments: {:?}", args);

    match args.commands.unwrap_or(Commands::Repl) {
        Commands::Tokenize { filename, json } => tokenize(&filename, json),
        Commands::Parse { filename } => parse(&filename),
        Commands::Run { filename } => run(&filename),
        Commands::Repl => Repl::new().run(),
    }
}
