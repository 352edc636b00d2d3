use std::cell::RefCell;
use std::fs::File;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use kin_lang as kin;

use kin::environment::Environment;
use kin::error::KinError;
use kin::globals::create_global_env;
use kin::interpreter::Interpreter;
use kin::parser::Parser;
use kin::scanner::Scanner;
use kin::value::Value;

#[derive(ClapParser, Debug)]
#[command(version, about = "Kin language interpreter", long_about = None)]
pub struct Cli {
    /// Starts the REPL when no subcommand is given
    #[command(subcommand)]
    commands: Option<Commands>,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize { filename: Option<PathBuf> },

    /// Parses input from a file and prints its AST as JSON
    Parse { filename: Option<PathBuf> },

    /// Runs input from a file as a Kin program
    Run { filename: Option<PathBuf> },

    /// Starts an interactive session
    Repl,
}

fn read_file(filename: &PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let source = std::fs::read_to_string(filename)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", source.len(), filename);

    Ok(source)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // Write to file with module path and source line
    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("kin_lang::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
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
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Syntax-phase failures exit 65, runtime failures exit 70.
fn exit_code(error: &KinError) -> i32 {
    match error {
        KinError::Lex { .. } | KinError::Parse { .. } => 65,
        _ => 70,
    }
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        // A minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands.unwrap_or(Commands::Repl) {
        Commands::Tokenize { filename } => match filename {
            Some(filename) => {
                info!("Running Tokenize subcommand");

                let source = read_file(&filename)?;
                let scanner = Scanner::new(&source);
                let mut tokenized = true;

                for token in scanner {
                    match token {
                        Ok(token) => {
                            debug!("Scanned token: {}", token);

                            println!("{}", token);
                        }

                        Err(e) => {
                            tokenized = false;

                            debug!("Tokenization debug: {}", e);

                            eprintln!("{}", e);
                        }
                    }
                }

                if !tokenized {
                    debug!("Tokenization failed, exiting with code 65");

                    std::process::exit(65);
                }

                info!("Tokenization completed successfully");
            }
            None => {
                info!("No filepath provided for Tokenize");

                println!("No input filepath was provided. Exiting...");

                std::process::exit(0);
            }
        },

        Commands::Parse { filename } => match filename {
            Some(filename) => {
                info!("Running Parse subcommand");

                let source = read_file(&filename)?;

                match Parser::produce_ast(&source) {
                    Ok(program) => {
                        info!("Parsed {} top-level statements", program.body.len());

                        let json = serde_json::to_string_pretty(&program)
                            .context("Failed to serialize AST")?;

                        println!("{}", json);
                    }

                    Err(e) => {
                        debug!("Parse debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                }

                info!("Parse subcommand completed");
            }
            None => {
                info!("No filepath provided for Parse");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Run { filename } => match filename {
            Some(filename) => {
                info!("Running Run subcommand");

                let source = read_file(&filename)?;

                let program = match Parser::produce_ast(&source) {
                    Ok(program) => program,

                    Err(e) => {
                        debug!("Parse debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                };

                info!("Parsed {} top-level statements", program.body.len());

                let env: Rc<RefCell<Environment>> =
                    match create_global_env(&filename.to_string_lossy()) {
                        Ok(env) => env,

                        Err(e) => {
                            eprintln!("{}", e);
                            std::process::exit(70);
                        }
                    };

                let interpreter = Interpreter::new();

                match interpreter.run_program(&program, &env) {
                    Ok(_) => {
                        info!("Program executed successfully");
                    }

                    Err(e) => {
                        debug!("Runtime debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(exit_code(&e));
                    }
                }
            }

            None => {
                info!("No filepath provided for Run");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Repl => {
            info!("Starting REPL");

            repl()?;
        }
    }

    Ok(())
}

/// Line-at-a-time interactive session. Every line parses and runs in the
/// same persistent global environment, so declarations carry across lines.
/// Errors print and the session continues.
fn repl() -> Result<()> {
    let env: Rc<RefCell<Environment>> = match create_global_env("") {
        Ok(env) => env,

        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(70);
        }
    };

    let interpreter = Interpreter::new();

    println!("Kin REPL (.exit to quit)");

    let stdin = std::io::stdin();

    loop {
        print!("kin> ");
        std::io::stdout().flush()?;

        let mut line = String::new();

        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let line: &str = line.trim();

        if line.is_empty() {
            continue;
        }

        if matches!(line, ".exit" | ".quit" | ".q") {
            break;
        }

        let program = match Parser::produce_ast(line) {
            Ok(program) => program,

            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match interpreter.run_program(&program, &env) {
            Ok(Value::Null) => {}

            Ok(value) => println!("{}", value),

            Err(e) => eprintln!("{}", e),
        }
    }

    Ok(())
}
