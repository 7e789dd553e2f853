use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser};
use console::style;
use log::{debug, error, LevelFilter};
use lox::{parse_source, parse_source_expression, read_eval, run_in, scan_source, Error};
use lox_parser::ast::Stmt;
use lox_parser::printer::print_expr;

/// Tree-walking interpreter for the Lox language.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Script to run. Starts a prompt when omitted.
    path: Option<PathBuf>,

    /// Log more about what the interpreter does (repeat for more detail).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print the scanned tokens instead of running the script.
    #[arg(long)]
    dump_tokens: bool,

    /// Print the parsed expressions instead of running the script.
    #[arg(long)]
    dump_ast: bool,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn print_error(err: Error) {
    eprintln!("{}", style(err).red());
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let code = match &args.path {
        Some(path) => match fs::read_to_string(path) {
            Ok(source) => run_file(&args, &source),
            Err(err) => {
                error!("could not read {}: {}", path.display(), err);
                74
            }
        },
        None => {
            run_prompt();
            0
        }
    };
    process::exit(code);
}

/// Returns the exit code for the script.
fn run_file(args: &Args, source: &str) -> i32 {
    if args.dump_tokens || args.dump_ast {
        return dump(args, source);
    }

    let mut interpreter = lox::new_interpreter();
    let mut runtime_error = false;
    let mut static_error = false;
    run_in(&mut interpreter, source, |err| {
        match err {
            Error::Runtime(_) => runtime_error = true,
            _ => static_error = true,
        }
        print_error(err);
    });

    if static_error {
        65
    } else if runtime_error {
        70
    } else {
        0
    }
}

fn dump(args: &Args, source: &str) -> i32 {
    let result = if args.dump_tokens {
        scan_source(source).map(|tokens| {
            for token in tokens {
                println!("{:>4} {:?} {}", token.line, token.kind, token);
            }
        })
    } else {
        parse_source(source).map(|statements| {
            for stmt in statements {
                match stmt {
                    Stmt::ExprStmt(expr) | Stmt::PrintStmt(expr) => {
                        println!("{}", print_expr(&expr))
                    }
                    other => println!("{:?}", other),
                }
            }
        })
    };

    match result {
        Ok(()) => 0,
        Err(errors) => {
            errors.into_iter().for_each(print_error);
            65
        }
    }
}

fn run_prompt() {
    let mut interpreter = lox::new_interpreter();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                error!("could not read input: {}", err);
                break;
            }
        }
        let line = input.trim_end();
        if line.is_empty() {
            continue;
        }

        // A line that is not a program but is an expression gets its value echoed back.
        match parse_source(line) {
            Ok(_) => {
                run_in(&mut interpreter, line, print_error);
            }
            Err(errors) if parse_source_expression(line).is_err() => {
                errors.into_iter().for_each(print_error);
            }
            Err(_) => {
                debug!("evaluating {:?} as an expression", line);
                if let Some(value) = read_eval(&mut interpreter, line, print_error) {
                    println!("{}", style(value).dim());
                }
            }
        }
    }
}
