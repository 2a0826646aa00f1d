//! `dtype` command-line entry point.

use dtype_cli::config::CliConfig;
use dtype_cli::{report, script};
use dtype_layout::TypePool;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let mut config = CliConfig::default();
    let mut operands = Vec::new();
    for arg in args.iter().skip(2) {
        match config.apply_flag(arg) {
            Ok(true) => {}
            Ok(false) => operands.push(arg.as_str()),
            Err(message) => {
                eprintln!("error: {message}");
                std::process::exit(1);
            }
        }
    }

    dtype_cli::init_tracing(&config);

    match args[1].as_str() {
        "show" => {
            let [path] = operands[..] else {
                eprintln!("Usage: dtype show <file> [--format=text|json] [--verbose]");
                std::process::exit(1);
            };
            show(path, &config);
        }
        "builtins" => match report::builtins(config.format) {
            Ok(out) => print!("{out}"),
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        },
        "help" | "--help" | "-h" => print_usage(),
        "version" | "--version" | "-V" => {
            println!("dtype {}", env!("CARGO_PKG_VERSION"));
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn show(path: &str, config: &CliConfig) {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read '{path}': {err}");
            std::process::exit(1);
        }
    };

    let pool = TypePool::new();
    let session = match script::run(&pool, &source) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("{path}:{err}");
            std::process::exit(1);
        }
    };

    match report::layouts(&pool, session.definitions(), config.format) {
        Ok(out) => println!("{}", out.trim_end()),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Derived datatype layout inspector");
    println!();
    println!("Usage: dtype <command> [options]");
    println!();
    println!("Commands:");
    println!("  show <file>     Build every definition in <file> and print its layout");
    println!("  builtins        List the builtin elements and their sizes");
    println!("  help            Show this help message");
    println!("  version         Show version information");
    println!();
    println!("Options:");
    println!("  --format=<fmt>  Output format: text (default), json");
    println!("  -v, --verbose   Trace constructor calls to stderr");
    println!();
    println!("Definition syntax (one per line, # comments):");
    println!("  name = contiguous N T");
    println!("  name = vector N B S T          name = hvector N B S T");
    println!("  name = indexed [B,..] [D,..] T name = hindexed [B,..] [D,..] T");
    println!("  name = indexed_block B [D,..] T");
    println!("  name = hindexed_block B [D,..] T");
    println!("  name = resized T LB EXTENT     name = dup T");
    println!("  name = struct [B,..] [D,..] [T,..]");
}
