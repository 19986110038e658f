use std::{env, process};

use lineagegraph::client::{CommandLineConfig, run_command};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{}", CommandLineConfig::help());
        return;
    }
    let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let config = match CommandLineConfig::from_args(&arg_refs) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(2);
        }
    };

    match run_command(&config) {
        Ok(output) => {
            println!("{}", output.json);
            if config.strict && output.has_issues {
                eprintln!("adjacency violations detected");
                process::exit(1);
            }
        }
        Err(err) => {
            eprintln!("command failed: {err}");
            process::exit(1);
        }
    }
}
