use std::path::PathBuf;

use clap::Parser;

use hybridfs_cli::Command;

/// hybridfs - one namespace over many contents backends
#[derive(Parser, Debug)]
#[command(name = "hybridfs")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Mount table file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    match hybridfs_cli::run(args.config.as_deref(), &args.command) {
        Ok(Some(output)) => println!("{}", output),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
