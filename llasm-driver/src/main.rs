//! LLVM assembly encoder driver
//! 
//! Builds IR from JSON program descriptions and prints it as LLVM assembly.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use llasm_driver::{describe_half, emit_program};
use log::info;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "llasm")]
#[command(about = "LLVM IR object model and textual encoder", version)]
struct Cli {
    /// Log construction details (RUST_LOG overrides the level)
    #[arg(short, long, global = true)]
    verbose: bool,
    
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a module from a JSON program description and print LLVM assembly
    Emit {
        /// Input program description
        input: PathBuf,
        
        /// Output .ll file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    
    /// Widen binary16 bit patterns (hex) to single and double precision
    Half {
        #[arg(required = true, value_name = "HEX")]
        patterns: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    
    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
    
    match cli.command {
        Commands::Emit { input, output } => {
            let json = fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let text = emit_program(&json)
                .with_context(|| format!("failed to build {}", input.display()))?;
            match output {
                Some(path) => {
                    fs::write(&path, &text)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!("wrote {}", path.display());
                }
                None => print!("{text}"),
            }
        }
        Commands::Half { patterns } => {
            for pattern in &patterns {
                println!("{}", describe_half(pattern)?);
            }
        }
    }
    
    Ok(())
}
