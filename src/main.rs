// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
mod audio;
mod batch;
mod chain;
mod config;
mod export;
mod scan;
#[cfg(test)]
mod testutil;

use clap::{crate_version, Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;

use config::Config;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A sample chain builder."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scans the sample library and lists the chains that would be built.
    Plan {
        /// The path to the batch config.
        config_path: String,
        /// Overrides the source directory from the config.
        #[arg[short, long]]
        source: Option<String>,
    },
    /// Builds all sample chains and writes them to the output directory.
    Build {
        /// The path to the batch config.
        config_path: String,
        /// Overrides the source directory from the config.
        #[arg[short, long]]
        source: Option<String>,
        /// Overrides the output directory from the config.
        #[arg[short, long]]
        output: Option<String>,
    },
}

fn load_config(
    config_path: &str,
    source: Option<String>,
    output: Option<String>,
) -> Result<Config, Box<dyn Error>> {
    let mut config = Config::load(&PathBuf::from(config_path))?;
    if let Some(source) = source {
        config.set_source(PathBuf::from(source));
    }
    if let Some(output) = output {
        config.set_output(PathBuf::from(output));
    }
    Ok(config)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            config_path,
            source,
        } => {
            let config = load_config(&config_path, source, None)?;
            let groups = batch::plan(&config)?;

            if groups.is_empty() {
                println!("No samples found in {}.", config.source().display());
                return Ok(());
            }

            println!("Groups (count: {}):", groups.len());
            for group in groups.iter() {
                println!("- {} ({} samples)", group.group_key, group.member_count);
                for chain in group.chains.iter() {
                    println!("    {} -> {} slots", chain.chain_key, chain.slot_count);
                }
            }
        }
        Commands::Build {
            config_path,
            source,
            output,
        } => {
            let config = load_config(&config_path, source, output)?;
            let summary = batch::run(&config)?;

            if summary.chains.is_empty() {
                println!("No chains built from {}.", config.source().display());
            } else {
                println!("Chains (count: {}):", summary.chains.len());
                for chain in summary.chains.iter() {
                    println!(
                        "- {} ({} slots): {}",
                        chain.chain_key,
                        chain.slot_count,
                        chain.output_path.display()
                    );
                }
            }

            if summary.failed_groups > 0 {
                println!(
                    "\nSkipped {} of {} groups, see the log for details.",
                    summary.failed_groups, summary.groups
                );
            }
        }
    }

    Ok(())
}
