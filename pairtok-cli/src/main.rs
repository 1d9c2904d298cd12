#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use cmd::{inspect, negatives, prepare, shuffle, split, stats};
use human_panic::setup_panic;
use lazy_static::lazy_static;

use crate::config::RunConfig;
use crate::logging::init_logging;
use crate::progress_bar::CliProgressBar;

mod cli;
mod cmd;
mod config;
mod csv_stat;
mod logging;
mod opts;
mod progress_bar;

lazy_static! {
    pub(crate) static ref PROGRESS_BAR: CliProgressBar = CliProgressBar::new();
}

fn main() -> anyhow::Result<()> {
    setup_panic!();

    let cli: Cli = Cli::parse();

    if !cli.no_progress {
        PROGRESS_BAR.show();
    }

    init_logging(cli.verbose.log_level_filter(), cli.log_file.as_deref())?;

    match &cli.command {
        Commands::Prepare {
            r1,
            r2,
            output,
            options,
            csv,
        } => {
            let mut config = options.to_run_config();
            if let Some(config_file) = &options.config {
                config = config.or(RunConfig::from_path(config_file.path())?);
            }
            PROGRESS_BAR.set_total_bytes(opts::pair_length(r1, r2)?);

            prepare::prepare(
                r1.path(),
                r2.path(),
                output,
                &config,
                *csv,
                Arc::new(PROGRESS_BAR.clone()),
            )
            .context("Failed to prepare the dataset")?;
        }
        Commands::Split {
            source,
            dest,
            train_fraction,
            records,
            header_lines,
            lines_per_record,
        } => {
            split::split(
                source.path(),
                dest,
                *train_fraction,
                *records,
                *header_lines,
                *lines_per_record as usize,
            )?;
        }
        Commands::Shuffle {
            file,
            lines_per_block,
            retention,
            header_lines,
            comment_prefix,
            seed,
        } => {
            shuffle::shuffle(
                file.path(),
                *lines_per_block as usize,
                *retention,
                *header_lines,
                comment_prefix.as_deref(),
                *seed,
            )?;
        }
        Commands::Negatives {
            file,
            fraction,
            seed,
        } => {
            negatives::negatives(file.path(), *fraction, *seed)?;
        }
        Commands::Stats { r1, r2 } => {
            stats::stats(r1, r2).context("Failed to compute read statistics")?;
        }
        Commands::Inspect { dataset } => {
            inspect::inspect(dataset)?;
        }
    }

    PROGRESS_BAR.finish();
    Ok(())
}
