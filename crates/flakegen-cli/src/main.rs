mod commands;
mod config;
mod telemetry;

use std::io::{BufWriter, stdout};

use anyhow::Context;
use clap::Parser;
use config::{ClockKind, CliArgs, Command, GeneratorConfig};
use flakegen::{IdGenerator, MonotonicClock, SnowflakeId, SystemClock, TimeSource};
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = GeneratorConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let mut out = BufWriter::new(stdout().lock());
    match config.command {
        Command::Next { count, json } => match config.clock {
            ClockKind::System => {
                let generator = build_generator(&config, SystemClock)?;
                commands::next(&generator, count, json, &mut out)
            }
            ClockKind::Monotonic => {
                let generator = build_generator(&config, MonotonicClock::new())?;
                commands::next(&generator, count, json, &mut out)
            }
        },
        Command::Decode { id, json } => commands::decode(id, config.epoch, json, &mut out),
    }
}

fn build_generator<T: TimeSource>(
    config: &GeneratorConfig,
    clock: T,
) -> anyhow::Result<IdGenerator<SnowflakeId, T>> {
    IdGenerator::with_epoch(config.instance_id, config.epoch, clock)
        .context("failed to create id generator")
}

fn log_startup_info(config: &GeneratorConfig) {
    if cfg!(debug_assertions) {
        tracing::debug!("Starting flakegen with full config: {:#?}", config);
    } else {
        tracing::debug!(
            "Starting flakegen as instance {} with the {:?} clock",
            config.instance_id,
            config.clock
        );
    }
}
