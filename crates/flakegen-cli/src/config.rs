use core::time::Duration;

use anyhow::bail;
use clap::{Parser, Subcommand, ValueEnum};
use flakegen::{DEFAULT_EPOCH, Snowflake, SnowflakeId, SystemClock, TimeSource};

const DEFAULT_EPOCH_MILLIS: u64 = DEFAULT_EPOCH.as_millis() as u64;

/// Runtime configuration for the `flakegen` binary.
///
/// Every global option can also come from the environment or a `.env` file.
/// The instance ID must be unique across every process issuing IDs into the
/// same ID space; this tool cannot check that.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flakegen",
    version,
    about = "Issue and decode 64-bit Snowflake IDs"
)]
pub struct CliArgs {
    /// Instance ID encoded into every issued ID (0 to 1023).
    ///
    /// Environment variable: `INSTANCE_ID`
    #[arg(long, env = "INSTANCE_ID", default_value_t = 0, global = true)]
    pub instance_id: u64,

    /// Epoch timestamps are measured from, in milliseconds since 1970-01-01
    /// UTC. Defaults to 2022-01-01 00:00 UTC+8.
    ///
    /// IDs only decode to the right time against the epoch they were issued
    /// with.
    ///
    /// Environment variable: `EPOCH_MILLIS`
    #[arg(long, env = "EPOCH_MILLIS", default_value_t = DEFAULT_EPOCH_MILLIS, global = true)]
    pub epoch_millis: u64,

    /// Clock used when issuing IDs.
    ///
    /// Environment variable: `CLOCK`
    #[arg(long, env = "CLOCK", value_enum, default_value_t = ClockKind::System, global = true)]
    pub clock: ClockKind,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Issue new IDs, one per line.
    Next {
        /// How many IDs to issue.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Print each ID with its decoded fields as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the fields of an existing ID.
    Decode {
        /// The raw ID.
        #[arg(allow_negative_numbers = true)]
        id: i64,

        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    /// The system wall clock, read on every ID.
    System,
    /// The wall clock sampled once at startup, then advanced monotonically.
    Monotonic,
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub instance_id: u64,
    pub epoch: Duration,
    pub clock: ClockKind,
    pub command: Command,
}

impl TryFrom<CliArgs> for GeneratorConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let max_instance_id = SnowflakeId::max_instance_id();
        if args.instance_id > max_instance_id {
            bail!(
                "INSTANCE_ID ({}) exceeds the Snowflake instance ID space (max = {})",
                args.instance_id,
                max_instance_id
            );
        }

        check_epoch(args.epoch_millis, SystemClock.current_millis())?;

        if let Command::Next { count: 0, .. } = args.command {
            bail!("--count must be greater than 0");
        }

        Ok(Self {
            instance_id: args.instance_id,
            epoch: Duration::from_millis(args.epoch_millis),
            clock: args.clock,
            command: args.command,
        })
    }
}

/// Rejects epochs that are ahead of `now` or so far behind it that no
/// timestamp is left to issue.
fn check_epoch(epoch_millis: u64, now: u64) -> anyhow::Result<()> {
    if epoch_millis > now {
        bail!("EPOCH_MILLIS ({epoch_millis}) is in the future (now = {now})");
    }
    if now - epoch_millis > SnowflakeId::max_timestamp() {
        bail!(
            "EPOCH_MILLIS ({epoch_millis}) is too old, the 41-bit timestamp budget is already spent"
        );
    }
    Ok(())
}
