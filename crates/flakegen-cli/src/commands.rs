use core::time::Duration;
use std::io::Write;

use anyhow::{Context, bail};
use flakegen::{Components, IdGenerator, Snowflake, SnowflakeId, TimeSource};
use serde::Serialize;

/// One ID with its fields, as printed by `--json`.
#[derive(Debug, Serialize)]
struct DecodedId {
    id: SnowflakeId,
    #[serde(flatten)]
    components: Components,
    unix_millis: u64,
}

impl DecodedId {
    fn new(id: SnowflakeId, epoch: Duration) -> Self {
        Self {
            id,
            components: id.components(),
            unix_millis: id.unix_millis(epoch),
        }
    }
}

/// Issues `count` IDs from `generator` and writes them one per line.
pub fn next<T, W>(
    generator: &IdGenerator<SnowflakeId, T>,
    count: usize,
    json: bool,
    out: &mut W,
) -> anyhow::Result<()>
where
    T: TimeSource,
    W: Write,
{
    for issued in 0..count {
        let id = generator
            .next_id()
            .with_context(|| format!("failed to issue id {} of {count}", issued + 1))?;
        if json {
            serde_json::to_writer(&mut *out, &DecodedId::new(id, generator.epoch()))?;
            writeln!(out)?;
        } else {
            writeln!(out, "{id}")?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Writes the fields of `raw` decoded against `epoch`.
pub fn decode<W: Write>(raw: i64, epoch: Duration, json: bool, out: &mut W) -> anyhow::Result<()> {
    let id = SnowflakeId::from_raw(raw);
    if !id.is_valid() {
        bail!("{raw} is not a valid Snowflake ID, the reserved bit is set");
    }

    let decoded = DecodedId::new(id, epoch);
    if json {
        serde_json::to_writer_pretty(&mut *out, &decoded)?;
        writeln!(out)?;
    } else {
        writeln!(out, "id          : {}", decoded.id)?;
        writeln!(out, "timestamp   : {}", decoded.components.timestamp)?;
        writeln!(out, "instance_id : {}", decoded.components.instance_id)?;
        writeln!(out, "sequence    : {}", decoded.components.sequence)?;
        writeln!(out, "unix_millis : {}", decoded.unix_millis)?;
    }
    out.flush()?;
    Ok(())
}
