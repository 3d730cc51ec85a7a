use crate::domain::snapshot::Snapshot;
use crate::error::Result;
use serde::Serialize;
use std::io::{Read, Write};

/// Reads a [`Snapshot`] from a JSON document with `students`, `feeStructures`
/// and `payments` arrays.
pub fn read_snapshot<R: Read>(source: R) -> Result<Snapshot> {
    Ok(serde_json::from_reader(source)?)
}

/// Writes any report as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(mut sink: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut sink, value)?;
    writeln!(sink)?;
    Ok(())
}
