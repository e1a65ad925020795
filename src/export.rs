//! CSV export of the recorded picks.
//!
//! Format: header `X,Y,R,G,B,A,Hex`, one `\n`-terminated row per record in
//! pick order, hex as `#RRGGBB`. All fields are numeric or hex, so nothing
//! is ever quoted.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::selection::PixelRecord;

pub const CSV_HEADER: &str = "X,Y,R,G,B,A,Hex";

/// Stream the CSV rows into any writer.
pub fn write_csv<W: Write>(records: &[PixelRecord], mut out: W) -> io::Result<()> {
    writeln!(out, "{}", CSV_HEADER)?;
    for rec in records {
        writeln!(
            out,
            "{},{},{},{},{},{},{}",
            rec.x,
            rec.y,
            rec.r,
            rec.g,
            rec.b,
            rec.a,
            rec.hex()
        )?;
    }
    out.flush()
}

/// Render the whole export in memory.
pub fn to_csv_string(records: &[PixelRecord]) -> String {
    let mut buf = Vec::with_capacity(CSV_HEADER.len() + 1 + records.len() * 28);
    // Writing into a Vec cannot fail.
    let _ = write_csv(records, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Write `records` to `path` as CSV and return the row count.
///
/// Rows go to a sibling temp file which is renamed over `path` only once
/// fully flushed, so `path` is either untouched or complete. An empty
/// record list is refused before anything touches the disk.
pub fn export_csv(records: &[PixelRecord], path: &Path) -> Result<usize> {
    if records.is_empty() {
        return Err(Error::EmptySelection);
    }

    let tmp = partial_path(path);
    let written = write_file(records, &tmp).and_then(|()| fs::rename(&tmp, path));
    if let Err(source) = written {
        let _ = fs::remove_file(&tmp);
        return Err(Error::Export {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(records.len())
}

fn write_file(records: &[PixelRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_csv(records, &mut writer)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
}

/// `dir/.name.partial` next to the destination.
fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export.csv".to_string());
    path.with_file_name(format!(".{}.partial", name))
}
