//! Tabular export of index entries, one row per entry in ascending key
//! order, as comma separated values.

use std::{
    borrow::Cow,
    fmt::Display,
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use log::info;

/// Header row written ahead of the entries.
pub const HEADER: [&str; 2] = ["ID", "Nombre"];

/// Write `rows` into `writer` preceded by [`HEADER`]. Return the number
/// of entry rows written, header excluded.
pub fn write_csv<W, K, V>(mut writer: W, rows: &[(K, V)]) -> io::Result<usize>
where
    W: Write,
    K: Display,
    V: Display,
{
    writeln!(writer, "{}", HEADER.join(","))?;
    for (key, value) in rows.iter() {
        let (key, value) = (key.to_string(), value.to_string());
        writeln!(writer, "{},{}", escape(&key), escape(&value))?;
    }
    writer.flush()?;
    Ok(rows.len())
}

/// Create or truncate the file at `path` and write `rows` into it.
pub fn export_to_path<P, K, V>(path: P, rows: &[(K, V)]) -> io::Result<usize>
where
    P: AsRef<Path>,
    K: Display,
    V: Display,
{
    let file = File::create(path.as_ref())?;
    let n = write_csv(BufWriter::new(file), rows)?;
    info!("exported {} rows to {:?}", n, path.as_ref());
    Ok(n)
}

// quote a field when it contains a separator, quote or line break,
// doubling embedded quotes.
fn escape(field: &str) -> Cow<str> {
    if field.contains(|ch: char| matches!(ch, ',' | '"' | '\n' | '\r')) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
