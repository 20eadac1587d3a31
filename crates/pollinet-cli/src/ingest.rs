//! Loading network tables from CSV directories
//!
//! Each `*.csv` file holds one network: the header row lists pollinators
//! (after a leading index cell), and every following row starts with a plant
//! label followed by interaction strengths.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use pollinet_dedup::{Corpus, NetworkTable};
use serde::Serialize;

use crate::error::{CliError, Result};

/// A CSV file that could not be turned into a network
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Networks read from disk
#[derive(Debug, Default)]
pub struct LoadedCorpus {
    pub corpus: Corpus,
    /// File stems seen more than once; only the first file is kept
    pub duplicate_names: Vec<String>,
    /// Files skipped because they do not hold a valid network
    pub rejected: Vec<RejectedFile>,
}

/// `*.csv` files of a directory, sorted by file name
pub fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_err = |source| CliError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_csv = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse one network table. `path` is only used in error messages.
pub fn read_network<R: Read>(reader: R, path: &Path) -> Result<NetworkTable> {
    let csv_err = |source| CliError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let cols: Vec<String> = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .skip(1)
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    let mut matrix = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        let row = record.get(0).unwrap_or_default().to_string();
        let mut values = Vec::with_capacity(cols.len());
        for (col, cell) in cols.iter().zip(record.iter().skip(1)) {
            values.push(parse_cell(cell).ok_or_else(|| CliError::Value {
                path: path.to_path_buf(),
                row: row.clone(),
                col: col.clone(),
                value: cell.to_string(),
            })?);
        }
        rows.push(row);
        matrix.push(values);
    }

    NetworkTable::new(rows, cols, matrix).map_err(|source| CliError::Network {
        path: path.to_path_buf(),
        source,
    })
}

/// Empty and NA cells mean no recorded interaction
fn parse_cell(cell: &str) -> Option<f64> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("na") || cell.eq_ignore_ascii_case("nan") {
        return Some(0.0);
    }
    cell.parse::<f64>().ok()
}

pub fn read_network_file(path: &Path) -> Result<NetworkTable> {
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_network(file, path)
}

/// Load every CSV network of the given directories, in directory then file
/// name order. Networks are named after their file stem.
///
/// An unreadable directory is an error. A file that fails to parse is logged,
/// listed in `rejected` and skipped.
pub fn load_corpus(dirs: &[PathBuf]) -> Result<LoadedCorpus> {
    let mut loaded = LoadedCorpus::default();
    for dir in dirs {
        for path in csv_files(dir)? {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            if loaded.corpus.contains(&name) {
                tracing::warn!("skipping {}: network {} already loaded", path.display(), name);
                loaded.duplicate_names.push(name);
                continue;
            }
            let table = match read_network_file(&path) {
                Ok(table) => table,
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                    loaded.rejected.push(RejectedFile {
                        path,
                        error: e.to_string(),
                    });
                    continue;
                }
            };
            tracing::debug!(
                "loaded {} ({} plants, {} pollinators)",
                name,
                table.n_rows(),
                table.n_cols()
            );
            loaded.corpus.insert(name, table)?;
        }
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_index_column_and_header() {
        let data = "\
,Apis mellifera,Bombus sp1
Salvia verbenaca,1,0
Thymus vulgaris, 2 ,
";
        let table = read_network(data.as_bytes(), Path::new("t.csv")).unwrap();
        assert_eq!(table.rows(), &["Salvia verbenaca".to_string(), "Thymus vulgaris".to_string()]);
        assert_eq!(table.cols(), &["Apis mellifera".to_string(), "Bombus sp1".to_string()]);
        assert_eq!(table.get("Thymus vulgaris", "Apis mellifera"), Some(2.0));
        assert_eq!(table.get("Thymus vulgaris", "Bombus sp1"), Some(0.0));
        assert_eq!(table.interaction_count(), 2);
    }

    #[test]
    fn rejects_non_numeric_cell() {
        let data = ",a\np,many\n";
        let err = read_network(data.as_bytes(), Path::new("bad.csv")).unwrap_err();
        assert!(matches!(err, CliError::Value { .. }));
    }

    #[test]
    fn ragged_rows_are_csv_errors() {
        let data = ",a,b\np,1\n";
        let err = read_network(data.as_bytes(), Path::new("ragged.csv")).unwrap_err();
        assert!(matches!(err, CliError::Csv { .. }));
    }

    #[test]
    fn repeated_plant_is_a_table_error() {
        let data = ",a\np,1\np,2\n";
        let err = read_network(data.as_bytes(), Path::new("dup.csv")).unwrap_err();
        assert!(matches!(err, CliError::Network { .. }));
    }
}
