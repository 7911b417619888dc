//! Data loading from CSV, JSON and Parquet files

use crate::error::{CarrotError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Supported input file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Json,
    Parquet,
}

impl FileFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "json" => Ok(FileFormat::Json),
            "parquet" | "pq" => Ok(FileFormat::Parquet),
            other => Err(CarrotError::InvalidInput(format!("Unsupported file format: '{}'", other))),
        }
    }
}

/// Load a data file into a DataFrame
pub fn load_data(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;

    let df = match format {
        FileFormat::Csv => CsvReadOptions::default()
            .with_infer_schema_length(Some(1000))
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?,
        FileFormat::Json => JsonReader::new(File::open(path)?).finish()?,
        FileFormat::Parquet => ParquetReader::new(File::open(path)?).finish()?,
    };

    debug!(path = %path.display(), rows = df.height(), columns = df.width(), "Loaded data");
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "x1,x2,label").unwrap();
        writeln!(file, "0.5,1.0,0").unwrap();
        writeln!(file, "1.5,2.0,1").unwrap();
        drop(file);

        let df = load_data(&path).unwrap();
        assert_eq!(df.shape(), (2, 3));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            FileFormat::from_path(Path::new("data.xlsx")),
            Err(CarrotError::InvalidInput(_))
        ));
        assert_eq!(FileFormat::from_path(Path::new("DATA.CSV")).unwrap(), FileFormat::Csv);
    }
}
