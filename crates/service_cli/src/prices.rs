//! Price history CSV loading.
//!
//! Expected layout:
//!
//! ```text
//! date,PETR4,VALE3,IVVB11
//! 2024-01-02,37.10,75.32,290.01
//! 2024-01-03,37.45,,291.20
//! ```
//!
//! The first column is an ISO date; every other column is one asset. Empty
//! cells are missing prices.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use quant_optimiser::PriceTable;
use tracing::debug;

use crate::{CliError, Result};

/// Load a price table from a CSV file
pub fn load_price_table(path: &Path) -> Result<PriceTable> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    let file = std::fs::File::open(path)?;
    read_price_table(file)
}

/// Parse a price table from CSV text
pub fn read_price_table<R: Read>(reader: R) -> Result<PriceTable> {
    let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = csv.headers()?.clone();
    let mut columns = headers.iter();
    match columns.next() {
        Some(first) if first.eq_ignore_ascii_case("date") => {}
        _ => {
            return Err(CliError::invalid_argument(
                "price file must start with a 'date' column",
            ))
        }
    }
    let assets: Vec<String> = columns.map(str::to_string).collect();

    let mut rows = Vec::new();
    for (i, record) in csv.records().enumerate() {
        let record = record?;
        let line = i + 2;

        let date_field = record.get(0).unwrap_or_default();
        let date = NaiveDate::parse_from_str(date_field, "%Y-%m-%d").map_err(|_| {
            CliError::invalid_argument(format!("line {}: invalid date '{}'", line, date_field))
        })?;

        let prices = record
            .iter()
            .skip(1)
            .map(|cell| {
                if cell.is_empty() {
                    Ok(None)
                } else {
                    cell.parse::<f64>().map(Some).map_err(|_| {
                        CliError::invalid_argument(format!(
                            "line {}: invalid price '{}'",
                            line, cell
                        ))
                    })
                }
            })
            .collect::<Result<Vec<Option<f64>>>>()?;

        rows.push((date, prices));
    }

    debug!(assets = assets.len(), rows = rows.len(), "loaded price history");
    Ok(PriceTable::new(assets, rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_price_table() {
        let text = "date,A,B\n2024-01-03,11.0,\n2024-01-02,10.0,20.0\n2024-01-04,12.1,21.0\n";
        let table = read_price_table(text.as_bytes()).unwrap();

        assert_eq!(table.assets(), &["A".to_string(), "B".to_string()]);
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.dates()[0],
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        assert_eq!(table.prices()[1], vec![Some(11.0), None]);

        // Both returns touching the gap in B are dropped
        assert_eq!(table.to_returns().len(), 0);
    }

    #[test]
    fn test_missing_date_column() {
        let err = read_price_table("ticker,A\nx,1.0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }

    #[test]
    fn test_bad_date_and_price() {
        let err = read_price_table("date,A\n02/01/2024,1.0\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));

        let err = read_price_table("date,A\n2024-01-02,abc\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("invalid price"));
    }

    #[test]
    fn test_duplicate_dates_rejected() {
        let err =
            read_price_table("date,A\n2024-01-02,1.0\n2024-01-02,1.1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("quant-missing-prices.csv");
        assert!(matches!(
            load_price_table(&path),
            Err(CliError::FileNotFound(_))
        ));
    }
}
