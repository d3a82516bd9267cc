use crate::error::{Result, TradegridError};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;

/// Required OHLCV columns for market data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredColumn {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl RequiredColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Volume => "volume",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![Self::Open, Self::High, Self::Low, Self::Close, Self::Volume]
    }

    /// Common alternative column names
    pub fn aliases(&self) -> Vec<&'static str> {
        match self {
            Self::Open => vec!["open", "Open", "OPEN", "o"],
            Self::High => vec!["high", "High", "HIGH", "h"],
            Self::Low => vec!["low", "Low", "LOW", "l"],
            Self::Close => vec!["close", "Close", "CLOSE", "c"],
            Self::Volume => vec!["volume", "Volume", "VOLUME", "vol", "Vol", "v"],
        }
    }
}

/// Validated OHLCV window handed to the evaluator. Column aliases are
/// resolved once at construction; the per-bar series the simulation needs
/// are materialized up front so parallel evaluation never touches polars
/// internals.
#[derive(Debug, Clone)]
pub struct MarketData {
    frame: DataFrame,
    column_map: HashMap<RequiredColumn, String>,
    closes: Vec<f64>,
}

impl MarketData {
    pub fn new(frame: DataFrame) -> Result<Self> {
        let column_map = Self::validate_ohlcv(&frame)?;

        let null_report = Self::check_nulls(&frame)?;
        if !null_report.is_empty() {
            log::warn!("Null values detected: {:?}", null_report);
        }

        let close_name = column_map.get(&RequiredColumn::Close).unwrap();
        let closes = Self::series_as_f64(&frame, close_name)?;

        Ok(Self {
            frame,
            column_map,
            closes,
        })
    }

    /// Load a CSV file into validated market data
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()
            .map_err(|e| TradegridError::DataLoading(format!("Failed to read CSV: {}", e)))?;

        Self::new(frame)
    }

    pub fn num_bars(&self) -> usize {
        self.frame.height()
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn column_name(&self, required: RequiredColumn) -> &str {
        self.column_map.get(&required).unwrap()
    }

    /// Validate that the DataFrame has required OHLCV columns
    fn validate_ohlcv(df: &DataFrame) -> Result<HashMap<RequiredColumn, String>> {
        let mut column_map = HashMap::new();

        for required in RequiredColumn::all() {
            match Self::find_column(df, &required) {
                Some(col_name) => {
                    column_map.insert(required, col_name.to_string());
                }
                None => {
                    return Err(TradegridError::DataLoading(format!(
                        "Missing required column: {} (tried aliases: {:?})",
                        required.as_str(),
                        required.aliases()
                    )));
                }
            }
        }

        for (req_col, actual_name) in &column_map {
            let series = df.column(actual_name)?;
            if !matches!(
                series.dtype(),
                DataType::Float64
                    | DataType::Float32
                    | DataType::Int64
                    | DataType::Int32
                    | DataType::UInt64
                    | DataType::UInt32
            ) {
                return Err(TradegridError::DataLoading(format!(
                    "Column '{}' ({}) must be numeric, found {:?}",
                    actual_name,
                    req_col.as_str(),
                    series.dtype()
                )));
            }
        }

        Self::validate_ohlc_relationships(df, &column_map)?;

        Ok(column_map)
    }

    /// Find column by checking aliases
    fn find_column<'a>(df: &'a DataFrame, required: &RequiredColumn) -> Option<&'a str> {
        let columns = df.get_column_names();
        for alias in required.aliases() {
            if columns.iter().any(|col| col.as_str() == alias) {
                return Some(alias);
            }
        }
        None
    }

    /// Validate OHLC relationships (high >= low, high >= open/close, etc.)
    fn validate_ohlc_relationships(
        df: &DataFrame,
        column_map: &HashMap<RequiredColumn, String>,
    ) -> Result<()> {
        let high = Self::series_as_f64(df, column_map.get(&RequiredColumn::High).unwrap())?;
        let low = Self::series_as_f64(df, column_map.get(&RequiredColumn::Low).unwrap())?;
        let open = Self::series_as_f64(df, column_map.get(&RequiredColumn::Open).unwrap())?;
        let close = Self::series_as_f64(df, column_map.get(&RequiredColumn::Close).unwrap())?;

        for i in 0..df.height() {
            let (h, l, o, c) = (high[i], low[i], open[i], close[i]);
            if h < l {
                return Err(TradegridError::DataLoading(format!(
                    "Invalid data at row {}: high ({}) < low ({})",
                    i, h, l
                )));
            }
            if h < o || h < c {
                return Err(TradegridError::DataLoading(format!(
                    "Invalid data at row {}: high ({}) < open ({}) or close ({})",
                    i, h, o, c
                )));
            }
            if l > o || l > c {
                return Err(TradegridError::DataLoading(format!(
                    "Invalid data at row {}: low ({}) > open ({}) or close ({})",
                    i, l, o, c
                )));
            }
        }

        Ok(())
    }

    fn check_nulls(df: &DataFrame) -> Result<Vec<(String, usize)>> {
        let mut null_report = Vec::new();

        for col_name in df.get_column_names() {
            let series = df.column(col_name)?;
            let null_count = series.null_count();
            if null_count > 0 {
                null_report.push((col_name.to_string(), null_count));
            }
        }

        Ok(null_report)
    }

    fn series_as_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        let cast = df.column(name)?.cast(&DataType::Float64)?;
        let values = cast.f64()?;
        Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn good_frame() -> DataFrame {
        df! {
            "open" => &[100.0, 101.0, 102.0],
            "high" => &[101.0, 103.0, 104.0],
            "low" => &[99.0, 100.0, 101.0],
            "close" => &[100.5, 102.0, 103.0],
            "volume" => &[1000.0, 1500.0, 1200.0],
        }
        .unwrap()
    }

    #[test]
    fn test_validate_good_data() {
        let data = MarketData::new(good_frame()).unwrap();
        assert_eq!(data.num_bars(), 3);
        assert_eq!(data.closes(), &[100.5, 102.0, 103.0]);
    }

    #[test]
    fn test_validate_missing_column() {
        let df = df! {
            "open" => &[100.0, 101.0],
            "high" => &[101.0, 103.0],
            "low" => &[99.0, 100.0],
            // Missing 'close'
            "volume" => &[1000.0, 1500.0],
        }
        .unwrap();

        assert!(MarketData::new(df).is_err());
    }

    #[test]
    fn test_validate_invalid_ohlc() {
        let df = df! {
            "open" => &[100.0, 101.0],
            "high" => &[99.0, 103.0], // High < Open at row 0
            "low" => &[99.0, 100.0],
            "close" => &[100.5, 102.0],
            "volume" => &[1000.0, 1500.0],
        }
        .unwrap();

        assert!(MarketData::new(df).is_err());
    }

    #[test]
    fn test_column_aliases() {
        let df = df! {
            "Open" => &[100.0, 101.0],
            "HIGH" => &[101.0, 103.0],
            "low" => &[99.0, 100.0],
            "Close" => &[100.5, 102.0],
            "Vol" => &[1000.0, 1500.0],
        }
        .unwrap();

        let data = MarketData::new(df).unwrap();
        assert_eq!(data.column_name(RequiredColumn::Close), "Close");
        assert_eq!(data.column_name(RequiredColumn::Volume), "Vol");
    }
}
