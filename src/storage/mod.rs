//! Dataset loading (CSV → Arrow)
//!
//! One loader, three acquisition paths (see [`DataSource`]): local file,
//! uploaded bytes, remote ZIP archive. Every path funnels into the same CSV
//! reader, which validates the required columns, materializes the purchase
//! timestamp as a real timestamp value and produces a single Arrow
//! [`RecordBatch`] with the dataset schema.
//!
//! Loading is terminal-on-failure: a missing column or an unparseable row
//! aborts the load, there is no partial dataset.

pub mod remote;

use crate::source::DataSource;
use crate::{Error, Result};
use arrow::array::{
    Float64Array, Float64Builder, Int64Builder, RecordBatch, StringArray, StringBuilder,
    TimestampSecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Column names of the merged order-item table.
pub mod columns {
    /// Order identifier (one order spans many item rows)
    pub const ORDER_ID: &str = "order_id";
    /// Item sequence number within the order
    pub const ORDER_ITEM_ID: &str = "order_item_id";
    /// Customer city (may be absent)
    pub const CUSTOMER_CITY: &str = "customer_city";
    /// Product category, English name (may be absent)
    pub const PRODUCT_CATEGORY: &str = "product_category_name_english";
    /// Unit price
    pub const PRICE: &str = "price";
    /// Freight cost for the item
    pub const FREIGHT_VALUE: &str = "freight_value";
    /// Review score, 1..=5 (may be absent)
    pub const REVIEW_SCORE: &str = "review_score";
    /// Purchase timestamp
    pub const PURCHASE_TIMESTAMP: &str = "order_purchase_timestamp";
    /// Derived: price + freight (see [`crate::derive`])
    pub const TOTAL_PRICE: &str = "total_price";
}

/// Columns that must be present in the input CSV header.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    columns::ORDER_ID,
    columns::ORDER_ITEM_ID,
    columns::CUSTOMER_CITY,
    columns::PRODUCT_CATEGORY,
    columns::PRICE,
    columns::FREIGHT_VALUE,
    columns::REVIEW_SCORE,
    columns::PURCHASE_TIMESTAMP,
];

/// Arrow schema of a freshly loaded (underived) dataset.
#[must_use]
pub fn dataset_schema() -> Schema {
    Schema::new(vec![
        Field::new(columns::ORDER_ID, DataType::Utf8, false),
        Field::new(columns::ORDER_ITEM_ID, DataType::Int64, false),
        Field::new(columns::CUSTOMER_CITY, DataType::Utf8, true),
        Field::new(columns::PRODUCT_CATEGORY, DataType::Utf8, true),
        Field::new(columns::PRICE, DataType::Float64, true),
        Field::new(columns::FREIGHT_VALUE, DataType::Float64, true),
        Field::new(columns::REVIEW_SCORE, DataType::Float64, true),
        Field::new(
            columns::PURCHASE_TIMESTAMP,
            DataType::Timestamp(TimeUnit::Second, None),
            false,
        ),
    ])
}

/// One CSV line of the merged table. Empty fields deserialize to `None`.
#[derive(Debug, Deserialize)]
struct RawRow {
    order_id: String,
    order_item_id: i64,
    customer_city: Option<String>,
    product_category_name_english: Option<String>,
    price: Option<f64>,
    freight_value: Option<f64>,
    review_score: Option<f64>,
    order_purchase_timestamp: String,
}

/// Loads the merged order-item table from a single data source.
pub struct Loader {
    fetcher: remote::ArchiveFetcher,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    /// Create a loader with the default remote-fetch policy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fetcher: remote::ArchiveFetcher::new(),
        }
    }

    /// Load the full, unfiltered dataset from `source`.
    ///
    /// Only the remote branch suspends; local and upload sources parse
    /// synchronously.
    ///
    /// # Errors
    /// - [`Error::SourceUnavailable`] if the remote fetch fails
    /// - [`Error::NoTableFound`] if the fetched archive has no `.csv` entry
    /// - [`Error::ParseError`] if a required column is absent or a row does
    ///   not parse (bad number, bad timestamp)
    /// - [`Error::Io`] if the local file cannot be read
    pub async fn load(&self, source: &DataSource) -> Result<RecordBatch> {
        let batch = match source {
            DataSource::LocalPath(path) => read_csv(File::open(path)?)?,
            DataSource::Upload { bytes, .. } => read_csv(bytes.as_slice())?,
            DataSource::RemoteArchive(url) => {
                let csv_bytes = self.fetcher.fetch_csv(url).await?;
                read_csv(csv_bytes.as_slice())?
            }
        };
        info!(
            rows = batch.num_rows(),
            source = %source.cache_key(),
            "dataset loaded"
        );
        Ok(batch)
    }

    /// Synchronous load for sources that involve no network IO.
    ///
    /// # Errors
    /// Same as [`Loader::load`]; calling this with a
    /// [`DataSource::RemoteArchive`] is an [`Error::InvalidInput`].
    pub fn load_blocking(&self, source: &DataSource) -> Result<RecordBatch> {
        match source {
            DataSource::LocalPath(path) => read_csv(File::open(path)?),
            DataSource::Upload { bytes, .. } => read_csv(bytes.as_slice()),
            DataSource::RemoteArchive(_) => Err(Error::InvalidInput(
                "remote sources must be loaded through Loader::load".to_string(),
            )),
        }
    }

    /// Convenience: load a CSV file at `path`.
    ///
    /// # Errors
    /// See [`Loader::load`].
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<RecordBatch> {
        read_csv(File::open(path.as_ref())?)
    }
}

/// Parse the merged table from any reader into a `RecordBatch`.
///
/// # Errors
/// Returns [`Error::ParseError`] if a required column is missing from the
/// header or a row fails to parse.
pub fn read_csv<R: Read>(reader: R) -> Result<RecordBatch> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| Error::ParseError(format!("unreadable CSV header: {e}")))?
        .clone();
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(Error::ParseError(format!(
                "missing required column: {required}"
            )));
        }
    }

    let mut order_ids = StringBuilder::new();
    let mut item_ids = Int64Builder::new();
    let mut cities = StringBuilder::new();
    let mut categories = StringBuilder::new();
    let mut prices = Float64Builder::new();
    let mut freights = Float64Builder::new();
    let mut reviews = Float64Builder::new();
    let mut timestamps: Vec<i64> = Vec::new();

    for (index, row) in csv_reader.deserialize::<RawRow>().enumerate() {
        // Header is line 1, first data row is line 2
        let line = index + 2;
        let row = row.map_err(|e| Error::ParseError(format!("line {line}: {e}")))?;

        timestamps.push(parse_timestamp(&row.order_purchase_timestamp, line)?);
        order_ids.append_value(row.order_id);
        item_ids.append_value(row.order_item_id);
        cities.append_option(row.customer_city);
        categories.append_option(row.product_category_name_english);
        prices.append_option(row.price);
        freights.append_option(row.freight_value);
        reviews.append_option(row.review_score);
    }

    let batch = RecordBatch::try_new(
        Arc::new(dataset_schema()),
        vec![
            Arc::new(order_ids.finish()),
            Arc::new(item_ids.finish()),
            Arc::new(cities.finish()),
            Arc::new(categories.finish()),
            Arc::new(prices.finish()),
            Arc::new(freights.finish()),
            Arc::new(reviews.finish()),
            Arc::new(TimestampSecondArray::from(timestamps)),
        ],
    )?;
    Ok(batch)
}

/// Accepted timestamp shapes, tried in order.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

fn parse_timestamp(raw: &str, line: usize) -> Result<i64> {
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(datetime.and_utc().timestamp());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc().timestamp());
    }
    Err(Error::ParseError(format!(
        "line {line}: unparseable timestamp: {raw:?}"
    )))
}

/// Index of a named column, or [`Error::InvalidInput`] if absent.
pub(crate) fn column_index(batch: &RecordBatch, name: &str) -> Result<usize> {
    batch
        .schema()
        .fields()
        .iter()
        .position(|f| f.name() == name)
        .ok_or_else(|| Error::InvalidInput(format!("Column not found: {name}")))
}

/// Named column downcast to `StringArray`.
pub(crate) fn str_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    let index = column_index(batch, name)?;
    batch
        .column(index)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| Error::InvalidInput(format!("Column {name} is not a string column")))
}

/// Named column downcast to `Float64Array`.
pub(crate) fn f64_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array> {
    let index = column_index(batch, name)?;
    batch
        .column(index)
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| Error::InvalidInput(format!("Column {name} is not a float column")))
}
