//! Dimension filtering
//!
//! The working set is restricted to rows whose city and category both fall
//! inside the user's multi-selections. Option universes are always derived
//! from the full dataset, so narrowing a filter never shrinks the choices
//! offered to the user. An explicitly empty selection means "nothing", not
//! "everything": it yields an empty working set.

use crate::storage::{self, columns};
use crate::Result;
use arrow::array::{Array, BooleanArray, RecordBatch};
use arrow::compute;
use rustc_hash::FxHashSet;

/// Multi-select state for the two filter dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Allowed customer cities
    pub cities: Vec<String>,
    /// Allowed product categories
    pub categories: Vec<String>,
}

impl Selection {
    /// The default selection: every distinct non-missing value of both
    /// dimensions, taken from the full dataset.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidInput`] if a dimension column is
    /// missing from `batch`.
    pub fn all(batch: &RecordBatch) -> Result<Self> {
        Ok(Self {
            cities: distinct_values(batch, columns::CUSTOMER_CITY)?,
            categories: distinct_values(batch, columns::PRODUCT_CATEGORY)?,
        })
    }
}

/// Distinct non-null values of a string column, in first-appearance order.
///
/// # Errors
/// Returns [`crate::Error::InvalidInput`] if `column` is absent or not a
/// string column.
pub fn distinct_values(batch: &RecordBatch, column: &str) -> Result<Vec<String>> {
    let array = storage::str_column(batch, column)?;
    let mut seen = FxHashSet::default();
    let mut values = Vec::new();
    for index in 0..array.len() {
        if array.is_null(index) {
            continue;
        }
        let value = array.value(index);
        if seen.insert(value) {
            values.push(value.to_owned());
        }
    }
    Ok(values)
}

/// Rows of `batch` whose city and category are both selected.
///
/// Rows with a missing dimension value are always excluded. Pure and
/// idempotent; never errors on content.
///
/// # Errors
/// Returns [`crate::Error::InvalidInput`] if a dimension column is missing.
pub fn apply(batch: &RecordBatch, selection: &Selection) -> Result<RecordBatch> {
    let cities: FxHashSet<&str> = selection.cities.iter().map(String::as_str).collect();
    let categories: FxHashSet<&str> = selection.categories.iter().map(String::as_str).collect();

    let city_column = storage::str_column(batch, columns::CUSTOMER_CITY)?;
    let category_column = storage::str_column(batch, columns::PRODUCT_CATEGORY)?;

    let mask: BooleanArray = (0..batch.num_rows())
        .map(|index| {
            Some(
                !city_column.is_null(index)
                    && !category_column.is_null(index)
                    && cities.contains(city_column.value(index))
                    && categories.contains(category_column.value(index)),
            )
        })
        .collect();

    Ok(compute::filter_record_batch(batch, &mask)?)
}
