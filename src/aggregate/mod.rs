//! Grouped reductions and ranked top-N views
//!
//! Every chart and metric in the dashboard is an instance of the same
//! engine: group the filtered set by a categorical key, reduce a measure per
//! group, sort by the reduced value and truncate to the first N rows.
//!
//! Grouping walks the batch once. Groups are created in first-appearance
//! order of the key and the rank sort is stable, so ties keep that order —
//! re-rendering the same data never reshuffles equal bars.

use crate::storage;
use crate::{Error, Result};
use arrow::array::{Array, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::DataType;
use rustc_hash::{FxHashMap, FxHashSet};

/// How a group of measure values collapses to one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Sum of non-missing values (missing contribute nothing)
    Sum,
    /// Count of non-missing values
    Count,
    /// Count of distinct non-missing values
    CountDistinct,
    /// Mean over non-missing values; undefined on an empty group
    Mean,
}

/// Sort direction for the ranked view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest first ("least popular" views)
    Ascending,
    /// Largest first ("top" views)
    Descending,
}

/// One row of a ranked aggregate: group key and reduced value.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    /// Distinct value of the group-key column
    pub key: String,
    /// Reduced measure for the group
    pub value: f64,
}

/// A measure column in one of the supported shapes.
enum MeasureColumn<'a> {
    Float(&'a Float64Array),
    Int(&'a Int64Array),
    Str(&'a StringArray),
}

impl MeasureColumn<'_> {
    fn is_null(&self, index: usize) -> bool {
        match self {
            Self::Float(a) => a.is_null(index),
            Self::Int(a) => a.is_null(index),
            Self::Str(a) => a.is_null(index),
        }
    }

    /// Numeric view of the value; `None` for string columns.
    #[allow(clippy::cast_precision_loss)]
    fn numeric(&self, index: usize) -> Option<f64> {
        match self {
            Self::Float(a) => Some(a.value(index)),
            Self::Int(a) => Some(a.value(index) as f64),
            Self::Str(_) => None,
        }
    }

    /// Identity token for count-distinct. Floats compare by bit pattern.
    fn distinct_token(&self, index: usize) -> String {
        match self {
            Self::Float(a) => format!("{:016x}", a.value(index).to_bits()),
            Self::Int(a) => a.value(index).to_string(),
            Self::Str(a) => a.value(index).to_owned(),
        }
    }
}

fn measure_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<MeasureColumn<'a>> {
    let index = storage::column_index(batch, name)?;
    let column = batch.column(index);
    match column.data_type() {
        DataType::Float64 => column
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(MeasureColumn::Float)
            .ok_or_else(|| Error::InvalidInput(format!("Failed to downcast column: {name}"))),
        DataType::Int64 => column
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(MeasureColumn::Int)
            .ok_or_else(|| Error::InvalidInput(format!("Failed to downcast column: {name}"))),
        DataType::Utf8 => column
            .as_any()
            .downcast_ref::<StringArray>()
            .map(MeasureColumn::Str)
            .ok_or_else(|| Error::InvalidInput(format!("Failed to downcast column: {name}"))),
        dt => Err(Error::InvalidInput(format!(
            "Measure not supported for data type: {dt:?}"
        ))),
    }
}

/// Per-group running state; only the fields the reduction needs are touched.
#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: u64,
    distinct: FxHashSet<String>,
}

impl Accumulator {
    fn update(&mut self, reduction: Reduction, measure: &MeasureColumn<'_>, index: usize) {
        match reduction {
            Reduction::Sum | Reduction::Mean => {
                if let Some(value) = measure.numeric(index) {
                    self.sum += value;
                    self.count += 1;
                }
            }
            Reduction::Count => self.count += 1,
            Reduction::CountDistinct => {
                self.distinct.insert(measure.distinct_token(index));
            }
        }
    }

    /// Final value; `None` when the reduction is undefined (mean of nothing).
    #[allow(clippy::cast_precision_loss)]
    fn finish(&self, reduction: Reduction) -> Option<f64> {
        match reduction {
            Reduction::Sum => Some(self.sum),
            Reduction::Count => Some(self.count as f64),
            Reduction::CountDistinct => Some(self.distinct.len() as f64),
            Reduction::Mean => (self.count > 0).then(|| self.sum / self.count as f64),
        }
    }
}

fn check_reduction(reduction: Reduction, measure: &MeasureColumn<'_>, name: &str) -> Result<()> {
    if matches!(reduction, Reduction::Sum | Reduction::Mean)
        && matches!(measure, MeasureColumn::Str(_))
    {
        return Err(Error::InvalidInput(format!(
            "{reduction:?} not supported for string column: {name}"
        )));
    }
    Ok(())
}

/// Group `batch` by `group_key`, reduce `measure` per group, sort by the
/// reduced value in `order` direction and keep the first `top_n` rows.
///
/// Rows with a missing group key never form a bucket. Groups whose reduction
/// is undefined (mean with no observations) are dropped before ranking.
///
/// # Errors
/// Returns [`Error::InvalidInput`] if a column is missing, the group key is
/// not a string column, or the reduction does not fit the measure type.
pub fn ranked(
    batch: &RecordBatch,
    group_key: &str,
    measure: &str,
    reduction: Reduction,
    order: SortOrder,
    top_n: usize,
) -> Result<Vec<GroupRow>> {
    let keys = storage::str_column(batch, group_key)?;
    let values = measure_column(batch, measure)?;
    check_reduction(reduction, &values, measure)?;

    // Group slots in first-appearance order of the key
    let mut slot_by_key: FxHashMap<String, usize> = FxHashMap::default();
    let mut group_keys: Vec<String> = Vec::new();
    let mut accumulators: Vec<Accumulator> = Vec::new();

    for index in 0..batch.num_rows() {
        if keys.is_null(index) {
            continue;
        }
        let key = keys.value(index);
        let slot = match slot_by_key.get(key) {
            Some(&slot) => slot,
            None => {
                let slot = group_keys.len();
                slot_by_key.insert(key.to_owned(), slot);
                group_keys.push(key.to_owned());
                accumulators.push(Accumulator::default());
                slot
            }
        };
        if !values.is_null(index) {
            accumulators[slot].update(reduction, &values, index);
        }
    }

    let mut rows: Vec<GroupRow> = group_keys
        .into_iter()
        .zip(&accumulators)
        .filter_map(|(key, acc)| acc.finish(reduction).map(|value| GroupRow { key, value }))
        .collect();

    // Stable sort: ties keep first-appearance order
    match order {
        SortOrder::Ascending => rows.sort_by(|a, b| a.value.total_cmp(&b.value)),
        SortOrder::Descending => rows.sort_by(|a, b| b.value.total_cmp(&a.value)),
    }
    rows.truncate(top_n);
    Ok(rows)
}

/// Reduce `measure` across the whole batch, no grouping.
///
/// Returns `None` when the reduction is undefined (mean of a batch with no
/// non-missing values) — never a silent zero.
///
/// # Errors
/// Same conditions as [`ranked`], minus the group key.
pub fn reduce_all(
    batch: &RecordBatch,
    measure: &str,
    reduction: Reduction,
) -> Result<Option<f64>> {
    let values = measure_column(batch, measure)?;
    check_reduction(reduction, &values, measure)?;

    let mut acc = Accumulator::default();
    for index in 0..batch.num_rows() {
        if !values.is_null(index) {
            acc.update(reduction, &values, index);
        }
    }
    Ok(acc.finish(reduction))
}
