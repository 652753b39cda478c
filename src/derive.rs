//! Derived column: `total_price = price + freight_value`
//!
//! Computed once per dataset right after load. The Arrow add kernel
//! propagates nulls, so a missing operand yields a missing total rather than
//! an error or a fake zero.

use crate::storage::{self, columns};
use crate::Result;
use arrow::array::RecordBatch;
use arrow::compute::kernels::numeric::add;
use arrow::datatypes::{DataType, Field, Schema};
use std::sync::Arc;

/// Return `batch` with the `total_price` column appended.
///
/// Idempotent: if the column is already present it is recomputed and
/// replaced, producing identical values.
///
/// # Errors
/// Returns [`crate::Error::InvalidInput`] if the price or freight column is
/// missing or not numeric.
pub fn with_total_price(batch: &RecordBatch) -> Result<RecordBatch> {
    let price = storage::f64_column(batch, columns::PRICE)?;
    let freight = storage::f64_column(batch, columns::FREIGHT_VALUE)?;
    let total = add(price, freight)?;

    let mut fields: Vec<Field> = Vec::with_capacity(batch.num_columns() + 1);
    let mut arrays = Vec::with_capacity(batch.num_columns() + 1);
    for (field, array) in batch.schema().fields().iter().zip(batch.columns()) {
        if field.name() == columns::TOTAL_PRICE {
            continue;
        }
        fields.push(field.as_ref().clone());
        arrays.push(Arc::clone(array));
    }
    fields.push(Field::new(columns::TOTAL_PRICE, DataType::Float64, true));
    arrays.push(total);

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}
