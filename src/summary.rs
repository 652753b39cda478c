//! Scalar summary metrics over the filtered set
//!
//! Four numbers headline the dashboard. They are plain whole-batch
//! reductions; the only subtlety is the review average, which is `None` when
//! no row carries a score — an empty filter result must read as "no data",
//! never as an average of exactly zero.

use crate::aggregate::{self, Reduction};
use crate::storage::columns;
use crate::Result;
use arrow::array::RecordBatch;

/// The four headline metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Distinct orders in the working set
    pub order_count: u64,
    /// Sum of `total_price` (missing totals contribute nothing)
    pub total_revenue: f64,
    /// Order-item lines (one per record)
    pub item_count: u64,
    /// Mean review score over rows that have one; `None` when none do
    pub avg_review: Option<f64>,
}

/// Compute the summary over `batch`.
///
/// `batch` must carry the derived `total_price` column (see
/// [`crate::derive::with_total_price`]). An empty batch is a valid input and
/// yields zeros and `None`.
///
/// # Errors
/// Returns [`crate::Error::InvalidInput`] if a required column is absent.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn summarize(batch: &RecordBatch) -> Result<Summary> {
    let order_count = aggregate::reduce_all(batch, columns::ORDER_ID, Reduction::CountDistinct)?
        .unwrap_or(0.0) as u64;
    let total_revenue =
        aggregate::reduce_all(batch, columns::TOTAL_PRICE, Reduction::Sum)?.unwrap_or(0.0);
    let item_count = batch.num_rows() as u64;
    let avg_review = aggregate::reduce_all(batch, columns::REVIEW_SCORE, Reduction::Mean)?;

    Ok(Summary {
        order_count,
        total_revenue,
        item_count,
        avg_review,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::with_total_price;
    use crate::filter::{self, Selection};
    use crate::storage::read_csv;

    const SCENARIO: &str = "\
order_id,order_item_id,customer_city,product_category_name_english,price,freight_value,review_score,order_purchase_timestamp
o1,1,A,X,10.0,2.0,5,2017-01-01 00:00:00
o1,2,A,Y,5.0,1.0,4,2017-01-01 00:00:00
o2,1,B,X,20.0,0.0,3,2017-01-02 00:00:00
";

    fn scenario() -> RecordBatch {
        with_total_price(&read_csv(SCENARIO.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn test_unfiltered_summary() {
        let summary = summarize(&scenario()).unwrap();
        assert_eq!(summary.order_count, 2);
        assert!((summary.total_revenue - 38.0).abs() < f64::EPSILON);
        assert_eq!(summary.item_count, 3);
        assert!((summary.avg_review.unwrap() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_after_city_filter() {
        let batch = scenario();
        let selection = Selection {
            cities: vec!["B".to_string()],
            categories: vec!["X".to_string(), "Y".to_string()],
        };
        let filtered = filter::apply(&batch, &selection).unwrap();
        let summary = summarize(&filtered).unwrap();
        assert_eq!(summary.order_count, 1);
        assert!((summary.total_revenue - 20.0).abs() < f64::EPSILON);
        assert_eq!(summary.item_count, 1);
    }

    #[test]
    fn test_empty_batch_is_zeros_and_none() {
        let batch = scenario();
        let empty = filter::apply(
            &batch,
            &Selection {
                cities: Vec::new(),
                categories: Vec::new(),
            },
        )
        .unwrap();
        let summary = summarize(&empty).unwrap();
        assert_eq!(summary.order_count, 0);
        assert!(summary.total_revenue.abs() < f64::EPSILON);
        assert_eq!(summary.item_count, 0);
        assert_eq!(summary.avg_review, None);
    }

    #[test]
    fn test_avg_review_none_is_distinct_from_zero() {
        let input = SCENARIO
            .replace(",5,", ",,")
            .replace(",4,", ",,")
            .replace(",3,", ",,");
        let batch = with_total_price(&read_csv(input.as_bytes()).unwrap()).unwrap();
        let summary = summarize(&batch).unwrap();
        assert_eq!(summary.avg_review, None);
    }
}
