//! Assembled dashboard views
//!
//! Ties the engine together for the presentation layer: one struct holds the
//! derived full dataset plus the selection universes, and `render` produces
//! everything a repaint needs — the four headline metrics and the five
//! ranked chart tables — from a single filter pass.

use crate::aggregate::{self, GroupRow, Reduction, SortOrder};
use crate::filter::{self, Selection};
use crate::storage::columns;
use crate::summary::{self, Summary};
use crate::{derive, Result};
use arrow::array::RecordBatch;
use tracing::debug;

/// Rows kept per ranked chart.
pub const TOP_N: usize = 10;

/// Option universes for the two multi-select controls.
///
/// Always derived from the full dataset, so narrowing a filter never removes
/// choices from the controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOptions {
    /// Every distinct non-missing city
    pub cities: Vec<String>,
    /// Every distinct non-missing product category
    pub categories: Vec<String>,
}

/// Everything one repaint needs.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// Headline metrics over the filtered set
    pub summary: Summary,
    /// Distinct orders per city, busiest first
    pub orders_by_city: Vec<GroupRow>,
    /// Revenue (`total_price` sum) per category, highest first
    pub revenue_by_category: Vec<GroupRow>,
    /// Items sold per category, best sellers first
    pub best_selling_categories: Vec<GroupRow>,
    /// Items sold per category, slowest sellers first
    pub least_selling_categories: Vec<GroupRow>,
    /// Mean review score per category, highest first
    pub review_by_category: Vec<GroupRow>,
}

/// The analytics side of the dashboard: derived dataset + precomputed
/// selection universes.
pub struct Dashboard {
    dataset: RecordBatch,
    options: SelectionOptions,
}

impl Dashboard {
    /// Build from a freshly loaded dataset; derives `total_price` and
    /// computes the selection universes.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidInput`] if the dataset is missing a
    /// required column.
    pub fn new(dataset: &RecordBatch) -> Result<Self> {
        let dataset = derive::with_total_price(dataset)?;
        let options = SelectionOptions {
            cities: filter::distinct_values(&dataset, columns::CUSTOMER_CITY)?,
            categories: filter::distinct_values(&dataset, columns::PRODUCT_CATEGORY)?,
        };
        Ok(Self { dataset, options })
    }

    /// The multi-select option universes.
    #[must_use]
    pub fn options(&self) -> &SelectionOptions {
        &self.options
    }

    /// The default "everything selected" state of both controls.
    #[must_use]
    pub fn default_selection(&self) -> Selection {
        Selection {
            cities: self.options.cities.clone(),
            categories: self.options.categories.clone(),
        }
    }

    /// The full derived dataset.
    #[must_use]
    pub fn dataset(&self) -> &RecordBatch {
        &self.dataset
    }

    /// Recompute every metric and chart for `selection`.
    ///
    /// An empty filter result is a valid state: the summary reads zero /
    /// "no data" and every chart table is empty.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidInput`] only on schema misuse; data
    /// content never fails a render.
    pub fn render(&self, selection: &Selection) -> Result<DashboardView> {
        let filtered = filter::apply(&self.dataset, selection)?;
        debug!(
            rows = filtered.num_rows(),
            cities = selection.cities.len(),
            categories = selection.categories.len(),
            "rendering dashboard"
        );

        Ok(DashboardView {
            summary: summary::summarize(&filtered)?,
            orders_by_city: aggregate::ranked(
                &filtered,
                columns::CUSTOMER_CITY,
                columns::ORDER_ID,
                Reduction::CountDistinct,
                SortOrder::Descending,
                TOP_N,
            )?,
            revenue_by_category: aggregate::ranked(
                &filtered,
                columns::PRODUCT_CATEGORY,
                columns::TOTAL_PRICE,
                Reduction::Sum,
                SortOrder::Descending,
                TOP_N,
            )?,
            best_selling_categories: aggregate::ranked(
                &filtered,
                columns::PRODUCT_CATEGORY,
                columns::ORDER_ITEM_ID,
                Reduction::Count,
                SortOrder::Descending,
                TOP_N,
            )?,
            least_selling_categories: aggregate::ranked(
                &filtered,
                columns::PRODUCT_CATEGORY,
                columns::ORDER_ITEM_ID,
                Reduction::Count,
                SortOrder::Ascending,
                TOP_N,
            )?,
            review_by_category: aggregate::ranked(
                &filtered,
                columns::PRODUCT_CATEGORY,
                columns::REVIEW_SCORE,
                Reduction::Mean,
                SortOrder::Descending,
                TOP_N,
            )?,
        })
    }
}
