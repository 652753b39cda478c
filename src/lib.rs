//! # Orderscope: Embedded Analytics Core for Order Dashboards
//!
//! Orderscope is the engine behind an e-commerce data-exploration dashboard:
//! it loads a merged order-item table (orders, items, prices, freight,
//! customer city, product category, review scores) from a local file,
//! uploaded bytes or a remote ZIP archive, derives a total-price field,
//! filters by multi-select city/category dimensions and computes summary
//! metrics plus ranked top-N aggregates on Arrow columnar storage.
//!
//! Presentation (widgets, charts, formatting) is out of scope; this crate
//! produces the numbers a view layer renders.
//!
//! ## Example
//!
//! ```rust,no_run
//! use orderscope::dashboard::Dashboard;
//! use orderscope::storage::Loader;
//! use orderscope::DataSource;
//!
//! # async fn example() -> orderscope::Result<()> {
//! let loader = Loader::new();
//! let source = DataSource::LocalPath("merged_all_data.csv".into());
//! let dataset = loader.load(&source).await?;
//!
//! let dashboard = Dashboard::new(&dataset)?;
//! let view = dashboard.render(&dashboard.default_selection())?;
//! println!("{} orders", view.summary.order_count);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod aggregate;
pub mod cache;
pub mod dashboard;
pub mod derive;
pub mod error;
pub mod filter;
pub mod source;
pub mod storage;
pub mod summary;

pub use error::{Error, Result};
pub use source::DataSource;
