//! End-to-end pipeline tests: load → derive → filter → summarize/rank

use orderscope::aggregate::{ranked, Reduction, SortOrder};
use orderscope::cache::DatasetCache;
use orderscope::dashboard::Dashboard;
use orderscope::filter::Selection;
use orderscope::storage::{columns, Loader};
use orderscope::DataSource;
use std::io::Write;

const SCENARIO: &str = "\
order_id,order_item_id,customer_city,product_category_name_english,price,freight_value,review_score,order_purchase_timestamp
o1,1,A,X,10.0,2.0,5,2017-01-01 00:00:00
o1,2,A,Y,5.0,1.0,4,2017-01-01 00:00:00
o2,1,B,X,20.0,0.0,3,2017-01-02 00:00:00
";

fn upload_source() -> DataSource {
    DataSource::Upload {
        name: "merged_all_data.csv".to_string(),
        bytes: SCENARIO.as_bytes().to_vec(),
    }
}

#[tokio::test]
async fn test_upload_to_dashboard_scenario() {
    let loader = Loader::new();
    let dataset = loader.load(&upload_source()).await.unwrap();
    let dashboard = Dashboard::new(&dataset).unwrap();

    let view = dashboard.render(&dashboard.default_selection()).unwrap();
    assert_eq!(view.summary.order_count, 2);
    assert!((view.summary.total_revenue - 38.0).abs() < f64::EPSILON);
    assert_eq!(view.summary.item_count, 3);

    // Aggregate by city over total_price, descending: B (20) before A (18)
    let by_city = ranked(
        dashboard.dataset(),
        columns::CUSTOMER_CITY,
        columns::TOTAL_PRICE,
        Reduction::Sum,
        SortOrder::Descending,
        2,
    )
    .unwrap();
    assert_eq!(by_city[0].key, "B");
    assert!((by_city[0].value - 20.0).abs() < f64::EPSILON);
    assert_eq!(by_city[1].key, "A");
    assert!((by_city[1].value - 18.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_single_city_selection_scenario() {
    let loader = Loader::new();
    let dataset = loader.load(&upload_source()).await.unwrap();
    let dashboard = Dashboard::new(&dataset).unwrap();

    let selection = Selection {
        cities: vec!["B".to_string()],
        categories: dashboard.options().categories.clone(),
    };
    let view = dashboard.render(&selection).unwrap();
    assert_eq!(view.summary.order_count, 1);
    assert!((view.summary.total_revenue - 20.0).abs() < f64::EPSILON);
    assert_eq!(view.summary.item_count, 1);
}

#[test]
fn test_local_path_load() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SCENARIO.as_bytes()).unwrap();

    let loader = Loader::new();
    let source = DataSource::LocalPath(file.path().to_path_buf());
    let dataset = loader.load_blocking(&source).unwrap();
    assert_eq!(dataset.num_rows(), 3);
}

#[test]
fn test_missing_local_file_is_io_error() {
    let loader = Loader::new();
    let source = DataSource::LocalPath("definitely/not/here.csv".into());
    let err = loader.load_blocking(&source).unwrap_err();
    assert!(matches!(err, orderscope::Error::Io(_)));
}

#[tokio::test]
async fn test_cache_avoids_reparse_and_invalidates() {
    let loader = Loader::new();
    let cache = DatasetCache::new();
    let source = upload_source();

    assert!(cache.get(&source).is_none());
    let dataset = loader.load(&source).await.unwrap();
    cache.insert(&source, dataset);

    let hit = cache.get(&source).unwrap();
    assert_eq!(hit.num_rows(), 3);

    // Source change = new key = miss; explicit invalidation drops the old one
    let changed = DataSource::Upload {
        name: "merged_all_data.csv".to_string(),
        bytes: SCENARIO.replace("20.0", "21.0").into_bytes(),
    };
    assert!(cache.get(&changed).is_none());
    cache.invalidate(&source);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_remote_fetch_failure_is_source_unavailable() {
    // Nothing listens here; both the attempt and its retry fail fast
    let loader = Loader::new();
    let source = DataSource::RemoteArchive("http://127.0.0.1:9/archive.zip".to_string());
    let err = loader.load(&source).await.unwrap_err();
    assert!(matches!(err, orderscope::Error::SourceUnavailable(_)));
}
