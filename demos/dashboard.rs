//! Text dashboard walkthrough
//!
//! Loads a small order-item table from an in-memory upload, renders the
//! default view, then narrows the city filter and renders again.
//!
//! Run with: cargo run --example dashboard

use orderscope::cache::DatasetCache;
use orderscope::dashboard::{Dashboard, DashboardView};
use orderscope::filter::Selection;
use orderscope::storage::Loader;
use orderscope::DataSource;

const SAMPLE: &str = "\
order_id,order_item_id,customer_city,product_category_name_english,price,freight_value,review_score,order_purchase_timestamp
a1,1,sao paulo,toys,49.90,8.70,5,2017-10-02 10:56:33
a1,2,sao paulo,toys,21.50,4.10,5,2017-10-02 10:56:33
b2,1,rio de janeiro,housewares,115.00,19.30,4,2017-11-18 19:28:06
c3,1,sao paulo,electronics,899.00,31.20,3,2018-02-13 21:18:39
d4,1,curitiba,housewares,36.40,12.80,,2018-03-01 14:14:28
e5,1,rio de janeiro,toys,12.99,7.45,1,2018-05-10 10:30:45
";

fn print_view(label: &str, view: &DashboardView) {
    println!("=== {label} ===");
    println!("  orders:   {}", view.summary.order_count);
    println!("  revenue:  {:.2}", view.summary.total_revenue);
    println!("  items:    {}", view.summary.item_count);
    match view.summary.avg_review {
        Some(avg) => println!("  review:   {avg:.2}"),
        None => println!("  review:   n/a"),
    }
    println!("  orders by city:");
    for row in &view.orders_by_city {
        println!("    {:<16} {:>8.0}", row.key, row.value);
    }
    println!("  revenue by category:");
    for row in &view.revenue_by_category {
        println!("    {:<16} {:>8.2}", row.key, row.value);
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let loader = Loader::new();
    let cache = DatasetCache::new();
    let source = DataSource::Upload {
        name: "merged_all_data.csv".to_string(),
        bytes: SAMPLE.as_bytes().to_vec(),
    };

    let dataset = match cache.get(&source) {
        Some(hit) => hit,
        None => {
            let loaded = loader.load(&source).await?;
            cache.insert(&source, loaded)
        }
    };

    let dashboard = Dashboard::new(&dataset)?;
    print_view("all cities", &dashboard.render(&dashboard.default_selection())?);

    let narrowed = Selection {
        cities: vec!["rio de janeiro".to_string()],
        categories: dashboard.options().categories.clone(),
    };
    print_view("rio de janeiro only", &dashboard.render(&narrowed)?);

    Ok(())
}
