//! Shared test utilities for integration tests

use metricore::{
    compose, last_year, ytd, Aggregation, Attribute, Dataset, DisplayName, Measure, Metric,
    SemanticModel,
};

/// Load the demo dataset: sales for 2024-2025 across regions NA/EU and two
/// products, plus an annual budget table and lookup tables for display names
pub fn load_demo() -> Dataset {
    Dataset::from_file("tests/test_data/demo.yaml")
        .unwrap_or_else(|e| panic!("Failed to load demo dataset: {}", e))
}

/// Build the demo semantic model over the demo dataset
pub fn demo_model() -> SemanticModel {
    SemanticModel::builder()
        .attribute(Attribute::new("year", "sales"))
        .attribute(Attribute::new("month", "sales"))
        .attribute(
            Attribute::new("region", "sales")
                .column("regionId")
                .label("Region")
                .display(DisplayName::new("regionName", "regions", "id", "name")),
        )
        .attribute(
            Attribute::new("product", "sales")
                .column("productId")
                .display(DisplayName::new("productName", "products", "id", "name")),
        )
        .measure(
            Measure::new("amount", "sales", Aggregation::Sum).label("Sales Amount"),
        )
        .measure(Measure::new("sale_count", "sales", Aggregation::Count))
        .measure(Measure::new("budget_amount", "budget", Aggregation::Sum).column("amount"))
        .metric(Metric::simple("revenue", "amount").format("currency"))
        .metric(Metric::simple("sales_made", "sale_count").format("integer"))
        .metric(Metric::simple("budget_total", "budget_amount"))
        .metric(
            Metric::simple("regional_revenue", "amount").grain(["year", "regionId"]),
        )
        .metric(
            Metric::derived("sales_vs_budget", ["revenue", "budget_total"], |deps| {
                let sales = deps.get("revenue").copied().flatten()?;
                let budget = deps.get("budget_total").copied().flatten()?;
                if budget == 0.0 {
                    return None;
                }
                Some(sales / budget * 100.0)
            })
            .format("percent"),
        )
        .metric(Metric::transformed("revenue_ytd", "revenue", "ytd"))
        .metric(Metric::transformed("revenue_ly", "revenue", "last_year"))
        .metric(Metric::transformed("revenue_ytd_ly", "revenue", "ytd_last_year"))
        .transform_fn("ytd_last_year", compose(vec![ytd(), last_year()]))
        .build()
        .unwrap_or_else(|e| panic!("Failed to build demo model: {}", e))
}
