//! Price file commands against real files in a temp directory.

use async_trait::async_trait;
use chrono::NaiveDate;
use tempfile::tempdir;

use bitbeheer::cli::args::{PricesAction, PricesArgs, ServeArgs};
use bitbeheer::commands::prices::{fetch_daily, load_history, merge_files, upsert_file};
use bitbeheer::commands::{prices, serve};
use bitbeheer::config::Config;
use bitbeheer::domain::{PricePoint, UpsertOutcome};
use bitbeheer::errors::{AppError, AppResult};
use bitbeheer::infra::PriceSource;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn point(d: &str, price: f64) -> PricePoint {
    PricePoint::new(date(d), price).unwrap()
}

/// Answers with a fixed price and remembers the currency it was asked for
struct StaticPrice {
    price: f64,
    asked: std::sync::Mutex<Option<String>>,
}

#[async_trait]
impl PriceSource for StaticPrice {
    async fn btc_price(&self, currency: &str) -> AppResult<f64> {
        *self.asked.lock().unwrap() = Some(currency.to_string());
        Ok(self.price)
    }
}

struct DownPrice;

#[async_trait]
impl PriceSource for DownPrice {
    async fn btc_price(&self, _currency: &str) -> AppResult<f64> {
        Err(AppError::upstream("price index unavailable"))
    }
}

#[tokio::test]
async fn test_upsert_creates_missing_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("eur.csv");

    let outcome = upsert_file(&file, point("2024-01-01", 38512.34)).await.unwrap();
    assert_eq!(outcome, UpsertOutcome::Inserted);

    let content = std::fs::read_to_string(&file).unwrap();
    assert_eq!(content, "\"Date\";\"Price\"\n\"2024-01-01\";\"38512,34\"\n");
}

#[tokio::test]
async fn test_upsert_keeps_higher_price_and_order() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("eur.csv");
    std::fs::write(
        &file,
        "\"Date\";\"Price\"\n\"2024-01-03\";\"300,00\"\n\"2024-01-01\";\"100,00\"\n",
    )
    .unwrap();

    assert_eq!(
        upsert_file(&file, point("2024-01-01", 90.0)).await.unwrap(),
        UpsertOutcome::Unchanged
    );
    assert_eq!(
        upsert_file(&file, point("2024-01-02", 200.0)).await.unwrap(),
        UpsertOutcome::Inserted
    );

    let content = std::fs::read_to_string(&file).unwrap();
    assert_eq!(
        content,
        "\"Date\";\"Price\"\n\"2024-01-01\";\"100,00\"\n\"2024-01-02\";\"200,00\"\n\"2024-01-03\";\"300,00\"\n"
    );
}

#[tokio::test]
async fn test_merge_combines_inputs_into_output() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    let output = dir.path().join("all.csv");

    std::fs::write(&a, "\"2024-01-01\";\"10,00\"\n\"2024-01-02\";\"20,00\"\n").unwrap();
    std::fs::write(&b, "02-01-2024;25,50\n03-01-2024;30,00\n").unwrap();

    let changed = merge_files(&output, &[a, b]).await.unwrap();
    assert_eq!(changed, 4);

    let merged = load_history(&output).await.unwrap();
    assert_eq!(merged.len(), 3);
    assert_eq!(merged.get(date("2024-01-02")), Some(25.5));
}

#[tokio::test]
async fn test_merge_rejects_missing_input() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("all.csv");

    let result = merge_files(&output, &[dir.path().join("missing.csv")]).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_malformed_file_is_reported() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("broken.csv");
    std::fs::write(&file, "\"2024-01-01\";\"veel\"\n").unwrap();

    let result = upsert_file(&file, point("2024-01-02", 1.0)).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_fetch_daily_upserts_today() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("usd.csv");
    let source = StaticPrice {
        price: 64000.5,
        asked: std::sync::Mutex::new(None),
    };

    let (stored, outcome) = fetch_daily(&file, "USD", &source, date("2024-05-01"))
        .await
        .unwrap();

    assert_eq!(outcome, UpsertOutcome::Inserted);
    assert_eq!(stored.price, 64000.5);
    assert_eq!(source.asked.lock().unwrap().as_deref(), Some("usd"));
    assert_eq!(
        load_history(&file).await.unwrap().get(date("2024-05-01")),
        Some(64000.5)
    );
}

#[tokio::test]
async fn test_fetch_daily_leaves_file_alone_when_source_fails() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("eur.csv");

    let result = fetch_daily(&file, "eur", &DownPrice, date("2024-05-01")).await;
    assert!(matches!(result, Err(AppError::Upstream(_))));
    assert!(!file.exists());
}

/// Environment with nothing set and no development fallback, as in a release build
fn bare_config() -> Config {
    Config::from_lookup(|_| None, false)
}

#[tokio::test]
async fn test_price_commands_run_without_jwt_secret() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("eur.csv");
    let merged = dir.path().join("merged.csv");

    prices::execute(
        PricesArgs {
            action: PricesAction::Upsert {
                file: file.clone(),
                date: "01-05-2024".to_string(),
                price: "58123,45".to_string(),
            },
        },
        bare_config(),
    )
    .await
    .unwrap();

    prices::execute(
        PricesArgs {
            action: PricesAction::Merge {
                output: merged.clone(),
                inputs: vec![file.clone()],
            },
        },
        bare_config(),
    )
    .await
    .unwrap();

    assert_eq!(
        load_history(&merged).await.unwrap().get(date("2024-05-01")),
        Some(58123.45)
    );
}

#[tokio::test]
async fn test_serve_refuses_to_start_without_jwt_secret() {
    let result = serve::execute(
        ServeArgs {
            host: None,
            port: None,
        },
        bare_config(),
    )
    .await;
    assert!(matches!(result, Err(AppError::Config(_))));
}
