//! Prices command - Maintains historical BTC price CSV files.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};

use crate::cli::args::{PricesAction, PricesArgs};
use crate::config::Config;
use crate::domain::price::{parse_date, parse_price};
use crate::domain::{PriceHistory, PricePoint, UpsertOutcome};
use crate::errors::{AppError, AppResult};
use crate::infra::{HttpPriceSource, PriceSource};

/// Execute the prices command
pub async fn execute(args: PricesArgs, config: Config) -> AppResult<()> {
    match args.action {
        PricesAction::Upsert { file, date, price } => {
            let date = parse_date(&date).map_err(AppError::validation)?;
            let price = parse_price(&price).map_err(AppError::validation)?;
            let outcome = upsert_file(&file, PricePoint::new(date, price)?).await?;
            tracing::info!(file = %file.display(), %date, ?outcome, "Price upserted");
        }
        PricesAction::Merge { output, inputs } => {
            let changed = merge_files(&output, &inputs).await?;
            tracing::info!(
                output = %output.display(),
                inputs = inputs.len(),
                changed,
                "Price files merged"
            );
        }
        PricesAction::FetchDaily { file, currency } => {
            let source = HttpPriceSource::new(config.price_api_url.clone())?;
            let today = Utc::now().date_naive();
            let (point, outcome) = fetch_daily(&file, &currency, &source, today).await?;
            tracing::info!(
                file = %file.display(),
                date = %point.date,
                price = point.price,
                ?outcome,
                "Daily price stored"
            );
        }
    }

    Ok(())
}

/// Read a price file. A missing file is an empty history.
pub async fn load_history(path: &Path) -> AppResult<PriceHistory> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => PriceHistory::parse(&content).map_err(|e| {
            AppError::validation(format!("{}: {}", path.display(), e))
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(file = %path.display(), "Price file missing, starting empty");
            Ok(PriceHistory::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Rewrite the whole file through a sibling temp file.
pub async fn save_history(path: &Path, history: &PriceHistory) -> AppResult<()> {
    let tmp = temp_path(path);
    tokio::fs::write(&tmp, history.to_csv()).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "prices.csv".into());
    name.push(".tmp");
    path.with_file_name(name)
}

pub async fn upsert_file(path: &Path, point: PricePoint) -> AppResult<UpsertOutcome> {
    let mut history = load_history(path).await?;
    let outcome = history.upsert(point);
    if outcome != UpsertOutcome::Unchanged {
        save_history(path, &history).await?;
    }
    Ok(outcome)
}

/// Merge `inputs` into `output`. Returns the number of inserted or raised rows.
pub async fn merge_files(output: &Path, inputs: &[PathBuf]) -> AppResult<usize> {
    let mut history = load_history(output).await?;
    let mut changed = 0;
    for input in inputs {
        if !tokio::fs::try_exists(input).await? {
            return Err(AppError::bad_request(format!(
                "Input file not found: {}",
                input.display()
            )));
        }
        let other = load_history(input).await?;
        changed += history.merge(&other);
    }
    save_history(output, &history).await?;
    Ok(changed)
}

pub async fn fetch_daily(
    path: &Path,
    currency: &str,
    source: &dyn PriceSource,
    today: NaiveDate,
) -> AppResult<(PricePoint, UpsertOutcome)> {
    let price = source.btc_price(&currency.to_lowercase()).await?;
    let point = PricePoint::new(today, price)?;
    let outcome = upsert_file(path, point).await?;
    Ok((point, outcome))
}
