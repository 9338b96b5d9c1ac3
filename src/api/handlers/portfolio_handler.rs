//! Wallet valuation.

use axum::{
    extract::State,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::extractors::Query;
use crate::api::AppState;
use crate::domain::Portfolio;
use crate::errors::AppResult;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PortfolioQuery {
    /// Comma separated Bitcoin addresses
    pub addresses: Option<String>,
    /// Fiat currency code, defaults to eur
    pub currency: Option<String>,
}

impl PortfolioQuery {
    fn address_list(&self) -> Vec<String> {
        self.addresses
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::to_string)
            .collect()
    }
}

pub fn portfolio_routes() -> Router<AppState> {
    Router::new().route("/", get(get_portfolio))
}

/// Value a set of wallets at the current BTC price
#[utoipa::path(
    get,
    path = "/api/portfolio",
    tag = "Portfolio",
    params(PortfolioQuery),
    responses(
        (status = 200, description = "Wallet values and totals", body = Portfolio),
        (status = 400, description = "No or invalid addresses"),
        (status = 502, description = "Price or explorer API unavailable")
    )
)]
pub async fn get_portfolio(
    State(state): State<AppState>,
    Query(query): Query<PortfolioQuery>,
) -> AppResult<Json<Portfolio>> {
    let addresses = query.address_list();
    let portfolio = state
        .portfolio_service
        .value(addresses, query.currency)
        .await?;
    Ok(Json(portfolio))
}
