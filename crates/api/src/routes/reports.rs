//! Super-admin reports.

use axum::{Router, extract::State, response::Response, routing::get};
use chrono::Utc;
use serde_json::json;
use tally_db::ReportRepository;

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::RequireSuperAdmin;
use crate::response::Flash;

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/super-admin/reports/", get(reports))
}

/// GET `/super-admin/reports/` - Revenue, counts and the top earners.
async fn reports(
    State(state): State<AppState>,
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    flash: Flash,
) -> ApiResult<Response> {
    let summary = ReportRepository::new((*state.db).clone())
        .summary(Utc::now())
        .await?;

    Ok(flash.render(
        "super_admin/reports",
        json!({
            "total_revenue": summary.total_revenue,
            "monthly_revenue": summary.monthly_revenue,
            "total_merchants": summary.merchants.total,
            "active_merchants": summary.merchants.active,
            "inactive_merchants": summary.merchants.inactive,
            "total_transactions": summary.transactions.total,
            "credit_transactions": summary.transactions.credit,
            "debit_transactions": summary.transactions.debit,
            "top_merchants": summary.top_merchants,
        }),
    ))
}
