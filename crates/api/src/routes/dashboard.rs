//! Role dashboards.

use axum::{Router, extract::State, response::Response, routing::get};
use serde_json::json;
use tally_db::ReportRepository;
use tracing::{error, warn};

use super::{LOGIN_PATH, user_context};
use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::{RequireMerchant, RequireNormalUser, RequireSuperAdmin};
use crate::response::Flash;

/// Creates the dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/dashboard/", get(user_dashboard))
        .route("/merchant/dashboard/", get(merchant_dashboard))
        .route("/super-admin/dashboard/", get(super_admin_dashboard))
}

/// GET `/user/dashboard/` - Totals over the principal's own merchants.
async fn user_dashboard(
    State(state): State<AppState>,
    RequireNormalUser(user): RequireNormalUser,
    flash: Flash,
) -> ApiResult<Response> {
    let overview = ReportRepository::new((*state.db).clone())
        .user_overview(user.id)
        .await?;

    Ok(flash.render(
        "user/dashboard",
        json!({
            "user": user_context(&user),
            "total_transactions": overview.total_transactions,
            "total_amount": overview.total_amount,
        }),
    ))
}

/// GET `/merchant/dashboard/` - Profile, revenue and latest bookings.
async fn merchant_dashboard(
    State(state): State<AppState>,
    RequireMerchant(user): RequireMerchant,
    flash: Flash,
) -> ApiResult<Response> {
    let Some(overview) = ReportRepository::new((*state.db).clone())
        .merchant_overview(user.id)
        .await?
    else {
        warn!(user_id = %user.id, "merchant principal without a merchant profile");
        return Ok(flash
            .error("Merchant profile not found.")
            .redirect(LOGIN_PATH));
    };

    Ok(flash.render(
        "merchant/dashboard",
        json!({
            "user": user_context(&user),
            "merchant": overview.merchant,
            "total_transactions": overview.total_transactions,
            "total_revenue": overview.total_revenue,
            "recent_transactions": overview.recent_transactions,
        }),
    ))
}

/// GET `/super-admin/dashboard/` - Platform totals and latest activity.
///
/// Unlike the other views, a failed query sends the admin back to the login
/// page with the error as a notice.
async fn super_admin_dashboard(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    flash: Flash,
) -> Response {
    match ReportRepository::new((*state.db).clone())
        .admin_overview()
        .await
    {
        Ok(overview) => flash.render(
            "super_admin/dashboard",
            json!({
                "user": user_context(&admin),
                "total_merchants": overview.total_merchants,
                "active_merchants": overview.active_merchants,
                "total_transactions": overview.total_transactions,
                "total_revenue": overview.total_revenue,
                "recent_merchants": overview.recent_merchants,
                "recent_transactions": overview.recent_transactions,
            }),
        ),
        Err(e) => {
            error!(error = %e, user_id = %admin.id, "super-admin dashboard failed");
            flash
                .error(format!("Dashboard error: {e}"))
                .redirect(LOGIN_PATH)
        }
    }
}
