//! Merchant management routes for super-admins.

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::Response,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tally_core::DomainError;
use tally_core::form::FormErrors;
use tally_core::ledger::{
    Filter, FormMode, MerchantInput, MerchantStatus, MerchantWithOwner, parse_status_choice,
};
use tally_db::{MerchantRepository, StoreError};
use tally_shared::types::{MerchantId, PageRequest};
use tracing::info;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extractors::RequireSuperAdmin;
use crate::response::{Flash, form_context};

const MERCHANTS_PATH: &str = "/super-admin/merchants/";
const FORM_VIEW: &str = "super_admin/merchant_form";

/// Creates the merchant management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/super-admin/merchants/", get(list_merchants))
        .route(
            "/super-admin/merchants/add/",
            get(add_form).post(add_merchant),
        )
        .route(
            "/super-admin/merchants/{merchant_id}/edit/",
            get(edit_form).post(edit_merchant),
        )
        .route(
            "/super-admin/merchants/{merchant_id}/delete/",
            get(confirm_delete).post(delete_merchant),
        )
        .route(
            "/super-admin/merchants/{merchant_id}/toggle-status/",
            get(toggle_status).post(toggle_status),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for the merchant list.
#[derive(Debug, Default, Deserialize)]
pub struct ListMerchantsQuery {
    /// Matches username, first name, last name or business name.
    pub search: Option<String>,
    /// `active` or `inactive`.
    pub status: Option<String>,
    /// Page number; anything unparseable means the first page.
    pub page: Option<String>,
}

/// Merchant add/edit form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MerchantForm {
    /// Owner's login name.
    pub username: String,
    /// Owner's email.
    pub email: String,
    /// Owner's given name.
    pub first_name: String,
    /// Owner's family name.
    pub last_name: String,
    /// Required when adding; blank keeps the current password when editing.
    pub password: String,
    /// Business name.
    pub business_name: String,
    /// Business address.
    pub business_address: String,
    /// `active` or `inactive`.
    pub status: String,
}

impl MerchantForm {
    fn initial() -> Self {
        Self {
            status: MerchantStatus::default().as_str().to_string(),
            ..Self::default()
        }
    }

    fn from_merchant(record: &MerchantWithOwner) -> Self {
        Self {
            username: record.owner.username.clone(),
            email: record.owner.email.clone(),
            first_name: record.owner.first_name.clone(),
            last_name: record.owner.last_name.clone(),
            password: String::new(),
            business_name: record.merchant.business_name.clone(),
            business_address: record.merchant.business_address.clone().unwrap_or_default(),
            status: record.merchant.status.as_str().to_string(),
        }
    }

    /// Submitted values, password excluded.
    fn data(&self) -> Value {
        json!({
            "username": self.username,
            "email": self.email,
            "first_name": self.first_name,
            "last_name": self.last_name,
            "business_name": self.business_name,
            "business_address": self.business_address,
            "status": self.status,
        })
    }

    fn into_input(self, mode: FormMode) -> Result<MerchantInput, FormErrors> {
        let status = parse_status_choice(&self.status);
        let input = MerchantInput {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            password: Some(self.password),
            business_name: self.business_name,
            business_address: Some(self.business_address),
            status: status.as_ref().copied().unwrap_or_default(),
        };

        match (input.validate(mode), status) {
            (Ok(input), Ok(_)) => Ok(input),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(mut errors), Err(e)) => {
                errors.push(e);
                Err(errors)
            }
            (Err(errors), Ok(_)) => Err(errors),
        }
    }
}

fn parse_merchant_id(raw: &str) -> Result<MerchantId, ApiError> {
    raw.parse()
        .map_err(|_| DomainError::NotFound("Merchant").into())
}

async fn find_merchant(state: &AppState, raw_id: &str) -> ApiResult<MerchantWithOwner> {
    let id = parse_merchant_id(raw_id)?;
    MerchantRepository::new((*state.db).clone())
        .find(id)
        .await?
        .ok_or_else(|| DomainError::NotFound("Merchant").into())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/super-admin/merchants/` - Search, filter and page through merchants.
async fn list_merchants(
    State(state): State<AppState>,
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    flash: Flash,
    Query(query): Query<ListMerchantsQuery>,
) -> ApiResult<Response> {
    let page = MerchantRepository::new((*state.db).clone())
        .list(
            query.search.as_deref(),
            Filter::parse(query.status.as_deref()),
            PageRequest::from_query(query.page.as_deref()),
        )
        .await?;

    Ok(flash.render(
        "super_admin/merchant_list",
        json!({
            "page_obj": page,
            "search_query": query.search.unwrap_or_default(),
            "status_filter": query.status.unwrap_or_default(),
        }),
    ))
}

/// GET `/super-admin/merchants/add/` - Empty merchant form.
async fn add_form(RequireSuperAdmin(_admin): RequireSuperAdmin, flash: Flash) -> Response {
    flash.render(
        FORM_VIEW,
        json!({
            "form": form_context(MerchantForm::initial().data()),
            "title": "Add Merchant",
        }),
    )
}

/// POST `/super-admin/merchants/add/` - Create a merchant and its owner.
async fn add_merchant(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    flash: Flash,
    Form(form): Form<MerchantForm>,
) -> ApiResult<Response> {
    let context = json!({
        "form": form_context(form.data()),
        "title": "Add Merchant",
    });

    let input = match form.into_input(FormMode::Create) {
        Ok(input) => input,
        Err(errors) => return Ok(flash.render_invalid(FORM_VIEW, context, &errors)),
    };

    match MerchantRepository::new((*state.db).clone()).create(input).await {
        Ok(created) => {
            info!(admin_id = %admin.id, merchant_id = %created.merchant.id, "merchant added");
            Ok(flash
                .success(format!(
                    "Merchant {} added successfully!",
                    created.owner.full_name()
                ))
                .redirect(MERCHANTS_PATH))
        }
        Err(StoreError::Domain(e)) => {
            Ok(flash.render_invalid(FORM_VIEW, context, &FormErrors::from(e)))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET `/super-admin/merchants/{merchant_id}/edit/` - Pre-filled form.
async fn edit_form(
    State(state): State<AppState>,
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    flash: Flash,
    Path(merchant_id): Path<String>,
) -> ApiResult<Response> {
    let record = find_merchant(&state, &merchant_id).await?;

    Ok(flash.render(
        FORM_VIEW,
        json!({
            "form": form_context(MerchantForm::from_merchant(&record).data()),
            "merchant": record,
            "title": "Edit Merchant",
        }),
    ))
}

/// POST `/super-admin/merchants/{merchant_id}/edit/` - Update merchant and owner.
async fn edit_merchant(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    flash: Flash,
    Path(merchant_id): Path<String>,
    Form(form): Form<MerchantForm>,
) -> ApiResult<Response> {
    let record = find_merchant(&state, &merchant_id).await?;
    let context = json!({
        "form": form_context(form.data()),
        "merchant": record,
        "title": "Edit Merchant",
    });

    let input = match form.into_input(FormMode::Update) {
        Ok(input) => input,
        Err(errors) => return Ok(flash.render_invalid(FORM_VIEW, context, &errors)),
    };

    match MerchantRepository::new((*state.db).clone())
        .update(record.merchant.id, input)
        .await
    {
        Ok(updated) => {
            info!(admin_id = %admin.id, merchant_id = %updated.merchant.id, "merchant edited");
            Ok(flash
                .success(format!(
                    "Merchant {} updated successfully!",
                    updated.owner.full_name()
                ))
                .redirect(MERCHANTS_PATH))
        }
        Err(StoreError::Domain(e @ DomainError::NotFound(_))) => Err(e.into()),
        Err(StoreError::Domain(e)) => {
            Ok(flash.render_invalid(FORM_VIEW, context, &FormErrors::from(e)))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET `/super-admin/merchants/{merchant_id}/delete/` - Confirmation page.
async fn confirm_delete(
    State(state): State<AppState>,
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    flash: Flash,
    Path(merchant_id): Path<String>,
) -> ApiResult<Response> {
    let record = find_merchant(&state, &merchant_id).await?;
    Ok(flash.render(
        "super_admin/merchant_confirm_delete",
        json!({ "merchant": record }),
    ))
}

/// POST `/super-admin/merchants/{merchant_id}/delete/` - Delete the merchant
/// and its transactions.
async fn delete_merchant(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    flash: Flash,
    Path(merchant_id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_merchant_id(&merchant_id)?;
    MerchantRepository::new((*state.db).clone()).delete(id).await?;

    info!(admin_id = %admin.id, merchant_id = %id, "merchant removed");
    Ok(flash
        .success("Merchant deleted successfully!")
        .redirect(MERCHANTS_PATH))
}

/// GET/POST `/super-admin/merchants/{merchant_id}/toggle-status/`.
async fn toggle_status(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    flash: Flash,
    Path(merchant_id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_merchant_id(&merchant_id)?;
    let merchant = MerchantRepository::new((*state.db).clone())
        .toggle_status(id)
        .await?;

    info!(admin_id = %admin.id, merchant_id = %id, status = %merchant.status, "merchant status toggled");
    Ok(flash
        .success(format!("Merchant {} successfully!", merchant.status.verb()))
        .redirect(MERCHANTS_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> MerchantForm {
        MerchantForm {
            username: "acme".to_string(),
            email: "acme@example.com".to_string(),
            first_name: "Wile".to_string(),
            last_name: "Coyote".to_string(),
            password: "rocket".to_string(),
            business_name: "Acme Corp".to_string(),
            business_address: String::new(),
            status: "inactive".to_string(),
        }
    }

    #[test]
    fn test_form_into_input() {
        let input = filled_form()
            .into_input(FormMode::Create)
            .expect("valid form");
        assert_eq!(input.status, MerchantStatus::Inactive);
        assert_eq!(input.password.as_deref(), Some("rocket"));
        assert_eq!(input.business_address, None);
    }

    #[test]
    fn test_form_collects_status_and_field_errors() {
        let form = MerchantForm {
            business_name: String::new(),
            status: "archived".to_string(),
            ..filled_form()
        };
        let errors = form.into_input(FormMode::Create).unwrap_err();
        assert!(errors.has_field("business_name"));
        assert!(errors.has_field("status"));
    }

    #[test]
    fn test_blank_password_only_allowed_on_update() {
        let form = || MerchantForm {
            password: String::new(),
            ..filled_form()
        };
        assert!(form().into_input(FormMode::Create).is_err());
        assert_eq!(
            form().into_input(FormMode::Update).expect("valid").password,
            None
        );
    }

    #[test]
    fn test_data_never_echoes_password() {
        assert!(filled_form().data().get("password").is_none());
    }

    #[test]
    fn test_garbage_id_is_not_found() {
        let err = parse_merchant_id("42").unwrap_err();
        assert_eq!(err.0.status_code(), 404);
    }
}
