//! Transaction routes for super-admins.

use axum::{
    Form, Router,
    extract::{Query, State},
    response::Response,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tally_core::DomainError;
use tally_core::form::FormErrors;
use tally_core::ledger::{Filter, INVALID_CHOICE, MerchantWithOwner, TransactionInput};
use tally_db::{MerchantRepository, StoreError, TransactionRepository};
use tally_shared::types::PageRequest;
use tracing::info;

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::RequireSuperAdmin;
use crate::response::{Flash, form_context};

const TRANSACTIONS_PATH: &str = "/super-admin/transactions/";
const FORM_VIEW: &str = "super_admin/transaction_form";

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/super-admin/transactions/", get(list_transactions))
        .route(
            "/super-admin/transactions/add/",
            get(add_form).post(add_transaction),
        )
}

/// Query parameters for the transaction list.
#[derive(Debug, Default, Deserialize)]
pub struct ListTransactionsQuery {
    /// Matches owner username, business name or description.
    pub search: Option<String>,
    /// `credit` or `debit`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Page number.
    pub page: Option<String>,
}

/// Transaction add form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TransactionForm {
    /// Merchant id.
    pub merchant: String,
    /// Decimal amount.
    pub amount: String,
    /// `credit` or `debit`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Free text.
    pub description: String,
}

impl TransactionForm {
    fn data(&self) -> Value {
        json!({
            "merchant": self.merchant,
            "amount": self.amount,
            "type": self.kind,
            "description": self.description,
        })
    }
}

impl From<TransactionForm> for TransactionInput {
    fn from(form: TransactionForm) -> Self {
        Self {
            merchant: form.merchant,
            amount: form.amount,
            kind: form.kind,
            description: form.description,
        }
    }
}

/// `(id, label)` pairs for the merchant select.
fn merchant_choices(merchants: &[MerchantWithOwner]) -> Value {
    merchants
        .iter()
        .map(|m| {
            json!({
                "id": m.merchant.id,
                "label": format!("{} - {}", m.owner.full_name(), m.merchant.business_name),
            })
        })
        .collect()
}

async fn form_page(state: &AppState, data: Value) -> ApiResult<Value> {
    let merchants = MerchantRepository::new((*state.db).clone()).choices().await?;
    Ok(json!({
        "form": form_context(data),
        "merchants": merchant_choices(&merchants),
    }))
}

/// GET `/super-admin/transactions/` - Search, filter and page through bookings.
async fn list_transactions(
    State(state): State<AppState>,
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    flash: Flash,
    Query(query): Query<ListTransactionsQuery>,
) -> ApiResult<Response> {
    let page = TransactionRepository::new((*state.db).clone())
        .list(
            query.search.as_deref(),
            Filter::parse(query.kind.as_deref()),
            PageRequest::from_query(query.page.as_deref()),
        )
        .await?;

    Ok(flash.render(
        "super_admin/transaction_list",
        json!({
            "page_obj": page,
            "search_query": query.search.unwrap_or_default(),
            "type_filter": query.kind.unwrap_or_default(),
        }),
    ))
}

/// GET `/super-admin/transactions/add/` - Empty booking form.
async fn add_form(
    State(state): State<AppState>,
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    flash: Flash,
) -> ApiResult<Response> {
    let context = form_page(&state, TransactionForm::default().data()).await?;
    Ok(flash.render(FORM_VIEW, context))
}

/// POST `/super-admin/transactions/add/` - Record a booking.
async fn add_transaction(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    flash: Flash,
    Form(form): Form<TransactionForm>,
) -> ApiResult<Response> {
    let context = form_page(&state, form.data()).await?;

    let booking = match TransactionInput::from(form).parse() {
        Ok(booking) => booking,
        Err(errors) => return Ok(flash.render_invalid(FORM_VIEW, context, &errors)),
    };

    match TransactionRepository::new((*state.db).clone())
        .create(booking)
        .await
    {
        Ok(recorded) => {
            info!(
                admin_id = %admin.id,
                transaction_id = %recorded.transaction.id,
                merchant_id = %recorded.merchant.id,
                "transaction added"
            );
            Ok(flash
                .success("Transaction added successfully!")
                .redirect(TRANSACTIONS_PATH))
        }
        // A well-formed id that matches no merchant is still not one of the choices.
        Err(StoreError::Domain(DomainError::NotFound(_))) => {
            let errors = FormErrors::from(DomainError::validation("merchant", INVALID_CHOICE));
            Ok(flash.render_invalid(FORM_VIEW, context, &errors))
        }
        Err(StoreError::Domain(e)) => {
            Ok(flash.render_invalid(FORM_VIEW, context, &FormErrors::from(e)))
        }
        Err(e) => Err(e.into()),
    }
}
