//! Validated inputs for registration, merchant management and bookings.

use rust_decimal::Decimal;
use tally_shared::types::MerchantId;

use super::amount::parse_amount;
use super::types::{MerchantStatus, TransactionType};
use crate::error::DomainError;
use crate::form::{self, FormErrors};

const NAME_MAX: usize = 30;
const BUSINESS_NAME_MAX: usize = 200;
/// Message for a choice field whose value is not one of its options.
pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Self-service registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationInput {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Password.
    pub password: String,
    /// Password again.
    pub password_confirmation: String,
    /// Register as a merchant instead of a plain user.
    pub wants_merchant_role: bool,
}

impl RegistrationInput {
    /// Trims text fields and checks every field rule.
    ///
    /// # Errors
    ///
    /// Returns every broken rule, including `PasswordMismatch`.
    pub fn validate(self) -> Result<Self, FormErrors> {
        let input = Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            ..self
        };

        let mut errors = FormErrors::new();
        errors.check(form::username(&input.username));
        errors.check(form::email(&input.email));
        errors.check(form::required_max_len("first_name", &input.first_name, NAME_MAX));
        errors.check(form::required_max_len("last_name", &input.last_name, NAME_MAX));
        errors.check(form::required("password1", &input.password));
        errors.check(form::required("password2", &input.password_confirmation));
        if !input.password.is_empty()
            && !input.password_confirmation.is_empty()
            && input.password != input.password_confirmation
        {
            errors.push(DomainError::PasswordMismatch);
        }
        errors.finish(input)
    }
}

/// Whether a merchant form creates a new merchant or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// Password is required.
    Create,
    /// Blank password keeps the current one.
    Update,
}

/// Super-admin merchant form: owner fields plus merchant fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MerchantInput {
    /// Owner username.
    pub username: String,
    /// Owner email.
    pub email: String,
    /// Owner given name.
    pub first_name: String,
    /// Owner family name.
    pub last_name: String,
    /// New password; `None` keeps the current one on update.
    pub password: Option<String>,
    /// Trading name.
    pub business_name: String,
    /// Postal address; blank becomes `None`.
    pub business_address: Option<String>,
    /// Account status.
    pub status: MerchantStatus,
}

impl MerchantInput {
    /// Trims text fields, drops blank optionals and checks every field rule.
    ///
    /// # Errors
    ///
    /// Returns every broken rule. A missing password is an error only in
    /// [`FormMode::Create`].
    pub fn validate(self, mode: FormMode) -> Result<Self, FormErrors> {
        let input = Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            password: self.password.filter(|p| !p.is_empty()),
            business_name: self.business_name.trim().to_string(),
            business_address: self
                .business_address
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
            status: self.status,
        };

        let mut errors = FormErrors::new();
        errors.check(form::username(&input.username));
        errors.check(form::email(&input.email));
        errors.check(form::required_max_len("first_name", &input.first_name, NAME_MAX));
        errors.check(form::required_max_len("last_name", &input.last_name, NAME_MAX));
        errors.check(form::required_max_len(
            "business_name",
            &input.business_name,
            BUSINESS_NAME_MAX,
        ));
        if mode == FormMode::Create && input.password.is_none() {
            errors.push(DomainError::validation("password", "This field is required."));
        }
        errors.finish(input)
    }
}

/// Parses a status choice from a form.
///
/// # Errors
///
/// Returns a `Validation` error on `status` for anything but `active` or
/// `inactive`.
pub fn parse_status_choice(raw: &str) -> Result<MerchantStatus, DomainError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DomainError::validation("status", "This field is required."));
    }
    raw.parse()
        .map_err(|_| DomainError::validation("status", INVALID_CHOICE))
}

/// A booking ready to be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Merchant to book against.
    pub merchant_id: MerchantId,
    /// Amount with at most two fractional digits.
    pub amount: Decimal,
    /// Credit or debit.
    pub kind: TransactionType,
    /// Free text, may be empty.
    pub description: String,
}

/// Raw transaction form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionInput {
    /// Merchant id as submitted.
    pub merchant: String,
    /// Amount as submitted.
    pub amount: String,
    /// `credit` or `debit`.
    pub kind: String,
    /// Free text.
    pub description: String,
}

impl TransactionInput {
    /// Parses every field into a [`NewTransaction`].
    ///
    /// Whether the merchant exists is checked by the store.
    ///
    /// # Errors
    ///
    /// Returns every broken rule; amount problems are `InvalidAmount`.
    pub fn parse(self) -> Result<NewTransaction, FormErrors> {
        let mut errors = FormErrors::new();

        let merchant_id = match self.merchant.trim() {
            "" => {
                errors.push(DomainError::validation("merchant", "This field is required."));
                None
            }
            raw => raw.parse::<MerchantId>().ok().or_else(|| {
                errors.push(DomainError::validation("merchant", INVALID_CHOICE));
                None
            }),
        };

        let amount = parse_amount(&self.amount)
            .map_err(|e| errors.push(e))
            .ok();

        let kind = match self.kind.trim() {
            "" => {
                errors.push(DomainError::validation("type", "This field is required."));
                None
            }
            raw => raw.parse::<TransactionType>().ok().or_else(|| {
                errors.push(DomainError::validation("type", INVALID_CHOICE));
                None
            }),
        };

        match (merchant_id, amount, kind) {
            (Some(merchant_id), Some(amount), Some(kind)) if errors.is_empty() => {
                Ok(NewTransaction {
                    merchant_id,
                    amount,
                    kind,
                    description: self.description.trim().to_string(),
                })
            }
            _ => Err(errors),
        }
    }
}
