//! Iamport subscription payments.
//!
//! Every call uses bearer auth; the token is created and renewed by the
//! underlying [`Api`].

use std::sync::LazyLock;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::client::Api;
use crate::error::{Error, Result};
use crate::models::{CardExpiry, CardNumber};
use crate::result::ApiResult;
use crate::transport::{ApiRequest, AuthMode};

static BIRTH_RE: LazyLock<regex_lite::Regex> =
    LazyLock::new(|| regex_lite::Regex::new(r"^(\d{6}|\d{10})$").expect("valid regex"));

static PWD_2DIGIT_RE: LazyLock<regex_lite::Regex> =
    LazyLock::new(|| regex_lite::Regex::new(r"^\d{2}$").expect("valid regex"));

/// A charge against a stored billing key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgainPayment {
    pub customer_uid: String,
    pub merchant_uid: String,
    pub amount: u64,
    pub name: String,
}

/// Which payment to cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentRef {
    ImpUid(String),
    MerchantUid(String),
}

/// A full or partial cancellation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CancelPayment {
    #[serde(flatten)]
    pub payment: PaymentRef,
    /// Partial amount; `None` cancels the remaining balance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Iamport API facade.
#[derive(Debug)]
pub struct Iamport {
    api: Api,
}

impl Iamport {
    pub fn new(api: Api) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    /// Create a fresh access token and cache it.
    pub async fn create_token(&self) -> Result<String> {
        self.api.create_token().await
    }

    /// Register a card under `customer_uid` for later billing.
    #[instrument(skip(self, card_number, expiry, birth, pwd_2digit))]
    pub async fn create_subscribe_customer(
        &self,
        customer_uid: &str,
        card_number: &CardNumber,
        expiry: &CardExpiry,
        birth: &str,
        pwd_2digit: &str,
    ) -> Result<ApiResult> {
        let path = customer_path(customer_uid)?;
        if !BIRTH_RE.is_match(birth) {
            return Err(Error::validation(
                "birth must be 6 digits (YYMMDD) or a 10-digit business number",
            ));
        }
        if !PWD_2DIGIT_RE.is_match(pwd_2digit) {
            return Err(Error::validation("pwd_2digit must be 2 digits"));
        }

        let request = ApiRequest::post(path)
            .auth(AuthMode::Bearer)
            .param("card_number", card_number.formatted())
            .param("expiry", expiry.to_api_format())
            .param("birth", birth)
            .param("pwd_2digit", pwd_2digit);
        self.api.request(request).await
    }

    #[instrument(skip(self))]
    pub async fn get_subscribe_customer(&self, customer_uid: &str) -> Result<ApiResult> {
        let path = customer_path(customer_uid)?;
        self.api
            .request(ApiRequest::get(path).auth(AuthMode::Bearer))
            .await
    }

    #[instrument(skip(self))]
    pub async fn remove_subscribe_customer(&self, customer_uid: &str) -> Result<ApiResult> {
        let path = customer_path(customer_uid)?;
        self.api
            .request(ApiRequest::delete(path).auth(AuthMode::Bearer))
            .await
    }

    /// Look up a payment by its Iamport UID.
    #[instrument(skip(self))]
    pub async fn get_payment(&self, imp_uid: &str) -> Result<ApiResult> {
        let imp_uid = required("imp_uid", imp_uid)?;
        let path = format!("/payments/{}", urlencoding::encode(imp_uid));
        self.api
            .request(ApiRequest::get(path).auth(AuthMode::Bearer))
            .await
    }

    /// Charge a registered customer.
    #[instrument(
        skip(self, payment),
        fields(customer_uid = %payment.customer_uid, merchant_uid = %payment.merchant_uid)
    )]
    pub async fn pay_again(&self, payment: &AgainPayment) -> Result<ApiResult> {
        required("customer_uid", &payment.customer_uid)?;
        required("merchant_uid", &payment.merchant_uid)?;
        if payment.amount == 0 {
            return Err(Error::validation("amount must be positive"));
        }

        let request = ApiRequest::post("/subscribe/payments/again")
            .auth(AuthMode::Bearer)
            .params(to_params(payment)?);
        self.api.request(request).await
    }

    /// Cancel a payment in full or in part.
    #[instrument(skip(self, cancel), fields(payment = ?cancel.payment))]
    pub async fn cancel_payment(&self, cancel: &CancelPayment) -> Result<ApiResult> {
        match &cancel.payment {
            PaymentRef::ImpUid(uid) => required("imp_uid", uid)?,
            PaymentRef::MerchantUid(uid) => required("merchant_uid", uid)?,
        };
        if cancel.amount == Some(0) {
            return Err(Error::validation("amount must be positive"));
        }

        let request = ApiRequest::post("/payments/cancel")
            .auth(AuthMode::Bearer)
            .params(to_params(cancel)?);
        self.api.request(request).await
    }
}

fn customer_path(customer_uid: &str) -> Result<String> {
    let uid = required("customer_uid", customer_uid)?;
    Ok(format!("/subscribe/customers/{}", urlencoding::encode(uid)))
}

fn to_params<T: Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::validation(format!("Expected an object, got {}", other))),
        Err(e) => Err(Error::validation(format!("Unencodable parameters: {}", e))),
    }
}

fn required<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{} must not be empty", name)));
    }
    Ok(value)
}
