//! View documents, redirects and one-shot notices.
//!
//! A rendered view is a JSON document naming the view and carrying its
//! context. Notices raised before a redirect travel in the [`FLASH_COOKIE`]
//! and are handed to the next rendered view, which clears the cookie.

use std::convert::Infallible;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tally_core::form::FormErrors;

/// Cookie holding pending notices.
pub const FLASH_COOKIE: &str = "tally_flash";

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// The requested action succeeded.
    Success,
    /// The requested action failed.
    Error,
}

/// A message shown once on the next rendered view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity.
    pub level: Level,
    /// Text shown to the user.
    pub message: String,
}

/// Body of a rendered view.
#[derive(Debug, Serialize)]
pub struct ViewDocument<'a> {
    /// Template name.
    pub view: &'a str,
    /// Template context.
    pub context: Value,
    /// Notices to display.
    pub messages: Vec<Notice>,
}

/// Pending notices plus the cookie jar they travel in.
///
/// Every handler that redirects or renders goes through this extractor so
/// notices survive exactly one redirect.
#[derive(Debug, Clone)]
pub struct Flash {
    jar: CookieJar,
    pending: Vec<Notice>,
    stored: bool,
}

impl Flash {
    /// Reads pending notices from the request cookies.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let jar = CookieJar::from_headers(headers);
        let stored = jar.get(FLASH_COOKIE).is_some();
        let pending = jar
            .get(FLASH_COOKIE)
            .map(|cookie| decode_notices(cookie.value()))
            .unwrap_or_default();
        Self {
            jar,
            pending,
            stored,
        }
    }

    /// Queues a notice.
    pub fn push(&mut self, level: Level, message: impl Into<String>) {
        self.pending.push(Notice {
            level,
            message: message.into(),
        });
    }

    /// Queues a success notice.
    #[must_use]
    pub fn success(mut self, message: impl Into<String>) -> Self {
        self.push(Level::Success, message);
        self
    }

    /// Queues an error notice.
    #[must_use]
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.push(Level::Error, message);
        self
    }

    /// Notices queued so far.
    #[must_use]
    pub fn pending(&self) -> &[Notice] {
        &self.pending
    }

    /// Sets a cookie on the outgoing response.
    #[must_use]
    pub fn add_cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.jar = self.jar.add(cookie);
        self
    }

    /// Expires a cookie on the outgoing response.
    #[must_use]
    pub fn remove_cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.jar = self.jar.remove(cookie);
        self
    }

    /// `303 See Other` to `location`, carrying the pending notices along.
    #[must_use]
    pub fn redirect(self, location: &str) -> Response {
        let jar = if self.pending.is_empty() {
            self.jar
        } else {
            self.jar.add(flash_cookie(encode_notices(&self.pending)))
        };
        (jar, Redirect::to(location)).into_response()
    }

    /// Renders `view` with `200 OK`.
    #[must_use]
    pub fn render(self, view: &str, context: Value) -> Response {
        self.render_with_status(StatusCode::OK, view, context)
    }

    /// Renders `view`, handing it every pending notice.
    #[must_use]
    pub fn render_with_status(self, status: StatusCode, view: &str, context: Value) -> Response {
        let jar = if self.stored {
            self.jar.remove(flash_cookie(String::new()))
        } else {
            self.jar
        };
        let document = ViewDocument {
            view,
            context,
            messages: self.pending,
        };
        (status, jar, Json(document)).into_response()
    }

    /// Re-renders a form view with its field errors and `422`.
    #[must_use]
    pub fn render_invalid(self, view: &str, mut context: Value, errors: &FormErrors) -> Response {
        if let Some(form) = context.get_mut("form").and_then(Value::as_object_mut) {
            form.insert("errors".to_string(), serde_json::json!(errors.to_map()));
        }
        self.render_with_status(StatusCode::UNPROCESSABLE_ENTITY, view, context)
    }
}

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

fn flash_cookie(value: String) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn encode_notices(notices: &[Notice]) -> String {
    serde_json::to_vec(notices)
        .map(|bytes| base64_url::encode(&bytes))
        .unwrap_or_default()
}

/// Tampered or stale cookies decode to no notices.
pub(crate) fn decode_notices(raw: &str) -> Vec<Notice> {
    base64_url::decode(raw)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

/// A form context: submitted (or initial) values and no errors yet.
#[must_use]
pub fn form_context(data: Value) -> Value {
    serde_json::json!({ "data": data, "errors": {} })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
    use http_body_util::BodyExt;
    use serde_json::json;
    use tally_core::DomainError;

    fn set_cookies(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    fn request_headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, cookie.parse().unwrap());
        headers
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_redirect_is_see_other_and_stores_notices() {
        let response = Flash::from_headers(&HeaderMap::new())
            .success("Saved!")
            .redirect("/super-admin/merchants/");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/super-admin/merchants/");

        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].starts_with("tally_flash="));
    }

    #[test]
    fn test_redirect_without_notices_sets_no_cookie() {
        let response = Flash::from_headers(&HeaderMap::new()).redirect("/login/");
        assert!(set_cookies(&response).is_empty());
    }

    #[tokio::test]
    async fn test_notices_are_shown_once() {
        let stored = encode_notices(&[Notice {
            level: Level::Success,
            message: "Welcome back!".to_string(),
        }]);
        let flash = Flash::from_headers(&request_headers(&format!("{FLASH_COOKIE}={stored}")));
        assert_eq!(flash.pending().len(), 1);

        let response = flash.render("user/dashboard", json!({}));
        assert_eq!(response.status(), StatusCode::OK);

        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].starts_with("tally_flash=;"));

        let body = body_json(response).await;
        assert_eq!(body["view"], "user/dashboard");
        assert_eq!(
            body["messages"],
            json!([{ "level": "success", "message": "Welcome back!" }])
        );
    }

    #[test]
    fn test_tampered_cookie_is_ignored() {
        let flash = Flash::from_headers(&request_headers("tally_flash=%%%not-base64"));
        assert!(flash.pending().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_form_is_unprocessable() {
        let errors = FormErrors::from(DomainError::DuplicateUsername);
        let response = Flash::from_headers(&HeaderMap::new()).render_invalid(
            "auth/register",
            json!({ "form": form_context(json!({ "username": "taken" })) }),
            &errors,
        );
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["context"]["form"]["data"]["username"], "taken");
        assert_eq!(
            body["context"]["form"]["errors"]["username"][0],
            "A user with this username already exists."
        );
    }
}
