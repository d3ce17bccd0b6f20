//! URL builder, executor and response interpreter for the directory API.
//!
//! # Design
//! `RestoClient` holds the configured base URL and a blocking [`Transport`];
//! it carries no other state between calls. Every operation is one GET whose
//! URL joins the base root with positional path segments (the backend takes
//! all parameters in the path; the only encoding it expects is spaces as
//! `%20`).
//!
//! The backend signals outcomes through a JSON array with inverted polarity
//! between writes and reads:
//!
//! - Write endpoints (register, create, comment, rate) return rows only on
//!   duplicates or conflicts, so an *empty* array means the write landed.
//! - Read/confirm endpoints (authenticate, id lookup, recovery) answer with
//!   a *populated* array whose first row carries the flag or value.
//!
//! The `try_*` methods keep failure reasons in [`ApiError`]; the plain
//! methods collapse them to the booleans and sentinels the mobile caller
//! works with, so a dead network and an explicit refusal look the same from
//! the outside.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::Transport;
use crate::types::{Comment, PriceTier, Restaurant};

/// Synchronous client for the restaurant-directory backend.
///
/// Each method is a single blocking round trip. Callers that want requests
/// in parallel can clone the client across threads; nothing here prevents
/// or coordinates that.
#[derive(Clone)]
pub struct RestoClient {
    base_url: String,
    transport: Transport,
}

impl fmt::Debug for RestoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestoClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RestoClient {
    /// Create a client bound to `base_url` (a trailing `/` is tolerated).
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport: Transport::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Boolean / sentinel layer — what the app consumes
    // -----------------------------------------------------------------------

    /// Register a password user. True when the backend accepted the insert.
    pub fn register_user(&self, name: &str, email: &str, password: &str) -> bool {
        self.try_register_user(name, email, password).is_ok()
    }

    /// Register a social-login user identified by a third-party numeric id.
    pub fn register_social_user(&self, name: &str, email: &str, social_id: i64) -> bool {
        self.try_register_social_user(name, email, social_id).is_ok()
    }

    /// Check an email/password pair against the backend.
    pub fn authenticate_user(&self, email: &str, password: &str) -> bool {
        self.try_authenticate_user(email, password).is_ok()
    }

    /// Check an email/social-id pair against the backend.
    pub fn authenticate_social_user(&self, email: &str, social_id: i64) -> bool {
        self.try_authenticate_social_user(email, social_id).is_ok()
    }

    /// Restaurants within `radius_km` of a position, or `None` when the
    /// request or the decode failed. An empty list is a valid answer.
    pub fn nearby_restaurants(
        &self,
        radius_km: u32,
        latitude: f64,
        longitude: f64,
    ) -> Option<Vec<Restaurant>> {
        self.try_nearby_restaurants(radius_km, latitude, longitude).ok()
    }

    /// Insert a new restaurant. True when the backend accepted it.
    pub fn create_restaurant(
        &self,
        name: &str,
        latitude: f64,
        longitude: f64,
        contact: &str,
        hours: &str,
        price: PriceTier,
    ) -> bool {
        self.try_create_restaurant(name, latitude, longitude, contact, hours, price)
            .is_ok()
    }

    /// Numeric id registered for `email`, or -1 when the lookup failed for
    /// any reason (unknown email, bad response, dead network).
    pub fn resolve_user_id(&self, email: &str) -> i64 {
        self.try_resolve_user_id(email).unwrap_or(-1)
    }

    /// Attach a comment to a restaurant on behalf of `email`.
    pub fn post_comment(&self, restaurant_id: i64, email: &str, text: &str) -> bool {
        self.try_post_comment(restaurant_id, email, text).is_ok()
    }

    /// Rate a restaurant 1–5 stars on behalf of `email`. The range is the
    /// caller's contract with the backend; nothing is checked here.
    pub fn post_rating(&self, restaurant_id: i64, email: &str, stars: u8) -> bool {
        self.try_post_rating(restaurant_id, email, stars).is_ok()
    }

    /// Comments posted for a restaurant, or `None` when the request or the
    /// decode failed.
    pub fn list_comments(&self, restaurant_id: i64) -> Option<Vec<Comment>> {
        self.try_list_comments(restaurant_id).ok()
    }

    /// Ask the backend to send a password-recovery e-mail.
    pub fn recover_password(&self, email: &str) -> bool {
        self.try_recover_password(email).is_ok()
    }

    // -----------------------------------------------------------------------
    // Diagnostic layer — same operations, reasons preserved
    // -----------------------------------------------------------------------

    pub fn try_register_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let rows = self.fetch_rows(&self.register_user_url(name, email, password))?;
        confirm_write(&rows)
    }

    pub fn try_register_social_user(
        &self,
        name: &str,
        email: &str,
        social_id: i64,
    ) -> Result<(), ApiError> {
        let rows = self.fetch_rows(&self.register_social_user_url(name, email, social_id))?;
        confirm_write(&rows)
    }

    pub fn try_authenticate_user(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let rows = self.fetch_rows(&self.authenticate_user_url(email, password))?;
        confirm_flag(&rows, "passed")
    }

    pub fn try_authenticate_social_user(
        &self,
        email: &str,
        social_id: i64,
    ) -> Result<(), ApiError> {
        let rows = self.fetch_rows(&self.authenticate_social_user_url(email, social_id))?;
        confirm_flag(&rows, "passed")
    }

    pub fn try_nearby_restaurants(
        &self,
        radius_km: u32,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<Restaurant>, ApiError> {
        self.fetch_list(&self.nearby_restaurants_url(radius_km, latitude, longitude))
    }

    pub fn try_create_restaurant(
        &self,
        name: &str,
        latitude: f64,
        longitude: f64,
        contact: &str,
        hours: &str,
        price: PriceTier,
    ) -> Result<(), ApiError> {
        let url = self.create_restaurant_url(name, latitude, longitude, contact, hours, price);
        let rows = self.fetch_rows(&url)?;
        confirm_write(&rows)
    }

    pub fn try_resolve_user_id(&self, email: &str) -> Result<i64, ApiError> {
        let rows = self.fetch_rows(&self.user_id_url(email))?;
        extract_id(&rows)
    }

    /// Posting a comment depends on the id lookup. A failed lookup embeds
    /// the -1 sentinel in the path and lets the backend refuse it; the
    /// outer call is not aborted early.
    pub fn try_post_comment(
        &self,
        restaurant_id: i64,
        email: &str,
        text: &str,
    ) -> Result<(), ApiError> {
        let user_id = self.resolve_user_id(email);
        let rows = self.fetch_rows(&self.post_comment_url(restaurant_id, user_id, text))?;
        confirm_write(&rows)
    }

    /// Same dependent-lookup behavior as [`Self::try_post_comment`].
    pub fn try_post_rating(
        &self,
        restaurant_id: i64,
        email: &str,
        stars: u8,
    ) -> Result<(), ApiError> {
        let user_id = self.resolve_user_id(email);
        let rows = self.fetch_rows(&self.post_rating_url(restaurant_id, user_id, stars))?;
        confirm_write(&rows)
    }

    pub fn try_list_comments(&self, restaurant_id: i64) -> Result<Vec<Comment>, ApiError> {
        self.fetch_list(&self.list_comments_url(restaurant_id))
    }

    pub fn try_recover_password(&self, email: &str) -> Result<(), ApiError> {
        let rows = self.fetch_rows(&self.recover_password_url(email))?;
        // The backend reports the mail status under its Spanish field name.
        confirm_flag(&rows, "enviado")
    }

    // -----------------------------------------------------------------------
    // URL builders — one per endpoint, arguments in path order
    // -----------------------------------------------------------------------

    fn register_user_url(&self, name: &str, email: &str, password: &str) -> String {
        self.endpoint_url(&format!("newUser/{name}/{email}/{password}"))
    }

    fn register_social_user_url(&self, name: &str, email: &str, social_id: i64) -> String {
        self.endpoint_url(&format!("newFaceUser/{name}/{email}/{social_id}"))
    }

    fn authenticate_user_url(&self, email: &str, password: &str) -> String {
        self.endpoint_url(&format!("user/{email}/{password}"))
    }

    fn authenticate_social_user_url(&self, email: &str, social_id: i64) -> String {
        self.endpoint_url(&format!("facebookuser/{email}/{social_id}"))
    }

    fn nearby_restaurants_url(&self, radius_km: u32, latitude: f64, longitude: f64) -> String {
        self.endpoint_url(&format!("rests/{radius_km}/{latitude}/{longitude}"))
    }

    fn create_restaurant_url(
        &self,
        name: &str,
        latitude: f64,
        longitude: f64,
        contact: &str,
        hours: &str,
        price: PriceTier,
    ) -> String {
        self.endpoint_url(&format!(
            "newrest/{name}/{latitude}/{longitude}/{contact}/{hours}/{}",
            price.wire()
        ))
    }

    fn user_id_url(&self, email: &str) -> String {
        self.endpoint_url(&format!("userid/{email}"))
    }

    fn post_comment_url(&self, restaurant_id: i64, user_id: i64, text: &str) -> String {
        self.endpoint_url(&format!("comment/{restaurant_id}/{user_id}/{text}"))
    }

    fn post_rating_url(&self, restaurant_id: i64, user_id: i64, stars: u8) -> String {
        self.endpoint_url(&format!("califica/{restaurant_id}/{user_id}/{stars}"))
    }

    fn list_comments_url(&self, restaurant_id: i64) -> String {
        self.endpoint_url(&format!("comments/{restaurant_id}"))
    }

    fn recover_password_url(&self, email: &str) -> String {
        self.endpoint_url(&format!("recover/{email}"))
    }

    /// Join `path` onto the base root and apply the backend's only encoding
    /// rule: literal spaces become `%20`. Nothing else is escaped — callers
    /// must keep slashes and reserved characters out of argument values.
    fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path).replace(' ', "%20")
    }

    // -----------------------------------------------------------------------
    // Fetch helpers
    // -----------------------------------------------------------------------

    fn fetch_rows(&self, url: &str) -> Result<Vec<Value>, ApiError> {
        parse_rows(&self.transport.get(url)?)
    }

    fn fetch_list<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, ApiError> {
        let body = self.transport.get(url)?;
        serde_json::from_str(&body).map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }
}

/// Parse a response body as the JSON array every endpoint returns.
fn parse_rows(body: &str) -> Result<Vec<Value>, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::MalformedResponse(e.to_string()))
}

/// Write endpoints return rows only on duplicate/conflict: empty means the
/// write landed, rows of any shape mean it did not.
fn confirm_write(rows: &[Value]) -> Result<(), ApiError> {
    if rows.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Rejected)
    }
}

/// Confirm endpoints answer with a first row carrying a boolean flag. A
/// missing row, missing key or non-boolean value all count as a refusal.
fn confirm_flag(rows: &[Value], flag: &str) -> Result<(), ApiError> {
    let confirmed = rows
        .first()
        .and_then(|row| row.get(flag))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if confirmed {
        Ok(())
    } else {
        Err(ApiError::Rejected)
    }
}

/// The id lookup answers `[{"id": n}]`; anything else leaves the caller
/// with the -1 sentinel.
fn extract_id(rows: &[Value]) -> Result<i64, ApiError> {
    rows.first()
        .and_then(|row| row.get("id"))
        .and_then(Value::as_i64)
        .ok_or(ApiError::Rejected)
}
