//! C-ABI wrapper around `resto-core`.
//!
//! # Overview
//! Exposes every directory operation through `extern "C"` functions so the
//! mobile shell (or any language with a C FFI) can drive the backend without
//! touching Rust types. Outcomes are the same collapsed values the Rust
//! surface reports: booleans, the -1 id sentinel, and null for a failed
//! list query.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary; a caught panic answers the operation's
//!   failure value.
//! - Null pointers are tolerated everywhere and answer the failure value
//!   without touching the network.
//! - The C caller owns all returned pointers and must release them with the
//!   matching `resto_free_*` / `resto_client_free` function.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use resto_core::types::PriceTier;

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client bound to `base_url`.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `resto_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn resto_client_new(base_url: *const c_char) -> *mut FfiRestoClient {
    catch_unwind(AssertUnwindSafe(|| {
        if base_url.is_null() {
            return std::ptr::null_mut();
        }
        let url = unsafe { CStr::from_ptr(base_url) }.to_str().unwrap_or("");
        let client = resto_core::RestoClient::new(url);
        Box::into_raw(Box::new(FfiRestoClient { inner: client }))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `resto_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn resto_client_free(client: *mut FfiRestoClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Register a password user.
///
/// Returns false if any argument is null or the backend refused the insert.
#[unsafe(no_mangle)]
pub extern "C" fn resto_register_user(
    client: *const FfiRestoClient,
    name: *const c_char,
    email: *const c_char,
    password: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || name.is_null() || email.is_null() || password.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        let name = unsafe { CStr::from_ptr(name) }.to_str().unwrap_or("");
        let email = unsafe { CStr::from_ptr(email) }.to_str().unwrap_or("");
        let password = unsafe { CStr::from_ptr(password) }.to_str().unwrap_or("");
        client.inner.register_user(name, email, password)
    }))
    .unwrap_or(false)
}

/// Register a social-login user identified by a third-party numeric id.
///
/// Returns false if any pointer argument is null or the backend refused
/// the insert.
#[unsafe(no_mangle)]
pub extern "C" fn resto_register_social_user(
    client: *const FfiRestoClient,
    name: *const c_char,
    email: *const c_char,
    social_id: i64,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || name.is_null() || email.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        let name = unsafe { CStr::from_ptr(name) }.to_str().unwrap_or("");
        let email = unsafe { CStr::from_ptr(email) }.to_str().unwrap_or("");
        client.inner.register_social_user(name, email, social_id)
    }))
    .unwrap_or(false)
}

/// Check an email/password pair against the backend.
#[unsafe(no_mangle)]
pub extern "C" fn resto_authenticate_user(
    client: *const FfiRestoClient,
    email: *const c_char,
    password: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || email.is_null() || password.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        let email = unsafe { CStr::from_ptr(email) }.to_str().unwrap_or("");
        let password = unsafe { CStr::from_ptr(password) }.to_str().unwrap_or("");
        client.inner.authenticate_user(email, password)
    }))
    .unwrap_or(false)
}

/// Check an email/social-id pair against the backend.
#[unsafe(no_mangle)]
pub extern "C" fn resto_authenticate_social_user(
    client: *const FfiRestoClient,
    email: *const c_char,
    social_id: i64,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || email.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        let email = unsafe { CStr::from_ptr(email) }.to_str().unwrap_or("");
        client.inner.authenticate_social_user(email, social_id)
    }))
    .unwrap_or(false)
}

/// Numeric id registered for `email`.
///
/// Returns -1 if `client` or `email` is null, the email is unknown, or the
/// lookup failed for any other reason.
#[unsafe(no_mangle)]
pub extern "C" fn resto_resolve_user_id(
    client: *const FfiRestoClient,
    email: *const c_char,
) -> i64 {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || email.is_null() {
            return -1;
        }
        let client = unsafe { &*client };
        let email = unsafe { CStr::from_ptr(email) }.to_str().unwrap_or("");
        client.inner.resolve_user_id(email)
    }))
    .unwrap_or(-1)
}

/// Ask the backend to send a password-recovery e-mail.
#[unsafe(no_mangle)]
pub extern "C" fn resto_recover_password(
    client: *const FfiRestoClient,
    email: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || email.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        let email = unsafe { CStr::from_ptr(email) }.to_str().unwrap_or("");
        client.inner.recover_password(email)
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Restaurants
// ---------------------------------------------------------------------------

/// Insert a new restaurant.
///
/// `price_tier` must be 1 (cheap), 2 (medium) or 3 (expensive); any other
/// value answers false before a request is made. Returns false if any
/// pointer argument is null or the backend refused the insert.
#[unsafe(no_mangle)]
pub extern "C" fn resto_create_restaurant(
    client: *const FfiRestoClient,
    name: *const c_char,
    latitude: f64,
    longitude: f64,
    contact: *const c_char,
    hours: *const c_char,
    price_tier: u8,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || name.is_null() || contact.is_null() || hours.is_null() {
            return false;
        }
        let price = match PriceTier::try_from(price_tier) {
            Ok(p) => p,
            Err(_) => return false,
        };
        let client = unsafe { &*client };
        let name = unsafe { CStr::from_ptr(name) }.to_str().unwrap_or("");
        let contact = unsafe { CStr::from_ptr(contact) }.to_str().unwrap_or("");
        let hours = unsafe { CStr::from_ptr(hours) }.to_str().unwrap_or("");
        client
            .inner
            .create_restaurant(name, latitude, longitude, contact, hours, price)
    }))
    .unwrap_or(false)
}

/// Restaurants within `radius_km` of a position.
///
/// Returns null if `client` is null or the query failed; an empty list is a
/// valid answer. The caller must free the returned pointer with
/// `resto_free_restaurant_list`.
#[unsafe(no_mangle)]
pub extern "C" fn resto_nearby_restaurants(
    client: *const FfiRestoClient,
    radius_km: u32,
    latitude: f64,
    longitude: f64,
) -> *mut FfiRestaurantList {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match client.inner.nearby_restaurants(radius_km, latitude, longitude) {
            Some(restaurants) => FfiRestaurantList::from_core(restaurants),
            None => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Attach a comment to a restaurant on behalf of `email`.
#[unsafe(no_mangle)]
pub extern "C" fn resto_post_comment(
    client: *const FfiRestoClient,
    restaurant_id: i64,
    email: *const c_char,
    text: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || email.is_null() || text.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        let email = unsafe { CStr::from_ptr(email) }.to_str().unwrap_or("");
        let text = unsafe { CStr::from_ptr(text) }.to_str().unwrap_or("");
        client.inner.post_comment(restaurant_id, email, text)
    }))
    .unwrap_or(false)
}

/// Rate a restaurant 1-5 stars on behalf of `email`.
#[unsafe(no_mangle)]
pub extern "C" fn resto_post_rating(
    client: *const FfiRestoClient,
    restaurant_id: i64,
    email: *const c_char,
    stars: u8,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || email.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        let email = unsafe { CStr::from_ptr(email) }.to_str().unwrap_or("");
        client.inner.post_rating(restaurant_id, email, stars)
    }))
    .unwrap_or(false)
}

/// Comments posted for a restaurant.
///
/// Returns null if `client` is null or the query failed; an empty list is a
/// valid answer. The caller must free the returned pointer with
/// `resto_free_comment_list`.
#[unsafe(no_mangle)]
pub extern "C" fn resto_list_comments(
    client: *const FfiRestoClient,
    restaurant_id: i64,
) -> *mut FfiCommentList {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match client.inner.list_comments(restaurant_id) {
            Some(comments) => FfiCommentList::from_core(comments),
            None => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a list returned by `resto_nearby_restaurants`. Safe to call with
/// null.
#[unsafe(no_mangle)]
pub extern "C" fn resto_free_restaurant_list(list: *mut FfiRestaurantList) {
    if list.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let list = unsafe { Box::from_raw(list) };
        if !list.items.is_null() && list.len > 0 {
            let items = unsafe {
                Vec::from_raw_parts(list.items, list.len as usize, list.len as usize)
            };
            for item in &items {
                free_restaurant_fields(item);
            }
        }
    }));
}

/// Free a list returned by `resto_list_comments`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn resto_free_comment_list(list: *mut FfiCommentList) {
    if list.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let list = unsafe { Box::from_raw(list) };
        if !list.items.is_null() && list.len > 0 {
            let items = unsafe {
                Vec::from_raw_parts(list.items, list.len as usize, list.len as usize)
            };
            for item in &items {
                free_comment_fields(item);
            }
        }
    }));
}

/// Free the C-string fields of an `FfiRestaurant` (but not the struct
/// itself).
fn free_restaurant_fields(restaurant: &FfiRestaurant) {
    if !restaurant.name.is_null() {
        drop(unsafe { CString::from_raw(restaurant.name) });
    }
    if !restaurant.contact.is_null() {
        drop(unsafe { CString::from_raw(restaurant.contact) });
    }
    if !restaurant.hours.is_null() {
        drop(unsafe { CString::from_raw(restaurant.hours) });
    }
}

/// Free the C-string fields of an `FfiComment` (but not the struct itself).
fn free_comment_fields(comment: &FfiComment) {
    if !comment.author.is_null() {
        drop(unsafe { CString::from_raw(comment.author) });
    }
    if !comment.text.is_null() {
        drop(unsafe { CString::from_raw(comment.text) });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn c(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    /// Start the mock backend on a random port and return its address.
    fn start_server() -> std::net::SocketAddr {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener).await
            })
            .unwrap();
        });

        addr
    }

    /// An address nothing listens on.
    fn dead_addr() -> std::net::SocketAddr {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr
    }

    #[test]
    fn client_new_and_free() {
        let url = c("http://localhost:3000");
        let client = resto_client_new(url.as_ptr());
        assert!(!client.is_null());
        resto_client_free(client);
    }

    #[test]
    fn client_new_null_returns_null() {
        let client = resto_client_new(std::ptr::null());
        assert!(client.is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        resto_client_free(std::ptr::null_mut());
    }

    #[test]
    fn null_arguments_fail_quietly() {
        let url = c("http://localhost:3000");
        let client = resto_client_new(url.as_ptr());
        let email = c("ana@x.com");
        let text = c("hola");

        assert!(!resto_register_user(
            client,
            std::ptr::null(),
            email.as_ptr(),
            text.as_ptr()
        ));
        assert!(!resto_authenticate_user(
            client,
            std::ptr::null(),
            text.as_ptr()
        ));
        assert_eq!(resto_resolve_user_id(client, std::ptr::null()), -1);
        assert!(!resto_post_comment(
            client,
            1,
            email.as_ptr(),
            std::ptr::null()
        ));
        assert!(!resto_recover_password(client, std::ptr::null()));

        assert!(resto_nearby_restaurants(std::ptr::null(), 5, 0.0, 0.0).is_null());
        assert!(resto_list_comments(std::ptr::null(), 1).is_null());
        assert!(!resto_register_user(
            std::ptr::null(),
            email.as_ptr(),
            email.as_ptr(),
            text.as_ptr()
        ));

        resto_client_free(client);
    }

    #[test]
    fn free_restaurant_list_null_is_safe() {
        resto_free_restaurant_list(std::ptr::null_mut());
    }

    #[test]
    fn free_comment_list_null_is_safe() {
        resto_free_comment_list(std::ptr::null_mut());
    }

    #[test]
    fn invalid_price_tier_never_reaches_the_backend() {
        let addr = start_server();
        let url = c(&format!("http://{addr}"));
        let client = resto_client_new(url.as_ptr());

        let name = c("Soda Tica");
        let contact = c("2222-0000");
        let hours = c("6-14");
        assert!(!resto_create_restaurant(
            client,
            name.as_ptr(),
            9.93,
            -84.08,
            contact.as_ptr(),
            hours.as_ptr(),
            0
        ));
        assert!(!resto_create_restaurant(
            client,
            name.as_ptr(),
            9.93,
            -84.08,
            contact.as_ptr(),
            hours.as_ptr(),
            9
        ));

        // Nothing was inserted.
        let list = resto_nearby_restaurants(client, 50, 9.93, -84.08);
        assert!(!list.is_null());
        let list_ref = unsafe { &*list };
        assert_eq!(list_ref.len, 0);
        assert!(list_ref.items.is_null());

        resto_free_restaurant_list(list);
        resto_client_free(client);
    }

    #[test]
    fn dead_backend_fails_soft_across_the_surface() {
        let url = c(&format!("http://{}", dead_addr()));
        let client = resto_client_new(url.as_ptr());

        let name = c("Ana");
        let email = c("ana@x.com");
        let password = c("pw");
        let text = c("hola");
        let contact = c("2222-0000");
        let hours = c("6-14");

        assert!(!resto_register_user(
            client,
            name.as_ptr(),
            email.as_ptr(),
            password.as_ptr()
        ));
        assert!(!resto_register_social_user(
            client,
            name.as_ptr(),
            email.as_ptr(),
            7
        ));
        assert!(!resto_authenticate_user(
            client,
            email.as_ptr(),
            password.as_ptr()
        ));
        assert!(!resto_authenticate_social_user(client, email.as_ptr(), 7));
        assert_eq!(resto_resolve_user_id(client, email.as_ptr()), -1);
        assert!(!resto_create_restaurant(
            client,
            name.as_ptr(),
            9.93,
            -84.08,
            contact.as_ptr(),
            hours.as_ptr(),
            1
        ));
        assert!(resto_nearby_restaurants(client, 5, 9.93, -84.08).is_null());
        assert!(!resto_post_comment(
            client,
            1,
            email.as_ptr(),
            text.as_ptr()
        ));
        assert!(!resto_post_rating(client, 1, email.as_ptr(), 4));
        assert!(resto_list_comments(client, 1).is_null());
        assert!(!resto_recover_password(client, email.as_ptr()));

        resto_client_free(client);
    }

    #[test]
    fn end_to_end_through_the_c_surface() {
        let addr = start_server();
        let url = c(&format!("http://{addr}"));
        let client = resto_client_new(url.as_ptr());
        assert!(!client.is_null());

        // Accounts.
        let name = c("Ana Solis");
        let email = c("ana@x.com");
        let password = c("secret");
        assert!(resto_register_user(
            client,
            name.as_ptr(),
            email.as_ptr(),
            password.as_ptr()
        ));
        assert!(!resto_register_user(
            client,
            name.as_ptr(),
            email.as_ptr(),
            password.as_ptr()
        ));
        assert!(resto_authenticate_user(
            client,
            email.as_ptr(),
            password.as_ptr()
        ));
        let wrong = c("wrong");
        assert!(!resto_authenticate_user(
            client,
            email.as_ptr(),
            wrong.as_ptr()
        ));

        let luis = c("Luis");
        let luis_email = c("luis@x.com");
        assert!(resto_register_social_user(
            client,
            luis.as_ptr(),
            luis_email.as_ptr(),
            31337
        ));
        assert!(resto_authenticate_social_user(
            client,
            luis_email.as_ptr(),
            31337
        ));
        assert!(!resto_authenticate_social_user(
            client,
            luis_email.as_ptr(),
            999
        ));

        let stranger = c("nadie@x.com");
        assert_eq!(resto_resolve_user_id(client, email.as_ptr()), 1);
        assert_eq!(resto_resolve_user_id(client, stranger.as_ptr()), -1);

        // Restaurant.
        let rest_name = c("La Esquina");
        let contact = c("2222-1111");
        let hours = c("8:00-17:00");
        assert!(resto_create_restaurant(
            client,
            rest_name.as_ptr(),
            9.93,
            -84.08,
            contact.as_ptr(),
            hours.as_ptr(),
            2
        ));

        let list = resto_nearby_restaurants(client, 5, 9.93, -84.08);
        assert!(!list.is_null());
        let list_ref = unsafe { &*list };
        assert_eq!(list_ref.len, 1);
        let items = unsafe { std::slice::from_raw_parts(list_ref.items, list_ref.len as usize) };
        let row_name = unsafe { CStr::from_ptr(items[0].name) }.to_str().unwrap();
        assert_eq!(row_name, "La Esquina");
        assert_eq!(items[0].price_tier, 2);
        assert_eq!(items[0].rating, 0);
        let restaurant_id = items[0].id;
        resto_free_restaurant_list(list);

        // Comment and rating.
        let text = c("muy rico");
        assert!(resto_post_comment(
            client,
            restaurant_id,
            email.as_ptr(),
            text.as_ptr()
        ));
        assert!(!resto_post_comment(
            client,
            restaurant_id,
            stranger.as_ptr(),
            text.as_ptr()
        ));
        assert!(resto_post_rating(client, restaurant_id, email.as_ptr(), 5));

        let comments = resto_list_comments(client, restaurant_id);
        assert!(!comments.is_null());
        let comments_ref = unsafe { &*comments };
        assert_eq!(comments_ref.len, 1);
        let rows =
            unsafe { std::slice::from_raw_parts(comments_ref.items, comments_ref.len as usize) };
        let author = unsafe { CStr::from_ptr(rows[0].author) }.to_str().unwrap();
        assert_eq!(author, "Ana Solis");
        let comment_text = unsafe { CStr::from_ptr(rows[0].text) }.to_str().unwrap();
        assert_eq!(comment_text, "muy rico");
        resto_free_comment_list(comments);

        // The rating shows up in the restaurant row.
        let list = resto_nearby_restaurants(client, 5, 9.93, -84.08);
        let list_ref = unsafe { &*list };
        let items = unsafe { std::slice::from_raw_parts(list_ref.items, list_ref.len as usize) };
        assert_eq!(items[0].rating, 5);
        resto_free_restaurant_list(list);

        // Recovery.
        assert!(resto_recover_password(client, email.as_ptr()));
        assert!(!resto_recover_password(client, stranger.as_ptr()));

        resto_client_free(client);
    }
}
