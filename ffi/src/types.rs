//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String` and pointer + length pairs instead of
//! `Vec`. Conversion functions live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use resto_core::types::{Comment, Restaurant};

/// Opaque handle to a `RestoClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiRestoClient {
    pub(crate) inner: resto_core::RestoClient,
}

// ---------------------------------------------------------------------------
// Restaurant rows
// ---------------------------------------------------------------------------

/// A restaurant row exposed to C. The price tier travels as the backend's
/// integer: 1 cheap, 2 medium, 3 expensive.
#[repr(C)]
pub struct FfiRestaurant {
    pub id: i64,
    pub name: *mut c_char,
    pub latitude: f64,
    pub longitude: f64,
    pub contact: *mut c_char,
    pub hours: *mut c_char,
    pub price_tier: u8,
    pub rating: i64,
}

/// A list of restaurant rows exposed to C.
#[repr(C)]
pub struct FfiRestaurantList {
    pub items: *mut FfiRestaurant,
    pub len: u32,
}

impl FfiRestaurantList {
    /// Convert the core rows into a heap-allocated C list.
    pub(crate) fn from_core(restaurants: Vec<Restaurant>) -> *mut Self {
        let len = restaurants.len() as u32;
        let mut rows: Vec<FfiRestaurant> = restaurants
            .into_iter()
            .map(|r| FfiRestaurant {
                id: r.id,
                name: CString::new(r.name).unwrap().into_raw(),
                latitude: r.latitude,
                longitude: r.longitude,
                contact: CString::new(r.contact).unwrap().into_raw(),
                hours: CString::new(r.hours).unwrap().into_raw(),
                price_tier: r.price.wire(),
                rating: r.rating,
            })
            .collect();

        let items = if rows.is_empty() {
            std::ptr::null_mut()
        } else {
            let ptr = rows.as_mut_ptr();
            std::mem::forget(rows);
            ptr
        };

        Box::into_raw(Box::new(FfiRestaurantList { items, len }))
    }
}

// ---------------------------------------------------------------------------
// Comment rows
// ---------------------------------------------------------------------------

/// One comment row exposed to C: author name and text.
#[repr(C)]
pub struct FfiComment {
    pub author: *mut c_char,
    pub text: *mut c_char,
}

/// A list of comment rows exposed to C.
#[repr(C)]
pub struct FfiCommentList {
    pub items: *mut FfiComment,
    pub len: u32,
}

impl FfiCommentList {
    /// Convert the core rows into a heap-allocated C list.
    pub(crate) fn from_core(comments: Vec<Comment>) -> *mut Self {
        let len = comments.len() as u32;
        let mut rows: Vec<FfiComment> = comments
            .into_iter()
            .map(|c| FfiComment {
                author: CString::new(c.author).unwrap().into_raw(),
                text: CString::new(c.text).unwrap().into_raw(),
            })
            .collect();

        let items = if rows.is_empty() {
            std::ptr::null_mut()
        } else {
            let ptr = rows.as_mut_ptr();
            std::mem::forget(rows);
            ptr
        };

        Box::into_raw(Box::new(FfiCommentList { items, len }))
    }
}
