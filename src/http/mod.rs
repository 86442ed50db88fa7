//! HTTP protocol layer module
//!
//! Response builders, cache validation and content types shared by the
//! static asset side of the router.

pub mod cache;
pub mod mime;
pub mod response;

pub use response::{
    build_304_response, build_400_response, build_405_response, build_413_response,
    build_500_response, build_asset_405_response, build_options_response,
};
