//! HTTP protocol layer module
//!
//! Response builders and request-side helpers, independent of the page logic.

pub mod request;
pub mod response;

// Re-export commonly used types
pub use request::PageRequest;
pub use response::{
    build_400_response, build_404_response, build_413_response,
    build_500_response, build_html_response, build_redirect_response,
};
