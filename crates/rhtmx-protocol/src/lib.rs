//! # RHTMX Protocol
//!
//! Types that cross the server/browser boundary. The server produces them,
//! the client router consumes them, and both sides link this crate so the
//! shapes cannot drift.
//!
//! - [`DataPayload`]: body of a data request (`?_data` or `x-rhtmx-data`)
//! - [`BootstrapPayload`]: initial page data assigned to `window.__RHTMX_DATA__`
//! - [`RouterData`]: client route list assigned to `window.__RHTMX_ROUTER__`
//!
//! ## Example
//!
//! ```
//! use rhtmx_protocol::{DataPayload, PagePayload};
//! use serde_json::json;
//!
//! let payload = DataPayload::Page(PagePayload::new(json!({"id": "42"})));
//! assert_eq!(
//!     serde_json::to_string(&payload).unwrap(),
//!     r#"{"props":{"id":"42"},"metadata":null,"theme":null}"#
//! );
//! ```

mod bootstrap;
mod escape;
mod metadata;
mod payload;

pub use bootstrap::{BootstrapPayload, ClientRouteEntry, RouterData};
pub use escape::escape_json_for_script;
pub use metadata::{MetaTag, Metadata, OpenGraph, TwitterCard};
pub use payload::{DataPayload, PagePayload, Redirect};

/// Global binding carrying the initial [`BootstrapPayload`]
pub const DATA_GLOBAL: &str = "__RHTMX_DATA__";

/// Global binding carrying the [`RouterData`]
pub const ROUTER_GLOBAL: &str = "__RHTMX_ROUTER__";

/// Default query flag marking a data request
pub const DEFAULT_DATA_QUERY: &str = "_data";

/// Default header marking a data request
pub const DEFAULT_DATA_HEADER: &str = "x-rhtmx-data";
