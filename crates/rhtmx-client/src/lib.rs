//! # RHTMX Client
//!
//! Client-side navigation for pages served by RHTMX. The router hydrates
//! from the bootstrap globals embedded in the document, intercepts
//! same-origin link clicks, fetches the data payload of the target path and
//! re-renders without a full page load.
//!
//! Browser bindings (fetch, history, dynamic imports, DOM rendering) are
//! supplied through [`NavigationHost`], which keeps the state machine
//! testable off the browser.
//!
//! Routes are recompiled here with the same compiler the server uses, so a
//! path matches the same route on both sides. When they disagree anyway the
//! router falls back to a full navigation instead of rendering a broken
//! page.

mod error;
mod host;
mod link;
mod router;
mod table;

pub use error::NavigationError;
pub use host::{DataResponse, NavigationHost, View};
pub use link::{data_url, intercept_click, LinkClick};
pub use router::{ClientRouter, CurrentRoute, Navigation};
pub use table::{ClientRoute, ClientRouteTable};
