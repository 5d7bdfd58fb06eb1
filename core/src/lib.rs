//! Blocking client for the 4leads marketing API.
//!
//! # Overview
//! Every call funnels through `ApiClient::request`: the `RequestBuilder`
//! assembles the URL, headers and JSON body, a `Transport` performs the
//! exchange, and the raw reply is normalised into a `Response`. Resource
//! handles (`client.tags()`, `client.contacts()`, ...) are thin wrappers
//! over a declarative operation table.
//!
//! # Design
//! - HTTP status codes are data, not errors. `ApiError` covers only
//!   configuration, transport, serialization and response-parse failures.
//! - Bodies are `serde_json::Value` (with `preserve_order`) so free-form API
//!   objects round-trip without per-endpoint schemas.
//! - The transport is a trait; `UreqTransport` is the default and tests use
//!   recording doubles or the `mock-server` crate.
//!
//! ```no_run
//! use fourleads_core::{ApiClient, ClientOptions, Page, TagListMode};
//!
//! let client = ApiClient::new("my-api-key", ClientOptions::default())?;
//! if client.validate_key()? {
//!     let tags = client.tags().list(Page::default(), "", TagListMode::Default)?;
//!     println!("{} {:?}", tags.status_code, tags.json());
//! }
//! # Ok::<(), fourleads_core::ApiError>(())
//! ```

pub mod builder;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod options;
pub mod transport;
pub mod types;

pub use builder::{QueryParams, QueryValue, RequestBuilder};
pub use client::ApiClient;
pub use endpoints::{ContactQuery, Operation, OPERATIONS, SNIPPET_PAGE_SIZE};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, RawResponse, Response, ResponseBody, TOO_MANY_REQUESTS};
pub use options::{ClientOptions, OptionKey, OptionValue, TransportOptions};
pub use transport::{Transport, UreqTransport};
pub use types::{
    ContactStatus, FieldList, FieldValueEntry, GlobalFieldType, GlobalValue, GlobalValueType, LockMode, Page,
    TagListMode,
};
