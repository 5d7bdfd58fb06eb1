//! Declarative operation table and per-resource handles.
//!
//! # Design
//! Every remote operation is an `Operation` constant: a name, a method and a
//! path template whose `{}` placeholders are filled, in order, with
//! percent-encoded identifiers. Resource handles borrow the client and only
//! assemble query parameters and bodies; all I/O goes through
//! `ApiClient::request`. Paths are relative to the client's version prefix,
//! so supporting another API version means another table, not another
//! client type.

mod campaigns;
mod contacts;
mod global_fields;
mod integrations;
mod opt_ins;
mod storage;
mod tags;

pub use campaigns::{Campaigns, SNIPPET_PAGE_SIZE};
pub use contacts::{ContactQuery, Contacts};
pub use global_fields::GlobalFields;
pub use integrations::Integrations;
pub use opt_ins::{OptInCases, OptIns};
pub use storage::Storage;
pub use tags::Tags;

use crate::builder::{encode_segment, QueryParams};
use crate::http::HttpMethod;
use crate::types::Page;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
}

impl Operation {
    pub const fn new(name: &'static str, method: HttpMethod, path: &'static str) -> Self {
        Self { name, method, path }
    }

    /// Fill `{}` placeholders with encoded segments. Missing segments leave
    /// the placeholder empty.
    pub fn render(&self, segments: &[&str]) -> String {
        let mut out = String::with_capacity(self.path.len());
        let mut segments = segments.iter();
        let mut rest = self.path;
        while let Some(pos) = rest.find("{}") {
            out.push_str(&rest[..pos]);
            if let Some(segment) = segments.next() {
                out.push_str(&encode_segment(segment));
            }
            rest = &rest[pos + 2..];
        }
        out.push_str(rest);
        out
    }
}

pub const PING: Operation = Operation::new("ping", HttpMethod::Get, "/ping");

/// Every operation the client can issue.
pub const OPERATIONS: &[Operation] = &[
    PING,
    contacts::LIST,
    contacts::GET,
    contacts::FIELDS,
    contacts::TAGS,
    contacts::COMPARE_TAGS,
    contacts::CREATE,
    contacts::UPDATE,
    contacts::DELETE,
    contacts::ADD_TAG,
    contacts::REMOVE_TAG,
    contacts::ADD_TAG_LIST,
    contacts::REMOVE_TAG_LIST,
    tags::LIST,
    tags::GET,
    tags::CREATE,
    tags::UPDATE,
    tags::DELETE,
    campaigns::LIST,
    campaigns::GET,
    campaigns::SNIPPETS,
    campaigns::START,
    campaigns::STOP,
    opt_ins::LIST,
    opt_ins::GET,
    opt_ins::SEND,
    opt_ins::CASE_LIST,
    opt_ins::CASE_GET,
    opt_ins::CASE_GRANT,
    opt_ins::CASE_REVOKE,
    global_fields::LIST,
    global_fields::GET,
    global_fields::CREATE,
    global_fields::UPDATE,
    global_fields::DELETE,
    global_fields::GET_VALUE,
    global_fields::SET_VALUE,
    global_fields::SET_FIELD_LIST,
    storage::LIST,
    storage::GET,
    storage::CREATE,
    storage::UPDATE,
    storage::DELETE,
    storage::VALUES,
    storage::VALUE,
    storage::SET_VALUE,
    integrations::TRIGGER_EVENTS,
    integrations::STOP_AUTOMATION,
    integrations::ADD_SYNC_TAGS,
    integrations::REMOVE_SYNC_TAGS,
    integrations::FUNCTION_LIST,
];

/// Look up an operation by name.
pub fn operation(name: &str) -> Option<&'static Operation> {
    OPERATIONS.iter().find(|op| op.name == name)
}

/// `pageNum`, `pageSize` and an always-present `searchString`.
pub(crate) fn list_query(page: Page, search: &str) -> QueryParams {
    let mut query = QueryParams::new();
    page.append_to(&mut query);
    query.push("searchString", search);
    query
}
