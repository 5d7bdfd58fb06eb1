//! Constant tables and request payload types.
//!
//! Numeric codes serialize as integers and type tags as the lowercase strings
//! the API expects. Payloads that the API treats as free-form objects are
//! passed as `serde_json::Value` or any `Serialize` type instead.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::builder::QueryParams;

/// Largest page size the API documents. Not enforced client-side.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Size of a `FieldList` batch accepted by `setFieldList`.
pub const MAX_FIELD_LIST: usize = 20;

macro_rules! int_code {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident = $code:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "u8", into = "u8")]
        pub enum $name {
            $($(#[$vmeta])* $variant = $code),*
        }

        impl $name {
            pub fn code(self) -> u8 {
                self as u8
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value.code()
            }
        }

        impl TryFrom<u8> for $name {
            type Error = String;

            fn try_from(code: u8) -> Result<Self, Self::Error> {
                match code {
                    $($code => Ok($name::$variant),)*
                    other => Err(format!("unknown {} code {other}", stringify!($name))),
                }
            }
        }
    };
}

int_code! {
    /// E-mail deliverability state of a contact.
    ContactStatus {
        Unknown = 0,
        /// Opt-in sent, waiting for confirmation.
        Pending = 1,
        /// Default for contacts created through the API.
        Verified = 2,
        /// Soft bounce.
        Blocked = 3,
        /// Soft spam report.
        Dropped = 4,
        /// Hard bounce.
        Bounced = 5,
        /// Hard spam report.
        Suspended = 6,
    }
}

int_code! {
    /// Shape of the tag list response.
    #[derive(Default)]
    TagListMode {
        #[default]
        Default = 0,
        Ids = 1,
        Simple = 2,
    }
}

int_code! {
    LockMode {
        Default = 0,
        Ignore = 1,
        Force = 2,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GlobalFieldType {
    Text,
    Datetime,
    /// Decimal(20,6).
    Numeric,
    /// Written values are added to the stored value.
    NumericSum,
    // Complex types below are read-only through the API.
    Textarea,
    Radio,
    Select,
    Checkbox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GlobalValueType {
    Text,
    Numeric,
    NumericSum,
    Datetime,
}

/// Page selection for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Zero-based page index.
    pub num: u32,
    pub size: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self { num: 0, size: 50 }
    }
}

impl Page {
    pub fn new(num: u32, size: u32) -> Self {
        Self { num, size }
    }

    pub(crate) fn append_to(self, query: &mut QueryParams) {
        if self.size > MAX_PAGE_SIZE {
            warn!(page_size = self.size, max = MAX_PAGE_SIZE, "page size above documented maximum");
        }
        query.push("pageNum", self.num).push("pageSize", self.size);
    }
}

/// One entry of a `setFieldList` batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValueEntry {
    pub global_field_id: u64,
    pub value: Value,
    /// Fire automations listening for changes of this field.
    pub do_triggers: bool,
    /// When false only empty values are replaced.
    pub overwrite: bool,
}

impl FieldValueEntry {
    pub fn new(global_field_id: u64, value: impl Into<Value>) -> Self {
        Self {
            global_field_id,
            value: value.into(),
            do_triggers: true,
            overwrite: true,
        }
    }
}

/// Bounded batch of field values for a single contact.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldList(Vec<FieldValueEntry>);

impl FieldList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Returns `false`, leaving the list unchanged, once
    /// `MAX_FIELD_LIST` entries are present.
    pub fn push(&mut self, entry: FieldValueEntry) -> bool {
        if self.0.len() >= MAX_FIELD_LIST {
            return false;
        }
        self.0.push(entry);
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[FieldValueEntry] {
        &self.0
    }
}

/// A global value ("storage" entry) definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalValue {
    pub name: String,
    pub type_id: GlobalValueType,
    /// Unique internal key.
    pub key: String,
    pub value: String,
}
