//! Greeter record.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};

use super::entity::CacheEntity;
use crate::domain::errors::{DomainError, DomainResult};

/// Format of `create_datetime` / `update_datetime`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Status of a greeter. The store keeps the raw integer.
pub const STATUS_INACTIVE: i32 = 0;
pub const STATUS_ACTIVE: i32 = 1;

/// A greeter as persisted in `tbl_greeter`.
///
/// `Greeter::default()` is the "not found" sentinel; a persisted greeter
/// always has a nonzero id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeter {
    pub id: i32,
    pub name: String,
    pub view_num: i32,
    pub status: i32,
    /// Creation time in epoch milliseconds.
    pub create_time: i64,
    pub create_datetime: String,
    pub update_datetime: String,
}

impl Greeter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub const fn with_status(mut self, status: i32) -> Self {
        self.status = status;
        self
    }

    /// Set `create_time` to the current epoch milliseconds.
    #[must_use]
    pub fn stamped_now(mut self) -> Self {
        self.create_time = Utc::now().timestamp_millis();
        self
    }
}

/// Current local time in [`DATETIME_FORMAT`].
pub fn now_datetime() -> String {
    Local::now().format(DATETIME_FORMAT).to_string()
}

fn parse_field<T: FromStr + Default>(fields: &HashMap<String, String>, name: &str) -> DomainResult<T> {
    fields.get(name).map_or_else(
        || Ok(T::default()),
        |raw| {
            raw.parse::<T>().map_err(|_| {
                DomainError::SerializationError(format!("Invalid cached field {name}: {raw}"))
            })
        },
    )
}

impl CacheEntity for Greeter {
    type Id = i32;

    const CACHE_PREFIX: &'static str = "greeter";
    const STATUSES: &'static [i32] = &[STATUS_INACTIVE, STATUS_ACTIVE];
    const COUNTER_COLUMNS: &'static [&'static str] = &["view_num"];

    fn id(&self) -> i32 {
        self.id
    }

    fn status(&self) -> i32 {
        self.status
    }

    fn to_cache_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("id", self.id.to_string())];
        if !self.name.is_empty() {
            fields.push(("name", self.name.clone()));
        }
        if self.view_num != 0 {
            fields.push(("view_num", self.view_num.to_string()));
        }
        if self.status != 0 {
            fields.push(("status", self.status.to_string()));
        }
        if self.create_time != 0 {
            fields.push(("create_time", self.create_time.to_string()));
        }
        if !self.create_datetime.is_empty() {
            fields.push(("create_datetime", self.create_datetime.clone()));
        }
        if !self.update_datetime.is_empty() {
            fields.push(("update_datetime", self.update_datetime.clone()));
        }
        fields
    }

    fn from_cache_fields(fields: &HashMap<String, String>) -> DomainResult<Self> {
        Ok(Self {
            id: parse_field(fields, "id")?,
            name: fields.get("name").cloned().unwrap_or_default(),
            view_num: parse_field(fields, "view_num")?,
            status: parse_field(fields, "status")?,
            create_time: parse_field(fields, "create_time")?,
            create_datetime: fields.get("create_datetime").cloned().unwrap_or_default(),
            update_datetime: fields.get("update_datetime").cloned().unwrap_or_default(),
        })
    }
}
