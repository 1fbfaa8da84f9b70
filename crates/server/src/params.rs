//! Query-string values shared by the dashboard and export endpoints.
//!
//! Filters accept the literal `all` as "no filter".

use chrono::{Datelike, Utc};
use uuid::Uuid;

use crate::ServerError;

fn specified(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

pub(crate) fn wallet_filter(value: Option<&str>) -> Result<Option<Uuid>, ServerError> {
    specified(value)
        .map(|v| {
            Uuid::parse_str(v).map_err(|_| ServerError::Generic(format!("invalid walletId: {v}")))
        })
        .transpose()
}

pub(crate) fn month_filter(value: Option<&str>) -> Result<Option<u32>, ServerError> {
    specified(value)
        .map(|v| {
            v.parse::<u32>()
                .ok()
                .filter(|m| (1..=12).contains(m))
                .ok_or_else(|| ServerError::Generic(format!("invalid month: {v}")))
        })
        .transpose()
}

pub(crate) fn year_filter(value: Option<&str>) -> Result<Option<i32>, ServerError> {
    specified(value)
        .map(|v| {
            v.parse::<i32>()
                .map_err(|_| ServerError::Generic(format!("invalid year: {v}")))
        })
        .transpose()
}

pub(crate) fn current_year() -> i32 {
    Utc::now().year()
}
