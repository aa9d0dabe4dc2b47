use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::order::{Order, OrderId};
use crate::errors::ToolError;
use crate::fixtures::FixtureStore;

pub const DEFAULT_CANCEL_WINDOW_SECS: i64 = 60 * 60;

/// How long after creation an order may still be cancelled. The bound is
/// inclusive: an order exactly `secs` old can still be cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CancellationWindow {
    secs: i64,
}

impl CancellationWindow {
    pub fn from_secs(secs: i64) -> Self {
        Self { secs }
    }

    pub fn secs(&self) -> i64 {
        self.secs
    }

    pub fn minutes(&self) -> i64 {
        self.secs / 60
    }

    /// Compares the full elapsed duration, sub-second part included.
    pub fn allows(&self, elapsed: TimeDelta) -> bool {
        TimeDelta::try_seconds(self.secs).map_or(true, |window| elapsed <= window)
    }
}

impl Default for CancellationWindow {
    fn default() -> Self {
        Self::from_secs(DEFAULT_CANCEL_WINDOW_SECS)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancellation {
    pub order_id: OrderId,
    pub cancelled: bool,
    pub reason: Option<String>,
    pub created_at: String,
    pub requested_at: String,
}

pub fn order_lookup(store: &FixtureStore, order_id: &str, email: &str) -> Option<Order> {
    store
        .orders()
        .iter()
        .find(|order| order.order_id.as_str() == order_id && order.matches_email(email))
        .cloned()
}

/// Applies the cancellation window to a stored order.
///
/// The request time is `now_iso` when given, otherwise `timestamp_iso`. The
/// order's own stored `created_at` is authoritative for the creation time.
pub fn order_cancel(
    store: &FixtureStore,
    window: CancellationWindow,
    order_id: &str,
    timestamp_iso: &str,
    now_iso: Option<&str>,
) -> Result<OrderCancellation, ToolError> {
    let order = store
        .find_order(&OrderId(order_id.to_string()))
        .ok_or_else(|| ToolError::UnknownOrder { order_id: order_id.to_string() })?;

    let created_at = parse_timestamp("created_at", &order.created_at)?;
    let requested_at = match now_iso {
        Some(now) => parse_timestamp("now", now)?,
        None => parse_timestamp("timestamp", timestamp_iso)?,
    };
    let cancelled = window.allows(requested_at - created_at);

    Ok(OrderCancellation {
        order_id: order.order_id.clone(),
        cancelled,
        reason: (!cancelled).then(|| format!(">{}_minute_window", window.minutes())),
        created_at: order.created_at.clone(),
        requested_at: format_timestamp(requested_at),
    })
}

/// Parses an ISO-8601 timestamp. A trailing `Z` or numeric offset is honoured;
/// a timestamp without any offset is read as UTC.
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, ToolError> {
    let trimmed = value.trim();
    match DateTime::parse_from_rfc3339(trimmed) {
        Ok(parsed) => Ok(parsed.with_timezone(&Utc)),
        Err(source) => NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| ToolError::InvalidTimestamp { field, value: value.to_string(), source }),
    }
}

pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
