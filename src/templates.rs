//! Tera setup and the `timeago` and `truncate_words` filters used by the recipe pages.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tera::Tera;

use crate::config::{
    ThemeConfig, DEFAULT_TRUNCATE_WORDS, SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE,
    SECONDS_PER_MONTH, SECONDS_PER_YEAR,
};
use crate::error::AppError;

/// Initialize the Tera template engine from the theme's template directory
pub fn init_templates(theme: &ThemeConfig) -> Result<Tera, AppError> {
    let mut tera = Tera::new(&theme.template_glob())?;

    tera.register_filter("truncate_words", truncate_words_filter);
    tera.register_filter("timeago", timeago_filter);

    Ok(tera)
}

/// Truncate text to a certain number of words
fn truncate_words_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("truncate_words filter expects a string"))?;

    let count = args
        .get("count")
        .and_then(|v| v.as_u64())
        .unwrap_or(DEFAULT_TRUNCATE_WORDS as u64) as usize;

    let words: Vec<&str> = s.split_whitespace().collect();
    if words.len() <= count {
        Ok(tera::Value::String(s.to_string()))
    } else {
        Ok(tera::Value::String(format!("{}...", words[..count].join(" "))))
    }
}

/// Convert an RFC 3339 timestamp to a relative time (e.g., "2 hours ago")
fn timeago_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let date_str = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("timeago filter expects a string"))?;

    match DateTime::parse_from_rfc3339(date_str) {
        Ok(date) => Ok(tera::Value::String(relative_time(
            date.with_timezone(&Utc),
            Utc::now(),
        ))),
        // Unparseable input is shown as-is
        Err(_) => Ok(tera::Value::String(date_str.to_string())),
    }
}

fn plural(amount: i64, unit: &str) -> String {
    if amount == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", amount, unit)
    }
}

fn relative_time(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = now.signed_duration_since(date).num_seconds();

    if seconds < 0 {
        "in the future".to_string()
    } else if seconds < SECONDS_PER_MINUTE {
        "just now".to_string()
    } else if seconds < SECONDS_PER_HOUR {
        plural(seconds / SECONDS_PER_MINUTE, "minute")
    } else if seconds < SECONDS_PER_DAY {
        plural(seconds / SECONDS_PER_HOUR, "hour")
    } else if seconds < SECONDS_PER_MONTH {
        plural(seconds / SECONDS_PER_DAY, "day")
    } else if seconds < SECONDS_PER_YEAR {
        plural(seconds / SECONDS_PER_MONTH, "month")
    } else {
        plural(seconds / SECONDS_PER_YEAR, "year")
    }
}
