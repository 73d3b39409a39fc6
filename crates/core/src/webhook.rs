// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook targets configured under `notifications.webhooks`.
//!
//! Only resolves where build events should go; delivery is someone else's
//! job.

use crate::config::BuildConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookTargets {
    pub urls: Vec<String>,
    /// Also deliver `build:started`
    pub on_start: bool,
}

impl WebhookTargets {
    /// Read `notifications.webhooks`, which is a URL, a list of URLs, or
    /// `{urls: ..., on_start: bool}`.
    pub fn from_config(config: &BuildConfig) -> Self {
        let Some(webhooks) = config
            .get("notifications")
            .and_then(Value::as_object)
            .and_then(|notifications| notifications.get("webhooks"))
        else {
            return Self::default();
        };

        match webhooks {
            Value::Object(section) => Self {
                urls: section.get("urls").map(urls).unwrap_or_default(),
                on_start: section.get("on_start").and_then(Value::as_bool).unwrap_or(false),
            },
            other => Self { urls: urls(other), on_start: false },
        }
    }

    /// URLs that should receive the named build event.
    pub fn for_event(&self, event_name: &str) -> &[String] {
        match event_name {
            "build:finished" => &self.urls,
            "build:started" if self.on_start => &self.urls,
            _ => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

fn urls(value: &Value) -> Vec<String> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    items
        .into_iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
