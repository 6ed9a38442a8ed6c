//! Platform capabilities.
//!
//! Time, URL/credential encoding and environment lookup go through these traits
//! so a deployment target can swap the implementation when building a client.

use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Encoding used when talking to the authorization server.
pub trait UrlCodec: Send + Sync {
    /// Percent-encodes a single query component.
    fn encode_component(&self, value: &str) -> String;

    /// Value for an HTTP Basic `Authorization` header.
    fn basic_credentials(&self, client_id: &str, client_secret: &str) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StandardCodec;

impl UrlCodec for StandardCodec {
    fn encode_component(&self, value: &str) -> String {
        urlencoding::encode(value).into_owned()
    }

    fn basic_credentials(&self, client_id: &str, client_secret: &str) -> String {
        format!(
            "Basic {}",
            STANDARD.encode(format!("{client_id}:{client_secret}"))
        )
    }
}

/// Read access to configuration variables.
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

/// In-memory environment, mostly for tests.
#[derive(Debug, Default, Clone)]
pub struct MapEnvironment(pub HashMap<String, String>);

impl MapEnvironment {
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }
}

impl Environment for MapEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), start + Duration::seconds(90));
    }

    #[test]
    fn test_basic_credentials() {
        let codec = StandardCodec;
        assert_eq!(
            codec.basic_credentials("id", "secret"),
            "Basic aWQ6c2VjcmV0"
        );
        assert_eq!(codec.encode_component("a b&c"), "a%20b%26c");
    }
}
