use std::env;

use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct PanchangUrl(String);

impl AsRef<str> for PanchangUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PanchangUrl {
    pub fn new(base: impl Into<String>) -> Self {
        Self(base.into())
    }

    /// Creates a new PanchangUrl from the environment variable `PANCHANG_API_URL`.
    pub fn from_env() -> Self {
        Self(env::var("PANCHANG_API_URL").expect("PANCHANG_API_URL must be set in env"))
    }

    /// Append the given path to the URL.
    pub fn append_path(&self, path: &str) -> Self {
        let trimmed_url = self.0.trim_end_matches('/');
        let trimmed_path = path.trim_start_matches('/');
        Self(format!("{}/{}", trimmed_url, trimmed_path))
    }

    pub fn with_date(&self, date: &NaiveDate) -> Self {
        self.with_query("date", date.format("%Y-%m-%d"))
    }

    pub fn with_month(&self, month: u32, year: i32) -> Self {
        self.with_query("month", month).with_query("year", year)
    }

    pub fn with_coordinates(&self, latitude: f64, longitude: f64) -> Self {
        self.with_query("latitude", latitude)
            .with_query("longitude", longitude)
    }

    fn with_query(&self, key: &str, value: impl std::fmt::Display) -> Self {
        if self.0.contains('?') {
            Self(format!("{}&{}={}", self.0, key, value))
        } else {
            Self(format!("{}?{}={}", self.0, key, value))
        }
    }
}
