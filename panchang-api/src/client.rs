use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::domain::{CalendarDay, RawCalendarDay, TimeWindow, WindowsResponse};
use crate::PanchangUrl;

pub struct Client {
    base_url: PanchangUrl,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: PanchangUrl) -> Self {
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, url: impl AsRef<str>) -> Result<T, FetchError> {
        let resp = self
            .http
            .get(url.as_ref())
            .send()
            .await
            .map_err(|e| FetchError::ResponseError(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let resp_data = resp.json::<T>().await.map_err(|e| {
            FetchError::ParsingError(format!("Failed to parse response as JSON: {}", e))
        })?;

        Ok(resp_data)
    }

    /// Fetch one month of day records. The backend returns the days bare,
    /// in date order, with no leading-weekday padding.
    #[tracing::instrument(skip(self))]
    pub async fn month_grid(
        &self,
        month: u32,
        year: i32,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<CalendarDay>, FetchError> {
        let url = self
            .base_url
            .append_path("/panchang/calendar")
            .with_month(month, year)
            .with_coordinates(latitude, longitude);

        let raw_days: Vec<RawCalendarDay> = self.fetch(url).await?;
        Ok(raw_days.into_iter().map(CalendarDay::from).collect())
    }

    /// Fetch the full panchang detail for a single date.
    #[tracing::instrument(skip(self))]
    pub async fn day_detail(
        &self,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
    ) -> Result<CalendarDay, FetchError> {
        let url = self
            .base_url
            .append_path("/panchang/day")
            .with_date(&date)
            .with_coordinates(latitude, longitude);

        let raw: RawCalendarDay = self.fetch(url).await?;
        Ok(CalendarDay::from(raw))
    }

    /// Fetch the choghadiya window list for a date, normalized to a flat
    /// list regardless of which of the three wire shapes came back.
    #[tracing::instrument(skip(self))]
    pub async fn windows(
        &self,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<TimeWindow>, FetchError> {
        let url = self
            .base_url
            .append_path("/muhurat")
            .with_date(&date)
            .with_coordinates(latitude, longitude);

        let response: WindowsResponse = self.fetch(url).await?;
        Ok(response.into_windows())
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Unexpected status code: {0}")]
    Status(u16),
    #[error("ResponseError: {0}")]
    ResponseError(String),
    #[error("ParsingError: {0}")]
    ParsingError(String),
    #[error("Other: {0}")]
    Other(String),
}
