use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::BackendConfig;

#[derive(Debug)]
pub enum AvailabilityError {
    RequestError(String),
    ApiError(String),
}

impl std::fmt::Display for AvailabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AvailabilityError::RequestError(err) => write!(f, "Request error: {}", err),
            AvailabilityError::ApiError(err) => write!(f, "API error: {}", err),
        }
    }
}

impl std::error::Error for AvailabilityError {}

/// Read-only, idempotent capacity queries. The numbers are advisory
/// for UX; the hosted backend re-checks atomically when the booking is
/// actually created, so staleness between calls is acceptable.
#[async_trait]
pub trait AvailabilityClient: Send + Sync {
    /// Current bookable capacity for an exact (tour, date, time).
    /// Zero means fully booked.
    async fn remaining_slots(
        &self,
        tour_id: &str,
        date: NaiveDate,
        time: &str,
    ) -> Result<u32, AvailabilityError>;

    /// The subset of candidate dates with zero remaining capacity
    /// across all their time slots, in one round trip.
    async fn fully_booked_dates(
        &self,
        tour_id: &str,
        dates: &[NaiveDate],
    ) -> Result<HashSet<NaiveDate>, AvailabilityError>;
}

#[derive(Debug, Serialize)]
struct RemainingSlotsRequest<'a> {
    tour_id: &'a str,
    date: NaiveDate,
    time: &'a str,
}

#[derive(Debug, Deserialize)]
struct RemainingSlotsResponse {
    remaining_slots: u32,
}

#[derive(Debug, Serialize)]
struct FullyBookedRequest<'a> {
    tour_id: &'a str,
    dates: &'a [NaiveDate],
}

#[derive(Debug, Deserialize)]
struct FullyBookedResponse {
    fully_booked: Vec<NaiveDate>,
}

pub struct HttpAvailabilityClient {
    config: BackendConfig,
    client: reqwest::Client,
}

impl HttpAvailabilityClient {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, AvailabilityError> {
        let response = self
            .client
            .post(self.config.endpoint(path))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| AvailabilityError::RequestError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AvailabilityError::ApiError(format!(
                "Status: {}, Body: {}",
                status, body
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AvailabilityError::ApiError(e.to_string()))
    }
}

#[async_trait]
impl AvailabilityClient for HttpAvailabilityClient {
    async fn remaining_slots(
        &self,
        tour_id: &str,
        date: NaiveDate,
        time: &str,
    ) -> Result<u32, AvailabilityError> {
        let request = RemainingSlotsRequest { tour_id, date, time };
        let response: RemainingSlotsResponse =
            self.post_json("rpc/remaining-slots", &request).await?;
        Ok(response.remaining_slots)
    }

    async fn fully_booked_dates(
        &self,
        tour_id: &str,
        dates: &[NaiveDate],
    ) -> Result<HashSet<NaiveDate>, AvailabilityError> {
        if dates.is_empty() {
            return Ok(HashSet::new());
        }

        let request = FullyBookedRequest { tour_id, dates };
        let response: FullyBookedResponse =
            self.post_json("rpc/fully-booked-dates", &request).await?;
        Ok(response.fully_booked.into_iter().collect())
    }
}
