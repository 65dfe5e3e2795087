//! Remote data gateway for the Digitraffic railway API.
//!
//! Every request carries the fixed client identification header. Failures are
//! never fatal here: callers get a `FetchError` and decide whether to abort
//! the cycle, skip one train, or substitute sentinel values.

use crate::wire_formats::{
    OperatorEntry, RestrictionEntry, StationEntry, TrainComposition, TrainDetail,
    TrainLocationEntry,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

pub const RATA_API_BASE: &str = "https://rata.digitraffic.fi/api/v1";
pub const DIGITRAFFIC_USER_HEADER: &str = "Digitraffic-User";
pub const DIGITRAFFIC_USER: &str = "Evolinox/Railtrack";

/// Compositions are keyed by service date upstream. The poller pins a fixed
/// reference date rather than computing one per train.
pub const COMPOSITION_REFERENCE_DATE: &str = "2024-12-01";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure taxonomy for upstream calls.
///
/// `Transport` covers non-2xx statuses and network level errors (status is
/// then `None`). `Empty` covers 2xx responses whose payload carries no usable
/// record, including payloads that fail strict decoding.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("upstream transport failure (http status {status:?})")]
    Transport { status: Option<u16> },
    #[error("upstream returned no matching record")]
    Empty,
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> FetchError {
        FetchError::Transport {
            status: error.status().map(|status| status.as_u16()),
        }
    }
}

/// One async method per upstream endpoint, so the reconciliation engine can
/// run against an in-memory fake in tests.
#[allow(async_fn_in_trait)]
pub trait RailApiGateway {
    async fn fetch_train_positions(&self) -> Result<Vec<TrainLocationEntry>, FetchError>;
    /// Detail for one train. An empty array upstream is `FetchError::Empty`.
    async fn fetch_train_detail(&self, train_number: u32) -> Result<TrainDetail, FetchError>;
    async fn fetch_composition(&self, train_number: u32) -> Result<TrainComposition, FetchError>;
    async fn fetch_stations(&self) -> Result<Vec<StationEntry>, FetchError>;
    async fn fetch_operators(&self) -> Result<Vec<OperatorEntry>, FetchError>;
    /// Track work restrictions, filtered upstream to the active state.
    async fn fetch_restrictions(&self) -> Result<Vec<RestrictionEntry>, FetchError>;
}

pub struct DigitrafficClient {
    client: reqwest::Client,
    base_url: String,
}

impl DigitrafficClient {
    pub fn new() -> Result<DigitrafficClient, reqwest::Error> {
        DigitrafficClient::with_base_url(RATA_API_BASE.to_string())
    }

    pub fn with_base_url(base_url: String) -> Result<DigitrafficClient, reqwest::Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            DIGITRAFFIC_USER_HEADER,
            reqwest::header::HeaderValue::from_static(DIGITRAFFIC_USER),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(DigitrafficClient { client, base_url })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self.client.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport {
                status: Some(status.as_u16()),
            });
        }

        // A 2xx body that does not decode into the expected shape counts as
        // an empty result, not a transport failure.
        response.json::<T>().await.map_err(|_| FetchError::Empty)
    }
}

impl RailApiGateway for DigitrafficClient {
    async fn fetch_train_positions(&self) -> Result<Vec<TrainLocationEntry>, FetchError> {
        self.get_json("/train-locations/latest/", &[]).await
    }

    async fn fetch_train_detail(&self, train_number: u32) -> Result<TrainDetail, FetchError> {
        let details: Vec<TrainDetail> = self
            .get_json(&format!("/trains/latest/{}", train_number), &[])
            .await?;

        details.into_iter().next().ok_or(FetchError::Empty)
    }

    async fn fetch_composition(&self, train_number: u32) -> Result<TrainComposition, FetchError> {
        self.get_json(
            &format!(
                "/compositions/{}/{}",
                COMPOSITION_REFERENCE_DATE, train_number
            ),
            &[],
        )
        .await
    }

    async fn fetch_stations(&self) -> Result<Vec<StationEntry>, FetchError> {
        self.get_json("/metadata/stations", &[]).await
    }

    async fn fetch_operators(&self) -> Result<Vec<OperatorEntry>, FetchError> {
        self.get_json("/metadata/operators", &[]).await
    }

    async fn fetch_restrictions(&self) -> Result<Vec<RestrictionEntry>, FetchError> {
        self.get_json("/trafficrestrictions", &[("state", "ACTIVE")])
            .await
    }
}
