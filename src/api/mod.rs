pub mod api_structs;
pub mod config;

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use rand::Rng;
use reqwest::{
    header::{
        HeaderMap, HeaderValue, InvalidHeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE, ORIGIN, REFERER,
        USER_AGENT
    },
    Client, ClientBuilder
};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn, Instrument, Span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::{
    api::{
        api_structs::{CountryDTO, CountryUser, Page, RankingEntry, TrpcResponse, UserLite},
        config::ApiConfig
    },
    model::{
        constants::DETAIL_BATCH_SIZE,
        ranking::{build_country_players, select_country_entries},
        structures::country::{CountryInfo, CountrySnapshot, CountrySummary},
        week::current_week
    },
    utils::progress_utils::progress_span
};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:137.0) Gecko/20100101 Firefox/137.0";
const APP_ORIGIN: &str = "https://app.warera.io";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to encode request input: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Bearer token is not a valid header value: {0}")]
    InvalidToken(#[from] InvalidHeaderValue),

    #[error("Country '{0}' not found")]
    CountryNotFound(String),

    #[error("Invalid country data for '{0}': missing id")]
    MissingCountryId(String),

    #[error("Procedure {procedure} returned an error: {message}")]
    Procedure { procedure: String, message: String },

    #[error("Could not fetch the global ranking")]
    EmptyRanking
}

/// Comma-joined procedure path used to batch `n` calls of the same procedure.
pub fn batched_procedure(procedure: &str, n: usize) -> String {
    vec![procedure; n].join(",")
}

/// Batch input for `user.getUserLite`: `{"0": {"userId": ..}, "1": ..}`
pub fn user_lite_input(user_ids: &[String]) -> Value {
    let map: Map<String, Value> = user_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (i.to_string(), json!({ "userId": id })))
        .collect();

    Value::Object(map)
}

/// Single-call batch input, with the pagination cursor when there is one.
fn paged_input(base: &Value, cursor: Option<&Value>) -> Value {
    let mut input = base.clone();
    if let (Some(cursor), Value::Object(map)) = (cursor, &mut input) {
        map.insert("cursor".to_string(), cursor.clone());
    }

    json!({ "0": input })
}

fn default_headers(token: Option<&str>) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(REFERER, HeaderValue::from_static("https://app.warera.io/"));
    headers.insert(ORIGIN, HeaderValue::from_static(APP_ORIGIN));

    if let Some(token) = token {
        let mut value = HeaderValue::from_str(token)?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}

/// Client for the public WarEra API
pub struct WarEraClient {
    client: Client,
    config: ApiConfig
}

impl WarEraClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = ClientBuilder::new()
            .default_headers(default_headers(config.bearer_token.as_deref())?)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    /// Random pause before each tRPC call to keep the request rate low
    async fn pause(&self) {
        let (min, max) = (self.config.min_delay, self.config.max_delay);
        let delay = if max > min {
            rand::rng().random_range(min..=max)
        } else {
            min
        };

        if !delay.is_zero() {
            debug!("Waiting {:?} before next request", delay);
            tokio::time::sleep(delay).await;
        }
    }

    /// Performs a batched tRPC GET and returns every element of the batch response
    async fn trpc<T: DeserializeOwned>(&self, procedure: &str, input: &Value) -> Result<Vec<TrpcResponse<T>>, ApiError> {
        self.pause().await;

        let input = serde_json::to_string(input)?;
        let response = self
            .client
            .get(self.config.trpc_url(procedure))
            .query(&[("batch", "1"), ("input", input.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response)
    }

    /// tRPC call expecting exactly one successful result
    async fn trpc_single<T: DeserializeOwned>(&self, procedure: &str, input: &Value) -> Result<Option<T>, ApiError> {
        let response = self.trpc::<T>(procedure, input).await?;

        match response.into_iter().next() {
            Some(TrpcResponse { result: Some(result), .. }) => Ok(Some(result.data)),
            Some(TrpcResponse { error: Some(error), .. }) => Err(ApiError::Procedure {
                procedure: procedure.to_string(),
                message: error.to_string()
            }),
            _ => Ok(None)
        }
    }

    /// Follows `nextCursor` until a page is empty or has no cursor
    async fn paginate<T: DeserializeOwned>(&self, procedure: &str, base_input: Value) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut cursor: Option<Value> = None;

        loop {
            let input = paged_input(&base_input, cursor.as_ref());
            let Some(page) = self.trpc_single::<Page<T>>(procedure, &input).await? else {
                break;
            };

            if page.items.is_empty() {
                break;
            }

            items.extend(page.items);
            debug!("{}: got {} items so far", procedure, items.len());

            match page.next_cursor {
                Some(next) if !next.is_null() && Some(&next) != cursor.as_ref() => cursor = Some(next),
                _ => break
            }
        }

        Ok(items)
    }

    /// Every country with its weekly damage and active population
    pub async fn get_countries(&self) -> Result<Vec<CountrySummary>, ApiError> {
        Ok(self
            .fetch_country_dtos()
            .await?
            .into_iter()
            .map(CountrySummary::from)
            .collect())
    }

    async fn fetch_country_dtos(&self) -> Result<Vec<CountryDTO>, ApiError> {
        let countries = self
            .client
            .get(self.config.countries_url())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(countries)
    }

    async fn find_country(&self, name: &str) -> Result<CountryDTO, ApiError> {
        let country = self
            .fetch_country_dtos()
            .await?
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ApiError::CountryNotFound(name.to_string()))?;

        info!("Found country: {}", country.name);
        Ok(country)
    }

    /// Looks a country up by name, ignoring case
    pub async fn get_country(&self, name: &str) -> Result<CountrySummary, ApiError> {
        Ok(self.find_country(name).await?.into())
    }

    /// The complete weekly damage ranking, highest first
    pub async fn get_global_ranking(&self) -> Result<Vec<RankingEntry>, ApiError> {
        info!("Fetching global ranking...");
        let mut ranking: Vec<RankingEntry> = self
            .paginate("ranking.getRanking", json!({ "rankingType": "weeklyUserDamages" }))
            .await?;

        ranking.sort_by(|a, b| b.value.total_cmp(&a.value));
        info!("Complete ranking: {} users", ranking.len());

        Ok(ranking)
    }

    pub async fn get_users_by_country(&self, country_id: &str) -> Result<Vec<CountryUser>, ApiError> {
        info!("Fetching country users...");
        let users: Vec<CountryUser> = self
            .paginate(
                "user.getUsersByCountry",
                json!({ "countryId": country_id, "direction": "forward" })
            )
            .await?;

        info!("Found {} users from country", users.len());
        Ok(users)
    }

    /// Details of the given users in one batched call. Users the API fails to return are skipped.
    pub async fn get_users_lite(&self, user_ids: &[String]) -> Result<Vec<UserLite>, ApiError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let procedure = batched_procedure("user.getUserLite", user_ids.len());
        let response = self
            .trpc::<UserLite>(&procedure, &user_lite_input(user_ids))
            .await?;

        let mut users = Vec::with_capacity(response.len());
        for (i, item) in response.into_iter().enumerate() {
            match item.result {
                Some(result) => users.push(result.data),
                None => warn!(
                    "No details returned for user {}",
                    user_ids.get(i).map(String::as_str).unwrap_or("?")
                )
            }
        }

        Ok(users)
    }

    /// Fetches everything needed to rank the players of one country.
    ///
    /// 1. Look the country up by name.
    /// 2. Fetch the global weekly damage ranking.
    /// 3. Keep the entries belonging to the country's users.
    /// 4. Fetch user details in batches and build the ranked player list.
    pub async fn fetch_country_snapshot(&self, country_name: &str) -> Result<CountrySnapshot, ApiError> {
        info!("Fetching data for {}", country_name);

        let country = self.find_country(country_name).await?;
        let country_id = country
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::MissingCountryId(country_name.to_string()))?;

        let ranking = self.get_global_ranking().await?;
        if ranking.is_empty() {
            return Err(ApiError::EmptyRanking);
        }

        let country_user_ids: HashSet<String> = self
            .get_users_by_country(&country_id)
            .await?
            .into_iter()
            .filter_map(|u| u.id)
            .collect();

        let entries = select_country_entries(&ranking, &country_user_ids);
        info!("Found {} ranked users from country", entries.len());

        let ids: Vec<String> = entries.iter().map(|e| e.user.clone()).collect();
        let details = self.fetch_details(&ids).await?;
        let users = build_country_players(&entries, &details);

        if users.is_empty() {
            warn!("No users found for country {}", country_name);
        }

        let summary = CountrySummary::from(country.clone());
        info!(
            "Data collection complete: {} active users, {} total damage",
            summary.active_population, summary.weekly_damage
        );

        Ok(CountrySnapshot {
            country_info: CountryInfo {
                id: country_id,
                name: country.name
            },
            users,
            country_weekly_damage: summary.weekly_damage,
            active_population: Some(summary.active_population),
            current_week: current_week(),
            last_updated: Utc::now()
        })
    }

    async fn fetch_details(&self, ids: &[String]) -> Result<HashMap<String, UserLite>, ApiError> {
        let batches = ids.len().div_ceil(DETAIL_BATCH_SIZE) as u64;
        let span = progress_span(batches, "Fetching user details");

        self.collect_details(ids, &span).instrument(span.clone()).await
    }

    async fn collect_details(&self, ids: &[String], progress: &Span) -> Result<HashMap<String, UserLite>, ApiError> {
        let mut details = HashMap::with_capacity(ids.len());

        for chunk in ids.chunks(DETAIL_BATCH_SIZE) {
            for user in self.get_users_lite(chunk).await? {
                details.insert(user.id.clone(), user);
            }
            progress.pb_inc(1);
        }

        Ok(details)
    }
}
