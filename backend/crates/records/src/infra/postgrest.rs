//! Record API Repository Implementations
//!
//! Table access over the hosted record API (PostgREST dialect): filters are
//! `column=eq.value` query pairs and writes ask for the affected rows back.

use std::fmt::Display;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::backend::{AccessTokenSource, BackendClient, BackendError};
use platform::config::ClientConfig;
use reqwest::{Method, RequestBuilder, Url};

use crate::domain::entities::{
    Calculation, CalculationInput, CalculationUpdate, NewCalculation, Profile, ProfileChanges,
    ProfileRow, ProfileUpdate,
};
use crate::domain::repository::{CalculationRepository, ProfileRepository};
use crate::domain::value_objects::OwnedKey;
use crate::error::{RecordError, RecordResult};

const CALCULATIONS: &str = "calculations";
const PROFILES: &str = "profiles";

/// Accept header for reads that must match exactly one row
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_ROWS: &str = "return=representation";
const UPSERT_RETURN_ROWS: &str = "resolution=merge-duplicates,return=representation";

fn eq(value: impl Display) -> String {
    format!("eq.{value}")
}

/// Shared request plumbing of both repositories
#[derive(Clone)]
struct Tables {
    client: BackendClient,
    tokens: Arc<dyn AccessTokenSource>,
}

impl Tables {
    fn url(&self, table: &str, params: &[(&str, String)]) -> Result<Url, BackendError> {
        let mut url = self.client.endpoint(table)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", "*");
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let token = self.tokens.access_token();
        self.client.request(method, url, token.as_deref())
    }

    /// Run a write that returns the affected rows; first row or `None`
    async fn first_row<T>(&self, request: RequestBuilder) -> RecordResult<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let rows: Vec<T> = self.client.send_json(request).await?;
        Ok(rows.into_iter().next())
    }

    /// Single-row read; the no-rows error becomes `None`
    async fn single_row<T>(&self, url: Url) -> RecordResult<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let request = self
            .request(Method::GET, url)
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT);

        match self.client.send_json(request).await {
            Ok(row) => Ok(Some(row)),
            Err(e) if e.is_no_rows() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Calculation repository over the record API
#[derive(Clone)]
pub struct PostgrestCalculationRepository {
    tables: Tables,
}

impl PostgrestCalculationRepository {
    pub fn new(client: BackendClient, tokens: Arc<dyn AccessTokenSource>) -> Self {
        Self {
            tables: Tables { client, tokens },
        }
    }

    pub fn from_config(config: &ClientConfig, tokens: Arc<dyn AccessTokenSource>) -> Self {
        Self::new(BackendClient::rest(config), tokens)
    }

    fn key_params(key: OwnedKey) -> Vec<(&'static str, String)> {
        vec![("id", eq(key.id)), ("user_id", eq(key.owner))]
    }
}

impl CalculationRepository for PostgrestCalculationRepository {
    async fn insert(&self, owner: UserId, input: &CalculationInput) -> RecordResult<Calculation> {
        let url = self.tables.url(CALCULATIONS, &[])?;
        let request = self
            .tables
            .request(Method::POST, url)
            .header("Prefer", RETURN_ROWS)
            .json(&NewCalculation {
                user_id: owner,
                input,
            });

        let calculation: Calculation = self
            .tables
            .first_row(request)
            .await?
            .ok_or_else(|| RecordError::Internal("insert returned no row".to_string()))?;

        tracing::info!(
            calculation_id = %calculation.id,
            user_id = %owner,
            month = %calculation.month,
            "Calculation created"
        );

        Ok(calculation)
    }

    async fn list(&self, owner: UserId, month: Option<&str>) -> RecordResult<Vec<Calculation>> {
        let mut params = vec![("user_id", eq(owner))];
        if let Some(month) = month {
            params.push(("month", eq(month)));
        }
        params.push(("order", "created_at.desc".to_string()));

        let url = self.tables.url(CALCULATIONS, &params)?;
        let rows: Vec<Calculation> = self
            .tables
            .client
            .send_json(self.tables.request(Method::GET, url))
            .await?;

        tracing::debug!(user_id = %owner, count = rows.len(), "Calculations listed");
        Ok(rows)
    }

    async fn find(&self, key: OwnedKey) -> RecordResult<Option<Calculation>> {
        let url = self.tables.url(CALCULATIONS, &Self::key_params(key))?;
        self.tables.single_row(url).await
    }

    async fn update(
        &self,
        key: OwnedKey,
        input: &CalculationInput,
        updated_at: DateTime<Utc>,
    ) -> RecordResult<Option<Calculation>> {
        let url = self.tables.url(CALCULATIONS, &Self::key_params(key))?;
        let request = self
            .tables
            .request(Method::PATCH, url)
            .header("Prefer", RETURN_ROWS)
            .json(&CalculationUpdate { input, updated_at });

        let updated: Option<Calculation> = self.tables.first_row(request).await?;
        if updated.is_some() {
            tracing::info!(calculation_id = %key.id, user_id = %key.owner, "Calculation updated");
        }
        Ok(updated)
    }

    async fn delete(&self, key: OwnedKey) -> RecordResult<bool> {
        let url = self.tables.url(CALCULATIONS, &Self::key_params(key))?;
        let request = self
            .tables
            .request(Method::DELETE, url)
            .header("Prefer", RETURN_ROWS);

        let deleted: Vec<Calculation> = self.tables.client.send_json(request).await?;
        if !deleted.is_empty() {
            tracing::info!(calculation_id = %key.id, user_id = %key.owner, "Calculation deleted");
        }
        Ok(!deleted.is_empty())
    }
}

/// Profile repository over the record API
#[derive(Clone)]
pub struct PostgrestProfileRepository {
    tables: Tables,
}

impl PostgrestProfileRepository {
    pub fn new(client: BackendClient, tokens: Arc<dyn AccessTokenSource>) -> Self {
        Self {
            tables: Tables { client, tokens },
        }
    }

    pub fn from_config(config: &ClientConfig, tokens: Arc<dyn AccessTokenSource>) -> Self {
        Self::new(BackendClient::rest(config), tokens)
    }
}

impl ProfileRepository for PostgrestProfileRepository {
    async fn upsert(&self, row: &ProfileRow) -> RecordResult<Profile> {
        let url = self
            .tables
            .url(PROFILES, &[("on_conflict", "id".to_string())])?;
        let request = self
            .tables
            .request(Method::POST, url)
            .header("Prefer", UPSERT_RETURN_ROWS)
            .json(row);

        let profile: Profile = self
            .tables
            .first_row(request)
            .await?
            .ok_or_else(|| RecordError::Internal("upsert returned no row".to_string()))?;

        tracing::info!(user_id = %profile.id, "Profile saved");
        Ok(profile)
    }

    async fn find(&self, owner: UserId) -> RecordResult<Option<Profile>> {
        let url = self.tables.url(PROFILES, &[("id", eq(owner))])?;
        self.tables.single_row(url).await
    }

    async fn update(
        &self,
        owner: UserId,
        changes: &ProfileChanges,
        updated_at: DateTime<Utc>,
    ) -> RecordResult<Option<Profile>> {
        let url = self.tables.url(PROFILES, &[("id", eq(owner))])?;
        let request = self
            .tables
            .request(Method::PATCH, url)
            .header("Prefer", RETURN_ROWS)
            .json(&ProfileUpdate {
                changes,
                updated_at,
            });

        let updated: Option<Profile> = self.tables.first_row(request).await?;
        if updated.is_some() {
            tracing::info!(user_id = %owner, "Profile updated");
        }
        Ok(updated)
    }
}
