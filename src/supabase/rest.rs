use crate::error::Error;
use crate::http_client::json_client;
use crate::supabase::{with_caller_session, with_service_role, SUPABASE_URL};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

const PREFER: HeaderName = HeaderName::from_static("prefer");
const RETURN_MINIMAL: HeaderValue = HeaderValue::from_static("return=minimal");
const MERGE_DUPLICATES: HeaderValue =
    HeaderValue::from_static("resolution=merge-duplicates,return=minimal");

/// Which authority a table operation runs under. Caller-session requests go
/// through the backend's row-level security; the service role bypasses it
/// and is reserved for the provisioning workflow.
#[derive(Copy, Clone)]
pub(crate) enum Authority {
    ServiceRole,
    CallerSession,
}

impl Authority {
    fn apply(self, request: RequestBuilder) -> Result<RequestBuilder, Error> {
        match self {
            Self::ServiceRole => Ok(with_service_role(request)),
            Self::CallerSession => with_caller_session(request),
        }
    }
}

fn table_url(table: &str, query: &[(&str, &str)]) -> Url {
    let mut url = Url::parse(&format!("{}/rest/v1/{table}", *SUPABASE_URL)).unwrap();
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    url
}

async fn expect_success(
    response: reqwest::Response,
    table: &str,
    verb: &str,
) -> Result<(), Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let text = response.text().await.unwrap_or_default();
    warn!("{verb} {table} failed ({status}):\n{text}");
    Err(Error::Backend(format!("{verb} {table} failed: {text}")))
}

/// Inserts one row or a batch of rows.
pub(crate) async fn insert<T: Serialize + ?Sized>(
    table: &str,
    rows: &T,
    authority: Authority,
) -> Result<(), Error> {
    let client = json_client();
    let request = authority.apply(client.post(table_url(table, &[])))?;
    let response = request
        .header(PREFER, RETURN_MINIMAL)
        .json(rows)
        .send()
        .await?;
    expect_success(response, table, "insert into").await
}

/// Inserts a row, merging with the existing row on conflict over the given
/// columns (PostgREST `on_conflict` + merge-duplicates resolution).
pub(crate) async fn upsert<T: Serialize + ?Sized>(
    table: &str,
    rows: &T,
    on_conflict: &str,
    authority: Authority,
) -> Result<(), Error> {
    let client = json_client();
    let request = authority.apply(client.post(table_url(table, &[("on_conflict", on_conflict)])))?;
    let response = request
        .header(PREFER, MERGE_DUPLICATES)
        .json(rows)
        .send()
        .await?;
    expect_success(response, table, "upsert into").await
}

/// Applies a partial update to the rows matched by the filters.
pub(crate) async fn update<T: Serialize + ?Sized>(
    table: &str,
    patch: &T,
    filters: &[(&str, &str)],
    authority: Authority,
) -> Result<(), Error> {
    let client = json_client();
    let request = authority.apply(client.patch(table_url(table, filters)))?;
    let response = request
        .header(PREFER, RETURN_MINIMAL)
        .json(patch)
        .send()
        .await?;
    expect_success(response, table, "update").await
}

/// Deletes the rows matched by the filters.
pub(crate) async fn delete(
    table: &str,
    filters: &[(&str, &str)],
    authority: Authority,
) -> Result<(), Error> {
    let client = json_client();
    let request = authority.apply(client.delete(table_url(table, filters)))?;
    let response = request.send().await?;
    expect_success(response, table, "delete from").await
}

/// Selects rows; `query` carries the PostgREST filters, ordering and
/// projection (e.g. `("select", "*")`, `("id", "eq.<uuid>")`,
/// `("order", "date.asc")`).
pub(crate) async fn select<T: DeserializeOwned>(
    table: &str,
    query: &[(&str, &str)],
    authority: Authority,
) -> Result<Vec<T>, Error> {
    let client = json_client();
    let request = authority.apply(client.get(table_url(table, query)))?;
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        warn!("select from {table} failed ({status}):\n{text}");
        return Err(Error::Backend(format!("select from {table} failed: {text}")));
    }
    Ok(response.json::<Vec<T>>().await?)
}

/// Selects at most one row.
pub(crate) async fn select_maybe_single<T: DeserializeOwned>(
    table: &str,
    query: &[(&str, &str)],
    authority: Authority,
) -> Result<Option<T>, Error> {
    let mut query = query.to_vec();
    query.push(("limit", "1"));
    Ok(select(table, &query, authority).await?.into_iter().next())
}
