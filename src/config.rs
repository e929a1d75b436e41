use std::str::FromStr;
use std::time::Duration;

use crate::limits::*;
use crate::model::FilterSpec;

/// Which route family the backend exposes for status changes and deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Routes {
    /// `PUT /admin/bookings/{id}/status`, `DELETE /admin/bookings/{id}`
    #[default]
    Admin,
    /// `PATCH /bookings/{id}/status`, `DELETE /bookings/{id}`
    Public,
}

impl FromStr for Routes {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Routes::Admin),
            "public" => Ok(Routes::Public),
            other => Err(format!("unknown route family: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub token: Option<String>,
    pub routes: Routes,
    /// `None` sends no `limit` and relies on the backend's default page.
    pub fetch_limit: Option<u32>,
    pub timeout: Duration,
    pub metrics_port: Option<u16>,
    /// Keep reloading on this interval after the first query.
    pub refresh: Option<Duration>,
    pub query: FilterSpec,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let api_url = get("BOOKDESK_API_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or("BOOKDESK_API_URL is required")?;

        let routes = parse_or(&get, "BOOKDESK_ROUTES", Routes::Admin)?;
        let fetch_limit = match get("BOOKDESK_FETCH_LIMIT") {
            Some(s) if s.trim() == "0" => None,
            Some(s) => Some(parse_var("BOOKDESK_FETCH_LIMIT", &s)?),
            None => Some(DEFAULT_FETCH_LIMIT),
        };
        let timeout = Duration::from_secs(parse_or(&get, "BOOKDESK_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?);
        let metrics_port = get("BOOKDESK_METRICS_PORT")
            .map(|s| parse_var("BOOKDESK_METRICS_PORT", &s))
            .transpose()?;
        let refresh = get("BOOKDESK_REFRESH_SECS")
            .map(|s| parse_var::<u64>("BOOKDESK_REFRESH_SECS", &s))
            .transpose()?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let query = FilterSpec {
            search_term: get("BOOKDESK_SEARCH").filter(|s| !s.is_empty()),
            status: parse_or(&get, "BOOKDESK_STATUS", Default::default())?,
            payment_status: parse_or(&get, "BOOKDESK_PAYMENT_STATUS", Default::default())?,
            category: parse_or(&get, "BOOKDESK_CATEGORY", Default::default())?,
            booking_type: parse_or(&get, "BOOKDESK_TYPE", Default::default())?,
            page: parse_or(&get, "BOOKDESK_PAGE", 1)?,
            limit: parse_or(&get, "BOOKDESK_LIMIT", DEFAULT_PAGE_LIMIT)?,
        };

        Ok(Self {
            api_url,
            token: get("BOOKDESK_TOKEN"),
            routes,
            fetch_limit,
            timeout,
            metrics_port,
            refresh,
            query,
        })
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e| format!("{key}: {e}"))
}

fn parse_or<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => parse_var(key, &raw),
        None => Ok(default),
    }
}
