//! JSON envelopes the backend wraps bookings in.
//!
//! The list endpoint answers in one of three shapes depending on whether the
//! backend paginated the result, and single-booking endpoints may or may not
//! wrap the row in `data.booking`. Everything is decoded into the shapes here
//! and unwrapped before it reaches the engine.

use serde::Deserialize;

use crate::engine::EngineError;
use crate::model::Booking;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// `GET /admin/bookings` body.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListResponse {
    Paginated {
        data: Vec<Booking>,
        total: u64,
        page: u64,
        limit: u64,
        #[serde(rename = "totalPages")]
        total_pages: u64,
    },
    WithMeta {
        data: Vec<Booking>,
        meta: PageMeta,
    },
    Plain {
        data: Vec<Booking>,
    },
}

impl ListResponse {
    pub fn into_bookings(self) -> Vec<Booking> {
        match self {
            ListResponse::Paginated { data, .. }
            | ListResponse::WithMeta { data, .. }
            | ListResponse::Plain { data } => data,
        }
    }

    /// Backend-reported total, when the shape carries one.
    pub fn reported_total(&self) -> Option<u64> {
        match self {
            ListResponse::Paginated { total, .. } => Some(*total),
            ListResponse::WithMeta { meta, .. } => meta.total,
            ListResponse::Plain { .. } => None,
        }
    }

    /// True when the backend reports more bookings than the body carries.
    pub fn is_truncated(&self) -> bool {
        let carried = match self {
            ListResponse::Paginated { data, .. }
            | ListResponse::WithMeta { data, .. }
            | ListResponse::Plain { data } => data.len() as u64,
        };
        self.reported_total().is_some_and(|total| total > carried)
    }
}

#[derive(Debug, Deserialize)]
pub struct BookingData {
    #[serde(default)]
    pub booking: Option<Booking>,
}

/// Single-booking body: `{ data: { booking } }` or a bare booking.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BookingEnvelope {
    Wrapped { data: BookingData },
    Bare(Booking),
}

impl BookingEnvelope {
    pub fn into_booking(self) -> Option<Booking> {
        match self {
            BookingEnvelope::Wrapped { data } => data.booking,
            BookingEnvelope::Bare(b) => Some(b),
        }
    }
}

/// Error body sent with non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Pull `message` out of an error body, if there is a usable one.
pub fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

pub fn decode_list(body: &[u8]) -> Result<Vec<Booking>, EngineError> {
    let resp: ListResponse = serde_json::from_slice(body)
        .map_err(|e| EngineError::MalformedResponse(format!("booking list: {e}")))?;
    if resp.is_truncated() {
        let total = resp.reported_total().unwrap_or_default();
        let bookings = resp.into_bookings();
        tracing::warn!(
            "backend reports {total} bookings but returned {}; stats and choices cover a partial collection",
            bookings.len()
        );
        metrics::counter!(crate::observability::LIST_TRUNCATED_TOTAL).increment(1);
        return Ok(bookings);
    }
    Ok(resp.into_bookings())
}

/// Decode a mutation result. A 2xx without a booking is malformed.
pub fn decode_booking(body: &[u8]) -> Result<Booking, EngineError> {
    decode_optional_booking(body)?
        .ok_or_else(|| EngineError::MalformedResponse("response carries no booking".into()))
}

pub fn decode_optional_booking(body: &[u8]) -> Result<Option<Booking>, EngineError> {
    let env: BookingEnvelope = serde_json::from_slice(body)
        .map_err(|e| EngineError::MalformedResponse(format!("booking: {e}")))?;
    Ok(env.into_booking())
}
