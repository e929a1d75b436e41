use serde::{Deserialize, Serialize};

/// Backend timestamp, kept verbatim. The engine never computes on it.
pub type Timestamp = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Sports,
    Environment,
    Culture,
    Business,
    Education,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingType {
    SiteVisit,
    Expert,
    Consultation,
    Tour,
}

macro_rules! wire_names {
    ($ty:ty { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_uppercase().as_str() {
                    $($name => Ok(Self::$variant),)+
                    other => Err(format!("unknown {}: {other}", stringify!($ty))),
                }
            }
        }
    };
}

wire_names!(BookingStatus {
    Pending => "PENDING",
    Confirmed => "CONFIRMED",
    Cancelled => "CANCELLED",
    Completed => "COMPLETED",
});

wire_names!(PaymentStatus {
    Pending => "PENDING",
    Completed => "COMPLETED",
    Failed => "FAILED",
    Refunded => "REFUNDED",
});

wire_names!(Category {
    Sports => "SPORTS",
    Environment => "ENVIRONMENT",
    Culture => "CULTURE",
    Business => "BUSINESS",
    Education => "EDUCATION",
});

wire_names!(BookingType {
    SiteVisit => "SITE_VISIT",
    Expert => "EXPERT",
    Consultation => "CONSULTATION",
    Tour => "TOUR",
});

/// Denormalized snapshot of the provider user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub booking_id: String,
    pub amount: f64,
    pub currency: String,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub requester_id: String,
    pub provider_id: String,
    pub date: Timestamp,
    pub start_time: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Timestamp>,
    pub category: Category,
    pub booking_type: BookingType,
    pub status: BookingStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    /// Shape varies by category and type; passed through untouched.
    #[serde(default)]
    pub requirements: serde_json::Value,
    pub provider: Provider,
    /// `null` and absent both mean "no payment".
    #[serde(default)]
    pub payment: Option<Payment>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Booking {
    pub fn payment_status(&self) -> Option<PaymentStatus> {
        self.payment.as_ref().map(|p| p.status)
    }
}

// ── Mutation payloads ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusChange {
    pub status: BookingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial edit. Omitted fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<serde_json::Value>,
}

impl BookingPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.location.is_none() && self.requirements.is_none()
    }
}

// ── Query types ──────────────────────────────────────────────────

/// A filter slot: either a concrete value or the "match everything" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::All
    }
}

impl<T: PartialEq> Choice<T> {
    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => wanted == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }
}

impl<T: std::str::FromStr> std::str::FromStr for Choice<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(Choice::All)
        } else {
            s.trim().parse().map(Choice::Only)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub search_term: Option<String>,
    pub status: Choice<BookingStatus>,
    pub payment_status: Choice<PaymentStatus>,
    pub category: Choice<Category>,
    pub booking_type: Choice<BookingType>,
    /// 1-based. Zero is read as the first page.
    pub page: usize,
    pub limit: usize,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            search_term: None,
            status: Choice::All,
            payment_status: Choice::All,
            category: Choice::All,
            booking_type: Choice::All,
            page: 1,
            limit: crate::limits::DEFAULT_PAGE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

/// Dashboard stat cards, computed over the unfiltered cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub confirmed: usize,
    pub pending: usize,
    pub total_revenue: f64,
}

/// Distinct values present in the cache, in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterChoices {
    pub statuses: Vec<BookingStatus>,
    pub payment_statuses: Vec<PaymentStatus>,
    pub categories: Vec<Category>,
    pub booking_types: Vec<BookingType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub items: Vec<Booking>,
    pub pagination: Pagination,
    pub stats: Stats,
    pub choices: FilterChoices,
}

/// In-flight mutation marker for a single booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Busy {
    Updating,
    Deleting,
}
