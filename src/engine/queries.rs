use crate::limits::*;
use crate::model::*;

use super::{Engine, EngineError};

/// Case-insensitive substring test over id, provider name and email, and
/// description. `needle` must already be lower-cased; empty matches everything.
fn matches_search(booking: &Booking, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [
        booking.id.as_str(),
        booking.provider.first_name.as_str(),
        booking.provider.last_name.as_str(),
        booking.provider.email.as_str(),
        booking.description.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

fn matches_payment(booking: &Booking, wanted: &Choice<PaymentStatus>) -> bool {
    match (wanted, booking.payment_status()) {
        (Choice::All, _) => true,
        (Choice::Only(want), Some(have)) => *want == have,
        (Choice::Only(_), None) => false,
    }
}

/// All five predicates, in order: search, status, payment status, category, type.
pub fn matches(booking: &Booking, spec: &FilterSpec) -> bool {
    let needle = spec
        .search_term
        .as_deref()
        .map(|t| t.trim().to_lowercase())
        .unwrap_or_default();
    matches_lowered(booking, spec, &needle)
}

fn matches_lowered(booking: &Booking, spec: &FilterSpec, needle: &str) -> bool {
    matches_search(booking, needle)
        && spec.status.accepts(&booking.status)
        && matches_payment(booking, &spec.payment_status)
        && spec.category.accepts(&booking.category)
        && spec.booking_type.accepts(&booking.booking_type)
}

/// Filter `bookings` by `spec`, keeping their relative order.
pub fn filter<'a>(bookings: &'a [Booking], spec: &FilterSpec) -> Vec<&'a Booking> {
    let needle = spec
        .search_term
        .as_deref()
        .map(|t| t.trim().to_lowercase())
        .unwrap_or_default();
    bookings
        .iter()
        .filter(|b| matches_lowered(b, spec, &needle))
        .collect()
}

/// Slice one page out of `items`. Pages past the end are empty, not errors.
pub fn paginate<T: Clone>(items: &[T], page: usize, limit: usize) -> (Vec<T>, Pagination) {
    let page = page.max(1);
    let total = items.len();
    let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
    let start = (page - 1).saturating_mul(limit).min(total);
    let end = start.saturating_add(limit).min(total);
    (
        items[start..end].to_vec(),
        Pagination {
            total,
            page,
            limit,
            total_pages,
        },
    )
}

pub fn compute_stats(bookings: &[Booking]) -> Stats {
    bookings.iter().fold(Stats::default(), |mut acc, b| {
        acc.total += 1;
        match b.status {
            BookingStatus::Confirmed => acc.confirmed += 1,
            BookingStatus::Pending => acc.pending += 1,
            _ => {}
        }
        if let Some(p) = &b.payment
            && p.status == PaymentStatus::Completed
        {
            acc.total_revenue += p.amount;
        }
        acc
    })
}

fn push_unique<T: PartialEq>(out: &mut Vec<T>, value: T) {
    if !out.contains(&value) {
        out.push(value);
    }
}

pub fn filter_choices(bookings: &[Booking]) -> FilterChoices {
    let mut choices = FilterChoices::default();
    for b in bookings {
        push_unique(&mut choices.statuses, b.status);
        if let Some(ps) = b.payment_status() {
            push_unique(&mut choices.payment_statuses, ps);
        }
        push_unique(&mut choices.categories, b.category);
        push_unique(&mut choices.booking_types, b.booking_type);
    }
    choices
}

fn validate(spec: &FilterSpec) -> Result<(), EngineError> {
    if spec.limit == 0 {
        return Err(EngineError::InvalidQuery("page limit must be greater than zero"));
    }
    if spec
        .search_term
        .as_ref()
        .is_some_and(|t| t.len() > MAX_SEARCH_TERM_LEN)
    {
        return Err(EngineError::InvalidQuery("search term too long"));
    }
    Ok(())
}

impl Engine {
    /// Filter, paginate and summarise the cached collection. No network access.
    pub fn query(&self, spec: &FilterSpec) -> Result<QueryResult, EngineError> {
        validate(spec)?;
        metrics::counter!(crate::observability::QUERIES_TOTAL).increment(1);

        let cache = self.read_cache();
        let all = cache.bookings();
        let matched = filter(all, spec);
        let (page, pagination) = paginate(&matched, spec.page, spec.limit);

        Ok(QueryResult {
            items: page.into_iter().cloned().collect(),
            pagination,
            stats: compute_stats(all),
            choices: filter_choices(all),
        })
    }

    /// Stats over the whole cache, independent of any filter.
    pub fn stats(&self) -> Stats {
        compute_stats(self.read_cache().bookings())
    }

    pub fn choices(&self) -> FilterChoices {
        filter_choices(self.read_cache().bookings())
    }
}
