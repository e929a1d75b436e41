//! In-memory backend and booking builders shared by unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::backend::BookingBackend;
use crate::engine::EngineError;
use crate::model::*;

pub fn booking(id: &str, status: BookingStatus, category: Category) -> Booking {
    Booking {
        id: id.to_string(),
        requester_id: "U1".into(),
        provider_id: "P1".into(),
        date: "2024-07-30T00:00:00.000Z".into(),
        start_time: "2024-07-30T10:00:00.000Z".into(),
        end_time: None,
        category,
        booking_type: BookingType::Consultation,
        status,
        description: String::new(),
        location: "Virtual".into(),
        requirements: serde_json::json!({}),
        provider: Provider {
            id: "P1".into(),
            first_name: "Sarah".into(),
            last_name: "Mbeki".into(),
            email: "sarah.mbeki@example.com".into(),
            avatar_url: None,
        },
        payment: None,
        created_at: "2024-07-01T00:00:00.000Z".into(),
        updated_at: "2024-07-01T00:00:00.000Z".into(),
    }
}

pub fn with_payment(mut b: Booking, status: PaymentStatus, amount: f64) -> Booking {
    b.payment = Some(Payment {
        id: format!("PM-{}", b.id),
        booking_id: b.id.clone(),
        amount,
        currency: "USD".into(),
        status,
        transaction_id: None,
        created_at: b.created_at.clone(),
        updated_at: b.updated_at.clone(),
    });
    b
}

/// BK1 (PENDING, SPORTS, payment PENDING 100) and BK2 (CONFIRMED, CULTURE,
/// payment COMPLETED 200).
pub fn scenario() -> Vec<Booking> {
    vec![
        with_payment(
            booking("BK1", BookingStatus::Pending, Category::Sports),
            PaymentStatus::Pending,
            100.0,
        ),
        with_payment(
            booking("BK2", BookingStatus::Confirmed, Category::Culture),
            PaymentStatus::Completed,
            200.0,
        ),
    ]
}

/// Backend holding its own collection, applying mutations the way the
/// real service does and stamping `updatedAt` on every change.
#[derive(Default)]
pub struct FakeBackend {
    pub rows: Mutex<Vec<Booking>>,
    /// Message to reject the next call with.
    pub fail_next: Mutex<Option<String>>,
    /// When set, mutations wait on this before answering.
    pub gate: Mutex<Option<std::sync::Arc<Notify>>>,
    /// When set, the next `list` waits on this before answering.
    pub list_gate: Mutex<Option<std::sync::Arc<Notify>>>,
    /// When set, the next mutation answers with this id instead of the row's.
    pub echo_id: Mutex<Option<String>>,
    pub list_calls: AtomicUsize,
    pub mutation_calls: AtomicUsize,
    clock: AtomicUsize,
}

impl FakeBackend {
    pub fn with_rows(rows: Vec<Booking>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    pub fn fail_next(&self, msg: &str) {
        *self.fail_next.lock().unwrap() = Some(msg.to_string());
    }

    fn take_failure(&self) -> Option<String> {
        self.fail_next.lock().unwrap().take()
    }

    fn stamp(&self) -> String {
        let tick = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
        format!("2024-08-01T00:00:{tick:02}.000Z")
    }

    async fn wait_gate(&self) {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn modify(
        &self,
        id: &str,
        f: impl FnOnce(&mut Booking),
    ) -> Result<Booking, EngineError> {
        let stamp = self.stamp();
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| EngineError::MutationRejected("Booking not found".into()))?;
        f(row);
        row.updated_at = stamp;
        let mut answer = row.clone();
        if let Some(other) = self.echo_id.lock().unwrap().take() {
            answer.id = other;
        }
        Ok(answer)
    }
}

#[async_trait]
impl BookingBackend for FakeBackend {
    async fn list(&self, _token: &str) -> Result<Vec<Booking>, EngineError> {
        let gate = self.list_gate.lock().unwrap().take();
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(msg) = self.take_failure() {
            return Err(EngineError::FetchFailed(msg));
        }
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn get(&self, _token: &str, id: &str) -> Result<Option<Booking>, EngineError> {
        if let Some(msg) = self.take_failure() {
            return Err(EngineError::FetchFailed(msg));
        }
        Ok(self.rows.lock().unwrap().iter().find(|b| b.id == id).cloned())
    }

    async fn update_status(
        &self,
        _token: &str,
        id: &str,
        change: &StatusChange,
    ) -> Result<Booking, EngineError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_gate().await;
        if let Some(msg) = self.take_failure() {
            return Err(EngineError::MutationRejected(msg));
        }
        let status = change.status;
        self.modify(id, |b| b.status = status)
    }

    async fn update_fields(
        &self,
        _token: &str,
        id: &str,
        patch: &BookingPatch,
    ) -> Result<Booking, EngineError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_gate().await;
        if let Some(msg) = self.take_failure() {
            return Err(EngineError::MutationRejected(msg));
        }
        let patch = patch.clone();
        self.modify(id, move |b| {
            if let Some(d) = patch.description {
                b.description = d;
            }
            if let Some(l) = patch.location {
                b.location = l;
            }
            if let Some(r) = patch.requirements {
                b.requirements = r;
            }
        })
    }

    async fn delete(&self, _token: &str, id: &str) -> Result<(), EngineError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_gate().await;
        if let Some(msg) = self.take_failure() {
            return Err(EngineError::MutationRejected(msg));
        }
        let mut rows = self.rows.lock().unwrap();
        let pos = rows
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| EngineError::MutationRejected("Booking not found".into()))?;
        rows.remove(pos);
        Ok(())
    }
}
