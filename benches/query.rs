use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use bookdesk::auth::StaticToken;
use bookdesk::backend::BookingBackend;
use bookdesk::engine::{Engine, EngineError};
use bookdesk::model::*;
use bookdesk::notify::NoticeHub;

const STATUSES: [BookingStatus; 4] = [
    BookingStatus::Pending,
    BookingStatus::Confirmed,
    BookingStatus::Cancelled,
    BookingStatus::Completed,
];
const CATEGORIES: [Category; 5] = [
    Category::Sports,
    Category::Environment,
    Category::Culture,
    Category::Business,
    Category::Education,
];

/// Serves a fixed synthetic collection; mutations are not benchmarked.
struct Synthetic(Vec<Booking>);

#[async_trait]
impl BookingBackend for Synthetic {
    async fn list(&self, _token: &str) -> Result<Vec<Booking>, EngineError> {
        Ok(self.0.clone())
    }
    async fn get(&self, _token: &str, _id: &str) -> Result<Option<Booking>, EngineError> {
        Ok(None)
    }
    async fn update_status(&self, _: &str, _: &str, _: &StatusChange) -> Result<Booking, EngineError> {
        Err(EngineError::MutationRejected("read-only".into()))
    }
    async fn update_fields(&self, _: &str, _: &str, _: &BookingPatch) -> Result<Booking, EngineError> {
        Err(EngineError::MutationRejected("read-only".into()))
    }
    async fn delete(&self, _: &str, _: &str) -> Result<(), EngineError> {
        Err(EngineError::MutationRejected("read-only".into()))
    }
}

fn synthetic(n: usize) -> Vec<Booking> {
    (0..n)
        .map(|i| Booking {
            id: format!("BK{i:06}"),
            requester_id: format!("U{}", i % 500),
            provider_id: format!("P{}", i % 40),
            date: "2024-07-30T00:00:00.000Z".into(),
            start_time: "2024-07-30T10:00:00.000Z".into(),
            end_time: None,
            category: CATEGORIES[i % CATEGORIES.len()],
            booking_type: BookingType::Consultation,
            status: STATUSES[i % STATUSES.len()],
            description: format!("Session {i} on regional development"),
            location: "Virtual".into(),
            requirements: serde_json::json!({ "groupSize": i % 12 }),
            provider: Provider {
                id: format!("P{}", i % 40),
                first_name: format!("First{}", i % 40),
                last_name: format!("Last{}", i % 40),
                email: format!("provider{}@example.com", i % 40),
                avatar_url: None,
            },
            payment: (i % 3 != 0).then(|| Payment {
                id: format!("PM{i}"),
                booking_id: format!("BK{i:06}"),
                amount: (i % 500) as f64,
                currency: "USD".into(),
                status: if i % 2 == 0 { PaymentStatus::Completed } else { PaymentStatus::Pending },
                transaction_id: None,
                created_at: "2024-07-01T00:00:00.000Z".into(),
                updated_at: "2024-07-01T00:00:00.000Z".into(),
            }),
            created_at: "2024-07-01T00:00:00.000Z".into(),
            updated_at: "2024-07-01T00:00:00.000Z".into(),
        })
        .collect()
}

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.3}ms, p50={:.3}ms, p99={:.3}ms, max={:.3}ms",
        latencies.len(),
        avg.as_secs_f64() * 1000.0,
        percentile(latencies, 50.0).as_secs_f64() * 1000.0,
        percentile(latencies, 99.0).as_secs_f64() * 1000.0,
        latencies.last().map_or(0.0, |d| d.as_secs_f64() * 1000.0),
    );
}

fn run(engine: &Engine, label: &str, spec: &FilterSpec, rounds: usize) {
    let mut latencies = Vec::with_capacity(rounds);
    for _ in 0..rounds {
        let start = Instant::now();
        let result = engine.query(spec).expect("query");
        latencies.push(start.elapsed());
        std::hint::black_box(result);
    }
    print_latency(label, &mut latencies);
}

#[tokio::main]
async fn main() {
    for size in [1_000, 10_000, 50_000] {
        let engine = Engine::new(
            Arc::new(Synthetic(synthetic(size))),
            Arc::new(StaticToken::new(Some("bench".into()))),
            Arc::new(NoticeHub::new()),
        );
        engine.load().await.expect("load");
        println!("cache of {size} bookings");

        run(&engine, "unfiltered page 1", &FilterSpec::default(), 200);
        run(
            &engine,
            "search 'first7'",
            &FilterSpec {
                search_term: Some("first7".into()),
                ..Default::default()
            },
            200,
        );
        run(
            &engine,
            "status+payment+category, last page",
            &FilterSpec {
                status: Choice::Only(BookingStatus::Confirmed),
                payment_status: Choice::Only(PaymentStatus::Completed),
                category: Choice::Only(Category::Culture),
                page: 50,
                limit: 20,
                ..Default::default()
            },
            200,
        );
    }
}
