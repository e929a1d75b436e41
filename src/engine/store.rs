use crate::model::Booking;

/// Flat, backend-ordered copy of the booking collection.
///
/// `generation` increases every time a load replaces the contents, which lets
/// a mutation that started before the replace recognise that its result
/// belongs to a superseded snapshot.
#[derive(Debug, Default)]
pub struct BookingCache {
    bookings: Vec<Booking>,
    generation: u64,
}

impl BookingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn get(&self, id: &str) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    /// Swap in a fresh snapshot. Duplicate ids keep their first occurrence.
    pub fn replace(&mut self, mut bookings: Vec<Booking>) -> u64 {
        let mut seen = std::collections::HashSet::with_capacity(bookings.len());
        bookings.retain(|b| seen.insert(b.id.clone()));
        self.bookings = bookings;
        self.generation += 1;
        self.generation
    }

    /// Replace the entry for `id` in place. Returns false if absent.
    pub fn patch(&mut self, id: &str, booking: Booking) -> bool {
        match self.bookings.iter_mut().find(|b| b.id == id) {
            Some(slot) => {
                *slot = booking;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Booking> {
        let pos = self.bookings.iter().position(|b| b.id == id)?;
        Some(self.bookings.remove(pos))
    }
}
