use tracing::{debug, info, warn};

use crate::model::*;
use crate::notify::Notice;

use super::{Engine, EngineError};

impl Engine {
    /// Change a booking's status and patch the cache with the server's copy.
    ///
    /// Does not serialize overlapping calls for the same id; check
    /// [`Engine::busy`] before submitting.
    pub async fn update_status(
        &self,
        id: &str,
        status: BookingStatus,
        notes: Option<String>,
    ) -> Result<Booking, EngineError> {
        let _busy = self.mark_busy(id, Busy::Updating);
        let generation = self.generation();
        let change = StatusChange { status, notes };

        let result = match self.token().await {
            Ok(token) => self.backend.update_status(&token, id, &change).await,
            Err(e) => Err(e),
        };

        let updated = self.finish_update(id, generation, result)?;
        info!("booking {id} status -> {status}");
        self.notify.send(Notice::success(
            "Status Updated",
            format!("Booking status changed to {status}."),
        ));
        Ok(updated)
    }

    /// Edit description, location and/or requirements. Omitted fields are left alone.
    pub async fn update_fields(&self, id: &str, patch: BookingPatch) -> Result<Booking, EngineError> {
        let _busy = self.mark_busy(id, Busy::Updating);
        let generation = self.generation();

        let result = match self.token().await {
            Ok(token) => self.backend.update_fields(&token, id, &patch).await,
            Err(e) => Err(e),
        };

        let updated = self.finish_update(id, generation, result)?;
        info!("booking {id} fields updated");
        self.notify.send(Notice::success(
            "Booking Updated",
            "Booking has been updated successfully.",
        ));
        Ok(updated)
    }

    /// Delete a booking. Removing an id the backend no longer knows is a failure.
    pub async fn remove(&self, id: &str) -> Result<(), EngineError> {
        let _busy = self.mark_busy(id, Busy::Deleting);

        let result = match self.token().await {
            Ok(token) => self.backend.delete(&token, id).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            warn!("delete of booking {id} failed: {e}");
            self.notify.send(Notice::error(e.to_string()));
            return Err(e);
        }

        // Removed from whatever snapshot is current, including one loaded
        // while the delete was in flight.
        {
            let mut cache = self.write_cache();
            cache.remove(id);
            metrics::gauge!(crate::observability::CACHE_BOOKINGS).set(cache.len() as f64);
        }
        info!("booking {id} deleted");
        self.notify.send(Notice::success(
            "Booking Deleted",
            "Booking has been deleted successfully.",
        ));
        Ok(())
    }

    /// Apply a mutation result to the cache, or report its failure.
    ///
    /// The server's booking replaces the cached row as a whole. If a load
    /// replaced the cache while the request was in flight, the row is left as
    /// the newer snapshot has it. A result naming another booking is malformed.
    fn finish_update(
        &self,
        id: &str,
        generation: u64,
        result: Result<Booking, EngineError>,
    ) -> Result<Booking, EngineError> {
        let updated = match result {
            Ok(b) if b.id != id => Err(EngineError::MalformedResponse(format!(
                "update of booking {id} answered with booking {}",
                b.id
            ))),
            other => other,
        };
        let updated = match updated {
            Ok(b) => b,
            Err(e) => {
                warn!("update of booking {id} failed: {e}");
                self.notify.send(Notice::error(e.to_string()));
                return Err(e);
            }
        };

        let mut cache = self.write_cache();
        if cache.generation() != generation {
            debug!("discarding update of {id}: cache reloaded while in flight");
            metrics::counter!(crate::observability::STALE_RESULTS_DISCARDED_TOTAL).increment(1);
        } else if !cache.patch(id, updated.clone()) {
            debug!("updated booking {id} is not cached; nothing to patch");
        }
        Ok(updated)
    }
}
