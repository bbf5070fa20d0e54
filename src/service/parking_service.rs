//! Parking service: coordinates signal transactions and emits events.

use std::sync::Arc;

use chrono::Utc;
use geo::Polygon;

use crate::domain::{
    AreaId, AreaSnapshot, DomainEvent, EventBus, EventKind, ParkingEvent, ParkingSignal, User,
};
use crate::error::GatewayError;
use crate::store::{AreaRegistry, EventLog, UserRegistry};

/// Result of a completed parking transaction: the recorded event plus the
/// area snapshot taken right after the capacity change.
#[derive(Debug, Clone)]
pub struct SignalOutcome {
    /// The immutable event appended to the log.
    pub event: ParkingEvent,
    /// Area state immediately after the ledger delta.
    pub area: AreaSnapshot,
}

/// Orchestration layer for every mutation in the system.
///
/// Owns explicit handles to the area registry (ledger + resolver), the
/// event log, and the user registry, all passed at construction. Each
/// inbound signal runs as one logically atomic transaction:
///
/// `Received → Resolved → LedgerApplied → Recorded → Completed`
///
/// A failure at any step aborts the transaction; when the ledger delta has
/// already been applied and recording then fails, the inverse delta is
/// applied so capacity never diverges from the event count.
#[derive(Debug, Clone)]
pub struct ParkingService {
    areas: Arc<AreaRegistry>,
    users: Arc<UserRegistry>,
    log: Arc<EventLog>,
    event_bus: EventBus,
}

impl ParkingService {
    /// Creates a new `ParkingService` over the given stores.
    #[must_use]
    pub fn new(
        areas: Arc<AreaRegistry>,
        users: Arc<UserRegistry>,
        log: Arc<EventLog>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            areas,
            users,
            log,
            event_bus,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the area registry.
    #[must_use]
    pub fn areas(&self) -> &Arc<AreaRegistry> {
        &self.areas
    }

    /// Returns a reference to the user registry.
    #[must_use]
    pub fn users(&self) -> &Arc<UserRegistry> {
        &self.users
    }

    /// Returns a reference to the event log.
    #[must_use]
    pub fn log(&self) -> &Arc<EventLog> {
        &self.log
    }

    /// Runs a full parking transaction for an inbound signal, resolving the
    /// owning area from the reported coordinate.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::InvalidInput`] when validation fails; no further
    ///   step runs.
    /// - [`GatewayError::OutsideAnyArea`] when no polygon contains the
    ///   point; neither ledger nor recorder is called.
    /// - [`GatewayError::AreaFull`] / [`GatewayError::AreaEmpty`] on a
    ///   capacity rejection; no event is recorded.
    /// - [`GatewayError::UnknownUser`] when recording fails; the already
    ///   applied ledger delta is compensated.
    pub async fn submit_signal(&self, signal: ParkingSignal) -> Result<SignalOutcome, GatewayError> {
        signal.validate()?;
        let point = signal.point();
        let area_id =
            self.areas
                .resolve(&point)
                .await
                .ok_or(GatewayError::OutsideAnyArea {
                    longitude: signal.longitude,
                    latitude: signal.latitude,
                })?;
        self.submit_signal_at(area_id, signal).await
    }

    /// Runs a parking transaction against an explicitly addressed area,
    /// skipping spatial resolution. Ledger and recorder semantics are
    /// identical to [`ParkingService::submit_signal`].
    ///
    /// # Errors
    ///
    /// Same as [`ParkingService::submit_signal`], plus
    /// [`GatewayError::AreaNotFound`] for an unknown area id.
    pub async fn submit_signal_at(
        &self,
        area_id: AreaId,
        signal: ParkingSignal,
    ) -> Result<SignalOutcome, GatewayError> {
        signal.validate()?;

        let areas = Arc::clone(&self.areas);
        let log = Arc::clone(&self.log);
        let bus = self.event_bus.clone();

        // The transaction body runs on a detached task: if the caller
        // disconnects mid-flight, the ledger/record pair still completes
        // or compensates rather than being dropped half-applied.
        tokio::spawn(run_transaction(areas, log, bus, area_id, signal))
            .await
            .map_err(|e| GatewayError::Internal(format!("transaction task failed: {e}")))?
    }

    /// Creates a new parking area with all slots free.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DuplicateAreaName`] or
    /// [`GatewayError::InvalidInput`] from the registry.
    pub async fn create_area(
        &self,
        name: &str,
        boundary: Polygon<f64>,
        max_capacity: u32,
    ) -> Result<AreaSnapshot, GatewayError> {
        let snapshot = self.areas.create(name, boundary, max_capacity).await?;

        let _ = self.event_bus.publish(DomainEvent::AreaCreated {
            area_id: snapshot.id,
            name: snapshot.name.clone(),
            max_capacity,
            timestamp: Utc::now(),
        });

        tracing::info!(area_id = %snapshot.id, name, max_capacity, "parking area created");
        Ok(snapshot)
    }

    /// Registers a user unless the username already exists; returns the
    /// existing or new user either way.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] for a blank username.
    pub async fn register_user(&self, username: &str) -> Result<User, GatewayError> {
        let (user, created) = self.users.register_if_absent(username).await?;
        if created {
            let _ = self.event_bus.publish(DomainEvent::UserRegistered {
                user_id: user.id,
                username: user.username.clone(),
                timestamp: Utc::now(),
            });
            tracing::info!(user_id = %user.id, username, "user registered");
        }
        Ok(user)
    }
}

/// The transaction body: ledger delta, record, compensation on failure.
async fn run_transaction(
    areas: Arc<AreaRegistry>,
    log: Arc<EventLog>,
    bus: EventBus,
    area_id: AreaId,
    signal: ParkingSignal,
) -> Result<SignalOutcome, GatewayError> {
    let kind = signal.kind;
    let point = signal.point();

    // LedgerApplied: a capacity rejection is terminal, nothing was written.
    let area = areas.apply_delta(area_id, kind).await?;

    // Recorded: on failure the ledger change must not stay unmatched by a
    // log entry, so the inverse delta is applied before surfacing the error.
    let event = match log
        .record(
            kind,
            point,
            signal.user_id,
            area_id,
            signal.start_time,
            signal.end_time,
        )
        .await
    {
        Ok(event) => event,
        Err(err) => {
            match areas.apply_delta(area_id, kind.inverse()).await {
                Ok(_) => {
                    tracing::warn!(%area_id, error = %err, "recording failed, ledger change compensated");
                }
                Err(comp_err) => {
                    tracing::error!(%area_id, error = %comp_err, "ledger compensation failed");
                }
            }
            return Err(err);
        }
    };

    let domain_event = match kind {
        EventKind::Park => DomainEvent::BicycleParked {
            event_id: event.id,
            area_id,
            user_id: event.user_id,
            residual_capacity: area.residual_capacity,
            timestamp: Utc::now(),
        },
        EventKind::Leave => DomainEvent::BicycleLeft {
            event_id: event.id,
            area_id,
            user_id: event.user_id,
            residual_capacity: area.residual_capacity,
            timestamp: Utc::now(),
        },
    };
    let _ = bus.publish(domain_event);

    tracing::info!(
        event_id = %event.id,
        %area_id,
        kind = %kind,
        residual_capacity = area.residual_capacity,
        "parking transaction completed"
    );

    Ok(SignalOutcome { event, area })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use geo::polygon;

    fn make_service() -> ParkingService {
        let areas = Arc::new(AreaRegistry::new());
        let users = Arc::new(UserRegistry::new());
        let log = Arc::new(EventLog::new(Arc::clone(&users), Arc::clone(&areas)));
        ParkingService::new(areas, users, log, EventBus::new(64))
    }

    fn square() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 0.0, y: 10.0),
            (x: 10.0, y: 10.0),
            (x: 10.0, y: 0.0),
        ]
    }

    fn signal(user_id: UserId, kind: EventKind, lon: f64, lat: f64) -> ParkingSignal {
        ParkingSignal {
            user_id,
            longitude: lon,
            latitude: lat,
            kind,
            start_time: None,
            end_time: None,
        }
    }

    async fn seeded(service: &ParkingService, max_capacity: u32) -> (User, AreaSnapshot) {
        let Ok(user) = service.register_user("ada").await else {
            panic!("signup failed");
        };
        let Ok(area) = service.create_area("pza", square(), max_capacity).await else {
            panic!("area creation failed");
        };
        (user, area)
    }

    #[tokio::test]
    async fn park_inside_area_completes() {
        let service = make_service();
        let (user, area) = seeded(&service, 1).await;

        let Ok(outcome) = service
            .submit_signal(signal(user.id, EventKind::Park, 5.0, 5.0))
            .await
        else {
            panic!("park failed");
        };

        assert_eq!(outcome.area.id, area.id);
        assert_eq!(outcome.area.residual_capacity, 0);
        assert_eq!(outcome.event.kind, EventKind::Park);
        assert_eq!(service.log().len().await, 1);
    }

    #[tokio::test]
    async fn second_park_on_full_area_rejected_without_event() {
        let service = make_service();
        let (user, area) = seeded(&service, 1).await;

        let first = service
            .submit_signal(signal(user.id, EventKind::Park, 5.0, 5.0))
            .await;
        assert!(first.is_ok());

        let second = service
            .submit_signal(signal(user.id, EventKind::Park, 5.0, 5.0))
            .await;
        assert!(matches!(second, Err(GatewayError::AreaFull(_))));

        let Ok(snapshot) = service.areas().snapshot(area.id).await else {
            panic!("snapshot failed");
        };
        assert_eq!(snapshot.residual_capacity, 0);
        assert_eq!(service.log().len().await, 1);
    }

    #[tokio::test]
    async fn signal_outside_any_area_rejected_without_state_change() {
        let service = make_service();
        let (user, area) = seeded(&service, 1).await;

        let result = service
            .submit_signal(signal(user.id, EventKind::Park, 50.0, 50.0))
            .await;
        assert!(matches!(result, Err(GatewayError::OutsideAnyArea { .. })));

        let Ok(snapshot) = service.areas().snapshot(area.id).await else {
            panic!("snapshot failed");
        };
        assert_eq!(snapshot.residual_capacity, 1);
        assert!(service.log().is_empty().await);
    }

    #[tokio::test]
    async fn leave_on_all_free_area_rejected_without_event() {
        let service = make_service();
        let (user, _) = seeded(&service, 2).await;

        let result = service
            .submit_signal(signal(user.id, EventKind::Leave, 5.0, 5.0))
            .await;
        assert!(matches!(result, Err(GatewayError::AreaEmpty(_))));
        assert!(service.log().is_empty().await);
    }

    #[tokio::test]
    async fn unknown_user_triggers_ledger_compensation() {
        let service = make_service();
        let (_, area) = seeded(&service, 1).await;
        let ghost = UserId::new();

        let result = service
            .submit_signal(signal(ghost, EventKind::Park, 5.0, 5.0))
            .await;
        assert!(matches!(result, Err(GatewayError::UnknownUser(_))));

        // Compensation fired: residual back to its pre-transaction value
        // and no event row exists.
        let Ok(snapshot) = service.areas().snapshot(area.id).await else {
            panic!("snapshot failed");
        };
        assert_eq!(snapshot.residual_capacity, 1);
        assert!(service.log().is_empty().await);
    }

    #[tokio::test]
    async fn invalid_coordinate_fails_fast() {
        let service = make_service();
        let (user, _) = seeded(&service, 1).await;

        let result = service
            .submit_signal(signal(user.id, EventKind::Park, 999.0, 5.0))
            .await;
        assert!(matches!(result, Err(GatewayError::InvalidInput(_))));
        assert!(service.log().is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_parks_yield_exactly_capacity_successes() {
        let service = make_service();
        let (user, area) = seeded(&service, 2).await;

        let mut handles = Vec::new();
        for _ in 0..6 {
            let service = service.clone();
            let user_id = user.id;
            handles.push(tokio::spawn(async move {
                service
                    .submit_signal(signal(user_id, EventKind::Park, 5.0, 5.0))
                    .await
                    .is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.ok() == Some(true) {
                successes += 1;
            }
        }

        assert_eq!(successes, 2);
        let Ok(snapshot) = service.areas().snapshot(area.id).await else {
            panic!("snapshot failed");
        };
        assert_eq!(snapshot.residual_capacity, 0);
        assert_eq!(service.log().len().await, 2);
    }

    #[tokio::test]
    async fn residual_equals_max_minus_parks_plus_leaves() {
        let service = make_service();
        let (user, area) = seeded(&service, 5).await;

        for _ in 0..4 {
            let _ = service
                .submit_signal(signal(user.id, EventKind::Park, 5.0, 5.0))
                .await;
        }
        let _ = service
            .submit_signal(signal(user.id, EventKind::Leave, 5.0, 5.0))
            .await;

        let parks = service.log().by_kind(EventKind::Park).await.len() as u32;
        let leaves = service.log().by_kind(EventKind::Leave).await.len() as u32;
        let Ok(snapshot) = service.areas().snapshot(area.id).await else {
            panic!("snapshot failed");
        };
        assert_eq!(
            snapshot.residual_capacity,
            snapshot.max_capacity - parks + leaves
        );
    }

    #[tokio::test]
    async fn direct_area_addressing_records_event() {
        let service = make_service();
        let (user, area) = seeded(&service, 1).await;

        let Ok(outcome) = service
            .submit_signal_at(area.id, signal(user.id, EventKind::Park, 5.0, 5.0))
            .await
        else {
            panic!("park failed");
        };
        assert_eq!(outcome.event.area_id, area.id);
        assert_eq!(service.log().len().await, 1);
    }

    #[tokio::test]
    async fn completed_transaction_publishes_domain_event() {
        let service = make_service();
        let (user, _) = seeded(&service, 1).await;
        let mut rx = service.event_bus().subscribe();

        let _ = service
            .submit_signal(signal(user.id, EventKind::Park, 5.0, 5.0))
            .await;

        let event = rx.recv().await;
        let Ok(event) = event else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "bicycle_parked");
    }
}
