use std::sync::Arc;

use crate::booking::{AvailabilityService, BookingManager, InventoryStore};
use crate::payment::{PaymentBroker, PaymentReconciler, PaymentStore};

/// Shared state of the booking service
pub struct BookingState {
    pub availability: AvailabilityService,
    pub manager: BookingManager,
    /// Store handle for health checks
    pub inventory: Arc<dyn InventoryStore>,
}

impl BookingState {
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        identity: Arc<dyn crate::booking::IdentityDirectory>,
    ) -> Self {
        Self {
            availability: AvailabilityService::new(inventory.clone()),
            manager: BookingManager::new(inventory.clone(), identity),
            inventory,
        }
    }
}

/// Shared state of the payment service
pub struct PaymentState {
    pub broker: PaymentBroker,
    pub reconciler: PaymentReconciler,
    /// Store handle for health checks
    pub store: Arc<dyn PaymentStore>,
}

impl PaymentState {
    pub fn new(
        broker: PaymentBroker,
        reconciler: PaymentReconciler,
        store: Arc<dyn PaymentStore>,
    ) -> Self {
        Self {
            broker,
            reconciler,
            store,
        }
    }
}
