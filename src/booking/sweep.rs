//! Availability sweep
//!
//! Background worker that recomputes every room's display flag from the
//! booking table, releasing rooms whose last stay has checked out.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tracing::{error, info};

use super::store::InventoryStore;
use crate::error::StoreError;

pub struct AvailabilitySweeper {
    inventory: Arc<dyn InventoryStore>,
    interval: Duration,
}

impl AvailabilitySweeper {
    pub fn new(inventory: Arc<dyn InventoryStore>, interval: Duration) -> Self {
        Self {
            inventory,
            interval,
        }
    }

    /// Run the sweep loop forever
    pub async fn run(&self) -> ! {
        info!(
            interval_secs = self.interval.as_secs(),
            store = self.inventory.name(),
            "Starting availability sweep"
        );

        loop {
            if let Err(e) = self.run_once(Utc::now().date_naive()).await {
                error!(error = %e, "Availability sweep failed");
            }

            tokio::time::sleep(self.interval).await;
        }
    }

    /// Single sweep as of `today`. Returns the number of flags changed.
    pub async fn run_once(&self, today: NaiveDate) -> Result<u64, StoreError> {
        let changed = self.inventory.refresh_availability(today).await?;
        if changed > 0 {
            info!(changed, today = %today, "Room availability flags refreshed");
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::memory::InMemoryInventory;
    use crate::booking::models::{NewBooking, Room, StayRange};
    use rust_decimal_macros::dec;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_run_once_releases_room_after_checkout() {
        let store = InMemoryInventory::new();
        store
            .add_room(Room {
                room_id: 101,
                hotel_id: 1,
                room_number: "101".into(),
                room_type: "Deluxe".into(),
                price: dec!(1500.00),
                available: true,
            })
            .await;
        let mut lease = store.lock_room(101).await.unwrap().unwrap();
        lease
            .commit_booking(NewBooking {
                user_id: 7,
                room_id: 101,
                stay: StayRange::new(d("2024-06-01"), d("2024-06-03")).unwrap(),
                total_amount: dec!(1500.00),
            })
            .await
            .unwrap();
        drop(lease);

        let sweeper = AvailabilitySweeper::new(Arc::new(store.clone()), Duration::from_secs(60));

        assert_eq!(sweeper.run_once(d("2024-06-02")).await.unwrap(), 0);
        assert!(!store.get_room(101).await.unwrap().unwrap().available);

        assert_eq!(sweeper.run_once(d("2024-06-03")).await.unwrap(), 1);
        assert!(store.get_room(101).await.unwrap().unwrap().available);

        // Second pass is a no-op
        assert_eq!(sweeper.run_once(d("2024-06-03")).await.unwrap(), 0);
    }
}
