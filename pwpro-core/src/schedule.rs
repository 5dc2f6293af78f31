//! The job calendar and its batch geocoding pass.

use crate::geocode::Geocoder;
use log::{info, warn};
use pwpro_schemas::schedule::ScheduleItem;
use std::{thread, time::Duration};
use uuid::Uuid;

/// Pause between geocoder calls during a batch pass.
pub const DEFAULT_GEOCODE_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Default)]
pub struct ScheduleBook {
    items: Vec<ScheduleItem>,
}

impl ScheduleBook {
    pub fn new(items: Vec<ScheduleItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ScheduleItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ScheduleItem> {
        self.items
    }

    pub fn add(&mut self, item: ScheduleItem) {
        self.items.push(item);
    }

    pub fn remove(&mut self, id: Uuid) -> Option<ScheduleItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Items ordered by date, earliest first.
    pub fn upcoming(&self) -> Vec<&ScheduleItem> {
        let mut sorted: Vec<&ScheduleItem> = self.items.iter().collect();
        sorted.sort_by_key(|item| item.date);
        sorted
    }

    /// Geocodes items one at a time, sleeping `delay` between lookups, and
    /// returns one report line per item.
    ///
    /// Without `force` only items missing coordinates are processed.
    pub fn batch_geocode<G: Geocoder + ?Sized>(
        &mut self,
        geocoder: &G,
        force: bool,
        delay: Duration,
    ) -> Vec<String> {
        let pending: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| force || item.needs_geocoding())
            .map(|(index, _)| index)
            .collect();

        if pending.is_empty() {
            return vec!["No addresses to geocode.".to_string()];
        }

        info!("Geocoding {} job address(es)...", pending.len());
        let mut reports = Vec::with_capacity(pending.len());
        for (n, index) in pending.iter().enumerate() {
            if n > 0 && !delay.is_zero() {
                thread::sleep(delay);
            }
            let item = &mut self.items[*index];
            if item.address.trim().is_empty() {
                reports.push(format!("NO RESULT: {}", item.address));
                continue;
            }
            match geocoder.geocode(&item.address) {
                Ok(Some(coordinate)) => {
                    item.set_coordinate(coordinate);
                    reports.push(format!("OK: {} -> {}", item.address, coordinate));
                }
                Ok(None) => reports.push(format!("NO RESULT: {}", item.address)),
                Err(e) => {
                    warn!("Geocode error for {}: {}", item.address, e);
                    reports.push(format!("FAILED: {} ({})", item.address, e));
                }
            }
        }
        reports
    }
}
