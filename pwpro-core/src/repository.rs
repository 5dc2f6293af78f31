//! Per-entity storage behind a swappable `Repository` trait.
//!
//! Field names on disk are the snake_case column names of the hosted tables,
//! so a JSON collection file can be pushed to or pulled from the remote store
//! without remapping.

use crate::error::PwProError;
use log::info;
use pwpro_schemas::{
    estimate::Estimate, inventory::InventoryItem, invoice::Invoice, schedule::ScheduleItem,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    marker::PhantomData,
    path::{Path, PathBuf},
};
use uuid::Uuid;

/// A record with a stable id that lives in a named collection.
pub trait Entity: Clone + Serialize + DeserializeOwned {
    /// Table / collection name.
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;
}

impl Entity for Estimate {
    const COLLECTION: &'static str = "estimates";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for Invoice {
    const COLLECTION: &'static str = "invoices";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for ScheduleItem {
    const COLLECTION: &'static str = "jobs";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for InventoryItem {
    const COLLECTION: &'static str = "chemical_inventory";

    fn id(&self) -> Uuid {
        self.id
    }
}

pub trait Repository<T: Entity> {
    fn list(&self) -> Result<Vec<T>, PwProError>;

    fn get(&self, id: Uuid) -> Result<Option<T>, PwProError>;

    /// Fails with `DuplicateEntity` if the id is already present.
    fn insert(&mut self, item: T) -> Result<(), PwProError>;

    /// Replaces the record with the same id; fails with `EntityNotFound` otherwise.
    fn update(&mut self, item: T) -> Result<(), PwProError>;

    /// Removes and returns the record.
    fn delete(&mut self, id: Uuid) -> Result<T, PwProError>;
}

fn insert_into<T: Entity>(items: &mut Vec<T>, item: T) -> Result<(), PwProError> {
    let id = item.id();
    if items.iter().any(|existing| existing.id() == id) {
        return Err(PwProError::DuplicateEntity {
            collection: T::COLLECTION,
            id,
        });
    }
    items.push(item);
    Ok(())
}

fn update_in<T: Entity>(items: &mut [T], item: T) -> Result<(), PwProError> {
    let id = item.id();
    let slot = items
        .iter_mut()
        .find(|existing| existing.id() == id)
        .ok_or(PwProError::EntityNotFound {
            collection: T::COLLECTION,
            id,
        })?;
    *slot = item;
    Ok(())
}

fn delete_from<T: Entity>(items: &mut Vec<T>, id: Uuid) -> Result<T, PwProError> {
    let index = items
        .iter()
        .position(|existing| existing.id() == id)
        .ok_or(PwProError::EntityNotFound {
            collection: T::COLLECTION,
            id,
        })?;
    Ok(items.remove(index))
}

/// Volatile store, handy for tests and previews.
#[derive(Debug, Clone)]
pub struct InMemoryRepository<T> {
    items: Vec<T>,
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    fn list(&self) -> Result<Vec<T>, PwProError> {
        Ok(self.items.clone())
    }

    fn get(&self, id: Uuid) -> Result<Option<T>, PwProError> {
        Ok(self.items.iter().find(|item| item.id() == id).cloned())
    }

    fn insert(&mut self, item: T) -> Result<(), PwProError> {
        insert_into(&mut self.items, item)
    }

    fn update(&mut self, item: T) -> Result<(), PwProError> {
        update_in(&mut self.items, item)
    }

    fn delete(&mut self, id: Uuid) -> Result<T, PwProError> {
        delete_from(&mut self.items, id)
    }
}

/// One pretty-printed JSON array per collection at `<dir>/<collection>.json`.
///
/// Every mutation rewrites the whole file through a temp file and a rename,
/// so a crash mid-write leaves the previous contents intact.
#[derive(Debug, Clone)]
pub struct JsonFileRepository<T> {
    path: PathBuf,
    _entity: PhantomData<T>,
}

impl<T: Entity> JsonFileRepository<T> {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, PwProError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| PwProError::FileIO(dir.display().to_string(), e))?;
        Ok(Self {
            path: dir.join(format!("{}.json", T::COLLECTION)),
            _entity: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites the whole collection in a single write.
    pub fn replace_all(&mut self, items: &[T]) -> Result<(), PwProError> {
        self.save(items)?;
        info!("{}: replaced with {} record(s)", T::COLLECTION, items.len());
        Ok(())
    }

    fn load(&self) -> Result<Vec<T>, PwProError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, items: &[T]) -> Result<(), PwProError> {
        let json = serde_json::to_string_pretty(items)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| PwProError::FileIO(tmp.display().to_string(), e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn io_error(&self, e: std::io::Error) -> PwProError {
        PwProError::FileIO(self.path.display().to_string(), e)
    }
}

impl<T: Entity> Repository<T> for JsonFileRepository<T> {
    fn list(&self) -> Result<Vec<T>, PwProError> {
        self.load()
    }

    fn get(&self, id: Uuid) -> Result<Option<T>, PwProError> {
        Ok(self.load()?.into_iter().find(|item| item.id() == id))
    }

    fn insert(&mut self, item: T) -> Result<(), PwProError> {
        let mut items = self.load()?;
        let id = item.id();
        insert_into(&mut items, item)?;
        self.save(&items)?;
        info!("{}: inserted {}", T::COLLECTION, id);
        Ok(())
    }

    fn update(&mut self, item: T) -> Result<(), PwProError> {
        let mut items = self.load()?;
        let id = item.id();
        update_in(&mut items, item)?;
        self.save(&items)?;
        info!("{}: updated {}", T::COLLECTION, id);
        Ok(())
    }

    fn delete(&mut self, id: Uuid) -> Result<T, PwProError> {
        let mut items = self.load()?;
        let removed = delete_from(&mut items, id)?;
        self.save(&items)?;
        info!("{}: deleted {}", T::COLLECTION, id);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwpro_schemas::invoice::InvoiceItem;

    #[test]
    fn in_memory_crud_round() {
        let mut repo = InMemoryRepository::<InventoryItem>::new();
        let mut item = InventoryItem::new("Sodium Hypochlorite 12.5%", "oxidizer", 30.0, "gal");
        repo.insert(item.clone()).unwrap();

        item.current_stock = 12.0;
        repo.update(item.clone()).unwrap();
        assert_eq!(repo.get(item.id).unwrap().unwrap().current_stock, 12.0);

        let removed = repo.delete(item.id).unwrap();
        assert_eq!(removed.id, item.id);
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn duplicate_and_missing_ids_are_rejected() {
        let mut repo = InMemoryRepository::<Estimate>::new();
        let estimate = Estimate::default();
        repo.insert(estimate.clone()).unwrap();

        match repo.insert(estimate.clone()) {
            Err(PwProError::DuplicateEntity { collection, id }) => {
                assert_eq!(collection, "estimates");
                assert_eq!(id, estimate.id);
            }
            other => panic!("expected duplicate error, got {:?}", other),
        }

        let stranger = Estimate::default();
        assert!(matches!(
            repo.update(stranger.clone()),
            Err(PwProError::EntityNotFound { .. })
        ));
        assert!(matches!(
            repo.delete(stranger.id),
            Err(PwProError::EntityNotFound { .. })
        ));
    }

    #[test]
    fn json_file_store_persists_between_handles() {
        let dir = tempfile::tempdir().unwrap();
        let invoice = Invoice::from_items(
            "Ada Driveway",
            chrono::Utc::now(),
            vec![InvoiceItem::new("Driveway clean", 1200.0, 0.15)],
            None,
        );

        {
            let mut repo = JsonFileRepository::<Invoice>::open(dir.path()).unwrap();
            repo.insert(invoice.clone()).unwrap();
            assert!(repo.path().ends_with("invoices.json"));
        }

        let repo = JsonFileRepository::<Invoice>::open(dir.path()).unwrap();
        let listed = repo.list().unwrap();
        assert_eq!(listed, vec![invoice.clone()]);

        let raw = fs::read_to_string(repo.path()).unwrap();
        assert!(raw.contains("\"client_name\""));
        assert!(raw.contains("\"payment_link\""));
    }

    #[test]
    fn missing_file_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::<ScheduleItem>::open(dir.path().join("nested")).unwrap();
        assert!(repo.list().unwrap().is_empty());
        assert_eq!(repo.get(Uuid::new_v4()).unwrap(), None);
    }

    #[test]
    fn replace_all_overwrites_the_collection() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = JsonFileRepository::<InventoryItem>::open(dir.path()).unwrap();
        repo.insert(InventoryItem::new("Degreaser", "degreaser", 4.0, "gal")).unwrap();

        let mut restocked = InventoryItem::new("Surfactant", "surfactant", 2.0, "gal");
        restocked.min_stock_level = Some(1.0);
        repo.replace_all(std::slice::from_ref(&restocked)).unwrap();

        let reopened = JsonFileRepository::<InventoryItem>::open(dir.path()).unwrap();
        assert_eq!(reopened.list().unwrap(), vec![restocked]);
        assert!(!dir.path().join("chemical_inventory.json.tmp").exists());
    }
}
