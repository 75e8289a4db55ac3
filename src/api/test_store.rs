//! Implements the `BillStore` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that
//! we can run the whole app, top-to-bottom, without a network (see
//! `Mode::from_env`).

use crate::api::{ApiError, AttachmentUpload, BillStore, CreateResponse};
use crate::model::{Bill, BillStatus};
use crate::Result;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// The observable state of a `TestStore`. Tests keep a handle to it (see
/// `TestStore::state_handle`) to inspect what the store received and to
/// inject failures.
#[derive(Default, Debug, Clone)]
pub struct TestStoreState {
    /// The stored bill records.
    pub bills: Vec<Bill>,
    /// Every receipt upload the store has received, in order.
    pub uploads: Vec<AttachmentUpload>,
    /// Every update the store has received, as `(selector, payload)` pairs.
    pub updates: Vec<(Option<String>, Bill)>,
    /// When set, the next matching operation rejects with this error.
    pub fail_list: Option<ApiError>,
    pub fail_create: Option<ApiError>,
    pub fail_update: Option<ApiError>,
}

/// An implementation of the `BillStore` trait that does not use a network. It
/// can hold any data in memory and, by default, is seeded with some existing
/// records.
pub struct TestStore {
    state: Arc<Mutex<TestStoreState>>,
}

impl TestStore {
    /// Create a new `TestStore` over an existing state handle.
    pub fn new(state: Arc<Mutex<TestStoreState>>) -> Self {
        Self { state }
    }

    /// Create a new `TestStore` holding only the given bills.
    pub fn with_bills(bills: Vec<Bill>) -> Self {
        Self::new(Arc::new(Mutex::new(TestStoreState {
            bills,
            ..TestStoreState::default()
        })))
    }

    /// Create a new `TestStore` seeded with the fixture records from this
    /// module.
    pub fn seeded() -> Self {
        Self::with_bills(seed_bills())
    }

    /// A shared handle to the store's state, usable after the store itself
    /// has been boxed and moved into a workflow.
    pub fn state_handle(&self) -> Arc<Mutex<TestStoreState>> {
        Arc::clone(&self.state)
    }
}

#[async_trait::async_trait]
impl BillStore for TestStore {
    async fn list(&mut self) -> Result<Vec<Bill>> {
        let state = self.state.lock().expect("test store state poisoned");
        if let Some(e) = &state.fail_list {
            return Err(e.clone().into());
        }
        Ok(state.bills.clone())
    }

    async fn create(&mut self, upload: AttachmentUpload) -> Result<CreateResponse> {
        let mut state = self.state.lock().expect("test store state poisoned");
        if let Some(e) = &state.fail_create {
            return Err(e.clone().into());
        }
        let key = Uuid::new_v4().simple().to_string();
        let file_url = format!("https://localhost:3456/images/{}", upload.file_name);
        // The upload allocates the record; the final submit updates it.
        state.bills.push(Bill {
            id: Some(key.clone()),
            file_url: Some(file_url.clone()),
            file_name: Some(upload.file_name.clone()),
            email: upload.email.clone(),
            status: BillStatus::Pending.to_string(),
            ..Bill::default()
        });
        state.uploads.push(upload);
        Ok(CreateResponse { file_url, key })
    }

    async fn update(&mut self, selector: Option<&str>, data: &Bill) -> Result<Bill> {
        let mut state = self.state.lock().expect("test store state poisoned");
        if let Some(e) = &state.fail_update {
            return Err(e.clone().into());
        }
        let canonical = match selector {
            Some(id) => {
                let record = state
                    .bills
                    .iter_mut()
                    .find(|b| b.id.as_deref() == Some(id))
                    .ok_or_else(|| ApiError::new(404, "Not Found"))?;
                *record = Bill {
                    id: Some(id.to_string()),
                    ..data.clone()
                };
                record.clone()
            }
            None => {
                let bill = Bill {
                    id: Some(Uuid::new_v4().simple().to_string()),
                    ..data.clone()
                };
                state.bills.push(bill.clone());
                bill
            }
        };
        state.updates.push((selector.map(str::to_string), data.clone()));
        Ok(canonical)
    }
}

impl Default for TestStore {
    /// Loads seed data from this module.
    fn default() -> Self {
        Self::seeded()
    }
}

/// Provides the seed records from this module: four bills with mixed statuses
/// and deliberately non-monotonic dates.
fn seed_bills() -> Vec<Bill> {
    serde_json::from_str(SEED_DATA).expect("seed data must parse")
}

/// Seed bill data, shaped like real store responses.
const SEED_DATA: &str = r##"[
  {
    "id": "47qAXb6fIm2zOKkLzMro",
    "type": "Hôtel et logement",
    "name": "Séminaire équipe",
    "amount": 400,
    "date": "2004-04-04",
    "vat": "80",
    "pct": 20,
    "commentary": "séminaire produit",
    "fileUrl": "https://localhost:3456/images/seminaire.jpg",
    "fileName": "seminaire.jpg",
    "status": "pending",
    "commentAdmin": "",
    "email": "a@a"
  },
  {
    "id": "BeKy5Mo4jkmdfPGYpTxZ",
    "type": "Transports",
    "name": "Vol Paris Londres",
    "amount": 100,
    "date": "2001-01-01",
    "vat": "",
    "pct": 20,
    "commentary": "déplacement client",
    "fileUrl": "https://localhost:3456/images/vol.jpeg",
    "fileName": "vol.jpeg",
    "status": "refused",
    "commentAdmin": "en fait non",
    "email": "a@a"
  },
  {
    "id": "UIUZtnPQvnbFnB0ozvJh",
    "type": "Services en ligne",
    "name": "Abonnement visio",
    "amount": 300,
    "date": "2003-03-03",
    "vat": "60",
    "pct": 20,
    "commentary": "",
    "fileUrl": "https://localhost:3456/images/abonnement.png",
    "fileName": "abonnement.png",
    "status": "accepted",
    "commentAdmin": "bon bah d'accord",
    "email": "a@a"
  },
  {
    "id": "qcCK3SzECmaZAGRrHjaC",
    "type": "Restaurants et bars",
    "name": "Déjeuner client",
    "amount": 200,
    "date": "2002-02-02",
    "vat": "40",
    "pct": 20,
    "commentary": "invitation prospect",
    "fileUrl": "https://localhost:3456/images/dejeuner.jpg",
    "fileName": "dejeuner.jpg",
    "status": "refused",
    "commentAdmin": "",
    "email": "a@a"
  }
]"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_list() {
        let mut store = TestStore::seeded();
        let bills = store.list().await.unwrap();
        assert_eq!(bills.len(), 4);
        assert_eq!(bills[0].id.as_deref(), Some("47qAXb6fIm2zOKkLzMro"));
    }

    #[tokio::test]
    async fn test_create_allocates_record() {
        let mut store = TestStore::with_bills(Vec::new());
        let handle = store.state_handle();
        let response = store
            .create(AttachmentUpload {
                file_name: "note.png".to_string(),
                bytes: vec![1, 2, 3],
                email: "a@a".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.file_url, "https://localhost:3456/images/note.png");
        let state = handle.lock().unwrap();
        assert_eq!(state.bills.len(), 1);
        assert_eq!(state.bills[0].id.as_deref(), Some(response.key.as_str()));
        assert_eq!(state.uploads.len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_selector_is_404() {
        let mut store = TestStore::with_bills(Vec::new());
        let err = store
            .update(Some("missing"), &Bill::default())
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<ApiError>().unwrap().status(), 404);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = TestStore::seeded();
        let handle = store.state_handle();
        handle.lock().unwrap().fail_list = Some(ApiError::new(500, "Internal Server Error"));
        let mut store = store;
        let err = store.list().await.unwrap_err();
        assert_eq!(err.downcast_ref::<ApiError>().unwrap().status(), 500);
    }
}
