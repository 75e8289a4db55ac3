//! The bill submission workflow.
//!
//! A small state machine coordinating two async store calls: the receipt
//! upload, which allocates the backend record, and the final submit, which
//! persists the form fields against that record. Failures are never terminal;
//! every error reverts the machine to its last stable state so the user can
//! retry the triggering action.

use crate::api::{AttachmentUpload, BillStore};
use crate::model::{Bill, BillForm, BillStatus};
use crate::ui::{Alert, Navigate, ROUTE_BILLS};
use crate::{Result, Session};
use anyhow::{bail, Context};
use tracing::debug;

/// Receipt file extensions accepted for upload, matched case-insensitively.
const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// A receipt file as the user selected it: its original name and contents.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct FileInput {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Proof of a successful receipt upload: the backend record id it allocated,
/// the stored attachment URL, and the name of the originally selected file
/// (not any server-side name).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BillHandle {
    pub bill_id: String,
    pub file_url: String,
    pub file_name: String,
}

/// Where the workflow currently stands. `Uploading` and `Submitting` exist to
/// keep a second upload or submit from being issued while one is outstanding.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub enum WorkflowState {
    /// No receipt chosen yet.
    #[default]
    Empty,
    /// A receipt upload is in flight.
    Uploading,
    /// The receipt is uploaded and the backend record allocated.
    Attached(BillHandle),
    /// The final submit is in flight.
    Submitting,
    /// Submitted and navigated away; the workflow is finished.
    Done,
}

/// Orchestrates receipt upload and bill record creation for one draft bill.
/// Each instance owns its draft exclusively; collaborators are injected and
/// there is no ambient global state.
pub struct NewBillWorkflow {
    store: Box<dyn BillStore + Send>,
    session: Session,
    navigate: Box<dyn Navigate + Send>,
    alert: Box<dyn Alert + Send>,
    state: WorkflowState,
}

impl NewBillWorkflow {
    pub fn new(
        store: Box<dyn BillStore + Send>,
        session: Session,
        navigate: Box<dyn Navigate + Send>,
        alert: Box<dyn Alert + Send>,
    ) -> Self {
        Self {
            store,
            session,
            navigate,
            alert,
            state: WorkflowState::Empty,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// The backend record id, once a receipt upload has allocated one.
    pub fn bill_id(&self) -> Option<&str> {
        self.handle().map(|h| h.bill_id.as_str())
    }

    /// The stored attachment URL, once a receipt upload has succeeded.
    pub fn file_url(&self) -> Option<&str> {
        self.handle().map(|h| h.file_url.as_str())
    }

    /// The originally selected receipt file name.
    pub fn file_name(&self) -> Option<&str> {
        self.handle().map(|h| h.file_name.as_str())
    }

    fn handle(&self) -> Option<&BillHandle> {
        match &self.state {
            WorkflowState::Attached(handle) => Some(handle),
            _ => None,
        }
    }

    /// Checks the selected file's extension against the accepted set,
    /// case-insensitively. Returns `true` and proceeds silently when valid;
    /// returns `false` and raises exactly one user-facing alert when not.
    /// Synchronous: an invalid file must never reach the store.
    pub fn check_file_extension(&mut self, file_name: &str) -> bool {
        let extension = file_name.rsplit('.').next().unwrap_or_default();
        let valid = file_name.contains('.')
            && ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(extension));
        if !valid {
            self.alert.alert(&format!(
                "Le justificatif '{file_name}' est refusé : seuls les fichiers \
                 .jpg, .jpeg et .png sont acceptés."
            ));
        }
        valid
    }

    /// Uploads the selected receipt, allocating the backend bill record.
    ///
    /// An invalid extension aborts before any network call (the alert has
    /// already been raised) with no state change. On success the returned
    /// handle is also retained as the `Attached` state. On failure the error
    /// propagates and the workflow returns to `Empty`; there is no automatic
    /// retry. Re-attaching replaces a previous attachment.
    pub async fn attach(&mut self, file: FileInput) -> Result<BillHandle> {
        match self.state {
            WorkflowState::Uploading | WorkflowState::Submitting => {
                bail!("A call is already in flight, ignoring the new receipt")
            }
            WorkflowState::Done => bail!("The bill was already submitted"),
            WorkflowState::Empty | WorkflowState::Attached(_) => {}
        }
        if !self.check_file_extension(&file.name) {
            bail!("Invalid receipt file '{}'", file.name);
        }

        let upload = AttachmentUpload {
            file_name: file.name.clone(),
            bytes: file.bytes,
            email: self.session.email().to_string(),
        };
        self.state = WorkflowState::Uploading;
        match self.store.create(upload).await {
            Ok(response) => {
                debug!("receipt stored at {}, record {} allocated", response.file_url, response.key);
                let handle = BillHandle {
                    bill_id: response.key,
                    file_url: response.file_url,
                    // The user knows the file by the name they picked, not by
                    // whatever the server renamed it to.
                    file_name: file.name,
                };
                self.state = WorkflowState::Attached(handle.clone());
                Ok(handle)
            }
            Err(e) => {
                self.state = WorkflowState::Empty;
                Err(e).context("The receipt upload failed")
            }
        }
    }

    /// Persists the full draft against the record allocated by the upload
    /// (or lets the store allocate one when nothing was attached), then
    /// navigates to the bill list exactly once.
    ///
    /// An unparsable amount rejects the submission before any network call.
    /// On a store rejection the error propagates to the caller, unswallowed,
    /// and the workflow reverts to its previous stable state for a retry.
    pub async fn finalize(&mut self, form: &BillForm) -> Result<Bill> {
        match self.state {
            WorkflowState::Uploading | WorkflowState::Submitting => {
                bail!("A call is already in flight, ignoring the submission")
            }
            WorkflowState::Done => bail!("The bill was already submitted"),
            WorkflowState::Empty | WorkflowState::Attached(_) => {}
        }
        // Validation first: nothing below may run against a bad amount.
        let amount = form.parse_amount()?;

        let previous = std::mem::take(&mut self.state);
        let (selector, file_url, file_name) = match &previous {
            WorkflowState::Attached(handle) => (
                Some(handle.bill_id.clone()),
                Some(handle.file_url.clone()),
                Some(handle.file_name.clone()),
            ),
            _ => (None, None, None),
        };
        let payload = Bill {
            id: None,
            bill_type: form.bill_type.clone(),
            name: form.name.clone(),
            amount,
            date: form.date.clone(),
            vat: form.vat.clone(),
            pct: form.parse_pct(),
            commentary: form.commentary.clone(),
            file_url,
            file_name,
            status: BillStatus::Pending.to_string(),
            comment_admin: None,
            email: self.session.email().to_string(),
        };

        self.state = WorkflowState::Submitting;
        match self.store.update(selector.as_deref(), &payload).await {
            Ok(bill) => {
                self.state = WorkflowState::Done;
                self.navigate.navigate(ROUTE_BILLS);
                Ok(bill)
            }
            Err(e) => {
                self.state = previous;
                Err(e).context("The bill submission failed")
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn force_state(&mut self, state: WorkflowState) {
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, TestStore, TestStoreState};
    use crate::test::{RecordingAlert, RecordingNavigate};
    use std::sync::{Arc, Mutex};

    struct Harness {
        workflow: NewBillWorkflow,
        store_state: Arc<Mutex<TestStoreState>>,
        navigate: RecordingNavigate,
        alert: RecordingAlert,
    }

    fn harness() -> Harness {
        let store = TestStore::with_bills(Vec::new());
        let store_state = store.state_handle();
        let navigate = RecordingNavigate::default();
        let alert = RecordingAlert::default();
        let workflow = NewBillWorkflow::new(
            Box::new(store),
            Session::new("employee@test.tld", ""),
            Box::new(navigate.clone()),
            Box::new(alert.clone()),
        );
        Harness {
            workflow,
            store_state,
            navigate,
            alert,
        }
    }

    fn jpg() -> FileInput {
        FileInput {
            name: "note-de-frais.jpg".to_string(),
            bytes: b"file contents".to_vec(),
        }
    }

    fn form() -> BillForm {
        BillForm {
            bill_type: "Transports".to_string(),
            name: "Vol Paris Londres".to_string(),
            date: "2022-06-15".to_string(),
            amount: "240".to_string(),
            vat: "40".to_string(),
            pct: "20".to_string(),
            commentary: "déplacement client".to_string(),
        }
    }

    #[test]
    fn test_check_file_extension_accepts_allowed_types() {
        let mut h = harness();
        for name in ["a.jpg", "a.jpeg", "a.png", "a.JPG", "photo.PnG", "b.c.jpeg"] {
            assert!(h.workflow.check_file_extension(name), "{name}");
        }
        assert!(h.alert.messages().is_empty());
    }

    #[test]
    fn test_check_file_extension_rejects_and_alerts_once() {
        for name in ["document.pdf", "archive.tar.gz", "noextension", "note.jpg.exe"] {
            let mut h = harness();
            assert!(!h.workflow.check_file_extension(name), "{name}");
            let messages = h.alert.messages();
            assert_eq!(messages.len(), 1, "{name}");
            assert!(messages[0].contains(name));
        }
    }

    #[tokio::test]
    async fn test_attach_success() {
        let mut h = harness();
        let handle = h.workflow.attach(jpg()).await.unwrap();
        assert_eq!(handle.file_name, "note-de-frais.jpg");
        assert_eq!(
            handle.file_url,
            "https://localhost:3456/images/note-de-frais.jpg"
        );
        // The workflow exposes the same handle fields.
        assert_eq!(h.workflow.file_url(), Some(handle.file_url.as_str()));
        assert_eq!(h.workflow.bill_id(), Some(handle.bill_id.as_str()));
        assert_eq!(h.workflow.file_name(), Some("note-de-frais.jpg"));
        // The upload carried the session email.
        let state = h.store_state.lock().unwrap();
        assert_eq!(state.uploads.len(), 1);
        assert_eq!(state.uploads[0].email, "employee@test.tld");
    }

    #[tokio::test]
    async fn test_attach_invalid_extension_never_reaches_store() {
        let mut h = harness();
        let err = h
            .workflow
            .attach(FileInput {
                name: "document.pdf".to_string(),
                bytes: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("document.pdf"));
        assert_eq!(h.alert.messages().len(), 1);
        assert_eq!(*h.workflow.state(), WorkflowState::Empty);
        assert!(h.store_state.lock().unwrap().uploads.is_empty());
    }

    #[tokio::test]
    async fn test_attach_failure_reverts_to_empty() {
        let mut h = harness();
        h.store_state.lock().unwrap().fail_create = Some(ApiError::new(500, "Internal Server Error"));
        let err = h.workflow.attach(jpg()).await.unwrap_err();
        assert_eq!(err.downcast_ref::<ApiError>().unwrap().status(), 500);
        assert_eq!(*h.workflow.state(), WorkflowState::Empty);
        assert!(h.workflow.bill_id().is_none());
    }

    #[tokio::test]
    async fn test_attach_rejected_while_call_in_flight() {
        let mut h = harness();
        h.workflow.force_state(WorkflowState::Uploading);
        assert!(h.workflow.attach(jpg()).await.is_err());
        assert_eq!(*h.workflow.state(), WorkflowState::Uploading);
        assert!(h.store_state.lock().unwrap().uploads.is_empty());
    }

    #[tokio::test]
    async fn test_reattach_replaces_previous_receipt() {
        let mut h = harness();
        let first = h.workflow.attach(jpg()).await.unwrap();
        let second = h
            .workflow
            .attach(FileInput {
                name: "corrige.png".to_string(),
                bytes: b"v2".to_vec(),
            })
            .await
            .unwrap();
        assert_ne!(first.bill_id, second.bill_id);
        assert_eq!(h.workflow.file_name(), Some("corrige.png"));
    }

    #[tokio::test]
    async fn test_finalize_submits_integers_and_navigates_once() {
        let mut h = harness();
        h.workflow.attach(jpg()).await.unwrap();
        let bill_id = h.workflow.bill_id().unwrap().to_string();
        let submitted = h.workflow.finalize(&form()).await.unwrap();

        assert_eq!(submitted.amount, 240);
        assert_eq!(submitted.pct, 20);
        assert_eq!(submitted.status, "pending");
        assert_eq!(*h.workflow.state(), WorkflowState::Done);
        assert_eq!(h.navigate.paths(), vec![ROUTE_BILLS.to_string()]);

        let state = h.store_state.lock().unwrap();
        assert_eq!(state.updates.len(), 1);
        let (selector, payload) = &state.updates[0];
        assert_eq!(selector.as_deref(), Some(bill_id.as_str()));
        assert_eq!(payload.amount, 240);
        assert_eq!(payload.pct, 20);
        assert_eq!(payload.file_name.as_deref(), Some("note-de-frais.jpg"));
        assert_eq!(payload.email, "employee@test.tld");
    }

    #[tokio::test]
    async fn test_finalize_defaults_pct() {
        for pct in ["", "vingt"] {
            let mut h = harness();
            let mut f = form();
            f.pct = pct.to_string();
            h.workflow.finalize(&f).await.unwrap();
            let state = h.store_state.lock().unwrap();
            assert_eq!(state.updates[0].1.pct, 20, "pct input {pct:?}");
        }
    }

    #[tokio::test]
    async fn test_finalize_rejects_bad_amount_before_any_store_call() {
        let mut h = harness();
        h.workflow.attach(jpg()).await.unwrap();
        let mut f = form();
        f.amount = "deux cents".to_string();
        assert!(h.workflow.finalize(&f).await.is_err());
        // Still attached, nothing was sent, no navigation happened.
        assert!(matches!(h.workflow.state(), WorkflowState::Attached(_)));
        assert!(h.store_state.lock().unwrap().updates.is_empty());
        assert!(h.navigate.paths().is_empty());
    }

    #[tokio::test]
    async fn test_finalize_without_attachment_sends_null_file_fields() {
        let mut h = harness();
        let submitted = h.workflow.finalize(&form()).await.unwrap();
        assert!(submitted.id.is_some());
        let state = h.store_state.lock().unwrap();
        let (selector, payload) = &state.updates[0];
        assert!(selector.is_none());
        assert!(payload.file_url.is_none());
        assert!(payload.file_name.is_none());
    }

    #[tokio::test]
    async fn test_finalize_failure_is_observable_and_recoverable() {
        let mut h = harness();
        h.workflow.attach(jpg()).await.unwrap();
        h.store_state.lock().unwrap().fail_update = Some(ApiError::new(404, "Not Found"));

        let err = h.workflow.finalize(&form()).await.unwrap_err();
        let api = err.downcast_ref::<ApiError>().unwrap();
        assert_eq!(api.status(), 404);
        assert_eq!(api.message(), "Not Found");
        assert!(h.navigate.paths().is_empty());
        assert!(matches!(h.workflow.state(), WorkflowState::Attached(_)));

        // The failure is recoverable: clearing it lets the retry succeed.
        h.store_state.lock().unwrap().fail_update = None;
        h.workflow.finalize(&form()).await.unwrap();
        assert_eq!(*h.workflow.state(), WorkflowState::Done);
        assert_eq!(h.navigate.paths(), vec![ROUTE_BILLS.to_string()]);
    }

    #[tokio::test]
    async fn test_finalize_rejected_after_done() {
        let mut h = harness();
        h.workflow.finalize(&form()).await.unwrap();
        assert!(h.workflow.finalize(&form()).await.is_err());
        // Navigation happened exactly once.
        assert_eq!(h.navigate.paths().len(), 1);
    }

    #[tokio::test]
    async fn test_finalize_rejected_while_call_in_flight() {
        let mut h = harness();
        h.workflow.force_state(WorkflowState::Submitting);
        assert!(h.workflow.finalize(&form()).await.is_err());
        assert_eq!(*h.workflow.state(), WorkflowState::Submitting);
        assert!(h.store_state.lock().unwrap().updates.is_empty());
    }
}
