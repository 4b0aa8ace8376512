//! Page-level data state
//!
//! Each page owns the remote data it displays behind a `Loadable`, which
//! tracks the load lifecycle and, like the form controllers, discards
//! results that arrive after the page was invalidated.

use crate::api::{ApiError, ResponseUpdate, RfpApi};
use crate::state::forms::ChangeNotifier;
use crate::state::models::{ResponseStatus, Rfp, RfpResponse};

/// Lifecycle of a remotely loaded value
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

/// A remotely loaded value plus the epoch guard for stale results
#[derive(Debug)]
pub struct Loadable<T> {
    state: LoadState<T>,
    epoch: u64,
}

impl<T> Loadable<T> {
    pub fn new() -> Self {
        Self {
            state: LoadState::Idle,
            epoch: 0,
        }
    }

    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn value(&self) -> Option<&T> {
        match &self.state {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    /// Enter the loading state and return the epoch the eventual result
    /// must present to be applied. Any load still in flight from an
    /// earlier epoch becomes stale.
    pub fn begin_load(&mut self) -> u64 {
        self.epoch += 1;
        self.state = LoadState::Loading;
        self.epoch
    }

    /// Apply a load result. Returns false when the result belonged to a
    /// superseded epoch and was discarded.
    pub fn apply(&mut self, epoch: u64, result: Result<T, ApiError>, fallback: &str) -> bool {
        if epoch != self.epoch {
            tracing::debug!("discarding stale load result");
            return false;
        }
        self.state = match result {
            Ok(value) => LoadState::Loaded(value),
            Err(err) => LoadState::Failed(
                err.summary_messages(fallback)
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| fallback.to_string()),
            ),
        };
        true
    }

    /// Supersede any in-flight load, keeping whatever is already shown
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        if self.is_loading() {
            self.state = LoadState::Idle;
        }
    }

    /// Replace the loaded value directly (local mutation after an action)
    pub fn replace(&mut self, value: T) {
        self.epoch += 1;
        self.state = LoadState::Loaded(value);
    }
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The RFP list page
#[derive(Debug, Default)]
pub struct RfpListPage {
    pub rfps: Loadable<Vec<Rfp>>,
    notifier: ChangeNotifier,
}

impl RfpListPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl Fn() + Send + 'static) {
        self.notifier.subscribe(listener);
    }

    pub async fn load(&mut self, api: &dyn RfpApi) {
        let epoch = self.rfps.begin_load();
        self.notifier.notify();

        let result = api.list_rfps().await;
        if self.rfps.apply(epoch, result, "Failed to load RFPs") {
            self.notifier.notify();
        }
    }
}

/// The RFP detail page, with the buyer lifecycle actions
#[derive(Debug)]
pub struct RfpDetailPage {
    rfp_id: String,
    pub rfp: Loadable<Rfp>,
    acting: bool,
    notifier: ChangeNotifier,
}

impl RfpDetailPage {
    pub fn new(rfp_id: impl Into<String>) -> Self {
        Self {
            rfp_id: rfp_id.into(),
            rfp: Loadable::new(),
            acting: false,
            notifier: ChangeNotifier::default(),
        }
    }

    pub fn rfp_id(&self) -> &str {
        &self.rfp_id
    }

    pub fn is_acting(&self) -> bool {
        self.acting
    }

    pub fn subscribe(&mut self, listener: impl Fn() + Send + 'static) {
        self.notifier.subscribe(listener);
    }

    pub async fn load(&mut self, api: &dyn RfpApi) {
        let epoch = self.rfp.begin_load();
        self.notifier.notify();

        let result = api.get_rfp(&self.rfp_id).await;
        if self.rfp.apply(epoch, result, "Failed to load RFP") {
            self.notifier.notify();
        }
    }

    /// Move the draft to published; on success the shown RFP is replaced
    /// with the backend's updated copy.
    pub async fn publish(&mut self, api: &dyn RfpApi) -> Result<(), ApiError> {
        if self.acting {
            return Ok(());
        }
        self.acting = true;
        self.notifier.notify();

        let result = api.publish_rfp(&self.rfp_id).await;
        self.acting = false;
        match result {
            Ok(rfp) => {
                self.rfp.replace(rfp);
                self.notifier.notify();
                Ok(())
            }
            Err(err) => {
                self.notifier.notify();
                Err(err)
            }
        }
    }

    pub async fn delete(&mut self, api: &dyn RfpApi) -> Result<(), ApiError> {
        if self.acting {
            return Ok(());
        }
        self.acting = true;
        self.notifier.notify();

        let result = api.delete_rfp(&self.rfp_id).await;
        self.acting = false;
        self.notifier.notify();
        result
    }
}

/// The response list page
#[derive(Debug, Default)]
pub struct ResponseListPage {
    pub responses: Loadable<Vec<RfpResponse>>,
    notifier: ChangeNotifier,
}

impl ResponseListPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl Fn() + Send + 'static) {
        self.notifier.subscribe(listener);
    }

    pub async fn load(&mut self, api: &dyn RfpApi) {
        let epoch = self.responses.begin_load();
        self.notifier.notify();

        let result = api.list_responses().await;
        if self.responses.apply(epoch, result, "Failed to load responses") {
            self.notifier.notify();
        }
    }
}

/// The response detail page, with the buyer review actions
#[derive(Debug)]
pub struct ResponseDetailPage {
    response_id: String,
    pub response: Loadable<RfpResponse>,
    acting: bool,
    notifier: ChangeNotifier,
}

impl ResponseDetailPage {
    pub fn new(response_id: impl Into<String>) -> Self {
        Self {
            response_id: response_id.into(),
            response: Loadable::new(),
            acting: false,
            notifier: ChangeNotifier::default(),
        }
    }

    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    pub fn is_acting(&self) -> bool {
        self.acting
    }

    pub fn subscribe(&mut self, listener: impl Fn() + Send + 'static) {
        self.notifier.subscribe(listener);
    }

    pub async fn load(&mut self, api: &dyn RfpApi) {
        let epoch = self.response.begin_load();
        self.notifier.notify();

        let result = api.get_response(&self.response_id).await;
        if self.response.apply(epoch, result, "Failed to load response") {
            self.notifier.notify();
        }
    }

    /// Record a review decision. Only meaningful while the response is in
    /// a reviewable state; the backend enforces this too.
    pub async fn review(
        &mut self,
        api: &dyn RfpApi,
        status: ResponseStatus,
        reviewer_notes: Option<String>,
    ) -> Result<(), ApiError> {
        if self.acting {
            return Ok(());
        }
        self.acting = true;
        self.notifier.notify();

        let update = match reviewer_notes {
            Some(notes) => ResponseUpdate::review(status, notes),
            None => ResponseUpdate::status(status),
        };
        let result = api.update_response(&self.response_id, &update).await;
        self.acting = false;
        match result {
            Ok(response) => {
                self.response.replace(response);
                self.notifier.notify();
                Ok(())
            }
            Err(err) => {
                self.notifier.notify();
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockRfpApi;

    fn sample_rfp(status: &str) -> Rfp {
        serde_json::from_value(serde_json::json!({
            "id": "rfp-1",
            "title": "Website build",
            "description": "A website.",
            "category": "it_services",
            "deadline": "2030-01-01T00:00:00Z",
            "status": status,
            "created_by": "user-1",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    fn sample_response(status: &str) -> RfpResponse {
        serde_json::from_value(serde_json::json!({
            "id": "resp-1",
            "rfp_id": "rfp-1",
            "submitted_by": "user-2",
            "proposal": "A detailed proposal.",
            "status": status,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    mod loadable {
        use super::*;

        #[test]
        fn test_starts_idle() {
            let loadable: Loadable<Vec<Rfp>> = Loadable::new();
            assert_eq!(*loadable.state(), LoadState::Idle);
            assert!(loadable.value().is_none());
        }

        #[test]
        fn test_apply_success() {
            let mut loadable = Loadable::new();
            let epoch = loadable.begin_load();
            assert!(loadable.is_loading());

            assert!(loadable.apply(epoch, Ok(vec![sample_rfp("draft")]), "Failed"));
            assert_eq!(loadable.value().unwrap().len(), 1);
        }

        #[test]
        fn test_apply_failure_keeps_first_message() {
            let mut loadable: Loadable<Rfp> = Loadable::new();
            let epoch = loadable.begin_load();

            loadable.apply(
                epoch,
                Err(ApiError::Network("connection refused".to_string())),
                "Failed to load RFP",
            );
            assert_eq!(loadable.error(), Some("connection refused"));
        }

        #[test]
        fn test_stale_result_is_discarded() {
            let mut loadable: Loadable<Rfp> = Loadable::new();
            let epoch = loadable.begin_load();
            loadable.invalidate();

            assert!(!loadable.apply(epoch, Ok(sample_rfp("draft")), "Failed"));
            assert_eq!(*loadable.state(), LoadState::Idle);
        }

        #[test]
        fn test_refresh_supersedes_earlier_in_flight_load() {
            let mut loadable: Loadable<Rfp> = Loadable::new();
            let first = loadable.begin_load();
            let second = loadable.begin_load();

            // The older completion arrives after the refresh started
            assert!(!loadable.apply(first, Ok(sample_rfp("draft")), "Failed"));
            assert!(loadable.value().is_none());

            assert!(loadable.apply(second, Ok(sample_rfp("published")), "Failed"));
            assert_eq!(
                loadable.value().unwrap().status,
                crate::state::models::RfpStatus::Published
            );
        }

        #[test]
        fn test_invalidate_keeps_loaded_value() {
            let mut loadable = Loadable::new();
            let epoch = loadable.begin_load();
            loadable.apply(epoch, Ok(sample_rfp("draft")), "Failed");

            loadable.invalidate();
            assert!(loadable.value().is_some());
        }
    }

    mod rfp_pages {
        use super::*;

        #[tokio::test]
        async fn test_list_load() {
            let mut api = MockRfpApi::new();
            api.expect_list_rfps()
                .times(1)
                .returning(|| Ok(vec![sample_rfp("published")]));

            let mut page = RfpListPage::new();
            page.load(&api).await;
            assert_eq!(page.rfps.value().unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_list_load_failure() {
            let mut api = MockRfpApi::new();
            api.expect_list_rfps()
                .times(1)
                .returning(|| Err(ApiError::Network("down".to_string())));

            let mut page = RfpListPage::new();
            page.load(&api).await;
            assert_eq!(page.rfps.error(), Some("down"));
        }

        #[tokio::test]
        async fn test_detail_load_and_publish() {
            let mut api = MockRfpApi::new();
            api.expect_get_rfp()
                .withf(|id| id == "rfp-1")
                .times(1)
                .returning(|_| Ok(sample_rfp("draft")));
            api.expect_publish_rfp()
                .withf(|id| id == "rfp-1")
                .times(1)
                .returning(|_| Ok(sample_rfp("published")));

            let mut page = RfpDetailPage::new("rfp-1");
            page.load(&api).await;
            assert_eq!(
                page.rfp.value().unwrap().status,
                crate::state::models::RfpStatus::Draft
            );

            page.publish(&api).await.unwrap();
            assert_eq!(
                page.rfp.value().unwrap().status,
                crate::state::models::RfpStatus::Published
            );
            assert!(!page.is_acting());
        }

        #[tokio::test]
        async fn test_delete_propagates_failure() {
            let mut api = MockRfpApi::new();
            api.expect_delete_rfp().times(1).returning(|_| {
                Err(ApiError::Api {
                    status: 403,
                    message: "Not the owner".to_string(),
                })
            });

            let mut page = RfpDetailPage::new("rfp-1");
            let err = page.delete(&api).await.unwrap_err();
            assert_eq!(err.summary_messages(""), ["Not the owner".to_string()]);
        }
    }

    mod response_pages {
        use super::*;

        #[tokio::test]
        async fn test_review_replaces_shown_response() {
            let mut api = MockRfpApi::new();
            api.expect_get_response()
                .times(1)
                .returning(|_| Ok(sample_response("submitted")));
            api.expect_update_response()
                .withf(|id, update| {
                    id == "resp-1"
                        && update.status == Some(ResponseStatus::Approved)
                        && update.reviewer_notes.as_deref() == Some("Looks solid")
                })
                .times(1)
                .returning(|_, _| Ok(sample_response("approved")));

            let mut page = ResponseDetailPage::new("resp-1");
            page.load(&api).await;
            assert!(page.response.value().unwrap().status.is_reviewable());

            page.review(&api, ResponseStatus::Approved, Some("Looks solid".to_string()))
                .await
                .unwrap();
            assert_eq!(
                page.response.value().unwrap().status,
                ResponseStatus::Approved
            );
        }

        #[tokio::test]
        async fn test_review_without_notes_omits_them() {
            let mut api = MockRfpApi::new();
            api.expect_update_response()
                .withf(|_, update| update.reviewer_notes.is_none())
                .times(1)
                .returning(|_, _| Ok(sample_response("rejected")));

            let mut page = ResponseDetailPage::new("resp-1");
            page.review(&api, ResponseStatus::Rejected, None).await.unwrap();
        }

        #[tokio::test]
        async fn test_list_load() {
            let mut api = MockRfpApi::new();
            api.expect_list_responses()
                .times(1)
                .returning(|| Ok(vec![sample_response("submitted")]));

            let mut page = ResponseListPage::new();
            page.load(&api).await;
            assert_eq!(page.responses.value().unwrap().len(), 1);
        }
    }
}
