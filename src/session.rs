//! The studio session owns the catalog, the filter state and the booking
//! flow, plus the two deferred tasks that mutate them: the simulated catalog
//! load and the post-booking confirmation reset.
//!
//! Every intent takes the session lock, mutates, recomputes the visible list
//! and releases before returning. Deferred tasks hold only a `Weak` handle and
//! are aborted when the session shuts down or is dropped.

use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info};
use utoipa::ToSchema;

use crate::booking::{BookingMachine, BookingState};
use crate::catalog::{CatalogError, CatalogLoader};
use crate::error::StudioError;
use crate::filter::{FilterCategory, FilterCriterion, FilterState};
use crate::images::ImageResolver;
use crate::models::{ClassCard, ClassSession};

/// A single-shot spawned task that is aborted when dropped.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: Some(tokio::spawn(future)),
        }
    }

    pub fn cancel(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Lets the task run to completion without aborting it. Used by a task
    /// that removes its own handle from the session.
    fn detach(mut self) {
        self.handle.take();
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    catalog: Option<Vec<ClassSession>>,
    load_error: Option<CatalogError>,
    filters: FilterState,
    visible: Vec<u32>,
    booking: BookingMachine,
    pending_load: Option<ScheduledTask>,
    pending_reset: Option<ScheduledTask>,
    reset_ticket: u64,
}

impl SessionState {
    fn refresh(&mut self) {
        self.visible = match &self.catalog {
            Some(catalog) => self.filters.apply(catalog).iter().map(|c| c.id).collect(),
            None => Vec::new(),
        };
        debug!(
            query = self.filters.query(),
            criteria = self.filters.criteria().len(),
            visible = self.visible.len(),
            "visible classes recomputed"
        );
    }

    fn cancel_reset(&mut self) {
        self.reset_ticket += 1;
        if let Some(task) = self.pending_reset.take() {
            task.cancel();
        }
    }

    fn catalog(&self) -> Result<&[ClassSession], StudioError> {
        match (&self.catalog, &self.load_error) {
            (Some(catalog), _) => Ok(catalog),
            (None, Some(err)) => Err(StudioError::Catalog(err.clone())),
            (None, None) => Err(StudioError::CatalogLoading),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct BookingView {
    pub state: BookingState,
    pub booking_confirmed: bool,
    pub selected_class: Option<ClassCard>,
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct ClassListing {
    pub loading: bool,
    pub error: Option<String>,
    pub query: String,
    /// Active filter tags as `category:value`, in the order they were added.
    pub filters: Vec<String>,
    pub classes: Vec<ClassCard>,
    pub booking: BookingView,
}

#[derive(Clone)]
pub struct StudioSession {
    inner: Arc<Mutex<SessionState>>,
    confirmation_delay: Duration,
    images: Arc<dyn ImageResolver>,
}

impl StudioSession {
    /// A session with no catalog yet. Call [`StudioSession::start_loading`].
    pub fn new(confirmation_delay: Duration, images: Arc<dyn ImageResolver>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionState::default())),
            confirmation_delay,
            images,
        }
    }

    /// A session whose catalog is already available.
    pub fn with_catalog(
        catalog: Vec<ClassSession>,
        confirmation_delay: Duration,
        images: Arc<dyn ImageResolver>,
    ) -> Self {
        let mut state = SessionState {
            catalog: Some(catalog),
            ..SessionState::default()
        };
        state.refresh();
        Self {
            inner: Arc::new(Mutex::new(state)),
            confirmation_delay,
            images,
        }
    }

    /// Starts the deferred catalog load. The result is discarded if the
    /// session is gone or shut down by the time it arrives.
    pub async fn start_loading(&self, loader: CatalogLoader) {
        let weak = Arc::downgrade(&self.inner);
        let mut state = self.inner.lock().await;
        state.pending_load = Some(ScheduledTask::spawn(load_catalog(weak, loader)));
    }

    pub async fn is_loading(&self) -> bool {
        let state = self.inner.lock().await;
        state.catalog.is_none() && state.load_error.is_none()
    }

    pub async fn catalog(&self) -> Result<Vec<ClassSession>, StudioError> {
        Ok(self.inner.lock().await.catalog()?.to_vec())
    }

    pub async fn class(&self, class_id: u32) -> Result<ClassCard, StudioError> {
        let state = self.inner.lock().await;
        state
            .catalog()?
            .iter()
            .find(|c| c.id == class_id)
            .map(|c| self.card(c))
            .ok_or(StudioError::NotFound(class_id))
    }

    /// Visible classes in catalog order.
    pub async fn visible(&self) -> Vec<ClassSession> {
        let state = self.inner.lock().await;
        visible_classes(&state).cloned().collect()
    }

    pub async fn set_query(&self, text: impl Into<String>) {
        let mut state = self.inner.lock().await;
        state.filters.set_query(text);
        state.refresh();
    }

    /// Returns whether the criterion is active afterwards.
    pub async fn toggle_criterion(&self, category: FilterCategory, value: &str) -> bool {
        let mut state = self.inner.lock().await;
        let active = state.filters.toggle_criterion(category, value);
        state.refresh();
        active
    }

    /// Switches off an active criterion; `false` if it was not active.
    pub async fn remove_criterion(&self, criterion: &FilterCriterion) -> bool {
        let mut state = self.inner.lock().await;
        if !state.filters.contains(criterion) {
            return false;
        }
        state
            .filters
            .toggle_criterion(criterion.category, &criterion.value);
        state.refresh();
        true
    }

    pub async fn clear_all(&self) {
        let mut state = self.inner.lock().await;
        state.filters.clear_all();
        state.refresh();
    }

    /// Opens the detail view for a class. Unknown ids, or a catalog that is
    /// not available, leave everything as it was and yield an error.
    pub async fn select(&self, class_id: u32) -> Result<ClassSession, StudioError> {
        let mut state = self.inner.lock().await;
        let state = &mut *state;
        let catalog = match (&state.catalog, &state.load_error) {
            (Some(catalog), _) => catalog.as_slice(),
            (None, Some(err)) => return Err(StudioError::Catalog(err.clone())),
            (None, None) => return Err(StudioError::CatalogLoading),
        };
        if !state.booking.select(catalog, class_id) {
            debug!(class_id, "ignoring selection of unknown class");
            return Err(StudioError::NotFound(class_id));
        }
        state.reset_ticket += 1;
        if let Some(task) = state.pending_reset.take() {
            task.cancel();
        }
        catalog
            .iter()
            .find(|c| c.id == class_id)
            .cloned()
            .ok_or(StudioError::NotFound(class_id))
    }

    pub async fn dismiss(&self) {
        let mut state = self.inner.lock().await;
        state.cancel_reset();
        state.booking.dismiss();
    }

    /// Books the selected class and schedules the return to `Idle` once the
    /// confirmation has been shown for the configured delay.
    pub async fn book(&self) -> Result<ClassSession, StudioError> {
        let mut state = self.inner.lock().await;
        let state = &mut *state;
        let catalog = match (&mut state.catalog, &state.load_error) {
            (Some(catalog), _) => catalog,
            (None, Some(err)) => return Err(StudioError::Catalog(err.clone())),
            (None, None) => return Err(StudioError::CatalogLoading),
        };
        let booked = state.booking.book(catalog)?;
        state.refresh();

        state.cancel_reset();
        let ticket = state.reset_ticket;
        let deadline = Instant::now() + self.confirmation_delay;
        let weak = Arc::downgrade(&self.inner);
        state.pending_reset = Some(ScheduledTask::spawn(expire_confirmation(
            weak, ticket, deadline,
        )));
        Ok(booked)
    }

    pub async fn booking_state(&self) -> BookingState {
        self.inner.lock().await.booking.state()
    }

    pub async fn booking(&self) -> BookingView {
        let state = self.inner.lock().await;
        self.booking_view(&state)
    }

    pub async fn listing(&self) -> ClassListing {
        let state = self.inner.lock().await;
        ClassListing {
            loading: state.catalog.is_none() && state.load_error.is_none(),
            error: state.load_error.as_ref().map(ToString::to_string),
            query: state.filters.query().to_string(),
            filters: state
                .filters
                .criteria()
                .iter()
                .map(|c| c.to_string())
                .collect(),
            classes: visible_classes(&state).map(|c| self.card(c)).collect(),
            booking: self.booking_view(&state),
        }
    }

    /// Cancels both deferred tasks. Nothing mutates the session afterwards
    /// except explicit intents.
    pub async fn shutdown(&self) {
        let mut state = self.inner.lock().await;
        if let Some(task) = state.pending_load.take() {
            task.cancel();
        }
        state.cancel_reset();
        info!("studio session shut down");
    }

    fn card(&self, class: &ClassSession) -> ClassCard {
        ClassCard::new(class.clone(), self.images.resolve(class.class_type))
    }

    fn booking_view(&self, state: &SessionState) -> BookingView {
        let booking = state.booking.state();
        let selected_class = booking.selected_class().and_then(|id| {
            state
                .catalog
                .as_deref()
                .and_then(|catalog| catalog.iter().find(|c| c.id == id))
                .map(|c| self.card(c))
        });
        BookingView {
            state: booking,
            booking_confirmed: booking.is_confirmed(),
            selected_class,
        }
    }
}

fn visible_classes(state: &SessionState) -> impl Iterator<Item = &ClassSession> {
    let catalog = state.catalog.as_deref().unwrap_or_default();
    state
        .visible
        .iter()
        .filter_map(move |id| catalog.iter().find(|c| c.id == *id))
}

async fn load_catalog(weak: Weak<Mutex<SessionState>>, loader: CatalogLoader) {
    let result = loader.load().await;
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let mut state = inner.lock().await;
    if let Some(task) = state.pending_load.take() {
        task.detach();
    }
    match result {
        Ok(catalog) => {
            state.catalog = Some(catalog);
            state.load_error = None;
        }
        Err(err) => {
            error!("Failed to load class catalog: {err}");
            state.load_error = Some(err);
        }
    }
    state.refresh();
}

async fn expire_confirmation(weak: Weak<Mutex<SessionState>>, ticket: u64, deadline: Instant) {
    tokio::time::sleep_until(deadline).await;
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let mut state = inner.lock().await;
    if state.reset_ticket != ticket {
        return;
    }
    if let Some(task) = state.pending_reset.take() {
        task.detach();
    }
    if state.booking.expire() {
        debug!("booking confirmation dismissed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::mock_catalog;
    use crate::images::AssetImageResolver;

    const CONFIRMATION: Duration = Duration::from_millis(3000);

    fn images() -> Arc<dyn ImageResolver> {
        Arc::new(AssetImageResolver::new("/assets"))
    }

    fn loaded() -> StudioSession {
        StudioSession::with_catalog(mock_catalog(), CONFIRMATION, images())
    }

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    async fn advance(ms: u64) {
        // spawned tasks must register their timers before the clock moves
        settle().await;
        tokio::time::advance(Duration::from_millis(ms)).await;
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_catalog_arrives_after_load_delay() {
        let session = StudioSession::new(CONFIRMATION, images());
        session
            .start_loading(CatalogLoader::new(Duration::from_millis(1000)))
            .await;

        assert!(session.is_loading().await);
        assert!(session.listing().await.loading);
        assert!(matches!(session.select(1).await, Err(StudioError::CatalogLoading)));

        advance(1001).await;
        assert!(!session.is_loading().await);
        assert_eq!(session.visible().await.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_suppresses_pending_load() {
        let session = StudioSession::new(CONFIRMATION, images());
        session
            .start_loading(CatalogLoader::new(Duration::from_millis(1000)))
            .await;
        session.shutdown().await;

        advance(5000).await;
        assert!(session.is_loading().await);
        assert!(matches!(session.catalog().await, Err(StudioError::CatalogLoading)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_load_surfaces_catalog_error() {
        let mut broken = mock_catalog();
        broken[2].enrolled = broken[2].capacity + 1;
        let session = StudioSession::new(CONFIRMATION, images());
        session
            .start_loading(CatalogLoader::with_sessions(Duration::from_millis(10), broken))
            .await;

        advance(11).await;
        assert!(!session.is_loading().await);
        let listing = session.listing().await;
        assert!(!listing.loading);
        assert!(listing.error.unwrap().starts_with("Class 3 is invalid"));
        assert!(listing.classes.is_empty());

        assert!(matches!(
            session.catalog().await,
            Err(StudioError::Catalog(CatalogError::InvalidSession { id: 3, .. }))
        ));
        assert!(matches!(session.select(3).await, Err(StudioError::Catalog(_))));
        assert!(matches!(session.book().await, Err(StudioError::Catalog(_))));
        assert_eq!(session.booking_state().await, BookingState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_filters_recompute_visible_list() {
        let session = loaded();
        session.set_query("yoga").await;
        let visible = session.visible().await;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Yoga Flow");

        session.clear_all().await;
        assert!(session.toggle_criterion(FilterCategory::Type, "Cardio").await);
        assert!(session.toggle_criterion(FilterCategory::Type, "Strength").await);
        assert!(session.visible().await.is_empty());

        let strength = FilterCriterion::new(FilterCategory::Type, "Strength");
        assert!(session.remove_criterion(&strength).await);
        assert!(!session.remove_criterion(&strength).await);
        let listing = session.listing().await;
        assert_eq!(listing.filters, ["type:Cardio"]);
        assert_eq!(listing.classes.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_booking_confirms_then_returns_to_idle() {
        let session = loaded();
        let selected = session.select(1).await.unwrap();
        assert_eq!(selected.name, "HIIT Cardio Blast");
        assert_eq!(session.booking_state().await, BookingState::Viewing { class_id: 1 });

        let booked = session.book().await.unwrap();
        assert_eq!(booked.enrolled, 13);
        let view = session.booking().await;
        assert!(view.booking_confirmed);
        assert_eq!(view.selected_class.unwrap().class.enrolled, 13);

        advance(2999).await;
        assert!(session.booking_state().await.is_confirmed());

        advance(2).await;
        assert_eq!(session.booking_state().await, BookingState::Idle);
        assert!(session.booking().await.selected_class.is_none());
        assert_eq!(session.class(1).await.unwrap().class.enrolled, 13);
    }

    #[tokio::test(start_paused = true)]
    async fn test_booked_class_updates_filtered_view() {
        let session = loaded();
        session.set_query("cardio").await;
        session.select(5).await.unwrap();
        session.book().await.unwrap();

        let visible = session.visible().await;
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[1].enrolled, 16);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_class_rejects_booking() {
        let mut catalog = mock_catalog();
        catalog[1].enrolled = catalog[1].capacity;
        let session = StudioSession::with_catalog(catalog, CONFIRMATION, images());

        session.select(2).await.unwrap();
        let err = session.book().await.unwrap_err();
        assert!(matches!(err, StudioError::CapacityExceeded { class_id: 2, .. }));
        assert_eq!(session.booking_state().await, BookingState::Viewing { class_id: 2 });
        assert_eq!(session.class(2).await.unwrap().class.enrolled, 15);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reselect_cancels_pending_reset() {
        let session = loaded();
        session.select(1).await.unwrap();
        session.book().await.unwrap();

        advance(2000).await;
        session.select(4).await.unwrap();
        advance(2000).await;
        assert_eq!(session.booking_state().await, BookingState::Viewing { class_id: 4 });

        session.book().await.unwrap();
        advance(3001).await;
        assert_eq!(session.booking_state().await, BookingState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_select_keeps_state() {
        let session = loaded();
        session.select(3).await.unwrap();
        assert!(matches!(session.select(99).await, Err(StudioError::NotFound(99))));
        assert_eq!(session.booking_state().await, BookingState::Viewing { class_id: 3 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_clears_confirmation() {
        let session = loaded();
        session.select(2).await.unwrap();
        session.book().await.unwrap();
        session.dismiss().await;
        assert_eq!(session.booking().await.state, BookingState::Idle);

        session.select(2).await.unwrap();
        advance(5000).await;
        assert_eq!(session.booking_state().await, BookingState::Viewing { class_id: 2 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_session_does_not_panic_pending_reset() {
        let session = loaded();
        session.select(1).await.unwrap();
        session.book().await.unwrap();
        drop(session);
        advance(5000).await;
    }

    #[tokio::test]
    async fn test_scheduled_task_cancel() {
        let task = ScheduledTask::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        assert!(!task.is_finished());
        task.cancel();
    }
}
