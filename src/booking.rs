use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::StudioError;
use crate::models::ClassSession;

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BookingState {
    #[default]
    Idle,
    Viewing { class_id: u32 },
    Booking { class_id: u32 },
    Confirmed { class_id: u32 },
}

impl BookingState {
    pub fn selected_class(self) -> Option<u32> {
        match self {
            BookingState::Idle => None,
            BookingState::Viewing { class_id }
            | BookingState::Booking { class_id }
            | BookingState::Confirmed { class_id } => Some(class_id),
        }
    }

    pub fn is_confirmed(self) -> bool {
        matches!(self, BookingState::Confirmed { .. })
    }
}

/// Selection and booking flow for one class at a time.
#[derive(Debug, Default)]
pub struct BookingMachine {
    state: BookingState,
}

impl BookingMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BookingState {
        self.state
    }

    /// Moves to `Viewing` for the given class. Unknown ids leave the state
    /// untouched and return `false`.
    pub fn select(&mut self, catalog: &[ClassSession], class_id: u32) -> bool {
        if !catalog.iter().any(|c| c.id == class_id) {
            return false;
        }
        self.state = BookingState::Viewing { class_id };
        true
    }

    pub fn dismiss(&mut self) {
        self.state = BookingState::Idle;
    }

    /// Confirmation window elapsed.
    pub fn expire(&mut self) -> bool {
        if self.state.is_confirmed() {
            self.state = BookingState::Idle;
            return true;
        }
        false
    }

    /// Takes one spot in the selected class. Only valid while `Viewing`; a
    /// full class is rejected and the state stays `Viewing`.
    pub fn book(&mut self, catalog: &mut [ClassSession]) -> Result<ClassSession, StudioError> {
        let BookingState::Viewing { class_id } = self.state else {
            return Err(StudioError::NoSelection);
        };
        self.state = BookingState::Booking { class_id };

        let Some(class) = catalog.iter_mut().find(|c| c.id == class_id) else {
            self.state = BookingState::Idle;
            return Err(StudioError::NotFound(class_id));
        };

        if class.is_full() {
            warn!(class_id, capacity = class.capacity, "booking rejected, class is full");
            self.state = BookingState::Viewing { class_id };
            return Err(StudioError::CapacityExceeded {
                class_id,
                capacity: class.capacity,
            });
        }

        class.enrolled += 1;
        info!(
            class_id,
            enrolled = class.enrolled,
            capacity = class.capacity,
            "class booked"
        );
        self.state = BookingState::Confirmed { class_id };
        Ok(class.clone())
    }
}
