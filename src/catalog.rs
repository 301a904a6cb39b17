use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::filter::FilterCategory;
use crate::models::{ClassSession, ClassType, Level};
use crate::validation::validate_catalog;

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Class {id} is invalid: {reason}")]
    InvalidSession { id: u32, reason: String },
    #[error("Class id {0} appears more than once")]
    DuplicateId(u32),
}

/// Loads the class catalog after a fixed, simulated latency.
#[derive(Clone, Debug)]
pub struct CatalogLoader {
    delay: Duration,
    sessions: Vec<ClassSession>,
}

impl CatalogLoader {
    pub fn new(delay: Duration) -> Self {
        Self::with_sessions(delay, mock_catalog())
    }

    pub fn with_sessions(delay: Duration, sessions: Vec<ClassSession>) -> Self {
        Self { delay, sessions }
    }

    pub async fn load(&self) -> Result<Vec<ClassSession>, CatalogError> {
        debug!(delay_ms = self.delay.as_millis() as u64, "loading class catalog");
        tokio::time::sleep(self.delay).await;
        validate_catalog(&self.sessions)?;
        info!(classes = self.sessions.len(), "class catalog loaded");
        Ok(self.sessions.clone())
    }
}

#[allow(clippy::too_many_arguments)]
fn session(
    id: u32,
    name: &str,
    trainer: &str,
    (hour, minute): (u32, u32),
    day: u32,
    duration: &str,
    location: &str,
    (capacity, enrolled): (u32, u32),
    class_type: ClassType,
    level: Level,
    description: &str,
) -> ClassSession {
    ClassSession {
        id,
        name: name.to_string(),
        trainer: trainer.to_string(),
        time: NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN),
        date: NaiveDate::from_ymd_opt(2023, 11, day).unwrap_or_default(),
        duration: duration.to_string(),
        location: location.to_string(),
        capacity,
        enrolled,
        class_type,
        level,
        description: description.to_string(),
    }
}

/// The studio's fixed schedule.
pub fn mock_catalog() -> Vec<ClassSession> {
    vec![
        session(
            1,
            "HIIT Cardio Blast",
            "Alex Johnson",
            (10, 0),
            15,
            "45 min",
            "Studio A",
            (20, 12),
            ClassType::Cardio,
            Level::Intermediate,
            "High-intensity interval training to boost your cardio fitness and burn calories.",
        ),
        session(
            2,
            "Yoga Flow",
            "Sarah Miller",
            (12, 30),
            15,
            "60 min",
            "Studio B",
            (15, 8),
            ClassType::Yoga,
            Level::AllLevels,
            "A flowing sequence of yoga poses to improve flexibility and reduce stress.",
        ),
        session(
            3,
            "Strength Training",
            "Mike Davis",
            (16, 0),
            15,
            "50 min",
            "Weights Room",
            (10, 6),
            ClassType::Strength,
            Level::Advanced,
            "Build muscle and increase strength with focused weight training exercises.",
        ),
        session(
            4,
            "Pilates Core",
            "Emma Wilson",
            (9, 0),
            16,
            "45 min",
            "Studio B",
            (12, 5),
            ClassType::Pilates,
            Level::Beginner,
            "Focus on core strength and stability with controlled Pilates movements.",
        ),
        session(
            5,
            "Spin Class",
            "Jason Lee",
            (18, 0),
            16,
            "45 min",
            "Spin Studio",
            (20, 15),
            ClassType::Cardio,
            Level::Intermediate,
            "High-energy indoor cycling workout with music and motivation.",
        ),
    ]
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct FilterGroup {
    pub id: FilterCategory,
    pub name: String,
    pub options: Vec<String>,
}

/// Values offered by the filter panel, one group per category.
pub fn filter_options(catalog: &[ClassSession]) -> Vec<FilterGroup> {
    let mut trainers: Vec<String> = Vec::new();
    for class in catalog {
        if !trainers.contains(&class.trainer) {
            trainers.push(class.trainer.clone());
        }
    }

    vec![
        FilterGroup {
            id: FilterCategory::Type,
            name: "Class Type".to_string(),
            options: ClassType::ALL.iter().map(|t| t.to_string()).collect(),
        },
        FilterGroup {
            id: FilterCategory::Level,
            name: "Level".to_string(),
            options: Level::ALL.iter().map(|l| l.to_string()).collect(),
        },
        FilterGroup {
            id: FilterCategory::Trainer,
            name: "Trainer".to_string(),
            options: trainers,
        },
    ]
}
