use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum ClassType {
    Cardio,
    Strength,
    Yoga,
    Pilates,
}

impl ClassType {
    pub const ALL: [ClassType; 4] = [
        ClassType::Cardio,
        ClassType::Strength,
        ClassType::Yoga,
        ClassType::Pilates,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ClassType::Cardio => "Cardio",
            ClassType::Strength => "Strength",
            ClassType::Yoga => "Yoga",
            ClassType::Pilates => "Pilates",
        }
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ClassType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClassType::ALL
            .into_iter()
            .find(|t| t.label() == s)
            .ok_or_else(|| format!("unknown class type: {s}"))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
    #[serde(rename = "All Levels")]
    AllLevels,
}

impl Level {
    pub const ALL: [Level; 4] = [
        Level::Beginner,
        Level::Intermediate,
        Level::Advanced,
        Level::AllLevels,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
            Level::AllLevels => "All Levels",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|l| l.label() == s)
            .ok_or_else(|| format!("unknown level: {s}"))
    }
}

/// A single scheduled class. Everything except `enrolled` is fixed once the
/// catalog is loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ClassSession {
    pub id: u32,
    pub name: String,
    pub trainer: String,
    #[schema(value_type = String, format = "time", example = "10:00:00")]
    pub time: NaiveTime,
    #[schema(value_type = String, format = "date", example = "2023-11-15")]
    pub date: NaiveDate,
    pub duration: String,
    pub location: String,
    pub capacity: u32,
    pub enrolled: u32,
    #[serde(rename = "type")]
    pub class_type: ClassType,
    pub level: Level,
    pub description: String,
}

impl ClassSession {
    pub fn is_full(&self) -> bool {
        self.enrolled >= self.capacity
    }

    pub fn spots_left(&self) -> u32 {
        self.capacity.saturating_sub(self.enrolled)
    }

    /// Short date shown on class cards, e.g. "Nov 15".
    pub fn date_label(&self) -> String {
        self.date.format("%b %-d").to_string()
    }
}

/// Class as rendered by the list and detail views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ClassCard {
    #[serde(flatten)]
    pub class: ClassSession,
    pub date_label: String,
    pub spots_left: u32,
    pub is_full: bool,
    pub image: Option<String>,
}

impl ClassCard {
    pub fn new(class: ClassSession, image: Option<String>) -> Self {
        Self {
            date_label: class.date_label(),
            spots_left: class.spots_left(),
            is_full: class.is_full(),
            image,
            class,
        }
    }
}
