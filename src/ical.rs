use chrono::{Duration, NaiveDateTime};
use icalendar::{Calendar, Component, Event, EventLike};

use crate::models::ClassSession;

#[derive(Clone)]
pub struct ICalExporter {
    studio_name: String,
}

impl Default for ICalExporter {
    fn default() -> Self {
        Self::new("Studio")
    }
}

/// Minutes from a label such as "45 min"; one hour when it cannot be read.
fn duration_minutes(label: &str) -> i64 {
    label
        .split_whitespace()
        .next()
        .and_then(|n| n.parse::<i64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(60)
}

impl ICalExporter {
    pub fn new(studio_name: impl Into<String>) -> Self {
        Self {
            studio_name: studio_name.into(),
        }
    }

    pub fn generate(&self, classes: &[ClassSession]) -> Vec<u8> {
        if classes.is_empty() {
            return Vec::new();
        }

        let mut calendar = Calendar::new();
        calendar.name(&format!("{} Classes", self.studio_name));

        for class in classes {
            let start = NaiveDateTime::new(class.date, class.time);
            let end = start + Duration::minutes(duration_minutes(&class.duration));

            let mut event = Event::new();
            event.summary(&format!("{}: {}", class.class_type, class.name));
            event.starts(start);
            event.ends(end);
            event.location(&format!("{}, {}", class.location, self.studio_name));
            event.description(&format!(
                "{}\nTrainer: {}\nLevel: {}\nSpots left: {}",
                class.description,
                class.trainer,
                class.level,
                class.spots_left()
            ));
            event.uid(&format!(
                "{}-{}-studio-booking",
                start.format("%Y%m%dT%H%M%S"),
                class.id
            ));
            calendar.push(event);
        }

        calendar.to_string().into_bytes()
    }
}
