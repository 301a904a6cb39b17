use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::ClassSession;

const UPCOMING_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DashboardTab {
    #[default]
    Upcoming,
    Workouts,
}

impl FromStr for DashboardTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(DashboardTab::Upcoming),
            "workouts" => Ok(DashboardTab::Workouts),
            other => Err(format!("unknown dashboard tab: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct StatCard {
    pub title: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct UpcomingClass {
    pub id: u32,
    pub name: String,
    pub trainer: String,
    pub time: String,
    pub duration: String,
    pub attendees: u32,
    pub max_attendees: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct WorkoutSummary {
    pub id: u32,
    pub name: String,
    pub date: String,
    pub exercises: u32,
    pub duration: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct DashboardView {
    pub greeting: String,
    pub tab: DashboardTab,
    pub stats: Vec<StatCard>,
    pub upcoming: Vec<UpcomingClass>,
    pub recent_workouts: Vec<WorkoutSummary>,
}

/// Member activity shown on the home view.
#[derive(Debug, Clone)]
pub struct MemberProfile {
    pub name: String,
    pub classes_attended: u32,
    pub workouts_completed: u32,
    pub active_trainers: u32,
    pub progress_score: u8,
    pub workouts: Vec<WorkoutSummary>,
}

impl MemberProfile {
    pub fn demo(name: impl Into<String>) -> Self {
        let workout = |id, name: &str, date: &str, exercises, duration: &str| WorkoutSummary {
            id,
            name: name.to_string(),
            date: date.to_string(),
            exercises,
            duration: duration.to_string(),
            completed: true,
        };
        Self {
            name: name.into(),
            classes_attended: 12,
            workouts_completed: 24,
            active_trainers: 8,
            progress_score: 78,
            workouts: vec![
                workout(1, "Upper Body", "Yesterday", 8, "45 min"),
                workout(2, "Cardio", "3 days ago", 5, "30 min"),
                workout(3, "Lower Body", "5 days ago", 7, "40 min"),
            ],
        }
    }

    fn stats(&self) -> Vec<StatCard> {
        let card = |title: &str, value: String| StatCard {
            title: title.to_string(),
            value,
        };
        vec![
            card("Classes Attended", self.classes_attended.to_string()),
            card("Workouts Completed", self.workouts_completed.to_string()),
            card("Active Trainers", self.active_trainers.to_string()),
            card("Progress Score", format!("{}%", self.progress_score)),
        ]
    }
}

/// The next few classes, earliest first.
pub fn upcoming_classes(catalog: &[ClassSession]) -> Vec<UpcomingClass> {
    let mut sorted: Vec<&ClassSession> = catalog.iter().collect();
    sorted.sort_by_key(|c| (c.date, c.time));
    sorted
        .into_iter()
        .take(UPCOMING_LIMIT)
        .map(|c| UpcomingClass {
            id: c.id,
            name: c.name.clone(),
            trainer: c.trainer.clone(),
            time: c.time.format("%-I:%M %p").to_string(),
            duration: c.duration.clone(),
            attendees: c.enrolled,
            max_attendees: c.capacity,
        })
        .collect()
}

pub fn build_dashboard(
    profile: &MemberProfile,
    catalog: &[ClassSession],
    tab: DashboardTab,
) -> DashboardView {
    DashboardView {
        greeting: format!("Welcome back, {}", profile.name),
        tab,
        stats: profile.stats(),
        upcoming: upcoming_classes(catalog),
        recent_workouts: profile.workouts.clone(),
    }
}
