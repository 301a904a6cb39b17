use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::ClassSession;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FilterCategory {
    Type,
    Level,
    Trainer,
}

impl FilterCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterCategory::Type => "type",
            FilterCategory::Level => "level",
            FilterCategory::Trainer => "trainer",
        }
    }

    fn matches(self, class: &ClassSession, value: &str) -> bool {
        match self {
            FilterCategory::Type => class.class_type.label() == value,
            FilterCategory::Level => class.level.label() == value,
            FilterCategory::Trainer => class.trainer == value,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CriterionParseError {
    #[error("Filter must look like category:value")]
    MissingSeparator,
    #[error("Unknown filter category: {0}")]
    UnknownCategory(String),
    #[error("Filter value must not be empty")]
    EmptyValue,
}

impl FromStr for FilterCategory {
    type Err = CriterionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "type" => Ok(FilterCategory::Type),
            "level" => Ok(FilterCategory::Level),
            "trainer" => Ok(FilterCategory::Trainer),
            other => Err(CriterionParseError::UnknownCategory(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub struct FilterCriterion {
    pub category: FilterCategory,
    pub value: String,
}

impl FilterCriterion {
    pub fn new(category: FilterCategory, value: impl Into<String>) -> Self {
        Self {
            category,
            value: value.into(),
        }
    }

    pub fn matches(&self, class: &ClassSession) -> bool {
        self.category.matches(class, &self.value)
    }
}

impl fmt::Display for FilterCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category.as_str(), self.value)
    }
}

impl FromStr for FilterCriterion {
    type Err = CriterionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (category, value) = s
            .split_once(':')
            .ok_or(CriterionParseError::MissingSeparator)?;
        if value.is_empty() {
            return Err(CriterionParseError::EmptyValue);
        }
        Ok(Self::new(category.parse()?, value))
    }
}

fn matches_query(class: &ClassSession, needle: &str) -> bool {
    class.name.to_lowercase().contains(needle)
        || class.trainer.to_lowercase().contains(needle)
        || class.class_type.label().to_lowercase().contains(needle)
}

/// Returns the classes matching the text query and every criterion, in
/// catalog order.
///
/// Criteria are ANDed even within one category, so two active `type` values
/// never match anything.
pub fn filter_sessions<'a>(
    catalog: &'a [ClassSession],
    query: &str,
    criteria: &[FilterCriterion],
) -> Vec<&'a ClassSession> {
    let needle = query.to_lowercase();
    catalog
        .iter()
        .filter(|class| needle.is_empty() || matches_query(class, &needle))
        .filter(|class| criteria.iter().all(|c| c.matches(class)))
        .collect()
}

/// Search box contents plus the active filter tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    query: String,
    criteria: Vec<FilterCriterion>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Active criteria in the order they were switched on.
    pub fn criteria(&self) -> &[FilterCriterion] {
        &self.criteria
    }

    pub fn contains(&self, criterion: &FilterCriterion) -> bool {
        self.criteria.contains(criterion)
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
    }

    /// Adds the criterion if it is absent, removes it otherwise. Returns
    /// whether it is active afterwards.
    pub fn toggle_criterion(&mut self, category: FilterCategory, value: &str) -> bool {
        if let Some(pos) = self
            .criteria
            .iter()
            .position(|c| c.category == category && c.value == value)
        {
            self.criteria.remove(pos);
            false
        } else {
            self.criteria.push(FilterCriterion::new(category, value));
            true
        }
    }

    pub fn clear_all(&mut self) {
        self.query.clear();
        self.criteria.clear();
    }

    pub fn apply<'a>(&self, catalog: &'a [ClassSession]) -> Vec<&'a ClassSession> {
        filter_sessions(catalog, &self.query, &self.criteria)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::mock_catalog;

    fn names(classes: &[&ClassSession]) -> Vec<String> {
        classes.iter().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let catalog = mock_catalog();
        let result = filter_sessions(&catalog, "", &[]);
        assert_eq!(result.len(), catalog.len());
    }

    #[test]
    fn test_query_yoga_matches_single_class() {
        let catalog = mock_catalog();
        let result = filter_sessions(&catalog, "yoga", &[]);
        assert_eq!(names(&result), ["Yoga Flow"]);
    }

    #[test]
    fn test_query_is_case_insensitive_across_fields() {
        let catalog = mock_catalog();
        // trainer
        assert_eq!(names(&filter_sessions(&catalog, "EMMA", &[])), ["Pilates Core"]);
        // type label, keeps catalog order
        assert_eq!(
            names(&filter_sessions(&catalog, "cardio", &[])),
            ["HIIT Cardio Blast", "Spin Class"]
        );
        // location is not searched
        assert!(filter_sessions(&catalog, "weights room", &[]).is_empty());
    }

    #[test]
    fn test_query_results_always_contain_needle() {
        let catalog = mock_catalog();
        for query in ["a", "in", "ST", "son", "zzz", "l"] {
            let needle = query.to_lowercase();
            for class in filter_sessions(&catalog, query, &[]) {
                assert!(
                    class.name.to_lowercase().contains(&needle)
                        || class.trainer.to_lowercase().contains(&needle)
                        || class.class_type.label().to_lowercase().contains(&needle)
                );
            }
        }
    }

    #[test]
    fn test_criteria_are_anded() {
        let catalog = mock_catalog();
        let cardio = FilterCriterion::new(FilterCategory::Type, "Cardio");
        let jason = FilterCriterion::new(FilterCategory::Trainer, "Jason Lee");
        assert_eq!(
            names(&filter_sessions(&catalog, "", &[cardio.clone(), jason])),
            ["Spin Class"]
        );

        let strength = FilterCriterion::new(FilterCategory::Type, "Strength");
        assert!(filter_sessions(&catalog, "", &[cardio, strength]).is_empty());
    }

    #[test]
    fn test_every_result_matches_every_criterion() {
        let catalog = mock_catalog();
        let criteria = vec![
            FilterCriterion::new(FilterCategory::Level, "Intermediate"),
            FilterCriterion::new(FilterCategory::Type, "Cardio"),
        ];
        let result = filter_sessions(&catalog, "", &criteria);
        assert_eq!(result.len(), 2);
        for class in result {
            assert!(criteria.iter().all(|c| c.matches(class)));
        }
    }

    #[test]
    fn test_level_value_uses_display_label() {
        let catalog = mock_catalog();
        let all_levels = FilterCriterion::new(FilterCategory::Level, "All Levels");
        assert_eq!(names(&filter_sessions(&catalog, "", &[all_levels])), ["Yoga Flow"]);
    }

    #[test]
    fn test_query_and_criteria_combine() {
        let catalog = mock_catalog();
        let studio = FilterCriterion::new(FilterCategory::Type, "Cardio");
        assert_eq!(names(&filter_sessions(&catalog, "spin", &[studio])), ["Spin Class"]);
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let mut state = FilterState::new();
        state.toggle_criterion(FilterCategory::Level, "Beginner");
        let before = state.clone();

        assert!(state.toggle_criterion(FilterCategory::Type, "Yoga"));
        assert_eq!(state.criteria().len(), 2);
        assert!(!state.toggle_criterion(FilterCategory::Type, "Yoga"));
        assert_eq!(state, before);
    }

    #[test]
    fn test_toggle_keeps_insertion_order() {
        let mut state = FilterState::new();
        state.toggle_criterion(FilterCategory::Trainer, "Mike Davis");
        state.toggle_criterion(FilterCategory::Type, "Strength");
        state.toggle_criterion(FilterCategory::Level, "Advanced");
        state.toggle_criterion(FilterCategory::Type, "Strength");

        let tags: Vec<String> = state.criteria().iter().map(|c| c.to_string()).collect();
        assert_eq!(tags, ["trainer:Mike Davis", "level:Advanced"]);
    }

    #[test]
    fn test_clear_all() {
        let mut state = FilterState::new();
        state.set_query("flow");
        state.toggle_criterion(FilterCategory::Type, "Yoga");
        assert_eq!(state.criteria().len(), 1);

        state.clear_all();
        assert_eq!(state.query(), "");
        assert!(state.criteria().is_empty());
        assert_eq!(state.apply(&mock_catalog()).len(), 5);
    }

    #[test]
    fn test_parse_criterion() {
        let parsed: FilterCriterion = "level:All Levels".parse().unwrap();
        assert_eq!(parsed, FilterCriterion::new(FilterCategory::Level, "All Levels"));
        assert_eq!(parsed.to_string(), "level:All Levels");

        assert_eq!(
            "Cardio".parse::<FilterCriterion>(),
            Err(CriterionParseError::MissingSeparator)
        );
        assert_eq!(
            "room:Studio A".parse::<FilterCriterion>(),
            Err(CriterionParseError::UnknownCategory("room".into()))
        );
        assert_eq!(
            "type:".parse::<FilterCriterion>(),
            Err(CriterionParseError::EmptyValue)
        );
    }
}
