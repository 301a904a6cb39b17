use utoipa::OpenApi;

use crate::booking::BookingState;
use crate::catalog::FilterGroup;
use crate::dashboard::{DashboardTab, DashboardView, StatCard, UpcomingClass, WorkoutSummary};
use crate::filter::{FilterCategory, FilterCriterion};
use crate::handlers::{CriterionToggle, DarkModeUpdate, QueryUpdate, SelectRequest};
use crate::models::{ClassCard, ClassSession, ClassType, Level};
use crate::preferences::DisplayPreferences;
use crate::session::{BookingView, ClassListing};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::list_classes,
        crate::handlers::get_filter_options,
        crate::handlers::get_class,
        crate::handlers::set_query,
        crate::handlers::toggle_filter,
        crate::handlers::clear_filters,
        crate::handlers::remove_filter,
        crate::handlers::get_ical,
        crate::handlers::get_booking,
        crate::handlers::select_class,
        crate::handlers::dismiss_booking,
        crate::handlers::confirm_booking,
        crate::handlers::get_dashboard,
        crate::handlers::get_preferences,
        crate::handlers::set_dark_mode,
        crate::handlers::toggle_dark_mode
    ),
    components(schemas(
        ClassSession,
        ClassCard,
        ClassType,
        Level,
        FilterCategory,
        FilterCriterion,
        FilterGroup,
        BookingState,
        BookingView,
        ClassListing,
        DashboardTab,
        DashboardView,
        StatCard,
        UpcomingClass,
        WorkoutSummary,
        DisplayPreferences,
        QueryUpdate,
        CriterionToggle,
        SelectRequest,
        DarkModeUpdate
    )),
    tags(
        (name = "studio", description = "Service status"),
        (name = "classes", description = "Class catalog and filters"),
        (name = "booking", description = "Class selection and booking"),
        (name = "dashboard", description = "Member dashboard"),
        (name = "preferences", description = "Display preferences")
    ),
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_booking_paths() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();
        let paths = json["paths"].as_object().unwrap();
        assert!(paths.contains_key("/classes"));
        assert!(paths.contains_key("/booking/confirm"));
        assert!(paths.contains_key("/classes/filters/{tag}"));
    }
}
