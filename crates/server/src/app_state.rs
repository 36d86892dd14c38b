use dashboard_api::{dashboard_controls, DashboardContext};
use shared::{domain::AboutText, protocol::DashboardControls};

/// Everything a request needs; built once before the listener binds.
pub(crate) struct AppState {
    pub(crate) api: DashboardContext,
    pub(crate) about: AboutText,
    pub(crate) controls: DashboardControls,
}

impl AppState {
    pub(crate) fn new(api: DashboardContext, about: AboutText) -> Self {
        let controls = dashboard_controls(&api.dataset);
        Self {
            api,
            about,
            controls,
        }
    }
}
