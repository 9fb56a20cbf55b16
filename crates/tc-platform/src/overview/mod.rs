//! Overview Compositor

pub mod api;
pub mod service;
pub mod view;

pub use api::{overview_router, OverviewApiState};
pub use service::OverviewService;
pub use view::OverviewView;
