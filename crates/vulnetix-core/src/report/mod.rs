pub mod render;

pub use render::{
    DASHBOARD_URL, dashboard_url, render_assessment, render_config_summary, render_validation,
};
