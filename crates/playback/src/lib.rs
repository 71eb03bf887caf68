//! Flow A side effects: pick link lines out of model text and open them as
//! browser tabs, one at a time.

pub mod link_filter;
pub mod tabs;

pub use link_filter::{filter_links, is_link_line, LINK_PREFIX};
pub use tabs::{
    LaunchError, RecordingLauncher, SystemBrowserLauncher, TabLauncher, TabOpener, TabOutcome,
    TabStatus, DEFAULT_TAB_PACING,
};
