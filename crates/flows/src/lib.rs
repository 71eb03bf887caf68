//! The two end-to-end flows.
//!
//! * [`MoodFlow`]: a free-text mood is turned into music keywords, then into
//!   YouTube links, which are opened as browser tabs.
//! * [`AdvisoryFlow`]: an assistant looks up the current weather for a
//!   location through [`WeatherTool`] and recommends clothing. The
//!   conversation is bounded, and a failed lookup is explained rather than
//!   papered over.
//!
//! Agents and tools are built per invocation from [`FlowSettings`].

pub mod advisory;
pub mod agents;
pub mod config;
pub mod mood;

pub use advisory::{
    advisory_request, failure_explanation, AdvisoryFlow, AdvisoryReport, WeatherTool,
    DEFAULT_LOCATION, WEATHER_TOOL_NAME,
};
pub use agents::{Agent, AgentProfile};
pub use config::{ConfigError, FlowSettings};
pub use mood::{MoodFlow, MoodFlowReport};
