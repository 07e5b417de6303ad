// Bounded polling of remote state

pub mod service;

pub use service::{FetchErrorPolicy, PollError, PollOutcome, PollService, PollSettings};
