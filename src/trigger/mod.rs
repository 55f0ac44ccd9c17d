//! Visibility trigger module
//!
//! Fetches the next page when a bound element scrolls into view.
//!
//! # Overview
//!
//! The trigger module provides:
//! - `VisibilitySource` - Trait for the external intersection observer
//! - `VisibilityTrigger` - Binds elements to a pager through a source
//! - `Gate` - Fixed or re-evaluated condition checked on every event
//! - `BindingHandle` - Removes a single binding
//!
//! A binding only subscribes when its gate is open at bind time. Events for
//! subscribed elements re-check the gate, the end-of-data flag and the loading
//! flag before running the bound action.

mod binding;
mod types;

pub use binding::{BindingHandle, VisibilityTrigger};
pub use types::{Action, Gate, VisibilityCallback, VisibilityEvent, VisibilitySource};
