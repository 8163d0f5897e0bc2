//! Command handlers
//!
//! This module contains the handlers a host UI calls into, one per user
//! action, plus the view snapshot they return.

pub mod recording;
