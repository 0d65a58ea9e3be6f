//! Router Module Index
//!
//! Splits routing by access level. Authentication is applied as a layer on the whole
//! authenticated router, so no protected endpoint can be mounted without it.

/// Routes accessible without credentials: health check and registration.
pub mod public;

/// The `/api` surface. Every route requires HTTP Basic credentials.
pub mod authenticated;
