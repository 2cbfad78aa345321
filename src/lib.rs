#![doc(test(attr(deny(warnings))))]

//! Backoffice Core implements the state machinery behind the administration
//! console's multi-step entity editors: draft persistence across wizard
//! steps, cascading field auto-population, and reconciled editable
//! sub-resource collections.

pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Backoffice Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
