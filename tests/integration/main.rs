//! Integration scenarios for override chains, the facility and composition.

mod chain_test;
mod compose_test;
mod facility_test;
mod helpers;
