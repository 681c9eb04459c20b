pub mod address;
pub mod classify;
pub mod date;
pub mod engine;
pub mod form;
pub mod height;
pub mod sequencer;
pub mod store;
pub mod transform;
pub mod types;
pub mod validate;
