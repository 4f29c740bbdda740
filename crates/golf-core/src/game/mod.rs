pub mod action;
pub mod error;
pub mod serialization;
pub mod state;
pub mod view;
