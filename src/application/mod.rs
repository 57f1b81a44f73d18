// Application layer - Cycling state machine, frame building and the dashboard session
pub mod cycle_controller;
pub mod display_service;
pub mod session;
pub mod snapshot_source;
