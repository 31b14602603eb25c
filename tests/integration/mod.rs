//! Integration tests for the Shield integrity monitor

mod baseline_roundtrip;
mod cli_commands;
mod drift_properties;
mod drift_scenarios;
mod test_utils;
