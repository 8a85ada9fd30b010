// Shared fixtures live in common; one file per public surface.
mod common;

#[path = "mod_catalogue.rs"]
mod catalogue_tests;
#[path = "mod_cli.rs"]
mod cli_tests;
#[path = "mod_executor.rs"]
mod executor_tests;
#[path = "mod_logger.rs"]
mod logger_tests;
#[path = "mod_registry.rs"]
mod registry_tests;
#[path = "mod_store.rs"]
mod store_tests;
