// Read access to the fact tables
pub mod fact_store;

// Per-domain dashboard assembly
pub mod dashboard;
