//! Fact and reference tables read by the dashboards.

pub mod chemical_inventory;
pub mod chemical_usage;
pub mod daily_production_log;
pub mod energy_usage;
pub mod environmental_metric;
pub mod equipment_status_log;
pub mod explosives_inventory;
pub mod explosives_usage;
pub mod labor_metric;
pub mod machinery;
pub mod maintenance_record;
pub mod mining_department;
pub mod mining_site;
pub mod safety_incident;
