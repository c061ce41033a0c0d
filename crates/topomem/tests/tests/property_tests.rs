#[path = "property/cycle_forming.rs"]
mod cycle_forming;

#[path = "property/threshold_order.rs"]
mod threshold_order;

#[path = "property/memory_log.rs"]
mod memory_log;
