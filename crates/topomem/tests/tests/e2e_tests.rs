#[path = "e2e/closed_loop.rs"]
mod closed_loop;

#[path = "e2e/durable_memory.rs"]
mod durable_memory;

#[path = "e2e/concurrent_subjects.rs"]
mod concurrent_subjects;

#[path = "e2e/stream_sessions.rs"]
mod stream_sessions;

#[path = "e2e/report_ingestion.rs"]
mod report_ingestion;
