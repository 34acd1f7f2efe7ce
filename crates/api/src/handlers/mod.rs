pub mod ingest;
pub mod register;
