pub mod identity;
pub mod ingest_service;
pub mod job_store;
pub mod normalizer;
pub mod salary_parser;
pub mod scraper_client;
pub mod tag_classifier;
