pub mod conversation;
pub mod image_ingestion;
pub mod translate;
