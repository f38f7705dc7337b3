//! Request-level services: the ingestion pipeline, resolution engine and
//! the collaborators they share.

pub mod code_image;
pub mod ingest;
pub mod resolve;
pub mod scratch;
pub mod signer;
