// src/upload/mod.rs

pub mod batches;
pub mod distributor;
pub mod models;
pub mod parser;
pub mod service;

pub use batches::{group_batches, UploadBatch};
pub use distributor::{distribute, share_sizes, DistributionAssignment};
pub use models::{ContactRecord, FileInfo, UploadRequest, UploadSummary};
pub use parser::{parse_contacts, FileFormat, ParseError};
pub use service::{handle_upload, UploadError};
