//! Worker API constants
//!
//! The worker takes a multipart upload and answers with a bare JSON
//! document, so there are no request structs here.

/// Multipart field the worker reads the dataset from
pub const DATASET_FIELD: &str = "data_file";

/// Content type attached to the dataset part
pub const DATASET_CONTENT_TYPE: &str = "text/csv";
