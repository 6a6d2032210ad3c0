pub mod dataset_service;

pub use dataset_service::{DatasetInfo, DatasetService, DatasetSnapshot, DatasetStatus, QueryParams};
