//! Dataset transfer
//!
//! Owns the one side effect of uploading the dataset to the worker. The
//! payload is loaded on the first attempt and reused by retries.

use bytes::Bytes;
use mlpipe_client::WorkerApi;
use tokio::sync::OnceCell;
use tracing::info;

use crate::dataset::Dataset;
use crate::error::Result;

/// Uploads a session's dataset
#[derive(Debug, Default)]
pub struct TransferAgent {
    payload: OnceCell<Bytes>,
}

impl TransferAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends the dataset to the worker
    ///
    /// # Arguments
    /// * `dataset` - The session's dataset
    /// * `worker` - Client for the assigned worker
    pub async fn send(&self, dataset: &Dataset, worker: &dyn WorkerApi) -> Result<()> {
        let payload = self
            .payload
            .get_or_try_init(|| dataset.read())
            .await?
            .clone();

        let size = payload.len();
        worker.post_data(dataset.file_name(), payload).await?;

        info!("Uploaded dataset {} ({} bytes)", dataset.file_name(), size);
        Ok(())
    }
}
