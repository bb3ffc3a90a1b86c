use thiserror::Error;

/// A single subscriber could not take a frame.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// The subscriber disconnected.
    #[error("subscriber closed")]
    Closed,

    /// The subscriber's buffer is full; this frame is dropped for it.
    #[error("subscriber buffer full")]
    Full,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("initial delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}
