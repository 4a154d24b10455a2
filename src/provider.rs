use std::pin::Pin;

use futures_util::Stream;
use generation_api::GenerateRequest;

pub use futures_util::future::BoxFuture;
pub use generation_api::CancellationSignal;

use crate::error::ProviderError;

/// Raw response body chunks, in arrival order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, ProviderError>> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider_id: String,
    pub endpoint: String,
}

/// Opens one streaming generation request.
///
/// Implementations resolve to an error for rejected requests (non-success
/// status) and connection failures; a successfully opened stream may still
/// yield an error item if the connection drops mid-body.
pub trait GenerationProvider: Send + Sync + 'static {
    fn profile(&self) -> ProviderProfile;

    fn open_stream(
        &self,
        request: GenerateRequest,
        cancel: CancellationSignal,
    ) -> BoxFuture<'static, Result<ChunkStream, ProviderError>>;
}
