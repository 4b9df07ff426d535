use std::{
    collections::HashMap,
    sync::{Arc, Mutex, OnceLock, PoisonError},
};

use crate::{
    assets::decode::{DecodedImage, decode_image},
    assets::source::AssetSource,
    foundation::error::{MixError, MixResult},
};

type Slot = Arc<OnceLock<Result<Arc<DecodedImage>, CachedFailure>>>;

/// Concurrent decode-once cache over an [`AssetSource`].
///
/// Each distinct filename is loaded and decoded at most once per run, even
/// under parallel batch rendering: concurrent requesters for the same name
/// block on a per-key once-cell until the first decode finishes, then share
/// the resulting pixels. Failures are cached too, so a layer retried by a
/// later entry observes the same outcome as the first attempt.
pub struct ImageCache {
    source: Arc<dyn AssetSource>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl ImageCache {
    /// Cache decodes of `source`.
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self {
            source,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch and decode `filename`, or return the cached result.
    pub fn get(&self, filename: &str) -> MixResult<Arc<DecodedImage>> {
        let slot = {
            let mut slots = self
                .slots
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(filename.to_string()).or_default())
        };

        // The map lock is released before decoding; only requesters of this
        // exact filename wait on the once-cell.
        let result = slot.get_or_init(|| match self.load(filename) {
            Ok(image) => Ok(image),
            Err(e) => Err(CachedFailure::capture(&e)),
        });

        match result {
            Ok(image) => Ok(Arc::clone(image)),
            Err(failure) => Err(failure.replay()),
        }
    }

    fn load(&self, filename: &str) -> MixResult<Arc<DecodedImage>> {
        let bytes = self.source.read(filename)?;
        Ok(Arc::new(decode_image(&bytes)?))
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("ImageCache").field("cached", &cached).finish()
    }
}

/// Cloneable snapshot of a load/decode failure, replayed on later hits.
#[derive(Clone, Debug)]
struct CachedFailure {
    kind: FailureKind,
    message: String,
}

#[derive(Clone, Copy, Debug)]
enum FailureKind {
    NotFound,
    Decode,
    Other,
}

impl CachedFailure {
    fn capture(error: &MixError) -> Self {
        let (kind, message) = match error {
            MixError::AssetNotFound(f) => (FailureKind::NotFound, f.clone()),
            MixError::Decode(m) => (FailureKind::Decode, m.clone()),
            other => (FailureKind::Other, other.to_string()),
        };
        Self { kind, message }
    }

    fn replay(&self) -> MixError {
        match self.kind {
            FailureKind::NotFound => MixError::AssetNotFound(self.message.clone()),
            FailureKind::Decode => MixError::Decode(self.message.clone()),
            FailureKind::Other => anyhow::anyhow!("{}", self.message).into(),
        }
    }
}
