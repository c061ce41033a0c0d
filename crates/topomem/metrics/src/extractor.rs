use topomem_types::{MetricKind, MetricVector};

/// A producer of metric vectors.
///
/// Implementations are pure: the same input always yields the same vector,
/// and per-subject history lives with the caller, not the extractor.
pub trait MetricExtractor: Send + Sync {
    type Input: ?Sized;

    /// The channel alphabet this extractor emits.
    fn kind(&self) -> MetricKind;

    fn extract(&self, input: &Self::Input) -> MetricVector;
}
