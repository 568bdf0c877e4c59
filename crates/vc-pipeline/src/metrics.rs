//! Before/after metrics for a produced variant.

use vc_core::{CompressionPlan, CompressionResult, EncodeOutcome, SourceProbe};

/// `original / compressed`, or `0.0` when nothing was produced.
pub fn compression_ratio(original_size_bytes: u64, compressed_size_bytes: u64) -> f64 {
    if compressed_size_bytes == 0 {
        return 0.0;
    }
    original_size_bytes as f64 / compressed_size_bytes as f64
}

/// Map a finished plan to its result record.
///
/// `file_name` is always the planned output name; `output_path` is what a
/// consumer opens (the manifest for segmented output).
pub fn summarize(
    plan: &CompressionPlan,
    outcome: &EncodeOutcome,
    probe: &SourceProbe,
) -> CompressionResult {
    let compressed_size_bytes = outcome.compressed_size();

    CompressionResult {
        file_name: plan.output_file_name(),
        resolution_label: plan.target_label(),
        original_size_bytes: probe.size_bytes,
        compressed_size_bytes,
        compression_ratio: compression_ratio(probe.size_bytes, compressed_size_bytes),
        original_resolution_label: probe.resolution_label(),
        bitrate_bps: plan.preset.target_bitrate_bps,
        duration_seconds: probe.duration_seconds,
        output_path: outcome.output_path().to_path_buf(),
    }
}
