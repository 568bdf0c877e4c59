//! End-to-end tests for the processing pipeline over fake capabilities.

mod common;

use std::path::Path;
use std::time::Duration;

use assert_matches::assert_matches;
use common::{Behavior, FakeEncoder, FakeProber, TestHarness, SINGLE_FILE_SIZE};
use tokio_util::sync::CancellationToken;
use vc_core::{CompressionConfig, EncodeCause, Error, OutputFormat, OutputSpec};
use vc_pipeline::Upload;

const SOURCE_BYTES: usize = 65_536;

fn upload(name: &str) -> Upload {
    Upload::from_bytes(name.to_string(), vec![7u8; SOURCE_BYTES])
}

fn config(resolutions: &[&str]) -> CompressionConfig {
    CompressionConfig {
        resolutions: resolutions.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

#[tokio::test]
async fn hd_and_original_produce_two_results() {
    let h = TestHarness::new();
    let report = h
        .pipeline
        .process_upload(upload("holiday.mov"), &config(&["HD", "ORIGINAL"]), &CancellationToken::new())
        .await
        .unwrap();

    assert!(report.is_complete());
    let labels: Vec<_> = report.results.iter().map(|r| r.resolution_label.as_str()).collect();
    assert_eq!(labels, ["1280x720", "1920x1080"]);

    for result in &report.results {
        assert_eq!(result.bitrate_bps, 2_000_000);
        assert_eq!(result.duration_seconds, 60);
        assert_eq!(result.original_resolution_label, "1920x1080");
        assert_eq!(result.original_size_bytes, SOURCE_BYTES as u64);
        assert_eq!(result.compressed_size_bytes, SINGLE_FILE_SIZE as u64);
        assert_eq!(result.compression_ratio, 16.0);
        assert!(result.output_path.exists());
    }
    assert_eq!(report.results[0].file_name, "holiday_720p.mp4");
    assert_eq!(report.results[1].file_name, "holiday_compressed.mp4");
    assert_eq!(
        report.results[1].output_path,
        h.output_dir().join("holiday_compressed.mp4")
    );
}

#[tokio::test]
async fn staged_upload_is_removed_after_success() {
    let h = TestHarness::new();
    h.pipeline
        .process_upload(upload("clip.mp4"), &config(&["SD"]), &CancellationToken::new())
        .await
        .unwrap();

    let calls = h.prober.calls.lock().clone();
    assert_eq!(calls.len(), 1);
    let (staged_path, existed) = &calls[0];
    assert!(existed);
    assert_eq!(staged_path.extension().unwrap(), "mp4");
    assert_ne!(staged_path.file_stem().unwrap(), "clip");
    assert!(!staged_path.exists());
    assert!(h.staged_files().is_empty());
}

#[tokio::test]
async fn segmented_output_sums_segments() {
    let h = TestHarness::new();
    let cfg = CompressionConfig {
        output_format: OutputFormat::Segmented,
        ..config(&["ORIGINAL"])
    };
    let report = h
        .pipeline
        .process_upload(upload("talk.mp4"), &cfg, &CancellationToken::new())
        .await
        .unwrap();

    let result = &report.results[0];
    assert_eq!(result.compressed_size_bytes, 6_291_456);
    assert_eq!(
        result.output_path,
        h.output_dir().join("talk_compressed_hls").join("stream.m3u8")
    );
    assert!(result.output_path.exists());

    let requests = h.encoder.requests.lock();
    assert_matches!(
        &requests[0].output,
        OutputSpec::Segmented { segment_duration_secs: 10, segment_pattern, .. } if segment_pattern == "segment%d.ts"
    );
}

#[tokio::test]
async fn segmented_size_ignores_non_segment_files() {
    let mut encoder = FakeEncoder::new();
    encoder.stray_file = true;
    encoder.segment_count = 2;
    encoder.segment_size = 1_000;
    let h = TestHarness::with(FakeProber::new(1280, 720, 5.0), encoder, 1);

    let cfg = CompressionConfig {
        output_format: OutputFormat::Segmented,
        ..config(&["LOW"])
    };
    let report = h
        .pipeline
        .process_upload(upload("a.mp4"), &cfg, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.results[0].compressed_size_bytes, 2_000);
}

#[tokio::test]
async fn missing_segment_dir_reports_zero_size() {
    let encoder = FakeEncoder::new().when_output_contains("_360p", Behavior::SucceedWithoutSegmentDir);
    let h = TestHarness::with(FakeProber::new(1280, 720, 5.0), encoder, 1);

    let cfg = CompressionConfig {
        output_format: OutputFormat::Segmented,
        ..config(&["LOW", "ORIGINAL"])
    };
    let report = h
        .pipeline
        .process_upload(upload("a.mp4"), &cfg, &CancellationToken::new())
        .await
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.results.len(), 2);

    let low = &report.results[0];
    assert_eq!(low.resolution_label, "640x360");
    assert_eq!(low.compressed_size_bytes, 0);
    assert_eq!(low.compression_ratio, 0.0);
    assert_eq!(
        low.output_path,
        h.output_dir().join("a_360p_hls").join("stream.m3u8")
    );

    // The sibling plan is measured normally.
    assert_eq!(report.results[1].compressed_size_bytes, 6_291_456);
}

#[tokio::test]
async fn invalid_selector_does_no_work() {
    let h = TestHarness::new();
    let result = h
        .pipeline
        .process_upload(upload("a.mp4"), &config(&["HD", "CUSTOM_abcx360"]), &CancellationToken::new())
        .await;

    assert_matches!(
        result,
        Err(Error::InvalidResolutionSelector { selector, .. }) if selector == "CUSTOM_abcx360"
    );
    assert_eq!(h.encoder.call_count(), 0);
    assert!(h.prober.probed_paths().is_empty());
    assert!(h.staged_files().is_empty());
}

#[tokio::test]
async fn probe_failure_still_cleans_up() {
    let h = TestHarness::with(FakeProber::failing(), FakeEncoder::new(), 1);
    let result = h
        .pipeline
        .process_upload(upload("broken.mp4"), &config(&["HD"]), &CancellationToken::new())
        .await;

    assert_matches!(result, Err(Error::Probe(_)));
    assert_eq!(h.encoder.call_count(), 0);

    let probed = h.prober.calls.lock().clone();
    assert_eq!(probed.len(), 1);
    assert!(probed[0].1, "staged file should exist while probing");
    assert!(!probed[0].0.exists());
    assert!(h.staged_files().is_empty());
}

#[tokio::test]
async fn failed_plan_does_not_affect_siblings() {
    let encoder = FakeEncoder::new().when_output_contains("_720p", Behavior::Fail);
    let h = TestHarness::with(FakeProber::new(1920, 1080, 30.0), encoder, 1);

    let report = h
        .pipeline
        .process_upload(upload("clip.mp4"), &config(&["SD", "HD", "ORIGINAL"]), &CancellationToken::new())
        .await
        .unwrap();

    let labels: Vec<_> = report.results.iter().map(|r| r.resolution_label.as_str()).collect();
    assert_eq!(labels, ["854x480", "1920x1080"]);

    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.file_name, "clip.mp4");
    assert_eq!(failure.resolution_label, "1280x720");
    assert_matches!(
        failure.error,
        Error::Encode {
            cause: EncodeCause::Tool(_)
        }
    );

    assert!(!h.output_dir().join("clip_720p.mp4").exists());
    assert!(h.output_dir().join("clip_480p.mp4").exists());
    assert!(h.staged_files().is_empty());
}

#[tokio::test]
async fn failed_segmented_plan_removes_segment_dir() {
    let encoder = FakeEncoder::new().when_output_contains("_360p", Behavior::Fail);
    let h = TestHarness::with(FakeProber::new(1920, 1080, 30.0), encoder, 1);
    let cfg = CompressionConfig {
        output_format: OutputFormat::Segmented,
        ..config(&["LOW"])
    };

    let report = h
        .pipeline
        .process_upload(upload("clip.mp4"), &cfg, &CancellationToken::new())
        .await
        .unwrap();

    assert!(report.results.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert!(!h.output_dir().join("clip_360p_hls").exists());
}

#[tokio::test]
async fn cancellation_stops_in_flight_and_pending_plans() {
    let encoder = FakeEncoder::new().when_output_contains("_720p", Behavior::WaitForCancel);
    let h = TestHarness::with(FakeProber::new(1920, 1080, 30.0), encoder, 1);
    let cancel = CancellationToken::new();
    let cfg = config(&["HD", "SD"]);

    let process = h.pipeline.process_upload(upload("clip.mp4"), &cfg, &cancel);
    let canceller = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    };
    let (report, ()) = tokio::join!(process, canceller);
    let report = report.unwrap();

    assert!(report.results.is_empty());
    assert_eq!(report.failures.len(), 2);
    for failure in &report.failures {
        assert_matches!(
            failure.error,
            Error::Encode {
                cause: EncodeCause::Cancelled
            }
        );
    }
    // Only the first plan reached the encoder.
    assert_eq!(h.encoder.call_count(), 1);
    assert!(!h.output_dir().join("clip_720p.mp4").exists());
    assert!(h.staged_files().is_empty());
}

#[tokio::test]
async fn repeated_runs_are_stable() {
    let h = TestHarness::new();
    let cfg = config(&["HD", "CUSTOM_640x360"]);

    let first = h
        .pipeline
        .process_upload(upload("same.mp4"), &cfg, &CancellationToken::new())
        .await
        .unwrap();
    let second = h
        .pipeline
        .process_upload(upload("same.mp4"), &cfg, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(first.results.len(), second.results.len());
    for (a, b) in first.results.iter().zip(&second.results) {
        assert_eq!(a.resolution_label, b.resolution_label);
        assert_eq!(a.bitrate_bps, b.bitrate_bps);
        assert_eq!(a.duration_seconds, b.duration_seconds);
        assert!((a.compression_ratio - b.compression_ratio).abs() < 1e-9);
    }
}

#[tokio::test]
async fn parallel_plans_keep_selector_order() {
    let h = TestHarness::with(FakeProber::new(1920, 1080, 30.0), FakeEncoder::new(), 3);
    let report = h
        .pipeline
        .process_upload(upload("clip.mp4"), &config(&["LOW", "ORIGINAL", "HD", "CUSTOM_100x100"]), &CancellationToken::new())
        .await
        .unwrap();

    let labels: Vec<_> = report.results.iter().map(|r| r.resolution_label.as_str()).collect();
    assert_eq!(labels, ["640x360", "1920x1080", "1280x720", "100x100"]);
}

#[tokio::test]
async fn batch_processes_uploads_in_order() {
    let h = TestHarness::new();
    let report = h
        .pipeline
        .process_uploads(
            vec![upload("a.mp4"), upload("b.mkv")],
            &config(&["HD", "ORIGINAL"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let names: Vec<_> = report.results.iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(
        names,
        ["a_720p.mp4", "a_compressed.mp4", "b_720p.mp4", "b_compressed.mp4"]
    );
    // Each upload is probed once, whatever the number of selectors.
    assert_eq!(h.prober.probed_paths().len(), 2);
    assert!(h.staged_files().is_empty());
}

#[tokio::test]
async fn batch_keeps_results_when_a_later_upload_fails_to_probe() {
    let prober = FakeProber::new(1920, 1080, 30.0).failing_on_call(2);
    let h = TestHarness::with(prober, FakeEncoder::new(), 1);
    let report = h
        .pipeline
        .process_uploads(
            vec![upload("a.mp4"), upload("b.mp4"), upload("c.mp4")],
            &config(&["HD"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let names: Vec<_> = report.results.iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(names, ["a_720p.mp4", "c_720p.mp4"]);
    assert!(h.output_dir().join("a_720p.mp4").exists());
    assert!(!h.output_dir().join("b_720p.mp4").exists());

    assert!(!report.is_complete());
    assert!(report.failures.is_empty());
    assert_eq!(report.upload_failures.len(), 1);
    assert_eq!(report.upload_failures[0].file_name, "b.mp4");
    assert_matches!(report.upload_failures[0].error, Error::Probe(_));

    assert_eq!(h.prober.probed_paths().len(), 3);
    assert_eq!(h.encoder.call_count(), 2);
    assert!(h.staged_files().is_empty());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["uploadFailures"][0]["fileName"], "b.mp4");
    assert_eq!(json["uploadFailures"][0]["error"]["kind"], "probe_failure");
}

#[tokio::test]
async fn unreadable_local_file_does_not_stop_the_batch() {
    let h = TestHarness::new();
    let missing = h.dir.path().join("gone.mp4");
    let report = h
        .pipeline
        .process_uploads(
            vec![Upload::from_path(&missing), upload("ok.mp4")],
            &config(&["SD"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].file_name, "ok_480p.mp4");
    assert_eq!(report.upload_failures.len(), 1);
    assert_eq!(report.upload_failures[0].file_name, "gone.mp4");
    assert_matches!(report.upload_failures[0].error, Error::Storage { .. });
    assert_eq!(h.prober.probed_paths().len(), 1);
}

#[tokio::test]
async fn upload_name_directories_are_ignored() {
    let h = TestHarness::new();
    let report = h
        .pipeline
        .process_upload(upload("../../escape/clip.mp4"), &config(&["ORIGINAL"]), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        report.results[0].output_path,
        h.output_dir().join("clip_compressed.mp4")
    );
}

#[tokio::test]
async fn encode_request_reflects_config() {
    let h = TestHarness::new();
    let cfg = CompressionConfig {
        output_format: OutputFormat::Webm,
        preserve_audio_quality: false,
        frame_rate: 25,
        ..config(&["CUSTOM_640x360"])
    };
    h.pipeline
        .process_upload(upload("clip.mp4"), &cfg, &CancellationToken::new())
        .await
        .unwrap();

    let requests = h.encoder.requests.lock();
    let request = &requests[0];
    assert_eq!(request.filter_graph, "scale=w=640:h=360");
    assert_eq!(request.video.codec, "libvpx-vp9");
    assert_eq!(request.video.frame_rate, 25);
    assert_eq!(request.audio.bitrate_bps, 128_000);
    assert_eq!(request.audio.channels, 2);
}

#[tokio::test]
async fn available_resolutions_for_upload() {
    let h = TestHarness::new();
    let tiers = h
        .pipeline
        .available_resolutions(upload("clip.mp4"))
        .await
        .unwrap();

    let names: Vec<_> = tiers.iter().map(|t| t.name).collect();
    assert_eq!(names, ["ORIGINAL", "FHD", "HD", "SD", "LOW"]);
    assert!(h.staged_files().is_empty());
}

#[tokio::test]
async fn available_resolutions_for_small_source() {
    let h = TestHarness::with(FakeProber::new(320, 240, 1.0), FakeEncoder::new(), 1);
    let tiers = h
        .pipeline
        .available_resolutions(upload("tiny.mp4"))
        .await
        .unwrap();
    assert_eq!(tiers.len(), 1);
    assert_eq!(tiers[0].name, "ORIGINAL");
}

#[tokio::test]
async fn available_resolutions_at_path() {
    let h = TestHarness::new();
    let source = h.dir.path().join("local.mp4");
    std::fs::write(&source, b"data").unwrap();

    let tiers = h.pipeline.available_resolutions_at(&source).await.unwrap();
    assert_eq!(tiers[0].name, "ORIGINAL");
    assert!(source.exists());
    assert_eq!(h.prober.probed_paths(), [source]);
}

#[tokio::test]
async fn output_directory_change_applies_to_new_requests() {
    let h = TestHarness::new();
    assert_eq!(h.pipeline.output_directory(), h.output_dir());

    let next = h.dir.path().join("elsewhere");
    h.pipeline.set_output_directory(&next).unwrap();
    assert_eq!(h.pipeline.output_directory(), next);

    let report = h
        .pipeline
        .process_upload(upload("clip.mp4"), &config(&["ORIGINAL"]), &CancellationToken::new())
        .await
        .unwrap();
    assert!(report.results[0].output_path.starts_with(&next));

    assert_matches!(
        h.pipeline.set_output_directory(Path::new("")),
        Err(Error::InvalidPath(_))
    );
    assert_eq!(h.pipeline.output_directory(), next);
}

#[tokio::test]
async fn upload_from_local_file_leaves_source_untouched() {
    let h = TestHarness::new();
    let source = h.dir.path().join("source.mov");
    std::fs::write(&source, vec![1u8; 1_024]).unwrap();

    let report = h
        .pipeline
        .process_upload(Upload::from_path(&source), &config(&["HD"]), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.results[0].file_name, "source_720p.mp4");
    assert_eq!(report.results[0].original_size_bytes, 1_024);
    assert!(source.exists());
    assert!(h.staged_files().is_empty());
}
