//! Shared test harness for pipeline integration tests.
//!
//! Provides fake [`Prober`] and [`Encoder`] capabilities that record every
//! call and write deterministic output files, plus [`TestHarness`] which
//! wires them into a [`ProcessingPipeline`] over a temp directory.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use vc_av::LocalStorage;
use vc_core::{EncodeCause, EncodeRequest, Encoder, Error, OutputSpec, ProbedStream, Prober};
use vc_pipeline::{PipelineSettings, ProcessingPipeline};

/// Bytes every fake single-file output contains.
pub const SINGLE_FILE_SIZE: usize = 4_096;

// ---------------------------------------------------------------------------
// Prober
// ---------------------------------------------------------------------------

pub struct FakeProber {
    stream: Option<ProbedStream>,
    /// 1-based call number that fails even when `stream` is set.
    fail_on_call: Option<usize>,
    /// (path, existed at probe time) for each call.
    pub calls: Mutex<Vec<(PathBuf, bool)>>,
}

impl FakeProber {
    pub fn new(width: u32, height: u32, duration_seconds: f64) -> Self {
        Self {
            stream: Some(ProbedStream {
                width,
                height,
                duration_seconds,
            }),
            fail_on_call: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Like [`FakeProber::new`], but the `call`-th probe fails.
    pub fn failing_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    /// A prober that rejects every file.
    pub fn failing() -> Self {
        Self {
            stream: None,
            fail_on_call: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn probed_paths(&self) -> Vec<PathBuf> {
        self.calls.lock().iter().map(|(p, _)| p.clone()).collect()
    }
}

#[async_trait]
impl Prober for FakeProber {
    fn name(&self) -> &'static str {
        "fake-prober"
    }

    async fn probe(&self, path: &Path) -> vc_core::Result<ProbedStream> {
        let call = {
            let mut calls = self.calls.lock();
            calls.push((path.to_path_buf(), path.exists()));
            calls.len()
        };
        if self.fail_on_call == Some(call) {
            return Err(Error::Probe(format!("corrupt header in {}", path.display())));
        }
        self.stream
            .ok_or_else(|| Error::Probe(format!("no video stream in {}", path.display())))
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// How the fake encoder behaves for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Write the output and succeed.
    Succeed,
    /// Write partial output, then fail like a non-zero exit.
    Fail,
    /// Write partial output and wait for cancellation.
    WaitForCancel,
    /// Succeed, but leave no segment directory behind.
    SucceedWithoutSegmentDir,
}

pub struct FakeEncoder {
    /// Number of segment files written for segmented output.
    pub segment_count: usize,
    pub segment_size: usize,
    /// Also drop a non-segment file into the segment directory.
    pub stray_file: bool,
    /// Output-path marker and the behavior requests matching it get.
    marker: Mutex<Option<(String, Behavior)>>,
    pub requests: Mutex<Vec<EncodeRequest>>,
}

impl FakeEncoder {
    pub fn new() -> Self {
        Self {
            segment_count: 3,
            segment_size: 2 * 1024 * 1024,
            stray_file: false,
            marker: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Apply `behavior` to requests whose output path contains `marker`.
    pub fn when_output_contains(self, marker: &str, behavior: Behavior) -> Self {
        *self.marker.lock() = Some((marker.to_string(), behavior));
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn behavior_for(&self, request: &EncodeRequest) -> Behavior {
        let target = output_target(&request.output);
        match &*self.marker.lock() {
            Some((marker, behavior)) if target.to_string_lossy().contains(marker.as_str()) => {
                *behavior
            }
            _ => Behavior::Succeed,
        }
    }

    fn write_output(&self, output: &OutputSpec, partial: bool) {
        match output {
            OutputSpec::File { path, .. } => {
                let len = if partial { 10 } else { SINGLE_FILE_SIZE };
                std::fs::write(path, vec![0u8; len]).unwrap();
            }
            OutputSpec::Segmented {
                manifest_path,
                segment_dir,
                segment_duration_secs,
                ..
            } => {
                let count = if partial { 1 } else { self.segment_count };
                let mut manifest = String::from("#EXTM3U\n");
                for i in 0..count {
                    let name = format!("segment{i}.ts");
                    std::fs::write(segment_dir.join(&name), vec![0u8; self.segment_size]).unwrap();
                    manifest.push_str(&format!("#EXTINF:{segment_duration_secs},\n{name}\n"));
                }
                std::fs::write(manifest_path, manifest).unwrap();
                if self.stray_file {
                    std::fs::write(segment_dir.join("poster.jpg"), vec![0u8; 777]).unwrap();
                }
            }
        }
    }
}

fn output_target(output: &OutputSpec) -> PathBuf {
    match output {
        OutputSpec::File { path, .. } => path.clone(),
        OutputSpec::Segmented { segment_dir, .. } => segment_dir.clone(),
    }
}

#[async_trait]
impl Encoder for FakeEncoder {
    fn name(&self) -> &'static str {
        "fake-encoder"
    }

    async fn encode(&self, request: &EncodeRequest, cancel: CancellationToken) -> vc_core::Result<()> {
        assert!(
            request.input_path.exists(),
            "input {} must exist while encoding",
            request.input_path.display()
        );
        self.requests.lock().push(request.clone());

        match self.behavior_for(request) {
            Behavior::Succeed => {
                self.write_output(&request.output, false);
                Ok(())
            }
            Behavior::Fail => {
                self.write_output(&request.output, true);
                Err(Error::encode(EncodeCause::Tool("exit status 1".into())))
            }
            Behavior::SucceedWithoutSegmentDir => {
                self.write_output(&request.output, false);
                if let OutputSpec::Segmented { segment_dir, .. } = &request.output {
                    std::fs::remove_dir_all(segment_dir).unwrap();
                }
                Ok(())
            }
            Behavior::WaitForCancel => {
                self.write_output(&request.output, true);
                cancel.cancelled().await;
                Err(Error::encode(EncodeCause::Cancelled))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct TestHarness {
    pub dir: TempDir,
    pub prober: Arc<FakeProber>,
    pub encoder: Arc<FakeEncoder>,
    pub pipeline: ProcessingPipeline,
}

impl TestHarness {
    /// A 1920x1080, 60 second source with a well-behaved encoder.
    pub fn new() -> Self {
        Self::with(FakeProber::new(1920, 1080, 60.0), FakeEncoder::new(), 1)
    }

    pub fn with(prober: FakeProber, encoder: FakeEncoder, max_parallel_plans: usize) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let prober = Arc::new(prober);
        let encoder = Arc::new(encoder);

        let pipeline = ProcessingPipeline::new(
            prober.clone(),
            encoder.clone(),
            Arc::new(LocalStorage),
            PipelineSettings {
                output_dir: dir.path().join("processed"),
                upload_dir: dir.path().join("uploads"),
                max_parallel_plans,
            },
        );

        Self {
            dir,
            prober,
            encoder,
            pipeline,
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("processed")
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.dir.path().join("uploads")
    }

    /// Files left in the upload directory.
    pub fn staged_files(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.upload_dir()) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }
}
