//! The engine's boundary surface.
//!
//! [`ProcessingPipeline`] stages each upload, probes it once, builds one plan
//! per selector and runs every plan through the [`EncodeOrchestrator`]. A
//! failed plan is reported next to the results of its siblings instead of
//! aborting them, and an upload that cannot be staged or probed is reported
//! next to the uploads that could.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use vc_core::{
    CompressionConfig, CompressionPlan, CompressionResult, Encoder, Error, Prober,
    ResolutionTier, SourceProbe, Storage,
};

use crate::advisor;
use crate::metrics;
use crate::naming::UploadName;
use crate::orchestrator::EncodeOrchestrator;
use crate::output_dir::OutputDirectory;
use crate::planner::PlanBuilder;
use crate::selector::ResolutionSelector;
use crate::staging::StagedUpload;

/// Where an upload's bytes come from.
#[derive(Debug, Clone)]
pub enum UploadBody {
    /// Bytes already in memory, e.g. a request body.
    Bytes(Bytes),
    /// A file on local disk. It is copied into the upload directory, never
    /// modified.
    File(PathBuf),
}

/// One client file.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Name as supplied by the client; only its last component is used.
    pub file_name: String,
    pub body: UploadBody,
}

impl Upload {
    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            body: UploadBody::Bytes(bytes.into()),
        }
    }

    /// Upload a local file under its own name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            file_name: path.to_string_lossy().into_owned(),
            body: UploadBody::File(path),
        }
    }
}

/// A plan that did not produce output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFailure {
    /// Client file name of the upload.
    pub file_name: String,
    /// Target `WxH` of the failed plan.
    pub resolution_label: String,
    #[serde(serialize_with = "serialize_error")]
    pub error: Error,
}

fn serialize_error<S: serde::Serializer>(error: &Error, s: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeStruct;
    let mut st = s.serialize_struct("Error", 2)?;
    st.serialize_field("kind", error.kind())?;
    st.serialize_field("message", &error.to_string())?;
    st.end()
}

/// An upload that was never planned because it could not be staged or
/// probed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFailure {
    /// Client file name of the upload.
    pub file_name: String,
    #[serde(serialize_with = "serialize_error")]
    pub error: Error,
}

/// Outcome of a request: results in plan order plus any failed plans and
/// uploads.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessReport {
    pub results: Vec<CompressionResult>,
    pub failures: Vec<PlanFailure>,
    pub upload_failures: Vec<UploadFailure>,
}

impl ProcessReport {
    /// True when every upload was planned and every plan produced output.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.upload_failures.is_empty()
    }
}

/// Static settings of a pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Initial output directory.
    pub output_dir: PathBuf,
    /// Where uploads are staged while they are processed.
    pub upload_dir: PathBuf,
    /// Plans of one upload run at most this many at a time. `1` is sequential.
    pub max_parallel_plans: usize,
}

pub struct ProcessingPipeline {
    prober: Arc<dyn Prober>,
    storage: Arc<dyn Storage>,
    orchestrator: EncodeOrchestrator,
    output_dir: OutputDirectory,
    upload_dir: PathBuf,
    max_parallel_plans: usize,
}

impl ProcessingPipeline {
    pub fn new(
        prober: Arc<dyn Prober>,
        encoder: Arc<dyn Encoder>,
        storage: Arc<dyn Storage>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            prober,
            orchestrator: EncodeOrchestrator::new(encoder, Arc::clone(&storage)),
            output_dir: OutputDirectory::new(settings.output_dir, Arc::clone(&storage)),
            storage,
            upload_dir: settings.upload_dir,
            max_parallel_plans: settings.max_parallel_plans.max(1),
        }
    }

    /// Process a single upload.
    ///
    /// # Errors
    ///
    /// As [`process_uploads`](Self::process_uploads), and additionally fails
    /// with `Probe` or `Storage` when the upload cannot be probed or staged.
    pub async fn process_upload(
        &self,
        upload: Upload,
        config: &CompressionConfig,
        cancel: &CancellationToken,
    ) -> vc_core::Result<ProcessReport> {
        let mut report = self.process_uploads(vec![upload], config, cancel).await?;
        match report.upload_failures.pop() {
            Some(failure) => Err(failure.error),
            None => Ok(report),
        }
    }

    /// Process uploads in order; every upload is planned for every selector.
    ///
    /// # Errors
    ///
    /// Fails before any work with `InvalidResolutionSelector` or
    /// `Validation` when the request is malformed. An upload that cannot be
    /// staged or probed is listed in [`ProcessReport::upload_failures`] and
    /// the remaining uploads still run. Encode failures are listed in
    /// [`ProcessReport::failures`].
    pub async fn process_uploads(
        &self,
        uploads: Vec<Upload>,
        config: &CompressionConfig,
        cancel: &CancellationToken,
    ) -> vc_core::Result<ProcessReport> {
        config.validate()?;
        let selectors = ResolutionSelector::parse_all(config.effective_resolutions())?;
        let names = uploads
            .iter()
            .map(|u| UploadName::parse(&u.file_name))
            .collect::<vc_core::Result<Vec<_>>>()?;

        let builder = PlanBuilder::new(self.output_dir.get());
        let mut report = ProcessReport::default();

        for (upload, name) in uploads.iter().zip(&names) {
            let staged = match self.stage(upload, name).await {
                Ok(staged) => staged,
                Err(error) => {
                    tracing::error!("Staging of {} failed: {error}", name.file_name());
                    report.upload_failures.push(UploadFailure {
                        file_name: name.file_name().to_string(),
                        error,
                    });
                    continue;
                }
            };
            let probe = match self.probe_staged(&staged, name).await {
                Ok(probe) => probe,
                Err(error) => {
                    release(staged, name).await;
                    report.upload_failures.push(UploadFailure {
                        file_name: name.file_name().to_string(),
                        error,
                    });
                    continue;
                }
            };

            let plans = builder.plans_for(staged.path(), name, &probe, config, &selectors);
            tracing::info!(
                "Processing {} ({}): {} plan(s)",
                name.file_name(),
                probe.resolution_label(),
                plans.len()
            );

            let outcomes: Vec<_> = futures::stream::iter(
                plans
                    .iter()
                    .map(|plan| self.run_plan(plan, &probe, cancel.child_token())),
            )
            .buffered(self.max_parallel_plans)
            .collect()
            .await;

            for (plan, outcome) in plans.iter().zip(outcomes) {
                match outcome {
                    Ok(result) => report.results.push(result),
                    Err(error) => report.failures.push(PlanFailure {
                        file_name: name.file_name().to_string(),
                        resolution_label: plan.target_label(),
                        error,
                    }),
                }
            }

            release(staged, name).await;
        }

        Ok(report)
    }

    /// Tiers worth offering for an upload.
    pub async fn available_resolutions(
        &self,
        upload: Upload,
    ) -> vc_core::Result<Vec<&'static ResolutionTier>> {
        let name = UploadName::parse(&upload.file_name)?;
        let staged = self.stage(&upload, &name).await?;
        let probe = self.probe_staged(&staged, &name).await;
        release(staged, &name).await;
        Ok(advisor::available_resolutions(&probe?))
    }

    /// Tiers worth offering for a file already on local disk.
    pub async fn available_resolutions_at(
        &self,
        path: &Path,
    ) -> vc_core::Result<Vec<&'static ResolutionTier>> {
        let size_bytes = self.storage.file_size(path)?;
        let stream = self.prober.probe(path).await?;
        Ok(advisor::available_resolutions(&SourceProbe::new(
            stream, size_bytes,
        )))
    }

    pub fn output_directory(&self) -> PathBuf {
        self.output_dir.get()
    }

    /// Change the output directory for requests that start afterwards.
    pub fn set_output_directory(&self, path: &Path) -> vc_core::Result<()> {
        self.output_dir.set(path).map(|_| ())
    }

    /// Copy the upload into the upload directory on the blocking pool.
    async fn stage(&self, upload: &Upload, name: &UploadName) -> vc_core::Result<StagedUpload> {
        let storage = Arc::clone(&self.storage);
        let upload_dir = self.upload_dir.clone();
        let name = name.clone();
        let body = upload.body.clone();

        tokio::task::spawn_blocking(move || -> vc_core::Result<StagedUpload> {
            match body {
                UploadBody::Bytes(bytes) => {
                    let mut reader: &[u8] = &bytes;
                    StagedUpload::stage(storage, &upload_dir, &name, &mut reader)
                }
                UploadBody::File(path) => {
                    let mut file = File::open(&path).map_err(|e| Error::storage(&path, e))?;
                    StagedUpload::stage(storage, &upload_dir, &name, &mut file as &mut dyn Read)
                }
            }
        })
        .await
        .map_err(|e| Error::Internal(format!("staging task failed: {e}")))?
    }

    async fn probe_staged(
        &self,
        staged: &StagedUpload,
        name: &UploadName,
    ) -> vc_core::Result<SourceProbe> {
        let stream = self.prober.probe(staged.path()).await.map_err(|e| {
            tracing::error!("Probe of {} failed: {e}", name.file_name());
            e
        })?;
        Ok(SourceProbe::new(stream, staged.size_bytes()))
    }

    async fn run_plan(
        &self,
        plan: &CompressionPlan,
        probe: &SourceProbe,
        cancel: CancellationToken,
    ) -> vc_core::Result<CompressionResult> {
        let outcome = self.orchestrator.run(plan, cancel).await?;
        let result = metrics::summarize(plan, &outcome, probe);
        tracing::info!(
            "Compressed {} to {}: {} -> {} bytes (ratio {:.2})",
            result.file_name,
            result.resolution_label,
            result.original_size_bytes,
            result.compressed_size_bytes,
            result.compression_ratio
        );
        Ok(result)
    }
}

/// Remove a staged upload on the blocking pool. Failures are logged.
async fn release(staged: StagedUpload, name: &UploadName) {
    match tokio::task::spawn_blocking(move || staged.release()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::warn!("Failed to remove staged upload for {}: {e}", name.file_name())
        }
        Err(e) => tracing::warn!("Release task for {} failed: {e}", name.file_name()),
    }
}
