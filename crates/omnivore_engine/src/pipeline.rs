use std::path::Path;
use std::sync::Arc;

use omnivore_logging::sink_info;

use crate::acquire::ImageAcquirer;
use crate::article::ArticleConverter;
use crate::batch::BatchOrchestrator;
use crate::bundle::{open_bundle, BundleError};
use crate::config::EngineConfig;
use crate::fetch::{Fetcher, ReqwestFetcher};
use crate::markdown::Html2MdConverter;
use crate::observe::Observers;
use crate::package::{package_to_path, PackageError, PackageOptions};
use crate::{FetchError, RunSummary};

/// A failure that leaves no archive to hand back.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Bundle(#[from] BundleError),
    #[error("cannot set up http client: {0}")]
    Client(#[from] FetchError),
    #[error("cannot write archive: {0}")]
    Package(#[from] PackageError),
}

/// Orchestrator wired with the default converter and the given fetcher.
pub fn build_orchestrator(fetcher: Arc<dyn Fetcher>, config: &EngineConfig) -> BatchOrchestrator {
    let acquirer = ImageAcquirer::new(fetcher, config.proxy.clone());
    let article = ArticleConverter::new(Arc::new(Html2MdConverter), acquirer);
    BatchOrchestrator::new(article)
}

/// Export zip in, Markdown archive out.
pub async fn convert_export(
    input: &Path,
    output: &Path,
    config: &EngineConfig,
    observers: Observers<'_>,
) -> Result<RunSummary, ConvertError> {
    let fetcher = ReqwestFetcher::new(config.fetch.clone())?;
    convert_export_with(input, output, Arc::new(fetcher), config, observers).await
}

pub async fn convert_export_with(
    input: &Path,
    output: &Path,
    fetcher: Arc<dyn Fetcher>,
    config: &EngineConfig,
    observers: Observers<'_>,
) -> Result<RunSummary, ConvertError> {
    let mut bundle = open_bundle(input, observers.log)?;
    let orchestrator = build_orchestrator(fetcher, config);
    let batch = orchestrator
        .run(&bundle.html, &mut bundle.metadata, observers)
        .await;

    let options = PackageOptions {
        include_manifest: config.include_manifest,
    };
    let output_path = package_to_path(output, &batch.results, &batch.failures, &options)?;
    sink_info!(observers.log, "Wrote {}", output_path.display());

    Ok(RunSummary {
        documents: batch.document_count(),
        images: batch.image_count(),
        failures: batch.failures,
        output_path,
    })
}
