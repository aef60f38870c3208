//! Omnivore engine: export conversion pipeline and IO.
mod acquire;
mod article;
mod batch;
mod bundle;
mod config;
mod decode;
mod engine;
mod fetch;
mod markdown;
mod observe;
mod package;
mod persist;
mod pipeline;
mod types;

pub use acquire::{Attempt, AttemptKind, ImageAcquirer, ProxySettings, DEFAULT_PROXY_HOST};
pub use article::{ArticleConverter, ArticleOutput};
pub use batch::{BatchOrchestrator, BatchOutput};
pub use bundle::{open_bundle, read_bundle, BundleError, ExportBundle};
pub use config::EngineConfig;
pub use decode::{decode_html, DecodedHtml};
pub use engine::{ConvertJob, EngineHandle};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use markdown::{Converter, Html2MdConverter};
pub use observe::{ChannelProgressSink, NullProgressSink, Observers, ProgressSink};
pub use package::{
    build_manifest, package_to_path, write_archive, PackageError, PackageOptions,
    MANIFEST_FILENAME,
};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{build_orchestrator, convert_export, convert_export_with, ConvertError};
pub use types::{
    EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, RunSummary,
};
