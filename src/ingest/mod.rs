//! 入库：校验、探测、去重、缩略图合成、重托管

pub mod compressor;
pub mod dedup;
pub mod pipeline;
pub mod prober;
pub mod rehost;
pub mod thumbnail;
pub mod validator;

pub use compressor::{CompressedImage, ImageCompressor, ResmushCompressor, compress_with_retry};
pub use dedup::{DedupDecision, dedup_key, resolve_duplicates};
pub use pipeline::{IngestPipeline, IngestRequest, MacroState, PipelineSettings, RehostPolicy};
pub use prober::{ProbedContent, probe_content};
pub use rehost::{
    GistApi, GistRehoster, GitHubGistApi, MemoryQueue, PassthroughRehoster, RedisQueue, RehostSignal, RehostWorker,
    Rehoster, SignalQueue, WorkerOutcome,
};
pub use thumbnail::{ThumbnailSet, ThumbnailSettings, ThumbnailSynthesizer};
pub use validator::validate_intake;
