//! 出站 HTTP：媒体探测与下载

mod fetcher;

pub use fetcher::{FetchError, MediaFetcher, ProbeResponse, UreqFetcher, http_agent};
