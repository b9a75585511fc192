use actix_web::{HttpResponse, web};
use std::path::PathBuf;
use tracing::{error, trace};

use crate::blob::{content_type_for, is_valid_key};

/// 文件系统对象存储的根目录
#[derive(Clone, Debug)]
pub struct BlobRoot(pub PathBuf);

/// `GET /blobs/{key}`
pub async fn serve_blob(path: web::Path<String>, root: web::Data<BlobRoot>) -> HttpResponse {
    let key = path.into_inner();
    if !is_valid_key(&key) {
        return HttpResponse::NotFound().finish();
    }

    match tokio::fs::read(root.0.join(&key)).await {
        Ok(bytes) => {
            trace!("Serving blob {} ({} bytes)", key, bytes.len());
            let extension = key.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
            HttpResponse::Ok()
                .content_type(content_type_for(extension))
                .append_header(("Cache-Control", "public, max-age=31536000, immutable"))
                .body(bytes)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => HttpResponse::NotFound().finish(),
        Err(e) => {
            error!("Failed to read blob {}: {}", key, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
