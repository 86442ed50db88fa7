//! Static asset serving module
//!
//! Serves the built single-page app. Paths the asset store does not know
//! fall back to `/index.html` so client-side routes resolve in the browser.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use thiserror::Error;
use tokio::fs;

use crate::http::{self, cache, mime};
use crate::logger;

/// Entry document of the single-page app
pub const INDEX_PATH: &str = "/index.html";

const INDEX_FILE: &str = "index.html";

/// A resolved asset
#[derive(Debug, Clone)]
pub struct Asset {
    pub data: Bytes,
    pub content_type: &'static str,
}

/// Asset lookup errors
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("failed to read asset: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of front-end assets
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Look up an asset by request path (always starts with `/`)
    async fn get(&self, path: &str) -> Result<Asset, AssetError>;
}

/// Asset store backed by a directory on disk
pub struct DirAssetStore {
    root: PathBuf,
}

impl DirAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a request path to a relative file path, refusing anything that
    /// could climb out of the root
    fn relative_path(path: &str) -> Option<PathBuf> {
        let decoded = percent_decode_str(path).decode_utf8().ok()?;
        let relative = Path::new(decoded.trim_start_matches('/'));
        if relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            Some(relative.to_path_buf())
        } else {
            None
        }
    }
}

#[async_trait]
impl AssetStore for DirAssetStore {
    async fn get(&self, path: &str) -> Result<Asset, AssetError> {
        let not_found = || AssetError::NotFound(path.to_string());

        let Some(relative) = Self::relative_path(path) else {
            logger::log_warning(&format!("Path traversal attempt blocked: {path}"));
            return Err(not_found());
        };

        let root = fs::canonicalize(&self.root).await.map_err(|e| {
            logger::log_warning(&format!(
                "Asset directory not found or inaccessible '{}': {e}",
                self.root.display()
            ));
            AssetError::Io(e)
        })?;

        let mut file_path = root.join(relative);
        if fs::metadata(&file_path)
            .await
            .is_ok_and(|meta| meta.is_dir())
        {
            file_path.push(INDEX_FILE);
        }

        // Any path below the root that does not resolve (missing file, a file
        // used as a directory, NUL bytes) is a client route, not a failure
        let Ok(canonical) = fs::canonicalize(&file_path).await else {
            return Err(not_found());
        };
        if !canonical.starts_with(&root) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {path} -> {}",
                canonical.display()
            ));
            return Err(not_found());
        }

        let data = match fs::read(&canonical).await {
            Ok(d) => d,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(e) => {
                logger::log_error(&format!(
                    "Failed to read file '{}': {e}",
                    canonical.display()
                ));
                return Err(AssetError::Io(e));
            }
        };

        Ok(Asset {
            data: Bytes::from(data),
            content_type: mime::content_type_for(&canonical),
        })
    }
}

/// Request information needed to answer from the asset store
pub struct AssetRequest<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
    pub cache_max_age: u32,
}

/// How an asset request was answered, for the access log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetOutcome {
    Served,
    SpaFallback,
    Failed,
}

impl AssetOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Served => "asset",
            Self::SpaFallback => "spa-fallback",
            Self::Failed => "asset-error",
        }
    }
}

/// `/` and the empty path both mean the index document
fn normalize_path(path: &str) -> &str {
    if path.is_empty() || path == "/" {
        INDEX_PATH
    } else {
        path
    }
}

/// Serve a path from the asset store with a single SPA fallback
///
/// `NotFound` retries once with `/index.html`; any other error, or a failed
/// retry, is a plain 500.
pub async fn serve_asset(
    ctx: &AssetRequest<'_>,
    store: &dyn AssetStore,
) -> (Response<Full<Bytes>>, AssetOutcome) {
    let path = normalize_path(ctx.path);

    let (result, outcome) = match store.get(path).await {
        Err(AssetError::NotFound(_)) => (store.get(INDEX_PATH).await, AssetOutcome::SpaFallback),
        other => (other, AssetOutcome::Served),
    };

    match result {
        Ok(asset) => (build_asset_response(ctx, &asset), outcome),
        Err(e) => {
            logger::log_error(&format!("Failed to serve asset '{path}': {e}"));
            (http::build_500_response(), AssetOutcome::Failed)
        }
    }
}

/// Build asset response with `ETag` revalidation
fn build_asset_response(ctx: &AssetRequest<'_>, asset: &Asset) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&asset.data);
    let cache_control = cache::public_cache_control(ctx.cache_max_age);

    // Check if client has cached version
    if cache::check_etag_match(ctx.if_none_match, &etag) {
        return http::build_304_response(&etag, &cache_control);
    }

    http::response::build_cached_response(
        asset.data.clone(),
        asset.content_type,
        &etag,
        &cache_control,
        ctx.is_head,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::header::{CACHE_CONTROL, CONTENT_TYPE, ETAG};
    use hyper::StatusCode;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>app</html>").unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets/app.js"), "console.log(1)").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/index.html"), "<html>docs</html>").unwrap();
        dir
    }

    fn request(path: &str) -> AssetRequest<'_> {
        AssetRequest {
            path,
            is_head: false,
            if_none_match: None,
            cache_max_age: 3600,
        }
    }

    async fn body_of(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    struct FailingStore;

    #[async_trait]
    impl AssetStore for FailingStore {
        async fn get(&self, _path: &str) -> Result<Asset, AssetError> {
            Err(AssetError::Io(std::io::Error::other("device unavailable")))
        }
    }

    #[tokio::test]
    async fn test_dir_store_reads_files() {
        let dir = site();
        let store = DirAssetStore::new(dir.path());

        let asset = store.get("/assets/app.js").await.unwrap();
        assert_eq!(&asset.data[..], b"console.log(1)");
        assert_eq!(asset.content_type, "application/javascript; charset=utf-8");

        let asset = store.get("/docs").await.unwrap();
        assert_eq!(&asset.data[..], b"<html>docs</html>");

        assert!(matches!(
            store.get("/missing.css").await,
            Err(AssetError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_dir_store_blocks_traversal() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.txt"), "secret").unwrap();
        let root = outer.path().join("dist");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(root.join("index.html"), "<html>app</html>").unwrap();
        let store = DirAssetStore::new(&root);

        for path in ["/../secret.txt", "/%2e%2e/secret.txt", "/assets/../../secret.txt"] {
            assert!(
                matches!(store.get(path).await, Err(AssetError::NotFound(_))),
                "{path} escaped the asset root"
            );
        }
    }

    #[tokio::test]
    async fn test_missing_root_is_io_error() {
        let store = DirAssetStore::new("/definitely/not/a/real/asset/dir");
        assert!(matches!(
            store.get("/index.html").await,
            Err(AssetError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let dir = site();
        let store = DirAssetStore::new(dir.path());

        for path in ["/", ""] {
            let (resp, outcome) = serve_asset(&request(path), &store).await;
            assert_eq!(outcome, AssetOutcome::Served);
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(resp.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
            assert_eq!(resp.headers()[CACHE_CONTROL], "public, max-age=3600");
            assert_eq!(&body_of(resp).await[..], b"<html>app</html>");
        }
    }

    #[tokio::test]
    async fn test_unknown_path_falls_back_to_index() {
        let dir = site();
        let store = DirAssetStore::new(dir.path());

        let (resp, outcome) = serve_asset(&request("/dashboard/settings"), &store).await;
        assert_eq!(outcome, AssetOutcome::SpaFallback);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(&body_of(resp).await[..], b"<html>app</html>");
    }

    #[tokio::test]
    async fn test_unresolvable_paths_fall_back_to_index() {
        let dir = site();
        let store = DirAssetStore::new(dir.path());

        for path in ["/index.html/deep", "/assets/app.js/settings", "/%00"] {
            assert!(
                matches!(store.get(path).await, Err(AssetError::NotFound(_))),
                "{path} should be NotFound"
            );
            let (resp, outcome) = serve_asset(&request(path), &store).await;
            assert_eq!(outcome, AssetOutcome::SpaFallback, "{path}");
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(&body_of(resp).await[..], b"<html>app</html>");
        }
    }

    #[tokio::test]
    async fn test_fallback_without_index_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirAssetStore::new(dir.path());

        let (resp, outcome) = serve_asset(&request("/anything"), &store).await;
        assert_eq!(outcome, AssetOutcome::Failed);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(&body_of(resp).await[..], b"Internal Server Error");
    }

    #[tokio::test]
    async fn test_io_error_skips_fallback() {
        let (resp, outcome) = serve_asset(&request("/assets/app.js"), &FailingStore).await;
        assert_eq!(outcome, AssetOutcome::Failed);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/plain");
    }

    #[tokio::test]
    async fn test_etag_revalidation() {
        let dir = site();
        let store = DirAssetStore::new(dir.path());

        let (resp, _) = serve_asset(&request("/assets/app.js"), &store).await;
        let etag = resp.headers()[ETAG].to_str().unwrap().to_string();

        let ctx = AssetRequest {
            if_none_match: Some(&etag),
            ..request("/assets/app.js")
        };
        let (resp, _) = serve_asset(&ctx, &store).await;
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
        assert!(body_of(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_head_has_empty_body() {
        let dir = site();
        let store = DirAssetStore::new(dir.path());

        let ctx = AssetRequest {
            is_head: true,
            ..request("/assets/app.js")
        };
        let (resp, _) = serve_asset(&ctx, &store).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-length"], "14");
        assert!(body_of(resp).await.is_empty());
    }
}
