//! Dashboard static assets
//!
//! Serves files from the configured static directory. A fixed deny-list
//! keeps deployment artifacts that may sit next to the dashboard (env
//! files, legacy config) unreachable, and any path that would escape
//! the directory is rejected before the filesystem is touched.

use std::path::{Component, Path, PathBuf};

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

/// Filenames never served, wherever they appear under the static dir.
const DENY_LIST: &[&str] = &[".env", "config.js", "server.py"];

/// Serve one asset from `root`. `path` is the URL path without the
/// leading slash. Anything unreadable, deny-listed, or outside `root`
/// is a plain 404.
pub async fn serve(root: &Path, path: &str) -> Response {
    let Some(resolved) = resolve(root, path) else {
        return not_found();
    };
    match tokio::fs::read(&resolved).await {
        Ok(contents) => (
            [(header::CONTENT_TYPE, content_type(&resolved))],
            contents,
        )
            .into_response(),
        Err(_) => not_found(),
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

/// Normalize and vet the requested path. Every component must be a
/// plain name: parent/root components and deny-listed filenames bail
/// out before any filesystem access.
fn resolve(root: &Path, path: &str) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => {
                let name = part.to_str()?;
                if DENY_LIST.contains(&name) {
                    return None;
                }
                clean.push(part);
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if clean.as_os_str().is_empty() {
        return None;
    }
    Some(root.join(clean))
}

/// Content type by extension; unrecognized extensions are served as
/// opaque bytes.
fn content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn resolve_plain_file() {
        let resolved = resolve(Path::new("/srv/dash"), "app.js").unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/dash/app.js"));
    }

    #[test]
    fn resolve_nested_file() {
        let resolved = resolve(Path::new("/srv/dash"), "css/site.css").unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/dash/css/site.css"));
    }

    #[test]
    fn resolve_rejects_deny_listed_names() {
        for name in [".env", "config.js", "server.py", "deep/.env"] {
            assert!(resolve(Path::new("/srv/dash"), name).is_none(), "{name}");
        }
    }

    #[test]
    fn resolve_rejects_traversal() {
        assert!(resolve(Path::new("/srv/dash"), "../etc/passwd").is_none());
        assert!(resolve(Path::new("/srv/dash"), "a/../../etc/passwd").is_none());
        assert!(resolve(Path::new("/srv/dash"), "/etc/passwd").is_none());
        assert!(resolve(Path::new("/srv/dash"), "").is_none());
    }

    #[test]
    fn content_types_for_known_extensions() {
        assert_eq!(content_type(Path::new("index.html")), "text/html");
        assert_eq!(content_type(Path::new("logo.jpg")), "image/jpeg");
        assert_eq!(content_type(Path::new("chart.gif")), "image/gif");
        assert_eq!(content_type(Path::new("logo")), "application/octet-stream");
    }

    #[tokio::test]
    async fn serve_reads_file_and_404s_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();

        let ok = serve(dir.path(), "index.html").await;
        assert_eq!(ok.status(), StatusCode::OK);

        let missing = serve(dir.path(), "nope.html").await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn serve_labels_image_assets_correctly() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("logo.jpg"), [0xFF, 0xD8, 0xFF]).unwrap();

        let response = serve(dir.path(), "logo.jpg").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
            "image/jpeg"
        );
    }

    #[tokio::test]
    async fn serve_refuses_env_file_even_when_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "CI_SERVER_TOKEN=oops").unwrap();

        let response = serve(dir.path(), ".env").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
