//! Shared object path generation and public-URL handling for storage backends.
//!
//! Path format: `{folder}/{unix_millis}-{random base36}.{ext}`.
//! Public URL format: `{base_url}/storage/v1/object/public/{bucket}/{path}`.

use chrono::Utc;
use rand::Rng;

use crate::traits::{StorageError, StorageResult};

const PUBLIC_MARKER: [&str; 4] = ["storage", "v1", "object", "public"];
const RANDOM_SUFFIX_LEN: usize = 10;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Bucket and path extracted from a public object URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub path: String,
}

/// Reject paths that could escape the bucket root.
pub fn validate_path(path: &str) -> StorageResult<()> {
    if path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|segment| segment == ".." || segment == ".")
    {
        return Err(StorageError::InvalidKey(format!(
            "Object path contains invalid segments: {}",
            path
        )));
    }
    Ok(())
}

/// Generate a unique object path for an uploaded file in `folder`.
///
/// The extension is taken from the original filename; files without one get `bin`.
pub fn generate_object_path(folder: &str, filename: &str) -> StorageResult<String> {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        return Err(StorageError::InvalidKey("Upload folder cannot be empty".to_string()));
    }
    validate_path(folder)?;

    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("bin");

    let mut rng = rand::rng();
    let suffix: String = (0..RANDOM_SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();

    Ok(format!(
        "{}/{}-{}.{}",
        folder,
        Utc::now().timestamp_millis(),
        suffix,
        extension
    ))
}

/// Build the public URL of an object.
pub fn public_url(base_url: &str, bucket: &str, path: &str) -> String {
    let encoded: Vec<String> = path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!(
        "{}/{}/{}/{}",
        base_url.trim_end_matches('/'),
        PUBLIC_MARKER.join("/"),
        bucket,
        encoded.join("/")
    )
}

/// Extract bucket and object path from a public URL.
///
/// Returns `None` for anything that does not have the
/// `.../storage/v1/object/public/<bucket>/<path>` shape. Query strings and
/// fragments are ignored and segments are percent-decoded.
pub fn parse_public_url(url: &str) -> Option<ObjectRef> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    let (_host, url_path) = rest.split_once('/')?;

    let segments: Vec<&str> = url_path.split('/').collect();
    let marker_at = segments
        .windows(PUBLIC_MARKER.len())
        .position(|window| window == PUBLIC_MARKER)?;

    let mut tail = segments[marker_at + PUBLIC_MARKER.len()..].iter();
    let bucket = urlencoding::decode(tail.next()?).ok()?.into_owned();
    if bucket.is_empty() {
        return None;
    }

    let mut decoded = Vec::new();
    for segment in tail {
        decoded.push(urlencoding::decode(segment).ok()?.into_owned());
    }
    let path = decoded.join("/");
    validate_path(&path).ok()?;

    Some(ObjectRef { bucket, path })
}
