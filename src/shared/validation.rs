use std::borrow::Cow;

use url::Url;
use validator::ValidationError;

/// Virtual-hosted S3 buckets: `bucket.s3.amazonaws.com`
pub const S3_HOST_SUFFIX: &str = ".s3.amazonaws.com";
/// Regional S3 endpoints: `bucket.s3.<region>.amazonaws.com`
pub const S3_REGIONAL_MARKER: &str = ".s3.";
pub const AMAZONAWS_SUFFIX: &str = ".amazonaws.com";
pub const CLOUDFRONT_SUFFIX: &str = ".cloudfront.net";
pub const AZURE_BLOB_SUFFIX: &str = ".blob.core.windows.net";

/// Whether `url` points at a supported cloud storage host.
///
/// Accepts http/https URLs on AWS S3 (virtual-hosted or regional),
/// CloudFront, or Azure Blob Storage. Anything unparseable is rejected.
pub fn is_allowed_cloud_url(url: &str) -> bool {
    if url.trim().is_empty() {
        return false;
    }

    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }

    // The parser fills in a host for `https:host` and `https:/host`; only
    // an explicit `//` authority counts.
    let has_authority = url
        .trim()
        .get(parsed.scheme().len()..)
        .is_some_and(|rest| rest.starts_with("://"));
    if !has_authority {
        return false;
    }

    match parsed.host_str() {
        Some(host) => is_allowed_host(&host.to_ascii_lowercase()),
        None => false,
    }
}

fn is_allowed_host(host: &str) -> bool {
    host.ends_with(S3_HOST_SUFFIX)
        || (host.contains(S3_REGIONAL_MARKER) && host.ends_with(AMAZONAWS_SUFFIX))
        || host.ends_with(CLOUDFRONT_SUFFIX)
        || host.ends_with(AZURE_BLOB_SUFFIX)
}

/// `validator` hook for `file_url` fields
pub fn validate_cloud_url(url: &str) -> Result<(), ValidationError> {
    if is_allowed_cloud_url(url) {
        return Ok(());
    }

    Err(ValidationError::new("cloud_url").with_message(Cow::Owned(format!(
        "Invalid cloud URL. Must be AWS S3, CloudFront or Azure Blob URL: {}",
        url
    ))))
}
