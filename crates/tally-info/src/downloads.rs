//! npm download counts

use crate::client::HttpClient;
use crate::error::Result;
use serde::Deserialize;
use tally_core::PackageName;

pub const NPM_DOWNLOADS_URL: &str = "https://api.npmjs.org";

#[derive(Debug, Deserialize)]
struct DownloadPoint {
    downloads: u64,
}

/// Download count URL for the last week.
pub fn last_week_url(downloads_url: &str, name: &PackageName) -> String {
    format!(
        "{}/downloads/point/last-week/{}",
        downloads_url.trim_end_matches('/'),
        name
    )
}

/// Fetch the number of downloads of a package over the last week.
pub async fn fetch_weekly_downloads(
    client: &HttpClient,
    downloads_url: &str,
    name: &PackageName,
) -> Result<u64> {
    let point: DownloadPoint = client.get_json(&last_week_url(downloads_url, name)).await?;
    Ok(point.downloads)
}
