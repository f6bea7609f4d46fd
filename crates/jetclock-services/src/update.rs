//! Update service backed by GitHub Releases.
//!
//! The stable channel follows `/releases/latest`; the pre-release channel
//! takes the newest non-draft release of any kind.

mod asset;
mod version;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use jetclock_common::UpdateError;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::UpdateService;

pub use asset::select_asset;
pub use version::is_newer;

const GITHUB_API: &str = "https://api.github.com";
const USER_AGENT: &str = "jetclock-updater";
const CHECK_TIMEOUT: Duration = Duration::from_secs(15);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// What to update and from where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    /// The managed binary that gets replaced.
    pub binary: PathBuf,
    pub current_version: String,
    /// GitHub `owner/repo`.
    pub repository: String,
    pub pre_release: bool,
}

/// A release newer than the installed version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub tag: String,
    pub asset_name: String,
    pub download_url: String,
}

/// A GitHub release entry.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub assets: Vec<GithubAsset>,
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// Checks GitHub Releases and swaps in new binaries.
pub struct GithubUpdater {
    api_url: String,
    http: reqwest::Client,
}

impl GithubUpdater {
    pub fn new() -> Self {
        Self::with_api_url(GITHUB_API)
    }

    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self {
            api_url: api_url.into(),
            http,
        }
    }

    fn releases_url(&self, request: &UpdateRequest) -> String {
        if request.pre_release {
            format!("{}/repos/{}/releases?per_page=10", self.api_url, request.repository)
        } else {
            format!("{}/repos/{}/releases/latest", self.api_url, request.repository)
        }
    }

    async fn fetch_candidate(
        &self,
        request: &UpdateRequest,
    ) -> Result<Option<GithubRelease>, UpdateError> {
        let response = self
            .http
            .get(self.releases_url(request))
            .header("Accept", "application/vnd.github+json")
            .timeout(CHECK_TIMEOUT)
            .send()
            .await
            .map_err(|e| UpdateError::Check(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UpdateError::Check(format!(
                "release query returned {}",
                response.status()
            )));
        }

        if request.pre_release {
            let releases: Vec<GithubRelease> = response
                .json()
                .await
                .map_err(|e| UpdateError::Check(format!("bad release list: {e}")))?;
            Ok(pick_release(releases, true))
        } else {
            let release: GithubRelease = response
                .json()
                .await
                .map_err(|e| UpdateError::Check(format!("bad release: {e}")))?;
            Ok(pick_release(vec![release], false))
        }
    }
}

impl Default for GithubUpdater {
    fn default() -> Self {
        Self::new()
    }
}

/// Choose the release to consider from a newest-first list.
pub fn pick_release(releases: Vec<GithubRelease>, pre_release: bool) -> Option<GithubRelease> {
    releases
        .into_iter()
        .find(|r| !r.draft && (pre_release || !r.prerelease))
}

fn binary_name(binary: &Path) -> String {
    binary
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[async_trait]
impl UpdateService for GithubUpdater {
    async fn check(&self, request: &UpdateRequest) -> Result<Option<Release>, UpdateError> {
        let Some(release) = self.fetch_candidate(request).await? else {
            debug!("no eligible release published");
            return Ok(None);
        };

        if !is_newer(&release.tag_name, &request.current_version) {
            info!(
                latest = %release.tag_name,
                current = %request.current_version,
                "already up to date"
            );
            return Ok(None);
        }

        let name = binary_name(&request.binary);
        let asset = select_asset(&release.assets, &name, std::env::consts::ARCH)
            .ok_or_else(|| {
                UpdateError::Check(format!(
                    "release {} has no asset for {name}",
                    release.tag_name
                ))
            })?;

        Ok(Some(Release {
            tag: release.tag_name.clone(),
            asset_name: asset.name.clone(),
            download_url: asset.browser_download_url.clone(),
        }))
    }

    async fn install(
        &self,
        request: &UpdateRequest,
        release: &Release,
    ) -> Result<(), UpdateError> {
        info!(tag = %release.tag, asset = %release.asset_name, "downloading update");
        let response = self
            .http
            .get(&release.download_url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|e| UpdateError::Apply(e.to_string()))?;
        if !response.status().is_success() {
            return Err(UpdateError::Apply(format!(
                "download returned {}",
                response.status()
            )));
        }

        let staging = request.binary.with_extension("download");
        let result = stream_to_file(response, &staging).await;
        if let Err(e) = result {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }

        replace_binary(&staging, &request.binary).await?;
        info!(binary = %request.binary.display(), tag = %release.tag, "update installed");
        Ok(())
    }
}

async fn stream_to_file(response: reqwest::Response, path: &Path) -> Result<(), UpdateError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| UpdateError::Apply(format!("create {}: {e}", path.display())))?;

    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| UpdateError::Apply(format!("download interrupted: {e}")))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| UpdateError::Apply(format!("write {}: {e}", path.display())))?;
        written += chunk.len() as u64;
    }
    file.sync_all()
        .await
        .map_err(|e| UpdateError::Apply(format!("sync {}: {e}", path.display())))?;

    if written == 0 {
        return Err(UpdateError::Apply("downloaded asset is empty".into()));
    }
    debug!(bytes = written, "download complete");
    Ok(())
}

/// Mark `staging` executable and move it over `binary`.
async fn replace_binary(staging: &Path, binary: &Path) -> Result<(), UpdateError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(staging, std::fs::Permissions::from_mode(0o755))
            .await
            .map_err(|e| UpdateError::Apply(format!("chmod {}: {e}", staging.display())))?;
    }

    tokio::fs::rename(staging, binary)
        .await
        .map_err(|e| UpdateError::Apply(format!("replace {}: {e}", binary.display())))
}
