//! Git-backed catalog mirror.
//!
//! The working copy never stores the remote URL: every fetch and push passes
//! the URL as an argument, so an access token only exists in the process
//! arguments of the git invocation that needs it and is redacted from any
//! captured output.

mod runner;

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::ExposeSecret;
use vitrina_core::catalog::CatalogMirror;
use vitrina_types::config::{CatalogSettings, RemoteSpec};
use vitrina_types::error::SyncError;

use crate::filesystem::{read_optional, write_atomic};

pub use runner::{GitOutput, GitRunner, classify_failure, redact};

/// Commit message used when a previous flush left the document uncommitted.
const PENDING_COMMIT_MESSAGE: &str = "Cambios locales pendientes";

/// Catalog mirror over a git working copy and a single remote branch.
pub struct GitCatalogMirror {
    dir: PathBuf,
    file: String,
    branch: String,
    remote_url: String,
    display_url: String,
    runner: GitRunner,
}

impl std::fmt::Debug for GitCatalogMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitCatalogMirror")
            .field("dir", &self.dir)
            .field("file", &self.file)
            .field("branch", &self.branch)
            .field("remote", &self.display_url)
            .finish_non_exhaustive()
    }
}

impl GitCatalogMirror {
    pub fn new(dir: PathBuf, remote: &RemoteSpec, settings: &CatalogSettings) -> Self {
        let timeout = Duration::from_secs(settings.git_timeout_secs.max(1));
        let runner = GitRunner::new(
            dir.clone(),
            timeout,
            &settings.author_name,
            &settings.author_email,
        );

        let (remote_url, display_url, runner) = match remote {
            RemoteSpec::Token {
                host,
                user,
                repo,
                token,
            } => {
                let path = if repo.contains('/') {
                    repo.clone()
                } else {
                    format!("{user}/{repo}")
                };
                let secret = token.expose_secret();
                (
                    format!("https://{user}:{secret}@{host}/{path}.git"),
                    format!("https://{host}/{path}.git"),
                    runner.with_secret(secret),
                )
            }
            RemoteSpec::Plain(url) => (url.clone(), url.clone(), runner),
        };

        Self {
            dir,
            file: settings.file.clone(),
            branch: settings.branch.clone(),
            remote_url,
            display_url,
            runner,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn document_path(&self) -> PathBuf {
        self.dir.join(&self.file)
    }

    fn is_repository(&self) -> bool {
        self.dir.join(".git").exists()
    }

    /// Remove lock files left behind by a git process killed on timeout.
    /// Mirror operations are serialized by the store, so no live git process
    /// of ours can own them.
    async fn clear_stale_locks(&self) -> Result<(), SyncError> {
        let git_dir = self.dir.join(".git");
        let branch_lock = format!("refs/heads/{}.lock", self.branch);
        for name in ["index.lock", "HEAD.lock", branch_lock.as_str()] {
            let lock = git_dir.join(name);
            match tokio::fs::remove_file(&lock).await {
                Ok(()) => tracing::warn!(path = %lock.display(), "removed stale git lock"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(SyncError::Io(format!("{}: {e}", lock.display()))),
            }
        }
        Ok(())
    }

    /// Abort an in-progress merge. A failed abort is logged; the next hard
    /// reset clears the merge state anyway.
    async fn abort_merge(&self) -> bool {
        match self.runner.output("merge", &["merge", "--abort"]).await {
            Ok(out) if out.success => true,
            Ok(out) => {
                tracing::warn!(detail = %out.combined().trim(), "git merge --abort failed, working copy left mid-merge");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "git merge --abort failed, working copy left mid-merge");
                false
            }
        }
    }

    async fn head_exists(&self) -> Result<bool, SyncError> {
        let out = self
            .runner
            .output("rev-parse", &["rev-parse", "--verify", "-q", "HEAD"])
            .await?;
        Ok(out.success)
    }

    /// Create an empty repository whose HEAD points at the configured branch.
    async fn init(&self) -> Result<(), SyncError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SyncError::Io(format!("{}: {e}", self.dir.display())))?;
        self.runner.run("init", &["init", "-q"]).await?;
        let head = format!("refs/heads/{}", self.branch);
        self.runner
            .run("init", &["symbolic-ref", "HEAD", &head])
            .await?;
        tracing::info!(dir = %self.dir.display(), branch = %self.branch, "initialized catalog working copy");
        Ok(())
    }

    /// Fetch the remote branch into `FETCH_HEAD`. Returns `false` when the
    /// remote does not have the branch yet.
    async fn fetch(&self) -> Result<bool, SyncError> {
        let out = self
            .runner
            .output("fetch", &["fetch", "-q", &self.remote_url, &self.branch])
            .await?;
        if out.success {
            return Ok(true);
        }
        if out.stderr.to_lowercase().contains("couldn't find remote ref") {
            tracing::debug!(branch = %self.branch, "remote branch does not exist yet");
            return Ok(false);
        }
        Err(classify_failure("fetch", &out.stderr))
    }

    /// Commit a document left dirty by an interrupted flush so a merge can
    /// proceed.
    async fn commit_pending(&self) -> Result<(), SyncError> {
        let status = self
            .runner
            .run("status", &["status", "--porcelain", "--", &self.file])
            .await?;
        if !status.stdout.trim().is_empty() && self.commit_document(PENDING_COMMIT_MESSAGE).await? {
            tracing::info!("committed pending local catalog changes before pulling");
        }
        Ok(())
    }

    async fn commit_document(&self, message: &str) -> Result<bool, SyncError> {
        if !self.is_repository() {
            return Err(SyncError::NotARepository(self.dir.display().to_string()));
        }
        self.clear_stale_locks().await?;
        self.runner.run("add", &["add", "--", &self.file]).await?;

        let diff = self
            .runner
            .output("diff", &["diff", "--cached", "--quiet", "--", &self.file])
            .await?;
        match diff.code {
            Some(0) => return Ok(false),
            Some(1) => {}
            _ => return Err(classify_failure("diff", &diff.stderr)),
        }

        self.runner
            .run("commit", &["commit", "-q", "-m", message])
            .await?;
        Ok(true)
    }
}

impl CatalogMirror for GitCatalogMirror {
    async fn sync(&self) -> Result<(), SyncError> {
        if !self.is_repository() {
            return Err(SyncError::NotARepository(self.dir.display().to_string()));
        }
        self.clear_stale_locks().await?;
        self.commit_pending().await?;

        if !self.fetch().await? {
            return Ok(());
        }

        if !self.head_exists().await? {
            self.runner
                .run("reset", &["reset", "--hard", "-q", "FETCH_HEAD"])
                .await?;
            return Ok(());
        }

        let merge = self
            .runner
            .output("merge", &["merge", "--no-edit", "FETCH_HEAD"])
            .await?;
        if merge.success {
            return Ok(());
        }

        let in_progress = self
            .runner
            .output("merge", &["rev-parse", "-q", "--verify", "MERGE_HEAD"])
            .await?;
        if in_progress.success {
            self.abort_merge().await;
            return Err(SyncError::Diverged(format!(
                "{} conflicts with {}",
                self.file, self.branch
            )));
        }
        Err(classify_failure("merge", &merge.combined()))
    }

    async fn reset_to_remote(&self) -> Result<(), SyncError> {
        if self.is_repository() {
            self.clear_stale_locks().await?;
        } else {
            self.init().await?;
        }
        if self.fetch().await? {
            self.runner
                .run("reset", &["reset", "--hard", "-q", "FETCH_HEAD"])
                .await?;
            tracing::info!(remote = %self.display_url, branch = %self.branch, "working copy reset to remote tip");
        }
        Ok(())
    }

    async fn read_document(&self) -> Result<Option<String>, SyncError> {
        let path = self.document_path();
        read_optional(&path)
            .await
            .map_err(|e| SyncError::Io(format!("{}: {e}", path.display())))
    }

    async fn write_document(&self, contents: &str) -> Result<(), SyncError> {
        let path = self.document_path();
        write_atomic(&path, contents)
            .await
            .map_err(|e| SyncError::Io(format!("{}: {e}", path.display())))
    }

    async fn commit(&self, message: &str) -> Result<bool, SyncError> {
        self.commit_document(message).await
    }

    async fn push(&self) -> Result<(), SyncError> {
        if !self.is_repository() || !self.head_exists().await? {
            return Ok(());
        }
        let refspec = format!("HEAD:refs/heads/{}", self.branch);
        self.runner
            .run("push", &["push", &self.remote_url, &refspec])
            .await?;
        Ok(())
    }

    fn has_remote(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        format!("git {} ({})", self.display_url, self.branch)
    }
}

#[cfg(test)]
pub(crate) fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
