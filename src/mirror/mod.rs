//! Filesystem mirroring.
//!
//! Persists fetched resources under `<target_dir>/<host>/<url-path>`,
//! resolving collisions between path segments that were first seen as
//! leaf files and later turn out to be directories.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::config::MirrorConfig;
use crate::error::{MirrorError, MirrorResult};
use crate::frontier::CrawlItem;
use crate::utils::constants::COPY_CHUNK_BYTES;
use crate::utils::mirror_path_for;

/// Result of persisting one item.
#[derive(Debug)]
pub enum WriteOutcome {
    Written { path: PathBuf, bytes: u64 },
    /// The progress callback asked to stop. The partial file is left on
    /// disk; there is no defined cleanup policy for cancellation.
    Cancelled { path: PathBuf, bytes: u64 },
}

/// Progress callback, polled once per copied chunk with the byte total.
/// Return `false` to cancel the write.
pub type ProgressFn<'a> = &'a mut dyn FnMut(u64) -> bool;

/// Writes fetched items into the mirror tree.
pub struct MirrorWriter {
    root: PathBuf,
    /// When `.html` targets are excluded by policy, a collision deletes
    /// the misplaced file instead of renaming it to `<name>.html`.
    delete_instead_of_rename: bool,
}

impl MirrorWriter {
    /// Create the writer and its root directory.
    pub fn create(config: &MirrorConfig) -> MirrorResult<Self> {
        let root = config.target_dir().to_path_buf();
        fs::create_dir_all(&root).map_err(|source| MirrorError::Write {
            path: root.clone(),
            source,
        })?;
        Ok(Self {
            root,
            delete_instead_of_rename: config.extension_denied("html"),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist one item, streaming its body in 4 KB chunks.
    ///
    /// On an I/O failure the partial file is deleted and the error
    /// returned; the caller logs it and the crawl continues.
    pub fn write<R: Read>(
        &self,
        item: &CrawlItem,
        body: &mut R,
        mut progress: Option<ProgressFn<'_>>,
    ) -> MirrorResult<WriteOutcome> {
        let target = self.resolve_target(&mirror_path_for(&item.url, &self.root))?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| MirrorError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = File::create(&target).map_err(|source| MirrorError::Write {
            path: target.clone(),
            source,
        })?;

        let mut chunk = [0u8; COPY_CHUNK_BYTES];
        let mut total: u64 = 0;
        loop {
            let n = match body.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) => {
                    self.discard_partial(&target);
                    return Err(MirrorError::Connection {
                        url: item.url.to_string(),
                        reason: format!("body read failed: {err}"),
                    });
                }
            };
            if let Err(source) = file.write_all(&chunk[..n]) {
                self.discard_partial(&target);
                return Err(MirrorError::Write {
                    path: target,
                    source,
                });
            }
            total += n as u64;
            if let Some(callback) = progress.as_deref_mut()
                && !callback(total)
            {
                log::warn!(
                    target: "sitemirror::mirror",
                    "write of {} cancelled, partial file left at {}",
                    item.url,
                    target.display()
                );
                return Ok(WriteOutcome::Cancelled {
                    path: target,
                    bytes: total,
                });
            }
        }
        log::debug!(
            target: "sitemirror::mirror",
            "wrote {} ({total} bytes) to {}",
            item.url,
            target.display()
        );
        Ok(WriteOutcome::Written {
            path: target,
            bytes: total,
        })
    }

    /// Resolve collisions on the way to the target path.
    ///
    /// A parent segment that exists as a plain file was an earlier item
    /// mistaken for a leaf; it is renamed to `<name>.html` (or deleted,
    /// under an `.html` denylist), a directory takes its place, and the
    /// renamed file moves one level down inside it. A target that already
    /// exists as a directory is the mirror case and the content goes to
    /// `<name>.html` inside it.
    fn resolve_target(&self, path: &Path) -> MirrorResult<PathBuf> {
        let rel = path
            .strip_prefix(&self.root)
            .unwrap_or(path)
            .to_path_buf();
        let components: Vec<_> = rel.components().collect();
        let mut dir = self.root.clone();
        for component in components.iter().take(components.len().saturating_sub(1)) {
            dir.push(component);
            if dir.is_file() {
                self.promote_file_to_directory(&dir)?;
            }
        }

        let mut target = path.to_path_buf();
        if target.is_dir() {
            let name = target
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "index".to_string());
            target.push(format!("{name}.html"));
        }
        Ok(target)
    }

    fn promote_file_to_directory(&self, dir: &Path) -> MirrorResult<()> {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let write_err = |source| MirrorError::Write {
            path: dir.to_path_buf(),
            source,
        };
        if self.delete_instead_of_rename {
            log::info!(
                target: "sitemirror::mirror",
                "removing {} to make room for a directory",
                dir.display()
            );
            fs::remove_file(dir).map_err(write_err)?;
            fs::create_dir(dir).map_err(write_err)?;
            return Ok(());
        }
        let renamed = dir.with_file_name(format!("{name}.html"));
        log::info!(
            target: "sitemirror::mirror",
            "relocating {} to {}/{name}.html",
            dir.display(),
            dir.display()
        );
        fs::rename(dir, &renamed).map_err(write_err)?;
        fs::create_dir(dir).map_err(write_err)?;
        fs::rename(&renamed, dir.join(format!("{name}.html"))).map_err(write_err)?;
        Ok(())
    }

    fn discard_partial(&self, path: &Path) {
        if let Err(err) = fs::remove_file(path) {
            log::warn!(
                target: "sitemirror::mirror",
                "could not remove partial file {}: {err}",
                path.display()
            );
        }
    }
}
