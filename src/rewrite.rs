//! Mirror a source tree with branding tokens substituted.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use same_file::is_same_file;
use tracing::{debug, warn};

use crate::resolver::normalize_lexically;
use crate::tokens::{SourceFilter, TokenSubstitutor};

/// Counts reported after a tree rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteReport {
  /// Files whose tokens were substituted.
  pub rewritten: usize,
  /// Files copied unchanged.
  pub copied: usize,
}

/// Copy every file under `src` into `out`, substituting tokens in files `filter` selects.
///
/// Relative paths are resolved against the current directory first. `out` may not be `src`
/// or lie anywhere inside it. Symbolic links to files are copied through; links to
/// directories are skipped.
pub fn rewrite_tree(
  tokens: &TokenSubstitutor,
  filter: &SourceFilter,
  src: &Path,
  out: &Path,
) -> Result<RewriteReport> {
  if !src.is_dir() {
    bail!("source directory {} does not exist", src.display());
  }
  let src = absolute_path(src)?;
  let out = absolute_path(out)?;
  ensure_disjoint_trees(&src, &out)?;

  let mut report = RewriteReport::default();
  rewrite_subtree(tokens, filter, &src, &out, Path::new(""), &mut report)?;
  Ok(report)
}

fn absolute_path(path: &Path) -> Result<PathBuf> {
  let absolute = std::path::absolute(path)
    .with_context(|| format!("failed to resolve {}", path.display()))?;
  Ok(normalize_lexically(&absolute))
}

/// Both paths must already be absolute and normalized.
fn ensure_disjoint_trees(src: &Path, out: &Path) -> Result<()> {
  if out.starts_with(src) {
    bail!(
      "output {} lies inside source {}; refusing to rewrite in place",
      out.display(),
      src.display()
    );
  }

  for ancestor in out.ancestors().filter(|path| path.exists()) {
    if is_same_file(src, ancestor)
      .with_context(|| format!("failed to compare {} and {}", src.display(), ancestor.display()))?
    {
      bail!(
        "output {} lies inside source {} (through a link); refusing to rewrite in place",
        out.display(),
        src.display()
      );
    }
  }
  Ok(())
}

fn rewrite_subtree(
  tokens: &TokenSubstitutor,
  filter: &SourceFilter,
  src_root: &Path,
  out_root: &Path,
  relative: &Path,
  report: &mut RewriteReport,
) -> Result<()> {
  let current = src_root.join(relative);
  let destination_dir = out_root.join(relative);
  fs::create_dir_all(&destination_dir)
    .with_context(|| format!("failed to create {}", destination_dir.display()))?;

  let mut entries = fs::read_dir(&current)
    .with_context(|| format!("failed to read {}", current.display()))?
    .collect::<std::io::Result<Vec<_>>>()
    .with_context(|| format!("failed to list {}", current.display()))?;
  entries.sort_by_key(|entry| entry.file_name());

  for entry in entries {
    let child_relative: PathBuf = relative.join(entry.file_name());
    let source = entry.path();
    if source == out_root {
      continue;
    }

    let file_type = entry
      .file_type()
      .with_context(|| format!("failed to stat {}", source.display()))?;

    if file_type.is_symlink() {
      match fs::metadata(&source) {
        Ok(target) if target.is_file() => {}
        Ok(_) => {
          warn!(path = %source.display(), "skipping symbolic link to a directory");
          continue;
        }
        Err(err) => {
          warn!(path = %source.display(), error = %err, "skipping dangling symbolic link");
          continue;
        }
      }
    } else if file_type.is_dir() {
      rewrite_subtree(tokens, filter, src_root, out_root, &child_relative, report)?;
      continue;
    }

    let destination = out_root.join(&child_relative);
    if filter.applies_to(&child_relative) && rewrite_file(tokens, &source, &destination)? {
      report.rewritten += 1;
    } else {
      fs::copy(&source, &destination).with_context(|| {
        format!(
          "failed to copy {} to {}",
          source.display(),
          destination.display()
        )
      })?;
      report.copied += 1;
    }
  }

  Ok(())
}

/// Returns `false` when the file is not UTF-8 and should be copied verbatim.
fn rewrite_file(tokens: &TokenSubstitutor, source: &Path, destination: &Path) -> Result<bool> {
  let bytes = fs::read(source).with_context(|| format!("failed to read {}", source.display()))?;
  let text = match String::from_utf8(bytes) {
    Ok(text) => text,
    Err(_) => {
      warn!(path = %source.display(), "skipping token substitution for non UTF-8 file");
      return Ok(false);
    }
  };

  let rewritten = tokens.apply(&text);
  fs::write(destination, rewritten.as_bytes())
    .with_context(|| format!("failed to write {}", destination.display()))?;
  debug!(path = %source.display(), "substituted tokens");
  Ok(true)
}
