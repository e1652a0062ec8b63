use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    assets::{SourceFrame, decode::load_image},
    foundation::error::{GlitchError, GlitchResult},
};

/// Still images shipped with the sketch, in the order they are offered for selection.
pub const DEFAULT_ASSET_NAMES: [&str; 8] = [
    "wallala.jpg",
    "botticelli.png",
    "james-webb.jpg",
    "james-webb2.jpg",
    "yinka.jpg",
    "penfold.png",
    "fonts1.png",
    "logo-banner.png",
];

pub fn default_asset_names() -> Vec<String> {
    DEFAULT_ASSET_NAMES.iter().map(|s| (*s).to_string()).collect()
}

#[derive(Clone, Debug)]
struct AssetEntry {
    name: String,
    frame: Arc<SourceFrame>,
}

/// Ordered set of preloaded still images, addressed by file name.
#[derive(Clone, Debug, Default)]
pub struct AssetLibrary {
    root: PathBuf,
    entries: Vec<AssetEntry>,
}

impl AssetLibrary {
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
        }
    }

    /// Load every named image under `root`, keeping the given order.
    ///
    /// Images that fail to resolve or decode are skipped with a warning, so later lookups of
    /// that name behave like any unknown name.
    #[tracing::instrument(skip(names), fields(root = %root.display()))]
    pub fn load(root: &Path, names: &[String]) -> Self {
        let mut lib = Self::empty(root);
        for name in names {
            match lib.load_one(name) {
                Ok(frame) => {
                    tracing::debug!(
                        name = name.as_str(),
                        width = frame.width,
                        height = frame.height,
                        "loaded still image"
                    );
                    lib.insert(name.clone(), frame);
                }
                Err(err) => {
                    tracing::warn!(name = name.as_str(), error = %err, "skipping still image");
                }
            }
        }
        lib
    }

    fn load_one(&self, name: &str) -> GlitchResult<SourceFrame> {
        let rel = normalize_rel_path(name)?;
        let frame = load_image(&self.root.join(rel))?;
        if !frame.is_ready() {
            return Err(GlitchError::media(format!("image '{name}' has zero size")));
        }
        Ok(frame)
    }

    /// Add or replace an image. Replacing keeps the original position in the order.
    pub fn insert(&mut self, name: impl Into<String>, frame: SourceFrame) {
        let name = name.into();
        let frame = Arc::new(frame);
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.frame = frame;
        } else {
            self.entries.push(AssetEntry { name, frame });
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<SourceFrame>> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| Arc::clone(&e.frame))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// The image shown before any selection is made: the last one in the list.
    pub fn default_name(&self) -> Option<&str> {
        self.entries.last().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn normalize_rel_path(source: &str) -> GlitchResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(GlitchError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(GlitchError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(GlitchError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(GlitchError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/library.rs"]
mod tests;
