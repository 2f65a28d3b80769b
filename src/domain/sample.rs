// ============================================================
// Layer 3 — Sample Descriptor
// ============================================================
// The default entry of the external sample list. The store only
// needs the image path from it; anything else the dataset carries
// rides along in `meta` so it survives a snapshot round-trip.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::traits::SampleDescriptor;

/// One source sample of the evaluation set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Path of the source image. Doubles as the identity key.
    pub image_path: PathBuf,

    /// Free-form dataset annotations (dataset name, split, ...).
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl Sample {
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
            meta:       BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

impl SampleDescriptor for Sample {
    fn identity_key(&self) -> String {
        self.image_path.to_string_lossy().into_owned()
    }

    /// Name of the directory holding the image, e.g.
    /// `data/coco/val2014/img_01.jpg` → `val2014`.
    fn storage_subpath(&self) -> PathBuf {
        self.image_path
            .parent()
            .and_then(|p| p.file_name())
            .map(PathBuf::from)
            .unwrap_or_default()
    }

    fn image_path(&self) -> &Path {
        &self.image_path
    }
}
