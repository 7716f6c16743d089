// src/source.rs

//! Where skin assets come from.
//!
//! Built-in skins are compiled into the library and always win over files of the
//! same name. Anything else is read from `<dir>/<name>.<ext>`, one file for the
//! description and one for the faceplate image.

use crate::config::{EngineConfig, DEFAULT_CONFIG};
use anyhow::{bail, Context, Result};
use log::debug;
use once_cell::sync::Lazy;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

/// A skin compiled into the binary.
#[derive(Debug, Clone)]
pub struct BuiltinSkin {
    pub name: Cow<'static, str>,
    pub layout: Cow<'static, str>,
    pub image: Cow<'static, [u8]>,
}

static BUILTIN_SKINS: Lazy<Vec<BuiltinSkin>> = Lazy::new(|| {
    vec![BuiltinSkin {
        name: Cow::Borrowed("Minimal"),
        layout: Cow::Borrowed(include_str!("../skins/minimal.layout")),
        image: Cow::Borrowed(include_bytes!("../skins/minimal.pbm")),
    }]
});

/// Where a set of assets was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOrigin {
    Builtin,
    Directory(PathBuf),
}

/// The raw inputs for one skin.
#[derive(Debug, Clone)]
pub struct SkinAssets<'a> {
    pub name: String,
    pub layout: Cow<'a, str>,
    pub image: Cow<'a, [u8]>,
    pub origin: AssetOrigin,
}

/// Built-in skins plus the on-disk naming scheme.
#[derive(Debug, Clone)]
pub struct SkinCatalog {
    builtins: Vec<BuiltinSkin>,
    default_skin: String,
    layout_extension: String,
    image_extension: String,
}

impl SkinCatalog {
    /// The library's built-in skins, with naming taken from `config`.
    pub fn new(config: &EngineConfig) -> Self {
        SkinCatalog {
            builtins: BUILTIN_SKINS.clone(),
            default_skin: config.default_skin.clone(),
            layout_extension: config.layout_extension.clone(),
            image_extension: config.image_extension.clone(),
        }
    }

    /// Adds or replaces a built-in skin.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        layout: impl Into<String>,
        image: impl Into<Vec<u8>>,
    ) {
        let name = name.into();
        self.builtins.retain(|b| b.name != name.as_str());
        self.builtins.push(BuiltinSkin {
            name: Cow::Owned(name),
            layout: Cow::Owned(layout.into()),
            image: Cow::Owned(image.into()),
        });
    }

    pub fn default_skin(&self) -> &str {
        &self.default_skin
    }

    pub fn builtin_names(&self) -> impl Iterator<Item = &str> {
        self.builtins.iter().map(|b| b.name.as_ref())
    }

    /// Looks a skin up. An empty `name` means the default skin.
    pub fn open(&self, name: &str, directory: Option<&Path>) -> Result<SkinAssets<'_>> {
        let name = if name.is_empty() {
            self.default_skin.as_str()
        } else {
            name
        };

        if let Some(builtin) = self.builtins.iter().find(|b| b.name == name) {
            debug!("Skin '{}' is built in", name);
            return Ok(SkinAssets {
                name: name.to_string(),
                layout: Cow::Borrowed(builtin.layout.as_ref()),
                image: Cow::Borrowed(builtin.image.as_ref()),
                origin: AssetOrigin::Builtin,
            });
        }

        let Some(dir) = directory else {
            bail!("Skin '{}' is not built in and no skin directory is set", name);
        };
        let layout_path = dir.join(format!("{}.{}", name, self.layout_extension));
        let image_path = dir.join(format!("{}.{}", name, self.image_extension));
        debug!("Reading skin '{}' from {}", name, dir.display());

        let layout = fs::read(&layout_path)
            .with_context(|| format!("Failed to read skin description {}", layout_path.display()))?;
        // Descriptions are line-oriented ASCII; stray bytes only spoil their own line.
        let layout = String::from_utf8_lossy(&layout).into_owned();
        let image = fs::read(&image_path)
            .with_context(|| format!("Failed to read skin image {}", image_path.display()))?;
        Ok(SkinAssets {
            name: name.to_string(),
            layout: Cow::Owned(layout),
            image: Cow::Owned(image),
            origin: AssetOrigin::Directory(dir.to_path_buf()),
        })
    }
}

impl Default for SkinCatalog {
    fn default() -> Self {
        SkinCatalog::new(&DEFAULT_CONFIG)
    }
}
