// src/engine.rs

//! The skin engine: loads skins, owns the current snapshot and display bitmap,
//! and answers input and compositing requests against them.
//!
//! A load builds a complete [`Skin`] off to the side and only then replaces the
//! current one, so nothing ever sees keys from one skin next to a keymap from
//! another. Readers on other threads take an `Arc` via [`SkinEngine::snapshot`].

use crate::config::{EngineConfig, DEFAULT_CONFIG};
use crate::display::DisplayBitmap;
use crate::geometry::{Point, Rect};
use crate::input::{KeyHit, KeySlot, KeymapMatch, MenuQuery};
use crate::keys::{KeyModifiers, SOFT_KEY_COUNT};
use crate::raster::netpbm::NetpbmDecoder;
use crate::raster::{ImageDecoder, RasterBuilder};
use crate::rasterizer::BlitCommand;
use crate::skin::parser::parse_description;
use crate::skin::{Skin, ANNUNCIATOR_COUNT};
use crate::source::SkinCatalog;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;

/// How a successful [`SkinEngine::load`] ended up.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The requested skin is current.
    Requested,
    /// The requested skin failed for `reason`; the default skin is current.
    Fallback { reason: anyhow::Error },
}

impl LoadOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, LoadOutcome::Fallback { .. })
    }
}

pub struct SkinEngine<D: ImageDecoder = NetpbmDecoder> {
    config: EngineConfig,
    catalog: SkinCatalog,
    decoder: D,
    current: Arc<Skin>,
    display: DisplayBitmap,
}

impl SkinEngine<NetpbmDecoder> {
    pub fn new(config: EngineConfig) -> Self {
        SkinEngine::with_decoder(config, NetpbmDecoder)
    }
}

impl Default for SkinEngine<NetpbmDecoder> {
    fn default() -> Self {
        SkinEngine::new(DEFAULT_CONFIG.clone())
    }
}

impl<D: ImageDecoder> SkinEngine<D> {
    /// An engine with no skin loaded yet; every lookup misses until [`load`](Self::load).
    pub fn with_decoder(config: EngineConfig, decoder: D) -> Self {
        SkinEngine {
            catalog: SkinCatalog::new(&config),
            config,
            decoder,
            current: Arc::new(Skin::default()),
            display: DisplayBitmap::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog_mut(&mut self) -> &mut SkinCatalog {
        &mut self.catalog
    }

    /// Loads skin `name` fitted to a `width` x `height` surface.
    ///
    /// `directory` overrides the configured skin directory. If the skin cannot be
    /// loaded the default skin is loaded instead, once; if that fails too, the
    /// error is returned and the previous skin stays current.
    pub fn load(
        &mut self,
        name: &str,
        directory: Option<&Path>,
        width: i32,
        height: i32,
    ) -> Result<LoadOutcome> {
        let directory = directory.or(self.config.skin_directory.as_deref());
        match self.build_skin(name, directory, width, height) {
            Ok((skin, display)) => {
                self.install(skin, display);
                Ok(LoadOutcome::Requested)
            }
            Err(reason) => {
                let default = self.catalog.default_skin().to_string();
                warn!(
                    "Loading skin '{}' failed: {:#}; falling back to '{}'",
                    name, reason, default
                );
                let (skin, display) = self
                    .build_skin(&default, directory, width, height)
                    .with_context(|| format!("Failed to load default skin '{}'", default))?;
                self.install(skin, display);
                Ok(LoadOutcome::Fallback { reason })
            }
        }
    }

    fn build_skin(
        &self,
        name: &str,
        directory: Option<&Path>,
        width: i32,
        height: i32,
    ) -> Result<(Skin, DisplayBitmap)> {
        let assets = self.catalog.open(name, directory)?;
        let mut layout = parse_description(&assets.layout);
        let magnification = layout
            .magnify_to_surface(width, height, self.config.magnification_cap())
            .with_context(|| format!("Skin '{}' cannot be scaled", assets.name))?;
        let desc = &layout.description;
        let display = DisplayBitmap::new(desc.orientation, desc.display_scale)
            .with_context(|| format!("Display of skin '{}' cannot be allocated", assets.name))?;

        let mut builder = RasterBuilder::new(magnification);
        self.decoder
            .decode(&assets.image, &mut builder)
            .with_context(|| format!("Failed to decode image of skin '{}'", assets.name))?;
        let image = builder
            .into_image()
            .with_context(|| format!("Image of skin '{}' is incomplete", assets.name))?;

        info!(
            "Loaded skin '{}' ({:?}): x{}, {} keys, {} macros, {} keymap entries",
            assets.name,
            assets.origin,
            magnification,
            layout.keys.len(),
            layout.macros.len(),
            layout.keymap.len()
        );
        let skin = Skin {
            name: assets.name,
            layout,
            image,
        };
        Ok((skin, display))
    }

    /// Makes a fully built skin current, together with its freshly blanked display.
    fn install(&mut self, skin: Skin, display: DisplayBitmap) {
        self.display = display;
        self.current = Arc::new(skin);
        debug!("Skin '{}' is current", self.current.name);
    }

    /// The current skin. Stays valid and unchanged across later loads.
    pub fn snapshot(&self) -> Arc<Skin> {
        Arc::clone(&self.current)
    }

    pub fn skin(&self) -> &Skin {
        &self.current
    }

    pub fn display(&self) -> &DisplayBitmap {
        &self.display
    }

    pub fn magnification(&self) -> u8 {
        self.current.magnification()
    }

    pub fn locate(&self, x: i32, y: i32, cshift: bool, menu: &dyn MenuQuery) -> Option<KeyHit> {
        self.current.layout.locate(x, y, cshift, menu)
    }

    pub fn resolve(&self, keycode: u32, modifiers: KeyModifiers) -> Option<KeymapMatch<'_>> {
        self.current.layout.resolve(keycode, modifiers)
    }

    pub fn macro_for(&self, code: u8) -> Option<&[u8]> {
        self.current.layout.macro_for(code)
    }

    pub fn find_key_slot(&self, code: u8) -> Option<usize> {
        self.current.layout.find_key_slot(code)
    }

    /// The whole faceplate, drawn at the surface origin.
    pub fn composite_skin(&self) -> BlitCommand {
        let skin = self.current.description().skin;
        BlitCommand::skin(
            Rect::new(0, 0, skin.width, skin.height),
            Point::new(skin.x, skin.y),
        )
    }

    /// Draws a key pressed or released. `None` for a slot the skin does not have.
    pub fn composite_key(&self, slot: KeySlot, pressed: bool) -> Option<BlitCommand> {
        match slot {
            KeySlot::SoftKey(k) => {
                if k < 1 || k > SOFT_KEY_COUNT {
                    return None;
                }
                Some(
                    self.display
                        .soft_key_blit(self.current.description(), k, pressed),
                )
            }
            KeySlot::Key(index) => {
                let key = self.current.layout.keys.get(index)?;
                let src = if pressed {
                    key.source
                } else {
                    key.display.origin()
                };
                Some(BlitCommand::skin(key.display, src))
            }
        }
    }

    /// Turns annunciator `number` (1..=7) on or off.
    pub fn composite_annunciator(&self, number: usize, on: bool) -> Option<BlitCommand> {
        if number < 1 || number > ANNUNCIATOR_COUNT {
            return None;
        }
        let ann = &self.current.layout.annunciators[number - 1];
        let src = if on { ann.source } else { ann.display.origin() };
        Some(BlitCommand::skin(ann.display, src))
    }

    /// The whole display.
    pub fn composite_display(&self) -> BlitCommand {
        self.display.full_blit(self.current.description())
    }

    /// Faceplate followed by display.
    pub fn repaint(&self) -> Vec<BlitCommand> {
        vec![self.composite_skin(), self.composite_display()]
    }

    /// Takes new display bits from the calculator core and returns the blit that
    /// shows them.
    pub fn update_display(
        &mut self,
        bits: &[u8],
        bytes_per_line: usize,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> BlitCommand {
        let region = self
            .display
            .update_region(bits, bytes_per_line, x, y, width, height);
        self.display.region_blit(self.current.description(), region)
    }
}
