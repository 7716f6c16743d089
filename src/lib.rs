// src/lib.rs

//! Skin and keymap engine for a calculator-emulator front end.
//!
//! A skin is a faceplate image plus a line-oriented description of where the keys,
//! display and annunciators sit on it. [`engine::SkinEngine`] loads one, fits it to
//! the drawing surface by an integer magnification, and then answers two kinds of
//! question: which calculator key a pointer position or host key press means, and
//! which rectangles a renderer has to blit to show the faceplate, the LCD and key
//! highlights.
//!
//! The engine never draws by itself. It hands out [`rasterizer::BlitCommand`]s; a
//! host executes them with its own graphics stack or with the bundled
//! [`rasterizer::FramebufferSink`].

pub mod button_keymap;
pub mod color;
pub mod config;
pub mod display;
pub mod engine;
pub mod geometry;
pub mod input;
pub mod keys;
pub mod raster;
pub mod rasterizer;
pub mod skin;
pub mod source;

pub use config::EngineConfig;
pub use engine::{LoadOutcome, SkinEngine};
pub use input::{KeyHit, KeySlot, KeymapMatch, MenuQuery};
pub use keys::KeyModifiers;
pub use rasterizer::{BlitCommand, BlitSource, FramebufferSink, RasterSink};
pub use skin::Skin;
