//! ImageMix is a template-driven batch image compositor.
//!
//! A declarative template — four tables describing canvases, image layers,
//! text layers, and layouts — is rendered into a batch of flattened raster
//! creatives: one canvas plus an ordered stack of layers per output image.
//!
//! # Pipeline overview
//!
//! 1. **Model**: build a [`Template`] from row tables
//!    ([`template_from_rows`]) or JSON (Serde).
//! 2. **Index**: [`LayerRegistry`] resolves layer ids to tagged
//!    image/text definitions.
//! 3. **Compose**: [`Compositor`] renders each [`LayoutEntry`] onto a
//!    [`Surface`] — background fill, then layers in listed order.
//! 4. **Write**: finished creatives go through an [`OutputSink`] as PNGs.
//!
//! Key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: identical template, assets and options produce
//!   byte-identical output; no randomness, no wall-clock reads.
//! - **Injected collaborators**: asset bytes ([`AssetSource`]), the font
//!   ([`FontResource`]) and output ([`OutputSink`]) are explicit handles,
//!   so concurrent runs and tests use independent fixtures.
//! - **Per-entry failure isolation**: an error in one layout entry is
//!   reported in the [`BatchReport`] and never halts the batch; only
//!   shared-setup errors (bad template, missing font) fail a run.
//!
//! Layer positions use the lower-left origin convention: (0, 0) is the
//! bottom-left of the canvas with y increasing upward.
#![forbid(unsafe_code)]

mod assets;
mod foundation;
mod output;
mod render;
mod template;

pub use assets::cache::ImageCache;
pub use assets::decode::{DecodedImage, decode_image};
pub use assets::font::FontResource;
pub use assets::source::{AssetSource, DirAssetSource, MemoryAssetSource, normalize_rel_path};
pub use foundation::color::{Rgb8, Rgba8};
pub use foundation::error::{MixError, MixResult};
pub use output::{DirOutputSink, MemoryOutputSink, OutputSink, encode_png};
pub use render::pipeline::{
    BatchReport, BatchThreading, CancelFlag, Compositor, EntryOutcome, EntryReport, RenderOptions,
    ResizeFilter,
};
pub use render::surface::Surface;
pub use render::text::text_extent;
pub use template::model::{
    Canvas, ImageLayerSpec, LayoutEntry, MAX_LAYERS_PER_ENTRY, Template, TextLayerSpec,
};
pub use template::registry::{LayerRef, LayerRegistry};
pub use template::rows::template_from_rows;
