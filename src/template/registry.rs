use std::collections::HashMap;

use crate::{
    foundation::error::{MixError, MixResult},
    template::model::{ImageLayerSpec, Template, TextLayerSpec},
};

/// A resolved layer reference, tagged by kind.
#[derive(Clone, Copy, Debug)]
pub enum LayerRef<'a> {
    /// Image layer definition.
    Image(&'a ImageLayerSpec),
    /// Text layer definition.
    Text(&'a TextLayerSpec),
}

/// Indexes image and text layer definitions by id for O(1) lookup during
/// rendering. Read-only after construction; safe to share by reference
/// across concurrent entry renders.
#[derive(Clone, Debug)]
pub struct LayerRegistry<'a> {
    images: HashMap<&'a str, &'a ImageLayerSpec>,
    texts: HashMap<&'a str, &'a TextLayerSpec>,
}

impl<'a> LayerRegistry<'a> {
    /// Index both layer tables of `template`.
    pub fn new(template: &'a Template) -> Self {
        Self {
            images: template
                .image_layers
                .iter()
                .map(|l| (l.layer_id.as_str(), l))
                .collect(),
            texts: template
                .text_layers
                .iter()
                .map(|l| (l.layer_id.as_str(), l))
                .collect(),
        }
    }

    /// Resolve `layer_id` in the combined image ∪ text identifier space.
    ///
    /// A layer id must name exactly one definition: absent from both tables
    /// is [`MixError::UnknownLayer`], present in both is
    /// [`MixError::AmbiguousLayer`].
    pub fn resolve(&self, layer_id: &str) -> MixResult<LayerRef<'a>> {
        match (self.images.get(layer_id), self.texts.get(layer_id)) {
            (Some(_), Some(_)) => Err(MixError::AmbiguousLayer(layer_id.to_string())),
            (Some(image), None) => Ok(LayerRef::Image(image)),
            (None, Some(text)) => Ok(LayerRef::Text(text)),
            (None, None) => Err(MixError::UnknownLayer(layer_id.to_string())),
        }
    }
}
