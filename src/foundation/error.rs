/// Convenience result type used across ImageMix.
pub type MixResult<T> = Result<T, MixError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Variants split into two policy groups: errors tied to shared setup
/// ([`Validation`](MixError::Validation), [`FontLoad`](MixError::FontLoad))
/// are fatal to a run, while errors tied to a single layout entry abort only
/// that entry and surface in the batch report.
#[derive(thiserror::Error, Debug)]
pub enum MixError {
    /// Invalid template, row, or option data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A layout references a canvas id absent from the canvas table.
    #[error("unknown canvas '{0}'")]
    UnknownCanvas(String),

    /// A layout references a layer id absent from both layer tables.
    #[error("unknown layer '{0}'")]
    UnknownLayer(String),

    /// A layer id is defined in both the image and the text layer table.
    #[error("ambiguous layer '{0}': defined as both image and text")]
    AmbiguousLayer(String),

    /// The asset collaborator has no file under the given name.
    #[error("asset not found: '{0}'")]
    AssetNotFound(String),

    /// Asset bytes could not be decoded as an image.
    #[error("decode error: {0}")]
    Decode(String),

    /// The font resource could not be loaded or is missing.
    #[error("font load error: {0}")]
    FontLoad(String),

    /// The output collaborator failed to persist a creative.
    #[error("write error: {0}")]
    Write(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MixError {
    /// Build a [`MixError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MixError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`MixError::FontLoad`] value.
    pub fn font_load(msg: impl Into<String>) -> Self {
        Self::FontLoad(msg.into())
    }

    /// Build a [`MixError::Write`] value.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    /// True for errors scoped to a single layout entry; false for errors
    /// that invalidate the whole run.
    pub fn is_entry_scoped(&self) -> bool {
        matches!(
            self,
            Self::UnknownCanvas(_)
                | Self::UnknownLayer(_)
                | Self::AmbiguousLayer(_)
                | Self::AssetNotFound(_)
                | Self::Decode(_)
                | Self::Write(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            MixError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(MixError::decode("x").to_string().contains("decode error:"));
        assert!(
            MixError::font_load("x")
                .to_string()
                .contains("font load error:")
        );
        assert!(MixError::write("x").to_string().contains("write error:"));
        assert!(
            MixError::UnknownCanvas("c1".to_string())
                .to_string()
                .contains("unknown canvas 'c1'")
        );
        assert!(
            MixError::UnknownLayer("l1".to_string())
                .to_string()
                .contains("unknown layer 'l1'")
        );
        assert!(
            MixError::AmbiguousLayer("l1".to_string())
                .to_string()
                .contains("ambiguous layer 'l1'")
        );
        assert!(
            MixError::AssetNotFound("bg.png".to_string())
                .to_string()
                .contains("asset not found: 'bg.png'")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = MixError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn entry_scope_split_matches_policy() {
        assert!(MixError::UnknownCanvas("c".into()).is_entry_scoped());
        assert!(MixError::UnknownLayer("l".into()).is_entry_scoped());
        assert!(MixError::AmbiguousLayer("l".into()).is_entry_scoped());
        assert!(MixError::AssetNotFound("f".into()).is_entry_scoped());
        assert!(MixError::decode("d").is_entry_scoped());
        assert!(MixError::write("w").is_entry_scoped());

        assert!(!MixError::validation("v").is_entry_scoped());
        assert!(!MixError::font_load("f").is_entry_scoped());
    }
}
