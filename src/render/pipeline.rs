use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use rayon::prelude::*;

use crate::{
    assets::cache::ImageCache,
    assets::font::FontResource,
    assets::source::AssetSource,
    foundation::color::Rgba8,
    foundation::error::{MixError, MixResult},
    output::OutputSink,
    render::{layer::render_layer, surface::Surface},
    template::model::{Canvas, LayoutEntry, Template},
    template::registry::LayerRegistry,
};

/// Resampling filter used when an image layer's declared size differs from
/// its source dimensions. All choices are deterministic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ResizeFilter {
    /// Nearest neighbor.
    Nearest,
    /// Linear (bilinear) filtering.
    Triangle,
    /// Catmull-Rom (bicubic family).
    #[default]
    CatmullRom,
    /// Lanczos with window 3.
    Lanczos3,
}

impl ResizeFilter {
    pub(crate) fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            Self::Nearest => image::imageops::FilterType::Nearest,
            Self::Triangle => image::imageops::FilterType::Triangle,
            Self::CatmullRom => image::imageops::FilterType::CatmullRom,
            Self::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Rendering configuration shared by every entry in a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RenderOptions {
    /// Canvas fill where no layer covers it; default transparent white.
    pub background: Rgba8,
    /// Image layer resampling filter; default Catmull-Rom.
    pub filter: ResizeFilter,
}

/// Threading/worker-pool configuration for batch rendering.
#[derive(Clone, Debug, Default)]
pub struct BatchThreading {
    /// Render entries on a rayon worker pool instead of sequentially.
    pub parallel: bool,
    /// Worker count override; `None` uses rayon's default.
    pub threads: Option<usize>,
}

/// Shared flag to abandon the remainder of a batch.
///
/// Entries not yet started when the flag is raised are reported as
/// [`EntryOutcome::Skipped`]; an entry already rendering runs to completion
/// (no per-entry cancellation).
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// New, un-raised flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// True once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// What happened to one layout entry during a batch render.
#[derive(Debug)]
pub enum EntryOutcome {
    /// Rendered and written through the output sink.
    Rendered,
    /// Aborted by the first error; nothing was written for this entry.
    Failed(MixError),
    /// Not attempted because the batch was cancelled first.
    Skipped,
}

/// Per-entry result of a batch render.
#[derive(Debug)]
pub struct EntryReport {
    /// The entry's declared output file name.
    pub output_filename: String,
    /// What happened.
    pub outcome: EntryOutcome,
}

/// Result set of a whole batch, in template order.
#[derive(Debug)]
pub struct BatchReport {
    /// One report per layout entry.
    pub entries: Vec<EntryReport>,
}

impl BatchReport {
    /// Number of entries rendered and written.
    pub fn rendered(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Rendered))
    }

    /// Number of entries that failed.
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Failed(_)))
    }

    /// Number of entries skipped by cancellation.
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Skipped))
    }

    fn count(&self, pred: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }
}

/// The composition pipeline: renders layout entries of one template against
/// injected collaborators.
///
/// All shared state (template, registry, decoded-image cache, font) is
/// read-only or internally synchronized after construction, so entry
/// renders are independent and safe to run on a worker pool.
#[derive(Debug)]
pub struct Compositor<'t> {
    template: &'t Template,
    canvases: HashMap<&'t str, &'t Canvas>,
    registry: LayerRegistry<'t>,
    images: ImageCache,
    font: Option<FontResource>,
    options: RenderOptions,
}

impl<'t> Compositor<'t> {
    /// Validate `template` and wire up the collaborators.
    ///
    /// A font is required whenever the template defines text layers; that is
    /// shared setup, checked here and fatal to the run, unlike per-entry
    /// render errors.
    pub fn new(
        template: &'t Template,
        assets: Arc<dyn AssetSource>,
        font: Option<FontResource>,
        options: RenderOptions,
    ) -> MixResult<Self> {
        template.validate()?;
        if font.is_none() && !template.text_layers.is_empty() {
            return Err(MixError::font_load(
                "template defines text layers but no font resource was supplied",
            ));
        }

        Ok(Self {
            template,
            canvases: template
                .canvases
                .iter()
                .map(|c| (c.canvas_id.as_str(), c))
                .collect(),
            registry: LayerRegistry::new(template),
            images: ImageCache::new(assets),
            font,
            options,
        })
    }

    /// Render one layout entry to a finished surface.
    ///
    /// The first failing layer aborts the entry; a half-composed creative is
    /// never returned.
    #[tracing::instrument(skip_all, fields(output = %entry.output_filename))]
    pub fn render_entry(&self, entry: &LayoutEntry) -> MixResult<Surface> {
        let canvas = self
            .canvases
            .get(entry.canvas_id.as_str())
            .copied()
            .ok_or_else(|| MixError::UnknownCanvas(entry.canvas_id.clone()))?;

        let mut surface = Surface::new(canvas.width, canvas.height, self.options.background);
        for layer_id in &entry.layers {
            if layer_id.is_empty() {
                continue;
            }
            let layer = self.registry.resolve(layer_id)?;
            render_layer(
                &mut surface,
                layer,
                &self.images,
                self.font.as_ref(),
                &self.options,
            )?;
        }
        Ok(surface)
    }

    /// Render every layout entry and write the finished creatives through
    /// `sink`.
    ///
    /// Per-entry errors are collected in the report and never halt the
    /// batch. Report order follows the template; completion order between
    /// entries is unspecified when `threading.parallel` is set.
    pub fn render_batch(
        &self,
        sink: &dyn OutputSink,
        threading: &BatchThreading,
        cancel: &CancelFlag,
    ) -> MixResult<BatchReport> {
        let entries = &self.template.layouts;
        tracing::info!(
            entries = entries.len(),
            parallel = threading.parallel,
            "rendering batch"
        );

        let outcomes: Vec<EntryOutcome> = if threading.parallel {
            let pool = build_thread_pool(threading.threads)?;
            pool.install(|| {
                entries
                    .par_iter()
                    .map(|entry| self.entry_outcome(entry, sink, cancel))
                    .collect()
            })
        } else {
            entries
                .iter()
                .map(|entry| self.entry_outcome(entry, sink, cancel))
                .collect()
        };

        let report = BatchReport {
            entries: entries
                .iter()
                .zip(outcomes)
                .map(|(entry, outcome)| EntryReport {
                    output_filename: entry.output_filename.clone(),
                    outcome,
                })
                .collect(),
        };
        tracing::info!(
            rendered = report.rendered(),
            failed = report.failed(),
            skipped = report.skipped(),
            "batch finished"
        );
        Ok(report)
    }

    fn entry_outcome(
        &self,
        entry: &LayoutEntry,
        sink: &dyn OutputSink,
        cancel: &CancelFlag,
    ) -> EntryOutcome {
        if cancel.is_cancelled() {
            return EntryOutcome::Skipped;
        }

        match self.render_and_write(entry, sink) {
            Ok(()) => {
                tracing::debug!(output = %entry.output_filename, "entry rendered");
                EntryOutcome::Rendered
            }
            Err(e) => {
                tracing::warn!(output = %entry.output_filename, error = %e, "entry failed");
                EntryOutcome::Failed(e)
            }
        }
    }

    fn render_and_write(&self, entry: &LayoutEntry, sink: &dyn OutputSink) -> MixResult<()> {
        let surface = self.render_entry(entry)?;
        sink.write_png(&entry.output_filename, &surface.to_rgba_image())
    }
}

fn build_thread_pool(threads: Option<usize>) -> MixResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(MixError::validation(
            "batch threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| anyhow::Error::new(e).context("build rayon thread pool").into())
}
