//! Pixel payloads and their lazy accessor.
//!
//! Pixel data is only materialized when image comparison asks for it. Each
//! instance holds a [`PixelSource`] and caches the first load result
//! (payload, absent, or failure) for its lifetime, unless the caller asks
//! for an uncached load.

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Linear modality transform: `value * slope + intercept`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rescale {
    pub slope: f64,
    pub intercept: f64,
}

impl Rescale {
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        value * self.slope + self.intercept
    }
}

/// VOI window given as center and width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
    pub center: f64,
    pub width: f64,
}

impl Window {
    pub fn new(center: f64, width: f64) -> Self {
        Self { center, width }
    }

    /// `[center - width/2, center + width/2]`, or `None` for a non-positive
    /// or non-finite width.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        if !(self.width.is_finite() && self.center.is_finite()) || self.width <= 0.0 {
            return None;
        }
        let half = self.width / 2.0;
        Some((self.center - half, self.center + half))
    }
}

/// A decoded pixel array.
///
/// Samples are stored row-major as `f64` regardless of the source bit depth
/// so that differences never wrap around.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelArray {
    /// `[frames?, rows, columns, samples?]`; frames and samples are only
    /// present when greater than one.
    pub shape: Vec<usize>,
    pub samples: Vec<f64>,
    pub rescale: Option<Rescale>,
    pub window: Option<Window>,
}

impl PixelArray {
    /// Creates an array without normalization parameters.
    pub fn new(shape: Vec<usize>, samples: Vec<f64>) -> Self {
        Self {
            shape,
            samples,
            rescale: None,
            window: None,
        }
    }

    /// Builds a 2D array from rows of samples.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Self {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let samples = rows
            .iter()
            .flat_map(|r| r.as_ref().iter().copied())
            .collect();
        Self::new(vec![height, width], samples)
    }

    pub fn with_rescale(mut self, rescale: Rescale) -> Self {
        self.rescale = Some(rescale);
        self
    }

    pub fn with_window(mut self, window: Window) -> Self {
        self.window = Some(window);
        self
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of samples implied by the shape.
    pub fn expected_len(&self) -> usize {
        self.shape.iter().product()
    }

    /// Shape rendered as `(2, 2)`.
    pub fn shape_label(&self) -> String {
        format_shape(&self.shape)
    }
}

pub fn format_shape(shape: &[usize]) -> String {
    let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
    format!("({})", dims.join(", "))
}

/// Why a pixel payload could not be produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelError {
    pub reason: String,
}

impl PixelError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PixelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for PixelError {}

/// Result of loading a payload: `Ok(None)` means the instance carries no
/// pixel data at all.
pub type PixelLoad = Result<Option<PixelArray>, PixelError>;

/// Something that can produce the pixel payload of one instance.
pub trait PixelSource: Send + Sync + fmt::Debug {
    fn load(&self) -> PixelLoad;
}

/// A payload already held in memory.
#[derive(Clone, Debug)]
pub struct InMemoryPixels(pub PixelLoad);

impl PixelSource for InMemoryPixels {
    fn load(&self) -> PixelLoad {
        self.0.clone()
    }
}

/// Lazy, cached accessor around a [`PixelSource`].
#[derive(Clone)]
pub struct LazyPixels {
    source: Option<Arc<dyn PixelSource>>,
    cache: Arc<OnceLock<PixelLoad>>,
}

impl LazyPixels {
    pub fn new(source: Arc<dyn PixelSource>) -> Self {
        Self {
            source: Some(source),
            cache: Arc::new(OnceLock::new()),
        }
    }

    /// An accessor for an instance without any pixel data.
    pub fn none() -> Self {
        Self {
            source: None,
            cache: Arc::new(OnceLock::new()),
        }
    }

    /// Loads on first call; later calls return the cached result.
    pub fn get(&self) -> &PixelLoad {
        self.cache.get_or_init(|| match &self.source {
            Some(source) => source.load(),
            None => Ok(None),
        })
    }

    /// The cached result if there is one, otherwise a fresh load that is
    /// not kept.
    pub fn get_uncached(&self) -> Cow<'_, PixelLoad> {
        if let Some(load) = self.cache.get() {
            return Cow::Borrowed(load);
        }
        match &self.source {
            Some(source) => Cow::Owned(source.load()),
            None => Cow::Owned(Ok(None)),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }
}

impl fmt::Debug for LazyPixels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyPixels")
            .field("source", &self.source)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl Default for LazyPixels {
    fn default() -> Self {
        Self::none()
    }
}
