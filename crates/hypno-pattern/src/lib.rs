pub mod analyser;
pub mod audio;
pub mod compositor;
pub mod fractal;
pub mod primitive;
pub mod raster;
pub mod scene;

pub use analyser::{analyser_channel, AnalyserSource, PcmSender, SpectrumAnalyser};
pub use audio::{AudioError, AudioModulator, AudioOverrides, FrequencySource};
pub use compositor::{field_points, FieldPoint, LayerCompositor};
pub use fractal::{curve_count, fractal_pattern, PatternCurve};
pub use primitive::{Blend, DisplayList, DrawItem, Paint, Shape2};
pub use raster::rasterize;
pub use scene::{PatternScene, PATTERN_VIEWPORT};
