pub mod clock;
pub mod color;
pub mod config;
pub mod range;
pub mod resize;
pub mod scheduler;
pub mod settings;
pub mod store;
pub mod surface;

pub use clock::{cycle, AnimationClock};
pub use color::{Hsla, InvalidColor, Rgb, Rgba};
pub use config::{load_config, save_config, ConfigError, SceneConfig};
pub use range::ParamRange;
pub use resize::{ResizeBus, ResizeSubscription, Viewport};
pub use scheduler::{FrameContext, FrameHost, FrameQueue, FrameScheduler, FrameToken, Scene, SceneRunner};
pub use settings::{ColorField, MerkabaSettings, MerkabaUpdate, PatternSettings, PatternUpdate, Settings};
pub use store::{SettingsHandle, SettingsStore};
pub use surface::{skia_color, FrameBuffer, SurfaceError};
