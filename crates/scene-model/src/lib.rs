//! MockReel Scene Model
//!
//! Defines the core data contracts for MockReel promo videos:
//! - **Scenes:** Screenshots, copy, and per-scene phone appearance
//! - **Targets:** Which scene an edit applies to, including the virtual
//!   intro/outro aliases
//! - **Settings:** Aspect ratio, intro/outro cards, and the audio bed
//! - **Storyboards:** A JSON description of a whole video, used as CLI input
//!
//! Nothing here performs I/O except [`Storyboard`] loading and saving.

pub mod background;
pub mod scene;
pub mod settings;
pub mod storyboard;
pub mod target;

pub use background::*;
pub use scene::*;
pub use settings::*;
pub use storyboard::*;
pub use target::*;
