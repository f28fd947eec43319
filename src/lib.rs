//! **grfkit** - a decoder and interpreter for NewGRF add-on data files.
//!
//! A NewGRF is a stream of raw sprites and pseudo-sprites. Pseudo-sprites
//! are small action records that override vehicle, station, bridge, global
//! and sound properties, build sprite-group trees, and steer the walk with
//! conditional skips. [`loader::Loader`] runs them through the three load
//! stages and leaves the result in [`data::GameData`] and
//! [`registry::FileRegistry`].
//!
//! # Modules
//! | Module | Contents |
//! |--------|----------|
//! | [`loader`]      | Three-stage load driver |
//! | [`actions`]     | One handler per pseudo-sprite action |
//! | [`features`]    | Property tables per feature |
//! | [`spritegroup`] | Sprite-group graph and its resolver |
//! | [`vars`]        | Variables visible to conditionals |
//! | [`registry`]    | Loaded files, parameters and labels |
//! | [`data`]        | Product of a load |
//! | [`cursor`]      | Bounds-checked pseudo-sprite reader |
//! | [`source`]      | File providers and raw sprite sinks |
//! | [`config`]      | JSON load configuration |
//! | [`diagnostics`] | Leveled, located load messages |
//!
//! ```no_run
//! use grfkit::config::LoadConfig;
//! use grfkit::loader::Loader;
//! use grfkit::source::DiskFiles;
//!
//! let config = LoadConfig::from_file("newgrf.json")?;
//! let mut loader = Loader::new(DiskFiles::new("data"), config);
//! loader.load()?;
//! for d in loader.diagnostics().entries() {
//!     println!("{d}");
//! }
//! # Ok::<(), grfkit::Error>(())
//! ```

pub mod actions;
pub mod config;
pub mod cursor;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod features;
pub mod loader;
pub mod registry;
pub mod source;
pub mod spritegroup;
pub mod utils;
pub mod vars;

pub use error::{Error, Result};
