//! Target intraocular pressure and glaucoma risk engine.
//!
//! The crate is organised leaf-first: [`risk`] scores individual risk-factor
//! domains, [`targets`] turns those scores into per-eye target pressures and keeps
//! the versioned target history, [`monitoring`] classifies measured pressures and
//! progression trends, and [`assessment`] folds everything into a composite risk
//! level and a follow-up plan. Every scoring function is pure.

pub mod assessment;
pub mod config;
pub mod error;
pub mod eye;
pub mod monitoring;
pub mod risk;
pub mod router;
pub mod targets;
pub mod telemetry;

pub use eye::{Eye, EyePair};
