//! JPL ephemeris reading
//!
//! Readers for JPL Development Ephemerides distributed as binary SPK files in
//! the SPICE DAF container.
//!
//! # Main Components
//!
//! - `daf`: Double Array File format reader (underlying format of SPK files)
//! - `spk`: Spacecraft Planet Kernel segments and Chebyshev evaluation
//! - `kernel`: barycentric positions by chaining segments
//! - `names`: Mappings between body names and NAIF ID numbers
//! - `calendar`: Julian day and calendar date conversion

pub mod calendar;
pub mod chebyshev;
pub mod daf;
pub mod errors;
pub mod kernel;
pub mod names;
pub mod spk;

pub use self::errors::JplephemError;
pub use self::kernel::SpiceKernel;
pub use self::spk::SPK;
