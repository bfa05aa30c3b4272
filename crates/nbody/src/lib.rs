//! Point masses embedded in a gas disk
//!
//! Bodies live in a non-inertial frame centered on one or more of them. This
//! crate keeps the body list, the frame-center bookkeeping (indirect term,
//! re-centering), the direct N-body accelerations and the orbital
//! integrators used to propagate the system.

pub mod body;
pub mod error;
pub mod forces;
pub mod frame;
pub mod integrator;
pub mod system;

#[cfg(test)]
mod body_test;

pub use body::{Body, BodyId};
pub use error::{IntegrationError, SystemError};
pub use frame::{FrameCenter, IndirectTerm, ReferenceCenter};
pub use integrator::{CashKarp, IntegratorState, Leapfrog, MirrorParticle, OrbitalIntegrator};
pub use system::PlanetarySystem;
