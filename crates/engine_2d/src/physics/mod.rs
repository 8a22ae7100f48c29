//! Fixed-step 2D physics
//!
//! Bodies are axis-aligned boxes integrated on a fixed timestep; fixtures
//! are sensor boxes riding on bodies. The [`WorldSystem`] drives the cycle:
//! pre-process hooks, integration, contact collection, contact dispatch,
//! collision resolution, post-process hooks.

mod body;
mod collision;
mod contact;
mod fixture;
mod world_system;

pub use body::{Body, BodyType, PhysicsData, PhysicsFlags};
pub use collision::{CollisionHandler, ContactFilter, ContactListener, StandardCollisionHandler};
pub use contact::Contact;
pub use fixture::{Fixture, FixtureHandle};
pub use world_system::{ContainerSupplier, WorldSystem};
