//! # Engine 2D
//!
//! An entity-component engine core for 2D action platformers.
//!
//! ## Features
//!
//! - **ECS Architecture**: entities as component bags, systems filtered by
//!   component masks, deferred spawn/destroy with well-defined flush points
//! - **Fixed-Step Physics**: deterministic world simulation decoupled from
//!   the host frame rate
//! - **Grid Broad Phase**: pixels-per-meter grid container for body and
//!   fixture queries
//! - **Contact Lifecycle**: begin/continue/end classification across ticks
//! - **Pluggable Collision**: filter, listener, and handler seams for
//!   game-specific behavior
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use engine_2d::prelude::*;
//!
//! let config = SimulationConfig::default();
//! let ppm = config.ppm;
//! let mut engine = GameEngine::new();
//! let world = WorldSystem::new(&config, Box::new(move || {
//!     Some(Box::new(GridWorldContainer::new(ppm)) as Box<dyn WorldContainer>)
//! }));
//! engine.add_system(world.into_system());
//!
//! let mut entity = Entity::new("crate");
//! entity.add_component(Body::new(BodyType::Dynamic));
//! let id = engine.spawn(entity, Properties::new()).expect("spawn rejected");
//!
//! loop {
//!     engine.update(1.0 / 60.0).expect("engine disposed");
//!     # break;
//! }
//! # let _ = id;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod cullables;
pub mod ecs;
pub mod events;
pub mod foundation;
pub mod physics;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SimulationConfig},
        cullables::{Cullable, CullablesComponent, CullablesSystem, CullOnEvent},
        ecs::{
            CommandBuffer, Component, ComponentMask, Entity, EntityBehavior, EntityId,
            EntityRegistry, EngineError, GameEngine, GameSystem, SystemLogic,
        },
        events::{Event, EventListener, EventManager, ListenerId},
        foundation::{
            math::{Rect, Vec2},
            pool::Pool,
            properties::Properties,
            time::{FixedStepAccumulator, Timer},
        },
        physics::{
            Body, BodyType, CollisionHandler, Contact, ContactFilter, ContactListener,
            Fixture, FixtureHandle, PhysicsData, PhysicsFlags, StandardCollisionHandler,
            WorldSystem,
        },
        spatial::{BodyEntry, FixtureEntry, GridWorldContainer, WorldContainer},
    };
}
