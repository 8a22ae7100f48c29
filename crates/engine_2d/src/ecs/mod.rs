//! Entity-component-system core
//!
//! Entities are bags of typed components plus lifecycle hooks; systems
//! filter entities by component mask and batch-process them each tick; the
//! engine drives the whole simulation with queue-then-flush semantics for
//! every structural mutation.

mod command;
mod component;
mod engine;
mod entity;
mod registry;
mod system;

pub use command::CommandBuffer;
pub use component::{Component, ComponentMap, ComponentMask};
pub use engine::{EngineError, GameEngine};
pub use entity::{Entity, EntityBehavior, EntityId};
pub use registry::EntityRegistry;
pub use system::{GameSystem, Membership, Removal, SystemLogic};
