//! Pet entities as `hecs` entities: plain components, capability
//! components, and the systems that drive a tick.

pub mod capabilities;
pub mod components;
pub mod entity;
pub mod systems;
