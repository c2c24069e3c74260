#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scenario variants assembled from the world, crop, and energy systems.
//!
//! Every variant starts from a TOML-backed configuration and produces a
//! [`World`](drone_field_world::World) parameterised by its own rules:
//! the drone farming field, the planting challenge, and the navigation
//! challenge.

mod config;
mod farm;
mod navigation;
mod planting;

pub use config::{FieldConfig, NavigationConfig, PlantingConfig};
pub use farm::{build as build_drone_field, FarmCore, FarmRules, SEED_SPAWN_INTERVAL};
pub use navigation::{
    build as build_navigation_challenge, default_obstacle_field, parse_layout, NavigationRules,
    ParsedLayout,
};
pub use planting::{build as build_planting_challenge, default_obstacles, PlantingRules};
