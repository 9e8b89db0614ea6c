pub mod agent;
pub mod camera;
pub mod constants;
pub mod definition;
pub mod effects;
pub mod events;
pub mod match_result;
pub mod missile;
pub mod recorder;
pub mod session;
pub mod ship;
pub mod shot;
pub mod state;
pub mod systems;
pub mod telemetry;
pub mod trail;
pub mod tunables;
pub mod world;
