//! Representative replicated object types.
//!
//! Assets: [`AudioCategory`] (full-resync), [`ParticleSystem`] (delta),
//! [`FluidFx`] (delta, no client-side removal).
//! Components: [`MovementStates`] and [`EntityStats`] (delta, per field).

mod audio_category;
mod entity_stats;
mod fluid_fx;
mod movement_states;
mod particle_system;

pub use audio_category::{AudioCategory, AudioCategoryPayload, MAX_AUDIO_CATEGORIES};
pub use entity_stats::{EntityStats, EntityStatsPayload};
pub use fluid_fx::{FluidFx, FluidFxPayload};
pub use movement_states::{MovementStates, MovementStatesPayload};
pub use particle_system::{ParticleSystem, ParticleSystemPayload};
