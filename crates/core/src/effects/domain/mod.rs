pub mod effect_kind;
pub mod effect_parameters;
pub mod face_effect;
