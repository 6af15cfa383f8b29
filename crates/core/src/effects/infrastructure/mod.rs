pub mod background_effect;
pub mod blur_effect;
pub mod edge_highlight_effect;
pub mod effect_factory;
mod gaussian;
pub mod pixelate_effect;
pub mod recolor_effect;
pub mod replace_effect;
mod roi;
