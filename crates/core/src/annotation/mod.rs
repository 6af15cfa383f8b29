pub mod box_painter;
mod glyphs;
