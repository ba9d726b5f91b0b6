pub mod output;
pub mod render;
pub mod terminal;
pub mod theme;
