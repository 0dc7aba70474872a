mod canvas;
mod line;

pub use canvas::BrailleCanvas;
pub use line::draw_line;
