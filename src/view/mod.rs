pub mod log;
pub mod model;
pub mod render;

pub use log::{highlight_line, Highlight, LogEntry, LogPane, LogSpan};
pub use model::{Button, Card, CardFace, Connection, Controls, HpBar, View};
pub use render::Renderer;
