mod input;
mod status_bar;

pub use input::{InputResult, TextInput};
pub use status_bar::{draw_status_bar, StatusLine};
