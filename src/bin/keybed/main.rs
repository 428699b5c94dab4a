//! keybed - a polyphonic synthesizer played from the typing keyboard
//!
//! Run with: cargo run

mod app;
mod ui;

use app::Keybed;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    Keybed::new().run()
}
