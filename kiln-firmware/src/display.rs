//! Status output over defmt
//!
//! The board has no panel wired yet, so status rows go to the RTT log.
//! Only changed rows reach the sink, which keeps the log readable.

use defmt::*;
use kiln_core::traits::DisplayError;
use kiln_drivers::display::TextSink;

/// Text sink that logs each updated row
pub struct LogSink;

impl TextSink for LogSink {
    fn draw_row(&mut self, row: u8, text: &str) -> Result<(), DisplayError> {
        info!("[{}] {}", row, text);
        Ok(())
    }
}
