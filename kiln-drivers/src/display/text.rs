//! Character-cell status display
//!
//! Formats a [`StatusSnapshot`] into four short text rows and hands the rows
//! that changed to a [`TextSink`] (an LCD, an OLED text renderer, a log).

use core::fmt::Write;

use heapless::String;
use kiln_core::traits::{DisplayError, StatusDisplay, StatusSnapshot};

/// Number of character rows
pub const ROWS: usize = 4;

/// Number of character columns per row
pub const ROW_WIDTH: usize = 21;

/// Character-addressed output device
pub trait TextSink {
    /// Replace the contents of `row` with `text`
    ///
    /// `text` is at most [`ROW_WIDTH`] characters.
    fn draw_row(&mut self, row: u8, text: &str) -> Result<(), DisplayError>;

    /// Push buffered content to the device
    fn flush(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}

type Row = String<ROW_WIDTH>;

/// Four-row text rendering of the oven status
///
/// Row layout:
///
/// 0. `Temp: 25.00 C`
/// 1. profile name
/// 2. phase label
/// 3. `Time: 61/1800` while holding, `Sensor fault` when faulted
pub struct TextStatusDisplay<T> {
    sink: T,
    /// Rows currently shown on the sink
    shown: [Row; ROWS],
    /// Nothing drawn yet, first render writes every row
    fresh: bool,
}

impl<T: TextSink> TextStatusDisplay<T> {
    /// Create a new display over `sink`
    pub fn new(sink: T) -> Self {
        Self {
            sink,
            shown: core::array::from_fn(|_| String::new()),
            fresh: true,
        }
    }

    /// Text currently shown on `row`
    pub fn row(&self, row: usize) -> Option<&str> {
        self.shown.get(row).map(|s| s.as_str())
    }

    /// The underlying sink
    pub fn sink(&self) -> &T {
        &self.sink
    }

    /// Mutable access to the underlying sink
    pub fn sink_mut(&mut self) -> &mut T {
        &mut self.sink
    }

    fn format(status: &StatusSnapshot<'_>) -> Result<[Row; ROWS], DisplayError> {
        let mut rows: [Row; ROWS] = core::array::from_fn(|_| String::new());

        let temperature = match status.temperature_c {
            Some(t) => write!(rows[0], "Temp: {:.2} C", t),
            None => write!(rows[0], "Temp: --"),
        };
        temperature.map_err(|_| DisplayError::BufferOverflow)?;

        rows[1]
            .push_str(status.profile_name)
            .map_err(|_| DisplayError::BufferOverflow)?;
        rows[2]
            .push_str(status.phase_label())
            .map_err(|_| DisplayError::BufferOverflow)?;

        if status.sensor_fault {
            rows[3]
                .push_str("Sensor fault")
                .map_err(|_| DisplayError::BufferOverflow)?;
        } else if let Some(soak) = status.soak {
            write!(rows[3], "Time: {}/{}", soak.elapsed_s, soak.total_s)
                .map_err(|_| DisplayError::BufferOverflow)?;
        }

        Ok(rows)
    }
}

impl<T: TextSink> StatusDisplay for TextStatusDisplay<T> {
    fn render(&mut self, status: &StatusSnapshot<'_>) -> Result<(), DisplayError> {
        let rows = Self::format(status)?;

        let mut dirty = false;
        for (index, (row, shown)) in rows.iter().zip(self.shown.iter_mut()).enumerate() {
            if self.fresh || row.as_str() != shown.as_str() {
                self.sink.draw_row(index as u8, row)?;
                shown.clone_from(row);
                dirty = true;
            }
        }

        if dirty {
            self.sink.flush()?;
        }
        self.fresh = false;
        Ok(())
    }
}
