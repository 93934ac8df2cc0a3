//! Presentation of fetched series: labelled tables and SVG line charts.

pub mod chart;
pub mod table;

use std::error::Error;
use std::fmt;

pub use chart::{ChartOutput, ChartSpec, render_line_chart};
pub use table::{LabeledTable, resolve_labels};

#[derive(Debug)]
pub enum RenderError {
    NoData,
    Draw(String),
    Io(std::io::Error),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => write!(f, "no numeric observations to render"),
            Self::Draw(message) => write!(f, "chart drawing failed: {message}"),
            Self::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
