use std::{error::Error, fmt};

use crate::catalog::{CatalogError, MetadataCatalog};
use crate::client::{BcrpClient, ClientError};
use crate::render::RenderError;

pub mod data;
pub mod search;

pub use data::{ChartReport, ChartRequest, ChartStatus, DataReport};
pub use search::{MetadataStatus, RefreshReport, SeriesSearch};

#[derive(Debug)]
pub enum ControlError {
    Catalog(CatalogError),
    Client(ClientError),
    Render(RenderError),
    InvalidInput(String),
}

impl ControlError {
    /// True when the caller supplied bad arguments, as opposed to an upstream
    /// or internal failure.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::Client(ClientError::InvalidInput(_))
        )
    }
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog(err) => write!(f, "{err}"),
            Self::Client(err) => write!(f, "{err}"),
            Self::Render(err) => write!(f, "{err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
        }
    }
}

impl Error for ControlError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Catalog(err) => Some(err),
            Self::Client(err) => Some(err),
            Self::Render(err) => Some(err),
            Self::InvalidInput(_) => None,
        }
    }
}

impl From<CatalogError> for ControlError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

impl From<ClientError> for ControlError {
    fn from(err: ClientError) -> Self {
        Self::Client(err)
    }
}

impl From<RenderError> for ControlError {
    fn from(err: RenderError) -> Self {
        Self::Render(err)
    }
}

impl From<tokio::task::JoinError> for ControlError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Render(RenderError::Io(std::io::Error::other(err)))
    }
}

/// Facade over the metadata catalog and the statistics client.
#[derive(Debug, Clone)]
pub struct BcrpControlPlane {
    catalog: MetadataCatalog,
    client: BcrpClient,
}

impl BcrpControlPlane {
    #[must_use]
    pub const fn new(catalog: MetadataCatalog, client: BcrpClient) -> Self {
        Self { catalog, client }
    }

    #[must_use]
    pub const fn catalog(&self) -> &MetadataCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn client(&self) -> &BcrpClient {
        &self.client
    }
}
