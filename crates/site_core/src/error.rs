use shared::error::ValidationError;
use storage::StoreError;
use thiserror::Error;

use crate::{export::ExportError, remote::RemoteError};

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("registration rejected: {0}")]
    Validation(#[from] ValidationError),
    #[error("local store failure: {0}")]
    Store(#[from] StoreError),
    #[error("remote record source failure: {0}")]
    Remote(#[from] RemoteError),
    #[error("export rendering failed: {0}")]
    Export(#[from] ExportError),
    #[error("download could not be delivered: {0}")]
    Download(#[source] anyhow::Error),
}

pub type SiteResult<T> = std::result::Result<T, SiteError>;
