//! Deployment client binding a contract identifier to its source file
use crate::backend::{ClarityBackend, ProviderError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Client {
    /// Fully-qualified contract identifier, e.g. `ST1….counter`
    pub name: String,
    pub contract_file: PathBuf,
    backend: Arc<dyn ClarityBackend>,
}

impl Client {
    pub fn new(name: impl Into<String>, contract_file: impl AsRef<Path>, backend: Arc<dyn ClarityBackend>) -> Self {
        Self {
            name: name.into(),
            contract_file: contract_file.as_ref().to_path_buf(),
            backend,
        }
    }

    pub async fn deploy_contract(&self) -> Result<(), ProviderError> {
        self.backend.launch(&self.name, &self.contract_file).await?;
        info!(
            contract = %self.name,
            file = %self.contract_file.display(),
            "Contract deployed"
        );
        Ok(())
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("name", &self.name)
            .field("contract_file", &self.contract_file)
            .finish()
    }
}
