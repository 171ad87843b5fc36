use domain::{DomainError, RepositoryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

impl ApplicationError {
    /// 资源不存在的快捷方式
    pub fn not_found(resource_type: &str, resource_id: impl ToString) -> Self {
        DomainError::resource_not_found(resource_type, resource_id.to_string()).into()
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Repository(value)
    }
}
