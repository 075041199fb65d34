//! Error conversion glue between layers.
//!
//! The domain layer must not depend on repository or service error types,
//! so the `From` impls connecting them live here. Only the repository
//! conversion is available with the `data` feature alone.

use crate::domain::types::TypeConstraintError;
use crate::repository::errors::RepositoryError;

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

#[cfg(feature = "server")]
mod server {
    use crate::forms::products::ProductFormError;
    use crate::repository::errors::RepositoryError;
    use crate::services::ServiceError;
    use crate::storage::StorageError;

    impl From<ProductFormError> for ServiceError {
        fn from(val: ProductFormError) -> Self {
            ServiceError::Form(val.to_string())
        }
    }

    impl From<StorageError> for ServiceError {
        fn from(val: StorageError) -> Self {
            ServiceError::Upstream(val.to_string())
        }
    }

    impl From<RepositoryError> for ServiceError {
        fn from(val: RepositoryError) -> Self {
            ServiceError::Persistence(val.to_string())
        }
    }
}
