//! Catalogue search use-case.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::Page;

use super::ports::{CataloguePersistenceError, CatalogueRepository, PetsQuery};
use super::{Error, Pet, PetSearch};

pub(crate) fn map_catalogue_error(error: CataloguePersistenceError) -> Error {
    match error {
        CataloguePersistenceError::Connection { message } => Error::service_unavailable(message),
        CataloguePersistenceError::Query { message } => Error::internal(message),
    }
}

/// [`PetsQuery`] backed by a [`CatalogueRepository`].
#[derive(Clone)]
pub struct CatalogueService<R> {
    repository: Arc<R>,
}

impl<R> CatalogueService<R> {
    /// Create a service over `repository`.
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R> PetsQuery for CatalogueService<R>
where
    R: CatalogueRepository,
{
    async fn search(&self, search: &PetSearch) -> Result<Page<Pet>, Error> {
        self.repository
            .search(search)
            .await
            .map_err(map_catalogue_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::PetSearchParams;
    use crate::domain::ports::MockCatalogueRepository;
    use pagination::{PageMeta, PageRequest};
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn search_passes_compiled_query_through() {
        let search = PetSearchParams::default().compile().expect("compile");
        let expected = search.clone();
        let mut repository = MockCatalogueRepository::new();
        repository
            .expect_search()
            .withf(move |s| *s == expected)
            .times(1)
            .return_once(|_| {
                let request = PageRequest::first(6).expect("page size");
                Ok(Page::new(Vec::new(), PageMeta::new(request, 0)))
            });
        let service = CatalogueService::new(Arc::new(repository));

        let page = service.search(&search).await.expect("search");
        assert!(page.items.is_empty());
        assert_eq!(page.meta.total_pages, 0);
    }

    #[rstest]
    #[case(CataloguePersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(CataloguePersistenceError::query("syntax"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn persistence_failures_are_mapped(
        #[case] failure: CataloguePersistenceError,
        #[case] code: ErrorCode,
    ) {
        let mut repository = MockCatalogueRepository::new();
        repository
            .expect_search()
            .return_once(move |_| Err(failure));
        let service = CatalogueService::new(Arc::new(repository));
        let search = PetSearchParams::default().compile().expect("compile");

        let err = service.search(&search).await.expect_err("must fail");
        assert_eq!(err.code(), code);
    }
}
