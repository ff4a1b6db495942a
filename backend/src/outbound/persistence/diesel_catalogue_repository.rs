//! PostgreSQL-backed [`CatalogueRepository`].
//!
//! Each [`PetPredicate`] becomes one boxed Diesel expression and the clauses
//! are AND-ed onto a boxed query, so every user-supplied value travels as a
//! bind parameter.

use async_trait::async_trait;
use diesel::dsl::sql;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use pagination::{Page, PageMeta};

use crate::domain::ports::{CataloguePersistenceError, CatalogueRepository};
use crate::domain::{AgeBand, NewPet, Pet, PetFilter, PetId, PetPredicate, PetSearch, PetSort};

use super::diesel_helpers::{like_pattern, map_diesel_error, map_pool_error};
use super::models::{NewPetRow, PetRow};
use super::pool::DbPool;
use super::schema::pets;

type Clause = Box<dyn BoxableExpression<pets::table, Pg, SqlType = Bool>>;

/// Diesel implementation of [`CatalogueRepository`].
#[derive(Clone)]
pub struct DieselCatalogueRepository {
    pool: DbPool,
}

impl DieselCatalogueRepository {
    /// Create a repository over `pool`.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn diesel_error(error: &diesel::result::Error) -> CataloguePersistenceError {
    map_diesel_error(
        error,
        CataloguePersistenceError::query,
        CataloguePersistenceError::connection,
    )
}

fn age_clause(band: AgeBand) -> Clause {
    match band.bounds() {
        (low, Some(high)) => Box::new(pets::age.between(low, high)),
        (low, None) => Box::new(pets::age.ge(low)),
    }
}

fn any_of(clauses: impl IntoIterator<Item = Clause>) -> Clause {
    clauses
        .into_iter()
        .reduce(|acc, next| Box::new(acc.or(next)))
        .unwrap_or_else(|| Box::new(sql::<Bool>("FALSE")))
}

fn clause(predicate: &PetPredicate) -> Clause {
    match predicate {
        PetPredicate::Status(status) => Box::new(pets::status.eq(status.as_str().to_owned())),
        PetPredicate::Species(species) => Box::new(pets::species.eq(species.clone())),
        PetPredicate::Text(term) => {
            let pattern = like_pattern(term);
            any_of([
                Box::new(pets::name.ilike(pattern.clone())) as Clause,
                Box::new(pets::breed.ilike(pattern.clone())),
                Box::new(pets::bio.ilike(pattern)),
            ])
        }
        PetPredicate::Location(location) => Box::new(pets::location.eq(location.clone())),
        PetPredicate::AnyLocation(locations) => {
            Box::new(pets::location.eq_any(locations.clone()))
        }
        PetPredicate::MinPrice(min) => Box::new(pets::price.ge(*min)),
        PetPredicate::MaxPrice(max) => Box::new(pets::price.le(*max)),
        PetPredicate::AnyAge(bands) => any_of(bands.iter().copied().map(age_clause)),
    }
}

fn filtered(filter: &PetFilter) -> pets::BoxedQuery<'static, Pg> {
    filter
        .clauses()
        .iter()
        .fold(pets::table.into_boxed(), |query, predicate| {
            query.filter(clause(predicate))
        })
}

fn ordered(query: pets::BoxedQuery<'static, Pg>, sort: PetSort) -> pets::BoxedQuery<'static, Pg> {
    match sort {
        PetSort::Newest => query.order((pets::created_at.desc(), pets::id.desc())),
        PetSort::Oldest => query.order((pets::created_at.asc(), pets::id.asc())),
        PetSort::PriceLow => query.order((pets::price.asc(), pets::id.asc())),
        PetSort::PriceHigh => query.order((pets::price.desc(), pets::id.desc())),
    }
}

fn page_query(search: &PetSearch) -> pets::BoxedQuery<'static, Pg> {
    let offset = i64::try_from(search.page.offset()).unwrap_or(i64::MAX);
    let limit = i64::try_from(search.page.limit()).unwrap_or(i64::MAX);
    ordered(filtered(&search.filter), search.sort)
        .limit(limit)
        .offset(offset)
}

#[async_trait]
impl CatalogueRepository for DieselCatalogueRepository {
    async fn search(&self, search: &PetSearch) -> Result<Page<Pet>, CataloguePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CataloguePersistenceError::connection))?;
        // Count and window read one snapshot so `total` matches the items.
        let (total, rows) = conn
            .build_transaction()
            .read_only()
            .repeatable_read()
            .run(|conn| {
                async move {
                    let total: i64 = filtered(&search.filter).count().get_result(conn).await?;
                    let rows: Vec<PetRow> = page_query(search)
                        .select(PetRow::as_select())
                        .load(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>((total, rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| diesel_error(&err))?;
        let items = rows
            .into_iter()
            .map(Pet::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(CataloguePersistenceError::query)?;
        let total = u64::try_from(total).unwrap_or_default();
        Ok(Page::new(items, PageMeta::new(search.page, total)))
    }

    async fn insert_pet(&self, pet: &NewPet) -> Result<Pet, CataloguePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CataloguePersistenceError::connection))?;
        let row = NewPetRow {
            name: &pet.name,
            breed: &pet.breed,
            age: pet.age,
            species: &pet.species,
            image: &pet.image,
            bio: &pet.bio,
            donated_by: pet.donor.get(),
            location: &pet.location,
            price: pet.price,
        };
        let stored: PetRow = diesel::insert_into(pets::table)
            .values(&row)
            .returning(PetRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| diesel_error(&err))?;
        Pet::try_from(stored).map_err(CataloguePersistenceError::query)
    }

    async fn find_pet(&self, id: PetId) -> Result<Option<Pet>, CataloguePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CataloguePersistenceError::connection))?;
        let row: Option<PetRow> = pets::table
            .find(id.get())
            .select(PetRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| diesel_error(&err))?;
        row.map(Pet::try_from)
            .transpose()
            .map_err(CataloguePersistenceError::query)
    }
}

#[cfg(test)]
mod tests {
    //! SQL shape checks that need no database.
    use super::*;
    use crate::domain::PetSearchParams;
    use diesel::debug_query;
    use rstest::rstest;

    fn rendered(params: &PetSearchParams) -> String {
        let search = params.compile().expect("valid params");
        let query = page_query(&search).select(PetRow::as_select());
        debug_query::<Pg, _>(&query).to_string()
    }

    #[rstest]
    fn user_text_is_bound_not_interpolated() {
        let sql = rendered(&PetSearchParams {
            search: Some("x' OR '1'='1".into()),
            location: Some("dhaka'; DROP TABLE pets; --".into()),
            ..PetSearchParams::default()
        });
        let (statement, binds) = sql.split_once("-- binds:").expect("binds section");
        assert!(!statement.contains("DROP TABLE"));
        assert!(!statement.contains("'1'='1"));
        assert!(statement.contains("ILIKE"));
        assert!(binds.contains("DROP TABLE"));
    }

    #[rstest]
    fn age_and_location_groups_are_disjunctions() {
        let sql = rendered(&PetSearchParams {
            ages: vec!["0-1".into(), "5+".into()],
            locations: vec!["dhaka".into(), "sylhet".into()],
            ..PetSearchParams::default()
        });
        assert!(sql.contains("BETWEEN"));
        assert!(sql.contains(" OR "));
        assert!(sql.contains("= ANY("));
    }

    #[rstest]
    #[case(Some("price-high"), "ORDER BY \"pets\".\"price\" DESC, \"pets\".\"id\" DESC")]
    #[case(Some("oldest"), "ORDER BY \"pets\".\"created_at\" ASC, \"pets\".\"id\" ASC")]
    #[case(None, "ORDER BY \"pets\".\"created_at\" DESC, \"pets\".\"id\" DESC")]
    fn sort_includes_id_tie_break(#[case] sort: Option<&str>, #[case] expected: &str) {
        let sql = rendered(&PetSearchParams {
            sort: sort.map(str::to_owned),
            ..PetSearchParams::default()
        });
        assert!(sql.contains(expected), "unexpected SQL: {sql}");
    }

    #[rstest]
    fn second_page_skips_six_rows() {
        let sql = rendered(&PetSearchParams {
            page: Some("2".into()),
            ..PetSearchParams::default()
        });
        assert!(sql.contains("LIMIT $"));
        assert!(sql.contains("OFFSET $"));
        assert!(sql.contains("binds: [\"available\", 6, 6]"), "unexpected SQL: {sql}");
    }
}
