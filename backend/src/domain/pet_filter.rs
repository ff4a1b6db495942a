//! Catalogue search: raw query parameters compiled into typed predicates.
//!
//! [`PetSearchParams`] holds the optional strings a client sent.
//! [`PetSearchParams::compile`] validates them and produces a [`PetSearch`]:
//! a conjunction of [`PetPredicate`] clauses, a [`PetSort`], and a page
//! window. Adapters translate the predicates into their own query language
//! with every value bound as a parameter; nothing here produces query text.

use std::cmp::Ordering;

use pagination::{PageRequest, PageRequestError};

use super::{Pet, PetStatus};

/// Fixed catalogue page size.
pub const PET_PAGE_SIZE: u32 = 6;

/// Category value meaning "no species filter".
const ALL_CATEGORIES: &str = "all";

/// Inclusive age bands offered by the catalogue filter.
///
/// Bands share their boundary years, so a three-year-old matches both
/// `1-3` and `3-5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeBand {
    /// `0-1`
    Infant,
    /// `1-3`
    Young,
    /// `3-5`
    Adult,
    /// `5+`
    Senior,
}

impl AgeBand {
    /// Parse a band label; unknown labels yield `None`.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "0-1" => Some(Self::Infant),
            "1-3" => Some(Self::Young),
            "3-5" => Some(Self::Adult),
            "5+" => Some(Self::Senior),
            _ => None,
        }
    }

    /// Inclusive lower bound and optional inclusive upper bound, in years.
    #[must_use]
    pub const fn bounds(self) -> (i32, Option<i32>) {
        match self {
            Self::Infant => (0, Some(1)),
            Self::Young => (1, Some(3)),
            Self::Adult => (3, Some(5)),
            Self::Senior => (5, None),
        }
    }

    /// Whether `age` falls inside the band.
    #[must_use]
    pub fn contains(self, age: i32) -> bool {
        let (low, high) = self.bounds();
        age >= low && high.is_none_or(|high| age <= high)
    }
}

/// One clause of the catalogue predicate. Clauses are AND-ed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetPredicate {
    /// `status = ?`
    Status(PetStatus),
    /// `species = ?`
    Species(String),
    /// Case-insensitive substring of name, breed or bio.
    Text(String),
    /// `location = ?`
    Location(String),
    /// `location IN (...)`, an OR group.
    AnyLocation(Vec<String>),
    /// `price >= ?`
    MinPrice(i64),
    /// `price <= ?`
    MaxPrice(i64),
    /// OR group of age bands.
    AnyAge(Vec<AgeBand>),
}

impl PetPredicate {
    /// Evaluate the clause against a listing held in memory.
    #[must_use]
    pub fn matches(&self, pet: &Pet) -> bool {
        match self {
            Self::Status(status) => pet.status == *status,
            Self::Species(species) => pet.species == *species,
            Self::Text(term) => {
                let needle = term.to_lowercase();
                [&pet.name, &pet.breed, &pet.bio]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            Self::Location(location) => pet.location == *location,
            Self::AnyLocation(locations) => locations.iter().any(|l| *l == pet.location),
            Self::MinPrice(min) => pet.price >= *min,
            Self::MaxPrice(max) => pet.price <= *max,
            Self::AnyAge(bands) => bands.iter().any(|band| band.contains(pet.age)),
        }
    }
}

/// Conjunction of predicate clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetFilter {
    clauses: Vec<PetPredicate>,
}

impl PetFilter {
    /// Filter admitting only available listings.
    #[must_use]
    pub fn available() -> Self {
        Self {
            clauses: vec![PetPredicate::Status(PetStatus::Available)],
        }
    }

    /// Add a clause to the conjunction.
    #[must_use]
    pub fn and(mut self, clause: PetPredicate) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Clauses in insertion order.
    #[must_use]
    pub fn clauses(&self) -> &[PetPredicate] {
        &self.clauses
    }

    /// Evaluate every clause against a listing held in memory.
    #[must_use]
    pub fn matches(&self, pet: &Pet) -> bool {
        self.clauses.iter().all(|clause| clause.matches(pet))
    }
}

/// Result ordering. Every variant ends with an id tie-break so paging is
/// stable while data is unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PetSort {
    /// Creation time descending, then id descending.
    #[default]
    Newest,
    /// Creation time ascending, then id ascending.
    Oldest,
    /// Price ascending, then id ascending.
    PriceLow,
    /// Price descending, then id descending.
    PriceHigh,
}

impl PetSort {
    /// Parse a sort label; absent or unknown labels fall back to
    /// [`PetSort::Newest`].
    #[must_use]
    pub fn parse(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some("oldest") => Self::Oldest,
            Some("price-low") => Self::PriceLow,
            Some("price-high") => Self::PriceHigh,
            _ => Self::Newest,
        }
    }

    /// Total order over listings matching this sort.
    #[must_use]
    pub fn compare(self, a: &Pet, b: &Pet) -> Ordering {
        match self {
            Self::Newest => b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)),
            Self::Oldest => a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)),
            Self::PriceLow => a.price.cmp(&b.price).then(a.id.cmp(&b.id)),
            Self::PriceHigh => b.price.cmp(&a.price).then(b.id.cmp(&a.id)),
        }
    }
}

/// Invalid catalogue query parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PetFilterError {
    /// `page` was not a positive integer.
    #[error("page must be a positive integer")]
    InvalidPage { value: String },
    /// A price bound was not a whole number.
    #[error("{field} must be a whole number")]
    InvalidPrice { field: &'static str, value: String },
}

/// Raw catalogue query parameters.
///
/// Blank strings are treated as absent, matching how browsers submit empty
/// form inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetSearchParams {
    /// Species, or `all`.
    pub category: Option<String>,
    /// Free-text term matched against name, breed and bio.
    pub search: Option<String>,
    /// Single exact location.
    pub location: Option<String>,
    /// Repeated `locations[]` values.
    pub locations: Vec<String>,
    /// `minPrice`
    pub min_price: Option<String>,
    /// `maxPrice`
    pub max_price: Option<String>,
    /// Repeated `ages[]` band labels.
    pub ages: Vec<String>,
    /// `newest`, `oldest`, `price-low` or `price-high`.
    pub sort: Option<String>,
    /// One-based page number.
    pub page: Option<String>,
}

/// A compiled catalogue query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetSearch {
    /// Conjunction of clauses every result satisfies.
    pub filter: PetFilter,
    /// Result ordering.
    pub sort: PetSort,
    /// Requested window.
    pub page: PageRequest,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_price(field: &'static str, value: Option<&String>) -> Result<Option<i64>, PetFilterError> {
    present(value)
        .map(|raw| {
            raw.parse::<i64>().map_err(|_| PetFilterError::InvalidPrice {
                field,
                value: raw.to_owned(),
            })
        })
        .transpose()
}

fn parse_page(value: Option<&String>) -> Result<PageRequest, PetFilterError> {
    let invalid = |raw: &str| PetFilterError::InvalidPage {
        value: raw.to_owned(),
    };
    let page = match present(value) {
        None => 1,
        Some(raw) => raw.parse::<i64>().map_err(|_| invalid(raw))?,
    };
    PageRequest::new(page, PET_PAGE_SIZE).map_err(|err| match err {
        PageRequestError::PageOutOfRange { page } => invalid(&page.to_string()),
        PageRequestError::EmptyPageSize => invalid("0"),
    })
}

impl PetSearchParams {
    /// Validate the parameters and build the predicate, ordering and window.
    ///
    /// # Examples
    /// ```
    /// use pet_adoption::domain::{PetPredicate, PetSearchParams, PetSort};
    ///
    /// let params = PetSearchParams {
    ///     category: Some("Dog".into()),
    ///     sort: Some("price-high".into()),
    ///     page: Some("2".into()),
    ///     ..PetSearchParams::default()
    /// };
    /// let search = params.compile().expect("valid params");
    /// assert!(search.filter.clauses().contains(&PetPredicate::Species("Dog".into())));
    /// assert_eq!(search.sort, PetSort::PriceHigh);
    /// assert_eq!(search.page.offset(), 6);
    /// ```
    pub fn compile(&self) -> Result<PetSearch, PetFilterError> {
        let mut filter = PetFilter::available();

        if let Some(category) = present(self.category.as_ref())
            && !category.eq_ignore_ascii_case(ALL_CATEGORIES)
        {
            filter = filter.and(PetPredicate::Species(category.to_owned()));
        }
        if let Some(term) = present(self.search.as_ref()) {
            filter = filter.and(PetPredicate::Text(term.to_owned()));
        }
        if let Some(location) = present(self.location.as_ref()) {
            filter = filter.and(PetPredicate::Location(location.to_owned()));
        }
        if let Some(min) = parse_price("minPrice", self.min_price.as_ref())? {
            filter = filter.and(PetPredicate::MinPrice(min));
        }
        if let Some(max) = parse_price("maxPrice", self.max_price.as_ref())? {
            filter = filter.and(PetPredicate::MaxPrice(max));
        }

        let mut bands: Vec<AgeBand> = Vec::new();
        for band in self.ages.iter().filter_map(|label| AgeBand::parse(label)) {
            if !bands.contains(&band) {
                bands.push(band);
            }
        }
        if !bands.is_empty() {
            filter = filter.and(PetPredicate::AnyAge(bands));
        }

        let mut locations: Vec<String> = Vec::new();
        for location in self.locations.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
            if !locations.iter().any(|seen| seen == location) {
                locations.push(location.to_owned());
            }
        }
        if !locations.is_empty() {
            filter = filter.and(PetPredicate::AnyLocation(locations));
        }

        Ok(PetSearch {
            filter,
            sort: PetSort::parse(self.sort.as_deref()),
            page: parse_page(self.page.as_ref())?,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Predicate compilation and in-memory evaluation.
    use super::*;
    use crate::domain::{PetId, UserId};
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    fn pet(id: i64, species: &str, age: i32, location: &str, price: i64) -> Pet {
        Pet {
            id: PetId::new(id),
            name: format!("Pet {id}"),
            breed: "Mixed".into(),
            age,
            species: species.into(),
            image: "uploads/x.jpg".into(),
            bio: "Friendly".into(),
            status: PetStatus::Available,
            donated_by: UserId::new(1),
            location: location.into(),
            price,
            created_at: Utc
                .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
                .single()
                .expect("valid timestamp")
                + chrono::TimeDelta::minutes(id),
        }
    }

    #[fixture]
    fn catalogue() -> Vec<Pet> {
        vec![
            pet(1, "Dog", 0, "dhaka", 15000),
            pet(2, "Cat", 2, "chittagong", 8000),
            pet(3, "Dog", 4, "dhaka", 25000),
            pet(4, "Cat", 5, "sylhet", 12000),
            pet(5, "Dog", 2, "rajshahi", 0),
            pet(6, "Cat", 3, "dhaka", 18000),
            pet(7, "Dog", 1, "chittagong", 10000),
            pet(8, "Cat", 7, "dhaka", 0),
        ]
    }

    fn ids(filter: &PetFilter, pets: &[Pet]) -> Vec<i64> {
        pets.iter()
            .filter(|p| filter.matches(p))
            .map(|p| p.id.get())
            .collect()
    }

    #[rstest]
    fn empty_params_admit_only_available(catalogue: Vec<Pet>) {
        let search = PetSearchParams::default().compile().expect("compile");
        assert_eq!(
            search.filter.clauses(),
            &[PetPredicate::Status(PetStatus::Available)]
        );
        let mut adopted = catalogue[0].clone();
        adopted.status = PetStatus::Adopted;
        assert!(!search.filter.matches(&adopted));
        assert_eq!(search.sort, PetSort::Newest);
        assert_eq!(search.page.page(), 1);
    }

    #[rstest]
    #[case("all")]
    #[case("ALL")]
    #[case("")]
    fn all_category_adds_no_clause(#[case] category: &str) {
        let params = PetSearchParams {
            category: Some(category.into()),
            ..PetSearchParams::default()
        };
        assert_eq!(params.compile().expect("compile").filter.clauses().len(), 1);
    }

    #[rstest]
    fn search_matches_name_breed_or_bio_case_insensitively(catalogue: Vec<Pet>) {
        let mut pets = catalogue;
        pets[1].breed = "Siamese".into();
        pets[2].bio = "A SIAMESE at heart".into();
        let filter = PetFilter::available().and(PetPredicate::Text("siam".into()));
        assert_eq!(ids(&filter, &pets), vec![2, 3]);
    }

    #[rstest]
    #[case(&["0-1"], vec![1, 7])]
    #[case(&["1-3"], vec![2, 5, 6, 7])]
    #[case(&["3-5"], vec![3, 4, 6])]
    #[case(&["5+"], vec![4, 8])]
    #[case(&["0-1", "5+"], vec![1, 4, 7, 8])]
    #[case(&["bogus", "5+"], vec![4, 8])]
    fn age_bands_form_an_or_group(
        catalogue: Vec<Pet>,
        #[case] labels: &[&str],
        #[case] expected: Vec<i64>,
    ) {
        let params = PetSearchParams {
            ages: labels.iter().map(|l| (*l).to_owned()).collect(),
            ..PetSearchParams::default()
        };
        let search = params.compile().expect("compile");
        assert_eq!(ids(&search.filter, &catalogue), expected);
    }

    #[rstest]
    fn unknown_age_bands_only_add_no_clause() {
        let params = PetSearchParams {
            ages: vec!["10-20".into()],
            ..PetSearchParams::default()
        };
        assert_eq!(params.compile().expect("compile").filter.clauses().len(), 1);
    }

    #[rstest]
    fn locations_form_an_or_group_anded_with_other_clauses(catalogue: Vec<Pet>) {
        let params = PetSearchParams {
            category: Some("Dog".into()),
            locations: vec!["dhaka".into(), "chittagong".into(), " ".into()],
            max_price: Some("20000".into()),
            ..PetSearchParams::default()
        };
        let search = params.compile().expect("compile");
        assert_eq!(ids(&search.filter, &catalogue), vec![1, 7]);
    }

    #[rstest]
    fn clause_order_does_not_change_results(catalogue: Vec<Pet>) {
        let species_first = PetFilter::available()
            .and(PetPredicate::Species("Dog".into()))
            .and(PetPredicate::Location("dhaka".into()));
        let location_first = PetFilter::available()
            .and(PetPredicate::Location("dhaka".into()))
            .and(PetPredicate::Species("Dog".into()));
        assert_eq!(ids(&species_first, &catalogue), vec![1, 3]);
        assert_eq!(
            ids(&species_first, &catalogue),
            ids(&location_first, &catalogue)
        );
    }

    #[rstest]
    fn price_bounds_are_inclusive(catalogue: Vec<Pet>) {
        let params = PetSearchParams {
            min_price: Some("8000".into()),
            max_price: Some("12000".into()),
            ..PetSearchParams::default()
        };
        let search = params.compile().expect("compile");
        assert_eq!(ids(&search.filter, &catalogue), vec![2, 4, 7]);
    }

    #[rstest]
    #[case(Some("abc"), None)]
    #[case(None, Some("12.5"))]
    fn non_integer_prices_are_rejected(#[case] min: Option<&str>, #[case] max: Option<&str>) {
        let params = PetSearchParams {
            min_price: min.map(str::to_owned),
            max_price: max.map(str::to_owned),
            ..PetSearchParams::default()
        };
        assert!(matches!(
            params.compile(),
            Err(PetFilterError::InvalidPrice { .. })
        ));
    }

    #[rstest]
    #[case("0")]
    #[case("-1")]
    #[case("two")]
    fn invalid_pages_are_rejected(#[case] page: &str) {
        let params = PetSearchParams {
            page: Some(page.into()),
            ..PetSearchParams::default()
        };
        assert!(matches!(
            params.compile(),
            Err(PetFilterError::InvalidPage { .. })
        ));
    }

    #[rstest]
    #[case(None, PetSort::Newest)]
    #[case(Some("oldest"), PetSort::Oldest)]
    #[case(Some("price-low"), PetSort::PriceLow)]
    #[case(Some("price-high"), PetSort::PriceHigh)]
    #[case(Some("random"), PetSort::Newest)]
    fn sort_labels(#[case] label: Option<&str>, #[case] expected: PetSort) {
        assert_eq!(PetSort::parse(label), expected);
    }

    #[rstest]
    fn price_ties_break_on_id(catalogue: Vec<Pet>) {
        let mut pets = catalogue;
        pets.sort_by(|a, b| PetSort::PriceHigh.compare(a, b));
        let order: Vec<i64> = pets.iter().map(|p| p.id.get()).collect();
        assert_eq!(order, vec![3, 6, 1, 4, 7, 2, 8, 5]);

        pets.sort_by(|a, b| PetSort::PriceLow.compare(a, b));
        let order: Vec<i64> = pets.iter().map(|p| p.id.get()).collect();
        assert_eq!(order, vec![5, 8, 2, 7, 4, 1, 6, 3]);
    }

    #[rstest]
    fn newest_orders_by_creation_descending(catalogue: Vec<Pet>) {
        let mut pets = catalogue;
        pets.sort_by(|a, b| PetSort::Newest.compare(a, b));
        assert_eq!(pets.first().map(|p| p.id.get()), Some(8));
        assert_eq!(pets.last().map(|p| p.id.get()), Some(1));
    }
}
