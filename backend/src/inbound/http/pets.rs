//! Catalogue search handler.
//!
//! ```text
//! GET /api/pets?category=Dog&locations[]=dhaka&ages[]=1-3&sort=price-low&page=2
//! ```

use actix_web::{HttpRequest, get, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Error, Pet, PetFilterError, PetSearchParams};

use super::ApiResult;
use super::state::HttpState;

/// `GET /api/pets` response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PetsResponse {
    pub pets: Vec<Pet>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
}

/// Collect catalogue parameters from a raw query string.
///
/// Repeated keys accept both the bracketed form browsers send for
/// multi-selects (`ages[]=1-3`) and the bare form (`ages=1-3`).
///
/// # Examples
/// ```
/// use pet_adoption::inbound::http::pets::search_params;
///
/// let params = search_params("category=Cat&ages%5B%5D=0-1&ages%5B%5D=5%2B&page=3");
/// assert_eq!(params.category.as_deref(), Some("Cat"));
/// assert_eq!(params.ages, vec!["0-1".to_owned(), "5+".to_owned()]);
/// assert_eq!(params.page.as_deref(), Some("3"));
/// ```
#[must_use]
pub fn search_params(query: &str) -> PetSearchParams {
    let mut params = PetSearchParams::default();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let value = value.into_owned();
        match key.as_ref() {
            "category" => params.category = Some(value),
            "search" => params.search = Some(value),
            "location" => params.location = Some(value),
            "locations[]" | "locations" => params.locations.push(value),
            "minPrice" => params.min_price = Some(value),
            "maxPrice" => params.max_price = Some(value),
            "ages[]" | "ages" => params.ages.push(value),
            "sort" => params.sort = Some(value),
            "page" => params.page = Some(value),
            _ => {}
        }
    }
    params
}

fn map_filter_error(err: &PetFilterError) -> Error {
    let (field, value) = match err {
        PetFilterError::InvalidPage { value } => ("page", value),
        PetFilterError::InvalidPrice { field, value } => (*field, value),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "value": value }))
}

/// Search available pets.
#[utoipa::path(
    get,
    path = "/api/pets",
    params(
        ("category" = Option<String>, Query, description = "Species, or `all`"),
        ("search" = Option<String>, Query, description = "Substring of name, breed or bio"),
        ("location" = Option<String>, Query, description = "Exact location"),
        ("locations[]" = Option<Vec<String>>, Query, description = "Any of these locations"),
        ("minPrice" = Option<i64>, Query, description = "Inclusive lower price bound"),
        ("maxPrice" = Option<i64>, Query, description = "Inclusive upper price bound"),
        ("ages[]" = Option<Vec<String>>, Query, description = "Any of 0-1, 1-3, 3-5, 5+"),
        ("sort" = Option<String>, Query, description = "newest, oldest, price-low or price-high"),
        ("page" = Option<u32>, Query, description = "One-based page number")
    ),
    responses(
        (status = 200, description = "Matching pets", body = PetsResponse),
        (status = 400, description = "Invalid query parameters", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["pets"],
    operation_id = "searchPets",
    security([])
)]
#[get("/pets")]
pub async fn search_pets(
    state: web::Data<HttpState>,
    req: HttpRequest,
) -> ApiResult<web::Json<PetsResponse>> {
    let search = search_params(req.query_string())
        .compile()
        .map_err(|err| map_filter_error(&err))?;
    let page = state.pets.search(&search).await?;
    Ok(web::Json(PetsResponse {
        pets: page.items,
        total: page.meta.total,
        page: page.meta.page,
        per_page: page.meta.per_page,
        total_pages: page.meta.total_pages,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AgeBand, PetPredicate, PetSort};
    use crate::inbound::http::test_utils::TestPorts;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use pagination::{Page, PageMeta};
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    fn bracketed_and_bare_repeated_keys_accumulate() {
        let params = search_params("locations[]=dhaka&locations=sylhet&ages=3-5");
        assert_eq!(params.locations, vec!["dhaka".to_owned(), "sylhet".to_owned()]);
        assert_eq!(params.ages, vec!["3-5".to_owned()]);
    }

    #[rstest]
    fn unknown_keys_are_ignored() {
        assert_eq!(search_params("colour=brown"), PetSearchParams::default());
    }

    #[actix_web::test]
    async fn search_compiles_query_and_wraps_page() {
        let mut ports = TestPorts::default();
        ports
            .pets
            .expect_search()
            .withf(|search| {
                search.sort == PetSort::PriceHigh
                    && search.page.page() == 2
                    && search
                        .filter
                        .clauses()
                        .contains(&PetPredicate::AnyAge(vec![AgeBand::Young]))
            })
            .times(1)
            .return_once(|search| {
                Ok(Page::new(Vec::new(), PageMeta::new(search.page, 8)))
            });
        let app = actix_test::init_service(
            App::new()
                .app_data(ports.into_state())
                .service(web::scope("/api").service(search_pets)),
        )
        .await;

        let body: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/pets?sort=price-high&page=2&ages%5B%5D=1-3")
                .to_request(),
        )
        .await;
        assert_eq!(body["total"], 8);
        assert_eq!(body["page"], 2);
        assert_eq!(body["per_page"], 6);
        assert_eq!(body["total_pages"], 2);
        assert_eq!(body["pets"], Value::Array(Vec::new()));
    }

    #[rstest]
    #[case("page=0", "page")]
    #[case("page=two", "page")]
    #[case("minPrice=cheap", "minPrice")]
    #[actix_web::test]
    async fn invalid_parameters_are_rejected(#[case] query: &str, #[case] field: &str) {
        let app = actix_test::init_service(
            App::new()
                .app_data(TestPorts::default().into_state())
                .service(web::scope("/api").service(search_pets)),
        )
        .await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/pets?{query}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], field);
    }
}
