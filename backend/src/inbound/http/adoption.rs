//! Donation, application and history handlers.
//!
//! ```text
//! POST /api/donate                (multipart/form-data)
//! POST /api/apply                 {"pet_id":3,"experience":"..","living_situation":"..","reason":".."}
//! POST /api/approve-application   {"application_id":5}
//! POST /api/remove-donation       {"donation_id":3}
//! POST /api/delete-pet            {"pet_id":3}
//! GET  /api/adoptions | /api/applications | /api/my-donations
//! ```

use actix_web::http::header;
use actix_web::{HttpRequest, get, post, web};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::DonationRequest;
use crate::domain::{
    AdoptionHistoryEntry, ApplicationDetails, ApplicationHistoryEntry, ApplicationId,
    DonationForm, DonationHistoryEntry, Error, ImageUpload, LifecycleError, PetId,
};

use super::ApiResult;
use super::multipart::{MultipartError, boundary_from_content_type, check_length, decode};
use super::session::SessionContext;
use super::state::HttpState;

/// Largest donation body accepted, image included.
pub const MAX_DONATION_BYTES: usize = 10 * 1024 * 1024;

/// Form field carrying the pet photo.
const IMAGE_FIELD: &str = "image";

/// Confirmation body shared by the mutation endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn reply(message: &str) -> web::Json<Self> {
        web::Json(Self {
            message: message.to_owned(),
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

/// Accept ids sent either as JSON numbers or as numeric strings, the way
/// HTML form values arrive.
fn flexible_id<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<i64>,
{
    match RawId::deserialize(deserializer)? {
        RawId::Number(raw) => Ok(T::from(raw)),
        RawId::Text(text) => text
            .trim()
            .parse::<i64>()
            .map(T::from)
            .map_err(|_| serde::de::Error::custom(format!("invalid id: {text}"))),
    }
}

/// `POST /api/apply` body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyRequest {
    #[serde(deserialize_with = "flexible_id")]
    #[schema(value_type = i64)]
    pub pet_id: PetId,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub living_situation: String,
    #[serde(default)]
    pub reason: String,
}

/// `POST /api/approve-application` body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ApproveRequest {
    #[serde(deserialize_with = "flexible_id")]
    #[schema(value_type = i64)]
    pub application_id: ApplicationId,
}

/// `POST /api/remove-donation` body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveDonationRequest {
    #[serde(deserialize_with = "flexible_id")]
    #[schema(value_type = i64)]
    pub donation_id: PetId,
}

/// `POST /api/delete-pet` body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeletePetRequest {
    #[serde(deserialize_with = "flexible_id")]
    #[schema(value_type = i64)]
    pub pet_id: PetId,
}

fn map_multipart_error(err: &MultipartError) -> Error {
    Error::invalid_request(err.to_string())
}

fn declared_length(req: &HttpRequest) -> Result<Option<u64>, Error> {
    req.headers()
        .get(header::CONTENT_LENGTH)
        .map(|value| {
            value
                .to_str()
                .ok()
                .and_then(|raw| raw.trim().parse::<u64>().ok())
                .ok_or_else(|| Error::invalid_request("Content-Length header is invalid"))
        })
        .transpose()
}

/// Decode a donation body into the form fields and optional image.
fn donation_request(req: &HttpRequest, body: &[u8]) -> Result<DonationRequest, Error> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| map_multipart_error(&MultipartError::NotMultipart))?;
    let boundary = boundary_from_content_type(content_type).map_err(|e| map_multipart_error(&e))?;
    check_length(declared_length(req)?, body).map_err(|e| map_multipart_error(&e))?;
    let mut form = decode(body, &boundary).map_err(|e| map_multipart_error(&e))?;

    let text = |name: &str| form.field(name).unwrap_or_default().to_owned();
    let donation = DonationForm {
        name: text("name"),
        age: text("age"),
        breed: text("breed"),
        species: text("species"),
        bio: text("bio"),
        location: form.field("location").map(str::to_owned),
        price: form.field("price").map(str::to_owned),
    };
    let image = form.take_file(IMAGE_FIELD).map(|file| ImageUpload {
        file_name: file.file_name,
        bytes: file.bytes,
    });
    Ok(DonationRequest {
        form: donation,
        image,
    })
}

/// List a pet for adoption.
#[utoipa::path(
    post,
    path = "/api/donate",
    request_body(
        content_type = "multipart/form-data",
        description = "Fields name, age, breed, species, bio, location, price and an image file"
    ),
    responses(
        (status = 200, description = "Pet listed", body = MessageResponse),
        (status = 400, description = "Missing fields, bad age, missing image or malformed body", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["adoption"],
    operation_id = "donatePet"
)]
#[post("/donate")]
pub async fn donate(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<web::Json<MessageResponse>> {
    let donor = session.require_user(state.sessions.as_ref()).await?;
    let request = donation_request(&req, &body)?;
    state.adoption.donate(donor, request).await?;
    Ok(MessageResponse::reply("Pet donated successfully!"))
}

/// Apply to adopt a listed pet.
#[utoipa::path(
    post,
    path = "/api/apply",
    request_body = ApplyRequest,
    responses(
        (status = 200, description = "Application submitted", body = MessageResponse),
        (status = 400, description = "Missing answers, unavailable pet or duplicate application", body = Error),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["adoption"],
    operation_id = "applyForPet"
)]
#[post("/apply")]
pub async fn apply(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ApplyRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let applicant = session.require_user(state.sessions.as_ref()).await?;
    let ApplyRequest {
        pet_id,
        experience,
        living_situation,
        reason,
    } = payload.into_inner();
    let details = ApplicationDetails::try_from_parts(&experience, &living_situation, &reason)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    state.adoption.apply(applicant, pet_id, details).await?;
    Ok(MessageResponse::reply(
        "Application submitted successfully! The donor will review and contact you.",
    ))
}

/// Approve an application on one of the caller's listings.
#[utoipa::path(
    post,
    path = "/api/approve-application",
    request_body = ApproveRequest,
    responses(
        (status = 200, description = "Pet adopted", body = MessageResponse),
        (status = 400, description = "Unknown application or pet already adopted", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Caller is not the donor", body = Error)
    ),
    tags = ["adoption"],
    operation_id = "approveApplication"
)]
#[post("/approve-application")]
pub async fn approve_application(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ApproveRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let donor = session.require_user(state.sessions.as_ref()).await?;
    state
        .adoption
        .approve(donor, payload.into_inner().application_id)
        .await?;
    Ok(MessageResponse::reply("Application approved! Pet has been adopted."))
}

/// Withdraw one of the caller's listings.
#[utoipa::path(
    post,
    path = "/api/remove-donation",
    request_body = RemoveDonationRequest,
    responses(
        (status = 200, description = "Listing removed", body = MessageResponse),
        (status = 400, description = "Unknown or already adopted listing", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Caller is not the donor", body = Error)
    ),
    tags = ["adoption"],
    operation_id = "removeDonation"
)]
#[post("/remove-donation")]
pub async fn remove_donation(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RemoveDonationRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let donor = session.require_user(state.sessions.as_ref()).await?;
    state
        .adoption
        .remove_donation(donor, payload.into_inner().donation_id)
        .await?;
    Ok(MessageResponse::reply("Donation deleted successfully"))
}

/// Delete any listing. Administrator only.
#[utoipa::path(
    post,
    path = "/api/delete-pet",
    request_body = DeletePetRequest,
    responses(
        (status = 200, description = "Pet deleted", body = MessageResponse),
        (status = 400, description = "Unknown pet", body = Error),
        (status = 403, description = "Caller is anonymous or not the administrator", body = Error)
    ),
    tags = ["adoption"],
    operation_id = "deletePet"
)]
#[post("/delete-pet")]
pub async fn delete_pet(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<DeletePetRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    // Anonymous callers get the same 403 as signed-in non-administrators.
    let actor = session
        .user_id(state.sessions.as_ref())
        .await?
        .ok_or(LifecycleError::NotAdministrator)?;
    state
        .adoption
        .delete_pet(actor, payload.into_inner().pet_id)
        .await?;
    Ok(MessageResponse::reply("Pet deleted successfully"))
}

/// Pets the caller has adopted, newest first.
#[utoipa::path(
    get,
    path = "/api/adoptions",
    responses(
        (status = 200, description = "Adoption history", body = [AdoptionHistoryEntry]),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["adoption"],
    operation_id = "myAdoptions"
)]
#[get("/adoptions")]
pub async fn my_adoptions(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<AdoptionHistoryEntry>>> {
    let user = session.require_user(state.sessions.as_ref()).await?;
    Ok(web::Json(state.adoption_query.adoptions(user).await?))
}

/// Applications the caller has submitted, newest first.
#[utoipa::path(
    get,
    path = "/api/applications",
    responses(
        (status = 200, description = "Application history", body = [ApplicationHistoryEntry]),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["adoption"],
    operation_id = "myApplications"
)]
#[get("/applications")]
pub async fn my_applications(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ApplicationHistoryEntry>>> {
    let user = session.require_user(state.sessions.as_ref()).await?;
    Ok(web::Json(state.adoption_query.applications(user).await?))
}

/// Listings the caller has donated with the applications they received.
#[utoipa::path(
    get,
    path = "/api/my-donations",
    responses(
        (status = 200, description = "Donation history", body = [DonationHistoryEntry]),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["adoption"],
    operation_id = "myDonations"
)]
#[get("/my-donations")]
pub async fn my_donations(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<DonationHistoryEntry>>> {
    let user = session.require_user(state.sessions.as_ref()).await?;
    Ok(web::Json(state.adoption_query.donations(user).await?))
}
