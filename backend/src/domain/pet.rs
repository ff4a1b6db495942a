//! Pet listings and donation input validation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{PetId, UserId};

/// Location recorded when a donor leaves it out.
pub const DEFAULT_LOCATION: &str = "dhaka";

/// Availability of a listing. `Adopted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    Available,
    Adopted,
}

impl PetStatus {
    /// Stored and serialised form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Adopted => "adopted",
        }
    }
}

impl fmt::Display for PetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised status text read from storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pet status: {0}")]
pub struct UnknownPetStatus(pub String);

impl FromStr for PetStatus {
    type Err = UnknownPetStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "adopted" => Ok(Self::Adopted),
            other => Err(UnknownPetStatus(other.to_owned())),
        }
    }
}

/// A pet listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    pub breed: String,
    pub age: i32,
    pub species: String,
    /// Path under `uploads/` or an absolute URL for seeded listings.
    pub image: String,
    pub bio: String,
    pub status: PetStatus,
    pub donated_by: UserId,
    pub location: String,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

/// A listing ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPet {
    pub donor: UserId,
    pub name: String,
    pub breed: String,
    pub age: i32,
    pub species: String,
    pub bio: String,
    pub location: String,
    pub price: i64,
    pub image: String,
}

/// Donation form rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DonationValidationError {
    /// One of name, age, breed, species or bio was blank.
    #[error("All fields are required")]
    MissingFields,
    /// Age was not a non-negative whole number.
    #[error("Age must be a whole number of years")]
    InvalidAge { value: String },
    /// No image part, or the part had an empty filename.
    #[error("Image is required")]
    MissingImage,
}

/// Raw text fields of a donation, as decoded from the multipart body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonationForm {
    pub name: String,
    pub age: String,
    pub breed: String,
    pub species: String,
    pub bio: String,
    pub location: Option<String>,
    pub price: Option<String>,
}

/// Validated donation fields, before an image has been stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetDetails {
    pub name: String,
    pub breed: String,
    pub age: i32,
    pub species: String,
    pub bio: String,
    pub location: String,
    pub price: i64,
}

impl DonationForm {
    /// Trim and validate the form.
    ///
    /// A missing or blank location becomes [`DEFAULT_LOCATION`]; a price that
    /// is not made only of digits is recorded as zero.
    ///
    /// # Examples
    /// ```
    /// use pet_adoption::domain::DonationForm;
    ///
    /// let form = DonationForm {
    ///     name: "Rex".into(),
    ///     age: "2".into(),
    ///     breed: "Mixed".into(),
    ///     species: "Dog".into(),
    ///     bio: "Good boy".into(),
    ///     location: None,
    ///     price: Some("free".into()),
    /// };
    /// let details = form.validate().expect("valid form");
    /// assert_eq!(details.location, "dhaka");
    /// assert_eq!(details.price, 0);
    /// ```
    pub fn validate(&self) -> Result<PetDetails, DonationValidationError> {
        let required = [&self.name, &self.age, &self.breed, &self.species, &self.bio];
        if required.iter().any(|value| value.trim().is_empty()) {
            return Err(DonationValidationError::MissingFields);
        }
        let age_text = self.age.trim();
        let age = age_text
            .parse::<i32>()
            .ok()
            .filter(|age| *age >= 0)
            .ok_or_else(|| DonationValidationError::InvalidAge {
                value: age_text.to_owned(),
            })?;
        let location = self
            .location
            .as_deref()
            .map(str::trim)
            .filter(|location| !location.is_empty())
            .unwrap_or(DEFAULT_LOCATION)
            .to_owned();
        Ok(PetDetails {
            name: self.name.trim().to_owned(),
            breed: self.breed.trim().to_owned(),
            age,
            species: self.species.trim().to_owned(),
            bio: self.bio.trim().to_owned(),
            location,
            price: lenient_price(self.price.as_deref()),
        })
    }
}

impl PetDetails {
    /// Attach the donor and stored image reference.
    #[must_use]
    pub fn into_new_pet(self, donor: UserId, image: String) -> NewPet {
        NewPet {
            donor,
            name: self.name,
            breed: self.breed,
            age: self.age,
            species: self.species,
            bio: self.bio,
            location: self.location,
            price: self.price,
            image,
        }
    }
}

fn lenient_price(raw: Option<&str>) -> i64 {
    let text = raw.map(str::trim).unwrap_or_default();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    text.parse().unwrap_or(0)
}

/// Longest file extension kept from an uploaded filename, dot excluded.
const MAX_EXTENSION_LEN: usize = 8;

/// An image file part from a donation form.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Filename as sent by the client. Only its extension is kept.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    /// Lowercased extension of the client filename including the leading
    /// dot, or an empty string when it has none or it looks unsafe.
    ///
    /// # Examples
    /// ```
    /// use pet_adoption::domain::ImageUpload;
    ///
    /// let upload = ImageUpload { file_name: "Rex.JPG".into(), bytes: vec![1] };
    /// assert_eq!(upload.extension(), ".jpg");
    /// ```
    #[must_use]
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| {
                !ext.is_empty()
                    && ext.len() <= MAX_EXTENSION_LEN
                    && ext.bytes().all(|b| b.is_ascii_alphanumeric())
            })
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default()
    }
}
