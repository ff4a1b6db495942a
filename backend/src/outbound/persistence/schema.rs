//! Diesel table definitions.
//!
//! Kept in step with `backend/migrations` by hand; `diesel print-schema`
//! against a migrated database reproduces them.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Int8,
        name -> Text,
        /// Lowercased; unique.
        email -> Text,
        phone -> Text,
        /// PHC-formatted Argon2 hash.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Pet listings.
    pets (id) {
        id -> Int8,
        name -> Text,
        breed -> Text,
        age -> Int4,
        species -> Text,
        /// `uploads/<uuid><ext>` or an absolute URL.
        image -> Text,
        bio -> Text,
        /// `available` or `adopted`.
        status -> Text,
        donated_by -> Int8,
        location -> Text,
        price -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Adoption applications with a snapshot of the applicant's contact
    /// details. Unique per `(pet_id, applicant_id)`.
    adoption_applications (id) {
        id -> Int8,
        pet_id -> Int8,
        applicant_id -> Int8,
        applicant_name -> Text,
        applicant_email -> Text,
        applicant_phone -> Text,
        experience -> Text,
        living_situation -> Text,
        reason -> Text,
        /// `pending`, `approved` or `rejected`.
        status -> Text,
        applied_at -> Timestamptz,
    }
}

diesel::table! {
    /// Completed adoptions. At most one per pet.
    adoptions (id) {
        id -> Int8,
        pet_id -> Int8,
        adopter_id -> Int8,
        donor_id -> Int8,
        adopted_at -> Timestamptz,
    }
}

diesel::table! {
    /// Login sessions keyed by the SHA-256 digest of the bearer token.
    sessions (token_digest) {
        token_digest -> Text,
        user_id -> Int8,
        created_at -> Timestamptz,
        expires_at -> Timestamptz,
    }
}

diesel::joinable!(pets -> users (donated_by));
diesel::joinable!(adoption_applications -> pets (pet_id));
diesel::joinable!(adoptions -> pets (pet_id));
diesel::joinable!(sessions -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    pets,
    adoption_applications,
    adoptions,
    sessions,
);
