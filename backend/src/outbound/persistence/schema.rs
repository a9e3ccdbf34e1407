//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `migrations/` exactly;
//! regenerate with `diesel print-schema` after changing them.

diesel::table! {
    /// Registered and guest user accounts.
    users (id) {
        /// Primary key, UUID v4.
        id -> Uuid,
        /// Unique login name.
        username -> Varchar,
        /// Salted credential digest, `salt$digest` hex.
        password -> Text,
        /// Whether the account came through the guest flow.
        is_guest -> Bool,
        /// Optional contact email.
        email -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}
