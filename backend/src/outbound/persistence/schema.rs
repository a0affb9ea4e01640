//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Dashboard accounts.
    users (id) {
        /// Serial primary key.
        id -> Int4,
        /// Lower-cased login email, unique.
        email -> Varchar,
        /// Display name.
        name -> Varchar,
        /// bcrypt hash.
        password_hash -> Varchar,
        /// `USER` or `ADMIN`.
        role -> Varchar,
        /// Disabled accounts cannot sign in.
        is_active -> Bool,
        /// Last successful sign-in.
        last_login -> Nullable<Timestamptz>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Global notification feed.
    notifications (id) {
        /// Serial primary key.
        id -> Int4,
        /// Free-form type tag.
        #[sql_name = "type"]
        kind -> Varchar,
        /// Headline.
        title -> Varchar,
        /// Body text.
        message -> Text,
        /// Related record id.
        related_id -> Nullable<Int4>,
        /// Related record kind.
        related_type -> Nullable<Varchar>,
        /// Read flag.
        is_read -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit trail.
    audit_logs (id) {
        /// Serial primary key.
        id -> Int4,
        /// Acting user, null for anonymous events.
        user_id -> Nullable<Int4>,
        /// Action tag, e.g. `FAILED_LOGIN`.
        action -> Varchar,
        /// Resource name, e.g. `parcels`.
        resource -> Varchar,
        /// Affected record id.
        resource_id -> Nullable<Varchar>,
        /// Structured context.
        details -> Nullable<Jsonb>,
        /// Client IP address.
        ip_address -> Nullable<Varchar>,
        /// Client user agent.
        user_agent -> Nullable<Text>,
        /// `SUCCESS`, `FAILURE` or `BLOCKED`.
        status -> Varchar,
        /// Event timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Land parcels under research.
    parcels (id) {
        /// Serial primary key.
        id -> Int4,
        /// Province.
        city -> Varchar,
        /// District.
        district -> Varchar,
        /// Neighbourhood.
        neighborhood -> Varchar,
        /// Island (block) number.
        island -> Varchar,
        /// Parsel (lot) number.
        parsel -> Varchar,
        /// Area in square metres.
        area -> Nullable<Float8>,
        /// Latitude in degrees.
        latitude -> Nullable<Float8>,
        /// Longitude in degrees.
        longitude -> Nullable<Float8>,
        /// Research status tag.
        status -> Varchar,
        /// Category tag.
        category -> Varchar,
        /// CRM pipeline stage tag.
        crm_stage -> Varchar,
        /// Comma separated tags.
        tags -> Nullable<Text>,
        /// Creating user.
        owner_id -> Nullable<Int4>,
        /// Assigned user.
        assigned_to -> Nullable<Int4>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// CRM contacts.
    customers (id) {
        /// Serial primary key.
        id -> Int4,
        /// Contact name.
        name -> Varchar,
        /// Relationship tag.
        role -> Varchar,
        /// Phone number.
        phone -> Nullable<Varchar>,
        /// Email address.
        email -> Nullable<Varchar>,
        /// Free-form notes.
        notes -> Nullable<Text>,
        /// Owning user.
        owner_id -> Int4,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Many-to-many link between customers and parcels.
    customer_parcels (customer_id, parcel_id) {
        /// Linked customer.
        customer_id -> Int4,
        /// Linked parcel.
        parcel_id -> Int4,
    }
}

diesel::joinable!(audit_logs -> users (user_id));
diesel::joinable!(customer_parcels -> customers (customer_id));
diesel::joinable!(customer_parcels -> parcels (parcel_id));
diesel::joinable!(customers -> users (owner_id));

diesel::allow_tables_to_appear_in_same_query!(
    audit_logs,
    customer_parcels,
    customers,
    notifications,
    parcels,
    users,
);
