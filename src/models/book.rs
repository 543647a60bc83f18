//! Book model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book genre (fixed catalog taxonomy)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    Education,
    Religion,
    Kids,
    Family,
    Health,
    Politics,
    Business,
    Literature,
    Science,
    Art,
    Sport,
    Others,
}

impl Genre {
    pub const ALL: [Genre; 12] = [
        Genre::Education,
        Genre::Religion,
        Genre::Kids,
        Genre::Family,
        Genre::Health,
        Genre::Politics,
        Genre::Business,
        Genre::Literature,
        Genre::Science,
        Genre::Art,
        Genre::Sport,
        Genre::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Education => "education",
            Genre::Religion => "religion",
            Genre::Kids => "kids",
            Genre::Family => "family",
            Genre::Health => "health",
            Genre::Politics => "politics",
            Genre::Business => "business",
            Genre::Literature => "literature",
            Genre::Science => "science",
            Genre::Art => "art",
            Genre::Sport => "sport",
            Genre::Others => "others",
        }
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Genre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "education" => Ok(Genre::Education),
            "religion" => Ok(Genre::Religion),
            "kids" => Ok(Genre::Kids),
            "family" => Ok(Genre::Family),
            "health" => Ok(Genre::Health),
            "politics" => Ok(Genre::Politics),
            "business" => Ok(Genre::Business),
            "literature" => Ok(Genre::Literature),
            "science" => Ok(Genre::Science),
            "art" => Ok(Genre::Art),
            "sport" => Ok(Genre::Sport),
            "others" => Ok(Genre::Others),
            _ => Err(format!("Invalid genre: {}", s)),
        }
    }
}

// SQLx conversion for Genre (stored as a text slug)
impl sqlx::Type<Postgres> for Genre {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Genre {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Genre {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub genre: Genre,
    pub description: Option<String>,
    pub published_date: Option<NaiveDate>,
    /// Copies owned by the library
    pub total_copies: i32,
    /// Copies currently on the shelf; total_copies minus open borrows.
    /// Written only by the lending engine and the catalog copy-count path.
    pub available_copies: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inventory view of a book, read and written under the book row lock
#[derive(Debug, Clone, Copy, Serialize, FromRow, ToSchema)]
pub struct BookInventory {
    pub id: i32,
    pub total_copies: i32,
    pub available_copies: i32,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "Author must be 1-255 characters"))]
    pub author: String,
    pub genre: Genre,
    pub description: Option<String>,
    pub published_date: Option<NaiveDate>,
    /// Initial copy count; also becomes the starting available count
    #[validate(range(min = 1, message = "Copies must be a positive integer"))]
    pub copies: i32,
}

/// Update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Author must be 1-255 characters"))]
    pub author: Option<String>,
    pub genre: Option<Genre>,
    pub description: Option<String>,
    pub published_date: Option<NaiveDate>,
    /// New total copy count; available_copies is recomputed against open borrows
    #[validate(range(min = 0, message = "Copies must not be negative"))]
    pub total_copies: Option<i32>,
}

/// Book search/listing query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Case-insensitive title substring
    pub title: Option<String>,
    /// Case-insensitive author substring
    pub author: Option<String>,
    pub genre: Option<Genre>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_parses_case_insensitively() {
        assert_eq!("Literature".parse::<Genre>().unwrap(), Genre::Literature);
        assert_eq!("SPORT".parse::<Genre>().unwrap(), Genre::Sport);
        assert!("poetry".parse::<Genre>().is_err());
    }

    #[test]
    fn genre_round_trips_through_slug() {
        for genre in Genre::ALL {
            assert_eq!(genre.as_str().parse::<Genre>().unwrap(), genre);
        }
    }
}
