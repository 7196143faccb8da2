use chrono::{DateTime, Datelike, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::validator::{Validator, unique};

/// Longest accepted title, counted in characters.
const MAX_TITLE_CHARS: usize = 500;

/// Nothing was filmed before 1888.
const EARLIEST_YEAR: i32 = 1888;

const MAX_GENRES: usize = 5;

/// Database row representation; genres live in a JSON text column.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MovieRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub year: i64,
    pub runtime: i64,
    pub genres: String,
    pub version: i64,
}

/// Application-level movie record.
///
/// `id`, `created_at` and `version` are written by the storage layer only;
/// the values carried by a not-yet-persisted movie are placeholders.
#[derive(Debug, Clone, Serialize)]
pub struct Movie {
    pub id: i64,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Vec<String>,
    pub version: i32,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Self {
            id: row.id,
            created_at: row.created_at,
            title: row.title,
            year: row.year as i32,
            runtime: Runtime(row.runtime as i32),
            genres: serde_json::from_str(&row.genres).unwrap_or_default(),
            version: row.version as i32,
        }
    }
}

/// Runtime in minutes. On the wire it renders as `"<n> mins"` and accepts
/// either that string form or a bare integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Runtime(pub i32);

impl Runtime {
    pub fn minutes(self) -> i32 {
        self.0
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{} mins", self.0))
    }
}

struct RuntimeVisitor;

impl<'de> Visitor<'de> for RuntimeVisitor {
    type Value = Runtime;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("an integer number of minutes or a \"<minutes> mins\" string")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Runtime, E> {
        i32::try_from(value)
            .map(Runtime)
            .map_err(|_| E::custom("runtime is out of range"))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Runtime, E> {
        i32::try_from(value)
            .map(Runtime)
            .map_err(|_| E::custom("runtime is out of range"))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Runtime, E> {
        value
            .strip_suffix(" mins")
            .and_then(|n| n.parse::<i32>().ok())
            .map(Runtime)
            .ok_or_else(|| E::custom("invalid runtime format"))
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RuntimeVisitor)
    }
}

/// Create input shape. Absent fields decode to zero values so the validator
/// can report them as "must be provided" alongside every other failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CreateMovie {
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Vec<String>,
}

impl From<CreateMovie> for Movie {
    fn from(input: CreateMovie) -> Self {
        Self {
            id: 0,
            created_at: Utc::now(),
            title: input.title,
            year: input.year,
            runtime: input.runtime,
            genres: input.genres,
            version: 0,
        }
    }
}

/// Partial-update input shape; absent fields leave the record untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct UpdateMovie {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub runtime: Option<Runtime>,
    pub genres: Option<Vec<String>>,
}

/// Runs every rule regardless of earlier failures so the caller gets the
/// complete error set in one pass. For a fixed input the resulting error set
/// is identical across runs; the year upper bound tracks the wall clock.
pub fn validate_movie(v: &mut Validator, movie: &Movie) {
    v.check(!movie.title.is_empty(), "title", "must be provided");
    v.check(
        movie.title.chars().count() <= MAX_TITLE_CHARS,
        "title",
        "must not be more than 500 characters long",
    );

    v.check(movie.year != 0, "year", "must be provided");
    v.check(
        movie.year >= EARLIEST_YEAR,
        "year",
        "must be greater than or equal to 1888",
    );
    v.check(
        movie.year <= Utc::now().year(),
        "year",
        "must not be in the future",
    );

    v.check(movie.runtime.minutes() != 0, "runtime", "must be provided");
    v.check(
        movie.runtime.minutes() > 0,
        "runtime",
        "must be a positive integer",
    );

    v.check(
        !movie.genres.is_empty(),
        "genres",
        "must contain at least 1 genre",
    );
    v.check(
        movie.genres.len() <= MAX_GENRES,
        "genres",
        "must not contain more than 5 genres",
    );
    v.check(
        movie.genres.iter().all(|g| !g.is_empty()),
        "genres",
        "must not contain empty values",
    );
    v.check(
        unique(&movie.genres),
        "genres",
        "must not contain duplicate values",
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn valid_movie() -> Movie {
        Movie {
            id: 0,
            created_at: Utc::now(),
            title: "Casablanca".to_string(),
            year: 1942,
            runtime: Runtime(102),
            genres: vec!["drama".to_string(), "romance".to_string()],
            version: 0,
        }
    }

    fn errors_for(movie: &Movie) -> BTreeMap<String, String> {
        let mut v = Validator::new();
        validate_movie(&mut v, movie);
        v.into_errors()
    }

    #[test]
    fn valid_movie_passes() {
        assert!(errors_for(&valid_movie()).is_empty());
    }

    #[test]
    fn empty_title_fails_with_only_a_title_entry() {
        let mut movie = valid_movie();
        movie.title = String::new();

        let errors = errors_for(&movie);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("title"));
    }

    #[test]
    fn title_length_boundary() {
        let mut movie = valid_movie();
        movie.title = "a".repeat(500);
        assert!(errors_for(&movie).is_empty());

        movie.title = "a".repeat(501);
        let errors = errors_for(&movie);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("title"));
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        let mut movie = valid_movie();
        movie.title = "ü".repeat(500);
        assert!(errors_for(&movie).is_empty());
    }

    #[test]
    fn year_boundaries() {
        let mut movie = valid_movie();

        movie.year = 1888;
        assert!(errors_for(&movie).is_empty());

        movie.year = 1887;
        let errors = errors_for(&movie);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("year"));

        movie.year = Utc::now().year();
        assert!(errors_for(&movie).is_empty());

        movie.year = Utc::now().year() + 1;
        let errors = errors_for(&movie);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("year").map(String::as_str),
            Some("must not be in the future")
        );
    }

    #[test]
    fn missing_year_reports_must_be_provided() {
        let mut movie = valid_movie();
        movie.year = 0;

        let errors = errors_for(&movie);
        assert_eq!(
            errors.get("year").map(String::as_str),
            Some("must be provided")
        );
    }

    #[test]
    fn runtime_must_be_positive() {
        let mut movie = valid_movie();

        movie.runtime = Runtime(0);
        let errors = errors_for(&movie);
        assert_eq!(
            errors.get("runtime").map(String::as_str),
            Some("must be provided")
        );

        movie.runtime = Runtime(-10);
        let errors = errors_for(&movie);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("runtime").map(String::as_str),
            Some("must be a positive integer")
        );
    }

    #[test]
    fn genre_count_rules() {
        let mut movie = valid_movie();

        movie.genres = vec![];
        let errors = errors_for(&movie);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("genres").map(String::as_str),
            Some("must contain at least 1 genre")
        );

        movie.genres = (0..6).map(|i| format!("genre-{i}")).collect();
        let errors = errors_for(&movie);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("genres").map(String::as_str),
            Some("must not contain more than 5 genres")
        );
    }

    #[test]
    fn duplicate_genres_fail() {
        let mut movie = valid_movie();
        movie.genres = vec!["a".to_string(), "a".to_string()];

        let errors = errors_for(&movie);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("genres").map(String::as_str),
            Some("must not contain duplicate values")
        );
    }

    #[test]
    fn empty_genre_value_fails() {
        let mut movie = valid_movie();
        movie.genres = vec!["drama".to_string(), String::new()];

        let errors = errors_for(&movie);
        assert_eq!(
            errors.get("genres").map(String::as_str),
            Some("must not contain empty values")
        );
    }

    #[test]
    fn all_violations_are_collected_in_one_pass() {
        let movie = Movie {
            id: 0,
            created_at: Utc::now(),
            title: String::new(),
            year: 1887,
            runtime: Runtime(-1),
            genres: vec![],
            version: 0,
        };

        let errors = errors_for(&movie);
        assert_eq!(errors.len(), 4);
        for field in ["title", "year", "runtime", "genres"] {
            assert!(errors.contains_key(field), "missing entry for {field}");
        }
    }

    #[test]
    fn error_set_is_deterministic() {
        let mut movie = valid_movie();
        movie.title = String::new();
        movie.genres = vec!["a".to_string(), "a".to_string()];

        assert_eq!(errors_for(&movie), errors_for(&movie));
    }

    #[test]
    fn runtime_serializes_with_unit_suffix() {
        let value = serde_json::to_value(Runtime(152)).unwrap();
        assert_eq!(value, json!("152 mins"));
    }

    #[test]
    fn runtime_decodes_from_integer_and_string() {
        let from_int: Runtime = serde_json::from_value(json!(152)).unwrap();
        let from_str: Runtime = serde_json::from_value(json!("152 mins")).unwrap();

        assert_eq!(from_int, Runtime(152));
        assert_eq!(from_str, Runtime(152));
    }

    #[test]
    fn runtime_rejects_garbage() {
        assert!(serde_json::from_value::<Runtime>(json!("two hours")).is_err());
        assert!(serde_json::from_value::<Runtime>(json!("152 minutes")).is_err());
        assert!(serde_json::from_value::<Runtime>(json!(true)).is_err());
    }

    #[test]
    fn create_input_rejects_unknown_fields() {
        let result: Result<CreateMovie, _> = serde_json::from_value(json!({
            "title": "Heat",
            "year": 1995,
            "runtime": 170,
            "genres": ["crime"],
            "budget": 1000
        }));

        let err = result.unwrap_err().to_string();
        assert!(err.contains("budget"), "unexpected message: {err}");
    }

    #[test]
    fn create_input_defaults_absent_fields_to_zero_values() {
        let input: CreateMovie = serde_json::from_value(json!({})).unwrap();
        let errors = errors_for(&Movie::from(input));

        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn movie_json_omits_created_at() {
        let value = serde_json::to_value(valid_movie()).unwrap();

        assert!(value.get("created_at").is_none());
        assert_eq!(value["runtime"], json!("102 mins"));
        assert_eq!(value["title"], json!("Casablanca"));
    }
}
