use tracing::instrument;

use super::DoodleDal;
use crate::error::DoodleDbError;
use crate::inputs::{NewUser, check_id, parse_id};
use crate::results::{DbRow, ResultSet};
use crate::types::RowValues;

/// Most rows a name search returns.
pub const FUZZY_MATCH_LIMIT: i64 = 8;

const LIST_USERS: &str = "SELECT * FROM users ORDER BY id ASC";
const USER_BY_EXTERNAL_ID: &str = "SELECT * FROM users WHERE googleId = $1";
const USER_BY_ID: &str = "SELECT * FROM users WHERE id = $1";
// $1 is the ILIKE pattern with wildcards escaped, $2 the bare search text
// for trigram scoring.
const USERS_BY_NAME: &str = "SELECT * FROM users \
     WHERE name ILIKE $1 ESCAPE '\\' OR $2 % name \
     ORDER BY similarity(name, $2) DESC, id ASC \
     LIMIT $3";
const INSERT_USER: &str =
    "INSERT INTO users (googleId, email, name, imageUrl) VALUES ($1, $2, $3, $4) RETURNING id";

/// Make `%`, `_` and `\` in user text match themselves under `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

impl DoodleDal {
    /// All users, ordered by id.
    ///
    /// # Errors
    /// Propagates pool and driver errors.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn list_users(&self) -> Result<ResultSet, DoodleDbError> {
        self.select(LIST_USERS, &[]).await
    }

    /// Login lookup by the identity provider's id.
    ///
    /// # Errors
    /// Propagates pool and driver errors.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn get_user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<DbRow>, DoodleDbError> {
        self.select_one(USER_BY_EXTERNAL_ID, &[RowValues::from(external_id)])
            .await
    }

    /// # Errors
    /// Returns `Validation` for a non-positive id; otherwise propagates pool and driver errors.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<DbRow>, DoodleDbError> {
        let id = check_id("id", id)?;
        self.select_one(USER_BY_ID, &[RowValues::Int(id)]).await
    }

    /// [`DoodleDal::get_user_by_id`] for an id still in its URL form.
    ///
    /// # Errors
    /// Returns `Validation` if `raw_id` is not a positive integer.
    pub async fn get_user_by_path_id(&self, raw_id: &str) -> Result<Option<DbRow>, DoodleDbError> {
        self.get_user_by_id(parse_id("id", raw_id)?).await
    }

    /// Search-as-you-type: users whose name contains `pattern` (any case) or is
    /// trigram-similar to it, best match first, at most [`FUZZY_MATCH_LIMIT`].
    ///
    /// # Errors
    /// Returns `Validation` for a blank pattern; otherwise propagates pool and driver errors.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn get_user_by_name_fuzzy(&self, pattern: &str) -> Result<ResultSet, DoodleDbError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(DoodleDbError::Validation(
                "search pattern must not be empty".to_string(),
            ));
        }
        self.select(
            USERS_BY_NAME,
            &[
                RowValues::Text(format!("%{}%", escape_like(pattern))),
                RowValues::from(pattern),
                RowValues::Int(FUZZY_MATCH_LIMIT),
            ],
        )
        .await
    }

    /// Insert a user on first login and return the new id.
    ///
    /// Duplicate identities are only prevented if the database has a constraint for it.
    ///
    /// # Errors
    /// Returns `Validation` for a malformed payload; otherwise propagates pool and driver errors.
    #[instrument(level = "debug", skip(self, user), fields(google_id = %user.google_id), err)]
    pub async fn create_user(&self, user: &NewUser) -> Result<i64, DoodleDbError> {
        user.validate()?;
        self.insert_id(
            INSERT_USER,
            &[
                RowValues::from(user.google_id.as_str()),
                RowValues::from(user.email.as_str()),
                RowValues::from(user.name.as_str()),
                RowValues::from(user.image_url.clone()),
            ],
        )
        .await
    }
}
