use tracing::instrument;

use super::DoodleDal;
use crate::error::DoodleDbError;
use crate::inputs::{BioUpdate, check_id};
use crate::results::DbRow;
use crate::types::RowValues;

// `xmax` is zero only on a freshly inserted tuple, which tells the two
// branches of the upsert apart without a second round trip.
const UPSERT_BIO: &str = "INSERT INTO bios (bio, user_id) VALUES ($1, $2) \
     ON CONFLICT (user_id) DO UPDATE SET bio = EXCLUDED.bio \
     RETURNING (xmax = 0) AS inserted";
const BIO_BY_USER: &str = "SELECT * FROM bios WHERE user_id = $1";

/// Which branch of [`DoodleDal::set_bio`] ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BioWrite {
    Inserted,
    Updated,
}

impl DoodleDal {
    /// Create or replace a user's bio. A user never ends up with two bios.
    ///
    /// # Errors
    /// Returns `Validation` for a bad user id; otherwise propagates pool and driver errors,
    /// including a foreign key violation for an unknown user.
    #[instrument(level = "debug", skip(self, update), fields(user_id = update.user_id), err)]
    pub async fn set_bio(&self, update: &BioUpdate) -> Result<BioWrite, DoodleDbError> {
        update.validate()?;
        let row = self
            .select_one(
                UPSERT_BIO,
                &[
                    RowValues::from(update.bio.as_str()),
                    RowValues::Int(update.user_id),
                ],
            )
            .await?
            .ok_or_else(|| DoodleDbError::ExecutionError("bio upsert returned no row".to_string()))?;

        match row.get("inserted").and_then(RowValues::as_bool).copied() {
            Some(true) => Ok(BioWrite::Inserted),
            Some(false) => Ok(BioWrite::Updated),
            None => Err(DoodleDbError::ExecutionError(
                "bio upsert did not report its branch".to_string(),
            )),
        }
    }

    /// # Errors
    /// Returns `Validation` for a bad user id; otherwise propagates pool and driver errors.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn get_bio(&self, user_id: i64) -> Result<Option<DbRow>, DoodleDbError> {
        let user_id = check_id("user_id", user_id)?;
        self.select_one(BIO_BY_USER, &[RowValues::Int(user_id)]).await
    }
}
