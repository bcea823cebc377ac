use tracing::instrument;

use super::DoodleDal;
use crate::error::DoodleDbError;
use crate::inputs::{NewDoodle, NewImage, check_id};
use crate::postgres::{Tx, begin_transaction};
use crate::results::{DbRow, ResultSet};
use crate::types::RowValues;

// Like rows are the only record of likes; every doodle query derives `count`
// from them instead of trusting a stored counter.
macro_rules! doodle_columns {
    () => {
        "doodles.*, (SELECT COUNT(*) FROM likes WHERE likes.doodle_id = doodles.id) AS count"
    };
}

const INSERT_IMAGE: &str = "INSERT INTO images (url, uploader_id) VALUES ($1, $2) RETURNING id";
const INSERT_DOODLE: &str = "INSERT INTO doodles (url, caption, original_id, doodler_id) \
     VALUES ($1, $2, $3, $4) RETURNING id";
const DELETE_DOODLE_LIKES: &str = "DELETE FROM likes WHERE doodle_id = $1";
const DELETE_DOODLE: &str = "DELETE FROM doodles WHERE id = $1";
const DELETE_IMAGE: &str = "DELETE FROM images WHERE id = $1";
const USER_UPLOADS: &str =
    "SELECT * FROM images WHERE uploader_id = $1 ORDER BY created_at DESC, id DESC";
const IMAGE_URL: &str = "SELECT url FROM images WHERE id = $1";
const DOODLE_BY_ID: &str = concat!("SELECT ", doodle_columns!(), " FROM doodles WHERE id = $1");
const USER_DOODLES: &str = concat!(
    "SELECT ",
    doodle_columns!(),
    ", users.name AS username, images.url AS original_url \
     FROM doodles \
     JOIN users ON users.id = doodles.doodler_id \
     JOIN images ON images.id = doodles.original_id \
     WHERE doodles.doodler_id = $1 \
     ORDER BY doodles.created_at DESC, doodles.id DESC"
);
const LIKED_DOODLES: &str = concat!(
    "SELECT ",
    doodle_columns!(),
    " FROM likes JOIN doodles ON doodles.id = likes.doodle_id \
     WHERE likes.user_id = $1 \
     ORDER BY likes.id"
);
// Holding the row lock serializes likers of one doodle and keeps a
// concurrent delete from slipping in between the write and the recount.
const LOCK_DOODLE: &str = "SELECT id FROM doodles WHERE id = $1 FOR UPDATE";
const INSERT_LIKE: &str = "INSERT INTO likes (user_id, doodle_id) VALUES ($1, $2) \
     ON CONFLICT (user_id, doodle_id) DO NOTHING";
const DELETE_LIKE: &str = "DELETE FROM likes WHERE doodle_id = $1 AND user_id = $2";
const LIKE_COUNT: &str = "SELECT COUNT(*) AS count FROM likes WHERE doodle_id = $1";

async fn lock_doodle(tx: &Tx<'_>, doodle_id: i64) -> Result<(), DoodleDbError> {
    let found = tx
        .execute_select(LOCK_DOODLE, &[RowValues::Int(doodle_id)])
        .await?;
    if found.is_empty() {
        return Err(DoodleDbError::NotFound(format!("doodle {doodle_id}")));
    }
    Ok(())
}

async fn like_count(tx: &Tx<'_>, doodle_id: i64) -> Result<i64, DoodleDbError> {
    tx.execute_select(LIKE_COUNT, &[RowValues::Int(doodle_id)])
        .await?
        .into_first()
        .and_then(|row| row.get_int("count"))
        .ok_or_else(|| DoodleDbError::ExecutionError("like count returned no row".to_string()))
}

impl DoodleDal {
    /// Store an uploaded image and return its id.
    ///
    /// # Errors
    /// Returns `Validation` for a malformed payload; otherwise propagates pool and driver errors.
    #[instrument(level = "debug", skip(self, image), fields(uploader_id = image.uploader_id), err)]
    pub async fn add_image(&self, image: &NewImage) -> Result<i64, DoodleDbError> {
        image.validate()?;
        self.insert_id(
            INSERT_IMAGE,
            &[
                RowValues::from(image.url.as_str()),
                RowValues::Int(image.uploader_id),
            ],
        )
        .await
    }

    /// Store a doodle traced over `original_id` and return its id.
    ///
    /// # Errors
    /// Returns `Validation` for a malformed payload; otherwise propagates pool and driver errors.
    #[instrument(
        level = "debug",
        skip(self, doodle),
        fields(doodler_id = doodle.doodler_id, original_id = doodle.original_id),
        err
    )]
    pub async fn add_doodle(&self, doodle: &NewDoodle) -> Result<i64, DoodleDbError> {
        doodle.validate()?;
        self.insert_id(
            INSERT_DOODLE,
            &[
                RowValues::from(doodle.url.as_str()),
                RowValues::from(doodle.caption.clone()),
                RowValues::Int(doodle.original_id),
                RowValues::Int(doodle.doodler_id),
            ],
        )
        .await
    }

    /// Delete a doodle together with its likes. Returns the number of doodles
    /// removed (0 if it was already gone).
    ///
    /// # Errors
    /// Returns `Validation` for a bad id; otherwise propagates pool and driver errors,
    /// in which case nothing is deleted.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn delete_doodle(&self, doodle_id: i64) -> Result<usize, DoodleDbError> {
        let doodle_id = check_id("doodle_id", doodle_id)?;
        let params = [RowValues::Int(doodle_id)];

        let mut conn = self.pool.get_connection().await?;
        let tx = begin_transaction(&mut conn).await?;
        // Doodle row first, then its likes: the same order like/unlike lock in.
        if tx.execute_select(LOCK_DOODLE, &params).await?.is_empty() {
            return Ok(0);
        }
        let likes = tx.execute_dml(DELETE_DOODLE_LIKES, &params).await?;
        let deleted = tx.execute_dml(DELETE_DOODLE, &params).await?;
        tx.commit().await?;

        tracing::debug!(doodle_id, likes, deleted, "doodle deleted");
        Ok(deleted)
    }

    /// Delete an image row. Doodles traced from it are left in place with a
    /// dangling `original_id`.
    ///
    /// # Errors
    /// Returns `Validation` for a bad id; otherwise propagates pool and driver errors.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn delete_image(&self, image_id: i64) -> Result<usize, DoodleDbError> {
        let image_id = check_id("image_id", image_id)?;
        self.dml(DELETE_IMAGE, &[RowValues::Int(image_id)]).await
    }

    /// Images uploaded by `user_id`, newest first.
    ///
    /// # Errors
    /// Returns `Validation` for a bad id; otherwise propagates pool and driver errors.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn get_user_uploads(&self, user_id: i64) -> Result<ResultSet, DoodleDbError> {
        let user_id = check_id("user_id", user_id)?;
        self.select(USER_UPLOADS, &[RowValues::Int(user_id)]).await
    }

    /// The `url` of one image.
    ///
    /// # Errors
    /// Returns `Validation` for a bad id; otherwise propagates pool and driver errors.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn get_image_by_id(&self, image_id: i64) -> Result<Option<DbRow>, DoodleDbError> {
        let image_id = check_id("image_id", image_id)?;
        self.select_one(IMAGE_URL, &[RowValues::Int(image_id)]).await
    }

    /// One doodle with its like `count`.
    ///
    /// # Errors
    /// Returns `Validation` for a bad id; otherwise propagates pool and driver errors.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn get_doodle_by_id(&self, doodle_id: i64) -> Result<Option<DbRow>, DoodleDbError> {
        let doodle_id = check_id("doodle_id", doodle_id)?;
        self.select_one(DOODLE_BY_ID, &[RowValues::Int(doodle_id)])
            .await
    }

    /// Doodles drawn by `user_id`, newest first, each with the doodler's
    /// `username` and the traced image's `original_url`.
    ///
    /// Doodles whose original image has been deleted are not listed.
    ///
    /// # Errors
    /// Returns `Validation` for a bad id; otherwise propagates pool and driver errors.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn get_user_doodles(&self, user_id: i64) -> Result<ResultSet, DoodleDbError> {
        let user_id = check_id("user_id", user_id)?;
        self.select(USER_DOODLES, &[RowValues::Int(user_id)]).await
    }

    /// Like a doodle and return its new like count. Liking twice is a no-op.
    ///
    /// # Errors
    /// Returns `NotFound` if the doodle does not exist, `Validation` for bad ids;
    /// otherwise propagates pool and driver errors.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn like_doodle(&self, user_id: i64, doodle_id: i64) -> Result<i64, DoodleDbError> {
        let user_id = check_id("user_id", user_id)?;
        let doodle_id = check_id("doodle_id", doodle_id)?;

        let mut conn = self.pool.get_connection().await?;
        let tx = begin_transaction(&mut conn).await?;
        lock_doodle(&tx, doodle_id).await?;
        tx.execute_dml(
            INSERT_LIKE,
            &[RowValues::Int(user_id), RowValues::Int(doodle_id)],
        )
        .await?;
        let count = like_count(&tx, doodle_id).await?;
        tx.commit().await?;
        Ok(count)
    }

    /// Withdraw a like and return the new like count. Unliking a doodle the
    /// user never liked changes nothing, so the count never goes negative.
    ///
    /// # Errors
    /// Returns `NotFound` if the doodle does not exist, `Validation` for bad ids;
    /// otherwise propagates pool and driver errors.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn unlike_doodle(&self, user_id: i64, doodle_id: i64) -> Result<i64, DoodleDbError> {
        let user_id = check_id("user_id", user_id)?;
        let doodle_id = check_id("doodle_id", doodle_id)?;

        let mut conn = self.pool.get_connection().await?;
        let tx = begin_transaction(&mut conn).await?;
        lock_doodle(&tx, doodle_id).await?;
        tx.execute_dml(
            DELETE_LIKE,
            &[RowValues::Int(doodle_id), RowValues::Int(user_id)],
        )
        .await?;
        let count = like_count(&tx, doodle_id).await?;
        tx.commit().await?;
        Ok(count)
    }

    /// Doodles `user_id` has liked, in the order they were liked.
    ///
    /// # Errors
    /// Returns `Validation` for a bad id; otherwise propagates pool and driver errors.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn get_liked_doodles(&self, user_id: i64) -> Result<ResultSet, DoodleDbError> {
        let user_id = check_id("user_id", user_id)?;
        self.select(LIKED_DOODLES, &[RowValues::Int(user_id)]).await
    }
}
