use std::collections::HashMap;

use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};
use tracing::instrument;

use super::DoodleDal;
use crate::error::DoodleDbError;
use crate::inputs::{NewComment, check_id};
use crate::postgres::begin_transaction;
use crate::results::DbRow;
use crate::types::RowValues;

const INSERT_COMMENT: &str =
    "INSERT INTO comments (comment, doodle_id, user_id) VALUES ($1, $2, $3) RETURNING id";
const DOODLE_COMMENTS: &str = "SELECT comments.*, users.name AS username, users.imageUrl AS avatar \
     FROM comments JOIN users ON users.id = comments.user_id \
     WHERE comments.doodle_id = $1 \
     ORDER BY comments.id";
const COMMENT_AUTHORS: &str = "SELECT DISTINCT users.* FROM users \
     JOIN comments ON comments.user_id = users.id \
     WHERE comments.doodle_id = $1";
// Both reads must see the same snapshot or an author could vanish between them.
const SNAPSHOT: &str = "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY";

/// A comment paired with the full row of the user who wrote it.
///
/// Serializes as the two-element `[comment, user]` array clients expect.
#[derive(Debug, Clone)]
pub struct CommentWithAuthor {
    pub comment: DbRow,
    pub user: DbRow,
}

impl Serialize for CommentWithAuthor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut pair = serializer.serialize_tuple(2)?;
        pair.serialize_element(&self.comment)?;
        pair.serialize_element(&self.user)?;
        pair.end()
    }
}

impl DoodleDal {
    /// Store a comment and return its id.
    ///
    /// # Errors
    /// Returns `Validation` for a malformed payload; otherwise propagates pool and driver
    /// errors, including a foreign key violation for an unknown doodle or user.
    #[instrument(
        level = "debug",
        skip(self, comment),
        fields(doodle_id = comment.doodle_id, user_id = comment.user_id),
        err
    )]
    pub async fn add_comment(&self, comment: &NewComment) -> Result<i64, DoodleDbError> {
        comment.validate()?;
        self.insert_id(
            INSERT_COMMENT,
            &[
                RowValues::from(comment.comment.as_str()),
                RowValues::Int(comment.doodle_id),
                RowValues::Int(comment.user_id),
            ],
        )
        .await
    }

    /// Comments on a doodle in posting order, each with its author.
    ///
    /// Each comment row carries `username` and `avatar` for the author as well.
    /// Runs two statements regardless of how many comments there are.
    ///
    /// # Errors
    /// Returns `Validation` for a bad id; otherwise propagates pool and driver errors.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn get_comments(&self, doodle_id: i64) -> Result<Vec<CommentWithAuthor>, DoodleDbError> {
        let doodle_id = check_id("doodle_id", doodle_id)?;
        let params = [RowValues::Int(doodle_id)];

        let mut conn = self.pool.get_connection().await?;
        let tx = begin_transaction(&mut conn).await?;
        tx.execute_batch(SNAPSHOT).await?;
        let comments = tx.execute_select(DOODLE_COMMENTS, &params).await?;
        let authors = tx.execute_select(COMMENT_AUTHORS, &params).await?;
        tx.commit().await?;

        let mut by_id: HashMap<i64, DbRow> = HashMap::with_capacity(authors.len());
        for author in authors {
            if let Some(id) = author.get_int("id") {
                by_id.insert(id, author);
            }
        }

        comments
            .into_iter()
            .map(|comment| {
                let user = comment
                    .get_int("user_id")
                    .and_then(|id| by_id.get(&id).cloned())
                    .ok_or_else(|| {
                        DoodleDbError::ExecutionError(format!(
                            "comment {:?} has no author row",
                            comment.get_int("id")
                        ))
                    })?;
                Ok(CommentWithAuthor { comment, user })
            })
            .collect()
    }
}
