use tracing::instrument;

use super::DoodleDal;
use crate::error::DoodleDbError;
use crate::inputs::{FriendEdge, check_id};
use crate::results::ResultSet;
use crate::types::RowValues;

// The unique (user_id, friend_id) constraint makes the existence check and
// the insert one atomic statement.
const INSERT_EDGE: &str = "INSERT INTO friends (user_id, friend_id) VALUES ($1, $2) \
     ON CONFLICT (user_id, friend_id) DO NOTHING";
const MUTUAL_FRIENDS: &str = "SELECT users.* FROM friends AS outgoing \
     JOIN friends AS incoming \
       ON incoming.user_id = outgoing.friend_id AND incoming.friend_id = outgoing.user_id \
     JOIN users ON users.id = outgoing.friend_id \
     WHERE outgoing.user_id = $1 \
     ORDER BY outgoing.id";
const INCOMING_REQUESTS: &str = "SELECT users.* FROM friends \
     JOIN users ON users.id = friends.user_id \
     WHERE friends.friend_id = $1 \
     ORDER BY friends.id";
const DELETE_EDGE: &str = "DELETE FROM friends WHERE user_id = $1 AND friend_id = $2";

/// What [`DoodleDal::add_friend`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddFriendOutcome {
    Added,
    /// The edge was already there; nothing was written.
    AlreadyExists,
}

impl AddFriendOutcome {
    /// The token route handlers send back, `"exists"` for a repeat request.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::AlreadyExists => "exists",
        }
    }
}

fn edge_params(edge: &FriendEdge) -> [RowValues; 2] {
    [RowValues::Int(edge.user_id), RowValues::Int(edge.friend_id)]
}

impl DoodleDal {
    /// Record that `user_id` added `friend_id`. The friendship is confirmed once
    /// the reverse edge exists too.
    ///
    /// # Errors
    /// Returns `Validation` for bad ids; otherwise propagates pool and driver errors.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn add_friend(&self, edge: &FriendEdge) -> Result<AddFriendOutcome, DoodleDbError> {
        edge.validate()?;
        let inserted = self.dml(INSERT_EDGE, &edge_params(edge)).await?;
        Ok(if inserted == 0 {
            AddFriendOutcome::AlreadyExists
        } else {
            AddFriendOutcome::Added
        })
    }

    /// Users `user_id` has added who have added `user_id` back, in the order
    /// `user_id` added them.
    ///
    /// # Errors
    /// Returns `Validation` for a bad id; otherwise propagates pool and driver errors.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn get_friends(&self, user_id: i64) -> Result<ResultSet, DoodleDbError> {
        let user_id = check_id("user_id", user_id)?;
        self.select(MUTUAL_FRIENDS, &[RowValues::Int(user_id)]).await
    }

    /// Everyone who has added `user_id`, confirmed or not.
    ///
    /// # Errors
    /// Returns `Validation` for a bad id; otherwise propagates pool and driver errors.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn get_friend_requests(&self, user_id: i64) -> Result<ResultSet, DoodleDbError> {
        let user_id = check_id("user_id", user_id)?;
        self.select(INCOMING_REQUESTS, &[RowValues::Int(user_id)])
            .await
    }

    /// Drop the `user_id` → `friend_id` edge only; the reverse edge stays.
    /// Returns the number of edges removed (0 or 1).
    ///
    /// # Errors
    /// Returns `Validation` for bad ids; otherwise propagates pool and driver errors.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn remove_friend(&self, edge: &FriendEdge) -> Result<usize, DoodleDbError> {
        edge.validate()?;
        self.dml(DELETE_EDGE, &edge_params(edge)).await
    }
}
