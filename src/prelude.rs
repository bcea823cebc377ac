//! Convenient imports for common functionality.

pub use crate::config::{DoodleDbConfig, TlsMode};
pub use crate::dal::{AddFriendOutcome, BioWrite, CommentWithAuthor, DoodleDal};
pub use crate::error::DoodleDbError;
pub use crate::inputs::{
    BioUpdate, FriendEdge, NewComment, NewDoodle, NewImage, NewUser, parse_id,
};
pub use crate::pool::DoodlePool;
pub use crate::postgres::AsyncDatabaseExecutor;
pub use crate::results::{DbRow, ResultSet};
pub use crate::types::RowValues;
