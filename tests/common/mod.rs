#![allow(dead_code)]

use std::error::Error;
use std::future::Future;

use doodle_dal::prelude::*;
use doodle_dal::test_utils::{setup_postgres_embedded, stop_postgres_embedded};

pub type TestResult = Result<(), Box<dyn Error>>;

/// Start a fresh database, hand a `DoodleDal` on it to `body`, then stop the
/// database whether or not `body` succeeded.
pub fn with_dal<F, Fut>(body: F) -> TestResult
where
    F: FnOnce(DoodleDal) -> Fut,
    Fut: Future<Output = TestResult>,
{
    let pg = setup_postgres_embedded()?;
    let config = pg.config.clone();

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(async move {
        let pool = DoodlePool::new(config).await?;
        body(DoodleDal::new(pool)).await
    });
    drop(rt);

    stop_postgres_embedded(pg);
    outcome
}

pub fn new_user(name: &str) -> NewUser {
    let handle = name.to_lowercase().replace(' ', ".");
    NewUser {
        google_id: format!("g-{handle}"),
        email: format!("{handle}@example.com"),
        name: name.to_string(),
        image_url: Some(format!("https://img.example.com/{handle}.png")),
    }
}

pub async fn seed_user(dal: &DoodleDal, name: &str) -> Result<i64, DoodleDbError> {
    dal.create_user(&new_user(name)).await
}

/// An uploaded image plus one doodle traced over it; returns `(image_id, doodle_id)`.
pub async fn seed_doodle(dal: &DoodleDal, doodler_id: i64) -> Result<(i64, i64), DoodleDbError> {
    let image_id = dal
        .add_image(&NewImage {
            url: "https://img.example.com/original.png".to_string(),
            uploader_id: doodler_id,
        })
        .await?;
    let doodle_id = dal
        .add_doodle(&NewDoodle {
            url: "https://img.example.com/doodle.png".to_string(),
            caption: Some("first try".to_string()),
            original_id: image_id,
            doodler_id,
        })
        .await?;
    Ok((image_id, doodle_id))
}

pub fn ids(rows: &ResultSet) -> Vec<i64> {
    rows.iter().filter_map(|row| row.get_int("id")).collect()
}
