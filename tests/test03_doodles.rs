#![cfg(feature = "test-utils")]

mod common;

use common::{TestResult, ids, seed_doodle, seed_user, with_dal};
use doodle_dal::prelude::*;

#[test]
fn test03_uploads_and_doodles() -> TestResult {
    with_dal(|dal| async move {
        let ada = seed_user(&dal, "Ada").await?;
        let (image_id, doodle_id) = seed_doodle(&dal, ada).await?;
        let second_image = dal
            .add_image(&NewImage {
                url: "https://img.example.com/second.png".to_string(),
                uploader_id: ada,
            })
            .await?;

        assert_eq!(ids(&dal.get_user_uploads(ada).await?), vec![second_image, image_id]);
        let image = dal.get_image_by_id(image_id).await?.expect("image exists");
        assert_eq!(image.get_text("url"), Some("https://img.example.com/original.png"));
        assert_eq!(*image.column_names, vec!["url".to_string()]);

        let doodles = dal.get_user_doodles(ada).await?;
        assert_eq!(doodles.len(), 1);
        let doodle = doodles.into_first().expect("one doodle");
        assert_eq!(doodle.get_int("id"), Some(doodle_id));
        assert_eq!(doodle.get_int("count"), Some(0));
        assert_eq!(doodle.get_text("username"), Some("Ada"));
        assert_eq!(
            doodle.get_text("original_url"),
            Some("https://img.example.com/original.png")
        );
        assert_eq!(doodle.get_text("caption"), Some("first try"));
        assert!(doodle.get("created_at").and_then(RowValues::as_timestamp).is_some());
        Ok(())
    })
}

#[test]
fn test03_caption_may_be_missing() -> TestResult {
    with_dal(|dal| async move {
        let ada = seed_user(&dal, "Ada").await?;
        let (image_id, _) = seed_doodle(&dal, ada).await?;
        let bare = dal
            .add_doodle(&NewDoodle {
                url: "https://img.example.com/bare.png".to_string(),
                caption: None,
                original_id: image_id,
                doodler_id: ada,
            })
            .await?;

        let row = dal.get_doodle_by_id(bare).await?.expect("doodle exists");
        assert!(row.get("caption").is_some_and(RowValues::is_null));
        Ok(())
    })
}

#[test]
fn test03_deleting_an_image_hides_its_doodles() -> TestResult {
    with_dal(|dal| async move {
        let ada = seed_user(&dal, "Ada").await?;
        let (image_id, doodle_id) = seed_doodle(&dal, ada).await?;

        assert_eq!(dal.delete_image(image_id).await?, 1);
        assert!(dal.get_image_by_id(image_id).await?.is_none());
        assert!(dal.get_user_uploads(ada).await?.is_empty());

        // the doodle row survives with a dangling original_id
        let orphan = dal.get_doodle_by_id(doodle_id).await?.expect("doodle kept");
        assert_eq!(orphan.get_int("original_id"), Some(image_id));
        assert!(dal.get_user_doodles(ada).await?.is_empty());
        Ok(())
    })
}

#[test]
fn test03_delete_doodle_takes_its_likes_and_comments() -> TestResult {
    with_dal(|dal| async move {
        let ada = seed_user(&dal, "Ada").await?;
        let bob = seed_user(&dal, "Bob").await?;
        let (_, doodle_id) = seed_doodle(&dal, ada).await?;
        dal.like_doodle(bob, doodle_id).await?;
        dal.add_comment(&NewComment {
            comment: "love it".to_string(),
            doodle_id,
            user_id: bob,
        })
        .await?;

        assert_eq!(dal.delete_doodle(doodle_id).await?, 1);
        assert!(dal.get_doodle_by_id(doodle_id).await?.is_none());
        assert!(dal.get_liked_doodles(bob).await?.is_empty());
        assert!(dal.get_comments(doodle_id).await?.is_empty());

        assert_eq!(dal.delete_doodle(doodle_id).await?, 0);
        Ok(())
    })
}

#[test]
fn test03_unknown_uploader_is_a_foreign_key_violation() -> TestResult {
    with_dal(|dal| async move {
        let err = dal
            .add_image(&NewImage {
                url: "https://img.example.com/x.png".to_string(),
                uploader_id: 404,
            })
            .await
            .unwrap_err();
        assert_eq!(err.sql_state(), Some("23503"));
        Ok(())
    })
}
