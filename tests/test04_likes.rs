#![cfg(feature = "test-utils")]

mod common;

use common::{TestResult, ids, seed_doodle, seed_user, with_dal};
use doodle_dal::prelude::*;

#[test]
fn test04_like_count_follows_like_rows() -> TestResult {
    with_dal(|dal| async move {
        let ada = seed_user(&dal, "Ada").await?;
        let bob = seed_user(&dal, "Bob").await?;
        let (_, doodle_id) = seed_doodle(&dal, ada).await?;

        assert_eq!(dal.like_doodle(bob, doodle_id).await?, 1);
        // liking twice does not double count
        assert_eq!(dal.like_doodle(bob, doodle_id).await?, 1);
        assert_eq!(dal.like_doodle(ada, doodle_id).await?, 2);

        assert_eq!(dal.unlike_doodle(bob, doodle_id).await?, 1);
        assert_eq!(dal.unlike_doodle(bob, doodle_id).await?, 1);
        assert_eq!(dal.unlike_doodle(ada, doodle_id).await?, 0);
        // never negative
        assert_eq!(dal.unlike_doodle(ada, doodle_id).await?, 0);

        for _ in 0..5 {
            assert_eq!(dal.like_doodle(bob, doodle_id).await?, 1);
            assert_eq!(dal.unlike_doodle(bob, doodle_id).await?, 0);
        }

        let row = dal.get_doodle_by_id(doodle_id).await?.expect("doodle exists");
        assert_eq!(row.get_int("count"), Some(0));
        Ok(())
    })
}

#[test]
fn test04_liked_doodles_in_like_order() -> TestResult {
    with_dal(|dal| async move {
        let ada = seed_user(&dal, "Ada").await?;
        let bob = seed_user(&dal, "Bob").await?;
        let (_, first) = seed_doodle(&dal, ada).await?;
        let (_, second) = seed_doodle(&dal, ada).await?;

        dal.like_doodle(bob, second).await?;
        dal.like_doodle(bob, first).await?;
        dal.like_doodle(ada, first).await?;

        let liked = dal.get_liked_doodles(bob).await?;
        assert_eq!(ids(&liked), vec![second, first]);
        let counts: Vec<_> = liked.iter().map(|row| row.get_int("count")).collect();
        assert_eq!(counts, vec![Some(1), Some(2)]);
        Ok(())
    })
}

#[test]
fn test04_missing_doodle_is_not_found() -> TestResult {
    with_dal(|dal| async move {
        let ada = seed_user(&dal, "Ada").await?;
        let err = dal.like_doodle(ada, 9_999).await.unwrap_err();
        assert!(matches!(err, DoodleDbError::NotFound(_)), "{err}");
        let err = dal.unlike_doodle(ada, 9_999).await.unwrap_err();
        assert!(matches!(err, DoodleDbError::NotFound(_)), "{err}");
        assert!(dal.like_doodle(ada, 0).await.unwrap_err().is_validation());
        Ok(())
    })
}

#[test]
fn test04_concurrent_likes_are_all_counted() -> TestResult {
    with_dal(|dal| async move {
        let ada = seed_user(&dal, "Ada").await?;
        let (_, doodle_id) = seed_doodle(&dal, ada).await?;

        let mut likers = Vec::new();
        for i in 0..10 {
            likers.push(seed_user(&dal, &format!("Fan {i}")).await?);
        }

        let handles: Vec<_> = likers
            .iter()
            .map(|&user_id| {
                let dal = dal.clone();
                tokio::spawn(async move { dal.like_doodle(user_id, doodle_id).await })
            })
            .collect();
        for handle in handles {
            let count = handle.await??;
            assert!((1..=10).contains(&count));
        }

        let row = dal.get_doodle_by_id(doodle_id).await?.expect("doodle exists");
        assert_eq!(row.get_int("count"), Some(10));
        Ok(())
    })
}

#[test]
fn test04_delete_races_likes_without_deadlock() -> TestResult {
    with_dal(|dal| async move {
        let ada = seed_user(&dal, "Ada").await?;
        let bob = seed_user(&dal, "Bob").await?;

        for _ in 0..25 {
            let (_, doodle_id) = seed_doodle(&dal, ada).await?;
            dal.like_doodle(ada, doodle_id).await?;

            let deleting = {
                let dal = dal.clone();
                tokio::spawn(async move { dal.delete_doodle(doodle_id).await })
            };
            let unliking = {
                let dal = dal.clone();
                tokio::spawn(async move { dal.unlike_doodle(ada, doodle_id).await })
            };
            let liking = {
                let dal = dal.clone();
                tokio::spawn(async move { dal.like_doodle(bob, doodle_id).await })
            };

            assert_eq!(deleting.await??, 1);
            for outcome in [unliking.await?, liking.await?] {
                match outcome {
                    Ok(_) | Err(DoodleDbError::NotFound(_)) => {}
                    Err(err) => panic!("{err} (sqlstate {:?})", err.sql_state()),
                }
            }

            assert!(dal.get_doodle_by_id(doodle_id).await?.is_none());
        }
        assert!(dal.get_liked_doodles(ada).await?.is_empty());
        assert!(dal.get_liked_doodles(bob).await?.is_empty());
        Ok(())
    })
}
