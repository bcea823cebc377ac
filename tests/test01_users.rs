#![cfg(feature = "test-utils")]

mod common;

use common::{TestResult, new_user, seed_user, with_dal};
use doodle_dal::dal::FUZZY_MATCH_LIMIT;

#[test]
fn test01_create_and_look_up_users() -> TestResult {
    with_dal(|dal| async move {
        let ada = dal.create_user(&new_user("Ada Lovelace")).await?;
        let grace = seed_user(&dal, "Grace Hopper").await?;
        assert!(grace > ada);

        let row = dal.get_user_by_id(ada).await?.expect("ada exists");
        assert_eq!(row.get_int("id"), Some(ada));
        assert_eq!(row.get_text("googleid"), Some("g-ada.lovelace"));
        assert_eq!(row.get_text("name"), Some("Ada Lovelace"));
        assert_eq!(row.get_text("email"), Some("ada.lovelace@example.com"));
        assert_eq!(
            row.get_text("imageurl"),
            Some("https://img.example.com/ada.lovelace.png")
        );

        let by_login = dal
            .get_user_by_external_id("g-grace.hopper")
            .await?
            .expect("grace exists");
        assert_eq!(by_login.get_int("id"), Some(grace));
        assert!(dal.get_user_by_external_id("g-nobody").await?.is_none());

        let by_path = dal.get_user_by_path_id(&ada.to_string()).await?;
        assert_eq!(by_path.and_then(|r| r.get_int("id")), Some(ada));
        assert!(dal.get_user_by_id(ada + 100).await?.is_none());

        let all = dal.list_users().await?;
        assert_eq!(common::ids(&all), vec![ada, grace]);
        Ok(())
    })
}

#[test]
fn test01_fields_are_stored_as_given() -> TestResult {
    with_dal(|dal| async move {
        let mut user = new_user("Bo");
        user.google_id = " g-bo ".to_string();
        user.name = "  Bo  ".to_string();
        user.image_url = None;
        let bo = dal.create_user(&user).await?;

        let row = dal.get_user_by_id(bo).await?.expect("bo exists");
        assert_eq!(row.get_text("googleid"), Some(" g-bo "));
        assert_eq!(row.get_text("email"), Some("bo@example.com"));
        assert_eq!(row.get_text("name"), Some("  Bo  "));
        assert!(row.get("imageurl").is_some_and(|v| v.is_null()));
        assert_eq!(row.column_names.len(), 5);
        Ok(())
    })
}

#[test]
fn test01_fuzzy_name_search() -> TestResult {
    with_dal(|dal| async move {
        let ada = seed_user(&dal, "Ada Lovelace").await?;
        let adam = seed_user(&dal, "Adam").await?;
        let grace = seed_user(&dal, "Grace Hopper").await?;

        let found = common::ids(&dal.get_user_by_name_fuzzy("ada").await?);
        assert!(found.contains(&ada));
        assert!(found.contains(&adam));
        assert!(!found.contains(&grace));

        let found = common::ids(&dal.get_user_by_name_fuzzy("HOPPER").await?);
        assert_eq!(found, vec![grace]);

        // wildcards in the search text are literal characters
        assert!(dal.get_user_by_name_fuzzy("%").await?.is_empty());
        assert!(dal.get_user_by_name_fuzzy("_").await?.is_empty());
        let percent = seed_user(&dal, "100% Doodler").await?;
        assert_eq!(common::ids(&dal.get_user_by_name_fuzzy("%").await?), vec![percent]);
        Ok(())
    })
}

#[test]
fn test01_fuzzy_search_is_capped() -> TestResult {
    with_dal(|dal| async move {
        for i in 0..FUZZY_MATCH_LIMIT + 3 {
            seed_user(&dal, &format!("Doodler {i}")).await?;
        }
        let found = dal.get_user_by_name_fuzzy("doodler").await?;
        assert_eq!(found.len(), usize::try_from(FUZZY_MATCH_LIMIT)?);
        Ok(())
    })
}

#[test]
fn test01_bad_input_never_reaches_the_database() -> TestResult {
    with_dal(|dal| async move {
        assert!(dal.get_user_by_path_id("abc").await.unwrap_err().is_validation());
        assert!(dal.get_user_by_path_id("-1").await.unwrap_err().is_validation());
        assert!(dal.get_user_by_name_fuzzy("  ").await.unwrap_err().is_validation());

        let mut user = new_user("Ada");
        user.email = "ada at example".to_string();
        assert!(dal.create_user(&user).await.unwrap_err().is_validation());
        assert!(dal.list_users().await?.is_empty());
        Ok(())
    })
}
