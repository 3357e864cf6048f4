use anyhow::Result;

pub(crate) async fn run(package_id: i64, user_id: i64) -> Result<()> {
    let tracking = crate::tracking_service().await?;
    match tracking.get_attempt(package_id, user_id).await? {
        Some(attempt) => println!("{}", serde_json::to_string_pretty(&attempt)?),
        None => println!("Attempt not found: package {package_id}, user {user_id}"),
    }
    Ok(())
}
