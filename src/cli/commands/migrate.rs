use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    let database = DatabaseManager::connect(&config.database).await?;
    let result = database.migrate().await;
    database.close().await;
    result?;
    Ok(())
}
