// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use corresponsal::application::CorresponsalService;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(CorresponsalService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = CorresponsalService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Reopen the database of an earlier `test_service`, as a fresh session
/// would.
pub async fn reconnect(temp_dir: &TempDir) -> Result<CorresponsalService> {
    let db_path = temp_dir.path().join("test.db");
    Ok(CorresponsalService::connect(db_path.to_str().unwrap()).await?)
}
