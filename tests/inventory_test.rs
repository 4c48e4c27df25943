mod common;

use anyhow::Result;
use common::{reconnect, test_service};
use corresponsal::application::AppError;
use corresponsal::io::{LegacyImportOutcome, import_legacy_inventory};

#[tokio::test]
async fn test_record_sales_and_ranking() -> Result<()> {
    let (mut service, temp) = test_service().await?;

    service.record_sale("gorra", 2).await?;
    service.record_sale("buzo", 5).await?;
    service.record_sale("gorra", 1).await?;

    assert_eq!(
        service.sales_ranked(),
        vec![("buzo".to_string(), 5), ("gorra".to_string(), 3)]
    );

    let reopened = reconnect(&temp).await?;
    assert_eq!(reopened.sales_ranked()[0], ("buzo".to_string(), 5));

    Ok(())
}

#[tokio::test]
async fn test_record_sale_from_text() -> Result<()> {
    let (mut service, _temp) = test_service().await?;

    let sale = service.record_sale_text("vendí 2 gorras").await?;
    assert_eq!(sale.product, "gorra"); // singularized for grouping
    assert_eq!(sale.quantity, 2);

    service.record_sale_text("venta de 1 gorra").await?;
    assert_eq!(service.sales_ranked(), vec![("gorra".to_string(), 3)]);

    let err = service.record_sale_text("vendí mucho").await.unwrap_err();
    assert!(matches!(err, AppError::UnparsedSale(_)));

    Ok(())
}

#[tokio::test]
async fn test_reset_sales() -> Result<()> {
    let (mut service, temp) = test_service().await?;

    service.record_sale("gorra", 2).await?;
    service.reset_sales().await?;
    assert!(service.sales_ranked().is_empty());

    let reopened = reconnect(&temp).await?;
    assert!(reopened.sales_ranked().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_legacy_import_merges_and_consumes_source() -> Result<()> {
    let (mut service, temp) = test_service().await?;
    service.record_sale("gorra", 1).await?;

    let source = temp.path().join("myInventory.json");
    std::fs::write(&source, r#"{"gorra": 3, "buzo": 2, "roto": "x", "nada": 0}"#)?;

    let outcome = import_legacy_inventory(&mut service, &source).await?;
    assert_eq!(
        outcome,
        LegacyImportOutcome::Imported {
            products: 2,
            units: 5
        }
    );
    assert_eq!(
        service.sales_ranked(),
        vec![("gorra".to_string(), 4), ("buzo".to_string(), 2)]
    );
    assert!(!source.exists(), "source must be consumed");

    // Re-running is a no-op
    let outcome = import_legacy_inventory(&mut service, &source).await?;
    assert_eq!(outcome, LegacyImportOutcome::SourceMissing);
    assert_eq!(service.sales_ranked().len(), 2);

    Ok(())
}
