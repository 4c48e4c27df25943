mod common;

use anyhow::Result;
use common::{reconnect, test_service};
use corresponsal::domain::TxKind;

/// A full counter day: open with counted balances, work, correct mistakes,
/// reconcile, close, and reopen the next morning.
#[tokio::test]
async fn test_full_day_workflow() -> Result<()> {
    let (mut service, temp) = test_service().await?;

    // Morning: count the drawer and the platform balances
    service.set_cash_base(1_000_000).await?;
    service
        .sync_balances(&[(1, 300_000), (2, 150_000), (3, 80_000), (4, 20_000)])
        .await?;
    let opening_total = service.ledger().grand_total();
    assert_eq!(opening_total, 1_550_000);

    // Clients come in
    service
        .add_transaction(TxKind::Retiro, Some(1), 50_000, "retiro cliente".into())
        .await?;
    service
        .add_transaction(TxKind::Envio, Some(2), 20_000, "giro a Cali".into())
        .await?;
    let wrong = service
        .add_transaction(TxKind::Pago, Some(3), 35_000, "recibo luz".into())
        .await?;
    service
        .add_transaction(TxKind::CompraTullave, Some(2), 10_000, "saldo tarjeta".into())
        .await?;

    // retiro and envio/pago cancel in total; compra_tullave moves value
    // between platforms. System value unchanged so far.
    assert_eq!(service.ledger().grand_total(), opening_total);

    // The pago was really 30k: edit reverses and reapplies under one id
    service
        .edit_transaction(wrong.id, TxKind::Pago, Some(3), 30_000, "recibo luz".into())
        .await?;
    assert_eq!(service.ledger().grand_total(), opening_total);
    assert_eq!(
        service.ledger().find_platform(3).unwrap().balance,
        80_000 - 30_000
    );

    // Owner takes cash out of the drawer
    service
        .add_transaction(TxKind::BaseRetiro, None, 100_000, "consignación".into())
        .await?;
    assert_eq!(service.ledger().grand_total(), opening_total - 100_000);

    // Evening: the history shows all four panels' worth of work
    let history = service.today_history();
    assert_eq!(history.retiros.entries.len(), 2);
    assert_eq!(history.envios.entries.len(), 1);
    assert_eq!(history.pagos.entries.len(), 2);

    // Also sold some merchandise on the side
    service.record_sale_text("vendí 3 gorras").await?;

    // Next morning: fresh session, same books
    let mut service = reconnect(&temp).await?;
    assert_eq!(service.ledger().grand_total(), opening_total - 100_000);
    assert_eq!(service.ledger().transactions().len(), 5);
    assert_eq!(service.sales_ranked(), vec![("gorra".to_string(), 3)]);

    // New day wipes the books but keeps the account structure
    service.reset_day().await?;
    assert_eq!(service.ledger().grand_total(), 0);
    assert!(service.ledger().transactions().is_empty());
    assert_eq!(service.ledger().platforms().len(), 4);
    // Sales survive a ledger day reset
    assert_eq!(service.sales_ranked().len(), 1);

    Ok(())
}
