use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Engine, ResultEngine, Transaction, TransactionListFilter};

use super::{
    EXPORT_COLUMNS, ExportFilter, SheetFormat,
    sheet::{self, Cell},
};

fn iso(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn export_row(
    tx: &Transaction,
    wallets: &HashMap<Uuid, String>,
    categories: &HashMap<Uuid, String>,
) -> Vec<Cell> {
    let name_of = |names: &HashMap<Uuid, String>, id: Uuid| {
        names.get(&id).cloned().unwrap_or_default()
    };
    vec![
        Cell::text(tx.id.to_string()),
        Cell::text(iso(tx.occurred_at)),
        Cell::text(tx.kind.as_str()),
        Cell::Number(tx.amount.as_major_f64()),
        Cell::text(tx.description.clone()),
        Cell::text(name_of(categories, tx.category_id)),
        Cell::text(name_of(wallets, tx.wallet_id)),
        Cell::text(
            tx.destination_wallet_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        ),
        Cell::text(
            tx.destination_wallet_id
                .map(|id| name_of(wallets, id))
                .unwrap_or_default(),
        ),
        Cell::text(iso(tx.created_at)),
        Cell::text(iso(tx.updated_at)),
    ]
}

impl Engine {
    /// Render the user's transactions as a spreadsheet, newest first.
    ///
    /// Both legs of a transfer are exported as the expense and income rows
    /// they are stored as.
    pub async fn export_transactions(
        &self,
        user_id: Uuid,
        filter: &ExportFilter,
        format: SheetFormat,
    ) -> ResultEngine<Vec<u8>> {
        let (from, to) = filter.range()?;
        let transactions = self
            .list_transactions(
                user_id,
                &TransactionListFilter {
                    wallet_id: filter.wallet_id,
                    from,
                    to,
                    limit: None,
                },
            )
            .await?;

        let wallets: HashMap<Uuid, String> = self
            .list_wallets(user_id)
            .await?
            .into_iter()
            .map(|w| (w.id, w.name))
            .collect();
        let categories: HashMap<Uuid, String> = self
            .list_categories(user_id)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let rows: Vec<Vec<Cell>> = transactions
            .iter()
            .map(|tx| export_row(tx, &wallets, &categories))
            .collect();
        sheet::write(format, &EXPORT_COLUMNS, &rows)
    }
}
