use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::{
    Engine, MoneyCents, NewTransactionCmd, ResultEngine, TransactionKind,
    util::{category_key, wallet_key},
};

use super::{
    ImportReport, SheetFormat,
    sheet::{self, Cell, excel_serial_to_datetime},
};

const REQUIRED_COLUMNS: [&str; 6] = ["Type", "Amount", "Description", "Category", "Wallet", "Date"];

/// Header name → column index, matched case-insensitively.
struct Columns(HashMap<String, usize>);

impl Columns {
    fn new(header: &[Cell]) -> Self {
        Self(
            header
                .iter()
                .enumerate()
                .filter(|(_, cell)| !cell.is_empty())
                .map(|(idx, cell)| (cell.to_string().to_ascii_lowercase(), idx))
                .collect(),
        )
    }

    fn get<'r>(&self, row: &'r [Cell], name: &str) -> Option<&'r Cell> {
        let idx = self.0.get(&name.to_ascii_lowercase())?;
        row.get(*idx).filter(|cell| !cell.is_empty())
    }
}

/// What rows may refer to: wallet keys and category keys.
struct Lookup {
    wallets: HashMap<String, Uuid>,
    categories: HashMap<String, Uuid>,
}

impl Lookup {
    fn wallet(&self, name: &str) -> Option<Uuid> {
        self.wallets.get(&wallet_key(name)).copied()
    }

    fn category(&self, name: &str) -> Option<Uuid> {
        category_key(name).and_then(|key| self.categories.get(&key).copied())
    }
}

/// Number cells follow the text rules: at most two decimals, within the
/// per-transaction cap.
fn parse_amount(cell: &Cell) -> Option<MoneyCents> {
    let amount = match cell {
        Cell::Number(n) => {
            let cents = n * 100.0;
            if !cents.is_finite()
                || cents.abs() > MoneyCents::MAX_TRANSACTION.cents() as f64
                || (cents - cents.round()).abs() > 1e-6
            {
                return None;
            }
            MoneyCents::new(cents.round() as i64)
        }
        Cell::Text(s) => s.trim().parse::<MoneyCents>().ok()?,
        _ => return None,
    };
    amount.ensure_transaction_amount().ok()
}

fn parse_date(cell: &Cell) -> Option<DateTime<Utc>> {
    match cell {
        Cell::Number(serial) | Cell::Date(serial) => excel_serial_to_datetime(*serial),
        Cell::Text(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(naive.and_utc());
            }
            ["%Y-%m-%d", "%Y/%m/%d"].iter().find_map(|fmt| {
                NaiveDate::parse_from_str(s, fmt)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc())
            })
        }
        Cell::Empty => None,
    }
}

/// Validate one data row and turn it into a create command.
///
/// The error is the row's reason, without the `"Row N: "` prefix.
fn parse_row(
    user_id: Uuid,
    columns: &Columns,
    row: &[Cell],
    lookup: &Lookup,
) -> Result<NewTransactionCmd, String> {
    let fields: Option<Vec<&Cell>> = REQUIRED_COLUMNS
        .iter()
        .map(|name| columns.get(row, name))
        .collect();
    let Some([kind, amount, description, category, wallet, date]) =
        fields.and_then(|f| <[&Cell; 6]>::try_from(f).ok())
    else {
        return Err("Missing required fields".to_string());
    };

    let wallet_id = lookup
        .wallet(&wallet.to_string())
        .ok_or_else(|| format!("Wallet \"{wallet}\" not found"))?;
    let category_id = lookup
        .category(&category.to_string())
        .ok_or_else(|| format!("Category \"{category}\" not found"))?;
    let kind = TransactionKind::try_from(kind.to_string().as_str())
        .map_err(|_| format!("Invalid transaction type \"{kind}\""))?;
    let amount = parse_amount(amount).ok_or_else(|| format!("Invalid amount \"{amount}\""))?;
    let occurred_at = parse_date(date).ok_or_else(|| format!("Invalid date \"{date}\""))?;

    let mut cmd = NewTransactionCmd::new(user_id, kind, amount, description.to_string(), occurred_at)
        .wallet_id(wallet_id)
        .category_id(category_id);

    if kind == TransactionKind::Transfer {
        let destination = columns
            .get(row, "DestinationWallet")
            .ok_or_else(|| "Missing destination wallet for transfer".to_string())?;
        let destination_id = lookup
            .wallet(&destination.to_string())
            .ok_or_else(|| format!("Destination wallet \"{destination}\" not found"))?;
        if destination_id == wallet_id {
            return Err("Source and destination wallets cannot be the same".to_string());
        }
        cmd = cmd.destination_wallet_id(destination_id);
    }

    Ok(cmd)
}

impl Engine {
    /// Create transactions from an uploaded spreadsheet.
    ///
    /// The first row of the first sheet is the header; blank rows are skipped
    /// and do not count toward row numbers. Each valid row is created on its
    /// own, so one bad row never blocks the others. A file that cannot be
    /// read at all yields a failed report instead of an error.
    pub async fn import_transactions(
        &self,
        user_id: Uuid,
        bytes: &[u8],
        format: SheetFormat,
    ) -> ResultEngine<ImportReport> {
        let rows = match sheet::read(format, bytes) {
            Ok(rows) => rows,
            Err(err) => return Ok(ImportReport::failed(err.to_string())),
        };
        let mut rows = rows
            .into_iter()
            .filter(|row| !row.iter().all(Cell::is_empty));
        let Some(header) = rows.next() else {
            return Ok(ImportReport::failed("the file contains no rows"));
        };
        let columns = Columns::new(&header);

        let lookup = Lookup {
            wallets: self
                .list_wallets(user_id)
                .await?
                .into_iter()
                .map(|w| (wallet_key(&w.name), w.id))
                .collect(),
            categories: self
                .list_categories(user_id)
                .await?
                .into_iter()
                .filter_map(|c| category_key(&c.name).map(|key| (key, c.id)))
                .collect(),
        };

        let mut report = ImportReport::default();
        for (idx, row) in rows.enumerate() {
            let row_number = idx + 1;
            let cmd = match parse_row(user_id, &columns, &row, &lookup) {
                Ok(cmd) => cmd,
                Err(reason) => {
                    report.errors.push(format!("Row {row_number}: {reason}"));
                    continue;
                }
            };
            match self.create_transaction(cmd).await {
                Ok(_) => report.imported += 1,
                Err(err) => report.errors.push(format!("Row {row_number}: {err}")),
            }
        }
        report.success = report.imported > 0;
        Ok(report)
    }
}
