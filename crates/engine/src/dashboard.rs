//! Dashboard aggregation.
//!
//! Everything here is derived from a transaction list and the user's
//! categories; nothing is cached or persisted.

use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Category, CategoryIcon, Engine, EngineError, MoneyCents, ResultEngine, Transaction,
    TransactionKind, TransactionListFilter,
};

/// How many rows the recent-activity list carries.
pub const RECENT_LIMIT: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardFilter {
    pub wallet_id: Option<Uuid>,
    /// 1-based month; `None` covers the whole year.
    pub month: Option<u32>,
    pub year: i32,
}

impl DashboardFilter {
    pub fn for_year(year: i32) -> Self {
        Self {
            wallet_id: None,
            month: None,
            year,
        }
    }

    fn validate(&self) -> ResultEngine<()> {
        if let Some(month) = self.month
            && !(1..=12).contains(&month)
        {
            return Err(EngineError::InvalidInput(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        Ok(())
    }

    fn matches_wallet_and_year(&self, tx: &Transaction) -> bool {
        self.wallet_id.is_none_or(|id| tx.wallet_id == id) && tx.occurred_at.year() == self.year
    }

    fn matches(&self, tx: &Transaction) -> bool {
        self.matches_wallet_and_year(tx)
            && self.month.is_none_or(|month| tx.occurred_at.month() == month)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category_id: Uuid,
    pub name: String,
    pub icon: CategoryIcon,
    pub total: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// 1-based month.
    pub month: u32,
    pub income: MoneyCents,
    pub expenses: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub total_income: MoneyCents,
    pub total_expenses: MoneyCents,
    pub balance: MoneyCents,
    /// Expense totals per category, largest first.
    pub category_expenses: Vec<CategoryTotal>,
    /// Twelve entries for the selected year; ignores the month filter.
    pub monthly: Vec<MonthlyTotal>,
    pub recent: Vec<Transaction>,
    /// Years present in the data, newest first.
    pub years: Vec<i32>,
}

/// Aggregate `transactions` for `filter`.
///
/// Anything that is not income counts as expense.
pub fn compute(
    transactions: &[Transaction],
    categories: &[Category],
    filter: &DashboardFilter,
) -> ResultEngine<Dashboard> {
    filter.validate()?;

    let filtered: Vec<&Transaction> = transactions.iter().filter(|tx| filter.matches(tx)).collect();

    let mut total_income = MoneyCents::ZERO;
    let mut total_expenses = MoneyCents::ZERO;
    let mut per_category: HashMap<Uuid, MoneyCents> = HashMap::new();
    for tx in &filtered {
        if tx.kind == TransactionKind::Income {
            total_income.accumulate(tx.amount)?;
        } else {
            total_expenses.accumulate(tx.amount)?;
            per_category
                .entry(tx.category_id)
                .or_default()
                .accumulate(tx.amount)?;
        }
    }

    let by_id: HashMap<Uuid, &Category> = categories.iter().map(|c| (c.id, c)).collect();
    let mut category_expenses: Vec<CategoryTotal> = per_category
        .into_iter()
        .filter(|(_, total)| total.is_positive())
        .map(|(category_id, total)| {
            let (name, icon) = by_id
                .get(&category_id)
                .map_or(("Unknown".to_string(), CategoryIcon::Other), |c| {
                    (c.name.clone(), c.icon)
                });
            CategoryTotal {
                category_id,
                name,
                icon,
                total,
            }
        })
        .collect();
    category_expenses.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));

    let mut monthly: Vec<MonthlyTotal> = (1..=12)
        .map(|month| MonthlyTotal {
            month,
            income: MoneyCents::ZERO,
            expenses: MoneyCents::ZERO,
        })
        .collect();
    for tx in transactions.iter().filter(|tx| filter.matches_wallet_and_year(tx)) {
        let slot = &mut monthly[tx.occurred_at.month0() as usize];
        if tx.kind == TransactionKind::Income {
            slot.income.accumulate(tx.amount)?;
        } else {
            slot.expenses.accumulate(tx.amount)?;
        }
    }

    let mut recent: Vec<Transaction> = filtered.iter().map(|tx| (*tx).clone()).collect();
    recent.sort_by(|a, b| {
        b.occurred_at
            .cmp(&a.occurred_at)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    recent.truncate(RECENT_LIMIT);

    let mut years: Vec<i32> = transactions
        .iter()
        .map(|tx| tx.occurred_at.year())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect();
    if years.is_empty() {
        years.push(Utc::now().year());
    }

    Ok(Dashboard {
        total_income,
        total_expenses,
        balance: total_income.try_sub(total_expenses)?,
        category_expenses,
        monthly,
        recent,
        years,
    })
}

impl Engine {
    /// Load the user's data and aggregate it for `filter`.
    pub async fn dashboard(&self, user_id: Uuid, filter: &DashboardFilter) -> ResultEngine<Dashboard> {
        filter.validate()?;
        let transactions = self
            .list_transactions(user_id, &TransactionListFilter::default())
            .await?;
        let categories = self.list_categories(user_id).await?;
        compute(&transactions, &categories, filter)
    }
}
