use api_types::dashboard::{CategoryTotalView, DashboardQuery, DashboardView, MonthlyTotalView};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use engine::{DashboardFilter, User};

use crate::{
    ServerError, params, server::ServerState, transactions::transaction_view,
};

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardView>, ServerError> {
    let filter = DashboardFilter {
        wallet_id: params::wallet_filter(query.wallet_id.as_deref())?,
        month: params::month_filter(query.month.as_deref())?,
        year: query.year.unwrap_or_else(params::current_year),
    };
    let dashboard = state.engine.dashboard(user.id, &filter).await?;

    Ok(Json(DashboardView {
        total_income: dashboard.total_income.to_string(),
        total_expenses: dashboard.total_expenses.to_string(),
        balance: dashboard.balance.to_string(),
        category_expenses: dashboard
            .category_expenses
            .into_iter()
            .map(|c| CategoryTotalView {
                category_id: c.category_id,
                name: c.name,
                icon: c.icon.as_str().to_string(),
                total: c.total.to_string(),
            })
            .collect(),
        monthly: dashboard
            .monthly
            .into_iter()
            .map(|m| MonthlyTotalView {
                month: m.month,
                income: m.income.to_string(),
                expenses: m.expenses.to_string(),
            })
            .collect(),
        recent: dashboard.recent.into_iter().map(transaction_view).collect(),
        years: dashboard.years,
    }))
}
