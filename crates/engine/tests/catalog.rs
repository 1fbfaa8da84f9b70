use chrono::{Datelike, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    CategoryIcon, DEFAULT_CATEGORIES, DashboardFilter, Engine, EngineError, KeywordSuggester,
    MoneyCents, NewCategoryCmd, NewTransactionCmd, TransactionKind, UpdateCategoryCmd,
    verify_password,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn insert_user(db: &DatabaseConnection, email: &str) -> Uuid {
    let id = Uuid::new_v4();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        vec![id.into(), email.into(), "unused".into(), Utc::now().into()],
    ))
    .await
    .unwrap();
    id
}

#[tokio::test]
async fn register_normalizes_email_and_rejects_duplicates() {
    let (engine, _db) = engine_with_db().await;

    let user = engine
        .register_user("  Alice@Example.COM ", "correct horse")
        .await
        .unwrap();
    assert_eq!(user.email, "alice@example.com");

    let (found, hash) = engine.user_credentials("ALICE@example.com").await.unwrap();
    assert_eq!(found, user);
    assert!(verify_password("correct horse", &hash));
    assert!(!verify_password("wrong horse", &hash));
    assert_eq!(engine.user(user.id).await.unwrap(), user);

    let err = engine
        .register_user("alice@example.com", "another password")
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    assert!(
        engine
            .register_user("not-an-email", "correct horse")
            .await
            .unwrap_err()
            .is_validation()
    );
    assert!(
        engine
            .register_user("bob@example.com", "short")
            .await
            .unwrap_err()
            .is_validation()
    );
    assert!(matches!(
        engine.user_by_email("nobody@example.com").await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
}

#[tokio::test]
async fn wallet_names_are_unique_per_user_ignoring_case() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice@example.com").await;
    let bob = insert_user(&db, "bob@example.com").await;

    let cash = engine.create_wallet(alice, "  Cash ").await.unwrap();
    assert_eq!(cash.name, "Cash");

    let err = engine.create_wallet(alice, "cash").await.unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("cash".to_string()));
    engine.create_wallet(bob, "Cash").await.unwrap();

    let bank = engine.create_wallet(alice, "Bank").await.unwrap();
    assert!(engine.rename_wallet(alice, bank.id, "CASH").await.unwrap_err().is_conflict());
    let renamed = engine.rename_wallet(alice, bank.id, "Savings").await.unwrap();
    assert_eq!(renamed.name, "Savings");

    let names: Vec<_> = engine
        .list_wallets(alice)
        .await
        .unwrap()
        .into_iter()
        .map(|w| w.name)
        .collect();
    assert_eq!(names, ["Cash", "Savings"]);

    assert!(engine.create_wallet(alice, "   ").await.unwrap_err().is_validation());
    assert!(matches!(
        engine.wallet(bob, cash.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
}

#[tokio::test]
async fn wallet_names_ignore_non_ascii_case() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice@example.com").await;

    let savings = engine.create_wallet(alice, "Épargne").await.unwrap();
    let err = engine.create_wallet(alice, "épargne").await.unwrap_err();
    assert!(err.is_conflict());

    engine.create_wallet(alice, "Epargne").await.unwrap();
    let other = engine.create_wallet(alice, "Straße").await.unwrap();
    assert!(
        engine
            .rename_wallet(alice, other.id, "ÉPARGNE")
            .await
            .unwrap_err()
            .is_conflict()
    );
    let renamed = engine.rename_wallet(alice, savings.id, "ÉPARGNE").await.unwrap();
    assert_eq!(renamed.name, "ÉPARGNE");
    assert_eq!(engine.list_wallets(alice).await.unwrap().len(), 3);
}

#[tokio::test]
async fn wallet_delete_is_blocked_while_referenced() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice@example.com").await;
    let cash = engine.create_wallet(alice, "Cash").await.unwrap();
    let bank = engine.create_wallet(alice, "Bank").await.unwrap();
    let empty = engine.create_wallet(alice, "Empty").await.unwrap();
    let other = engine
        .create_category(NewCategoryCmd::new(alice, "Other"))
        .await
        .unwrap();

    let rows = engine
        .create_transaction(
            NewTransactionCmd::new(
                alice,
                TransactionKind::Transfer,
                MoneyCents::new(100),
                "",
                Utc::now(),
            )
            .wallet_id(bank.id)
            .category_id(other.id)
            .destination_wallet_id(cash.id),
        )
        .await
        .unwrap();

    let err = engine.delete_wallet(alice, cash.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InUse(_)));
    let err = engine.delete_wallet(alice, bank.id).await.unwrap_err();
    assert!(err.is_conflict());

    engine.delete_wallet(alice, empty.id).await.unwrap();

    engine.delete_transaction(alice, rows[0].id).await.unwrap();
    engine.delete_wallet(alice, cash.id).await.unwrap();
    engine.delete_wallet(alice, bank.id).await.unwrap();
    assert!(engine.list_wallets(alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn categories_collide_on_normalized_name() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice@example.com").await;

    let cafe = engine
        .create_category(NewCategoryCmd::new(alice, "Café").icon(CategoryIcon::Food))
        .await
        .unwrap();
    assert_eq!(cafe.icon, CategoryIcon::Food);

    let err = engine
        .create_category(NewCategoryCmd::new(alice, "  CAFE "))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("Café".to_string()));
    assert!(
        engine
            .create_category(NewCategoryCmd::new(alice, "!!!"))
            .await
            .unwrap_err()
            .is_validation()
    );

    let rent = engine
        .create_category(NewCategoryCmd::new(alice, "Rent"))
        .await
        .unwrap();
    assert_eq!(rent.icon, CategoryIcon::Other);

    let err = engine
        .update_category(UpdateCategoryCmd::new(alice, rent.id).name("cafe"))
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    let updated = engine
        .update_category(
            UpdateCategoryCmd::new(alice, rent.id)
                .name("Housing")
                .icon(CategoryIcon::Housing),
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Housing");
    assert_eq!(updated.icon, CategoryIcon::Housing);
    assert_eq!(engine.category(alice, rent.id).await.unwrap(), updated);

    let renamed_same = engine
        .update_category(UpdateCategoryCmd::new(alice, cafe.id).name("cafe"))
        .await
        .unwrap();
    assert_eq!(renamed_same.name, "cafe");
}

#[tokio::test]
async fn category_delete_is_blocked_while_referenced() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice@example.com").await;
    let cash = engine.create_wallet(alice, "Cash").await.unwrap();
    let food = engine
        .create_category(NewCategoryCmd::new(alice, "Food"))
        .await
        .unwrap();
    let unused = engine
        .create_category(NewCategoryCmd::new(alice, "Unused"))
        .await
        .unwrap();

    let tx = engine
        .create_transaction(
            NewTransactionCmd::new(
                alice,
                TransactionKind::Expense,
                MoneyCents::new(450),
                "Bakery",
                Utc::now(),
            )
            .wallet_id(cash.id)
            .category_id(food.id),
        )
        .await
        .unwrap()
        .remove(0);

    let err = engine.delete_category(alice, food.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InUse(_)));

    engine.delete_category(alice, unused.id).await.unwrap();
    engine.delete_transaction(alice, tx.id).await.unwrap();
    engine.delete_category(alice, food.id).await.unwrap();
    assert!(engine.list_categories(alice).await.unwrap().is_empty());

    assert!(matches!(
        engine.delete_category(alice, food.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
}

#[tokio::test]
async fn register_with_defaults_is_all_or_nothing() {
    let (engine, db) = engine_with_db().await;

    let (alice, seeded) = engine
        .register_user_with_defaults("alice@example.com", "correct horse")
        .await
        .unwrap();
    assert_eq!(seeded.len(), DEFAULT_CATEGORIES.len());
    assert_eq!(
        engine.list_categories(alice.id).await.unwrap().len(),
        DEFAULT_CATEGORIES.len()
    );

    db.execute_unprepared(
        "CREATE TRIGGER reject_categories BEFORE INSERT ON categories \
         BEGIN SELECT RAISE(ABORT, 'categories rejected'); END;",
    )
    .await
    .unwrap();
    let err = engine
        .register_user_with_defaults("bob@example.com", "correct horse")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Database(_)));
    assert!(matches!(
        engine.user_by_email("bob@example.com").await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));

    db.execute_unprepared("DROP TRIGGER reject_categories;")
        .await
        .unwrap();
    let (bob, _) = engine
        .register_user_with_defaults("bob@example.com", "correct horse")
        .await
        .unwrap();
    assert_eq!(bob.email, "bob@example.com");
}

#[tokio::test]
async fn seeding_defaults_is_idempotent() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice@example.com").await;
    engine
        .create_category(NewCategoryCmd::new(alice, "food"))
        .await
        .unwrap();

    let first = engine.seed_default_categories(alice).await.unwrap();
    assert_eq!(first.len(), DEFAULT_CATEGORIES.len() - 1);
    assert!(first.iter().all(|c| c.name != "Food"));

    let second = engine.seed_default_categories(alice).await.unwrap();
    assert!(second.is_empty());
    assert_eq!(
        engine.list_categories(alice).await.unwrap().len(),
        DEFAULT_CATEGORIES.len()
    );
}

#[tokio::test]
async fn suggestion_picks_among_the_users_categories() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice@example.com").await;
    engine.seed_default_categories(alice).await.unwrap();

    let suggestion = engine
        .suggest_category(alice, "Dinner at the restaurant", &KeywordSuggester)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(suggestion.name, "Food");
    assert!((0.0..=1.0).contains(&suggestion.confidence));

    assert!(
        engine
            .suggest_category(alice, "  ", &KeywordSuggester)
            .await
            .unwrap_err()
            .is_validation()
    );
}

#[tokio::test]
async fn dashboard_reads_the_store() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice@example.com").await;
    let cash = engine.create_wallet(alice, "Cash").await.unwrap();
    let cats = engine.seed_default_categories(alice).await.unwrap();
    let salary = cats.iter().find(|c| c.name == "Salary").unwrap();
    let food = cats.iter().find(|c| c.name == "Food").unwrap();

    for (kind, cents, category) in [
        (TransactionKind::Income, 500_000, salary),
        (TransactionKind::Expense, 12_000, food),
    ] {
        engine
            .create_transaction(
                NewTransactionCmd::new(
                    alice,
                    kind,
                    MoneyCents::new(cents),
                    "row",
                    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
                )
                .wallet_id(cash.id)
                .category_id(category.id),
            )
            .await
            .unwrap();
    }

    let dash = engine
        .dashboard(alice, &DashboardFilter::for_year(2024))
        .await
        .unwrap();
    assert_eq!(dash.balance, MoneyCents::new(488_000));
    assert_eq!(dash.category_expenses.len(), 1);
    assert_eq!(dash.category_expenses[0].name, "Food");
    assert_eq!(dash.monthly[5].income, MoneyCents::new(500_000));
    assert_eq!(dash.years, vec![2024]);
    assert_eq!(dash.recent.len(), 2);

    let other_year = engine
        .dashboard(alice, &DashboardFilter::for_year(Utc::now().year() + 1))
        .await
        .unwrap();
    assert_eq!(other_year.total_income, MoneyCents::ZERO);
}
