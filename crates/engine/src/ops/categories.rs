use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Category, CategoryIcon, CategorySuggester, CategorySuggestion, EngineError, NewCategoryCmd,
    ResultEngine, UpdateCategoryCmd, categories, transactions,
    util::{normalize_required_name, require_category_key},
};

use super::{Engine, with_tx};

/// Categories every new account starts with.
pub const DEFAULT_CATEGORIES: &[(&str, CategoryIcon)] = &[
    ("Food", CategoryIcon::Food),
    ("Transport", CategoryIcon::Transport),
    ("Shopping", CategoryIcon::Shopping),
    ("Housing", CategoryIcon::Housing),
    ("Entertainment", CategoryIcon::Entertainment),
    ("Health", CategoryIcon::Health),
    ("Education", CategoryIcon::Education),
    ("Salary", CategoryIcon::Salary),
    ("Other", CategoryIcon::Other),
];

impl Engine {
    /// Load a category owned by `user_id`; other users' categories behave as absent.
    pub(super) async fn require_category<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        category_id: Uuid,
    ) -> ResultEngine<categories::Model> {
        categories::Entity::find_by_id(category_id)
            .filter(categories::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
    }

    async fn ensure_category_name_free<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        name_norm: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .filter(categories::Column::NameNorm.eq(name_norm));
        if let Some(id) = except {
            query = query.filter(categories::Column::Id.ne(id));
        }
        if let Some(existing) = query.one(db).await? {
            return Err(EngineError::ExistingKey(existing.name));
        }
        Ok(())
    }

    /// Categories of a user, ordered by name.
    pub async fn list_categories(&self, user_id: Uuid) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    pub async fn category(&self, user_id: Uuid, category_id: Uuid) -> ResultEngine<Category> {
        let model = Self::require_category(&self.database, user_id, category_id).await?;
        Ok(Category::from(model))
    }

    /// Create a category.
    ///
    /// Names compare by their normalized key, so `"Café"` and `"cafe"`
    /// collide with [`EngineError::ExistingKey`].
    pub async fn create_category(&self, cmd: NewCategoryCmd) -> ResultEngine<Category> {
        let name = normalize_required_name(&cmd.name, "category")?;
        let name_norm = require_category_key(&name)?;
        with_tx!(self, |db_tx| {
            Self::ensure_category_name_free(&db_tx, cmd.user_id, &name_norm, None).await?;

            let category = Category {
                id: Uuid::new_v4(),
                user_id: cmd.user_id,
                name,
                icon: cmd.icon,
            };
            categories::active_model(&category, name_norm)
                .insert(&db_tx)
                .await?;
            Ok(category)
        })
    }

    pub async fn update_category(&self, cmd: UpdateCategoryCmd) -> ResultEngine<Category> {
        let name = cmd
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "category"))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let model = Self::require_category(&db_tx, cmd.user_id, cmd.category_id).await?;

            let mut active: categories::ActiveModel = model.into();
            if let Some(name) = name {
                let name_norm = require_category_key(&name)?;
                Self::ensure_category_name_free(
                    &db_tx,
                    cmd.user_id,
                    &name_norm,
                    Some(cmd.category_id),
                )
                .await?;
                active.name = ActiveValue::Set(name);
                active.name_norm = ActiveValue::Set(name_norm);
            }
            if let Some(icon) = cmd.icon {
                active.icon = ActiveValue::Set(icon.as_str().to_string());
            }
            let model = active.update(&db_tx).await?;
            Ok(Category::from(model))
        })
    }

    /// Delete a category.
    ///
    /// Refused with [`EngineError::InUse`] while any transaction references it.
    pub async fn delete_category(&self, user_id: Uuid, category_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let category = Self::require_category(&db_tx, user_id, category_id).await?;

            let referenced = transactions::Entity::find()
                .filter(transactions::Column::CategoryId.eq(category_id))
                .count(&db_tx)
                .await?;
            if referenced > 0 {
                return Err(EngineError::InUse(format!(
                    "category \"{}\" has {referenced} transactions",
                    category.name
                )));
            }

            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Insert the [`DEFAULT_CATEGORIES`] the user does not have yet.
    ///
    /// Idempotent: returns the categories actually inserted.
    pub async fn seed_default_categories(&self, user_id: Uuid) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            Self::insert_default_categories(&db_tx, user_id).await
        })
    }

    pub(super) async fn insert_default_categories<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> ResultEngine<Vec<Category>> {
        let mut inserted = Vec::new();
        for (name, icon) in DEFAULT_CATEGORIES {
            let name_norm = require_category_key(name)?;
            let exists = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id))
                .filter(categories::Column::NameNorm.eq(name_norm.clone()))
                .one(db)
                .await?
                .is_some();
            if exists {
                continue;
            }
            let category = Category {
                id: Uuid::new_v4(),
                user_id,
                name: (*name).to_string(),
                icon: *icon,
            };
            categories::active_model(&category, name_norm)
                .insert(db)
                .await?;
            inserted.push(category);
        }
        Ok(inserted)
    }

    /// Propose one of the user's categories for a free-text description.
    pub async fn suggest_category(
        &self,
        user_id: Uuid,
        description: &str,
        suggester: &dyn CategorySuggester,
    ) -> ResultEngine<Option<CategorySuggestion>> {
        if description.trim().is_empty() {
            return Err(EngineError::InvalidInput(
                "description must not be empty".to_string(),
            ));
        }
        let categories = self.list_categories(user_id).await?;
        Ok(suggester.suggest(description, &categories))
    }
}
