use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Category, EngineError, ResultEngine, User, password, users,
    util::normalize_email,
};

use super::{Engine, with_tx};

impl Engine {
    /// Register a new user.
    ///
    /// The email is stored trimmed and lowercased; duplicates are rejected
    /// with [`EngineError::ExistingKey`].
    pub async fn register_user(&self, email: &str, password: &str) -> ResultEngine<User> {
        let email = normalize_email(email)?;
        let password_hash = password::hash_password(password)?;
        with_tx!(self, |db_tx| {
            Self::insert_user(&db_tx, email, password_hash).await
        })
    }

    /// Register a new user together with the [`DEFAULT_CATEGORIES`].
    ///
    /// Both happen in one DB transaction: a failed seed leaves no user behind.
    ///
    /// [`DEFAULT_CATEGORIES`]: crate::DEFAULT_CATEGORIES
    pub async fn register_user_with_defaults(
        &self,
        email: &str,
        password: &str,
    ) -> ResultEngine<(User, Vec<Category>)> {
        let email = normalize_email(email)?;
        let password_hash = password::hash_password(password)?;
        with_tx!(self, |db_tx| {
            let user = Self::insert_user(&db_tx, email, password_hash).await?;
            let categories = Self::insert_default_categories(&db_tx, user.id).await?;
            Ok((user, categories))
        })
    }

    async fn insert_user<C: ConnectionTrait>(
        db: &C,
        email: String,
        password_hash: String,
    ) -> ResultEngine<User> {
        let exists = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(db)
            .await?
            .is_some();
        if exists {
            return Err(EngineError::ExistingKey(email));
        }

        let model = users::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            email: ActiveValue::Set(email),
            password_hash: ActiveValue::Set(password_hash),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(db)
        .await?;
        Ok(User::from(model))
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    pub async fn user_by_email(&self, email: &str) -> ResultEngine<User> {
        let (user, _) = self.user_credentials(email).await?;
        Ok(user)
    }

    /// Return the user together with the stored password hash.
    ///
    /// Verification is left to the caller so it can run off the async
    /// executor (see [`password::verify_password`]).
    pub async fn user_credentials(&self, email: &str) -> ResultEngine<(User, String)> {
        let email = email.trim().to_lowercase();
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        let hash = model.password_hash.clone();
        Ok((User::from(model), hash))
    }
}
