//! Category registry per user.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CategoryIcon;

/// A user-defined label (name + icon) classifying a transaction's purpose.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub icon: CategoryIcon,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub name_norm: String,
    pub icon: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Category {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            icon: CategoryIcon::resolve(&model.icon),
        }
    }
}

pub(crate) fn active_model(category: &Category, name_norm: String) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::Set(category.id),
        user_id: ActiveValue::Set(category.user_id),
        name: ActiveValue::Set(category.name.clone()),
        name_norm: ActiveValue::Set(name_norm),
        icon: ActiveValue::Set(category.icon.as_str().to_string()),
    }
}
