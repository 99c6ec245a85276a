use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_contact_details")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub reference_data_user_id: Uuid,
    #[sea_orm(column_type = "Text", nullable, unique)]
    pub email: Option<String>,
    pub email_verified: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub phone_number: Option<String>,
    pub allow_notify: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::verification_token::Entity")]
    VerificationToken,
}

impl Related<super::verification_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VerificationToken.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::ContactDetails {
    fn from(model: Model) -> Self {
        Self {
            reference_data_user_id: model.reference_data_user_id,
            phone_number: model.phone_number,
            allow_notify: model.allow_notify,
            email: model.email,
            email_verified: model.email_verified,
        }
    }
}

/// `created_at` is left to the column default.
impl From<&crate::models::ContactDetails> for ActiveModel {
    fn from(details: &crate::models::ContactDetails) -> Self {
        ActiveModel {
            reference_data_user_id: Set(details.reference_data_user_id),
            email: Set(details.email.clone()),
            email_verified: Set(details.email_verified),
            phone_number: Set(details.phone_number.clone()),
            allow_notify: Set(details.allow_notify),
            created_at: NotSet,
            updated_at: Set(chrono::Utc::now().into()),
        }
    }
}
