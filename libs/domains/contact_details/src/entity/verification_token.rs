use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "email_verification_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_contact_details_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub email_address: String,
    pub expiration_date: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contact_details::Entity",
        from = "Column::UserContactDetailsId",
        to = "super::contact_details::Column::ReferenceDataUserId"
    )]
    ContactDetails,
}

impl Related<super::contact_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContactDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::EmailVerificationToken {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            contact_details_id: model.user_contact_details_id,
            email_address: model.email_address,
            expiration_date: model.expiration_date.into(),
        }
    }
}

impl From<&crate::models::EmailVerificationToken> for ActiveModel {
    fn from(token: &crate::models::EmailVerificationToken) -> Self {
        ActiveModel {
            id: Set(token.id),
            user_contact_details_id: Set(token.contact_details_id),
            email_address: Set(token.email_address.clone()),
            expiration_date: Set(token.expiration_date.into()),
            created_at: Set(chrono::Utc::now().into()),
        }
    }
}
