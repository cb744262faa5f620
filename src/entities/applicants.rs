use sea_orm::entity::prelude::*;

/// Applicant core data ("datapokok").
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "datapokok")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub email: String,

    pub nama_lengkap: String,

    pub nisn: String,

    pub jenis_kelamin: String,

    pub tempat_lahir: String,

    /// Left empty when the submitted date does not parse.
    pub tanggal_lahir: Option<Date>,

    pub asal_sekolah: String,

    pub nama_ayah: String,

    pub no_wa_ayah: String,

    pub nama_ibu: String,

    pub no_wa_ibu: String,

    /// Public URL of the uploaded photo
    pub pas_foto: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "NoAction"
    )]
    User,

    #[sea_orm(has_many = "super::scores::Entity")]
    Scores,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::scores::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scores.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
