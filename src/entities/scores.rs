use sea_orm::entity::prelude::*;

/// Status every new score starts with.
pub const STATUS_NOT_PASSED: &str = "BELUM LULUS";

/// Applicant scores ("nilai").
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "nilai")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub datapokok_id: i32,

    pub bahasa_indonesia: f64,

    pub ilmu_pengetahuan_alam: f64,

    pub matematika: f64,

    pub test_membaca_al_quran: f64,

    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::applicants::Entity",
        from = "Column::DatapokokId",
        to = "super::applicants::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Applicant,
}

impl Related<super::applicants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applicant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
