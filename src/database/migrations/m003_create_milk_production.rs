use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MilkProduction::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MilkProduction::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MilkProduction::CattleId).integer().not_null())
                    .col(ColumnDef::new(MilkProduction::Date).string().not_null())
                    .col(ColumnDef::new(MilkProduction::MorningMilk).double().null())
                    .col(ColumnDef::new(MilkProduction::MidDayMilk).double().null())
                    .col(ColumnDef::new(MilkProduction::EveningMilk).double().null())
                    .col(ColumnDef::new(MilkProduction::Notes).string().null())
                    .col(ColumnDef::new(MilkProduction::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(MilkProduction::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_milk_production_cattle_id")
                            .from(MilkProduction::Table, MilkProduction::CattleId)
                            .to(Cattle::Table, Cattle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .name("idx_milk_production_cattle_date")
                            .col(MilkProduction::CattleId)
                            .col(MilkProduction::Date)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MilkProduction::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MilkProduction {
    Table,
    Id,
    CattleId,
    Date,
    MorningMilk,
    MidDayMilk,
    EveningMilk,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Cattle {
    Table,
    Id,
}
