use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cattle::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cattle::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cattle::TagNumber).string().not_null().unique_key())
                    .col(ColumnDef::new(Cattle::Name).string().null())
                    .col(ColumnDef::new(Cattle::Breed).string().null())
                    .col(ColumnDef::new(Cattle::Sex).string().not_null())
                    .col(ColumnDef::new(Cattle::BirthDate).string().null())
                    .col(ColumnDef::new(Cattle::StatusCategory).string().null())
                    .col(ColumnDef::new(Cattle::Status).string().null())
                    .col(ColumnDef::new(Cattle::RecordedBy).string().null())
                    .col(ColumnDef::new(Cattle::Remark).string().null())
                    .col(ColumnDef::new(Cattle::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Cattle::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Cattle::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BreedingRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BreedingRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BreedingRecords::CattleId).integer().not_null())
                    .col(ColumnDef::new(BreedingRecords::Method).string().not_null())
                    .col(ColumnDef::new(BreedingRecords::SemenType).string().null())
                    .col(ColumnDef::new(BreedingRecords::SemenPrice).double().null())
                    .col(ColumnDef::new(BreedingRecords::SemenBatchNumber).string().null())
                    .col(ColumnDef::new(BreedingRecords::SireName).string().null())
                    .col(ColumnDef::new(BreedingRecords::BreedingDate).string().not_null())
                    .col(ColumnDef::new(BreedingRecords::BreedingAttemptNumber).integer().not_null())
                    .col(ColumnDef::new(BreedingRecords::Notes).string().null())
                    .col(ColumnDef::new(BreedingRecords::SteamingDate).string().not_null())
                    .col(ColumnDef::new(BreedingRecords::PregnancyCheckDate).string().not_null())
                    .col(ColumnDef::new(BreedingRecords::PregnancyTestResult).string().null())
                    .col(ColumnDef::new(BreedingRecords::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_breeding_records_cattle_id")
                            .from(BreedingRecords::Table, BreedingRecords::CattleId)
                            .to(Cattle::Table, Cattle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_breeding_records_cattle_date")
                    .table(BreedingRecords::Table)
                    .col(BreedingRecords::CattleId)
                    .col(BreedingRecords::BreedingDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Calving::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Calving::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Calving::DamId).integer().not_null())
                    .col(ColumnDef::new(Calving::DamTagNumber).string().not_null())
                    .col(ColumnDef::new(Calving::DamName).string().null())
                    .col(ColumnDef::new(Calving::CalfId).integer().null())
                    .col(ColumnDef::new(Calving::CalfName).string().null())
                    .col(ColumnDef::new(Calving::CalfSex).string().not_null())
                    .col(ColumnDef::new(Calving::BirthDate).string().not_null())
                    .col(ColumnDef::new(Calving::Breed).string().null())
                    .col(ColumnDef::new(Calving::CalfCondition).string().null())
                    .col(ColumnDef::new(Calving::Notes).string().null())
                    .col(ColumnDef::new(Calving::RecordedBy).string().null())
                    .col(ColumnDef::new(Calving::Remark).string().null())
                    .col(ColumnDef::new(Calving::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Calving::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Calving::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_calving_dam_id")
                            .from(Calving::Table, Calving::DamId)
                            .to(Cattle::Table, Cattle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_calving_dam_tag_birth_date")
                    .table(Calving::Table)
                    .col(Calving::DamTagNumber)
                    .col(Calving::BirthDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Calving::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(BreedingRecords::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Cattle::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Cattle {
    Table,
    Id,
    TagNumber,
    Name,
    Breed,
    Sex,
    BirthDate,
    StatusCategory,
    Status,
    RecordedBy,
    Remark,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BreedingRecords {
    Table,
    Id,
    CattleId,
    Method,
    SemenType,
    SemenPrice,
    SemenBatchNumber,
    SireName,
    BreedingDate,
    BreedingAttemptNumber,
    Notes,
    SteamingDate,
    PregnancyCheckDate,
    PregnancyTestResult,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Calving {
    Table,
    Id,
    DamId,
    DamTagNumber,
    DamName,
    CalfId,
    CalfName,
    CalfSex,
    BirthDate,
    Breed,
    CalfCondition,
    Notes,
    RecordedBy,
    Remark,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
