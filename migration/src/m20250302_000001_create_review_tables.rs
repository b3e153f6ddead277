use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 评审汇总表 ====================
        // 每个提交恰好一条，计数器通过 version 做乐观并发控制
        manager
            .create_table(
                Table::create()
                    .table(ReviewSummaries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReviewSummaries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ReviewSummaries::SubmissionKey)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ReviewSummaries::UnitId).string().not_null())
                    .col(
                        ColumnDef::new(ReviewSummaries::AssignedCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ReviewSummaries::CompletedCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ReviewSummaries::ExpiredCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ReviewSummaries::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ReviewSummaries::CreateDate)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReviewSummaries::ChangeDate)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 评审步骤表 ====================
        manager
            .create_table(
                Table::create()
                    .table(ReviewSteps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReviewSteps::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ReviewSteps::AssignerKind).string().not_null())
                    .col(ColumnDef::new(ReviewSteps::SubmissionKey).string().not_null())
                    .col(ColumnDef::new(ReviewSteps::UnitId).string().not_null())
                    .col(ColumnDef::new(ReviewSteps::State).string().not_null())
                    .col(
                        ColumnDef::new(ReviewSteps::Removed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ReviewSteps::ReviewKey).string().null())
                    .col(
                        ColumnDef::new(ReviewSteps::ReviewSummaryKey)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReviewSteps::RevieweeKey).string().not_null())
                    .col(ColumnDef::new(ReviewSteps::ReviewerKey).string().not_null())
                    .col(
                        ColumnDef::new(ReviewSteps::CreateDate)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReviewSteps::ChangeDate)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 默认查询都会带上 removed 条件
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_review_steps_submission_removed")
                    .table(ReviewSteps::Table)
                    .col(ReviewSteps::SubmissionKey)
                    .col(ReviewSteps::Removed)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_review_steps_reviewer_submission")
                    .table(ReviewSteps::Table)
                    .col(ReviewSteps::ReviewerKey)
                    .col(ReviewSteps::SubmissionKey)
                    .to_owned(),
            )
            .await?;

        // 批量过期查询：unit + state + assigner_kind
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_review_steps_unit_state_kind")
                    .table(ReviewSteps::Table)
                    .col(ReviewSteps::UnitId)
                    .col(ReviewSteps::State)
                    .col(ReviewSteps::AssignerKind)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_review_steps_reviewee_key")
                    .table(ReviewSteps::Table)
                    .col(ReviewSteps::RevieweeKey)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReviewSteps::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ReviewSummaries::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum ReviewSummaries {
    #[sea_orm(iden = "review_summaries")]
    Table,
    Id,
    SubmissionKey,
    UnitId,
    AssignedCount,
    CompletedCount,
    ExpiredCount,
    Version,
    CreateDate,
    ChangeDate,
}

#[derive(DeriveIden)]
enum ReviewSteps {
    #[sea_orm(iden = "review_steps")]
    Table,
    Id,
    AssignerKind,
    SubmissionKey,
    UnitId,
    State,
    Removed,
    ReviewKey,
    ReviewSummaryKey,
    RevieweeKey,
    ReviewerKey,
    CreateDate,
    ChangeDate,
}
