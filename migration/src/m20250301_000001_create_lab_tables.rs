use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 实验表 ====================
        manager
            .create_table(
                Table::create()
                    .table(Labs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Labs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Labs::CourseId).big_integer().not_null())
                    .col(ColumnDef::new(Labs::Title).string().not_null())
                    .col(ColumnDef::new(Labs::Description).text().null())
                    .col(
                        ColumnDef::new(Labs::IsPublished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Labs::DurationMinutes).integer().null())
                    .col(ColumnDef::new(Labs::MaxAttempts).integer().null())
                    .col(ColumnDef::new(Labs::CreatedBy).big_integer().not_null())
                    .col(ColumnDef::new(Labs::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Labs::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Labs::Table, Labs::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Labs::Table, Labs::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 评分细则表 ====================
        manager
            .create_table(
                Table::create()
                    .table(LabRubricCriteria::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LabRubricCriteria::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LabRubricCriteria::LabId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LabRubricCriteria::CriterionName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LabRubricCriteria::CriterionDescription)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(LabRubricCriteria::MaxPoints)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LabRubricCriteria::OrderIndex)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LabRubricCriteria::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LabRubricCriteria::Table, LabRubricCriteria::LabId)
                            .to(Labs::Table, Labs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 实验成绩表 ====================
        manager
            .create_table(
                Table::create()
                    .table(LabScores::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LabScores::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LabScores::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(LabScores::LabId).big_integer().not_null())
                    .col(
                        ColumnDef::new(LabScores::ManualScore)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(LabScores::RubricBreakdown).text().null())
                    .col(ColumnDef::new(LabScores::GradedBy).big_integer().null())
                    .col(ColumnDef::new(LabScores::GradedAt).big_integer().null())
                    .col(ColumnDef::new(LabScores::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(LabScores::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(LabScores::Table, LabScores::LabId)
                            .to(Labs::Table, Labs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LabScores::Table, LabScores::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 评分批注表 ====================
        manager
            .create_table(
                Table::create()
                    .table(LabScoreAnnotations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LabScoreAnnotations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LabScoreAnnotations::ScoreId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LabScoreAnnotations::CriterionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LabScoreAnnotations::PointsAwarded)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LabScoreAnnotations::TeacherComment)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LabScoreAnnotations::AnnotationType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LabScoreAnnotations::CreatedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LabScoreAnnotations::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LabScoreAnnotations::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LabScoreAnnotations::Table, LabScoreAnnotations::ScoreId)
                            .to(LabScores::Table, LabScores::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                LabScoreAnnotations::Table,
                                LabScoreAnnotations::CriterionId,
                            )
                            .to(LabRubricCriteria::Table, LabRubricCriteria::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 实验会话表 ====================
        manager
            .create_table(
                Table::create()
                    .table(LabSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LabSessions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LabSessions::LabId).big_integer().not_null())
                    .col(
                        ColumnDef::new(LabSessions::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LabSessions::Status).string().not_null())
                    .col(
                        ColumnDef::new(LabSessions::StartTime)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LabSessions::EndTime).big_integer().null())
                    .col(ColumnDef::new(LabSessions::ResumedAt).big_integer().null())
                    .col(
                        ColumnDef::new(LabSessions::DurationMinutes)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(LabSessions::ElapsedSeconds)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LabSessions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LabSessions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LabSessions::Table, LabSessions::LabId)
                            .to(Labs::Table, Labs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LabSessions::Table, LabSessions::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 实验作答表 ====================
        manager
            .create_table(
                Table::create()
                    .table(LabSubmissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LabSubmissions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LabSubmissions::SessionId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(LabSubmissions::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LabSubmissions::Responses).text().null())
                    .col(ColumnDef::new(LabSubmissions::AutosaveData).text().null())
                    .col(
                        ColumnDef::new(LabSubmissions::SubmittedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(LabSubmissions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LabSubmissions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LabSubmissions::Table, LabSubmissions::SessionId)
                            .to(LabSessions::Table, LabSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 索引 ====================
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_labs_course_id")
                    .table(Labs::Table)
                    .col(Labs::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lab_rubric_criteria_lab_id")
                    .table(LabRubricCriteria::Table)
                    .col(LabRubricCriteria::LabId)
                    .to_owned(),
            )
            .await?;

        // 每个学生每个实验只有一条成绩
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_lab_scores_student_lab")
                    .table(LabScores::Table)
                    .col(LabScores::StudentId)
                    .col(LabScores::LabId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 每条成绩每个细则只有一条批注
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_lab_score_annotations_score_criterion")
                    .table(LabScoreAnnotations::Table)
                    .col(LabScoreAnnotations::ScoreId)
                    .col(LabScoreAnnotations::CriterionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lab_sessions_lab_student_status")
                    .table(LabSessions::Table)
                    .col(LabSessions::LabId)
                    .col(LabSessions::StudentId)
                    .col(LabSessions::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LabSubmissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LabSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LabScoreAnnotations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LabScores::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LabRubricCriteria::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Labs::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Labs {
    Table,
    Id,
    CourseId,
    Title,
    Description,
    IsPublished,
    DurationMinutes,
    MaxAttempts,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LabRubricCriteria {
    #[sea_orm(iden = "lab_rubric_criteria")]
    Table,
    Id,
    LabId,
    CriterionName,
    CriterionDescription,
    MaxPoints,
    OrderIndex,
    CreatedAt,
}

#[derive(DeriveIden)]
enum LabScores {
    Table,
    Id,
    StudentId,
    LabId,
    ManualScore,
    RubricBreakdown,
    GradedBy,
    GradedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LabScoreAnnotations {
    Table,
    Id,
    ScoreId,
    CriterionId,
    PointsAwarded,
    TeacherComment,
    AnnotationType,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LabSessions {
    Table,
    Id,
    LabId,
    StudentId,
    Status,
    StartTime,
    EndTime,
    ResumedAt,
    DurationMinutes,
    ElapsedSeconds,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LabSubmissions {
    Table,
    Id,
    SessionId,
    StudentId,
    Responses,
    AutosaveData,
    SubmittedAt,
    CreatedAt,
    UpdatedAt,
}
