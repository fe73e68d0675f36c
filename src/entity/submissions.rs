//! 提交实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub assignment_id: String,
    pub student_id: String,
    pub student_name: String,
    pub attachment_url: String,
    pub submitted_at: i64,
    #[sea_orm(nullable)]
    pub grade: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub feedback: Option<String>,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignments::Entity",
        from = "Column::AssignmentId",
        to = "super::assignments::Column::Id"
    )]
    Assignment,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
}

impl Related<super::assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_submission(
        self,
    ) -> crate::errors::Result<crate::models::submissions::entities::Submission> {
        use crate::errors::ClassroomError;
        use crate::models::submissions::entities::{Submission, SubmissionStatus};
        use chrono::{DateTime, Utc};

        let status = self.status.parse::<SubmissionStatus>().map_err(|e| {
            ClassroomError::database_operation(format!(
                "Corrupt submission record {}: {e}",
                self.id
            ))
        })?;
        let submitted_at =
            DateTime::<Utc>::from_timestamp(self.submitted_at, 0).ok_or_else(|| {
                ClassroomError::database_operation(format!(
                    "Corrupt submission record {}: invalid submitted_at {}",
                    self.id, self.submitted_at
                ))
            })?;

        Ok(Submission {
            id: self.id,
            assignment_id: self.assignment_id,
            student_id: self.student_id,
            student_name: self.student_name,
            attachment_url: self.attachment_url,
            submitted_at,
            grade: self.grade,
            feedback: self.feedback,
            status,
        })
    }
}
