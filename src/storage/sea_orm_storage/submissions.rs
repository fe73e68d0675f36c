use super::{SeaOrmStorage, db_error, map_unique_violation};
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions};
use crate::errors::{ClassroomError, Result};
use crate::models::submissions::entities::{Submission, SubmissionStatus};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建提交，(assignment_id, student_id) 唯一
    pub async fn create_submission_impl(&self, submission: Submission) -> Result<Submission> {
        let model = ActiveModel {
            id: Set(submission.id),
            assignment_id: Set(submission.assignment_id),
            student_id: Set(submission.student_id),
            student_name: Set(submission.student_name),
            attachment_url: Set(submission.attachment_url),
            submitted_at: Set(submission.submitted_at.timestamp()),
            grade: Set(submission.grade),
            feedback: Set(submission.feedback),
            status: Set(submission.status.to_string()),
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            map_unique_violation(e, "创建提交失败", || {
                ClassroomError::already_submitted("Assignment already submitted")
            })
        })?;

        result.into_submission()
    }

    pub async fn get_submission_by_id_impl(&self, id: &str) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("查询提交失败"))?;

        result.map(|m| m.into_submission()).transpose()
    }

    pub async fn get_submission_by_assignment_and_student_impl(
        &self,
        assignment_id: &str,
        student_id: &str,
    ) -> Result<Option<Submission>> {
        let result = Submissions::find()
            .filter(
                Condition::all()
                    .add(Column::AssignmentId.eq(assignment_id))
                    .add(Column::StudentId.eq(student_id)),
            )
            .one(&self.db)
            .await
            .map_err(db_error("查询提交失败"))?;

        result.map(|m| m.into_submission()).transpose()
    }

    /// 列出作业的提交，可只看某个学生
    pub async fn list_submissions_by_assignment_impl(
        &self,
        assignment_id: &str,
        student_id: Option<&str>,
    ) -> Result<Vec<Submission>> {
        let mut select = Submissions::find().filter(Column::AssignmentId.eq(assignment_id));
        if let Some(student_id) = student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }

        let result = select
            .order_by_asc(Column::SubmittedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error("查询提交列表失败"))?;

        result.into_iter().map(|m| m.into_submission()).collect()
    }

    /// 评分，已评分的提交允许重新评分
    pub async fn grade_submission_impl(
        &self,
        id: &str,
        grade: i32,
        feedback: Option<String>,
    ) -> Result<Option<Submission>> {
        let existing = Submissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("查询提交失败"))?;

        let Some(model) = existing else {
            return Ok(None);
        };

        let mut active = model.into_active_model();
        active.grade = Set(Some(grade));
        active.feedback = Set(feedback);
        active.status = Set(SubmissionStatus::Graded.to_string());

        let result = active
            .update(&self.db)
            .await
            .map_err(db_error("评分失败"))?;

        result.into_submission().map(Some)
    }
}
