use super::{SeaOrmStorage, db_error};
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::entity::submissions::{Column as SubmissionColumn, Entity as Submissions};
use crate::errors::Result;
use crate::models::assignments::entities::Assignment;
use crate::storage::DeleteOutcome;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建作业
    pub async fn create_assignment_impl(&self, assignment: Assignment) -> Result<Assignment> {
        let model = ActiveModel {
            id: Set(assignment.id),
            course_id: Set(assignment.course_id),
            title: Set(assignment.title),
            description: Set(assignment.description),
            due_date: Set(assignment.due_date.timestamp()),
            total_points: Set(assignment.total_points),
            attachment_url: Set(assignment.attachment_url),
            created_at: Set(assignment.created_at.timestamp()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_error("创建作业失败"))?;

        Ok(result.into_assignment())
    }

    pub async fn get_assignment_by_id_impl(&self, id: &str) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("查询作业失败"))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 按截止时间升序列出课程作业
    pub async fn list_assignments_by_course_impl(&self, course_id: &str) -> Result<Vec<Assignment>> {
        let result = Assignments::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::DueDate)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error("查询作业列表失败"))?;

        Ok(result.into_iter().map(|m| m.into_assignment()).collect())
    }

    /// 删除作业及其全部提交（单个事务）
    pub async fn delete_assignment_impl(&self, id: &str) -> Result<DeleteOutcome> {
        let txn = self.db.begin().await.map_err(db_error("开启事务失败"))?;

        let Some(assignment) = Assignments::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_error("查询作业失败"))?
        else {
            return Ok(DeleteOutcome::not_found());
        };

        let submissions = Submissions::find()
            .filter(SubmissionColumn::AssignmentId.eq(id))
            .all(&txn)
            .await
            .map_err(db_error("查询作业提交失败"))?;

        let mut attachments: Vec<String> =
            submissions.into_iter().map(|s| s.attachment_url).collect();
        attachments.extend(assignment.attachment_url);

        Submissions::delete_many()
            .filter(SubmissionColumn::AssignmentId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_error("删除作业提交失败"))?;

        let result = Assignments::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_error("删除作业失败"))?;

        txn.commit().await.map_err(db_error("提交事务失败"))?;

        Ok(DeleteOutcome {
            deleted: result.rows_affected > 0,
            attachments,
        })
    }
}
