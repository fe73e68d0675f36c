use super::{SeaOrmStorage, db_error};
use crate::entity::assignments::{Column as AssignmentColumn, Entity as Assignments};
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::entity::enrollments::{Column as EnrollmentColumn, Entity as Enrollments};
use crate::entity::submissions::{Column as SubmissionColumn, Entity as Submissions};
use crate::errors::Result;
use crate::models::courses::entities::Course;
use crate::storage::DeleteOutcome;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建课程
    pub async fn create_course_impl(&self, course: Course) -> Result<Course> {
        let model = ActiveModel {
            id: Set(course.id),
            title: Set(course.title),
            description: Set(course.description),
            teacher_id: Set(course.teacher_id),
            teacher_name: Set(course.teacher_name),
            created_at: Set(course.created_at.timestamp()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_error("创建课程失败"))?;

        Ok(result.into_course())
    }

    /// 通过 ID 获取课程
    pub async fn get_course_by_id_impl(&self, id: &str) -> Result<Option<Course>> {
        let result = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("查询课程失败"))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 列出课程，可按教师筛选
    pub async fn list_courses_impl(&self, teacher_id: Option<&str>) -> Result<Vec<Course>> {
        let mut select = Courses::find();
        if let Some(teacher_id) = teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        let result = select
            .order_by_desc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error("查询课程列表失败"))?;

        Ok(result.into_iter().map(|m| m.into_course()).collect())
    }

    /// 批量获取课程
    pub async fn list_courses_by_ids_impl(&self, ids: &[String]) -> Result<Vec<Course>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Courses::find()
            .filter(Column::Id.is_in(ids.iter().cloned()))
            .order_by_desc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error("查询课程列表失败"))?;

        Ok(result.into_iter().map(|m| m.into_course()).collect())
    }

    /// 删除课程及其作业、提交和选课记录（单个事务）
    pub async fn delete_course_impl(&self, id: &str) -> Result<DeleteOutcome> {
        let txn = self.db.begin().await.map_err(db_error("开启事务失败"))?;

        if Courses::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_error("查询课程失败"))?
            .is_none()
        {
            return Ok(DeleteOutcome::not_found());
        }

        let assignments = Assignments::find()
            .filter(AssignmentColumn::CourseId.eq(id))
            .all(&txn)
            .await
            .map_err(db_error("查询课程作业失败"))?;
        let assignment_ids: Vec<String> = assignments.iter().map(|a| a.id.clone()).collect();

        let mut attachments: Vec<String> = assignments
            .into_iter()
            .filter_map(|a| a.attachment_url)
            .collect();

        if !assignment_ids.is_empty() {
            let submissions = Submissions::find()
                .filter(SubmissionColumn::AssignmentId.is_in(assignment_ids.clone()))
                .all(&txn)
                .await
                .map_err(db_error("查询作业提交失败"))?;
            attachments.extend(submissions.into_iter().map(|s| s.attachment_url));

            Submissions::delete_many()
                .filter(SubmissionColumn::AssignmentId.is_in(assignment_ids))
                .exec(&txn)
                .await
                .map_err(db_error("删除作业提交失败"))?;
        }

        Assignments::delete_many()
            .filter(AssignmentColumn::CourseId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_error("删除课程作业失败"))?;

        Enrollments::delete_many()
            .filter(EnrollmentColumn::CourseId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_error("删除选课记录失败"))?;

        let result = Courses::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_error("删除课程失败"))?;

        txn.commit().await.map_err(db_error("提交事务失败"))?;

        Ok(DeleteOutcome {
            deleted: result.rows_affected > 0,
            attachments,
        })
    }
}
