use super::{SeaOrmStorage, db_error, map_unique_violation};
use crate::entity::enrollments::{ActiveModel, Column, Entity as Enrollments};
use crate::errors::{ClassroomError, Result};
use crate::models::enrollments::entities::Enrollment;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 选课，(student_id, course_id) 唯一
    pub async fn create_enrollment_impl(&self, enrollment: Enrollment) -> Result<Enrollment> {
        let model = ActiveModel {
            id: Set(enrollment.id),
            student_id: Set(enrollment.student_id),
            course_id: Set(enrollment.course_id),
            enrolled_at: Set(enrollment.enrolled_at.timestamp()),
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            map_unique_violation(e, "选课失败", || {
                ClassroomError::already_enrolled("Already enrolled in this course")
            })
        })?;

        Ok(result.into_enrollment())
    }

    pub async fn get_enrollment_impl(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>> {
        let result = Enrollments::find()
            .filter(
                Condition::all()
                    .add(Column::StudentId.eq(student_id))
                    .add(Column::CourseId.eq(course_id)),
            )
            .one(&self.db)
            .await
            .map_err(db_error("查询选课记录失败"))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    /// 退课
    pub async fn delete_enrollment_impl(&self, student_id: &str, course_id: &str) -> Result<bool> {
        let result = Enrollments::delete_many()
            .filter(
                Condition::all()
                    .add(Column::StudentId.eq(student_id))
                    .add(Column::CourseId.eq(course_id)),
            )
            .exec(&self.db)
            .await
            .map_err(db_error("退课失败"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_enrollments_by_student_impl(
        &self,
        student_id: &str,
    ) -> Result<Vec<Enrollment>> {
        let result = Enrollments::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(Column::EnrolledAt)
            .all(&self.db)
            .await
            .map_err(db_error("查询选课记录失败"))?;

        Ok(result.into_iter().map(|m| m.into_enrollment()).collect())
    }

    pub async fn list_enrollments_by_course_impl(
        &self,
        course_id: &str,
    ) -> Result<Vec<Enrollment>> {
        let result = Enrollments::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::EnrolledAt)
            .all(&self.db)
            .await
            .map_err(db_error("查询选课记录失败"))?;

        Ok(result.into_iter().map(|m| m.into_enrollment()).collect())
    }
}
