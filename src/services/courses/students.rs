use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, ensure_teacher, get::get_course};
use crate::errors::{ClassroomError, Result};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse,
    users::{entities::User, responses::UserBase},
};
use crate::storage::Storage;

/// 课程学生名单，仅课程所属教师可查看
pub async fn list_course_students(
    storage: &dyn Storage,
    caller: &User,
    course_id: &str,
) -> Result<Vec<UserBase>> {
    ensure_teacher(caller, "Only teachers can view course students")?;

    let course = get_course(storage, course_id).await?;
    if !course.is_owned_by(&caller.id) {
        return Err(ClassroomError::forbidden("Not your course"));
    }

    let student_ids: Vec<String> = storage
        .list_enrollments_by_course(course_id)
        .await?
        .into_iter()
        .map(|e| e.student_id)
        .collect();

    let students = storage.list_users_by_ids(&student_ids).await?;
    Ok(students.into_iter().map(UserBase::from).collect())
}

pub async fn handle_list_students(
    service: &CourseService,
    course_id: &str,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let caller = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request)?;
    let students = list_course_students(storage.as_ref(), &caller, course_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(students, "Students retrieved successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::courses::enroll::enroll;
    use crate::services::test_support::TestContext;

    #[tokio::test]
    async fn test_list_students() {
        let ctx = TestContext::new().await;
        let teacher = ctx.teacher("t@example.com").await;
        let other = ctx.teacher("other@example.com").await;
        let s1 = ctx.student("s1@example.com").await;
        let s2 = ctx.student("s2@example.com").await;
        ctx.student("s3@example.com").await;
        let course = ctx.course(&teacher, "Art").await;

        enroll(ctx.storage(), &s1, &course.id).await.unwrap();
        enroll(ctx.storage(), &s2, &course.id).await.unwrap();

        let students = list_course_students(ctx.storage(), &teacher, &course.id)
            .await
            .unwrap();
        let mut ids: Vec<_> = students.iter().map(|s| s.id.clone()).collect();
        ids.sort();
        let mut expected = vec![s1.id.clone(), s2.id.clone()];
        expected.sort();
        assert_eq!(ids, expected);

        let err = list_course_students(ctx.storage(), &other, &course.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ClassroomError::Forbidden(_)));

        let err = list_course_students(ctx.storage(), &s1, &course.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ClassroomError::Forbidden(_)));
    }
}
