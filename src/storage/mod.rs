use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::{ClassroomError, Result};
use crate::models::{
    assignments::entities::Assignment,
    courses::entities::Course,
    enrollments::entities::Enrollment,
    submissions::entities::Submission,
    users::{entities::User, requests::UpdateUserRequest},
};

pub mod attachments;
pub mod mongo_storage;
pub mod register;
pub mod sea_orm_storage;

pub use attachments::AttachmentStore;

/// 级联删除的结果
///
/// `attachments` 为被删除记录引用的附件路径，调用方在事务提交后清理磁盘文件。
#[derive(Debug, Default, Clone)]
pub struct DeleteOutcome {
    pub deleted: bool,
    pub attachments: Vec<String>,
}

impl DeleteOutcome {
    pub fn not_found() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 后端名称，例如 "sea_orm"
    fn backend_name(&self) -> &'static str;

    /// 用户管理方法
    // 创建用户，邮箱重复返回 DuplicateEmail
    async fn create_user(&self, user: User) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 批量获取用户
    async fn list_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>>;
    // 更新用户信息
    async fn update_user(&self, id: &str, update: UpdateUserRequest) -> Result<Option<User>>;

    /// 课程管理方法
    async fn create_course(&self, course: Course) -> Result<Course>;
    async fn get_course_by_id(&self, id: &str) -> Result<Option<Course>>;
    // teacher_id 为 None 时列出全部课程
    async fn list_courses(&self, teacher_id: Option<&str>) -> Result<Vec<Course>>;
    async fn list_courses_by_ids(&self, ids: &[String]) -> Result<Vec<Course>>;
    // 删除课程，同时删除作业、提交和选课记录
    async fn delete_course(&self, id: &str) -> Result<DeleteOutcome>;

    /// 选课管理方法
    // 重复选课返回 AlreadyEnrolled
    async fn create_enrollment(&self, enrollment: Enrollment) -> Result<Enrollment>;
    async fn get_enrollment(&self, student_id: &str, course_id: &str)
    -> Result<Option<Enrollment>>;
    async fn delete_enrollment(&self, student_id: &str, course_id: &str) -> Result<bool>;
    async fn list_enrollments_by_student(&self, student_id: &str) -> Result<Vec<Enrollment>>;
    async fn list_enrollments_by_course(&self, course_id: &str) -> Result<Vec<Enrollment>>;

    /// 作业管理方法
    async fn create_assignment(&self, assignment: Assignment) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, id: &str) -> Result<Option<Assignment>>;
    async fn list_assignments_by_course(&self, course_id: &str) -> Result<Vec<Assignment>>;
    // 删除作业，同时删除其下所有提交
    async fn delete_assignment(&self, id: &str) -> Result<DeleteOutcome>;

    /// 提交管理方法
    // 重复提交返回 AlreadySubmitted
    async fn create_submission(&self, submission: Submission) -> Result<Submission>;
    async fn get_submission_by_id(&self, id: &str) -> Result<Option<Submission>>;
    async fn get_submission_by_assignment_and_student(
        &self,
        assignment_id: &str,
        student_id: &str,
    ) -> Result<Option<Submission>>;
    // student_id 为 Some 时只返回该学生的提交
    async fn list_submissions_by_assignment(
        &self,
        assignment_id: &str,
        student_id: Option<&str>,
    ) -> Result<Vec<Submission>>;
    // 评分，状态置为 graded
    async fn grade_submission(
        &self,
        id: &str,
        grade: i32,
        feedback: Option<String>,
    ) -> Result<Option<Submission>>;
}

/// 根据配置创建存储后端
pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let config = AppConfig::get();
    let backend = register::resolve_backend_name(&config.database);

    let constructor = register::get_storage_plugin(&backend).ok_or_else(|| {
        ClassroomError::storage_plugin_not_found(format!(
            "Storage backend '{backend}' is not registered"
        ))
    })?;

    tracing::info!("Using storage backend: {}", backend);
    constructor().await
}
