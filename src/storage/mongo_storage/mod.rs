//! MongoDB 存储实现
//!
//! 唯一性由集合索引保证，级联删除使用会话事务（需要副本集部署）。

mod assignments;
mod courses;
pub mod documents;
mod enrollments;
mod submissions;
mod users;

use std::time::Duration;

use bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, ClientSession, Collection, Database, IndexModel};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::errors::{ClassroomError, Result};
use documents::*;

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct MongoStorage {
    pub(crate) client: Client,
    pub(crate) db: Database,
}

impl MongoStorage {
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();

        let mut options = ClientOptions::parse(&config.database.url)
            .await
            .map_err(|e| ClassroomError::database_config(format!("MongoDB URL 解析失败: {e}")))?;
        options.app_name = Some(config.app.system_name.clone());
        options.max_pool_size = Some(config.database.pool_size);
        options.connect_timeout = Some(Duration::from_secs(config.database.timeout));
        options.server_selection_timeout = Some(Duration::from_secs(config.database.timeout));

        Self::connect(options, &config.database.name).await
    }

    /// 按给定选项连接并准备索引
    pub async fn connect(options: ClientOptions, db_name: &str) -> Result<Self> {
        let client = Client::with_options(options)
            .map_err(|e| ClassroomError::database_connection(format!("无法连接到 MongoDB: {e}")))?;

        info!("Using MongoDB database: {}", db_name);
        let db = client.database(db_name);

        let storage = Self { client, db };
        storage.ensure_indexes().await?;
        info!("MongoDB 存储初始化完成");

        Ok(storage)
    }

    /// 创建唯一索引和查询索引，重复执行无副作用
    async fn ensure_indexes(&self) -> Result<()> {
        let unique = || Some(IndexOptions::builder().unique(true).build());

        self.users()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique())
                    .build(),
                None,
            )
            .await?;
        self.courses()
            .create_index(
                IndexModel::builder().keys(doc! { "teacher_id": 1 }).build(),
                None,
            )
            .await?;
        self.enrollments()
            .create_indexes(
                [
                    IndexModel::builder()
                        .keys(doc! { "student_id": 1, "course_id": 1 })
                        .options(unique())
                        .build(),
                    IndexModel::builder().keys(doc! { "course_id": 1 }).build(),
                ],
                None,
            )
            .await?;
        self.assignments()
            .create_index(
                IndexModel::builder().keys(doc! { "course_id": 1 }).build(),
                None,
            )
            .await?;
        self.submissions()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "assignment_id": 1, "student_id": 1 })
                    .options(unique())
                    .build(),
                None,
            )
            .await?;

        Ok(())
    }

    pub(crate) fn users(&self) -> Collection<UserDocument> {
        self.db.collection(USERS)
    }

    pub(crate) fn courses(&self) -> Collection<CourseDocument> {
        self.db.collection(COURSES)
    }

    pub(crate) fn enrollments(&self) -> Collection<EnrollmentDocument> {
        self.db.collection(ENROLLMENTS)
    }

    pub(crate) fn assignments(&self) -> Collection<AssignmentDocument> {
        self.db.collection(ASSIGNMENTS)
    }

    pub(crate) fn submissions(&self) -> Collection<SubmissionDocument> {
        self.db.collection(SUBMISSIONS)
    }

    /// 开启带事务的会话
    pub(crate) async fn begin(&self) -> Result<ClientSession> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;
        Ok(session)
    }

    /// 根据执行结果提交或回滚事务
    pub(crate) async fn finish<T>(mut session: ClientSession, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                session.commit_transaction().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(abort) = session.abort_transaction().await {
                    warn!("Failed to abort MongoDB transaction: {}", abort);
                }
                Err(e)
            }
        }
    }
}

/// 是否为唯一索引冲突
pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

pub(crate) fn map_duplicate(
    err: mongodb::error::Error,
    on_conflict: impl FnOnce() -> ClassroomError,
) -> ClassroomError {
    if is_duplicate_key(&err) {
        on_conflict()
    } else {
        ClassroomError::from(err)
    }
}

// Storage trait 实现
use crate::models::{
    assignments::entities::Assignment,
    courses::entities::Course,
    enrollments::entities::Enrollment,
    submissions::entities::Submission,
    users::{entities::User, requests::UpdateUserRequest},
};
use crate::storage::{DeleteOutcome, Storage};
use async_trait::async_trait;

#[async_trait]
impl Storage for MongoStorage {
    fn backend_name(&self) -> &'static str {
        crate::storage::register::MONGODB_BACKEND
    }

    async fn create_user(&self, user: User) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn list_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>> {
        self.list_users_by_ids_impl(ids).await
    }

    async fn update_user(&self, id: &str, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn create_course(&self, course: Course) -> Result<Course> {
        self.create_course_impl(course).await
    }

    async fn get_course_by_id(&self, id: &str) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn list_courses(&self, teacher_id: Option<&str>) -> Result<Vec<Course>> {
        self.list_courses_impl(teacher_id).await
    }

    async fn list_courses_by_ids(&self, ids: &[String]) -> Result<Vec<Course>> {
        self.list_courses_by_ids_impl(ids).await
    }

    async fn delete_course(&self, id: &str) -> Result<DeleteOutcome> {
        self.delete_course_impl(id).await
    }

    async fn create_enrollment(&self, enrollment: Enrollment) -> Result<Enrollment> {
        self.create_enrollment_impl(enrollment).await
    }

    async fn get_enrollment(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>> {
        self.get_enrollment_impl(student_id, course_id).await
    }

    async fn delete_enrollment(&self, student_id: &str, course_id: &str) -> Result<bool> {
        self.delete_enrollment_impl(student_id, course_id).await
    }

    async fn list_enrollments_by_student(&self, student_id: &str) -> Result<Vec<Enrollment>> {
        self.list_enrollments_impl(doc! { "student_id": student_id })
            .await
    }

    async fn list_enrollments_by_course(&self, course_id: &str) -> Result<Vec<Enrollment>> {
        self.list_enrollments_impl(doc! { "course_id": course_id })
            .await
    }

    async fn create_assignment(&self, assignment: Assignment) -> Result<Assignment> {
        self.create_assignment_impl(assignment).await
    }

    async fn get_assignment_by_id(&self, id: &str) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(id).await
    }

    async fn list_assignments_by_course(&self, course_id: &str) -> Result<Vec<Assignment>> {
        self.list_assignments_by_course_impl(course_id).await
    }

    async fn delete_assignment(&self, id: &str) -> Result<DeleteOutcome> {
        self.delete_assignment_impl(id).await
    }

    async fn create_submission(&self, submission: Submission) -> Result<Submission> {
        self.create_submission_impl(submission).await
    }

    async fn get_submission_by_id(&self, id: &str) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(id).await
    }

    async fn get_submission_by_assignment_and_student(
        &self,
        assignment_id: &str,
        student_id: &str,
    ) -> Result<Option<Submission>> {
        self.get_submission_by_assignment_and_student_impl(assignment_id, student_id)
            .await
    }

    async fn list_submissions_by_assignment(
        &self,
        assignment_id: &str,
        student_id: Option<&str>,
    ) -> Result<Vec<Submission>> {
        self.list_submissions_by_assignment_impl(assignment_id, student_id)
            .await
    }

    async fn grade_submission(
        &self,
        id: &str,
        grade: i32,
        feedback: Option<String>,
    ) -> Result<Option<Submission>> {
        self.grade_submission_impl(id, grade, feedback).await
    }
}

// 需要一个副本集部署，例如
// MONGODB_TEST_URL=mongodb://localhost:27017/?replicaSet=rs0 cargo test -- --ignored
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::submissions::entities::SubmissionStatus;
    use crate::models::users::entities::UserRole;

    async fn connect_test_db() -> Option<MongoStorage> {
        let Ok(url) = std::env::var("MONGODB_TEST_URL") else {
            eprintln!("MONGODB_TEST_URL not set, skipping");
            return None;
        };
        let options = ClientOptions::parse(&url).await.unwrap();
        let name = format!("classroom_test_{}", uuid::Uuid::new_v4().simple());
        Some(MongoStorage::connect(options, &name).await.unwrap())
    }

    fn user(id: &str, email: &str, role: UserRole) -> User {
        User {
            id: id.into(),
            email: email.into(),
            name: id.into(),
            role,
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    fn enrollment(id: &str, student_id: &str, course_id: &str) -> Enrollment {
        Enrollment {
            id: id.into(),
            student_id: student_id.into(),
            course_id: course_id.into(),
            enrolled_at: Utc::now(),
        }
    }

    fn submission(id: &str, assignment_id: &str, student_id: &str) -> Submission {
        Submission {
            id: id.into(),
            assignment_id: assignment_id.into(),
            student_id: student_id.into(),
            student_name: student_id.into(),
            attachment_url: format!("/api/uploads/submission-{assignment_id}-{student_id}.txt"),
            submitted_at: Utc::now(),
            grade: None,
            feedback: None,
            status: SubmissionStatus::Submitted,
        }
    }

    /// 教师 t1 的课程 c1，带附件的作业 a1，学生 s1 已选课并提交 sub1
    async fn seed(storage: &MongoStorage) {
        storage
            .create_user(user("t1", "t@example.com", UserRole::Teacher))
            .await
            .unwrap();
        storage
            .create_user(user("s1", "s@example.com", UserRole::Student))
            .await
            .unwrap();
        storage
            .create_course(Course {
                id: "c1".into(),
                title: "Chemistry".into(),
                description: String::new(),
                teacher_id: "t1".into(),
                teacher_name: "t1".into(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        storage
            .create_assignment(Assignment {
                id: "a1".into(),
                course_id: "c1".into(),
                title: "Titration".into(),
                description: String::new(),
                due_date: Utc::now(),
                total_points: 20,
                attachment_url: Some("/api/uploads/assignment-a1.pdf".into()),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        storage
            .create_enrollment(enrollment("e1", "s1", "c1"))
            .await
            .unwrap();
        storage
            .create_submission(submission("sub1", "a1", "s1"))
            .await
            .unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn test_duplicate_keys_are_mapped() {
        let Some(storage) = connect_test_db().await else {
            return;
        };
        seed(&storage).await;

        let err = storage
            .create_user(user("t2", "t@example.com", UserRole::Teacher))
            .await
            .unwrap_err();
        assert!(matches!(err, ClassroomError::DuplicateEmail(_)));

        let err = storage
            .create_enrollment(enrollment("e2", "s1", "c1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClassroomError::AlreadyEnrolled(_)));

        let err = storage
            .create_submission(submission("sub2", "a1", "s1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClassroomError::AlreadySubmitted(_)));

        storage.db.drop(None).await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn test_delete_course_cascades() {
        let Some(storage) = connect_test_db().await else {
            return;
        };
        seed(&storage).await;

        let outcome = storage.delete_course("c1").await.unwrap();
        assert!(outcome.deleted);
        let mut attachments = outcome.attachments;
        attachments.sort();
        assert_eq!(
            attachments,
            [
                "/api/uploads/assignment-a1.pdf",
                "/api/uploads/submission-a1-s1.txt",
            ]
        );

        assert!(storage.get_course_by_id("c1").await.unwrap().is_none());
        assert!(storage.get_assignment_by_id("a1").await.unwrap().is_none());
        assert!(storage.get_submission_by_id("sub1").await.unwrap().is_none());
        assert!(storage.get_enrollment("s1", "c1").await.unwrap().is_none());
        assert!(storage.get_user_by_id("s1").await.unwrap().is_some());

        let outcome = storage.delete_course("c1").await.unwrap();
        assert!(!outcome.deleted);

        storage.db.drop(None).await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn test_delete_assignment_cascades() {
        let Some(storage) = connect_test_db().await else {
            return;
        };
        seed(&storage).await;

        let outcome = storage.delete_assignment("a1").await.unwrap();
        assert!(outcome.deleted);
        assert_eq!(outcome.attachments.len(), 2);
        assert!(storage.get_submission_by_id("sub1").await.unwrap().is_none());
        assert!(storage.get_enrollment("s1", "c1").await.unwrap().is_some());

        storage.db.drop(None).await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn test_grade_returns_updated_submission() {
        let Some(storage) = connect_test_db().await else {
            return;
        };
        seed(&storage).await;

        let graded = storage
            .grade_submission("sub1", 18, Some("Accurate".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(graded.grade, Some(18));
        assert_eq!(graded.feedback.as_deref(), Some("Accurate"));
        assert_eq!(graded.status, SubmissionStatus::Graded);

        // 重新评分覆盖旧值
        let regraded = storage
            .grade_submission("sub1", 12, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(regraded.grade, Some(12));
        assert_eq!(regraded.feedback, None);

        assert!(
            storage
                .grade_submission("missing", 1, None)
                .await
                .unwrap()
                .is_none()
        );

        storage.db.drop(None).await.unwrap();
    }
}
