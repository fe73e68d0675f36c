//! MongoDB 文档结构
//!
//! 文档与业务实体分离，主键映射为 `_id`，时间统一存储为 unix 秒。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ClassroomError, Result};
use crate::models::{
    assignments::entities::Assignment,
    courses::entities::Course,
    enrollments::entities::Enrollment,
    submissions::entities::{Submission, SubmissionStatus},
    users::entities::{User, UserRole},
};

pub const USERS: &str = "users";
pub const COURSES: &str = "courses";
pub const ENROLLMENTS: &str = "enrollments";
pub const ASSIGNMENTS: &str = "assignments";
pub const SUBMISSIONS: &str = "submissions";

fn from_timestamp(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}

fn checked_timestamp(collection: &str, id: &str, ts: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0).ok_or_else(|| {
        ClassroomError::database_operation(format!(
            "Corrupt {collection} document {id}: invalid timestamp {ts}"
        ))
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub password_hash: String,
    pub created_at: i64,
}

impl From<User> for UserDocument {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role.to_string(),
            password_hash: user.password_hash,
            created_at: user.created_at.timestamp(),
        }
    }
}

impl UserDocument {
    /// 角色或时间戳非法时返回 DatabaseOperation
    pub fn into_user(self) -> Result<User> {
        let role = self.role.parse::<UserRole>().map_err(|e| {
            ClassroomError::database_operation(format!("Corrupt {USERS} document {}: {e}", self.id))
        })?;
        let created_at = checked_timestamp(USERS, &self.id, self.created_at)?;
        Ok(User {
            id: self.id,
            email: self.email,
            name: self.name,
            role,
            password_hash: self.password_hash,
            created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub teacher_id: String,
    pub teacher_name: String,
    pub created_at: i64,
}

impl From<Course> for CourseDocument {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            teacher_id: course.teacher_id,
            teacher_name: course.teacher_name,
            created_at: course.created_at.timestamp(),
        }
    }
}

impl CourseDocument {
    pub fn into_course(self) -> Course {
        Course {
            id: self.id,
            title: self.title,
            description: self.description,
            teacher_id: self.teacher_id,
            teacher_name: self.teacher_name,
            created_at: from_timestamp(self.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    pub enrolled_at: i64,
}

impl From<Enrollment> for EnrollmentDocument {
    fn from(enrollment: Enrollment) -> Self {
        Self {
            id: enrollment.id,
            student_id: enrollment.student_id,
            course_id: enrollment.course_id,
            enrolled_at: enrollment.enrolled_at.timestamp(),
        }
    }
}

impl EnrollmentDocument {
    pub fn into_enrollment(self) -> Enrollment {
        Enrollment {
            id: self.id,
            student_id: self.student_id,
            course_id: self.course_id,
            enrolled_at: from_timestamp(self.enrolled_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub due_date: i64,
    pub total_points: i32,
    #[serde(default)]
    pub attachment_url: Option<String>,
    pub created_at: i64,
}

impl From<Assignment> for AssignmentDocument {
    fn from(assignment: Assignment) -> Self {
        Self {
            id: assignment.id,
            course_id: assignment.course_id,
            title: assignment.title,
            description: assignment.description,
            due_date: assignment.due_date.timestamp(),
            total_points: assignment.total_points,
            attachment_url: assignment.attachment_url,
            created_at: assignment.created_at.timestamp(),
        }
    }
}

impl AssignmentDocument {
    pub fn into_assignment(self) -> Assignment {
        Assignment {
            id: self.id,
            course_id: self.course_id,
            title: self.title,
            description: self.description,
            due_date: from_timestamp(self.due_date),
            total_points: self.total_points,
            attachment_url: self.attachment_url,
            created_at: from_timestamp(self.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub assignment_id: String,
    pub student_id: String,
    pub student_name: String,
    pub attachment_url: String,
    pub submitted_at: i64,
    #[serde(default)]
    pub grade: Option<i32>,
    #[serde(default)]
    pub feedback: Option<String>,
    pub status: String,
}

impl From<Submission> for SubmissionDocument {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id,
            assignment_id: submission.assignment_id,
            student_id: submission.student_id,
            student_name: submission.student_name,
            attachment_url: submission.attachment_url,
            submitted_at: submission.submitted_at.timestamp(),
            grade: submission.grade,
            feedback: submission.feedback,
            status: submission.status.to_string(),
        }
    }
}

impl SubmissionDocument {
    /// 状态或时间戳非法时返回 DatabaseOperation
    pub fn into_submission(self) -> Result<Submission> {
        let status = self.status.parse::<SubmissionStatus>().map_err(|e| {
            ClassroomError::database_operation(format!(
                "Corrupt {SUBMISSIONS} document {}: {e}",
                self.id
            ))
        })?;
        let submitted_at = checked_timestamp(SUBMISSIONS, &self.id, self.submitted_at)?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_document_uses_object_id_field() {
        let user = User {
            id: "u1".into(),
            email: "t@example.com".into(),
            name: "T".into(),
            role: UserRole::Teacher,
            password_hash: "$argon2id$hash".into(),
            created_at: from_timestamp(1_700_000_000),
        };
        let doc = bson::to_document(&UserDocument::from(user)).unwrap();
        assert_eq!(doc.get_str("_id").unwrap(), "u1");
        assert_eq!(doc.get_str("role").unwrap(), "teacher");
        assert_eq!(doc.get_i64("created_at").unwrap(), 1_700_000_000);
        assert!(doc.get("id").is_none());
    }

    #[test]
    fn test_submission_document_defaults() {
        let doc = bson::doc! {
            "_id": "s1",
            "assignment_id": "a1",
            "student_id": "u2",
            "student_name": "S",
            "attachment_url": "/api/uploads/x.pdf",
            "submitted_at": 1_700_000_000_i64,
            "status": "submitted",
        };
        let submission = bson::from_document::<SubmissionDocument>(doc)
            .unwrap()
            .into_submission()
            .unwrap();
        assert_eq!(submission.grade, None);
        assert_eq!(submission.feedback, None);
        assert_eq!(submission.status, SubmissionStatus::Submitted);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let doc = UserDocument {
            id: "u1".into(),
            email: "a@example.com".into(),
            name: "A".into(),
            role: "admin".into(),
            password_hash: String::new(),
            created_at: 1_700_000_000,
        };
        let err = doc.into_user().unwrap_err();
        assert!(matches!(err, ClassroomError::DatabaseOperation(_)));
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let doc = bson::doc! {
            "_id": "s1",
            "assignment_id": "a1",
            "student_id": "u2",
            "student_name": "S",
            "attachment_url": "/api/uploads/x.pdf",
            "submitted_at": 1_700_000_000_i64,
            "grade": 90,
            "status": "reviewed",
        };
        let err = bson::from_document::<SubmissionDocument>(doc)
            .unwrap()
            .into_submission()
            .unwrap_err();
        assert!(matches!(err, ClassroomError::DatabaseOperation(_)));
    }
}
