use bson::doc;
use futures_util::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};

use super::{MongoStorage, documents::SubmissionDocument, map_duplicate};
use crate::errors::{ClassroomError, Result};
use crate::models::submissions::entities::{Submission, SubmissionStatus};

impl MongoStorage {
    pub async fn create_submission_impl(&self, submission: Submission) -> Result<Submission> {
        let document = SubmissionDocument::from(submission);
        self.submissions()
            .insert_one(&document, None)
            .await
            .map_err(|e| {
                map_duplicate(e, || {
                    ClassroomError::already_submitted("Assignment already submitted")
                })
            })?;

        document.into_submission()
    }

    pub async fn get_submission_by_id_impl(&self, id: &str) -> Result<Option<Submission>> {
        let result = self.submissions().find_one(doc! { "_id": id }, None).await?;
        result.map(SubmissionDocument::into_submission).transpose()
    }

    pub async fn get_submission_by_assignment_and_student_impl(
        &self,
        assignment_id: &str,
        student_id: &str,
    ) -> Result<Option<Submission>> {
        let result = self
            .submissions()
            .find_one(
                doc! { "assignment_id": assignment_id, "student_id": student_id },
                None,
            )
            .await?;
        result.map(SubmissionDocument::into_submission).transpose()
    }

    pub async fn list_submissions_by_assignment_impl(
        &self,
        assignment_id: &str,
        student_id: Option<&str>,
    ) -> Result<Vec<Submission>> {
        let mut filter = doc! { "assignment_id": assignment_id };
        if let Some(student_id) = student_id {
            filter.insert("student_id", student_id);
        }

        let options = FindOptions::builder()
            .sort(doc! { "submitted_at": 1, "_id": 1 })
            .build();
        let cursor = self.submissions().find(filter, options).await?;
        let documents: Vec<SubmissionDocument> = cursor.try_collect().await?;
        documents
            .into_iter()
            .map(SubmissionDocument::into_submission)
            .collect()
    }

    pub async fn grade_submission_impl(
        &self,
        id: &str,
        grade: i32,
        feedback: Option<String>,
    ) -> Result<Option<Submission>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let update = doc! {
            "$set": {
                "grade": grade,
                "feedback": feedback,
                "status": SubmissionStatus::Graded.to_string(),
            }
        };
        let result = self
            .submissions()
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await?;
        result.map(SubmissionDocument::into_submission).transpose()
    }
}
