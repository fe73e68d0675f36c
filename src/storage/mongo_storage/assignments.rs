use bson::doc;
use futures_util::TryStreamExt;
use mongodb::ClientSession;
use mongodb::options::FindOptions;

use super::{
    MongoStorage,
    documents::{AssignmentDocument, SubmissionDocument},
};
use crate::errors::Result;
use crate::models::assignments::entities::Assignment;
use crate::storage::DeleteOutcome;

impl MongoStorage {
    pub async fn create_assignment_impl(&self, assignment: Assignment) -> Result<Assignment> {
        let document = AssignmentDocument::from(assignment);
        self.assignments().insert_one(&document, None).await?;
        Ok(document.into_assignment())
    }

    pub async fn get_assignment_by_id_impl(&self, id: &str) -> Result<Option<Assignment>> {
        let result = self.assignments().find_one(doc! { "_id": id }, None).await?;
        Ok(result.map(AssignmentDocument::into_assignment))
    }

    pub async fn list_assignments_by_course_impl(&self, course_id: &str) -> Result<Vec<Assignment>> {
        let options = FindOptions::builder()
            .sort(doc! { "due_date": 1, "_id": 1 })
            .build();
        let cursor = self
            .assignments()
            .find(doc! { "course_id": course_id }, options)
            .await?;
        let documents: Vec<AssignmentDocument> = cursor.try_collect().await?;
        Ok(documents
            .into_iter()
            .map(AssignmentDocument::into_assignment)
            .collect())
    }

    /// 在事务中删除作业及其全部提交
    pub async fn delete_assignment_impl(&self, id: &str) -> Result<DeleteOutcome> {
        let mut session = self.begin().await?;
        let result = self.delete_assignment_in_session(id, &mut session).await;
        Self::finish(session, result).await
    }

    async fn delete_assignment_in_session(
        &self,
        id: &str,
        session: &mut ClientSession,
    ) -> Result<DeleteOutcome> {
        let Some(assignment) = self
            .assignments()
            .find_one_with_session(doc! { "_id": id }, None, session)
            .await?
        else {
            return Ok(DeleteOutcome::not_found());
        };

        let mut attachments = Vec::new();
        let mut cursor = self
            .submissions()
            .find_with_session(doc! { "assignment_id": id }, None, session)
            .await?;
        while let Some(submission) = cursor.next(session).await {
            let submission: SubmissionDocument = submission?;
            attachments.push(submission.attachment_url);
        }
        attachments.extend(assignment.attachment_url);

        self.submissions()
            .delete_many_with_session(doc! { "assignment_id": id }, None, session)
            .await?;
        let result = self
            .assignments()
            .delete_one_with_session(doc! { "_id": id }, None, session)
            .await?;

        Ok(DeleteOutcome {
            deleted: result.deleted_count > 0,
            attachments,
        })
    }
}
