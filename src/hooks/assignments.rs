use async_trait::async_trait;

use super::{MutationDef, QueryDef, UseMutation, UseQuery};
use crate::api::ClassroomApi;
use crate::cache::QueryKey;
use crate::errors::{ClassroomError, Result};
use crate::models::{
    assignments::entities::Assignment, submissions::requests::SubmitAssignmentRequest,
};

/// 班级下的全部作业
pub struct GetAssignments {
    pub class_id: String,
}

#[async_trait]
impl QueryDef for GetAssignments {
    type Data = Vec<Assignment>;

    const NAME: &'static str = "get_assignments";

    fn key(&self) -> QueryKey {
        QueryKey::assignments(&self.class_id)
    }

    fn enabled(&self) -> bool {
        !self.class_id.is_empty()
    }

    async fn fetch(&self, api: &dyn ClassroomApi) -> Result<Vec<Assignment>> {
        api.list_assignments(&self.class_id).await
    }
}

#[derive(Debug, Clone)]
pub struct DeleteAssignmentArgs {
    pub class_id: String,
    pub assignment_id: String,
}

/// 删除作业
///
/// 后端用 `{ success: false, message }` 表示拒绝，这里统一转换为 `Rejected` 错误。
pub struct DeleteAssignment;

#[async_trait]
impl MutationDef for DeleteAssignment {
    type Args = DeleteAssignmentArgs;
    type Output = ();

    const NAME: &'static str = "delete_assignment";

    async fn call(&self, api: &dyn ClassroomApi, args: &DeleteAssignmentArgs) -> Result<()> {
        let response = api.delete_assignment(&args.assignment_id).await?;
        if response.success {
            Ok(())
        } else {
            Err(ClassroomError::rejected(response.message.unwrap_or_default()))
        }
    }

    fn invalidates(&self, args: &DeleteAssignmentArgs) -> Vec<QueryKey> {
        vec![QueryKey::assignments(&args.class_id)]
    }
}

/// 提交作业文件，提交状态不在缓存中
pub struct SubmitAssignment;

#[async_trait]
impl MutationDef for SubmitAssignment {
    type Args = SubmitAssignmentRequest;
    type Output = ();

    const NAME: &'static str = "submit_assignment";

    async fn call(&self, api: &dyn ClassroomApi, request: &SubmitAssignmentRequest) -> Result<()> {
        api.submit_assignment(request.clone()).await
    }

    fn invalidates(&self, _: &SubmitAssignmentRequest) -> Vec<QueryKey> {
        Vec::new()
    }
}

pub type UseGetAssignments = UseQuery<GetAssignments>;
pub type UseDeleteAssignment = UseMutation<DeleteAssignment>;
pub type UseSubmitAssignment = UseMutation<SubmitAssignment>;
