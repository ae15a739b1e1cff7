use async_trait::async_trait;

use super::{MutationDef, UseMutation};
use crate::api::ClassroomApi;
use crate::cache::QueryKey;
use crate::errors::Result;

/// 删除班级，参数为班级ID
pub struct DeleteClass;

#[async_trait]
impl MutationDef for DeleteClass {
    type Args = String;
    type Output = ();

    const NAME: &'static str = "delete_class";

    async fn call(&self, api: &dyn ClassroomApi, class_id: &String) -> Result<()> {
        api.delete_class(class_id).await
    }

    fn invalidates(&self, _: &String) -> Vec<QueryKey> {
        vec![QueryKey::classes()]
    }
}

pub type UseDeleteClass = UseMutation<DeleteClass>;
