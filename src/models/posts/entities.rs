use serde::{Deserialize, Serialize};

use crate::models::Identified;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    // 公告ID
    #[serde(rename = "_id")]
    pub id: String,
    // 所属班级ID
    #[serde(default)]
    pub class_id: String,
    // 公告内容
    pub message: String,
    // 发布时间
    pub time: chrono::DateTime<chrono::Utc>,
}

impl Identified for Post {
    fn id(&self) -> &str {
        &self.id
    }
}
