use serde::{Deserialize, Serialize};

use crate::models::Identified;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Class {
    // 班级ID
    #[serde(rename = "_id", default)]
    pub id: String,
    // 班级名称
    pub name: String,
    // 教师名称
    #[serde(default)]
    pub teacher: String,
    // 班级描述
    #[serde(default)]
    pub description: String,
    // 邀请码
    #[serde(default)]
    pub code: String,
}

impl Identified for Class {
    fn id(&self) -> &str {
        &self.id
    }
}
