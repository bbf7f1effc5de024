use serde::{Deserialize, Serialize};

/// Department summary served to authenticated callers; `fac` is the caller.
#[derive(Debug, Serialize, Deserialize)]
pub struct DepartmentInfo {
    #[serde(rename = "College")]
    pub college: String,
    #[serde(rename = "Dept")]
    pub dept: String,
    #[serde(rename = "StuCount")]
    pub stu_count: String,
    pub fac: String,
}
