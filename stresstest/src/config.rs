use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub remote: String,
    #[serde(default)]
    pub api_prefix: Option<String>,

    #[serde(with = "humantime_serde")]
    pub duration: Duration,

    pub workloads: Vec<Workload>,
}

#[derive(Debug, Deserialize)]
pub struct Workload {
    pub name: String,
    pub users: usize,
    #[serde(default)]
    pub input_value: Option<String>,
}
