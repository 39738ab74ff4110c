use serde::Deserialize;

/// Author of the reference-rewrite commit.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ServiceIdentity {
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CreationPoll {
    pub attempts: u32,
    pub interval_secs: u64,
}

impl Default for CreationPoll {
    fn default() -> Self {
        CreationPoll {
            attempts: 10,
            interval_secs: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Replacement {
    pub pattern: String,
    pub replacement: String,
}
