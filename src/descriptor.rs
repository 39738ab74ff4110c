use serde::Deserialize;

/// One repository declared in the infrastructure snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    /// `<resource type>.<resource name>`, e.g. `github_repository.api`.
    pub resource_address: String,
    pub target_name: String,
    pub source_name: String,
    pub visibility: Visibility,
}

impl RepositoryDescriptor {
    pub fn resource_name(&self) -> &str {
        self.resource_address
            .split_once('.')
            .map(|(_, name)| name)
            .unwrap_or(self.resource_address.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Internal,
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Private
    }
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Internal => "internal",
        }
    }
}

/// Maps repository names between the source and target organizations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamePrefixes {
    pub source: String,
    pub target: String,
}

impl NamePrefixes {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        NamePrefixes {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Target name to source name. Names without the target prefix are returned as is.
    pub fn source_name(&self, target_name: &str) -> String {
        swap_prefix(target_name, &self.target, &self.source)
    }

    /// Inverse of [`NamePrefixes::source_name`].
    pub fn target_name(&self, source_name: &str) -> String {
        swap_prefix(source_name, &self.source, &self.target)
    }
}

fn swap_prefix(name: &str, from: &str, to: &str) -> String {
    match name.strip_prefix(from) {
        Some(rest) => format!("{to}{rest}", to = to, rest = rest),
        None => name.to_string(),
    }
}
