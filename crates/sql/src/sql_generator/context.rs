use duckquery_common::config::{AmbiguityPolicy, DEFAULT_WORKING_ALIAS};

/// One relation visible to the assembler: an alias and its column names in
/// table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationColumns {
    pub alias: String,
    pub columns: Vec<String>,
}

impl RelationColumns {
    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// Relations a query can see: the working table plus every registered table,
/// in registration order.
///
/// Built from the session's tables at assembly time and dropped afterwards.
#[derive(Debug, Clone)]
pub struct JoinContext {
    working: RelationColumns,
    registered: Vec<RelationColumns>,
    policy: AmbiguityPolicy,
}

impl Default for JoinContext {
    fn default() -> Self {
        Self::new(DEFAULT_WORKING_ALIAS, Vec::<String>::new())
    }
}

impl JoinContext {
    pub fn new<S: Into<String>>(
        working_alias: impl Into<String>,
        working_columns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            working: RelationColumns {
                alias: working_alias.into(),
                columns: working_columns.into_iter().map(Into::into).collect(),
            },
            registered: Vec::new(),
            policy: AmbiguityPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: AmbiguityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Adds a registered relation. A name seen before keeps its position and
    /// takes the new column list.
    pub fn register<S: Into<String>>(
        &mut self,
        alias: impl Into<String>,
        columns: impl IntoIterator<Item = S>,
    ) -> &mut Self {
        let alias = alias.into();
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        match self.registered.iter_mut().find(|r| r.alias == alias) {
            Some(existing) => existing.columns = columns,
            None => self.registered.push(RelationColumns { alias, columns }),
        }
        self
    }

    pub fn working(&self) -> &RelationColumns {
        &self.working
    }

    pub fn working_alias(&self) -> &str {
        &self.working.alias
    }

    pub fn registered(&self) -> &[RelationColumns] {
        &self.registered
    }

    pub fn policy(&self) -> AmbiguityPolicy {
        self.policy
    }

    /// Column names of `alias`, working table first.
    pub fn columns_of(&self, alias: &str) -> Option<&[String]> {
        if self.working.alias == alias {
            return Some(&self.working.columns);
        }
        self.registered
            .iter()
            .find(|r| r.alias == alias)
            .map(|r| r.columns.as_slice())
    }

    /// Registered relations holding `column`, in registration order.
    pub fn owners_of(&self, column: &str) -> Vec<&str> {
        self.registered
            .iter()
            .filter(|r| r.contains(column))
            .map(|r| r.alias.as_str())
            .collect()
    }

    pub fn aliases(&self) -> Vec<&str> {
        std::iter::once(self.working.alias.as_str())
            .chain(self.registered.iter().map(|r| r.alias.as_str()))
            .collect()
    }
}
