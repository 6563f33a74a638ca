use super::StepGenerator;
use crate::sql_generator::dialect::JoinKind;
use crate::sql_generator::error::SqlGenError;
use crate::sql_generator::sanitize::{quote, quote_qualified, quote_relation};
use crate::transform::{Join, TableRef};
use serde::{Deserialize, Serialize};

/// How the joined table is matched against the working table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JoinConstraint {
    /// Trusted condition text.
    On(String),
    Using(Vec<String>),
    #[default]
    None,
}

/// A join as callers describe it in a structured query.
///
/// On the wire this is `{"type": "left", "table": "dept", "condition": "..."}`
/// or the same with `"using": ["col", ...]`. `kind` is accepted in place of
/// `type`, and unrecognized kind names fall back to an inner join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "JoinSpecRepr", into = "JoinSpecRepr")]
pub struct JoinSpec {
    pub kind: JoinKind,
    pub table: String,
    pub constraint: JoinConstraint,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct JoinSpecRepr {
    #[serde(rename = "type", alias = "kind", default)]
    kind: JoinKind,
    table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    using: Option<Vec<String>>,
}

impl TryFrom<JoinSpecRepr> for JoinSpec {
    type Error = String;

    fn try_from(repr: JoinSpecRepr) -> Result<Self, Self::Error> {
        let constraint = match (repr.condition, repr.using) {
            (Some(_), Some(_)) => {
                return Err(format!(
                    "join on '{}' takes either 'condition' or 'using', not both",
                    repr.table
                ))
            }
            (Some(condition), None) => JoinConstraint::On(condition),
            (None, Some(columns)) => JoinConstraint::Using(columns),
            (None, None) => JoinConstraint::None,
        };
        Ok(Self {
            kind: repr.kind,
            table: repr.table,
            constraint,
        })
    }
}

impl From<JoinSpec> for JoinSpecRepr {
    fn from(spec: JoinSpec) -> Self {
        let (condition, using) = match spec.constraint {
            JoinConstraint::On(condition) => (Some(condition), None),
            JoinConstraint::Using(columns) => (None, Some(columns)),
            JoinConstraint::None => (None, None),
        };
        Self {
            kind: spec.kind,
            table: spec.table,
            condition,
            using,
        }
    }
}

impl JoinSpec {
    pub fn new(kind: JoinKind, table: impl Into<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            constraint: JoinConstraint::None,
        }
    }

    pub fn on(mut self, condition: impl Into<String>) -> Self {
        self.constraint = JoinConstraint::On(condition.into());
        self
    }

    pub fn using<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.constraint = JoinConstraint::Using(columns.into_iter().map(Into::into).collect());
        self
    }
}

fn render_join(kind: JoinKind, relation: &str, conditions: &[String]) -> String {
    if conditions.is_empty() || !kind.accepts_condition() {
        return format!("{} {}", kind.keyword(), relation);
    }
    format!(
        "{} {} ON {}",
        kind.keyword(),
        relation,
        conditions.join(" AND ")
    )
}

/// Renders the JOIN clause of a join step.
///
/// The ON pairs are not qualified. A derived right side is shown as a label,
/// so the output of a join over a derived relation is for display only.
pub fn join_clause(join: &Join) -> Result<String, SqlGenError> {
    let relation = match &join.right {
        TableRef::Named(name) => quote_relation(name)?,
        derived @ TableRef::Derived(_) => derived.to_string(),
    };
    let conditions = join
        .on
        .iter()
        .map(|(l, r)| -> Result<String, SqlGenError> {
            Ok(format!("{} = {}", quote(l)?, quote(r)?))
        })
        .collect::<Result<Vec<_>, SqlGenError>>()?;
    Ok(render_join(join.kind, &relation, &conditions))
}

pub fn join_spec_clause(spec: &JoinSpec) -> Result<String, SqlGenError> {
    let head = format!("{} {}", spec.kind.keyword(), quote_relation(&spec.table)?);
    if !spec.kind.accepts_condition() {
        return Ok(head);
    }
    match &spec.constraint {
        JoinConstraint::On(condition) if !condition.trim().is_empty() => {
            Ok(format!("{} ON {}", head, condition))
        }
        JoinConstraint::Using(columns) if !columns.is_empty() => {
            let quoted = columns
                .iter()
                .map(|c| quote(c))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(format!("{} USING ({})", head, quoted.join(", ")))
        }
        _ => Ok(head),
    }
}

pub(crate) fn handle_join(gen: &StepGenerator, join: &Join) -> Result<String, SqlGenError> {
    let (left_relation, left_label) = gen.relation_fragment(&join.left)?;
    let (right_relation, right_label) = gen.relation_fragment(&join.right)?;

    let conditions = join
        .on
        .iter()
        .map(|(l, r)| -> Result<String, SqlGenError> {
            Ok(format!(
                "{} = {}",
                quote_qualified(&left_label, l)?,
                quote_qualified(&right_label, r)?
            ))
        })
        .collect::<Result<Vec<_>, SqlGenError>>()?;

    Ok(format!(
        "SELECT * FROM {} {}",
        left_relation,
        render_join(join.kind, &right_relation, &conditions)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{TransformArena, TransformNode};

    fn join_node(arena: &TransformArena, id: crate::transform::NodeId) -> &Join {
        match arena.get(id).unwrap() {
            TransformNode::Join(j) => j,
            other => panic!("expected join, got {:?}", other),
        }
    }

    #[test]
    fn test_join_clause_kinds() {
        let mut arena = TransformArena::new();
        let cases = [
            (JoinKind::Inner, "INNER JOIN \"orders\" ON \"id\" = \"user_id\""),
            (JoinKind::Left, "LEFT JOIN \"orders\" ON \"id\" = \"user_id\""),
            (JoinKind::Right, "RIGHT JOIN \"orders\" ON \"id\" = \"user_id\""),
            (JoinKind::Full, "FULL OUTER JOIN \"orders\" ON \"id\" = \"user_id\""),
            (JoinKind::Semi, "SEMI JOIN \"orders\" ON \"id\" = \"user_id\""),
            (JoinKind::Anti, "ANTI JOIN \"orders\" ON \"id\" = \"user_id\""),
            (JoinKind::Cross, "CROSS JOIN \"orders\""),
        ];
        for (kind, expected) in cases {
            let id = arena
                .join("users", "orders", [("id", "user_id")], kind)
                .unwrap();
            assert_eq!(join_clause(join_node(&arena, id)).unwrap(), expected);
        }
    }

    #[test]
    fn test_join_clause_multiple_keys() {
        let mut arena = TransformArena::new();
        let id = arena
            .join("a", "b", [("x", "x2"), ("y", "y2")], JoinKind::Inner)
            .unwrap();
        assert_eq!(
            join_clause(join_node(&arena, id)).unwrap(),
            "INNER JOIN \"b\" ON \"x\" = \"x2\" AND \"y\" = \"y2\""
        );
    }

    #[test]
    fn test_join_clause_unknown_kind_name() {
        let mut arena = TransformArena::new();
        let id = arena
            .join("users", "orders", [("id", "user_id")], JoinKind::parse("bogus"))
            .unwrap();
        assert!(join_clause(join_node(&arena, id))
            .unwrap()
            .starts_with("INNER JOIN \"orders\""));
    }

    #[test]
    fn test_join_clause_derived_right() {
        let mut arena = TransformArena::new();
        let filtered = arena.row_filter("orders", "amount > 0").unwrap();
        let id = arena
            .join("users", filtered, [("id", "user_id")], JoinKind::Left)
            .unwrap();
        assert_eq!(
            join_clause(join_node(&arena, id)).unwrap(),
            "LEFT JOIN <derived #0> ON \"id\" = \"user_id\""
        );
    }

    #[test]
    fn test_join_spec_clause() {
        let on = JoinSpec::new(JoinKind::Inner, "dept").on("current_df.dept_id = dept.id");
        assert_eq!(
            join_spec_clause(&on).unwrap(),
            "INNER JOIN \"dept\" ON current_df.dept_id = dept.id"
        );

        let using = JoinSpec::new(JoinKind::Left, "dept").using(["dept_id"]);
        assert_eq!(
            join_spec_clause(&using).unwrap(),
            "LEFT JOIN \"dept\" USING (\"dept_id\")"
        );

        let cross = JoinSpec::new(JoinKind::Cross, "dept").on("1 = 1");
        assert_eq!(join_spec_clause(&cross).unwrap(), "CROSS JOIN \"dept\"");

        let bare = JoinSpec::new(JoinKind::Inner, "");
        assert!(join_spec_clause(&bare).is_err());
    }

    #[test]
    fn test_join_spec_deserialize() {
        let spec: JoinSpec =
            serde_json::from_str(r#"{"type": "left", "table": "dept", "using": ["id"]}"#).unwrap();
        assert_eq!(spec, JoinSpec::new(JoinKind::Left, "dept").using(["id"]));

        let spec: JoinSpec = serde_json::from_str(
            r#"{"type": "RIGHT", "table": "dept", "condition": "current_df.id = dept.id"}"#,
        )
        .unwrap();
        assert_eq!(
            spec,
            JoinSpec::new(JoinKind::Right, "dept").on("current_df.id = dept.id")
        );

        let spec: JoinSpec =
            serde_json::from_str(r#"{"kind": "anti", "table": "dept"}"#).unwrap();
        assert_eq!(spec, JoinSpec::new(JoinKind::Anti, "dept"));
    }

    #[test]
    fn test_join_spec_unknown_kind_falls_back_to_inner() {
        let spec: JoinSpec =
            serde_json::from_str(r#"{"type": "bogus", "table": "dept", "condition": "1 = 1"}"#)
                .unwrap();
        assert_eq!(spec.kind, JoinKind::Inner);
        assert_eq!(
            join_spec_clause(&spec).unwrap(),
            "INNER JOIN \"dept\" ON 1 = 1"
        );
    }

    #[test]
    fn test_join_spec_rejects_malformed_input() {
        let unknown_field =
            serde_json::from_str::<JoinSpec>(r#"{"type": "left", "table": "dept", "on": "x"}"#);
        assert!(unknown_field.is_err());

        let both = serde_json::from_str::<JoinSpec>(
            r#"{"type": "left", "table": "dept", "condition": "1 = 1", "using": ["id"]}"#,
        );
        assert!(both.unwrap_err().to_string().contains("not both"));
    }

    #[test]
    fn test_join_spec_serialize() {
        let spec = JoinSpec::new(JoinKind::Full, "dept").using(["id"]);
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "full", "table": "dept", "using": ["id"]})
        );
        let back: JoinSpec = serde_json::from_value(json).unwrap();
        assert_eq!(back, spec);
    }
}
